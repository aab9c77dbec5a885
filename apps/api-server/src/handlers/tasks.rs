//! Task CRUD handlers. Every route is scoped to the authenticated owner.

use actix_web::{HttpResponse, web};

use todo_core::domain::{Task, TaskChanges};
use todo_shared::dto::{CreateTaskRequest, ListTasksQuery, TaskResponse, UpdateTaskRequest};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// Page size when `limit` is absent, and the most a caller may ask for.
pub const MAX_LIST_LIMIT: u64 = 100;

fn task_response(task: Task) -> TaskResponse {
    TaskResponse {
        id: task.id,
        title: task.title,
        description: task.description,
        completed: task.completed,
        owner: task.owner,
        created_at: task.created_at.to_rfc3339(),
        updated_at: task.updated_at.to_rfc3339(),
    }
}

/// POST /tasks
pub async fn create_task(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreateTaskRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let task = state
        .tasks
        .create(
            &identity.username,
            &req.title,
            req.description.as_deref(),
            req.completed,
        )
        .await?;

    Ok(HttpResponse::Created().json(task_response(task)))
}

/// GET /tasks?limit=N
pub async fn list_tasks(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<ListTasksQuery>,
) -> AppResult<HttpResponse> {
    let limit = query.limit.unwrap_or(MAX_LIST_LIMIT).min(MAX_LIST_LIMIT);
    let tasks = state.tasks.list(&identity.username, limit).await?;

    let body: Vec<TaskResponse> = tasks.into_iter().map(task_response).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /tasks/{id}
pub async fn get_task(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let task = state
        .tasks
        .get(&identity.username, path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(task_response(task)))
}

/// PUT /tasks/{id} - absent fields are left unchanged.
pub async fn update_task(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i32>,
    body: web::Json<UpdateTaskRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let changes = TaskChanges::new(
        req.title.as_deref(),
        req.description.as_deref(),
        req.completed,
    )?;

    let task = state
        .tasks
        .update(&identity.username, path.into_inner(), changes)
        .await?;

    Ok(HttpResponse::Ok().json(task_response(task)))
}

/// DELETE /tasks/{id}
pub async fn delete_task(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    state
        .tasks
        .delete(&identity.username, path.into_inner())
        .await?;

    Ok(HttpResponse::NoContent().finish())
}
