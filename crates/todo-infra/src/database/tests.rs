use chrono::Utc;
use sea_orm::{ColumnTrait, ColumnType, DatabaseBackend, MockDatabase, MockExecResult};

use todo_core::domain::{NewTask, Task, TaskChanges};
use todo_core::error::RepoError;
use todo_core::ports::{BaseRepository, TaskRepository, UserRepository};

use crate::database::entity::{task, user};
use crate::database::postgres_repo::{PostgresTaskRepository, PostgresUserRepository};

fn task_model(id: i32, owner: &str, title: &str, completed: bool) -> task::Model {
    let now = Utc::now();
    task::Model {
        id,
        owner: owner.to_owned(),
        title: title.to_owned(),
        description: None,
        completed,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

#[tokio::test]
async fn test_find_task_by_id() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![task_model(1, "alice", "Buy milk", false)]])
        .into_connection();

    let repo = PostgresTaskRepository::new(db);

    let result: Option<Task> = repo.find_by_id(1).await.unwrap();

    let task = result.unwrap();
    assert_eq!(task.id, 1);
    assert_eq!(task.title, "Buy milk");
    assert_eq!(task.owner, "alice");
}

#[tokio::test]
async fn test_insert_task_returns_assigned_id() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![task_model(7, "alice", "Buy milk", false)]])
        .into_connection();

    let repo = PostgresTaskRepository::new(db);
    let new_task = NewTask::new("alice", "Buy milk", None, false).unwrap();

    let task = repo.insert(new_task).await.unwrap();

    assert_eq!(task.id, 7);
    assert!(!task.completed);
}

#[test]
fn test_task_text_columns_are_unbounded() {
    assert_eq!(task::Column::Title.def().get_column_type(), &ColumnType::Text);
    assert_eq!(
        task::Column::Description.def().get_column_type(),
        &ColumnType::Text
    );
}

#[tokio::test]
async fn test_insert_accepts_title_longer_after_escaping() {
    let new_task = NewTask::new("alice", &"<".repeat(255), None, false).unwrap();
    assert_eq!(new_task.title.chars().count(), 1020);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![task::Model {
            title: new_task.title.clone(),
            ..task_model(3, "alice", "", false)
        }]])
        .into_connection();
    let repo = PostgresTaskRepository::new(db);

    let task = repo.insert(new_task).await.unwrap();

    assert_eq!(task.title, "&lt;".repeat(255));
}

#[tokio::test]
async fn test_update_missing_task_is_none() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<task::Model>::new()])
        .into_connection();

    let repo = PostgresTaskRepository::new(db);
    let changes = TaskChanges::new(None, None, Some(true)).unwrap();

    assert!(repo.update(3, changes).await.unwrap().is_none());
}

#[tokio::test]
async fn test_update_task_sets_completed() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([
            vec![task_model(1, "alice", "Buy milk", false)],
            vec![task_model(1, "alice", "Buy milk", true)],
        ])
        .into_connection();

    let repo = PostgresTaskRepository::new(db);
    let changes = TaskChanges::new(None, None, Some(true)).unwrap();

    let task = repo.update(1, changes).await.unwrap().unwrap();

    assert!(task.completed);
}

#[tokio::test]
async fn test_list_tasks_by_owner() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![
            task_model(1, "alice", "one", false),
            task_model(2, "alice", "two", true),
        ]])
        .into_connection();

    let repo = PostgresTaskRepository::new(db);

    let tasks = repo.list_by_owner("alice", 10).await.unwrap();

    let ids: Vec<_> = tasks.iter().map(|t| t.id).collect();
    assert_eq!(ids, [1, 2]);
}

#[tokio::test]
async fn test_delete_missing_task_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresTaskRepository::new(db);

    let result = BaseRepository::<Task, i32>::delete(&repo, 9).await;

    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_find_user_by_username() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user::Model {
            id: 1,
            username: "alice".to_owned(),
            password_hash: "$argon2id$v=19$stub".to_owned(),
            created_at: Utc::now().into(),
        }]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);

    let user = repo.find_by_username("alice").await.unwrap().unwrap();

    assert_eq!(user.id, 1);
    assert_eq!(user.username, "alice");
}
