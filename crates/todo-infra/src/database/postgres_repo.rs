//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, NotSet, QueryFilter, QueryOrder, QuerySelect, Set,
};

use todo_core::domain::{NewTask, NewUser, Task, TaskChanges, User};
use todo_core::error::RepoError;
use todo_core::ports::{TaskRepository, UserRepository};

use super::entity::task::{self, Entity as TaskEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL task repository.
pub type PostgresTaskRepository = PostgresBaseRepository<TaskEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(username = %username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, RepoError> {
        let model = user::ActiveModel {
            id: NotSet,
            username: Set(new_user.username),
            password_hash: Set(new_user.password_hash),
            created_at: Set(new_user.created_at.into()),
        }
        .insert(&self.db)
        .await
        .map_err(map_db_err)?;

        Ok(model.into())
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn insert(&self, new_task: NewTask) -> Result<Task, RepoError> {
        let model = task::ActiveModel {
            id: NotSet,
            owner: Set(new_task.owner),
            title: Set(new_task.title),
            description: Set(new_task.description),
            completed: Set(new_task.completed),
            created_at: Set(new_task.created_at.into()),
            updated_at: Set(new_task.created_at.into()),
        }
        .insert(&self.db)
        .await
        .map_err(map_db_err)?;

        Ok(model.into())
    }

    async fn update(&self, id: i32, changes: TaskChanges) -> Result<Option<Task>, RepoError> {
        let Some(current) = TaskEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
        else {
            return Ok(None);
        };

        let mut active: task::ActiveModel = current.into();
        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        if let Some(completed) = changes.completed {
            active.completed = Set(completed);
        }
        active.updated_at = Set(Utc::now().into());

        // Single-row UPDATE; concurrent writers resolve last-writer-wins.
        let model = active.update(&self.db).await.map_err(|e| match e {
            sea_orm::DbErr::RecordNotUpdated => RepoError::NotFound,
            other => map_db_err(other),
        });

        match model {
            Ok(model) => Ok(Some(model.into())),
            Err(RepoError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn list_by_owner(&self, owner: &str, limit: u64) -> Result<Vec<Task>, RepoError> {
        let result = TaskEntity::find()
            .filter(task::Column::Owner.eq(owner))
            .order_by_asc(task::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}
