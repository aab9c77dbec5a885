use async_trait::async_trait;

use crate::domain::{NewTask, NewUser, Task, TaskChanges, User};
use crate::error::RepoError;

/// Generic repository trait for lookups and removal by primary key.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Delete an entity by its ID. Fails with `RepoError::NotFound` when
    /// nothing was removed.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository - the persistence side of the credential store.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by their username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// Store a new user. A taken username is a `RepoError::Constraint`.
    async fn insert(&self, user: NewUser) -> Result<User, RepoError>;
}

/// Task repository.
#[async_trait]
pub trait TaskRepository: BaseRepository<Task, i32> {
    /// Store a new task and return it with its assigned id.
    async fn insert(&self, task: NewTask) -> Result<Task, RepoError>;

    /// Apply a partial update. `Ok(None)` when the task does not exist.
    async fn update(&self, id: i32, changes: TaskChanges) -> Result<Option<Task>, RepoError>;

    /// Up to `limit` tasks of one owner, in insertion order.
    async fn list_by_owner(&self, owner: &str, limit: u64) -> Result<Vec<Task>, RepoError>;
}
