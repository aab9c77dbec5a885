//! In-memory repositories - used when no database is configured and in tests.
//!
//! Data is lost on process restart.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use todo_core::domain::{NewTask, NewUser, Task, TaskChanges, User};
use todo_core::error::RepoError;
use todo_core::ports::{BaseRepository, TaskRepository, UserRepository};

#[derive(Default)]
struct UserTable {
    last_id: i32,
    by_username: HashMap<String, User>,
}

/// In-memory user repository keyed by username.
#[derive(Default)]
pub struct InMemoryUserRepository {
    table: RwLock<UserTable>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let table = self.table.read().await;
        Ok(table.by_username.get(username).cloned())
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, RepoError> {
        let mut table = self.table.write().await;
        if table.by_username.contains_key(&new_user.username) {
            return Err(RepoError::Constraint(format!(
                "username '{}' already exists",
                new_user.username
            )));
        }

        table.last_id += 1;
        let user = User {
            id: table.last_id,
            username: new_user.username,
            password_hash: new_user.password_hash,
            created_at: new_user.created_at,
        };
        table.by_username.insert(user.username.clone(), user.clone());
        Ok(user)
    }
}

#[derive(Default)]
struct TaskTable {
    last_id: i32,
    rows: BTreeMap<i32, Task>,
}

/// In-memory task repository. Ids start at 1 and are never reused.
#[derive(Default)]
pub struct InMemoryTaskRepository {
    table: RwLock<TaskTable>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<Task, i32> for InMemoryTaskRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Task>, RepoError> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).cloned())
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let mut table = self.table.write().await;
        table.rows.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn insert(&self, new_task: NewTask) -> Result<Task, RepoError> {
        let mut table = self.table.write().await;
        table.last_id += 1;

        let task = Task {
            id: table.last_id,
            owner: new_task.owner,
            title: new_task.title,
            description: new_task.description,
            completed: new_task.completed,
            created_at: new_task.created_at,
            updated_at: new_task.created_at,
        };
        table.rows.insert(task.id, task.clone());
        Ok(task)
    }

    async fn update(&self, id: i32, changes: TaskChanges) -> Result<Option<Task>, RepoError> {
        let mut table = self.table.write().await;
        let Some(task) = table.rows.get_mut(&id) else {
            return Ok(None);
        };

        changes.apply(task);
        Ok(Some(task.clone()))
    }

    async fn list_by_owner(&self, owner: &str, limit: u64) -> Result<Vec<Task>, RepoError> {
        let table = self.table.read().await;
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);

        Ok(table
            .rows
            .values()
            .filter(|task| task.owner == owner)
            .take(limit)
            .cloned()
            .collect())
    }
}
