//! Task operations with owner scoping and a read-through cache.
//!
//! The cache is optional and fail-open: every cache error is logged and
//! the repository answers instead. Writes invalidate the cached entry
//! before the caller sees the result.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::domain::{NewTask, Task, TaskChanges};
use crate::error::{DomainError, RepoError};
use crate::ports::{Cache, TaskRepository};

/// Cache key for a single task.
pub fn task_cache_key(id: i32) -> String {
    format!("task:{id}")
}

pub struct TaskService {
    repo: Arc<dyn TaskRepository>,
    cache: Option<Arc<dyn Cache>>,
    cache_ttl: Duration,
    /// Bumped by every update and delete. A read that overlapped a write
    /// drops the snapshot it just cached.
    writes: AtomicU64,
}

impl TaskService {
    pub fn new(
        repo: Arc<dyn TaskRepository>,
        cache: Option<Arc<dyn Cache>>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            repo,
            cache,
            cache_ttl,
            writes: AtomicU64::new(0),
        }
    }

    /// Create a task for `owner`. Title and description are validated and
    /// sanitized before they reach the store.
    pub async fn create(
        &self,
        owner: &str,
        title: &str,
        description: Option<&str>,
        completed: bool,
    ) -> Result<Task, DomainError> {
        let new_task = NewTask::new(owner, title, description, completed)?;
        let task = self.repo.insert(new_task).await?;

        tracing::debug!(task_id = task.id, owner = %owner, "Task created");
        self.cache_put(&task).await;
        Ok(task)
    }

    /// Fetch one of `owner`'s tasks. Tasks of other users are reported as
    /// missing.
    pub async fn get(&self, owner: &str, id: i32) -> Result<Task, DomainError> {
        if let Some(task) = self.cache_get(id).await {
            return if task.is_owned_by(owner) {
                Ok(task)
            } else {
                Err(DomainError::task_not_found(id))
            };
        }

        let seen = self.writes.load(Ordering::SeqCst);
        let task = self.find_owned(owner, id).await?;
        self.cache_put(&task).await;
        if self.writes.load(Ordering::SeqCst) != seen {
            // The snapshot may predate a write that has already invalidated.
            self.cache_invalidate(id).await;
        }
        Ok(task)
    }

    /// Partial update of title, description and completion flag.
    pub async fn update(
        &self,
        owner: &str,
        id: i32,
        changes: TaskChanges,
    ) -> Result<Task, DomainError> {
        let current = self.find_owned(owner, id).await?;
        if changes.is_empty() {
            return Ok(current);
        }

        let updated = self
            .repo
            .update(id, changes)
            .await?
            .ok_or_else(|| DomainError::task_not_found(id))?;

        self.writes.fetch_add(1, Ordering::SeqCst);
        self.cache_invalidate(id).await;
        tracing::debug!(task_id = id, owner = %owner, "Task updated");
        Ok(updated)
    }

    /// Delete one of `owner`'s tasks. Deleting twice fails the second time.
    pub async fn delete(&self, owner: &str, id: i32) -> Result<(), DomainError> {
        self.find_owned(owner, id).await?;

        self.repo.delete(id).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::task_not_found(id),
            other => other.into(),
        })?;

        self.writes.fetch_add(1, Ordering::SeqCst);
        self.cache_invalidate(id).await;
        tracing::debug!(task_id = id, owner = %owner, "Task deleted");
        Ok(())
    }

    /// Up to `limit` of `owner`'s tasks in insertion order.
    pub async fn list(&self, owner: &str, limit: u64) -> Result<Vec<Task>, DomainError> {
        Ok(self.repo.list_by_owner(owner, limit).await?)
    }

    /// Ownership checks always go to the repository, never the cache.
    async fn find_owned(&self, owner: &str, id: i32) -> Result<Task, DomainError> {
        match self.repo.find_by_id(id).await? {
            Some(task) if task.is_owned_by(owner) => Ok(task),
            _ => Err(DomainError::task_not_found(id)),
        }
    }

    async fn cache_get(&self, id: i32) -> Option<Task> {
        let cache = self.cache.as_ref()?;
        let key = task_cache_key(id);

        let raw = match cache.get(&key).await {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache read failed, using repository");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(task) => Some(task),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Dropping undecodable cache entry");
                if let Err(e) = cache.invalidate(&key).await {
                    tracing::warn!(key = %key, error = %e, "Cache invalidate failed");
                }
                None
            }
        }
    }

    async fn cache_put(&self, task: &Task) {
        let Some(cache) = &self.cache else {
            return;
        };
        let key = task_cache_key(task.id);

        let value = match serde_json::to_string(task) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Task serialization for cache failed");
                return;
            }
        };

        if let Err(e) = cache.set(&key, &value, self.cache_ttl).await {
            tracing::warn!(key = %key, error = %e, "Cache set failed");
        }
    }

    async fn cache_invalidate(&self, id: i32) {
        let Some(cache) = &self.cache else {
            return;
        };
        let key = task_cache_key(id);

        if let Err(e) = cache.invalidate(&key).await {
            tracing::warn!(key = %key, error = %e, "Cache invalidate failed");
        }
    }
}
