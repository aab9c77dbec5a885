use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::sanitize::{clean_description, clean_title};

/// Task entity - a single to-do item owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i32,
    pub owner: String,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn is_owned_by(&self, username: &str) -> bool {
        self.owner == username
    }
}

/// A validated, sanitized task waiting for an id from the store.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub owner: String,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl NewTask {
    /// Validate and sanitize the user-supplied fields.
    pub fn new(
        owner: impl Into<String>,
        title: &str,
        description: Option<&str>,
        completed: bool,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            owner: owner.into(),
            title: clean_title(title)?,
            description: clean_description(description)?,
            completed,
            created_at: Utc::now(),
        })
    }
}

/// Partial update. `None` leaves the stored value as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    pub title: Option<String>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
}

impl TaskChanges {
    pub fn new(
        title: Option<&str>,
        description: Option<&str>,
        completed: Option<bool>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            title: title.map(clean_title).transpose()?,
            // A blank description clears the stored one.
            description: description
                .map(|d| clean_description(Some(d)))
                .transpose()?,
            completed,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }

    /// Apply the changes to an in-memory copy of a task.
    pub fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        task.updated_at = Utc::now();
    }
}
