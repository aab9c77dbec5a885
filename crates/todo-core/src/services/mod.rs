//! Services - the operations the HTTP layer calls, composed from ports.

mod credentials;
mod tasks;

pub use credentials::CredentialStore;
pub use tasks::{TaskService, task_cache_key};
