//! Domain entities - the core business objects.

mod task;
mod user;

pub use task::{NewTask, Task, TaskChanges};
pub use user::{NewUser, User};
