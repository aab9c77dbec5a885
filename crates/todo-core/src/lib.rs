//! # Todo Core
//!
//! The domain layer of the to-do API.
//! This crate contains users, tasks, input rules and the services built on
//! top of the ports. It has zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod sanitize;
pub mod services;

pub use error::DomainError;
pub use services::{CredentialStore, TaskService};
