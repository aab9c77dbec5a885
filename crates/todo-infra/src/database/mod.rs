//! Persistence: SeaORM/PostgreSQL repositories and in-memory stand-ins.

mod memory;

pub use memory::{InMemoryTaskRepository, InMemoryUserRepository};

#[cfg(feature = "postgres")]
mod pool;
#[cfg(feature = "postgres")]
mod postgres_base;
#[cfg(feature = "postgres")]
mod postgres_repo;

#[cfg(feature = "postgres")]
pub mod entity;

#[cfg(feature = "postgres")]
pub use pool::DatabaseConfig;
#[cfg(feature = "postgres")]
pub use postgres_repo::{PostgresTaskRepository, PostgresUserRepository};

#[cfg(feature = "postgres")]
#[cfg(test)]
mod tests;
