//! # Todo Infrastructure
//!
//! Concrete implementations of the ports defined in `todo-core`.
//! This crate contains database, cache, auth and rate limiting integrations.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory only
//! - `postgres` - PostgreSQL repositories via SeaORM
//! - `auth` - JWT + Argon2 authentication
//! - `rate-limit` - Rate limiting via governor
//! - `redis` - Redis-backed task cache

pub mod cache;
pub mod database;

#[cfg(feature = "auth")]
pub mod auth;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

// Re-exports - In-Memory
pub use cache::InMemoryCache;
pub use database::{InMemoryTaskRepository, InMemoryUserRepository};

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};

#[cfg(feature = "rate-limit")]
pub use rate_limit::{InMemoryRateLimiter, RateLimitConfig};

// Re-exports - External services
#[cfg(feature = "postgres")]
pub use database::{DatabaseConfig, PostgresTaskRepository, PostgresUserRepository};

#[cfg(feature = "redis")]
pub use cache::{RedisCache, RedisConfig};
