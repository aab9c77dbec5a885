//! Ports: the traits infrastructure implements for the services.

mod auth;
mod cache;
mod rate_limit;
mod repository;

pub use auth::{AuthError, PasswordService, TokenClaims, TokenService};
pub use cache::{Cache, CacheError};
pub use rate_limit::{RateDecision, RateLimitError, RateLimiter};
pub use repository::{BaseRepository, TaskRepository, UserRepository};
