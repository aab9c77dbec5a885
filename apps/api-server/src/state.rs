//! Application state - shared across all handlers.

use std::sync::Arc;
use std::time::Duration;

use todo_core::ports::{
    Cache, PasswordService, RateLimiter, TaskRepository, TokenService, UserRepository,
};
use todo_core::{CredentialStore, TaskService};
use todo_infra::{
    Argon2PasswordService, InMemoryCache, InMemoryTaskRepository, InMemoryUserRepository,
    JwtTokenService,
};

#[cfg(feature = "postgres")]
use migration::{Migrator, MigratorTrait};
#[cfg(feature = "rate-limit")]
use todo_infra::InMemoryRateLimiter;
#[cfg(feature = "redis")]
use todo_infra::RedisCache;
#[cfg(feature = "postgres")]
use todo_infra::{PostgresTaskRepository, PostgresUserRepository};

use crate::config::{AppConfig, CacheBackend, CacheSettings};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<CredentialStore>,
    pub tokens: Arc<dyn TokenService>,
    pub tasks: Arc<TaskService>,
    pub rate_limiter: Option<Arc<dyn RateLimiter>>,
    /// Name of the active storage backend, reported by `/health`.
    pub storage: &'static str,
}

struct Repositories {
    users: Arc<dyn UserRepository>,
    tasks: Arc<dyn TaskRepository>,
    storage: &'static str,
}

impl Repositories {
    fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            tasks: Arc::new(InMemoryTaskRepository::new()),
            storage: "memory",
        }
    }
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let repos = init_repositories(config).await?;
        let cache = init_cache(&config.cache).await;

        #[cfg(feature = "rate-limit")]
        let rate_limiter: Option<Arc<dyn RateLimiter>> = if config.rate_limit.enabled {
            Some(Arc::new(InMemoryRateLimiter::new(
                config.rate_limit.limits.clone(),
            )))
        } else {
            tracing::info!("Rate limiting disabled");
            None
        };

        #[cfg(not(feature = "rate-limit"))]
        let rate_limiter: Option<Arc<dyn RateLimiter>> = None;

        let state = Self::from_parts(
            repos.users,
            repos.tasks,
            Arc::new(Argon2PasswordService::new()),
            Arc::new(JwtTokenService::new(config.jwt.clone())),
            cache,
            config.cache.ttl,
            rate_limiter,
        )
        .with_storage(repos.storage);

        tracing::info!(storage = state.storage, "Application state initialized");
        Ok(state)
    }

    /// Wire the services from already-built adapters.
    pub fn from_parts(
        users: Arc<dyn UserRepository>,
        tasks: Arc<dyn TaskRepository>,
        passwords: Arc<dyn PasswordService>,
        tokens: Arc<dyn TokenService>,
        cache: Option<Arc<dyn Cache>>,
        cache_ttl: Duration,
        rate_limiter: Option<Arc<dyn RateLimiter>>,
    ) -> Self {
        Self {
            credentials: Arc::new(CredentialStore::new(users, passwords)),
            tokens,
            tasks: Arc::new(TaskService::new(tasks, cache, cache_ttl)),
            rate_limiter,
            storage: "memory",
        }
    }

    fn with_storage(mut self, storage: &'static str) -> Self {
        self.storage = storage;
        self
    }
}

#[cfg(feature = "postgres")]
async fn init_repositories(config: &AppConfig) -> anyhow::Result<Repositories> {
    let Some(db_config) = config.database.as_ref() else {
        tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        return Ok(Repositories::in_memory());
    };

    let db = db_config.connect().await?;
    tracing::info!("Connected to PostgreSQL");

    if config.auto_migrate {
        Migrator::up(&db, None).await?;
        tracing::info!("Database migrations applied");
    }

    Ok(Repositories {
        users: Arc::new(PostgresUserRepository::new(db.clone())),
        tasks: Arc::new(PostgresTaskRepository::new(db)),
        storage: "postgres",
    })
}

#[cfg(not(feature = "postgres"))]
async fn init_repositories(_config: &AppConfig) -> anyhow::Result<Repositories> {
    tracing::info!("Running without postgres feature - using in-memory repositories");
    Ok(Repositories::in_memory())
}

/// Pick the task cache. Cache trouble never stops the server.
async fn init_cache(settings: &CacheSettings) -> Option<Arc<dyn Cache>> {
    match settings.backend {
        CacheBackend::Disabled => {
            tracing::info!("Task cache disabled");
            None
        }
        CacheBackend::Memory => Some(Arc::new(InMemoryCache::new())),
        #[cfg(feature = "redis")]
        CacheBackend::Redis => match RedisCache::new(&settings.redis).await {
            Ok(cache) => Some(Arc::new(cache)),
            Err(e) if settings.redis.fallback_to_memory => {
                tracing::warn!(error = %e, "Redis unavailable, falling back to in-memory cache");
                Some(Arc::new(InMemoryCache::new()))
            }
            Err(e) => {
                tracing::error!(error = %e, "Redis unavailable, running without a task cache");
                None
            }
        },
        #[cfg(not(feature = "redis"))]
        CacheBackend::Redis => {
            tracing::warn!("Built without redis support, using in-memory cache");
            Some(Arc::new(InMemoryCache::new()))
        }
    }
}
