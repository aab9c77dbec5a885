//! HTTP handlers and route configuration.

mod auth;
mod health;
mod tasks;

use actix_web::web;
use std::sync::Arc;

use todo_core::ports::RateLimiter;

use crate::middleware::error::extractor_error;
use crate::middleware::rate_limit::RateLimitMiddleware;

/// Configure all application routes.
///
/// Paths are registered without a trailing slash; `NormalizePath::trim`
/// maps `/tasks/` onto `/tasks`.
pub fn configure_routes(cfg: &mut web::ServiceConfig, limiter: Option<Arc<dyn RateLimiter>>) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, req| extractor_error(err, req)))
        .app_data(web::FormConfig::default().error_handler(|err, req| extractor_error(err, req)))
        .app_data(web::PathConfig::default().error_handler(|err, req| extractor_error(err, req)))
        .app_data(web::QueryConfig::default().error_handler(|err, req| extractor_error(err, req)))
        // Public routes
        .route("/health", web::get().to(health::health_check))
        .service(
            web::resource("/register")
                .wrap(RateLimitMiddleware::new(limiter.clone()))
                .route(web::post().to(auth::register)),
        )
        .service(
            web::resource("/token")
                .wrap(RateLimitMiddleware::new(limiter))
                .route(web::post().to(auth::login)),
        )
        // Authenticated routes
        .route("/users/me", web::get().to(auth::me))
        .service(
            web::resource("/tasks")
                .route(web::get().to(tasks::list_tasks))
                .route(web::post().to(tasks::create_task)),
        )
        .service(
            web::resource("/tasks/{id}")
                .route(web::get().to(tasks::get_task))
                .route(web::put().to(tasks::update_task))
                .route(web::delete().to(tasks::delete_task)),
        );
}
