//! Registration, token and current-user handlers.

use actix_web::{HttpResponse, web};

use todo_core::domain::User;
use todo_shared::dto::{LoginForm, RegisterRequest, TokenResponse, UserResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Public view of a user; the password hash never leaves the store.
fn user_response(user: User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username,
        created_at: user.created_at.to_rfc3339(),
    }
}

/// POST /register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let user = state
        .credentials
        .register(&req.username, &req.password)
        .await?;

    Ok(HttpResponse::Created().json(user_response(user)))
}

/// POST /token - form-encoded username and password.
pub async fn login(
    state: web::Data<AppState>,
    form: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let user = state
        .credentials
        .verify(&form.username, &form.password)
        .await?;

    let token = state
        .tokens
        .issue(&user.username)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!(username = %user.username, "Issued access token");

    Ok(HttpResponse::Ok().json(TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
        expires_in: state.tokens.expiration_seconds().max(0) as u64,
    }))
}

/// GET /users/me - Protected route
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    // A valid token for a user that no longer exists is still unauthorized.
    let user = state
        .credentials
        .find(&identity.username)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Could not validate credentials".to_string()))?;

    Ok(HttpResponse::Ok().json(user_response(user)))
}
