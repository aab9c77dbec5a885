use actix_http::Request;
use actix_web::{
    App,
    body::MessageBody,
    dev::{Service, ServiceResponse},
    http::{StatusCode, header},
    middleware::NormalizePath,
    test, web,
};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

use todo_core::ports::{RateLimiter, TokenService};
use todo_infra::{
    Argon2PasswordService, InMemoryCache, InMemoryTaskRepository, InMemoryUserRepository,
    JwtConfig, JwtTokenService,
};

use crate::handlers;
use crate::state::AppState;

const SECRET: &str = "test-secret";

fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: SECRET.to_string(),
        ..JwtConfig::default()
    }
}

fn test_state(rate_limiter: Option<Arc<dyn RateLimiter>>) -> AppState {
    AppState::from_parts(
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(InMemoryTaskRepository::new()),
        Arc::new(Argon2PasswordService::with_cost(1024, 1).unwrap()),
        Arc::new(JwtTokenService::new(jwt_config())),
        Some(Arc::new(InMemoryCache::new())),
        Duration::from_secs(300),
        rate_limiter,
    )
}

macro_rules! test_app {
    ($state:expr) => {{
        let state: AppState = $state;
        let limiter = state.rate_limiter.clone();
        test::init_service(
            App::new()
                .wrap(NormalizePath::trim())
                .app_data(web::Data::new(state))
                .configure(|cfg| handlers::configure_routes(cfg, limiter)),
        )
        .await
    }};
}

async fn register<S, B>(app: &S, username: &str, password: &str) -> ServiceResponse<B>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(json!({ "username": username, "password": password }))
        .to_request();
    test::call_service(app, req).await
}

async fn login<S, B>(app: &S, username: &str, password: &str) -> ServiceResponse<B>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/token")
        .set_form([("username", username), ("password", password)])
        .to_request();
    test::call_service(app, req).await
}

/// Register `username` and return a bearer header value.
async fn bearer<S, B>(app: &S, username: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    assert_eq!(
        register(app, username, "pw123").await.status(),
        StatusCode::CREATED
    );
    let resp = login(app, username, "pw123").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    format!("Bearer {}", body["access_token"].as_str().unwrap())
}

async fn create_task<S, B>(app: &S, auth: &str, body: Value) -> ServiceResponse<B>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/tasks/")
        .insert_header((header::AUTHORIZATION, auth))
        .set_json(body)
        .to_request();
    test::call_service(app, req).await
}

#[actix_web::test]
async fn test_task_lifecycle() {
    let app = test_app!(test_state(None));

    let resp = register(&app, "alice", "pw123").await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let user: Value = test::read_body_json(resp).await;
    assert_eq!(user["username"], "alice");
    assert!(user.get("password").is_none());
    assert!(user.get("password_hash").is_none());

    let resp = login(&app, "alice", "pw123").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let token: Value = test::read_body_json(resp).await;
    assert_eq!(token["token_type"], "bearer");
    assert_eq!(token["expires_in"], 1800);
    let auth = format!("Bearer {}", token["access_token"].as_str().unwrap());

    let resp = create_task(&app, &auth, json!({ "title": "Buy milk" })).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["id"], 1);
    assert_eq!(created["title"], "Buy milk");
    assert_eq!(created["completed"], false);
    assert_eq!(created["owner"], "alice");

    let req = test::TestRequest::get()
        .uri("/tasks/1")
        .insert_header((header::AUTHORIZATION, auth.as_str()))
        .to_request();
    let fetched: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched, created);

    let req = test::TestRequest::put()
        .uri("/tasks/1")
        .insert_header((header::AUTHORIZATION, auth.as_str()))
        .set_json(json!({ "completed": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = test::read_body_json(resp).await;
    assert_eq!(updated["completed"], true);
    assert_eq!(updated["title"], "Buy milk");

    // The cached copy was invalidated by the update
    let req = test::TestRequest::get()
        .uri("/tasks/1")
        .insert_header((header::AUTHORIZATION, auth.as_str()))
        .to_request();
    let fetched: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched["completed"], true);

    let req = test::TestRequest::delete()
        .uri("/tasks/1")
        .insert_header((header::AUTHORIZATION, auth.as_str()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri("/tasks/1")
        .insert_header((header::AUTHORIZATION, auth.as_str()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::delete()
        .uri("/tasks/1")
        .insert_header((header::AUTHORIZATION, auth.as_str()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_current_user() {
    let app = test_app!(test_state(None));
    let auth = bearer(&app, "alice").await;

    let req = test::TestRequest::get()
        .uri("/users/me/")
        .insert_header((header::AUTHORIZATION, auth.as_str()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let me: Value = test::read_body_json(resp).await;
    assert_eq!(me["username"], "alice");
    assert_eq!(me["id"], 1);
}

#[actix_web::test]
async fn test_protected_routes_require_token() {
    let app = test_app!(test_state(None));

    for uri in ["/users/me/", "/tasks/", "/tasks/1"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(
            resp.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    let req = test::TestRequest::get()
        .uri("/tasks/")
        .insert_header((header::AUTHORIZATION, "Bearer not-a-jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["title"], "Invalid Token");
}

#[actix_web::test]
async fn test_expired_token_is_rejected() {
    let app = test_app!(test_state(None));
    bearer(&app, "alice").await;

    let expired = JwtTokenService::new(JwtConfig {
        expiration_minutes: -5,
        ..jwt_config()
    })
    .issue("alice")
    .unwrap();

    let req = test::TestRequest::get()
        .uri("/users/me")
        .insert_header((header::AUTHORIZATION, format!("Bearer {expired}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["title"], "Token Expired");
}

#[actix_web::test]
async fn test_duplicate_registration_conflicts() {
    let app = test_app!(test_state(None));

    assert_eq!(
        register(&app, "alice", "pw123").await.status(),
        StatusCode::CREATED
    );
    let resp = register(&app, "alice", "other").await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // The original password still works
    assert_eq!(login(&app, "alice", "pw123").await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_bad_credentials() {
    let app = test_app!(test_state(None));
    bearer(&app, "alice").await;

    let resp = login(&app, "alice", "wrong").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let resp = login(&app, "mallory", "pw123").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_validation_errors() {
    let app = test_app!(test_state(None));
    let auth = bearer(&app, "alice").await;

    let resp = create_task(&app, &auth, json!({ "title": "   " })).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 422);

    let resp = create_task(&app, &auth, json!({ "description": "no title" })).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let resp = create_task(&app, &auth, json!({ "title": "x".repeat(256) })).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::get()
        .uri("/tasks/abc")
        .insert_header((header::AUTHORIZATION, auth.as_str()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(json!({ "username": "bob" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn test_tasks_are_scoped_to_owner() {
    let app = test_app!(test_state(None));
    let alice = bearer(&app, "alice").await;
    let bob = bearer(&app, "bob").await;

    let resp = create_task(&app, &alice, json!({ "title": "Alice's task" })).await;
    let task: Value = test::read_body_json(resp).await;
    let uri = format!("/tasks/{}", task["id"]);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header((header::AUTHORIZATION, bob.as_str()))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header((header::AUTHORIZATION, bob.as_str()))
        .set_json(json!({ "completed": true }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header((header::AUTHORIZATION, bob.as_str()))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );

    let req = test::TestRequest::get()
        .uri("/tasks/")
        .insert_header((header::AUTHORIZATION, bob.as_str()))
        .to_request();
    let list: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(list, json!([]));

    // Alice's task survived Bob's attempts
    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header((header::AUTHORIZATION, alice.as_str()))
        .to_request();
    let fetched: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched["completed"], false);
}

#[actix_web::test]
async fn test_markup_is_escaped() {
    let app = test_app!(test_state(None));
    let auth = bearer(&app, "alice").await;

    let resp = create_task(
        &app,
        &auth,
        json!({
            "title": "<script>alert(1)</script>",
            "description": "<img src=x onerror=\"steal()\">"
        }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let task: Value = test::read_body_json(resp).await;
    assert_eq!(task["title"], "&lt;script&gt;alert(1)&lt;/script&gt;");
    assert_eq!(
        task["description"],
        "&lt;img src=x onerror=&quot;steal()&quot;&gt;"
    );
}

#[actix_web::test]
async fn test_list_limit() {
    let app = test_app!(test_state(None));
    let auth = bearer(&app, "alice").await;

    for title in ["one", "two", "three"] {
        let resp = create_task(&app, &auth, json!({ "title": title })).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::get()
        .uri("/tasks/?limit=2")
        .insert_header((header::AUTHORIZATION, auth.as_str()))
        .to_request();
    let list: Value = test::call_and_read_body_json(&app, req).await;
    let titles: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["one", "two"]);

    let req = test::TestRequest::get()
        .uri("/tasks")
        .insert_header((header::AUTHORIZATION, auth.as_str()))
        .to_request();
    let list: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(list.as_array().unwrap().len(), 3);
}

#[actix_web::test]
async fn test_health() {
    let app = test_app!(test_state(None));

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
}

#[cfg(feature = "rate-limit")]
#[actix_web::test]
async fn test_login_is_rate_limited() {
    use todo_infra::{InMemoryRateLimiter, RateLimitConfig};

    let limiter = InMemoryRateLimiter::new(RateLimitConfig {
        max_requests: 2,
        window: Duration::from_secs(60),
    });
    let app = test_app!(test_state(Some(Arc::new(limiter))));

    assert_eq!(
        login(&app, "nobody", "pw").await.status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        login(&app, "nobody", "pw").await.status(),
        StatusCode::UNAUTHORIZED
    );

    let resp = login(&app, "nobody", "pw").await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(resp.headers().contains_key("retry-after"));

    // Task routes are not limited
    let req = test::TestRequest::get().uri("/health").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}
