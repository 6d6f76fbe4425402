/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup (skipped cleanly when DATABASE_URL is unset)
/// - Router construction with a recording mail dispatcher
/// - Request helpers driving the router in-process
/// - User registration/login shortcuts

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use tickdesk_api::app::{build_router, AppState};
use tickdesk_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig, MailConfig};
use tickdesk_shared::db::migrations::run_migrations;
use tickdesk_shared::notify::MockDispatcher;

/// Signing secret used by every test context
pub const TEST_JWT_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: sqlx::PgPool,
    pub app: Router,
    pub dispatcher: MockDispatcher,
}

impl TestContext {
    /// Creates a test context against the database named by DATABASE_URL
    ///
    /// Returns None when DATABASE_URL is unset so suites can skip instead
    /// of failing on machines without a test database.
    pub async fn try_new() -> Option<Self> {
        dotenvy::dotenv().ok();

        let url = std::env::var("DATABASE_URL").ok()?;

        let db = sqlx::PgPool::connect(&url)
            .await
            .expect("failed to connect to test database");

        run_migrations(&db).await.expect("failed to run migrations");

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            database: DatabaseConfig {
                url,
                max_connections: 5,
            },
            jwt: JwtConfig {
                secret: TEST_JWT_SECRET.to_string(),
            },
            mail: MailConfig {
                endpoint: "http://mail.invalid".to_string(),
                sender: "noreply@tickdesk.test".to_string(),
                server_token: "test-token".to_string(),
            },
        };

        let dispatcher = MockDispatcher::new();
        let state = AppState::new(db.clone(), config, Arc::new(dispatcher.clone()));
        let app = build_router(state);

        Some(Self {
            db,
            app,
            dispatcher,
        })
    }
}

/// Generates an email no other test run will have used
pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.org", prefix, Uuid::new_v4())
}

/// Drives one request through the router, returning status and parsed body
pub async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("request should not fail at the transport level");

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, value)
}

/// Registers a user, asserting success
pub async fn register_user(ctx: &TestContext, name: &str, email: &str, password: &str) {
    let (status, body) = request(
        &ctx.app,
        "POST",
        "/v1/auth/register",
        None,
        Some(serde_json::json!({
            "name": name,
            "email": email,
            "phone": "5551234567",
            "password": password,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
    assert_eq!(body["success"], true);
}

/// Logs in, asserting success, and returns the session token
pub async fn login_user(ctx: &TestContext, email: &str, password: &str) -> String {
    let (status, body) = request(
        &ctx.app,
        "POST",
        "/v1/auth/login",
        None,
        Some(serde_json::json!({ "email": email, "password": password })),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    assert_eq!(body["success"], true);

    body["token"].as_str().expect("login should return a token").to_string()
}
