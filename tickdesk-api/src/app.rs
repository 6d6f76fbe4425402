/// Application state and router builder
///
/// This module defines the shared application state and provides a function
/// to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tickdesk_api::{app::AppState, config::Config};
/// use tickdesk_shared::notify::MockDispatcher;
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config, Arc::new(MockDispatcher::new()));
/// let app = tickdesk_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tickdesk_shared::auth::middleware::{authenticate, AuthContext};
use tickdesk_shared::notify::NotificationDispatcher;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; the inner
/// pieces are `Arc`s or pool handles, so clones are cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration, immutable after startup
    pub config: Arc<Config>,

    /// Out-of-band notification dispatcher
    pub dispatcher: Arc<dyn NotificationDispatcher>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config, dispatcher: Arc<dyn NotificationDispatcher>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            dispatcher,
        }
    }

    /// Gets the signing secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                       # Health check (public)
/// └── /v1/
///     ├── /auth/
///     │   ├── POST /register        # public
///     │   ├── POST /login           # public
///     │   ├── POST /verify-otp      # public
///     │   ├── POST /forget-password # public
///     │   ├── POST /reset-password  # public
///     │   ├── GET  /verify-token    # inspects its own header
///     │   └── POST /change-password # bearer
///     ├── /tickets/                 # bearer
///     │   ├── GET    /
///     │   ├── POST   /
///     │   ├── PUT    /:id
///     │   └── DELETE /:id
///     └── /users/                   # bearer + admin
///         ├── POST /list
///         └── GET  /toggle-status
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public; verify-token inspects its own header so it can
    // report an invalid token in a 200 body instead of failing)
    let auth_public = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/verify-otp", post(routes::auth::verify_otp))
        .route("/forget-password", post(routes::auth::forget_password))
        .route("/reset-password", post(routes::auth::reset_password))
        .route("/verify-token", get(routes::auth::verify_token));

    let auth_protected = Router::new()
        .route("/change-password", post(routes::auth::change_password))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Ticket routes (require bearer authentication)
    let ticket_routes = Router::new()
        .route("/", get(routes::tickets::list_tickets))
        .route("/", post(routes::tickets::create_ticket))
        .route("/:id", put(routes::tickets::update_ticket))
        .route("/:id", delete(routes::tickets::delete_ticket))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // User management routes (bearer; admin role checked in handlers)
    let user_routes = Router::new()
        .route("/list", post(routes::users::list_users))
        .route("/toggle-status", get(routes::users::toggle_user_status))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let v1_routes = Router::new()
        .nest("/auth", auth_public.merge(auth_protected))
        .nest("/tickets", ticket_routes)
        .nest("/users", user_routes);

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bearer authentication middleware layer
///
/// Extracts and validates the session token from the Authorization header,
/// then injects [`AuthContext`] into request extensions. Missing headers
/// and invalid tokens both fail 401 here.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_context: AuthContext = authenticate(req.headers(), state.jwt_secret())?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
