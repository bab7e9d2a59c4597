/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use todo_api::{app::{build_router, AppState}, config::Config};
/// use todo_shared::{db::pool::create_pool, store::PgStore};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(config.pool_config()).await?;
/// let state = AppState::new(Arc::new(PgStore::new(pool)), config);
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, routes};
use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::{sync::Arc, time::Duration};
use todo_shared::{
    auth::{jwt::TokenIssuer, middleware::require_access_token},
    store::Store,
};
use tower_http::{
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Every field is reference-counted, so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Account and todo persistence
    pub store: Arc<dyn Store>,

    /// Application configuration
    pub config: Arc<Config>,

    /// Issues and verifies tokens with the configured secret
    pub tokens: TokenIssuer,
}

impl AppState {
    /// Creates new application state
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        let tokens = config.token_issuer();

        Self {
            store,
            config: Arc::new(config),
            tokens,
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// └── /api/v1/
///     ├── /authentication/             # Public
///     │   ├── POST /sign-up
///     │   ├── POST /sign-in
///     │   └── POST /refresh-token
///     ├── /account/                    # Access token required
///     │   ├── GET /user/:id
///     │   └── GET /users
///     └── /todo/                       # Access token required
///         ├── GET    /ping
///         ├── GET    /my/todos
///         ├── POST   /add
///         ├── DELETE /remove/:id
///         ├── GET    /:id
///         └── PUT    /toggle/:id
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. Request timeout (tower-http TimeoutLayer)
/// 3. Access-token gate (account and todo groups only)
pub fn build_router(state: AppState) -> Router {
    let authentication_routes = Router::new()
        .route("/sign-up", post(routes::authentication::sign_up))
        .route("/sign-in", post(routes::authentication::sign_in))
        .route("/refresh-token", post(routes::authentication::refresh_token));

    let account_routes = Router::new()
        .route("/user/:id", get(routes::account::user_info))
        .route("/users", get(routes::account::users_info))
        .route_layer(middleware::from_fn_with_state(
            state.tokens.clone(),
            require_access_token,
        ));

    let todo_routes = Router::new()
        .route("/ping", get(routes::todo::ping))
        .route("/my/todos", get(routes::todo::my_todos))
        .route("/add", post(routes::todo::add_todo))
        .route("/remove/:id", delete(routes::todo::remove_todo))
        .route("/:id", get(routes::todo::get_todo))
        .route("/toggle/:id", put(routes::todo::toggle_todo))
        .route_layer(middleware::from_fn_with_state(
            state.tokens.clone(),
            require_access_token,
        ));

    let v1_routes = Router::new()
        .nest("/authentication", authentication_routes)
        .nest("/account", account_routes)
        .nest("/todo", todo_routes);

    let timeout = Duration::from_secs(state.config.api.request_timeout_secs);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api/v1", v1_routes)
        .layer(TimeoutLayer::new(timeout))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
