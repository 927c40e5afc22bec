/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use lendit_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = lendit_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
    routing::{delete, get, patch, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::Config;
use lendit_shared::auth::authorization::{AllowAll, ChangePolicy};
use lendit_shared::auth::{jwt, middleware::AuthContext};
use lendit_shared::services::{contracts::ContractService, items::ItemService};

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Contract lifecycle service
    pub contracts: ContractService,

    /// Item listing service
    pub items: ItemService,
}

impl AppState {
    /// Creates application state with the reference allow-all change policy
    pub fn new(db: PgPool, config: Config) -> Self {
        Self::with_policy(db, config, Arc::new(AllowAll))
    }

    /// Creates application state with an injected change policy
    ///
    /// This is the seam for swapping in a real ownership/role policy.
    pub fn with_policy(db: PgPool, config: Config, policy: Arc<dyn ChangePolicy>) -> Self {
        let contracts = ContractService::new(db.clone(), Arc::clone(&policy));
        let items = ItemService::new(db.clone(), policy);

        Self {
            db,
            config: Arc::new(config),
            contracts,
            items,
        }
    }

    /// Gets the JWT secret for token operations
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
/// ├── /health                          # Health check (public)
/// ├── /auth/                           # register / login / refresh (public)
/// ├── /contracts/                      # contract lifecycle (authenticated)
/// │   ├── GET    /contracts            # ADMIN
/// │   ├── GET    /contract/:id
/// │   ├── POST   /new/:item_id
/// │   ├── PUT    /contract/:id
/// │   ├── PATCH  /contract/agree/:id
/// │   ├── PATCH  /contract/:id         # ADMIN/LENDER/USER
/// │   └── DELETE /contract/:id         # ADMIN/LENDER
/// ├── /items/                          # item listings (authenticated)
/// ├── /users/                          # user lookups (ADMIN)
/// └── /roles/                          # role management (ADMIN)
/// ```
///
/// # Middleware Stack
///
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. JWT authentication on every non-public route
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    let contract_routes = Router::new()
        .route("/contracts", get(routes::contracts::list_all_contracts))
        .route("/contract/:id", get(routes::contracts::get_contract_by_id))
        .route("/new/:item_id", post(routes::contracts::add_new_contract))
        .route("/contract/:id", put(routes::contracts::replace_contract))
        .route("/contract/agree/:id", patch(routes::contracts::agree_contract))
        .route("/contract/:id", patch(routes::contracts::update_contract))
        .route("/contract/:id", delete(routes::contracts::delete_contract))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let item_routes = Router::new()
        .route("/items", get(routes::items::list_all_items))
        .route("/item/:id", get(routes::items::get_item_by_id))
        .route("/item/name/:name", get(routes::items::get_item_by_name))
        .route("/item/name/like/:fragment", get(routes::items::get_items_like_name))
        .route("/item", post(routes::items::add_new_item))
        .route("/item/:id", put(routes::items::replace_item))
        .route("/item/:id", patch(routes::items::update_item))
        .route("/item/:id", delete(routes::items::delete_item))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let user_routes = Router::new()
        .route("/users", get(routes::users::list_all_users))
        .route("/user/:id", get(routes::users::get_user_by_id))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let role_routes = Router::new()
        .route("/roles", get(routes::roles::list_all_roles))
        .route("/role/:id", get(routes::roles::get_role_by_id))
        .route("/role", post(routes::roles::add_new_role))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    Router::new()
        .merge(health_routes)
        .nest("/auth", auth_routes)
        .nest("/contracts", contract_routes)
        .nest("/items", item_routes)
        .nest("/users", user_routes)
        .nest("/roles", role_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Extracts and validates the Bearer token from the Authorization header,
/// then injects an [`AuthContext`] into request extensions.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Missing authorization header".to_string())
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        crate::error::ApiError::BadRequest("Expected Bearer token".to_string())
    })?;

    let claims = jwt::validate_access_token(token, state.jwt_secret())?;

    let auth_context = AuthContext::from_claims(&claims);
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
