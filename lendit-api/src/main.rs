//! # Lendit API Server
//!
//! The API server for Lendit, a peer-to-peer rental marketplace: users list
//! items, other users form rental contracts on them, and role-based access
//! control gates who can see or mutate what.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/lendit \
//! JWT_SECRET=$(openssl rand -hex 32) \
//! cargo run -p lendit-api
//! ```

use lendit_api::{app, config::Config, seed};
use lendit_shared::db::{migrations, pool};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lendit_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Lendit API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    migrations::run_migrations(&db).await?;

    let state = app::AppState::new(db, config.clone());

    if config.seed_data {
        seed::run(&state).await?;
    }

    let router = app::build_router(state);

    let listener = TcpListener::bind(config.bind_address()).await?;
    tracing::info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router).await?;

    Ok(())
}
