//! API server: reads configuration, prepares the database, serves the routes.

use restaurant_api::{
    apply_migrations, app, connect, ensure_database_exists, AppConfig, AppState, JwtService, PgRevocationStore,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("restaurant_api=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    ensure_database_exists(&config.database_url).await?;
    let pool = connect(&config.database_url, config.max_connections).await?;
    apply_migrations(&pool).await?;

    let revoked = Arc::new(PgRevocationStore::new(pool.clone()));
    let state = AppState::new(pool, JwtService::new(config.jwt.clone()), revoked);
    let router = app(state, &config);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, prefix = %config.api_prefix, "listening");
    axum::serve(listener, router).await?;
    Ok(())
}
