//! Wipe the database and load demo data.

use restaurant_api::{apply_migrations, connect, ensure_database_exists, seed, AppConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("restaurant_api=info,seed=info")))
        .init();

    let config = AppConfig::from_env()?;
    ensure_database_exists(&config.database_url).await?;
    let pool = connect(&config.database_url, config.max_connections).await?;
    apply_migrations(&pool).await?;

    let report = seed::seed(&pool).await?;
    tracing::info!(
        customers = report.customers,
        tables = report.tables,
        menu_items = report.menu_items,
        reservations = report.reservations,
        orders = report.orders,
        admin = seed::ADMIN_EMAIL,
        staff = seed::STAFF_EMAIL,
        "database seeded"
    );
    Ok(())
}
