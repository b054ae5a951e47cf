//! Copy on-device Lenderoo data into the remote store.
//!
//! Usage: `lenderoo-migrate [--clear]`. With `--clear`, local data is
//! removed once the migration has completed.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lenderoo_db::auth::StaticAuthProvider;
use lenderoo_db::local::FileLocalStore;
use lenderoo_db::remote::PgRemoteStore;
use lenderoo_services::config::MigrationConfig;
use lenderoo_services::migration::Migrator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lenderoo_services=info,lenderoo_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let clear = std::env::args().skip(1).any(|arg| arg == "--clear");
    let config = MigrationConfig::from_env()?;
    tracing::info!(path = %config.local_store_path.display(), "Loaded migration configuration");

    let pool = lenderoo_db::create_pool(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    lenderoo_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database ready");

    let migrator = Migrator::new(
        Arc::new(FileLocalStore::new(&config.local_store_path)),
        Arc::new(PgRemoteStore::new(pool)),
        Arc::new(StaticAuthProvider::signed_in(
            config.user_id.clone(),
            config.user_email.clone(),
        )),
    );

    let report = migrator.migrate_local_data().await;
    println!("{}", serde_json::to_string_pretty(&report)?);
    if !report.success {
        anyhow::bail!(
            "migration failed: {}",
            report.error.as_deref().unwrap_or("unknown error")
        );
    }

    if clear {
        migrator.clear_local_data_after_migration().await?;
    }
    Ok(())
}
