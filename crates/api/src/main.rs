use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lenderoo_api::config::ServerConfig;
use lenderoo_api::router::build_app_router;
use lenderoo_api::state::AppState;
use lenderoo_db::auth::StaticAuthProvider;
use lenderoo_db::object_storage::FileObjectStorage;
use lenderoo_db::remote::PgRemoteStore;
use lenderoo_services::lending::LendingService;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lenderoo_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = lenderoo_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    lenderoo_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    lenderoo_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    let auth = match &config.user_id {
        Some(user_id) => StaticAuthProvider::signed_in(user_id.clone(), config.user_email.clone()),
        None => {
            tracing::warn!("LENDEROO_USER_ID is not set, every request will be unauthenticated");
            StaticAuthProvider::signed_out()
        }
    };

    tracing::info!(dir = %config.files_dir.display(), "Serving item images from disk");
    let lending = LendingService::new(
        Arc::new(PgRemoteStore::new(pool.clone())),
        Arc::new(auth),
        Arc::new(FileObjectStorage::new(
            config.files_dir.clone(),
            config.files_base_url.clone(),
        )),
        config.status_config(),
    );

    let addr = SocketAddr::new(
        config.host.parse().expect("HOST must be a valid IP address"),
        config.port,
    );

    let state = AppState {
        lending,
        pool: Some(pool),
        config: Arc::new(config),
    };
    let app = build_app_router(state);

    tracing::info!("Starting server on {addr}");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}
