use std::net::SocketAddr;
use std::sync::Arc;

use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use driver_locator::{
    config::{Config, StoreConfig},
    db,
    routes, AppState, DriverStore,
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "driver_locator=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().expect("Invalid configuration");
    tracing::info!("Starting server at {}", config.server_addr());

    let store = open_store(&config.store).await;
    tracing::info!(store = store.kind(), "Driver store ready");

    let state = AppState { store };

    let app = routes::create_app(state, &config).expect("Invalid rate limit settings");

    // Start server with socket address for rate limiting
    let addr: SocketAddr = config.server_addr().parse().expect("Invalid address");
    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}

async fn open_store(store: &StoreConfig) -> DriverStore {
    match store {
        StoreConfig::Database { url } => {
            let conn = db::connect(url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Connected to database");

            migration::Migrator::up(&conn, None)
                .await
                .expect("Failed to run migrations");
            tracing::info!("Migrations complete");

            DriverStore::Database(Arc::new(conn))
        }
        StoreConfig::File { path } => DriverStore::load_file(path)
            .await
            .expect("Failed to load drivers file"),
    }
}
