//! Equipment Status Server
//!
//! REST API exposing factory equipment operating status.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use equipment_status_server::{
    api,
    config::{AppConfig, LoggingConfig},
    repository::{DocumentStore, Repository, StaticCatalog},
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize tracing; the guard flushes the log file on exit
    let _log_guard = init_tracing(&config.logging);

    tracing::info!("Starting Equipment Status Server v{}", env!("CARGO_PKG_VERSION"));

    // Fallback catalog
    let catalog = match config.catalog.path {
        Some(ref path) => {
            tracing::info!("Loading equipment catalog from {}", path.display());
            StaticCatalog::from_file(path)?
        }
        None => StaticCatalog::sample()?,
    };

    // Document store; stays disconnected when credentials are absent
    let store = DocumentStore::from_config(&config.cosmos);

    // Create repository and services
    let repository = Repository::new(catalog, store);
    let services = Services::new(repository);

    // Create application state
    let state = AppState {
        services: Arc::new(services),
    };

    // Build router
    let app = api::router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("equipment_status_server={},tower_http=debug", logging.level).into()
    });

    let json = logging.format.eq_ignore_ascii_case("json");

    let (file_layer, guard) = match logging.directory {
        Some(ref directory) => {
            let appender = tracing_appender::rolling::daily(directory, "equipment-status.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(|| fmt::layer()))
        .with(file_layer)
        .init();

    guard
}
