use anyhow::Result;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use daybook::config::AppConfig;
use daybook::{create_router, initialize_backend};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;

    // RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let app_state = initialize_backend(&config)?;
    let app = create_router(app_state);

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!("Daybook listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
