use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gift_shop_admin::config::Config;
use gift_shop_admin::proxy;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // load environment variables
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;
    let bind_address = config.bind_address();
    let app = proxy::router(&config).context("failed to build the upstream client")?;

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {}", bind_address))?;
    info!("Proxy server running on http://{}", bind_address);
    info!("Proxying requests to: {}", config.upstream_url);
    info!(origins = ?config.allowed_origins, "CORS enabled");

    axum::serve(listener, app).await?;
    Ok(())
}
