use anyhow::Result;
use infohub::{GatewayConfig, logging, web};

#[tokio::main]
async fn main() -> Result<()> {
    let config = GatewayConfig::load()?;
    logging::init_logging(&config.logging);
    tracing::debug!("Loaded configuration: {:?}", config);

    web::run(&config).await
}
