//! Goldapp API server entry point

use std::sync::Arc;

use goldapp::api;
use goldapp::config::Settings;
use goldapp::service::Service;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::load()?;
    info!("⚙️ Configuration loaded: {}", settings.digest());

    let service = Arc::new(Service::from_settings(&settings));
    api::start_server(service, &settings.bind_addr).await
}
