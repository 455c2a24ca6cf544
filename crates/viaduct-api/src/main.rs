//! Viaduct API server binary

use viaduct_api::{start_server, AppState};
use viaduct_core::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("viaduct_swap=debug".parse()?)
                .add_directive("viaduct_api=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .init();

    let config = match std::env::var("VIADUCT_CONFIG") {
        Ok(path) => AppConfig::from_file(&path)?,
        Err(_) => AppConfig::default(),
    };

    tracing::info!("Starting Viaduct");

    let port = config.api_port;
    let state = AppState::with_config(config);
    start_server(state, port).await?;

    Ok(())
}
