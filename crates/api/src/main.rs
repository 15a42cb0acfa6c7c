use anyhow::Context;

use upkeep_api::app::{AppServices, build_app};
use upkeep_api::config::ServiceConfig;
use upkeep_observability::LogFormat;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    upkeep_observability::init(LogFormat::from_env());

    let config = ServiceConfig::from_env().context("invalid configuration")?;
    let services = AppServices::from_config(&config).context("failed to start classifier worker")?;

    let app = build_app(services.clone());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("server error")?;

    services.shutdown();
    tracing::info!("shut down");
    Ok(())
}
