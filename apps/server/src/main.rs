use anchorcast_server::{api::app_router, build_state, config::Config, init_tracing, scheduler};
use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing();
    let state = build_state(&config).await?;

    if let Some(period) = config.status_interval {
        scheduler::start_status_reporter(state.hub.clone(), period);
    }

    let router = app_router(state, &config);
    // A busy port is fatal; there is nothing to recover to.
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    tracing::info!("WebSocket relay listening on ws://{}", config.listen_addr);
    axum::serve(listener, router).await?;
    Ok(())
}
