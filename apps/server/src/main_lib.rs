use std::sync::Arc;
use std::time::Duration;

use anchorcast_core::catalog::{default_seed, parse_seed};
use anchorcast_core::{HubSettings, ProtocolDispatcher, RelayHub};
use anyhow::Context;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub struct AppState {
    pub hub: Arc<RelayHub>,
    pub dispatcher: ProtocolDispatcher,
    pub reshuffle_interval: Duration,
}

pub fn init_tracing() {
    let log_format = std::env::var("AR_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let seed = match &config.catalog_file {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read catalog file {}", path.display()))?;
            let seed = parse_seed(&raw)
                .with_context(|| format!("Failed to parse catalog file {}", path.display()))?;
            tracing::info!("Loaded {} models from {}", seed.len(), path.display());
            seed
        }
        None => default_seed(),
    };

    let hub = Arc::new(RelayHub::new(
        seed,
        HubSettings {
            activation_threshold: config.activation_threshold,
        },
    ));
    let dispatcher = ProtocolDispatcher::new(hub.clone());

    Ok(Arc::new(AppState {
        hub,
        dispatcher,
        reshuffle_interval: config.reshuffle_interval,
    }))
}
