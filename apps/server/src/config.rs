use std::{net::SocketAddr, path::PathBuf, time::Duration};

use anyhow::{bail, Context};

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_RESHUFFLE_INTERVAL_SECS: u64 = 20;
pub const DEFAULT_STATUS_INTERVAL_SECS: u64 = 30;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub cors_allow: Vec<String>,
    pub activation_threshold: usize,
    pub reshuffle_interval: Duration,
    /// `None` disables the periodic status report.
    pub status_interval: Option<Duration>,
    /// JSON array of `{ id, name, url }`; the built-in set is used when unset.
    pub catalog_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            cors_allow: vec!["*".to_string()],
            activation_threshold: anchorcast_core::mapping::DEFAULT_ACTIVATION_THRESHOLD,
            reshuffle_interval: Duration::from_secs(DEFAULT_RESHUFFLE_INTERVAL_SECS),
            status_interval: Some(Duration::from_secs(DEFAULT_STATUS_INTERVAL_SECS)),
            catalog_file: None,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let listen_addr: SocketAddr = std::env::var("AR_LISTEN_ADDR")
            .unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string())
            .parse()
            .context("Invalid AR_LISTEN_ADDR")?;
        let cors_allow = std::env::var("AR_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let activation_threshold =
            env_number("AR_MAPPING_THRESHOLD", defaults.activation_threshold as u64)? as usize;
        if activation_threshold == 0 {
            bail!("AR_MAPPING_THRESHOLD must be at least 1");
        }
        let reshuffle_secs =
            env_number("AR_RESHUFFLE_INTERVAL_SECS", DEFAULT_RESHUFFLE_INTERVAL_SECS)?;
        if reshuffle_secs == 0 {
            bail!("AR_RESHUFFLE_INTERVAL_SECS must be at least 1");
        }
        let status_secs = env_number("AR_STATUS_INTERVAL_SECS", DEFAULT_STATUS_INTERVAL_SECS)?;
        let catalog_file = std::env::var("AR_CATALOG_FILE")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            listen_addr,
            cors_allow,
            activation_threshold,
            reshuffle_interval: Duration::from_secs(reshuffle_secs),
            status_interval: (status_secs > 0).then(|| Duration::from_secs(status_secs)),
            catalog_file,
        })
    }
}

fn env_number(key: &str, default: u64) -> anyhow::Result<u64> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {key}: '{raw}'")),
        Err(_) => Ok(default),
    }
}
