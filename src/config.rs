use std::path::PathBuf;
use std::time::Duration;

use tracing::trace;

/// Readings store backend configuration
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StoreConfig {
    /// In-memory store (no persistence, mainly for demos and tests)
    Memory,

    /// SQLite database written by the ingestion side (default)
    Sqlite {
        /// Path to the SQLite database file
        #[serde(default = "default_sqlite_path")]
        path: PathBuf,
    },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Sqlite {
            path: default_sqlite_path(),
        }
    }
}

fn default_sqlite_path() -> PathBuf {
    PathBuf::from("./readings.db")
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub broker: BrokerConfig,

    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Readings store configuration (optional - defaults to SQLite)
    pub store: Option<StoreConfig>,
}

/// MQTT broker endpoint and credentials
#[derive(Debug, Clone, serde::Deserialize)]
pub struct BrokerConfig {
    pub host: String,
    #[serde(default = "default_broker_port")]
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Client identifier presented to the broker
    #[serde(default = "default_client_id")]
    pub client_id: String,
    pub tls: Option<TlsConfig>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct TlsConfig {
    /// Path to the CA certificate (PEM)
    pub ca_path: PathBuf,

    /// Verify the broker certificate against the CA.
    ///
    /// Defaults to true. Disabling this reproduces legacy deployments that
    /// connected with verification off, and must be an explicit choice.
    #[serde(default = "default_verify_certificates")]
    pub verify_certificates: bool,
}

fn default_broker_port() -> u16 {
    1883
}

fn default_client_id() -> String {
    String::from("vigia-monitor")
}

fn default_verify_certificates() -> bool {
    true
}

/// Evaluation loop configuration
#[derive(Debug, Clone, serde::Deserialize)]
pub struct MonitorConfig {
    /// Seconds between evaluation cycles
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Trailing aggregation window in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// How to treat measurements without a configured bound
    #[serde(default)]
    pub absent_bounds: AbsentBoundPolicy,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            window_secs: default_window_secs(),
            absent_bounds: AbsentBoundPolicy::default(),
        }
    }
}

impl MonitorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.window_secs as i64)
    }
}

/// Policy for bounds a measurement does not configure.
///
/// `ZeroSubstitute` keeps the historical behavior: a missing bound compares
/// as 0, so a measurement without a max falsely alerts on any positive mean.
/// `Unbounded` disables the missing side instead. The default stays on the
/// historical behavior so that switching is a deliberate operator decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsentBoundPolicy {
    #[default]
    ZeroSubstitute,
    Unbounded,
}

fn default_interval_secs() -> u64 {
    300
}

fn default_window_secs() -> u64 {
    3600
}

pub fn read_config_file(path: &str) -> anyhow::Result<Config> {
    let file_content = std::fs::read_to_string(path)?;
    serde_json::from_str(&file_content)
        .map_err(|_| anyhow::anyhow!("Invalid configuration file provided!"))
        .inspect(|config| trace!("loaded config: {config:?}"))
}
