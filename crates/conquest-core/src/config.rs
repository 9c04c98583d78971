//! Configuration loading and typed config structures for the Conquest
//! simulation.
//!
//! The configuration lives in `conquest-config.yaml` at the project root.
//! Every field has a default, so a missing file or a partial file both work.
//!
//! ```yaml
//! world:
//!   tick_interval_ms: 1000
//!   grid_width: 20
//!   grid_height: 20
//!   region_size: 3
//! economy:
//!   starting_ap: 100
//!   costs: { attack: 10, fortify: 5, upgrade: 100 }
//! infrastructure:
//!   store: dragonfly
//!   dragonfly_url: redis://localhost:6379
//!   observer_port: 8080
//!   store_timeout_ms: 500
//! logging:
//!   level: info
//! simulation:
//!   max_ticks: 0
//!   max_consecutive_failures: 0
//! ```

use std::path::Path;

use conquest_rules::ActionCosts;
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Grid shape and tick timing.
    #[serde(default)]
    pub world: WorldConfig,

    /// AP economy.
    #[serde(default)]
    pub economy: EconomyConfig,

    /// Store and observer settings.
    #[serde(default)]
    pub infrastructure: InfrastructureConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Run boundaries.
    #[serde(default)]
    pub simulation: SimulationBoundsConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values for infrastructure:
    /// - `DRAGONFLY_URL` (or `REDIS_URL`) overrides `infrastructure.dragonfly_url`
    /// - `OBSERVER_PORT` (or `PORT`) overrides `infrastructure.observer_port`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply env overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.infrastructure.apply_env_overrides();
        Ok(config)
    }
}

/// Grid shape and tick timing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Real-time milliseconds between ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Grid columns.
    #[serde(default = "default_grid_size")]
    pub grid_width: u32,

    /// Grid rows.
    #[serde(default = "default_grid_size")]
    pub grid_height: u32,

    /// Side length of each faction's starting corner region.
    #[serde(default = "default_region_size")]
    pub region_size: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            grid_width: default_grid_size(),
            grid_height: default_grid_size(),
            region_size: default_region_size(),
        }
    }
}

/// AP economy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EconomyConfig {
    /// AP granted to a newly joined player.
    #[serde(default = "default_starting_ap")]
    pub starting_ap: u64,

    /// Per-action costs.
    #[serde(default)]
    pub costs: ActionCosts,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_ap: default_starting_ap(),
            costs: ActionCosts::default(),
        }
    }
}

/// Which [`StateStore`](conquest_db::StateStore) backs the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreMode {
    /// Dragonfly / Redis via `infrastructure.dragonfly_url`.
    #[default]
    Dragonfly,
    /// In-process store; state is lost on exit.
    Memory,
}

/// Store and observer settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InfrastructureConfig {
    /// Store backend.
    #[serde(default)]
    pub store: StoreMode,

    /// Dragonfly (Redis-compatible) URL.
    #[serde(default = "default_dragonfly_url")]
    pub dragonfly_url: String,

    /// Observer HTTP port.
    #[serde(default = "default_observer_port")]
    pub observer_port: u16,

    /// Upper bound on any single store call made by the tick engine.
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,
}

impl InfrastructureConfig {
    /// Override infrastructure settings with environment variables when set.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// The first variable listed for a setting wins. An unparsable port is
    /// ignored.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("DRAGONFLY_URL").or_else(|| lookup("REDIS_URL")) {
            self.dragonfly_url = url;
        }
        let port = lookup("OBSERVER_PORT").or_else(|| lookup("PORT"));
        if let Some(raw) = port {
            match raw.parse::<u16>() {
                Ok(port) => self.observer_port = port,
                Err(e) => tracing::warn!(value = %raw, error = %e, "Ignoring invalid port override"),
            }
        }
    }
}

impl Default for InfrastructureConfig {
    fn default() -> Self {
        Self {
            store: StoreMode::default(),
            dragonfly_url: default_dragonfly_url(),
            observer_port: default_observer_port(),
            store_timeout_ms: default_store_timeout_ms(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is unset (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Run boundaries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationBoundsConfig {
    /// Stop after this many ticks (0 = unlimited).
    #[serde(default)]
    pub max_ticks: u64,

    /// Abort after this many failed ticks in a row (0 = never).
    #[serde(default)]
    pub max_consecutive_failures: u32,
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_tick_interval_ms() -> u64 {
    1000
}

const fn default_grid_size() -> u32 {
    20
}

const fn default_region_size() -> u32 {
    3
}

const fn default_starting_ap() -> u64 {
    100
}

fn default_dragonfly_url() -> String {
    "redis://localhost:6379".to_owned()
}

const fn default_observer_port() -> u16 {
    8080
}

const fn default_store_timeout_ms() -> u64 {
    500
}

fn default_log_level() -> String {
    "info".to_owned()
}
