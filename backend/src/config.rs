//! Service configuration.
//!
//! Settings are read from a TOML file and then overridden by environment
//! variables. Every field has a default, so running without a file is fine.
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//!
//! [report]
//! length_policy = "longest"   # or "shortest"
//! render_timeout_secs = 30
//!
//! [charts]
//! gap_policy = "skip"         # or "interpolate"
//! width = 1200
//! height = 400
//! ```

use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::report::chart::{ChartOptions, GapPolicy};
use crate::services::LengthPolicy;

/// File name searched for by [`ReportConfig::load`].
pub const CONFIG_FILE_NAME: &str = "report.toml";
/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "BP_MONITOR_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {message}")]
    Invalid { key: String, message: String },
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_body_limit() -> usize {
    10 * 1024 * 1024
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

/// Report assembly settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSettings {
    #[serde(default)]
    pub length_policy: LengthPolicy,
    /// Upper bound for chart and document rendering per request
    #[serde(default = "default_render_timeout")]
    pub render_timeout_secs: u64,
}

fn default_render_timeout() -> u64 {
    30
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            length_policy: LengthPolicy::default(),
            render_timeout_secs: default_render_timeout(),
        }
    }
}

/// Full service configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub report: ReportSettings,
    #[serde(default)]
    pub charts: ChartOptions,
}

impl ReportConfig {
    /// Parse a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Look for [`CONFIG_FILE_NAME`] in the usual places.
    ///
    /// Searches the current directory, `backend/` and the parent directory.
    /// Returns `Ok(None)` when no file exists.
    pub fn from_default_location() -> Result<Option<Self>, ConfigError> {
        let search_paths = [
            PathBuf::from(CONFIG_FILE_NAME),
            PathBuf::from("backend").join(CONFIG_FILE_NAME),
            PathBuf::from("..").join(CONFIG_FILE_NAME),
        ];

        for path in search_paths {
            if path.exists() {
                info!("Loading configuration from {}", path.display());
                return Self::from_file(&path).map(Some);
            }
        }
        Ok(None)
    }

    /// Resolve the configuration for the running process.
    ///
    /// # Environment Variables
    /// - `BP_MONITOR_CONFIG`: explicit config file (otherwise the default locations are searched)
    /// - `HOST`, `PORT`: listener address
    /// - `RENDER_TIMEOUT_SECS`: rendering timeout
    /// - `LENGTH_POLICY`: `longest` | `shortest`
    /// - `GAP_POLICY`: `skip` | `interpolate`
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::from_default_location()?.unwrap_or_else(|| {
                info!("No {} found; using defaults", CONFIG_FILE_NAME);
                Self::default()
            }),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from `lookup` (normally the process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = parse_override("PORT", &port)?;
        }
        if let Some(timeout) = lookup("RENDER_TIMEOUT_SECS") {
            self.report.render_timeout_secs = parse_override("RENDER_TIMEOUT_SECS", &timeout)?;
        }
        if let Some(policy) = lookup("LENGTH_POLICY") {
            self.report.length_policy = parse_override::<LengthPolicy>("LENGTH_POLICY", &policy)?;
        }
        if let Some(policy) = lookup("GAP_POLICY") {
            self.charts.gap_policy = parse_override::<GapPolicy>("GAP_POLICY", &policy)?;
        }
        Ok(())
    }

    /// `host:port` to bind the listener to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.report.render_timeout_secs)
    }
}

fn parse_override<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
        key: key.to_string(),
        message: e.to_string(),
    })
}
