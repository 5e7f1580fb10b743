use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::{CapabilityError, Result};
use crate::transport::TransportStrategy;

/// Relay used when no configuration overrides it.
pub const DEFAULT_RELAY_ENDPOINT: &str = "https://api.allorigins.win/raw";

const CONFIG_DIR: &str = "fhir-capability-viewer";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Tried in order until one yields a CapabilityStatement.
    #[serde(default = "default_strategies")]
    pub strategies: Vec<TransportStrategy>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds. `None` leaves the transport default.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Drop results of loads superseded by a newer one.
    #[serde(default = "default_true")]
    pub discard_stale: bool,
}

fn default_strategies() -> Vec<TransportStrategy> {
    std::iter::once(TransportStrategy::Direct)
        .chain(
            Url::parse(DEFAULT_RELAY_ENDPOINT)
                .ok()
                .map(TransportStrategy::relay),
        )
        .collect()
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

fn default_true() -> bool {
    true
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            strategies: default_strategies(),
            user_agent: default_user_agent(),
            timeout_secs: None,
            discard_stale: true,
        }
    }
}

impl LoaderConfig {
    /// `<config dir>/fhir-capability-viewer/config.json`, when the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: LoaderConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read `path` if given, else the default location if it exists, else
    /// fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        match Self::default_path() {
            Some(path) if path.is_file() => {
                tracing::debug!("Reading loader config from {}", path.display());
                Self::from_file(path)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.strategies.is_empty() {
            return Err(CapabilityError::config("at least one strategy is required"));
        }

        for strategy in &self.strategies {
            if let TransportStrategy::Relay { endpoint, param } = strategy {
                if !matches!(endpoint.scheme(), "http" | "https") {
                    return Err(CapabilityError::config(format!(
                        "relay endpoint must be http or https: {endpoint}"
                    )));
                }
                if param.is_empty() {
                    return Err(CapabilityError::config(format!(
                        "relay parameter name is empty for {endpoint}"
                    )));
                }
            }
        }

        if self.timeout_secs == Some(0) {
            return Err(CapabilityError::config("timeout must be greater than zero"));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn with_strategies(mut self, strategies: Vec<TransportStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Replace every relay strategy with one going through `endpoint`.
    pub fn with_relay(mut self, endpoint: Url) -> Self {
        self.strategies
            .retain(|s| !matches!(s, TransportStrategy::Relay { .. }));
        self.strategies.push(TransportStrategy::relay(endpoint));
        self
    }

    pub fn without_relay(mut self) -> Self {
        self.strategies
            .retain(|s| !matches!(s, TransportStrategy::Relay { .. }));
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = Some(timeout.as_secs().max(1));
        self
    }

    pub fn with_discard_stale(mut self, enabled: bool) -> Self {
        self.discard_stale = enabled;
        self
    }
}
