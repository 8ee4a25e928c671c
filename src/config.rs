use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FeasibilityError;
use crate::models::Defaults;
use crate::rates::{FixedRate, RateQuote};

/// File looked up in the working directory when no config path is given.
pub const CONFIG_FILE_NAME: &str = "feasibility.toml";

/// A manually configured exchange rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSettings {
    pub rate: f64,
    #[serde(default)]
    pub as_of_date: Option<String>,
    #[serde(default = "default_rate_source")]
    pub source: String,
}

fn default_rate_source() -> String {
    "config".to_string()
}

impl RateSettings {
    pub fn to_provider(&self) -> Result<FixedRate, FeasibilityError> {
        FixedRate::from_quote(RateQuote {
            rate: Some(self.rate),
            as_of_date: self.as_of_date.clone(),
            source: self.source.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// How long an idle scenario session is kept, in seconds
    pub session_ttl_secs: u64,
    pub max_sessions: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            session_ttl_secs: 2 * 60 * 60,
            max_sessions: 100,
        }
    }
}

/// Application configuration, read from TOML.
///
/// ```toml
/// [defaults]
/// average_unit_m2 = 110.0
///
/// [exchange_rate]
/// rate = 34.2
/// source = "treasury bulletin"
///
/// [server]
/// port = 9000
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub defaults: Defaults,
    pub exchange_rate: Option<RateSettings>,
    pub server: ServerSettings,
}

impl AppConfig {
    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, FeasibilityError> {
        let config: AppConfig = toml::from_str(content)?;
        if let Some(rate) = &config.exchange_rate {
            rate.to_provider()?;
        }
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FeasibilityError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "loading configuration");
        Self::from_toml_str(&content)
    }

    /// Load `feasibility.toml` from the working directory if present,
    /// otherwise use built-in settings.
    pub fn discover() -> Result<Self, FeasibilityError> {
        let path = Path::new(CONFIG_FILE_NAME);
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}
