use almanac_schedule::{ParseOptions, ScheduleZone};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AlmanacError, Result};
use crate::types::NamedSchedule;

/// Env var naming the config file when no explicit path is given.
pub const CONFIG_PATH_ENV: &str = "ALMANAC_CONFIG";
pub const DEFAULT_PREVIEW: usize = 5;

/// Top-level config (almanac.toml + ALMANAC_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlmanacConfig {
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub schedules: Vec<NamedSchedule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Zone for schedules without their own `timezone`.
    /// Override with env var: ALMANAC_DEFAULTS_TIMEZONE=Europe/Paris
    pub timezone: Option<String>,
    /// Number of upcoming timeouts shown per schedule.
    #[serde(default = "default_preview")]
    pub preview: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            timezone: None,
            preview: DEFAULT_PREVIEW,
        }
    }
}

fn default_preview() -> usize {
    DEFAULT_PREVIEW
}

impl AlmanacConfig {
    /// Load config from a TOML file with ALMANAC_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. $ALMANAC_CONFIG
    ///   3. ~/.almanac/almanac.toml
    ///
    /// A missing file is not an error; defaults apply.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let path = config_path
            .map(String::from)
            .or_else(|| std::env::var(CONFIG_PATH_ENV).ok())
            .unwrap_or_else(default_config_path);
        debug!(path = %path, "loading config");

        let config: AlmanacConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("ALMANAC_").split("_"))
            .extract()
            .map_err(|e| AlmanacError::Config(e.to_string()))?;

        Ok(config)
    }

    /// Parse options carrying the configured default zone.
    pub fn parse_options(&self) -> Result<ParseOptions> {
        let default_zone = match self.defaults.timezone.as_deref() {
            Some(id) => Some(ScheduleZone::parse(id).ok_or_else(|| {
                AlmanacError::Config(format!("unknown default timezone: {id}"))
            })?),
            None => None,
        };
        Ok(ParseOptions { default_zone })
    }

    pub fn schedule(&self, name: &str) -> Result<&NamedSchedule> {
        self.schedules
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| AlmanacError::ScheduleNotFound {
                name: name.to_string(),
            })
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.almanac/almanac.toml", home)
}
