use crate::bootstrap;

use config::{Config, ConfigError, File};
use serde::Deserialize;

use std::fmt;

// For explanation, see issue: https://github.com/serde-rs/serde/issues/368
fn default_chain() -> String {
    "thaw".to_string()
}

/// Network timings and the bounds of the responses served to other nodes.
#[derive(Debug, Deserialize, Clone, Eq, PartialEq)]
#[serde(default)]
pub struct NetworkSettings {
    pub request_timeout_ms: u64,
    pub probe_interval_ms: u64,
    pub ancestors_max_containers_sent: usize,
    pub ancestors_max_bytes_sent: usize,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        NetworkSettings {
            request_timeout_ms: 5000,
            probe_interval_ms: 2000,
            ancestors_max_containers_sent: 2000,
            ancestors_max_bytes_sent: 2 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub listener_ip: String,
    /// Beacons in the format `IP` or `ID@IP`.
    #[serde(default)]
    pub bootstrap_peers: Vec<String>,
    /// The name of the chain, hashed into its id.
    #[serde(default = "default_chain")]
    pub chain: String,
    #[serde(default)]
    pub bootstrap: bootstrap::Config,
    #[serde(default)]
    pub network: NetworkSettings,
}

const CONFIG_FILE_PATH: &str = "settings/Default.json";
const CONFIG_FILE_PREFIX: &str = "settings/";

#[derive(Clone, Debug, Deserialize)]
pub enum ENV {
    Testing,
    Development,
    Production,
}

impl fmt::Display for ENV {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ENV::Testing => write!(f, "Testing"),
            ENV::Production => write!(f, "Production"),
            ENV::Development => write!(f, "Development"),
        }
    }
}

impl From<&str> for ENV {
    fn from(env: &str) -> Self {
        match env {
            "Testing" => ENV::Testing,
            "Production" => ENV::Production,
            _ => ENV::Development,
        }
    }
}

impl Settings {
    /// Loads `settings/Default.json`, overlaid by the optional settings file of the
    /// environment named by `RUN_ENV` (e.g. `settings/Production.json`).
    pub fn new() -> Result<Self, ConfigError> {
        let env = ENV::from(std::env::var("RUN_ENV").unwrap_or_default().as_str());
        Config::builder()
            .set_default("env", env.to_string())?
            .add_source(File::with_name(CONFIG_FILE_PATH))
            .add_source(File::with_name(&format!("{}{}", CONFIG_FILE_PREFIX, env)).required(false))
            .build()?
            .try_deserialize()
    }

    /// Loads the settings from a single file.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        Config::builder().add_source(File::with_name(path)).build()?.try_deserialize()
    }
}
