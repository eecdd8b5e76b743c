use std::path::{Path, PathBuf};

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const ENV_API_BASE: &str = "EDUADMIN_API_BASE";
pub const ENV_SESSION_FILE: &str = "EDUADMIN_SESSION_FILE";
pub const ENV_OUTPUT: &str = "EDUADMIN_OUTPUT";
pub const ENV_CLEAR_ON_401: &str = "EDUADMIN_CLEAR_ON_401";
pub const ENV_CONNECT_TIMEOUT_MS: &str = "EDUADMIN_CONNECT_TIMEOUT_MS";

/// Fully resolved console settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsoleConfig {
    pub api_base: String,
    /// JSON file standing in for browser local storage.
    pub session_file: PathBuf,
    pub connect_timeout_ms: u64,
    /// Drop the stored session when the API answers 401.
    pub clear_session_on_unauthorized: bool,
    /// Print raw JSON instead of tables.
    pub output_json: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8000".to_string(),
            session_file: PathBuf::from(".eduadmin").join("session.json"),
            connect_timeout_ms: 5_000,
            clear_session_on_unauthorized: false,
            output_json: false,
        }
    }
}

/// One configuration layer. Unspecified values inherit from the layer below.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConfigOverrides {
    pub api_base: Option<String>,
    pub session_file: Option<PathBuf>,
    pub connect_timeout_ms: Option<u64>,
    pub clear_session_on_unauthorized: Option<bool>,
    pub output_json: Option<bool>,
}

impl ConfigOverrides {
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| AppError::config("config_read".to_string(), format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&text)
            .map_err(|e| AppError::config("config_parse".to_string(), format!("{}: {}", path.display(), e)))
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Read the `EDUADMIN_*` variables through `lookup`; unparsable values are ignored.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let get = |k: &str| lookup(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            api_base: get(ENV_API_BASE),
            session_file: get(ENV_SESSION_FILE).map(PathBuf::from),
            connect_timeout_ms: get(ENV_CONNECT_TIMEOUT_MS).and_then(|v| v.parse().ok()),
            clear_session_on_unauthorized: get(ENV_CLEAR_ON_401).and_then(|v| parse_flag(&v)),
            output_json: get(ENV_OUTPUT).map(|v| v.eq_ignore_ascii_case("json")),
        }
    }
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl ConsoleConfig {
    /// Defaults < config file < environment < command-line flags.
    pub fn from_layers(file: Option<&ConfigOverrides>, env: &ConfigOverrides, flags: &ConfigOverrides) -> Self {
        let mut cfg = ConsoleConfig::default();
        for layer in file.into_iter().chain([env, flags]) {
            if let Some(v) = &layer.api_base { cfg.api_base = v.clone(); }
            if let Some(v) = &layer.session_file { cfg.session_file = v.clone(); }
            if let Some(v) = layer.connect_timeout_ms { cfg.connect_timeout_ms = v; }
            if let Some(v) = layer.clear_session_on_unauthorized { cfg.clear_session_on_unauthorized = v; }
            if let Some(v) = layer.output_json { cfg.output_json = v; }
        }
        cfg
    }

    /// Parsed API base; only http and https are accepted.
    pub fn api_url(&self) -> AppResult<Url> {
        let url = Url::parse(&self.api_base)
            .map_err(|e| AppError::config("invalid_api_base".to_string(), format!("{}: {}", self.api_base, e)))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(AppError::config("invalid_api_base".to_string(), format!("unsupported scheme '{}'", other))),
        }
    }
}
