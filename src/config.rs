use crate::constants::{
    DEFAULT_ENDPOINT, DEFAULT_RECEIVE_AUDIO, DEFAULT_SEND_AUDIO, DEFAULT_TYPING_FALLBACK_MS,
};
use crate::errors::{ChatterError, ChatterResult};
use crate::transport::socket::socket_url;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, path::PathBuf, time::Duration};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub endpoint: String,
    pub send_audio: PathBuf,
    pub receive_audio: PathBuf,
    pub typing_fallback_ms: u64,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            send_audio: PathBuf::from(DEFAULT_SEND_AUDIO),
            receive_audio: PathBuf::from(DEFAULT_RECEIVE_AUDIO),
            typing_fallback_ms: DEFAULT_TYPING_FALLBACK_MS,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// How long a typing indicator may stay up without a bot message.
    /// `None` when the fallback is disabled.
    pub fn typing_fallback(&self) -> Option<Duration> {
        (self.typing_fallback_ms > 0).then(|| Duration::from_millis(self.typing_fallback_ms))
    }
}

/// Loads the configuration from `~/.config/chatter/config.json`, applying
/// environment overrides on top.
pub fn load_config() -> ChatterResult<Config> {
    let config_path = get_config_path()?;
    let mut config = load_config_from(&config_path)?;
    apply_env_overrides(&mut config, |key| env::var(key).ok());
    validate_config(&config)?;
    Ok(config)
}

/// Reads the config file at `path`. A missing file is created with defaults.
pub fn load_config_from(path: &Path) -> ChatterResult<Config> {
    if path.exists() {
        let config_str = fs::read_to_string(path)
            .map_err(|e| ChatterError::config_error(format!("Failed to read config file: {}", e)))?;

        let config: Config = serde_json::from_str(&config_str)
            .map_err(|e| ChatterError::config_error(format!("Failed to parse config: {}", e)))?;

        return Ok(config);
    }

    let config = Config::default();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            ChatterError::config_error(format!("Failed to create config directory: {}", e))
        })?;
    }

    let config_str = serde_json::to_string_pretty(&config)
        .map_err(|e| ChatterError::config_error(format!("Failed to serialize config: {}", e)))?;

    fs::write(path, config_str)
        .map_err(|e| ChatterError::config_error(format!("Failed to write config file: {}", e)))?;

    Ok(config)
}

pub fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(endpoint) = lookup("CHATTER_ENDPOINT") {
        config.endpoint = endpoint;
    }
    if let Some(path) = lookup("CHATTER_SEND_AUDIO") {
        config.send_audio = PathBuf::from(path);
    }
    if let Some(path) = lookup("CHATTER_RECEIVE_AUDIO") {
        config.receive_audio = PathBuf::from(path);
    }
    if let Some(level) = lookup("CHATTER_LOG_LEVEL") {
        config.log_level = level;
    }
}

pub fn get_config_dir() -> ChatterResult<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| ChatterError::config_error("Could not determine home directory"))?;

    Ok(home_dir.join(".config").join("chatter"))
}

fn get_config_path() -> ChatterResult<PathBuf> {
    Ok(get_config_dir()?.join("config.json"))
}

pub fn validate_config(config: &Config) -> ChatterResult<()> {
    if config.endpoint.trim().is_empty() {
        return Err(ChatterError::config_error("endpoint is required"));
    }

    // Same scheme rules the socket applies: http/ws only.
    socket_url(&config.endpoint)?;

    if config.log_level.parse::<log::LevelFilter>().is_err() {
        return Err(ChatterError::config_error(format!(
            "Unknown log level: {}",
            config.log_level
        )));
    }

    Ok(())
}
