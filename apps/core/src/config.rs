use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

const APP_DIR_NAME: &str = "fastswitch";
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid json5 config: {0}")]
    Json5(#[from] json5::Error),
    #[error("invalid toml config: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("failed to encode toml config: {0}")]
    TomlEncode(#[from] toml::ser::Error),
    #[error("failed to encode json config: {0}")]
    JsonEncode(#[from] serde_json::Error),
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HistoryBackend {
    #[default]
    Json,
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub initial_result_limit: usize,
    pub recent_searches_limit: usize,
    pub max_history_entries: usize,
    pub parallel_rank_threshold: usize,
    /// Cadence the caller should use for periodic refreshes while visible.
    pub refresh_interval_ms: u64,
    pub history_backend: HistoryBackend,
    pub history_path: PathBuf,
    pub log_filter: String,
    #[serde(skip)]
    pub config_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let base = stable_app_data_dir();
        Self {
            initial_result_limit: 10,
            recent_searches_limit: 10,
            max_history_entries: 1000,
            parallel_rank_threshold: 50,
            refresh_interval_ms: 500,
            history_backend: HistoryBackend::Json,
            history_path: base.join("search-history.json"),
            log_filter: "info".to_string(),
            config_path: base.join(CONFIG_FILE_NAME),
        }
    }
}

/// `FASTSWITCH_HOME`, then the XDG data dir, then `~/.local/share`, then temp.
pub fn stable_app_data_dir() -> PathBuf {
    if let Some(home) = non_empty_env("FASTSWITCH_HOME") {
        return PathBuf::from(home);
    }
    if let Some(data) = non_empty_env("XDG_DATA_HOME") {
        return PathBuf::from(data).join(APP_DIR_NAME);
    }
    if let Some(home) = non_empty_env("HOME") {
        return PathBuf::from(home).join(".local").join("share").join(APP_DIR_NAME);
    }
    std::env::temp_dir().join(APP_DIR_NAME)
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

pub fn default_config_path() -> PathBuf {
    stable_app_data_dir().join(CONFIG_FILE_NAME)
}

/// Reads the config at `path` (or the default location). A missing file
/// yields defaults bound to that path.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !config_path.exists() {
        return Ok(Config {
            config_path,
            ..Config::default()
        });
    }

    let raw = std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
        path: config_path.clone(),
        source,
    })?;
    let mut cfg = parse(&raw, &config_path)?;
    cfg.config_path = config_path;
    validate(&cfg)?;
    Ok(cfg)
}

pub fn parse(raw: &str, path: &Path) -> Result<Config, ConfigError> {
    if is_toml(path) {
        Ok(toml::from_str(raw)?)
    } else {
        Ok(json5::from_str(raw)?)
    }
}

pub fn save(cfg: &Config) -> Result<(), ConfigError> {
    validate(cfg)?;
    let encoded = if is_toml(&cfg.config_path) {
        toml::to_string_pretty(cfg)?
    } else {
        serde_json::to_string_pretty(cfg)?
    };

    if let Some(parent) = cfg.config_path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(&cfg.config_path, encoded).map_err(|source| ConfigError::Write {
        path: cfg.config_path.clone(),
        source,
    })?;
    info!(path = %cfg.config_path.display(), "config written");
    Ok(())
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if !(1..=500).contains(&cfg.initial_result_limit) {
        return Err(invalid("initial_result_limit must be between 1 and 500"));
    }
    if !(1..=100).contains(&cfg.recent_searches_limit) {
        return Err(invalid("recent_searches_limit must be between 1 and 100"));
    }
    if !(1..=100_000).contains(&cfg.max_history_entries) {
        return Err(invalid("max_history_entries must be between 1 and 100000"));
    }
    if cfg.parallel_rank_threshold == 0 {
        return Err(invalid("parallel_rank_threshold must be at least 1"));
    }
    if !(50..=60_000).contains(&cfg.refresh_interval_ms) {
        return Err(invalid("refresh_interval_ms must be between 50 and 60000"));
    }
    if cfg.history_backend != HistoryBackend::Memory && cfg.history_path.as_os_str().is_empty() {
        return Err(invalid("history_path is required"));
    }
    if cfg.config_path.as_os_str().is_empty() {
        return Err(invalid("config_path is required"));
    }
    Ok(())
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Invalid(message.to_string())
}
