use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::search::state::Policy;

/// Environment variable that overrides `base_url`.
pub const BASE_URL_ENV: &str = "TUBESEARCH_BASE_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Front-end host serving `/api/s` (and the watch pages).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_tick_rate")]
    pub tick_rate_fps: f64,
    #[serde(default = "default_max_columns")]
    pub max_columns: u16,
    #[serde(default = "default_true")]
    pub reset_page_on_new_query: bool,
    #[serde(default = "default_true")]
    pub discard_stale_responses: bool,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_tick_rate() -> f64 {
    30.0
}

fn default_max_columns() -> u16 {
    3
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            tick_rate_fps: default_tick_rate(),
            max_columns: default_max_columns(),
            reset_page_on_new_query: true,
            discard_stale_responses: true,
            request_timeout_secs: None,
        }
    }
}

impl AppConfig {
    pub fn policy(&self) -> Policy {
        Policy {
            reset_page_on_new_query: self.reset_page_on_new_query,
            discard_stale_responses: self.discard_stale_responses,
        }
    }
}

fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config/tubesearch"))
}

fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Return candidate .env paths in priority order.
fn env_file_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = config_dir() {
        paths.push(dir.join(".env"));
    }
    paths.push(PathBuf::from(".env"));
    paths
}

/// Load .env files. Earlier files win because dotenvy does not overwrite
/// variables that are already set.
pub fn load_env_files() {
    for path in env_file_paths() {
        if path.exists() {
            let _ = dotenvy::from_path(&path);
        }
    }
}

fn parse_config(contents: &str) -> AppConfig {
    toml::from_str(contents).unwrap_or_default()
}

fn apply_env(mut config: AppConfig, base_url: Option<String>) -> AppConfig {
    if let Some(url) = base_url.filter(|v| !v.is_empty()) {
        config.base_url = url;
    }
    config
}

pub fn load_config() -> AppConfig {
    load_env_files();

    let config = config_path()
        .and_then(|path| fs::read_to_string(path).ok())
        .map(|contents| parse_config(&contents))
        .unwrap_or_default();

    apply_env(config, std::env::var(BASE_URL_ENV).ok())
}
