use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8081";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const PASSWORD_ENV: &str = "STOCKROOM_ADMIN_PASSWORD";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Origin of the shop backend
    pub base_url: Option<String>,

    pub request_timeout_secs: Option<u64>,

    /// Admin password; the dashboard logs in before anything else when set
    pub password: Option<String>,
}

/// Effective settings after merging flags, environment and the config file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub timeout: Duration,
    pub password: Option<String>,
}

impl Settings {
    /// Flags win over the environment, which wins over the file
    pub fn resolve(
        config: &Config,
        base_url: Option<&str>,
        password: Option<&str>,
        password_env: Option<String>,
    ) -> Self {
        let base_url = base_url
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .or_else(|| {
                config
                    .base_url
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
            })
            .map(normalize_http_endpoint)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let password = password
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .or_else(|| password_env.filter(|value| !value.is_empty()))
            .or_else(|| config.password.clone().filter(|value| !value.is_empty()));

        Self {
            base_url,
            timeout: Duration::from_secs(
                config
                    .request_timeout_secs
                    .unwrap_or(DEFAULT_TIMEOUT_SECS)
                    .max(1),
            ),
            password,
        }
    }
}

pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    load_from(&path)
}

pub fn load_from(path: &Path) -> Config {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return Config::default(),
    };
    toml::from_str::<Config>(&content).unwrap_or_default()
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("STOCKROOM_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("stockroom").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("stockroom").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "stockroom", "stockroom")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn data_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from) {
        return Some(xdg.join("stockroom"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".local").join("share").join("stockroom"));
    }
    directories::ProjectDirs::from("io", "stockroom", "stockroom")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

pub fn log_dir() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("logs"))
}

fn normalize_http_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}
