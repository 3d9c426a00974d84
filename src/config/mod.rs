use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::viewport::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigPathError {
    #[error("missing HOME environment variable")]
    MissingHomeDirectory,
}

const APP_DIR: &str = "pagecraft";
const APP_CONFIG_FILE: &str = "config.json";
const DEFAULT_SAVE_DEBOUNCE_MS: u64 = 800;

/// Engine settings from `config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub default_viewport: Viewport,
    pub save_debounce_ms: u64,
    /// Maximum history entries per page; unbounded when unset.
    pub history_limit: Option<usize>,
    pub storage_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_viewport: Viewport::Desktop,
            save_debounce_ms: DEFAULT_SAVE_DEBOUNCE_MS,
            history_limit: None,
            storage_dir: None,
        }
    }
}

impl EngineConfig {
    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }
}

pub fn load_engine_config() -> EngineConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_engine_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_engine_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> EngineConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return EngineConfig::default(),
    };
    if !path.exists() {
        return EngineConfig::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => parse_engine_config(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
            EngineConfig::default()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            EngineConfig::default()
        }
    }
}

fn parse_engine_config(contents: &str) -> serde_json::Result<EngineConfig> {
    serde_json::from_str(contents)
}

pub fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::with_temp_root;

    #[test]
    fn app_config_path_prefers_xdg_config_home() {
        let path = app_config_path(
            "pagecraft",
            "config.json",
            Some(Path::new("/tmp/config-root")),
            Some(Path::new("/tmp/home")),
        )
        .expect("path should resolve");

        assert_eq!(path, PathBuf::from("/tmp/config-root/pagecraft/config.json"));
    }

    #[test]
    fn app_config_path_falls_back_to_home_dot_config() {
        let path = app_config_path("pagecraft", "config.json", None, Some(Path::new("/tmp/home")))
            .expect("path should resolve");

        assert_eq!(path, PathBuf::from("/tmp/home/.config/pagecraft/config.json"));
    }

    #[test]
    fn app_config_path_errors_when_home_missing_and_xdg_unset() {
        let error = app_config_path("pagecraft", "config.json", None, None)
            .expect_err("no root available");
        assert_eq!(error, ConfigPathError::MissingHomeDirectory);
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let config = parse_engine_config(r#"{ "default_viewport": "mobile", "history_limit": 50 }"#)
            .expect("valid config");
        assert_eq!(config.default_viewport, Viewport::Mobile);
        assert_eq!(config.history_limit, Some(50));
        assert_eq!(config.save_debounce(), Duration::from_millis(800));
        assert!(config.storage_dir.is_none());
    }

    #[test]
    fn missing_or_broken_file_falls_back_to_defaults() {
        with_temp_root("config", |root| {
            assert_eq!(load_engine_config_with(Some(root), None), EngineConfig::default());

            let dir = root.join(APP_DIR);
            std::fs::create_dir_all(&dir).expect("create config dir");
            std::fs::write(dir.join(APP_CONFIG_FILE), "{ not json").expect("write config");
            assert_eq!(load_engine_config_with(Some(root), None), EngineConfig::default());

            std::fs::write(dir.join(APP_CONFIG_FILE), r#"{ "save_debounce_ms": 250 }"#)
                .expect("write config");
            assert_eq!(load_engine_config_with(Some(root), None).save_debounce_ms, 250);
        });
    }
}
