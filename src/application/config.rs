//! User configuration, read once at start-up.

use crate::domain::{DomainError, DomainResult, StackOrder};
use crate::infrastructure::RasterSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "stratasim";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Which end of the layer list rests at the bottom of the column.
    pub stack_order: StackOrder,
    pub png: RasterSettings,
    pub csv_filename: String,
    pub png_filename: String,
    pub import_filename: String,
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            stack_order: StackOrder::default(),
            png: RasterSettings::default(),
            csv_filename: "strat_data.csv".to_string(),
            png_filename: "strat_column.png".to_string(),
            import_filename: "data.csv".to_string(),
            log_filter: "stratasim=info".to_string(),
        }
    }
}

impl AppConfig {
    /// Reads a config file. A file that does not exist yields `Ok(None)`.
    pub fn load_from(path: &Path) -> DomainResult<Option<Self>> {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&data)
            .map(Some)
            .map_err(|e| DomainError::Parse { line: e.line() as u64, reason: e.to_string() })
    }

    /// Loads `path`, or the default location when `path` is `None`. An absent
    /// file gives defaults; an unreadable one gives defaults plus the error,
    /// which the caller reports once logging is running.
    pub fn load_or_default(path: Option<&Path>) -> (Self, Option<DomainError>) {
        let Some(path) = path.map(Path::to_path_buf).or_else(default_config_path) else {
            return (Self::default(), None);
        };
        match Self::load_from(&path) {
            Ok(config) => (config.unwrap_or_default(), None),
            Err(e) => (Self::default(), Some(e)),
        }
    }
}

/// `$XDG_CONFIG_HOME/stratasim/config.json`, else `~/.config/stratasim/config.json`.
pub fn default_config_path() -> Option<PathBuf> {
    base_dir("XDG_CONFIG_HOME", ".config").map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// `$XDG_CACHE_HOME/stratasim/logs`, else `~/.cache/stratasim/logs`.
pub fn default_log_dir() -> Option<PathBuf> {
    base_dir("XDG_CACHE_HOME", ".cache").map(|dir| dir.join(APP_DIR).join("logs"))
}

fn base_dir(xdg_var: &str, home_fallback: &str) -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(xdg_var).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(dir));
    }
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(home_fallback))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.stack_order, StackOrder::NewestAtBottom);
        assert_eq!(config.csv_filename, "strat_data.csv");
        assert_eq!(config.png_filename, "strat_column.png");
        assert_eq!(config.png.column_width, 160);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "stack_order": "oldest_at_bottom", "png": { "pixels_per_meter": 10.0 } }"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap().unwrap();
        assert_eq!(config.stack_order, StackOrder::OldestAtBottom);
        assert_eq!(config.png.pixels_per_meter, 10.0);
        assert_eq!(config.png.column_width, 160);
        assert_eq!(config.csv_filename, "strat_data.csv");
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppConfig::load_from(&dir.path().join("absent.json")).unwrap().is_none());
        let (config, error) = AppConfig::load_or_default(Some(&dir.path().join("absent.json")));
        assert_eq!(config, AppConfig::default());
        assert!(error.is_none());
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ \"stack_order\": ").unwrap();

        assert!(matches!(AppConfig::load_from(&path), Err(DomainError::Parse { .. })));
        let (config, error) = AppConfig::load_or_default(Some(&path));
        assert_eq!(config, AppConfig::default());
        assert!(matches!(error, Some(DomainError::Parse { .. })));
    }

    #[test]
    fn test_round_trips_through_json() {
        let config = AppConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
