//! Configuration module for websearch-rs
//!
//! Handles loading settings from YAML files and environment variables.

mod settings;

pub use settings::*;

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable naming an explicit settings file
pub const SETTINGS_PATH_ENV: &str = "WEBSEARCH_SETTINGS_PATH";

/// Default locations searched for settings.yml, in order
pub fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("settings.yml"),
        PathBuf::from("config/settings.yml"),
        PathBuf::from("/etc/websearch-rs/settings.yml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("websearch-rs/settings.yml"));
    }
    paths
}

/// Load settings from `explicit`, the environment, the default paths or defaults
pub fn load(explicit: Option<&Path>) -> Result<Settings> {
    let candidate = match explicit {
        // An explicit path must exist
        Some(path) => Some(path.to_path_buf()),
        None => std::env::var(SETTINGS_PATH_ENV)
            .ok()
            .map(PathBuf::from)
            .filter(|p| p.exists())
            .or_else(|| default_paths().into_iter().find(|p| p.exists())),
    };

    let mut settings = match candidate {
        Some(path) => {
            info!("Loading settings from: {}", path.display());
            Settings::from_file(&path)?
        }
        None => {
            info!("No settings file found, using defaults");
            Settings::default()
        }
    };

    settings.merge_env();
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_missing_path_fails() {
        let err = load(Some(Path::new("/nonexistent/websearch-rs.yml"))).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/websearch-rs.yml"));
    }

    #[test]
    fn test_default_paths_include_cwd() {
        assert_eq!(default_paths()[0], PathBuf::from("settings.yml"));
    }
}
