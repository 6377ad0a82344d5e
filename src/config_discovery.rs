use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::ClustoConfig;

/// Project-level config file name, searched for from the working directory up
pub const CONFIG_FILE_NAME: &str = "clusto.toml";

/// Global config file: `$XDG_CONFIG_HOME/clusto/config.toml`
///
/// Falls back to `~/.config/clusto/config.toml` when XDG_CONFIG_HOME is unset.
pub fn global_config_path() -> Option<PathBuf> {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg_config).join("clusto").join("config.toml"))
    } else {
        dirs::home_dir().map(|home| home.join(".config").join("clusto").join("config.toml"))
    }
}

/// Discovers clusto configuration by traversing up the directory tree
pub fn discover_config(start_dir: &Path) -> Result<Option<PathBuf>> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Ok(Some(config_path));
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }

    if let Some(global_config) = global_config_path() {
        if global_config.exists() {
            return Ok(Some(global_config));
        }
    }

    Ok(None)
}

/// Loads configuration with auto-discovery support
///
/// An explicit path must exist. Without one, the nearest `clusto.toml` or the
/// global config is used; finding neither yields the defaults.
pub fn load_config_with_discovery(explicit_path: Option<&str>) -> Result<ClustoConfig> {
    if let Some(config_path) = explicit_path {
        return ClustoConfig::from_file(config_path);
    }

    let current_dir =
        std::env::current_dir().context("Failed to get current directory for config discovery")?;

    match discover_config(&current_dir)? {
        Some(path) => {
            tracing::debug!("Using config: {}", path.display());
            ClustoConfig::from_file(&path)
        }
        None => {
            tracing::debug!("No configuration file found, using defaults");
            Ok(ClustoConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_discover_config_finds_nearest() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        std::env::set_var("XDG_CONFIG_HOME", root.join("xdg"));

        let project = root.join("project");
        let subdir = project.join("subdir");
        fs::create_dir_all(&subdir).unwrap();

        let config_path = project.join(CONFIG_FILE_NAME);
        fs::write(&config_path, "url = \"http://clusto:9996\"").unwrap();

        let found = discover_config(&subdir).unwrap();
        assert_eq!(found, Some(config_path));

        std::env::remove_var("XDG_CONFIG_HOME");
    }

    #[test]
    #[serial]
    fn test_discover_falls_back_to_global() {
        let temp = TempDir::new().unwrap();
        let xdg = temp.path().join("xdg");
        fs::create_dir_all(xdg.join("clusto")).unwrap();
        let global = xdg.join("clusto").join("config.toml");
        fs::write(&global, "url = \"http://global:9996\"").unwrap();
        std::env::set_var("XDG_CONFIG_HOME", &xdg);

        let project = temp.path().join("empty");
        fs::create_dir_all(&project).unwrap();

        assert_eq!(global_config_path(), Some(global.clone()));
        assert_eq!(discover_config(&project).unwrap(), Some(global));

        std::env::remove_var("XDG_CONFIG_HOME");
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.toml");
        assert!(load_config_with_discovery(missing.to_str()).is_err());
    }

    #[test]
    fn test_explicit_file_is_loaded() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.toml");
        fs::write(&path, "url = \"http://explicit:9996\"\nauth = \"a:b\"").unwrap();

        let config = load_config_with_discovery(path.to_str()).unwrap();
        assert_eq!(config.url.as_deref(), Some("http://explicit:9996"));
        assert_eq!(config.auth.as_deref(), Some("a:b"));
    }
}
