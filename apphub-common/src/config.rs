//! Configuration file resolution and loading
//!
//! Services load a TOML file resolved with the following priority:
//! 1. `APPHUB_CONFIG_DIR` environment variable (directory)
//! 2. Platform config directory (`~/.config/apphub` on Linux)
//!
//! A missing file is not an error; services fall back to defaults and
//! per-key environment overrides.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const CONFIG_DIR_ENV: &str = "APPHUB_CONFIG_DIR";

/// Resolve the config file path for a service (e.g. "apphub-rec")
pub fn config_path(service: &str) -> PathBuf {
    let file_name = format!("{}.toml", service);

    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        return PathBuf::from(dir).join(file_name);
    }

    dirs::config_dir()
        .map(|d| d.join("apphub").join(&file_name))
        .unwrap_or_else(|| PathBuf::from(file_name))
}

/// Load a TOML config file, falling back to `Default` when absent
pub fn load_toml_config<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        debug!(path = %path.display(), "Config file not found, using defaults");
        return Ok(T::default());
    }

    let content = std::fs::read_to_string(path)?;

    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse config failed: {}", e)))?;

    info!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

/// Validate an API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serial_test::serial;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct TestConfig {
        #[serde(default)]
        api_key: String,
        #[serde(default)]
        port: u16,
    }

    #[test]
    #[serial]
    fn config_path_honors_env_override() {
        std::env::set_var(CONFIG_DIR_ENV, "/tmp/apphub-test");
        let path = config_path("apphub-rec");
        assert_eq!(path, PathBuf::from("/tmp/apphub-test/apphub-rec.toml"));
        std::env::remove_var(CONFIG_DIR_ENV);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config: TestConfig =
            load_toml_config(Path::new("/nonexistent/apphub.toml")).unwrap();
        assert_eq!(config, TestConfig::default());
    }

    #[test]
    fn valid_toml_is_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apphub-rec.toml");
        std::fs::write(&path, "api_key = \"abc\"\nport = 5725\n").unwrap();

        let config: TestConfig = load_toml_config(&path).unwrap();
        assert_eq!(config.api_key, "abc");
        assert_eq!(config.port, 5725);
    }

    #[test]
    fn unreadable_path_is_an_io_error() {
        // A directory exists but cannot be read as a file
        let dir = tempfile::tempdir().unwrap();
        let result: Result<TestConfig> = load_toml_config(dir.path());
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apphub-rec.toml");
        std::fs::write(&path, "api_key = [broken").unwrap();

        let result: Result<TestConfig> = load_toml_config(&path);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn key_validation_rejects_whitespace() {
        assert!(is_valid_key("abc"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("   "));
    }
}
