//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$CALLBOX_CONFIG` (environment variable)
//! 2. `~/.config/callbox/config.toml` (Linux/macOS)
//!    `%APPDATA%\callbox\config.toml` (Windows)
//! 3. Built-in defaults
//!
//! The extraction root is explicit configuration rather than a process-wide
//! constant, so tests can point each run at an isolated directory.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default extraction root, matching the export pipeline's working area.
const DEFAULT_EXTRACT_DIR: &str = "./temp/extracted";

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory the archive is read from and extracted audio is written to.
    pub extract_dir: PathBuf,
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extract_dir: PathBuf::from(DEFAULT_EXTRACT_DIR),
            log_level: "warn".to_string(),
        }
    }
}

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    if let Some(path) = config_file_path() {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<Config>(&contents) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "Loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config, using defaults"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read config file, using defaults"
                    );
                }
            }
        }
    }
    Config::default()
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("CALLBOX_CONFIG") {
        return Some(PathBuf::from(env_path));
    }
    dirs::config_dir().map(|d| d.join("callbox").join("config.toml"))
}

/// Return the cache directory for log files.
pub fn cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("callbox")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.extract_dir, PathBuf::from("./temp/extracted"));
        assert_eq!(cfg.log_level, "warn");
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed: Config = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.extract_dir, cfg.extract_dir);
        assert_eq!(parsed.log_level, cfg.log_level);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
extract_dir = "/srv/voice/extracted"
"#;
        let cfg: Config = toml::from_str(partial).expect("parse partial");
        assert_eq!(cfg.extract_dir, PathBuf::from("/srv/voice/extracted"));
        assert_eq!(cfg.log_level, "warn");
    }

    #[test]
    fn test_config_file_path_resolves() {
        // The env override cannot be exercised reliably from parallel tests;
        // just verify path resolution does not panic.
        let _ = config_file_path();
    }
}
