//! Host config: the plugins this host declares, and logging options.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

/// Config file name within the config directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Directory for NDJSON log files; console-only when unset.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    #[serde(default)]
    pub plugins: Vec<PluginEntry>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_dir: None,
            plugins: Vec::new(),
        }
    }
}

/// One declared plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginEntry {
    pub id: String,
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    /// Where the plugin came from; shown in diagnostics.
    pub source: String,
    /// Disabled entries still appear in diagnostics but never activate.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Free-form settings handed to the plugin at activation.
    #[serde(default)]
    pub settings: serde_json::Value,
}

fn default_log_level() -> String {
    "info".into()
}

fn default_version() -> String {
    "0.0.0".into()
}

fn default_enabled() -> bool {
    true
}

/// Resolve the host config path.
/// Priority: `LOADSTONE_CONFIG` env > `~/.loadstone/config.yaml` > `./loadstone.yaml`
pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var("LOADSTONE_CONFIG") {
        return PathBuf::from(path);
    }
    if let Some(home) = dirs::home_dir() {
        let dir = home.join(".loadstone");
        if dir.exists() {
            return dir.join(CONFIG_FILE_NAME);
        }
    }
    PathBuf::from("loadstone.yaml")
}

/// Load and parse the config from disk.
///
/// Returns defaults if the file doesn't exist (first run).
pub async fn load_config(path: &Path) -> Result<HostConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(HostConfig::default());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: HostConfig = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.yaml")).await.unwrap();
        assert_eq!(config.log_level, "info");
        assert!(config.plugins.is_empty());
    }

    #[tokio::test]
    async fn test_parse_declared_plugins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            r#"
log_level: debug
plugins:
  - id: telemetry
    name: Telemetry Relay
    version: 1.4.0
    source: plugins/telemetry
  - id: legacy
    name: Legacy Bridge
    source: plugins/legacy
    enabled: false
    settings:
      retries: 3
"#,
        )
        .unwrap();

        let config = load_config(&path).await.unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.plugins.len(), 2);
        assert_eq!(config.plugins[0].version, "1.4.0");
        assert!(config.plugins[0].enabled);
        assert!(!config.plugins[1].enabled);
        assert_eq!(config.plugins[1].version, "0.0.0");
        assert_eq!(config.plugins[1].settings["retries"], 3);
    }

    #[tokio::test]
    async fn test_malformed_yaml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "plugins: [not, a, mapping]").unwrap();
        assert!(load_config(&path).await.is_err());
    }
}
