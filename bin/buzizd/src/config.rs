//! Server configuration.
//!
//! A context name resolves to `/etc/buziz/<name>.toml`; anything that
//! looks like a path (contains `/` or `.`) is used as-is.

use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub storage: StorageConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiConfig {
    /// Static bearer token. Empty disables the check.
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_materialize_interval")]
    pub materialize_interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            materialize_interval_secs: default_materialize_interval(),
        }
    }
}

fn default_materialize_interval() -> u64 {
    3600
}

impl ServerConfig {
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from("/etc/buziz").join(format!("{name_or_path}.toml"))
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {e}", path.display()))?;
        let config: ServerConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Refuse to start on a config that cannot work.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.storage.data_dir.is_empty() {
        anyhow::bail!("storage.data_dir is empty in configuration");
    }
    if config.schedule.materialize_interval_secs == 0 {
        anyhow::bail!("schedule.materialize_interval_secs must be positive");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_resolves_under_etc() {
        assert_eq!(
            ServerConfig::resolve_path("prod"),
            PathBuf::from("/etc/buziz/prod.toml")
        );
        assert_eq!(
            ServerConfig::resolve_path("./local.toml"),
            PathBuf::from("./local.toml")
        );
    }

    #[test]
    fn minimal_config_parses_with_defaults() {
        let config: ServerConfig = toml::from_str(
            r#"
            [storage]
            data_dir = "/var/lib/buziz/prod"
            "#,
        )
        .unwrap();
        assert!(config.api.token.is_empty());
        assert_eq!(config.schedule.materialize_interval_secs, 3600);
        assert!(verify_config(&config).is_ok());
    }

    #[test]
    fn empty_data_dir_is_rejected() {
        let config: ServerConfig = toml::from_str(
            r#"
            [storage]
            data_dir = ""
            "#,
        )
        .unwrap();
        assert!(verify_config(&config).is_err());
    }
}
