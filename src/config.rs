use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Base URL clients reach the server at; derived from `bind` when unset.
    #[serde(default)]
    pub public_url: Option<String>,
    /// When true, lookups of unknown dataset ids return 404 instead of an
    /// empty collection.
    #[serde(default)]
    pub strict_lookup: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            public_url: None,
            strict_lookup: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    #[serde(default = "default_image_dir")]
    pub image_dir: PathBuf,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            image_dir: default_image_dir(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}
fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}
fn default_image_dir() -> PathBuf {
    PathBuf::from("images")
}
fn default_max_upload_bytes() -> usize {
    16 * 1024 * 1024
}

impl ServerConfig {
    pub fn public_base(&self) -> String {
        match &self.public_url {
            Some(url) if !url.is_empty() => url.trim_end_matches('/').to_string(),
            _ => format!("http://{}", self.bind),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.server.bind.is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    if config.storage.max_upload_bytes == 0 {
        anyhow::bail!("storage.max_upload_bytes must be > 0");
    }

    if config.storage.upload_dir.as_os_str().is_empty() {
        anyhow::bail!("storage.upload_dir must not be empty");
    }

    if config.storage.image_dir.as_os_str().is_empty() {
        anyhow::bail!("storage.image_dir must not be empty");
    }

    Ok(config)
}

/// Loads the config file when it exists, otherwise falls back to defaults.
/// Local pipeline commands work without a config; `serve` reads one when
/// present so deployments can pin ports and directories.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.storage.max_upload_bytes, 16 * 1024 * 1024);
        assert!(!config.server.strict_lookup);
    }

    #[test]
    fn public_base_derives_from_bind() {
        let config = Config::default();
        assert_eq!(config.server.public_base(), "http://127.0.0.1:8080");

        let mut config = Config::default();
        config.server.public_url = Some("https://sheets.example.com/".to_string());
        assert_eq!(config.server.public_base(), "https://sheets.example.com");
    }
}
