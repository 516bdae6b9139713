use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Runtime configuration, read from `config.toml`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// JSON snapshot holding claims and payments
    pub data_file: PathBuf,
    /// Pending flash message between invocations
    pub flash_file: PathBuf,
    /// Directory uploaded invoices are written to
    pub upload_dir: PathBuf,
    /// URL prefix under which `upload_dir` is served
    pub public_base_url: String,
    pub max_invoice_bytes: u64,
    /// How long an action waits for another one holding the data file
    pub lock_timeout_ms: u64,
    /// Accepted invoice file extensions, lower case
    pub allowed_extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("data/claims.json"),
            flash_file: PathBuf::from("data/flash.json"),
            upload_dir: PathBuf::from("uploads/invoices"),
            public_base_url: "/uploads/invoices".to_string(),
            max_invoice_bytes: 10 * 1024 * 1024,
            lock_timeout_ms: 5_000,
            allowed_extensions: ["pdf", "png", "jpg", "jpeg"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl Config {
    /// Load config from a specific path, falling back to defaults if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "data_file = \"/srv/claims.json\"\nmax_invoice_bytes = 2048\nallowed_extensions = [\"pdf\"]\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.data_file, PathBuf::from("/srv/claims.json"));
        assert_eq!(config.max_invoice_bytes, 2048);
        assert_eq!(config.upload_dir, PathBuf::from("uploads/invoices"));
        assert_eq!(config.lock_timeout(), Duration::from_secs(5));
        assert_eq!(config.allowed_extensions, vec!["pdf".to_string()]);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "max_invoice_bytes = \"lots\"").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
