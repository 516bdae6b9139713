use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Severity of a status message shown to the operator
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Info,
    Success,
    Warning,
    Danger,
}

impl fmt::Display for FlashLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FlashLevel::Info => "info",
            FlashLevel::Success => "success",
            FlashLevel::Warning => "warning",
            FlashLevel::Danger => "danger",
        };
        f.write_str(label)
    }
}

/// One-shot status message produced by an action and shown on the next render
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlashMessage {
    pub text: String,
    pub level: FlashLevel,
}

impl FlashMessage {
    pub fn new(level: FlashLevel, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level,
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(FlashLevel::Success, text)
    }
}

/// File-backed slot carrying a flash message across CLI invocations.
///
/// `take` reads and deletes the file, so a stored message is returned once.
pub struct FlashStore {
    path: PathBuf,
}

impl FlashStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store a message, replacing any unread one
    pub async fn put(&self, message: &FlashMessage) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string(message)?;
        tokio::fs::write(&self.path, json)
            .await
            .with_context(|| format!("Failed to write flash message to {}", self.path.display()))?;
        debug!(level = %message.level, "Stored flash message");
        Ok(())
    }

    /// Consume the pending message, if any
    pub async fn take(&self) -> Result<Option<FlashMessage>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read flash message from {}", self.path.display())
                })
            }
        };

        tokio::fs::remove_file(&self.path)
            .await
            .with_context(|| format!("Failed to clear flash message at {}", self.path.display()))?;

        // The slot is already cleared, so a corrupt message is dropped rather than
        // blocking every later render
        match serde_json::from_str(&content) {
            Ok(message) => Ok(Some(message)),
            Err(e) => {
                warn!(
                    "Discarding malformed flash message at {}: {}",
                    self.path.display(),
                    e
                );
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_take_consumes_message() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("flash.json");
        let store = FlashStore::new(&path);

        store.put(&FlashMessage::success("Payment confirmed")).await.unwrap();

        let first = store.take().await.unwrap();
        assert_eq!(first, Some(FlashMessage::success("Payment confirmed")));
        assert_eq!(store.take().await.unwrap(), None);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_malformed_message_is_dropped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("flash.json");
        tokio::fs::write(&path, "{\"text\": \"half").await.unwrap();

        let store = FlashStore::new(&path);
        assert_eq!(store.take().await.unwrap(), None);
        assert!(!path.exists());

        store.put(&FlashMessage::success("Invoice uploaded")).await.unwrap();
        assert_eq!(
            store.take().await.unwrap(),
            Some(FlashMessage::success("Invoice uploaded"))
        );
    }

    #[tokio::test]
    async fn test_take_without_message() {
        let dir = TempDir::new().unwrap();
        let store = FlashStore::new(dir.path().join("nested").join("flash.json"));
        assert_eq!(store.take().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_replaces_unread_message() {
        let dir = TempDir::new().unwrap();
        let store = FlashStore::new(dir.path().join("state").join("flash.json"));

        store.put(&FlashMessage::new(FlashLevel::Warning, "first")).await.unwrap();
        store.put(&FlashMessage::new(FlashLevel::Danger, "second")).await.unwrap();

        let message = store.take().await.unwrap().unwrap();
        assert_eq!(message.level, FlashLevel::Danger);
        assert_eq!(message.text, "second");
    }
}
