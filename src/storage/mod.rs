use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

/// An invoice file submitted by the operator
#[derive(Debug, Clone)]
pub struct InvoiceUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl InvoiceUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Read an invoice from disk, refusing files larger than `max_bytes`
    pub async fn from_path(path: &Path, max_bytes: u64) -> Result<Self> {
        let metadata = tokio::fs::metadata(path)
            .await
            .with_context(|| format!("Failed to read invoice file {}", path.display()))?;
        if metadata.len() > max_bytes {
            anyhow::bail!(
                "invoice file {} is {} bytes, limit is {}",
                path.display(),
                metadata.len(),
                max_bytes
            );
        }

        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read invoice file {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(file_name, bytes))
    }

    /// Lower-cased extension of the original file name
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }
}

/// Where uploaded invoices end up
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Persist the upload and return its public URL
    async fn store(&self, payment_id: &str, upload: &InvoiceUpload) -> Result<String>;

    /// Remove a previously stored invoice
    async fn discard(&self, url: &str) -> Result<()>;
}

/// Stores invoices as files under a local directory
pub struct LocalInvoiceStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalInvoiceStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url_for(&self, file_name: &str) -> String {
        format!("{}/{}", self.public_base_url, file_name)
    }

    fn path_for_url(&self, url: &str) -> Option<PathBuf> {
        let file_name = url.strip_prefix(&self.public_base_url)?.trim_start_matches('/');
        if file_name.is_empty() || file_name.contains('/') || file_name.contains("..") {
            return None;
        }
        Some(self.root.join(file_name))
    }
}

#[async_trait]
impl InvoiceStore for LocalInvoiceStore {
    async fn store(&self, payment_id: &str, upload: &InvoiceUpload) -> Result<String> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("Failed to create upload directory {}", self.root.display()))?;

        let file_name = match upload.extension() {
            Some(ext) => format!("{}-{}.{}", payment_id, Uuid::new_v4(), ext),
            None => format!("{}-{}", payment_id, Uuid::new_v4()),
        };
        let path = self.root.join(&file_name);

        tokio::fs::write(&path, &upload.bytes)
            .await
            .with_context(|| format!("Failed to write invoice to {}", path.display()))?;

        info!(payment_id, bytes = upload.bytes.len(), "Stored invoice {}", file_name);
        Ok(self.url_for(&file_name))
    }

    async fn discard(&self, url: &str) -> Result<()> {
        let Some(path) = self.path_for_url(url) else {
            anyhow::bail!("Invoice URL {} is not served by this store", url);
        };
        tokio::fs::remove_file(&path)
            .await
            .with_context(|| format!("Failed to remove invoice {}", path.display()))?;
        debug!("Discarded invoice {}", path.display());
        Ok(())
    }
}
