use crate::models::ClaimPayments;
use crate::repository::RepositoryError;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Load claims from a JSON snapshot file
pub async fn load_snapshot(path: &Path) -> Result<Vec<ClaimPayments>, RepositoryError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| RepositoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let claims: Vec<ClaimPayments> = serde_json::from_str(&content)?;
    debug!("Loaded {} claims from {}", claims.len(), path.display());
    Ok(claims)
}

/// Write claims to a JSON snapshot file, creating parent directories.
///
/// The file is replaced by rename, so readers see either the old or the new
/// snapshot, never a partial one.
pub async fn save_snapshot(path: &Path, claims: &[ClaimPayments]) -> Result<(), RepositoryError> {
    let io_error = |source: std::io::Error| RepositoryError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    tokio::fs::create_dir_all(&dir).await.map_err(io_error)?;

    let json = serde_json::to_string_pretty(claims)?;
    let target = path.to_path_buf();
    tokio::task::spawn_blocking(move || write_atomic(&dir, &target, json.as_bytes()))
        .await
        .map_err(|e| io_error(std::io::Error::other(e)))?
        .map_err(io_error)?;

    info!("💾 Saved {} claims to {}", claims.len(), path.display());
    Ok(())
}

fn write_atomic(dir: &Path, target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(target).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentType;
    use crate::repository::sample::sample_claims;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("claims.json");

        save_snapshot(&path, &sample_claims()).await.unwrap();
        let loaded = load_snapshot(&path).await.unwrap();
        assert_eq!(loaded, sample_claims());
    }

    #[tokio::test]
    async fn test_load_normalises_empty_urls() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("claims.json");
        let json = r#"[{
            "info": {
                "claim_id": "c1",
                "property_id": "p1",
                "property_name": "Folkungagatan 101",
                "location": "Södermalm",
                "image": "",
                "claimed_at": "2024-03-01T10:00:00Z",
                "meeting_report_path": ""
            },
            "payments": [{
                "payment_id": "pay_1",
                "payment_type": "deposit",
                "invoice_path": "",
                "payment_proof": "",
                "payment_status": "pending"
            }]
        }]"#;
        tokio::fs::write(&path, json).await.unwrap();

        let claims = load_snapshot(&path).await.unwrap();
        assert_eq!(claims[0].info.image, None);
        assert_eq!(claims[0].info.meeting_report_path, None);
        assert_eq!(claims[0].payments[0].payment_type, PaymentType::Deposit);
        assert_eq!(claims[0].payments[0].invoice_path, None);
        assert_eq!(claims[0].payments[0].payment_proof, None);
    }

    #[tokio::test]
    async fn test_save_replaces_without_leftovers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("claims.json");

        save_snapshot(&path, &sample_claims()).await.unwrap();
        save_snapshot(&path, &sample_claims()[..1]).await.unwrap();

        assert_eq!(load_snapshot(&path).await.unwrap().len(), 1);
        let mut entries = std::fs::read_dir(dir.path()).unwrap();
        assert_eq!(entries.next().unwrap().unwrap().file_name(), "claims.json");
        assert!(entries.next().is_none());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_snapshot(&dir.path().join("nope.json")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Io { .. }));
    }
}
