use crate::models::{ClaimInfo, ClaimPayments, PaymentRecord};
use crate::repository::lock::SnapshotLock;
use crate::repository::memory::InMemoryClaimRepository;
use crate::repository::snapshot::{load_snapshot, save_snapshot};
use crate::repository::traits::{ClaimPaymentRepository, ConfirmOutcome, InvoiceOutcome};
use crate::repository::RepositoryError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

/// Repository backed by a JSON snapshot file.
///
/// Every mutation reloads the file under [`SnapshotLock`], applies the
/// compare-and-set, and writes the result back before releasing the lock, so
/// separate processes sharing the file never overwrite each other's changes.
pub struct SnapshotFileRepository {
    path: PathBuf,
    lock_timeout: Duration,
}

impl SnapshotFileRepository {
    pub fn new(path: impl Into<PathBuf>, lock_timeout: Duration) -> Self {
        Self {
            path: path.into(),
            lock_timeout,
        }
    }

    async fn load(&self) -> Result<InMemoryClaimRepository, RepositoryError> {
        InMemoryClaimRepository::from_snapshot(load_snapshot(&self.path).await?)
    }
}

#[async_trait]
impl ClaimPaymentRepository for SnapshotFileRepository {
    async fn list_claims(&self) -> Result<Vec<ClaimPayments>, RepositoryError> {
        Ok(self.load().await?.snapshot())
    }

    async fn find_payment(
        &self,
        payment_id: &str,
    ) -> Result<Option<(ClaimInfo, PaymentRecord)>, RepositoryError> {
        self.load().await?.find_payment(payment_id).await
    }

    async fn set_invoice_path(
        &self,
        payment_id: &str,
        invoice_url: &str,
    ) -> Result<InvoiceOutcome, RepositoryError> {
        let _lock = SnapshotLock::acquire(&self.path, self.lock_timeout).await?;
        let current = self.load().await?;
        let outcome = current.set_invoice_path(payment_id, invoice_url).await?;
        if outcome == InvoiceOutcome::Stored {
            save_snapshot(&self.path, &current.snapshot()).await?;
        }
        Ok(outcome)
    }

    async fn confirm_payment(&self, payment_id: &str) -> Result<ConfirmOutcome, RepositoryError> {
        let _lock = SnapshotLock::acquire(&self.path, self.lock_timeout).await?;
        let current = self.load().await?;
        let outcome = current.confirm_payment(payment_id).await?;
        if outcome == ConfirmOutcome::Confirmed {
            save_snapshot(&self.path, &current.snapshot()).await?;
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentStatus;
    use crate::repository::sample::sample_claims;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn seeded(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("claims.json");
        save_snapshot(&path, &sample_claims()).await.unwrap();
        path
    }

    fn open(path: &Path) -> SnapshotFileRepository {
        SnapshotFileRepository::new(path, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_changes_are_persisted() {
        let dir = TempDir::new().unwrap();
        let path = seeded(&dir).await;

        let repo = open(&path);
        assert_eq!(
            repo.confirm_payment("pay_2001").await.unwrap(),
            ConfirmOutcome::Confirmed
        );

        let reopened = open(&path);
        let (_, record) = reopened.find_payment("pay_2001").await.unwrap().unwrap();
        assert_eq!(record.payment_status, PaymentStatus::Confirmed);
        assert_eq!(reopened.list_claims().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_overlapping_actions_keep_both_changes() {
        let dir = TempDir::new().unwrap();
        let path = seeded(&dir).await;

        // Separate instances share nothing but the file, like two CLI runs
        let confirmer = open(&path);
        let uploader = open(&path);
        let (confirmed, stored) = tokio::join!(
            confirmer.confirm_payment("pay_2001"),
            uploader.set_invoice_path("pay_1001", "/uploads/invoices/pay_1001.pdf"),
        );
        assert_eq!(confirmed.unwrap(), ConfirmOutcome::Confirmed);
        assert_eq!(stored.unwrap(), InvoiceOutcome::Stored);

        let reloaded = open(&path);
        let (_, confirmed) = reloaded.find_payment("pay_2001").await.unwrap().unwrap();
        assert_eq!(confirmed.payment_status, PaymentStatus::Confirmed);
        let (_, uploaded) = reloaded.find_payment("pay_1001").await.unwrap().unwrap();
        assert_eq!(
            uploaded.invoice_path.as_deref(),
            Some("/uploads/invoices/pay_1001.pdf")
        );
    }

    #[tokio::test]
    async fn test_confirmed_survives_later_writer() {
        let dir = TempDir::new().unwrap();
        let path = seeded(&dir).await;

        // Second instance is created before the confirmation lands
        let first = open(&path);
        let second = open(&path);
        first.confirm_payment("pay_2001").await.unwrap();
        second
            .set_invoice_path("pay_1001", "/uploads/invoices/late.pdf")
            .await
            .unwrap();

        let (_, record) = open(&path).find_payment("pay_2001").await.unwrap().unwrap();
        assert_eq!(record.payment_status, PaymentStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_concurrent_writers_apply_each_transition_once() {
        let dir = TempDir::new().unwrap();
        let path = seeded(&dir).await;

        let mut confirms = Vec::new();
        let mut uploads = Vec::new();
        for i in 0..8 {
            let repo = Arc::new(open(&path));
            let uploader = Arc::clone(&repo);
            confirms.push(tokio::spawn(async move {
                repo.confirm_payment("pay_2001").await.unwrap()
            }));
            uploads.push(tokio::spawn(async move {
                let url = format!("/uploads/invoices/pay_1001-{}.pdf", i);
                let outcome = uploader.set_invoice_path("pay_1001", &url).await.unwrap();
                (outcome, url)
            }));
        }

        let mut confirmed = 0;
        for handle in confirms {
            if handle.await.unwrap() == ConfirmOutcome::Confirmed {
                confirmed += 1;
            }
        }
        assert_eq!(confirmed, 1);

        let mut winners = Vec::new();
        for handle in uploads {
            let (outcome, url) = handle.await.unwrap();
            if outcome == InvoiceOutcome::Stored {
                winners.push(url);
            }
        }
        assert_eq!(winners.len(), 1);

        let (_, record) = open(&path).find_payment("pay_1001").await.unwrap().unwrap();
        assert_eq!(record.invoice_path.as_deref(), Some(winners[0].as_str()));
        assert!(!SnapshotLock::path_for(&path).exists());
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let repo = open(&dir.path().join("missing.json"));
        assert!(matches!(
            repo.confirm_payment("pay_2001").await,
            Err(RepositoryError::Io { .. })
        ));
    }
}
