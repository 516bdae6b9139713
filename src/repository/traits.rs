use crate::models::{ClaimInfo, ClaimPayments, PaymentRecord};
use crate::repository::RepositoryError;
use async_trait::async_trait;

/// Result of recording an uploaded invoice against a payment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvoiceOutcome {
    Stored,
    AlreadyUploaded,
    NotFound,
}

/// Result of the `pending -> confirmed` compare-and-set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Confirmed,
    AlreadyConfirmed,
    MissingDocuments,
    NotFound,
}

/// Source of claims and their payments.
///
/// Both mutations are compare-and-set on the payment identified by
/// `payment_id`: concurrent callers observe at most one successful transition.
#[async_trait]
pub trait ClaimPaymentRepository: Send + Sync {
    /// All claims with their payments, in stored order
    async fn list_claims(&self) -> Result<Vec<ClaimPayments>, RepositoryError>;

    /// A payment together with its parent claim
    async fn find_payment(
        &self,
        payment_id: &str,
    ) -> Result<Option<(ClaimInfo, PaymentRecord)>, RepositoryError>;

    /// Set `invoice_path` if it is still unset
    async fn set_invoice_path(
        &self,
        payment_id: &str,
        invoice_url: &str,
    ) -> Result<InvoiceOutcome, RepositoryError>;

    /// Move a pending payment with invoice and proof to confirmed
    async fn confirm_payment(&self, payment_id: &str) -> Result<ConfirmOutcome, RepositoryError>;
}
