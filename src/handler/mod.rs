pub mod error;

pub use error::ActionError;

use crate::config::Config;
use crate::flash::FlashMessage;
use crate::models::PaymentType;
use crate::repository::{ClaimPaymentRepository, ConfirmOutcome, InvoiceOutcome};
use crate::storage::{InvoiceStore, InvoiceUpload};
use std::sync::Arc;
use tracing::{info, warn};

/// Limits applied to uploaded invoice files
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub max_bytes: u64,
    pub allowed_extensions: Vec<String>,
}

impl UploadPolicy {
    fn check(&self, upload: &InvoiceUpload) -> Result<(), ActionError> {
        if upload.bytes.is_empty() {
            return Err(ActionError::Upload("invoice file is empty".to_string()));
        }
        if upload.bytes.len() as u64 > self.max_bytes {
            return Err(ActionError::Upload(format!(
                "invoice file is {} bytes, limit is {}",
                upload.bytes.len(),
                self.max_bytes
            )));
        }

        let allowed = upload.extension().is_some_and(|ext| {
            self.allowed_extensions
                .iter()
                .any(|a| a.eq_ignore_ascii_case(&ext))
        });
        if !allowed {
            return Err(ActionError::Upload(format!(
                "{} is not an accepted invoice type ({})",
                upload.file_name,
                self.allowed_extensions.join(", ")
            )));
        }
        Ok(())
    }
}

impl From<&Config> for UploadPolicy {
    fn from(config: &Config) -> Self {
        Self {
            max_bytes: config.max_invoice_bytes,
            allowed_extensions: config.allowed_extensions.clone(),
        }
    }
}

/// Applies the two operator actions of the payment review screen.
///
/// Every check the screen uses to hide a control is repeated here; a request
/// for a control that should not have been shown is rejected.
pub struct PaymentActionHandler {
    repository: Arc<dyn ClaimPaymentRepository>,
    store: Arc<dyn InvoiceStore>,
    policy: UploadPolicy,
}

impl PaymentActionHandler {
    pub fn new(
        repository: Arc<dyn ClaimPaymentRepository>,
        store: Arc<dyn InvoiceStore>,
        policy: UploadPolicy,
    ) -> Self {
        Self {
            repository,
            store,
            policy,
        }
    }

    /// Upload an invoice and report the outcome as a flash message
    pub async fn upload_invoice(
        &self,
        payment_id: &str,
        upload: Option<InvoiceUpload>,
    ) -> FlashMessage {
        match self.try_upload_invoice(payment_id, upload).await {
            Ok(url) => {
                info!(payment_id, invoice_url = %url, "Invoice uploaded");
                FlashMessage::success(format!("Invoice uploaded for payment {}", payment_id))
            }
            Err(e) => {
                warn!(payment_id, error = %e, "Invoice upload rejected");
                FlashMessage::from(&e)
            }
        }
    }

    /// Confirm a payment and report the outcome as a flash message
    pub async fn confirm_payment(&self, payment_id: &str) -> FlashMessage {
        match self.try_confirm_payment(payment_id).await {
            Ok(()) => {
                info!(payment_id, "Payment confirmed");
                FlashMessage::success(format!("Payment {} confirmed", payment_id))
            }
            Err(e) => {
                warn!(payment_id, error = %e, "Payment confirmation rejected");
                FlashMessage::from(&e)
            }
        }
    }

    /// Store the invoice and record its URL; returns the URL
    pub async fn try_upload_invoice(
        &self,
        payment_id: &str,
        upload: Option<InvoiceUpload>,
    ) -> Result<String, ActionError> {
        let Some((claim, payment)) = self.repository.find_payment(payment_id).await? else {
            return Err(not_found(payment_id));
        };

        if payment.invoice_path.is_some() {
            return Err(ActionError::Validation(format!(
                "Invoice for payment {} has already been uploaded",
                payment_id
            )));
        }
        if payment.payment_type == PaymentType::Deposit && claim.meeting_report_path.is_none() {
            return Err(ActionError::Precondition(format!(
                "Deposit invoice for claim {} requires a meeting report first",
                claim.claim_id
            )));
        }

        let upload =
            upload.ok_or_else(|| ActionError::Upload("no invoice file provided".to_string()))?;
        self.policy.check(&upload)?;

        let url = self
            .store
            .store(payment_id, &upload)
            .await
            .map_err(|e| ActionError::Upload(format!("{:#}", e)))?;

        match self.repository.set_invoice_path(payment_id, &url).await {
            Ok(InvoiceOutcome::Stored) => Ok(url),
            Ok(outcome) => {
                self.discard(&url).await;
                Err(match outcome {
                    InvoiceOutcome::NotFound => not_found(payment_id),
                    _ => ActionError::Validation(format!(
                        "Invoice for payment {} has already been uploaded",
                        payment_id
                    )),
                })
            }
            Err(e) => {
                self.discard(&url).await;
                Err(e.into())
            }
        }
    }

    /// Apply `pending -> confirmed` if the payment has invoice and proof
    pub async fn try_confirm_payment(&self, payment_id: &str) -> Result<(), ActionError> {
        match self.repository.confirm_payment(payment_id).await? {
            ConfirmOutcome::Confirmed => Ok(()),
            ConfirmOutcome::AlreadyConfirmed => Err(ActionError::Validation(format!(
                "Payment {} is already confirmed",
                payment_id
            ))),
            ConfirmOutcome::MissingDocuments => Err(ActionError::Validation(format!(
                "Payment {} needs both an invoice and proof of payment before it can be confirmed",
                payment_id
            ))),
            ConfirmOutcome::NotFound => Err(not_found(payment_id)),
        }
    }

    async fn discard(&self, url: &str) {
        if let Err(e) = self.store.discard(url).await {
            warn!(invoice_url = url, "Failed to discard unused invoice: {:#}", e);
        }
    }
}

fn not_found(payment_id: &str) -> ActionError {
    ActionError::Validation(format!("Payment {} not found", payment_id))
}
