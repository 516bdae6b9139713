use crate::models::{ClaimInfo, ClaimPayments, PaymentRecord, PaymentStatus};
use crate::repository::traits::{ClaimPaymentRepository, ConfirmOutcome, InvoiceOutcome};
use crate::repository::RepositoryError;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

struct StoredPayment {
    claim_id: String,
    record: PaymentRecord,
}

/// In-memory repository keyed by claim and payment id.
///
/// Claim order and per-claim payment order are fixed at construction.
/// Mutations hold the payment's shard lock for the whole check-and-set.
pub struct InMemoryClaimRepository {
    order: Vec<(String, Vec<String>)>,
    claims: Arc<DashMap<String, ClaimInfo>>,
    payments: Arc<DashMap<String, StoredPayment>>,
}

impl InMemoryClaimRepository {
    pub fn from_snapshot(claims: Vec<ClaimPayments>) -> Result<Self, RepositoryError> {
        let claim_map = DashMap::new();
        let payment_map = DashMap::new();
        let mut order = Vec::with_capacity(claims.len());
        let mut seen_payments = HashSet::new();

        for ClaimPayments { info, payments } in claims {
            let claim_id = info.claim_id.clone();
            if claim_map.contains_key(&claim_id) {
                return Err(RepositoryError::DuplicateClaim(claim_id));
            }

            let mut payment_ids = Vec::with_capacity(payments.len());
            for record in payments {
                if !seen_payments.insert(record.payment_id.clone()) {
                    return Err(RepositoryError::DuplicatePayment(record.payment_id));
                }
                payment_ids.push(record.payment_id.clone());
                payment_map.insert(
                    record.payment_id.clone(),
                    StoredPayment {
                        claim_id: claim_id.clone(),
                        record,
                    },
                );
            }

            claim_map.insert(claim_id.clone(), info);
            order.push((claim_id, payment_ids));
        }

        Ok(Self {
            order,
            claims: Arc::new(claim_map),
            payments: Arc::new(payment_map),
        })
    }

    /// Current contents in stored order
    pub fn snapshot(&self) -> Vec<ClaimPayments> {
        self.order
            .iter()
            .filter_map(|(claim_id, payment_ids)| {
                let info = self.claims.get(claim_id)?.value().clone();
                let payments = payment_ids
                    .iter()
                    .filter_map(|id| self.payments.get(id).map(|p| p.record.clone()))
                    .collect();
                Some(ClaimPayments { info, payments })
            })
            .collect()
    }
}

#[async_trait]
impl ClaimPaymentRepository for InMemoryClaimRepository {
    async fn list_claims(&self) -> Result<Vec<ClaimPayments>, RepositoryError> {
        Ok(self.snapshot())
    }

    async fn find_payment(
        &self,
        payment_id: &str,
    ) -> Result<Option<(ClaimInfo, PaymentRecord)>, RepositoryError> {
        let (claim_id, record) = match self.payments.get(payment_id) {
            Some(stored) => (stored.claim_id.clone(), stored.record.clone()),
            None => return Ok(None),
        };
        Ok(self
            .claims
            .get(&claim_id)
            .map(|info| (info.value().clone(), record)))
    }

    async fn set_invoice_path(
        &self,
        payment_id: &str,
        invoice_url: &str,
    ) -> Result<InvoiceOutcome, RepositoryError> {
        let Some(mut stored) = self.payments.get_mut(payment_id) else {
            return Ok(InvoiceOutcome::NotFound);
        };
        if stored.record.invoice_path.is_some() {
            return Ok(InvoiceOutcome::AlreadyUploaded);
        }

        stored.record.invoice_path = Some(invoice_url.to_string());
        debug!(payment_id, invoice_url, "Invoice path set");
        Ok(InvoiceOutcome::Stored)
    }

    async fn confirm_payment(&self, payment_id: &str) -> Result<ConfirmOutcome, RepositoryError> {
        let Some(mut stored) = self.payments.get_mut(payment_id) else {
            return Ok(ConfirmOutcome::NotFound);
        };
        let record = &mut stored.record;
        if record.payment_status.is_confirmed() {
            return Ok(ConfirmOutcome::AlreadyConfirmed);
        }
        if !record.has_invoice_and_proof() {
            return Ok(ConfirmOutcome::MissingDocuments);
        }

        record.payment_status = PaymentStatus::Confirmed;
        debug!(payment_id, "Payment status set to confirmed");
        Ok(ConfirmOutcome::Confirmed)
    }
}
