use crate::flash::FlashMessage;
use crate::models::{ClaimInfo, ClaimPayments, PaymentRecord, PaymentStatus, PaymentType};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// What the "Invoice" column shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value")]
pub enum InvoiceCell {
    Link(String),
    UploadForm(String),
    NotUploaded,
}

/// What the "Proof" column shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value")]
pub enum ProofCell {
    Link(String),
    NoneLabel,
}

/// What the action column shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value")]
pub enum ActionCell {
    ConfirmedLabel,
    ConfirmButton(String),
    WaitingLabel,
}

/// What the "Status" column shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum StatusCell {
    ConfirmedLabel,
    PendingLabel,
}

/// Display state of a single payment row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowView {
    pub invoice_cell: InvoiceCell,
    pub proof_cell: ProofCell,
    pub action_cell: ActionCell,
    pub status_cell: StatusCell,
}

/// Observed lifecycle state of a payment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentState {
    NoInvoiceNoProof,
    InvoiceOnly,
    ProofOnly,
    InvoiceAndProof,
    Confirmed,
}

impl PaymentState {
    pub fn of(record: &PaymentRecord) -> Self {
        if record.payment_status.is_confirmed() {
            return PaymentState::Confirmed;
        }
        match (record.invoice_path.is_some(), record.payment_proof.is_some()) {
            (false, false) => PaymentState::NoInvoiceNoProof,
            (true, false) => PaymentState::InvoiceOnly,
            (false, true) => PaymentState::ProofOnly,
            (true, true) => PaymentState::InvoiceAndProof,
        }
    }

    /// Confirmation is only offered from `InvoiceAndProof`
    pub fn can_confirm(&self) -> bool {
        matches!(self, PaymentState::InvoiceAndProof)
    }
}

/// Derive the four table cells for one payment. Never fails; inconsistent
/// records (confirmed without proof, say) render as their status dictates.
pub fn present_row(claim: &ClaimInfo, payment: &PaymentRecord) -> RowView {
    RowView {
        invoice_cell: invoice_cell(claim, payment),
        proof_cell: match &payment.payment_proof {
            Some(url) => ProofCell::Link(url.clone()),
            None => ProofCell::NoneLabel,
        },
        action_cell: action_cell(payment),
        status_cell: match payment.payment_status {
            PaymentStatus::Confirmed => StatusCell::ConfirmedLabel,
            PaymentStatus::Pending => StatusCell::PendingLabel,
        },
    }
}

fn invoice_cell(claim: &ClaimInfo, payment: &PaymentRecord) -> InvoiceCell {
    if let Some(url) = &payment.invoice_path {
        return InvoiceCell::Link(url.clone());
    }
    match payment.payment_type {
        PaymentType::Claim => InvoiceCell::UploadForm(payment.payment_id.clone()),
        // Deposit invoices wait for the meeting report
        PaymentType::Deposit if claim.meeting_report_path.is_some() => {
            InvoiceCell::UploadForm(payment.payment_id.clone())
        }
        PaymentType::Deposit => InvoiceCell::NotUploaded,
    }
}

fn action_cell(payment: &PaymentRecord) -> ActionCell {
    let state = PaymentState::of(payment);
    if state == PaymentState::Confirmed {
        ActionCell::ConfirmedLabel
    } else if state.can_confirm() {
        ActionCell::ConfirmButton(payment.payment_id.clone())
    } else {
        ActionCell::WaitingLabel
    }
}

/// One row of a claim card's payment table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentRow {
    pub payment_id: String,
    pub payment_type: String,
    pub view: RowView,
}

/// Header fields and payment rows for one claim
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimCard {
    pub claim_id: String,
    pub property_id: String,
    pub property_name: String,
    pub location: String,
    pub image: Option<String>,
    pub claimed_at: DateTime<Utc>,
    pub meeting_report_path: Option<String>,
    pub rows: Vec<PaymentRow>,
}

pub fn present_claim(claim: &ClaimPayments) -> ClaimCard {
    let info = &claim.info;
    let rows = claim
        .payments
        .iter()
        .map(|payment| PaymentRow {
            payment_id: payment.payment_id.clone(),
            payment_type: payment.payment_type.to_string(),
            view: present_row(info, payment),
        })
        .collect();

    ClaimCard {
        claim_id: info.claim_id.clone(),
        property_id: info.property_id.clone(),
        property_name: info.property_name.clone(),
        location: info.location.clone(),
        image: info.image.clone(),
        claimed_at: info.claimed_at,
        meeting_report_path: info.meeting_report_path.clone(),
        rows,
    }
}

/// Everything a renderer needs for the payment review screen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewPage {
    pub flash: Option<FlashMessage>,
    pub cards: Vec<ClaimCard>,
}

/// Build the review page. The flash message is moved in, so it is shown once.
pub fn render_page(claims: &[ClaimPayments], flash: Option<FlashMessage>) -> ReviewPage {
    ReviewPage {
        flash,
        cards: claims.iter().map(present_claim).collect(),
    }
}

impl fmt::Display for InvoiceCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvoiceCell::Link(url) => write!(f, "{}", url),
            InvoiceCell::UploadForm(id) => write!(f, "[upload invoice: {}]", id),
            InvoiceCell::NotUploaded => f.write_str("Not uploaded"),
        }
    }
}

impl fmt::Display for ProofCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProofCell::Link(url) => write!(f, "{}", url),
            ProofCell::NoneLabel => f.write_str("None"),
        }
    }
}

impl fmt::Display for ActionCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionCell::ConfirmedLabel => f.write_str("Confirmed"),
            ActionCell::ConfirmButton(id) => write!(f, "[confirm: {}]", id),
            ActionCell::WaitingLabel => f.write_str("Waiting for invoice & proof"),
        }
    }
}

impl fmt::Display for StatusCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusCell::ConfirmedLabel => f.write_str("Confirmed"),
            StatusCell::PendingLabel => f.write_str("Pending"),
        }
    }
}
