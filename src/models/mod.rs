use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Kind of payment attached to a claim
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Claim,
    Deposit,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Claim => "claim",
            PaymentType::Deposit => "deposit",
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&capitalize_first(self.as_str()))
    }
}

/// Settlement status of a payment. `Confirmed` is terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Confirmed,
}

impl PaymentStatus {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, PaymentStatus::Confirmed)
    }
}

/// Read-only snapshot of a claim and the property it was raised against
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClaimInfo {
    pub claim_id: String,
    pub property_id: String,
    pub property_name: String,
    pub location: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub image: Option<String>,
    pub claimed_at: DateTime<Utc>,
    /// Set once a meeting report has been filed for the claim
    #[serde(default, deserialize_with = "empty_as_none")]
    pub meeting_report_path: Option<String>,
}

/// One payment (claim or deposit) belonging to a claim
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentRecord {
    pub payment_id: String,
    pub payment_type: PaymentType,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub invoice_path: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub payment_proof: Option<String>,
    pub payment_status: PaymentStatus,
}

impl PaymentRecord {
    pub fn has_invoice_and_proof(&self) -> bool {
        self.invoice_path.is_some() && self.payment_proof.is_some()
    }
}

/// A claim together with its payments, in display order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClaimPayments {
    pub info: ClaimInfo,
    pub payments: Vec<PaymentRecord>,
}

/// Upper-case the first character only: `claim` -> `Claim`
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Normalise an empty or blank string to `None`
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(non_empty(value))
}
