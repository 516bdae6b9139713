use crate::models::{ClaimInfo, ClaimPayments, PaymentRecord, PaymentStatus, PaymentType};
use chrono::{DateTime, TimeZone, Utc};

fn payment(
    id: &str,
    payment_type: PaymentType,
    invoice: Option<&str>,
    proof: Option<&str>,
    status: PaymentStatus,
) -> PaymentRecord {
    PaymentRecord {
        payment_id: id.to_string(),
        payment_type,
        invoice_path: invoice.map(str::to_string),
        payment_proof: proof.map(str::to_string),
        payment_status: status,
    }
}

fn at(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
        .single()
        .unwrap_or_default()
}

/// Sample Södermalm claims covering every payment state
pub fn sample_claims() -> Vec<ClaimPayments> {
    vec![
        ClaimPayments {
            info: ClaimInfo {
                claim_id: "claim_1".to_string(),
                property_id: "booli_sodermalm_1".to_string(),
                property_name: "Götgatan 120".to_string(),
                location: "Södermalm, Stockholm".to_string(),
                image: Some("/images/gotgatan-120.jpg".to_string()),
                claimed_at: at(2024, 3, 4, 9, 30, 0),
                meeting_report_path: None,
            },
            payments: vec![
                payment("pay_1001", PaymentType::Claim, None, None, PaymentStatus::Pending),
                payment("pay_1002", PaymentType::Deposit, None, None, PaymentStatus::Pending),
            ],
        },
        ClaimPayments {
            info: ClaimInfo {
                claim_id: "claim_2".to_string(),
                property_id: "booli_sodermalm_2".to_string(),
                property_name: "Ringvägen 11A".to_string(),
                location: "Södermalm, Stockholm".to_string(),
                image: None,
                claimed_at: at(2024, 3, 11, 14, 0, 0),
                meeting_report_path: Some("/reports/claim_2-meeting.pdf".to_string()),
            },
            payments: vec![
                payment(
                    "pay_2001",
                    PaymentType::Claim,
                    Some("/uploads/invoices/pay_2001.pdf"),
                    Some("/uploads/proofs/pay_2001.png"),
                    PaymentStatus::Pending,
                ),
                payment(
                    "pay_2002",
                    PaymentType::Deposit,
                    None,
                    Some("/uploads/proofs/pay_2002.png"),
                    PaymentStatus::Pending,
                ),
            ],
        },
        ClaimPayments {
            info: ClaimInfo {
                claim_id: "claim_3".to_string(),
                property_id: "booli_sodermalm_3".to_string(),
                property_name: "Tjustgatan 4".to_string(),
                location: "Katarina, Stockholm".to_string(),
                image: None,
                claimed_at: at(2024, 2, 20, 8, 15, 0),
                meeting_report_path: Some("/reports/claim_3-meeting.pdf".to_string()),
            },
            payments: vec![
                payment(
                    "pay_3001",
                    PaymentType::Claim,
                    Some("/uploads/invoices/pay_3001.pdf"),
                    Some("/uploads/proofs/pay_3001.png"),
                    PaymentStatus::Confirmed,
                ),
                payment("pay_3002", PaymentType::Deposit, None, None, PaymentStatus::Confirmed),
            ],
        },
    ]
}
