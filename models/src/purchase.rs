// models/src/purchase.rs
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::MarketResult;
use crate::identifiers::{MhNumber, SerialNumber};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RedemptionStatus {
    Pending,
    Redeemed,
    Expired,
    Cancelled,
}

impl RedemptionStatus {
    /// Every state except PENDING is terminal; transitions are one-way and
    /// no state is ever reverted.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RedemptionStatus::Pending)
    }
}

impl fmt::Display for RedemptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedemptionStatus::Pending => write!(f, "PENDING"),
            RedemptionStatus::Redeemed => write!(f, "REDEEMED"),
            RedemptionStatus::Expired => write!(f, "EXPIRED"),
            RedemptionStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Payload embedded in the voucher QR code, rendered client-side. Encoded
/// exactly once, at issuance, from fields known before insert.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrPayload {
    pub serial: SerialNumber,
    pub mh_number: MhNumber,
    pub patient_id: Uuid,
    pub package_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

impl QrPayload {
    pub fn encode(&self) -> MarketResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(raw: &str) -> MarketResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// A redeemable record proving a patient paid for (or received free) a
/// specific package. Created once when a payment is confirmed, mutated
/// exactly once by redemption, never deleted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PackagePurchase {
    pub id: Uuid,
    pub serial: SerialNumber,
    pub patient_id: Uuid,
    pub package_id: Uuid,
    /// Denormalized from the package at issuance.
    pub provider_id: Uuid,
    pub price: u64,
    pub qr_payload: QrPayload,
    pub redemption_status: RedemptionStatus,
    pub purchased_at: DateTime<Utc>,
    pub redeemed_at: Option<DateTime<Utc>>,
    pub redeemed_by: Option<String>,
}

/// A voucher joined with its package and provider, as listed on the patient
/// dashboard.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseSummary {
    #[serde(flatten)]
    pub purchase: PackagePurchase,
    pub package_name: String,
    pub treatment_type: String,
    pub provider_name: String,
    pub provider_location: String,
}
