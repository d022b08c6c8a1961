// models/src/payment.rs
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ValidationError;

/// External processor a charge is routed through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayKind {
    Flutterwave,
    Paystack,
}

impl fmt::Display for GatewayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayKind::Flutterwave => write!(f, "flutterwave"),
            GatewayKind::Paystack => write!(f, "paystack"),
        }
    }
}

impl FromStr for GatewayKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "flutterwave" => Ok(GatewayKind::Flutterwave),
            "paystack" => Ok(GatewayKind::Paystack),
            other => Err(ValidationError::UnknownGateway(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    Pending,
    Success,
}

/// A record of an attempted payment. Status moves PENDING -> SUCCESS exactly
/// once, after the gateway's verification step confirms it, and never back.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentTransaction {
    pub id: Uuid,
    /// Globally unique reference handed to the gateway as tx_ref/reference.
    pub reference: String,
    pub patient_id: Uuid,
    /// None marks a subscription payment rather than a package purchase.
    pub package_id: Option<Uuid>,
    pub amount: u64,
    pub gateway: GatewayKind,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentTransaction {
    pub fn pending(
        reference: String,
        patient_id: Uuid,
        package_id: Option<Uuid>,
        amount: u64,
        gateway: GatewayKind,
    ) -> Self {
        let now = Utc::now();
        PaymentTransaction {
            id: Uuid::new_v4(),
            reference,
            patient_id,
            package_id,
            amount,
            gateway,
            status: PaymentStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}
