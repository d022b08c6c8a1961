// models/src/provider.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identifiers::MhpNumber;

/// Per-provider gateway credentials, editable from the provider dashboard.
/// Secrets are write-only from the API perspective.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentSettings {
    pub flutterwave_secret_key: Option<String>,
    pub paystack_secret_key: Option<String>,
    pub settlement_bank: Option<String>,
    pub settlement_account: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthcareProvider {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub contact_person: String,
    /// Free-text category, e.g. "HOSPITAL", "PHARMACY", "DIAGNOSTICS".
    pub category: String,
    pub location: String,
    pub phone: String,
    pub mhp_number: MhpNumber,
    pub is_active: bool,
    pub is_revoked: bool,
    pub revoked_at: Option<DateTime<Utc>>,
    pub revoked_by: Option<String>,
    pub revoked_reason: Option<String>,
    pub payment_settings: PaymentSettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HealthcareProvider {
    /// A provider is listable in the marketplace only while active and not
    /// revoked.
    pub fn is_listable(&self) -> bool {
        self.is_active && !self.is_revoked
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProvider {
    pub email: String,
    pub password: String,
    pub name: String,
    pub contact_person: String,
    pub category: String,
    pub location: String,
    pub phone: String,
}
