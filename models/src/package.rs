// models/src/package.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthcarePackage {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub name: String,
    pub description: String,
    /// Integer price, minor-unit-free. Currency is implied by the provider's
    /// location.
    pub price: u64,
    /// Free text, e.g. "3 months", "single visit".
    pub duration: String,
    /// Free-text category, e.g. "DENTAL", "ANTENATAL", "OPTICAL".
    pub treatment_type: String,
    pub is_free: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPackage {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub price: u64,
    pub duration: String,
    pub treatment_type: String,
    #[serde(default)]
    pub is_free: bool,
}

/// Partial update from the provider dashboard; absent fields keep their
/// stored value.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<u64>,
    pub duration: Option<String>,
    pub treatment_type: Option<String>,
    pub is_free: Option<bool>,
    pub is_active: Option<bool>,
}
