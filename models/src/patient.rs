// models/src/patient.rs
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identifiers::{GfpCode, MhNumber};

/// Tier a patient subscribes at. Governs the annual price for paid plans.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SubscriptionType {
    Single,
    Family,
    Corporate,
}

impl fmt::Display for SubscriptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionType::Single => write!(f, "SINGLE"),
            SubscriptionType::Family => write!(f, "FAMILY"),
            SubscriptionType::Corporate => write!(f, "CORPORATE"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SubscriptionStatus {
    Inactive,
    Active,
    Expired,
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionStatus::Inactive => write!(f, "INACTIVE"),
            SubscriptionStatus::Active => write!(f, "ACTIVE"),
            SubscriptionStatus::Expired => write!(f, "EXPIRED"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SubscriptionPlanType {
    Paid,
    Gfp,
}

/// Subscription state embedded in the patient record. Mutated only by the
/// subscription manager.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub subscription_type: SubscriptionType,
    pub status: SubscriptionStatus,
    pub plan_type: Option<SubscriptionPlanType>,
    /// Price paid on activation, minor-unit-free. None for GFP plans.
    pub price: Option<u64>,
    pub activated_at: Option<DateTime<Utc>>,
    /// GFP subscriptions never expire; this stays None for them.
    pub expires_at: Option<DateTime<Utc>>,
    pub gfp_code: Option<GfpCode>,
}

impl Subscription {
    pub fn inactive(subscription_type: SubscriptionType) -> Self {
        Subscription {
            subscription_type,
            status: SubscriptionStatus::Inactive,
            plan_type: None,
            price: None,
            activated_at: None,
            expires_at: None,
            gfp_code: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub location: String,
    pub mobile: String,
    pub mh_number: MhNumber,
    pub subscription: Subscription,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration input. The password arrives in clear and is hashed before a
/// `Patient` is ever constructed.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPatient {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub location: String,
    pub mobile: String,
    pub subscription_type: SubscriptionType,
}
