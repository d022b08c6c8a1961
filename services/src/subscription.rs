// services/src/subscription.rs
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{Duration, Utc};
use log::info;
use once_cell::sync::Lazy;
use uuid::Uuid;

use models::errors::{MarketError, MarketResult};
use models::identifiers::GfpCode;
use models::patient::{
    Patient, Subscription, SubscriptionPlanType, SubscriptionStatus, SubscriptionType,
};
use models::payment::PaymentStatus;
use store::MarketStore;

/// Codes honoured by the Government Free Programme. An in-memory constant
/// today; the calling contract does not change if this moves to a real
/// data store.
static VALID_GFP_CODES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "GFP2024A", "GFP2024B", "GFP2024C", "GFP2024D", "GFP2024E", "GFPPILOT1", "GFPPILOT2",
    ]
    .into_iter()
    .collect()
});

/// Annual subscription prices in the platform's base currency,
/// minor-unit-free.
static SUBSCRIPTION_PRICES: Lazy<HashMap<SubscriptionType, u64>> = Lazy::new(|| {
    HashMap::from([
        (SubscriptionType::Single, 2000),
        (SubscriptionType::Family, 10000),
        (SubscriptionType::Corporate, 100000),
    ])
});

pub fn subscription_price(subscription_type: SubscriptionType) -> u64 {
    SUBSCRIPTION_PRICES[&subscription_type]
}

/// Gates marketplace access behind an annual subscription, activated either
/// by a verified payment or by a Government Free Programme code.
#[derive(Clone)]
pub struct SubscriptionService {
    store: Arc<dyn MarketStore>,
}

impl SubscriptionService {
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        SubscriptionService { store }
    }

    /// GFP activation. The code is normalized, checked against the
    /// allow-list, then atomically bound; the store's refusal is the
    /// authoritative `CodeAlreadyUsed` signal. GFP subscriptions never
    /// expire.
    pub async fn activate_gfp(&self, patient_id: Uuid, raw_code: &str) -> MarketResult<Patient> {
        let mut patient = self.load_patient(patient_id).await?;
        let code = GfpCode::normalize(raw_code)?;

        if !VALID_GFP_CODES.contains(code.as_str()) {
            return Err(MarketError::InvalidCode(code.to_string()));
        }
        self.store.reserve_gfp_code(&code, patient_id).await?;

        let now = Utc::now();
        patient.subscription.status = SubscriptionStatus::Active;
        patient.subscription.plan_type = Some(SubscriptionPlanType::Gfp);
        patient.subscription.price = None;
        patient.subscription.activated_at = Some(now);
        patient.subscription.expires_at = None;
        patient.subscription.gfp_code = Some(code.clone());
        patient.updated_at = now;
        self.store.update_patient(patient.clone()).await?;

        info!("patient {} activated via GFP code {}", patient_id, code);
        Ok(patient)
    }

    /// Paid activation. The reference must resolve to a transaction already
    /// verified SUCCESS; the annual price comes from the static table keyed
    /// by the patient's subscription type.
    pub async fn activate_paid(&self, patient_id: Uuid, reference: &str) -> MarketResult<Patient> {
        let mut patient = self.load_patient(patient_id).await?;

        let verified = self
            .store
            .find_transaction_by_reference(reference)
            .await?
            .map(|tx| tx.status == PaymentStatus::Success)
            .unwrap_or(false);
        if !verified {
            return Err(MarketError::PaymentNotVerified(reference.to_string()));
        }

        let price = subscription_price(patient.subscription.subscription_type);
        let now = Utc::now();
        patient.subscription.status = SubscriptionStatus::Active;
        patient.subscription.plan_type = Some(SubscriptionPlanType::Paid);
        patient.subscription.price = Some(price);
        patient.subscription.activated_at = Some(now);
        patient.subscription.expires_at = Some(now + Duration::days(365));
        patient.updated_at = now;
        self.store.update_patient(patient.clone()).await?;

        info!(
            "patient {} activated a paid {} subscription ({})",
            patient_id, patient.subscription.subscription_type, price
        );
        Ok(patient)
    }

    /// Current subscription state. Expiry is evaluated lazily here: an
    /// ACTIVE paid plan whose expiry has passed is flipped to EXPIRED and
    /// persisted before the answer is returned. There is no background
    /// sweep.
    pub async fn status(&self, patient_id: Uuid) -> MarketResult<Subscription> {
        let mut patient = self.load_patient(patient_id).await?;
        let sub = &patient.subscription;

        let lapsed = sub.status == SubscriptionStatus::Active
            && sub.plan_type == Some(SubscriptionPlanType::Paid)
            && sub.expires_at.map(|at| at < Utc::now()).unwrap_or(false);
        if lapsed {
            patient.subscription.status = SubscriptionStatus::Expired;
            patient.updated_at = Utc::now();
            self.store.update_patient(patient.clone()).await?;
            info!("subscription for patient {} lapsed", patient_id);
        }
        Ok(patient.subscription)
    }

    /// True when the patient currently holds marketplace access.
    pub async fn is_active(&self, patient_id: Uuid) -> MarketResult<bool> {
        Ok(self.status(patient_id).await?.status == SubscriptionStatus::Active)
    }

    async fn load_patient(&self, patient_id: Uuid) -> MarketResult<Patient> {
        self.store
            .get_patient(patient_id)
            .await?
            .ok_or_else(|| MarketError::NotFound(format!("patient {}", patient_id)))
    }
}
