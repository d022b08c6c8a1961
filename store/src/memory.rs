// store/src/memory.rs
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info};
use tokio::sync::Mutex as TokioMutex;
use uuid::Uuid;

use models::errors::{MarketError, MarketResult};
use models::identifiers::{GfpCode, MhNumber, SerialNumber};
use models::payment::PaymentStatus;
use models::{HealthcarePackage, HealthcareProvider, PackagePurchase, PaymentTransaction, Patient};

use crate::engine::MarketStore;

/// Reference store backed by per-table async mutexes. Each uniqueness rule
/// (patient email/MH, provider email/MHP, GFP binding, transaction
/// reference, voucher serial) is checked and written under a single lock
/// acquisition, which is what makes the reserve operations atomic.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    patients: TokioMutex<HashMap<Uuid, Patient>>,
    providers: TokioMutex<HashMap<Uuid, HealthcareProvider>>,
    packages: TokioMutex<HashMap<Uuid, HealthcarePackage>>,
    // Keyed by gateway reference, the only handle callbacks carry.
    transactions: TokioMutex<HashMap<String, PaymentTransaction>>,
    purchases: TokioMutex<HashMap<Uuid, PackagePurchase>>,
    gfp_bindings: TokioMutex<HashMap<GfpCode, Uuid>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MarketStore for InMemoryStore {
    fn get_type(&self) -> &'static str {
        "in-memory"
    }

    // ----- patients ---------------------------------------------------

    async fn create_patient(&self, patient: Patient) -> MarketResult<()> {
        let mut patients = self.patients.lock().await;
        if patients
            .values()
            .any(|p| p.email.eq_ignore_ascii_case(&patient.email))
        {
            return Err(MarketError::EmailTaken(patient.email));
        }
        if patients.values().any(|p| p.mh_number == patient.mh_number) {
            return Err(MarketError::AlreadyExists(patient.mh_number.to_string()));
        }
        debug!("creating patient {} ({})", patient.id, patient.mh_number);
        patients.insert(patient.id, patient);
        Ok(())
    }

    async fn get_patient(&self, id: Uuid) -> MarketResult<Option<Patient>> {
        let patients = self.patients.lock().await;
        Ok(patients.get(&id).cloned())
    }

    async fn find_patient_by_email(&self, email: &str) -> MarketResult<Option<Patient>> {
        let patients = self.patients.lock().await;
        Ok(patients
            .values()
            .find(|p| p.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_patient_by_mh_number(&self, mh: &MhNumber) -> MarketResult<Option<Patient>> {
        let patients = self.patients.lock().await;
        Ok(patients.values().find(|p| &p.mh_number == mh).cloned())
    }

    async fn update_patient(&self, patient: Patient) -> MarketResult<()> {
        let mut patients = self.patients.lock().await;
        if !patients.contains_key(&patient.id) {
            return Err(MarketError::NotFound(format!("patient {}", patient.id)));
        }
        patients.insert(patient.id, patient);
        Ok(())
    }

    async fn reserve_gfp_code(&self, code: &GfpCode, patient_id: Uuid) -> MarketResult<()> {
        let mut bindings = self.gfp_bindings.lock().await;
        match bindings.get(code) {
            Some(owner) if *owner != patient_id => {
                Err(MarketError::CodeAlreadyUsed(code.to_string()))
            }
            Some(_) => Ok(()),
            None => {
                bindings.insert(code.clone(), patient_id);
                info!("GFP code {} bound to patient {}", code, patient_id);
                Ok(())
            }
        }
    }

    // ----- providers --------------------------------------------------

    async fn create_provider(&self, provider: HealthcareProvider) -> MarketResult<()> {
        let mut providers = self.providers.lock().await;
        if providers
            .values()
            .any(|p| p.email.eq_ignore_ascii_case(&provider.email))
        {
            return Err(MarketError::EmailTaken(provider.email));
        }
        if providers
            .values()
            .any(|p| p.mhp_number == provider.mhp_number)
        {
            return Err(MarketError::AlreadyExists(provider.mhp_number.to_string()));
        }
        debug!("creating provider {} ({})", provider.id, provider.mhp_number);
        providers.insert(provider.id, provider);
        Ok(())
    }

    async fn get_provider(&self, id: Uuid) -> MarketResult<Option<HealthcareProvider>> {
        let providers = self.providers.lock().await;
        Ok(providers.get(&id).cloned())
    }

    async fn find_provider_by_email(
        &self,
        email: &str,
    ) -> MarketResult<Option<HealthcareProvider>> {
        let providers = self.providers.lock().await;
        Ok(providers
            .values()
            .find(|p| p.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn update_provider(&self, provider: HealthcareProvider) -> MarketResult<()> {
        let mut providers = self.providers.lock().await;
        if !providers.contains_key(&provider.id) {
            return Err(MarketError::NotFound(format!("provider {}", provider.id)));
        }
        providers.insert(provider.id, provider);
        Ok(())
    }

    // ----- packages ---------------------------------------------------

    async fn create_package(&self, package: HealthcarePackage) -> MarketResult<()> {
        let mut packages = self.packages.lock().await;
        packages.insert(package.id, package);
        Ok(())
    }

    async fn get_package(&self, id: Uuid) -> MarketResult<Option<HealthcarePackage>> {
        let packages = self.packages.lock().await;
        Ok(packages.get(&id).cloned())
    }

    async fn update_package(&self, package: HealthcarePackage) -> MarketResult<()> {
        let mut packages = self.packages.lock().await;
        if !packages.contains_key(&package.id) {
            return Err(MarketError::NotFound(format!("package {}", package.id)));
        }
        packages.insert(package.id, package);
        Ok(())
    }

    async fn list_packages_by_provider(
        &self,
        provider_id: Uuid,
    ) -> MarketResult<Vec<HealthcarePackage>> {
        let packages = self.packages.lock().await;
        let mut found: Vec<_> = packages
            .values()
            .filter(|p| p.provider_id == provider_id)
            .cloned()
            .collect();
        found.sort_by_key(|p| p.created_at);
        Ok(found)
    }

    async fn list_active_packages(&self) -> MarketResult<Vec<HealthcarePackage>> {
        let packages = self.packages.lock().await;
        let mut found: Vec<_> = packages.values().filter(|p| p.is_active).cloned().collect();
        found.sort_by_key(|p| p.created_at);
        Ok(found)
    }

    async fn deactivate_provider_packages(&self, provider_id: Uuid) -> MarketResult<u64> {
        let mut packages = self.packages.lock().await;
        let mut flipped = 0u64;
        for package in packages.values_mut() {
            if package.provider_id == provider_id && package.is_active {
                package.is_active = false;
                package.updated_at = Utc::now();
                flipped += 1;
            }
        }
        info!(
            "deactivated {} packages for provider {}",
            flipped, provider_id
        );
        Ok(flipped)
    }

    // ----- payment transactions ---------------------------------------

    async fn create_transaction(&self, transaction: PaymentTransaction) -> MarketResult<()> {
        let mut transactions = self.transactions.lock().await;
        if transactions.contains_key(&transaction.reference) {
            return Err(MarketError::AlreadyExists(transaction.reference));
        }
        transactions.insert(transaction.reference.clone(), transaction);
        Ok(())
    }

    async fn find_transaction_by_reference(
        &self,
        reference: &str,
    ) -> MarketResult<Option<PaymentTransaction>> {
        let transactions = self.transactions.lock().await;
        Ok(transactions.get(reference).cloned())
    }

    async fn mark_transaction_success(&self, reference: &str) -> MarketResult<PaymentTransaction> {
        let mut transactions = self.transactions.lock().await;
        let transaction = transactions
            .get_mut(reference)
            .ok_or_else(|| MarketError::NotFound(format!("transaction {}", reference)))?;
        if transaction.status != PaymentStatus::Success {
            transaction.status = PaymentStatus::Success;
            transaction.updated_at = Utc::now();
        }
        Ok(transaction.clone())
    }

    // ----- purchases (vouchers) ---------------------------------------

    async fn insert_purchase(&self, purchase: PackagePurchase) -> MarketResult<()> {
        let mut purchases = self.purchases.lock().await;
        if purchases.values().any(|p| p.serial == purchase.serial) {
            return Err(MarketError::AlreadyExists(purchase.serial.to_string()));
        }
        info!(
            "voucher {} issued to patient {} for package {}",
            purchase.serial, purchase.patient_id, purchase.package_id
        );
        purchases.insert(purchase.id, purchase);
        Ok(())
    }

    async fn get_purchase(&self, id: Uuid) -> MarketResult<Option<PackagePurchase>> {
        let purchases = self.purchases.lock().await;
        Ok(purchases.get(&id).cloned())
    }

    async fn find_purchase_by_serial(
        &self,
        serial: &SerialNumber,
    ) -> MarketResult<Option<PackagePurchase>> {
        let purchases = self.purchases.lock().await;
        Ok(purchases.values().find(|p| &p.serial == serial).cloned())
    }

    async fn list_purchases_by_patient(
        &self,
        patient_id: Uuid,
    ) -> MarketResult<Vec<PackagePurchase>> {
        let purchases = self.purchases.lock().await;
        let mut found: Vec<_> = purchases
            .values()
            .filter(|p| p.patient_id == patient_id)
            .cloned()
            .collect();
        found.sort_by_key(|p| p.purchased_at);
        Ok(found)
    }

    async fn search_purchases(&self, query: &str) -> MarketResult<Vec<PackagePurchase>> {
        let needle = query.trim().to_uppercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        let purchases = self.purchases.lock().await;
        let mut found: Vec<_> = purchases
            .values()
            .filter(|p| p.serial.as_str().to_uppercase().contains(&needle))
            .cloned()
            .collect();
        found.sort_by_key(|p| p.purchased_at);
        Ok(found)
    }

    async fn update_purchase(&self, purchase: PackagePurchase) -> MarketResult<()> {
        let mut purchases = self.purchases.lock().await;
        if !purchases.contains_key(&purchase.id) {
            return Err(MarketError::NotFound(format!("purchase {}", purchase.id)));
        }
        purchases.insert(purchase.id, purchase);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use models::identifiers::SerialOrigin;
    use models::patient::{Subscription, SubscriptionType};
    use models::purchase::{QrPayload, RedemptionStatus};
    use models::GatewayKind;
    use std::sync::Arc;

    fn sample_patient(email: &str) -> Patient {
        let now = Utc::now();
        Patient {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: "$2b$12$test".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Obi".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 4, 12).unwrap(),
            location: "Lagos".to_string(),
            mobile: "+2348000000000".to_string(),
            mh_number: MhNumber::generate(),
            subscription: Subscription::inactive(SubscriptionType::Single),
            created_at: now,
            updated_at: now,
        }
    }

    fn sample_purchase(serial: SerialNumber) -> PackagePurchase {
        let now = Utc::now();
        let patient_id = Uuid::new_v4();
        let package_id = Uuid::new_v4();
        PackagePurchase {
            id: Uuid::new_v4(),
            serial: serial.clone(),
            patient_id,
            package_id,
            provider_id: Uuid::new_v4(),
            price: 1500,
            qr_payload: QrPayload {
                serial,
                mh_number: MhNumber::generate(),
                patient_id,
                package_id,
                timestamp: now,
            },
            redemption_status: RedemptionStatus::Pending,
            purchased_at: now,
            redeemed_at: None,
            redeemed_by: None,
        }
    }

    #[tokio::test]
    async fn should_reject_duplicate_patient_email() {
        let store = InMemoryStore::new();
        store
            .create_patient(sample_patient("ada@test.com"))
            .await
            .unwrap();
        let err = store
            .create_patient(sample_patient("ADA@test.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::EmailTaken(_)));
    }

    #[tokio::test]
    async fn should_bind_gfp_code_to_one_patient_only() {
        let store = InMemoryStore::new();
        let code = GfpCode::normalize("GFP2024A").unwrap();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        store.reserve_gfp_code(&code, first).await.unwrap();
        // Re-binding by the owner is a no-op.
        store.reserve_gfp_code(&code, first).await.unwrap();

        let err = store.reserve_gfp_code(&code, second).await.unwrap_err();
        assert_eq!(err, MarketError::CodeAlreadyUsed("GFP2024A".to_string()));
    }

    #[tokio::test]
    async fn should_let_exactly_one_racing_binding_win() {
        let store = Arc::new(InMemoryStore::new());
        let code = GfpCode::normalize("GFP2024B").unwrap();
        let a = {
            let store = store.clone();
            let code = code.clone();
            tokio::spawn(async move { store.reserve_gfp_code(&code, Uuid::new_v4()).await })
        };
        let b = {
            let store = store.clone();
            let code = code.clone();
            tokio::spawn(async move { store.reserve_gfp_code(&code, Uuid::new_v4()).await })
        };
        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        assert_eq!(1, [&a, &b].iter().filter(|r| r.is_ok()).count());
    }

    #[tokio::test]
    async fn should_reject_duplicate_voucher_serial() {
        let store = InMemoryStore::new();
        let serial = SerialNumber::generate(SerialOrigin::Direct);
        store
            .insert_purchase(sample_purchase(serial.clone()))
            .await
            .unwrap();
        let err = store
            .insert_purchase(sample_purchase(serial))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn should_mark_transaction_success_exactly_once() {
        let store = InMemoryStore::new();
        let tx = PaymentTransaction::pending(
            "MMK-REF-1".to_string(),
            Uuid::new_v4(),
            None,
            2000,
            GatewayKind::Paystack,
        );
        store.create_transaction(tx).await.unwrap();

        let updated = store.mark_transaction_success("MMK-REF-1").await.unwrap();
        assert_eq!(updated.status, PaymentStatus::Success);

        // Second settlement attempt is harmless and never regresses.
        let again = store.mark_transaction_success("MMK-REF-1").await.unwrap();
        assert_eq!(again.status, PaymentStatus::Success);
    }

    #[tokio::test]
    async fn should_search_purchases_by_serial_fragment() {
        let store = InMemoryStore::new();
        let serial = SerialNumber::generate(SerialOrigin::Free);
        store
            .insert_purchase(sample_purchase(serial.clone()))
            .await
            .unwrap();

        let fragment = &serial.as_str()[..8].to_lowercase();
        let found = store.search_purchases(fragment).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].serial, serial);

        assert!(store.search_purchases("   ").await.unwrap().is_empty());
    }
}
