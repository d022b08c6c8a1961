// services/src/provider_registry.rs
use std::sync::Arc;

use chrono::Utc;
use log::{info, warn};
use uuid::Uuid;

use models::errors::{MarketError, MarketResult, ValidationError};
use models::identifiers::MhpNumber;
use models::package::{HealthcarePackage, NewPackage, PackageUpdate};
use models::provider::{HealthcareProvider, NewProvider, PaymentSettings};
use store::MarketStore;

const MAX_IDENTIFIER_ATTEMPTS: usize = 8;

/// Provider lifecycle: registration with a unique MHP number, package
/// management, payment settings, and the administrative revoke/restore
/// switch.
#[derive(Clone)]
pub struct ProviderService {
    store: Arc<dyn MarketStore>,
}

impl ProviderService {
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        ProviderService { store }
    }

    pub async fn register(&self, new_provider: NewProvider) -> MarketResult<HealthcareProvider> {
        validate_new_provider(&new_provider)?;

        if self
            .store
            .find_provider_by_email(&new_provider.email)
            .await?
            .is_some()
        {
            return Err(MarketError::EmailTaken(new_provider.email));
        }

        let password_hash = bcrypt::hash(&new_provider.password, bcrypt::DEFAULT_COST)
            .map_err(|e| MarketError::InternalError(format!("password hashing failed: {}", e)))?;

        let now = Utc::now();
        let mut provider = HealthcareProvider {
            id: Uuid::new_v4(),
            email: new_provider.email,
            password_hash,
            name: new_provider.name,
            contact_person: new_provider.contact_person,
            category: new_provider.category,
            location: new_provider.location,
            phone: new_provider.phone,
            mhp_number: MhpNumber::generate(),
            is_active: true,
            is_revoked: false,
            revoked_at: None,
            revoked_by: None,
            revoked_reason: None,
            payment_settings: PaymentSettings::default(),
            created_at: now,
            updated_at: now,
        };

        // MHP uniqueness is the store's call; on a collision we regenerate
        // and try again instead of pre-checking.
        for attempt in 0..MAX_IDENTIFIER_ATTEMPTS {
            match self.store.create_provider(provider.clone()).await {
                Ok(()) => {
                    info!(
                        "provider {} registered as {}",
                        provider.id, provider.mhp_number
                    );
                    return Ok(provider);
                }
                Err(MarketError::AlreadyExists(taken)) => {
                    warn!(
                        "MHP number {} already taken (attempt {}), regenerating",
                        taken, attempt
                    );
                    provider.mhp_number = MhpNumber::generate();
                }
                Err(other) => return Err(other),
            }
        }
        Err(MarketError::InternalError(
            "could not allocate a unique MHP number".to_string(),
        ))
    }

    pub async fn login(&self, email: &str, password: &str) -> MarketResult<HealthcareProvider> {
        let provider = self
            .store
            .find_provider_by_email(email)
            .await?
            .ok_or(MarketError::InvalidCredentials)?;
        let matched = bcrypt::verify(password, &provider.password_hash)
            .map_err(|e| MarketError::InternalError(format!("password check failed: {}", e)))?;
        if !matched {
            return Err(MarketError::InvalidCredentials);
        }
        Ok(provider)
    }

    /// Provider plus its full package list, active or not, for the
    /// dashboard.
    pub async fn profile(
        &self,
        provider_id: Uuid,
    ) -> MarketResult<(HealthcareProvider, Vec<HealthcarePackage>)> {
        let provider = self.load(provider_id).await?;
        let packages = self.store.list_packages_by_provider(provider_id).await?;
        Ok((provider, packages))
    }

    // ----- packages ---------------------------------------------------

    pub async fn create_package(
        &self,
        provider_id: Uuid,
        input: NewPackage,
    ) -> MarketResult<HealthcarePackage> {
        let provider = self.load(provider_id).await?;
        if provider.is_revoked {
            return Err(MarketError::ProviderRevoked(provider.mhp_number.to_string()));
        }
        if input.name.trim().is_empty() {
            return Err(ValidationError::missing("name").into());
        }

        let now = Utc::now();
        let package = HealthcarePackage {
            id: Uuid::new_v4(),
            provider_id,
            name: input.name,
            description: input.description,
            // A free package is always listed at zero, whatever was typed.
            price: if input.is_free { 0 } else { input.price },
            duration: input.duration,
            treatment_type: input.treatment_type,
            is_free: input.is_free,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.store.create_package(package.clone()).await?;
        Ok(package)
    }

    pub async fn update_package(
        &self,
        provider_id: Uuid,
        package_id: Uuid,
        update: PackageUpdate,
    ) -> MarketResult<HealthcarePackage> {
        let mut package = self
            .store
            .get_package(package_id)
            .await?
            .filter(|p| p.provider_id == provider_id)
            .ok_or_else(|| MarketError::NotFound(format!("package {}", package_id)))?;

        if let Some(name) = update.name {
            package.name = name;
        }
        if let Some(description) = update.description {
            package.description = description;
        }
        if let Some(price) = update.price {
            package.price = price;
        }
        if let Some(duration) = update.duration {
            package.duration = duration;
        }
        if let Some(treatment_type) = update.treatment_type {
            package.treatment_type = treatment_type;
        }
        if let Some(is_free) = update.is_free {
            package.is_free = is_free;
            if is_free {
                package.price = 0;
            }
        }
        if let Some(is_active) = update.is_active {
            package.is_active = is_active;
        }
        package.updated_at = Utc::now();

        self.store.update_package(package.clone()).await?;
        Ok(package)
    }

    // ----- payment settings -------------------------------------------

    pub async fn payment_settings(&self, provider_id: Uuid) -> MarketResult<PaymentSettings> {
        Ok(self.load(provider_id).await?.payment_settings)
    }

    pub async fn set_payment_settings(
        &self,
        provider_id: Uuid,
        settings: PaymentSettings,
    ) -> MarketResult<PaymentSettings> {
        let mut provider = self.load(provider_id).await?;
        provider.payment_settings = settings;
        provider.updated_at = Utc::now();
        self.store.update_provider(provider.clone()).await?;
        Ok(provider.payment_settings)
    }

    // ----- revocation -------------------------------------------------

    /// Administrative kill-switch: deactivates the account, stamps the
    /// revocation metadata, and bulk-deactivates every package the provider
    /// owns. Existing vouchers remain redeemable.
    pub async fn revoke(
        &self,
        provider_id: Uuid,
        reason: &str,
        admin_id: &str,
    ) -> MarketResult<HealthcareProvider> {
        if reason.trim().is_empty() {
            return Err(ValidationError::missing("reason").into());
        }
        if admin_id.trim().is_empty() {
            return Err(ValidationError::missing("adminId").into());
        }

        let mut provider = self.load(provider_id).await?;
        provider.is_active = false;
        provider.is_revoked = true;
        provider.revoked_at = Some(Utc::now());
        provider.revoked_by = Some(admin_id.trim().to_string());
        provider.revoked_reason = Some(reason.trim().to_string());
        provider.updated_at = Utc::now();
        self.store.update_provider(provider.clone()).await?;

        let deactivated = self.store.deactivate_provider_packages(provider_id).await?;
        info!(
            "provider {} revoked by {} ({} packages deactivated)",
            provider.mhp_number, admin_id, deactivated
        );
        Ok(provider)
    }

    /// Clears revocation and reactivates the account. Packages stay
    /// deactivated; re-listing them is the provider's move.
    pub async fn restore(&self, provider_id: Uuid) -> MarketResult<HealthcareProvider> {
        let mut provider = self.load(provider_id).await?;
        provider.is_active = true;
        provider.is_revoked = false;
        provider.revoked_at = None;
        provider.revoked_by = None;
        provider.revoked_reason = None;
        provider.updated_at = Utc::now();
        self.store.update_provider(provider.clone()).await?;
        info!("provider {} restored", provider.mhp_number);
        Ok(provider)
    }

    async fn load(&self, provider_id: Uuid) -> MarketResult<HealthcareProvider> {
        self.store
            .get_provider(provider_id)
            .await?
            .ok_or_else(|| MarketError::NotFound(format!("provider {}", provider_id)))
    }
}

fn validate_new_provider(input: &NewProvider) -> MarketResult<()> {
    if input.email.trim().is_empty() {
        return Err(ValidationError::missing("email").into());
    }
    if !input.email.contains('@') {
        return Err(ValidationError::InvalidEmail(input.email.clone()).into());
    }
    if input.password.trim().is_empty() {
        return Err(ValidationError::missing("password").into());
    }
    if input.name.trim().is_empty() {
        return Err(ValidationError::missing("name").into());
    }
    if input.contact_person.trim().is_empty() {
        return Err(ValidationError::missing("contactPerson").into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::InMemoryStore;

    fn registration(email: &str, name: &str) -> NewProvider {
        NewProvider {
            email: email.to_string(),
            password: "clinic-pass".to_string(),
            name: name.to_string(),
            contact_person: "Dr. Bello".to_string(),
            category: "HOSPITAL".to_string(),
            location: "Lagos".to_string(),
            phone: "+2348033333333".to_string(),
        }
    }

    fn package_input(name: &str, price: u64) -> NewPackage {
        NewPackage {
            name: name.to_string(),
            description: "desc".to_string(),
            price,
            duration: "1 month".to_string(),
            treatment_type: "DENTAL".to_string(),
            is_free: false,
        }
    }

    #[tokio::test]
    async fn should_assign_wellformed_mhp_number_on_registration() {
        let svc = ProviderService::new(Arc::new(InMemoryStore::new()));
        let provider = svc
            .register(registration("clinic@test.com", "Sunrise Clinic"))
            .await
            .unwrap();
        let mhp = provider.mhp_number.as_str();
        assert!(mhp.starts_with("MHP"));
        assert_eq!(mhp.len(), 13);
        assert!(mhp[3..].bytes().all(|b| b.is_ascii_digit()));
        assert!(provider.is_active);
        assert!(!provider.is_revoked);
    }

    #[tokio::test]
    async fn should_assign_distinct_mhp_numbers_under_concurrency() {
        let store = Arc::new(InMemoryStore::new());
        let mut handles = Vec::new();
        for i in 0..100 {
            let svc = ProviderService::new(store.clone());
            handles.push(tokio::spawn(async move {
                svc.register(registration(
                    &format!("clinic{}@test.com", i),
                    &format!("Clinic {}", i),
                ))
                .await
            }));
        }

        let mut numbers = std::collections::HashSet::new();
        for handle in handles {
            let provider = handle.await.unwrap().unwrap();
            numbers.insert(provider.mhp_number.to_string());
        }
        assert_eq!(numbers.len(), 100);
    }

    #[tokio::test]
    async fn should_revoke_provider_and_deactivate_packages() {
        let store = Arc::new(InMemoryStore::new());
        let svc = ProviderService::new(store.clone());
        let provider = svc
            .register(registration("clinic@test.com", "Sunrise Clinic"))
            .await
            .unwrap();
        svc.create_package(provider.id, package_input("Dental Checkup", 5000))
            .await
            .unwrap();
        svc.create_package(provider.id, package_input("Eye Test", 3000))
            .await
            .unwrap();

        let revoked = svc.revoke(provider.id, "fraud", "admin1").await.unwrap();
        assert!(revoked.is_revoked);
        assert!(!revoked.is_active);
        assert_eq!(revoked.revoked_by.as_deref(), Some("admin1"));
        assert_eq!(revoked.revoked_reason.as_deref(), Some("fraud"));
        assert!(revoked.revoked_at.is_some());

        let packages = store.list_packages_by_provider(provider.id).await.unwrap();
        assert!(packages.iter().all(|p| !p.is_active));
    }

    #[tokio::test]
    async fn should_restore_account_but_not_packages() {
        let store = Arc::new(InMemoryStore::new());
        let svc = ProviderService::new(store.clone());
        let provider = svc
            .register(registration("clinic@test.com", "Sunrise Clinic"))
            .await
            .unwrap();
        svc.create_package(provider.id, package_input("Dental Checkup", 5000))
            .await
            .unwrap();
        svc.revoke(provider.id, "fraud", "admin1").await.unwrap();

        let restored = svc.restore(provider.id).await.unwrap();
        assert!(restored.is_active);
        assert!(!restored.is_revoked);
        assert_eq!(restored.revoked_by, None);
        assert_eq!(restored.revoked_reason, None);

        // Packages stay down until the provider re-lists them.
        let packages = store.list_packages_by_provider(provider.id).await.unwrap();
        assert!(packages.iter().all(|p| !p.is_active));
    }

    #[tokio::test]
    async fn should_refuse_new_packages_from_revoked_provider() {
        let svc = ProviderService::new(Arc::new(InMemoryStore::new()));
        let provider = svc
            .register(registration("clinic@test.com", "Sunrise Clinic"))
            .await
            .unwrap();
        svc.revoke(provider.id, "fraud", "admin1").await.unwrap();
        let err = svc
            .create_package(provider.id, package_input("Dental Checkup", 5000))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::ProviderRevoked(_)));
    }

    #[tokio::test]
    async fn should_zero_price_of_free_packages() {
        let svc = ProviderService::new(Arc::new(InMemoryStore::new()));
        let provider = svc
            .register(registration("clinic@test.com", "Sunrise Clinic"))
            .await
            .unwrap();
        let mut input = package_input("Free Screening", 9000);
        input.is_free = true;
        let package = svc.create_package(provider.id, input).await.unwrap();
        assert_eq!(package.price, 0);
        assert!(package.is_free);
    }

    #[tokio::test]
    async fn should_update_payment_settings() {
        let svc = ProviderService::new(Arc::new(InMemoryStore::new()));
        let provider = svc
            .register(registration("clinic@test.com", "Sunrise Clinic"))
            .await
            .unwrap();
        let saved = svc
            .set_payment_settings(
                provider.id,
                PaymentSettings {
                    paystack_secret_key: Some("sk_test_x".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(saved.paystack_secret_key.as_deref(), Some("sk_test_x"));

        let fetched = svc.payment_settings(provider.id).await.unwrap();
        assert_eq!(fetched, saved);
    }
}
