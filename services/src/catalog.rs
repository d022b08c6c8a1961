// services/src/catalog.rs
use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use models::errors::{MarketError, MarketResult};
use models::package::HealthcarePackage;
use store::MarketStore;

use crate::subscription::SubscriptionService;

/// Marketplace browse. Visibility is gated by the patient's subscription
/// (evaluated lazily, so a lapsed plan is refused here) and filtered down
/// to active packages from providers that are active and not revoked.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn MarketStore>,
    subscriptions: SubscriptionService,
}

impl CatalogService {
    pub fn new(store: Arc<dyn MarketStore>, subscriptions: SubscriptionService) -> Self {
        CatalogService {
            store,
            subscriptions,
        }
    }

    pub async fn browse(&self, patient_id: Uuid) -> MarketResult<Vec<HealthcarePackage>> {
        if !self.subscriptions.is_active(patient_id).await? {
            return Err(MarketError::SubscriptionInactive(patient_id.to_string()));
        }

        let packages = self.store.list_active_packages().await?;
        let mut listable: HashMap<Uuid, bool> = HashMap::new();
        let mut visible = Vec::with_capacity(packages.len());
        for package in packages {
            let ok = match listable.get(&package.provider_id) {
                Some(cached) => *cached,
                None => {
                    let ok = self
                        .store
                        .get_provider(package.provider_id)
                        .await?
                        .map(|p| p.is_listable())
                        .unwrap_or(false);
                    listable.insert(package.provider_id, ok);
                    ok
                }
            };
            if ok {
                visible.push(package);
            }
        }
        Ok(visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::PatientService;
    use crate::provider_registry::ProviderService;
    use chrono::NaiveDate;
    use models::package::NewPackage;
    use models::patient::{NewPatient, SubscriptionType};
    use models::provider::NewProvider;
    use store::InMemoryStore;

    async fn setup() -> (Arc<InMemoryStore>, CatalogService, Uuid, Uuid) {
        let store = Arc::new(InMemoryStore::new());
        let accounts = PatientService::new(store.clone());
        let providers = ProviderService::new(store.clone());
        let subscriptions = SubscriptionService::new(store.clone());
        let catalog = CatalogService::new(store.clone(), subscriptions);

        let patient = accounts
            .register(NewPatient {
                email: "ada@test.com".to_string(),
                password: "s3cret-pass".to_string(),
                first_name: "Ada".to_string(),
                last_name: "Obi".to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(1990, 4, 12).unwrap(),
                location: "Lagos".to_string(),
                mobile: "+2348000000000".to_string(),
                subscription_type: SubscriptionType::Single,
            })
            .await
            .unwrap();
        let provider = providers
            .register(NewProvider {
                email: "clinic@test.com".to_string(),
                password: "clinic-pass".to_string(),
                name: "Sunrise Clinic".to_string(),
                contact_person: "Dr. Bello".to_string(),
                category: "HOSPITAL".to_string(),
                location: "Lagos".to_string(),
                phone: "+2348033333333".to_string(),
            })
            .await
            .unwrap();
        providers
            .create_package(
                provider.id,
                NewPackage {
                    name: "Dental Checkup".to_string(),
                    description: "desc".to_string(),
                    price: 5000,
                    duration: "single visit".to_string(),
                    treatment_type: "DENTAL".to_string(),
                    is_free: false,
                },
            )
            .await
            .unwrap();

        (store, catalog, patient.id, provider.id)
    }

    #[tokio::test]
    async fn should_refuse_browse_without_active_subscription() {
        let (_store, catalog, patient_id, _) = setup().await;
        let err = catalog.browse(patient_id).await.unwrap_err();
        assert!(matches!(err, MarketError::SubscriptionInactive(_)));
    }

    #[tokio::test]
    async fn should_list_active_packages_for_subscribed_patient() {
        let (store, catalog, patient_id, _) = setup().await;
        SubscriptionService::new(store.clone())
            .activate_gfp(patient_id, "GFP2024A")
            .await
            .unwrap();

        let visible = catalog.browse(patient_id).await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "Dental Checkup");
    }

    #[tokio::test]
    async fn should_hide_packages_of_revoked_providers() {
        let (store, catalog, patient_id, provider_id) = setup().await;
        SubscriptionService::new(store.clone())
            .activate_gfp(patient_id, "GFP2024B")
            .await
            .unwrap();
        ProviderService::new(store.clone())
            .revoke(provider_id, "fraud", "admin1")
            .await
            .unwrap();

        // Even a package flipped back on by hand stays hidden while its
        // provider is revoked.
        let packages = store.list_packages_by_provider(provider_id).await.unwrap();
        let mut package = packages.into_iter().next().unwrap();
        package.is_active = true;
        store.update_package(package).await.unwrap();

        let visible = catalog.browse(patient_id).await.unwrap();
        assert!(visible.is_empty());
    }
}
