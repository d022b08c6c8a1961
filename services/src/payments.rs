// services/src/payments.rs
use std::sync::Arc;

use log::{error, info};
use uuid::Uuid;

use gateway::{ChargeSession, GatewayRouter, InitializeCharge};
use models::errors::{MarketError, MarketResult, ValidationError};
use models::identifiers::SerialOrigin;
use models::payment::{GatewayKind, PaymentTransaction};
use models::purchase::PackagePurchase;
use store::MarketStore;

use crate::subscription::subscription_price;
use crate::voucher::VoucherService;

/// Orchestrates charges: creates the pending transaction, hands the payer
/// to the processor, and settles the gateway's redirect callback into a
/// verified transaction (and, for package charges, a voucher).
#[derive(Clone)]
pub struct PaymentService {
    store: Arc<dyn MarketStore>,
    router: Arc<GatewayRouter>,
    vouchers: VoucherService,
    currency: String,
    callback_base: String,
}

impl PaymentService {
    pub fn new(
        store: Arc<dyn MarketStore>,
        router: Arc<GatewayRouter>,
        vouchers: VoucherService,
        currency: String,
        callback_base: String,
    ) -> Self {
        PaymentService {
            store,
            router,
            vouchers,
            currency,
            callback_base,
        }
    }

    /// Unique transaction reference handed to the processor as
    /// tx_ref/reference and echoed back by the callback.
    pub fn new_reference() -> String {
        let fragment: String = Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(12)
            .collect::<String>()
            .to_uppercase();
        format!("MMK-{}", fragment)
    }

    pub async fn initialize_subscription_charge(
        &self,
        patient_id: Uuid,
        kind: GatewayKind,
    ) -> MarketResult<ChargeSession> {
        let patient = self
            .store
            .get_patient(patient_id)
            .await?
            .ok_or_else(|| MarketError::NotFound(format!("patient {}", patient_id)))?;

        let amount = subscription_price(patient.subscription.subscription_type);
        let reference = Self::new_reference();
        self.store
            .create_transaction(PaymentTransaction::pending(
                reference.clone(),
                patient_id,
                None,
                amount,
                kind,
            ))
            .await?;

        self.start_charge(&patient.email, &patient_name(&patient), amount, reference, kind)
            .await
    }

    pub async fn initialize_package_charge(
        &self,
        patient_id: Uuid,
        package_id: Uuid,
        kind: GatewayKind,
    ) -> MarketResult<ChargeSession> {
        let patient = self
            .store
            .get_patient(patient_id)
            .await?
            .ok_or_else(|| MarketError::NotFound(format!("patient {}", patient_id)))?;
        let package = self
            .store
            .get_package(package_id)
            .await?
            .ok_or_else(|| MarketError::NotFound(format!("package {}", package_id)))?;
        if package.is_free {
            // Free packages never go to a processor; they take the FREE
            // issuance path instead.
            return Err(ValidationError::InvalidValue("packageId".to_string()).into());
        }

        let reference = Self::new_reference();
        self.store
            .create_transaction(PaymentTransaction::pending(
                reference.clone(),
                patient_id,
                Some(package_id),
                package.price,
                kind,
            ))
            .await?;

        self.start_charge(
            &patient.email,
            &patient_name(&patient),
            package.price,
            reference,
            kind,
        )
        .await
    }

    /// Settles a gateway redirect. The transaction must verify with the
    /// processor; only then is it flipped to SUCCESS. Package charges
    /// produce a voucher whose serial prefix names the processor; a
    /// subscription charge produces none (activation is a separate call
    /// with the verified reference).
    pub async fn settle_callback(
        &self,
        kind: GatewayKind,
        reference: &str,
    ) -> MarketResult<Option<PackagePurchase>> {
        if self
            .store
            .find_transaction_by_reference(reference)
            .await?
            .is_none()
        {
            return Err(MarketError::PaymentNotVerified(reference.to_string()));
        }

        if !self.router.for_kind(kind).verify(reference).await {
            error!("gateway {} refused to verify {}", kind, reference);
            return Err(MarketError::PaymentNotVerified(reference.to_string()));
        }
        let transaction = self.store.mark_transaction_success(reference).await?;
        info!("transaction {} verified via {}", reference, kind);

        match transaction.package_id {
            Some(package_id) => {
                let origin = match kind {
                    GatewayKind::Flutterwave => SerialOrigin::Flutterwave,
                    GatewayKind::Paystack => SerialOrigin::Paystack,
                };
                let voucher = self
                    .vouchers
                    .issue(transaction.patient_id, package_id, origin, transaction.amount)
                    .await?;
                Ok(Some(voucher))
            }
            None => Ok(None),
        }
    }

    async fn start_charge(
        &self,
        email: &str,
        name: &str,
        amount: u64,
        reference: String,
        kind: GatewayKind,
    ) -> MarketResult<ChargeSession> {
        let charge = InitializeCharge {
            amount,
            currency: self.currency.clone(),
            payer_email: email.to_string(),
            payer_name: name.to_string(),
            reference,
            redirect_url: format!("{}/payment/{}/callback", self.callback_base, kind),
        };
        self.router.for_kind(kind).initialize(&charge).await
    }
}

fn patient_name(patient: &models::Patient) -> String {
    format!("{} {}", patient.first_name, patient.last_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::PatientService;
    use crate::provider_registry::ProviderService;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use gateway::PaymentGateway;
    use models::package::NewPackage;
    use models::patient::{NewPatient, SubscriptionType};
    use models::payment::PaymentStatus;
    use models::provider::NewProvider;
    use store::InMemoryStore;

    struct StubGateway {
        kind: GatewayKind,
        verifies: bool,
    }

    #[async_trait]
    impl PaymentGateway for StubGateway {
        fn kind(&self) -> GatewayKind {
            self.kind
        }

        async fn initialize(&self, charge: &InitializeCharge) -> MarketResult<ChargeSession> {
            Ok(ChargeSession {
                payment_url: format!("https://stub/{}", charge.reference),
                reference: charge.reference.clone(),
            })
        }

        async fn verify(&self, _reference: &str) -> bool {
            self.verifies
        }
    }

    fn router(verifies: bool) -> Arc<GatewayRouter> {
        Arc::new(GatewayRouter::new(
            Arc::new(StubGateway {
                kind: GatewayKind::Flutterwave,
                verifies,
            }),
            Arc::new(StubGateway {
                kind: GatewayKind::Paystack,
                verifies,
            }),
        ))
    }

    struct Fixture {
        store: Arc<InMemoryStore>,
        payments: PaymentService,
        patient_id: Uuid,
        package_id: Uuid,
    }

    async fn fixture(verifies: bool) -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let accounts = PatientService::new(store.clone());
        let providers = ProviderService::new(store.clone());
        let vouchers = VoucherService::new(store.clone());
        let payments = PaymentService::new(
            store.clone(),
            router(verifies),
            vouchers,
            "NGN".to_string(),
            "https://app.test".to_string(),
        );

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
        let package = providers
            .create_package(
                provider.id,
                NewPackage {
                    name: "Antenatal Care".to_string(),
                    description: "Three visits".to_string(),
                    price: 15000,
                    duration: "3 months".to_string(),
                    treatment_type: "ANTENATAL".to_string(),
                    is_free: false,
                },
            )
            .await
            .unwrap();

        Fixture {
            store,
            payments,
            patient_id: patient.id,
            package_id: package.id,
        }
    }

    #[test]
    fn should_generate_prefixed_references() {
        let reference = PaymentService::new_reference();
        assert!(reference.starts_with("MMK-"));
        assert_eq!(reference.len(), 16);
    }

    #[tokio::test]
    async fn should_settle_package_charge_into_gateway_prefixed_voucher() {
        let fx = fixture(true).await;
        let session = fx
            .payments
            .initialize_package_charge(fx.patient_id, fx.package_id, GatewayKind::Flutterwave)
            .await
            .unwrap();

        let voucher = fx
            .payments
            .settle_callback(GatewayKind::Flutterwave, &session.reference)
            .await
            .unwrap()
            .expect("package charge must produce a voucher");
        assert!(voucher.serial.as_str().starts_with("FLW-"));
        assert_eq!(voucher.price, 15000);

        let tx = fx
            .store
            .find_transaction_by_reference(&session.reference)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tx.status, PaymentStatus::Success);
    }

    #[tokio::test]
    async fn should_fail_closed_when_gateway_does_not_verify() {
        let fx = fixture(false).await;
        let session = fx
            .payments
            .initialize_package_charge(fx.patient_id, fx.package_id, GatewayKind::Paystack)
            .await
            .unwrap();

        let err = fx
            .payments
            .settle_callback(GatewayKind::Paystack, &session.reference)
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::PaymentNotVerified(_)));

        // The transaction must still be pending; nothing was issued.
        let tx = fx
            .store
            .find_transaction_by_reference(&session.reference)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tx.status, PaymentStatus::Pending);
        assert!(fx
            .store
            .list_purchases_by_patient(fx.patient_id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn should_settle_subscription_charge_without_issuing_voucher() {
        let fx = fixture(true).await;
        let session = fx
            .payments
            .initialize_subscription_charge(fx.patient_id, GatewayKind::Paystack)
            .await
            .unwrap();

        let voucher = fx
            .payments
            .settle_callback(GatewayKind::Paystack, &session.reference)
            .await
            .unwrap();
        assert!(voucher.is_none());

        let tx = fx
            .store
            .find_transaction_by_reference(&session.reference)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tx.status, PaymentStatus::Success);
        assert_eq!(tx.amount, 2000);
    }

    #[tokio::test]
    async fn should_refuse_to_charge_for_a_free_package() {
        let fx = fixture(true).await;
        let store = fx.store.clone();
        let mut package = store.get_package(fx.package_id).await.unwrap().unwrap();
        package.is_free = true;
        package.price = 0;
        store.update_package(package).await.unwrap();

        let err = fx
            .payments
            .initialize_package_charge(fx.patient_id, fx.package_id, GatewayKind::Paystack)
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::Validation(_)));
    }

    #[tokio::test]
    async fn should_reject_callback_for_unknown_reference() {
        let fx = fixture(true).await;
        let err = fx
            .payments
            .settle_callback(GatewayKind::Flutterwave, "GHOST-REF")
            .await
            .unwrap_err();
        assert_eq!(err, MarketError::PaymentNotVerified("GHOST-REF".to_string()));
    }
}
