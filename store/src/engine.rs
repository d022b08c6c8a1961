// store/src/engine.rs
use std::fmt::Debug;

use async_trait::async_trait;
use uuid::Uuid;

use models::errors::MarketResult;
use models::identifiers::{GfpCode, MhNumber, SerialNumber};
use models::{HealthcarePackage, HealthcareProvider, PackagePurchase, PaymentTransaction, Patient};

/// Storage seam for the marketplace. One logical table group per entity;
/// every uniqueness rule the application relies on is enforced here, under
/// the store's own locking, so callers can treat a refusal as the
/// authoritative duplicate signal instead of pre-checking.
#[async_trait]
pub trait MarketStore: Send + Sync + Debug {
    fn get_type(&self) -> &'static str;

    // ----- patients ---------------------------------------------------

    /// Inserts a patient. Fails with `EmailTaken` if the email is in use and
    /// with `AlreadyExists` if the MH number collides; both checks happen
    /// under the same lock as the insert.
    async fn create_patient(&self, patient: Patient) -> MarketResult<()>;
    async fn get_patient(&self, id: Uuid) -> MarketResult<Option<Patient>>;
    async fn find_patient_by_email(&self, email: &str) -> MarketResult<Option<Patient>>;
    async fn find_patient_by_mh_number(&self, mh: &MhNumber) -> MarketResult<Option<Patient>>;
    async fn update_patient(&self, patient: Patient) -> MarketResult<()>;

    /// Atomically binds a GFP code to a patient. A code already held by a
    /// different patient fails with `CodeAlreadyUsed`; re-binding by the same
    /// patient is a no-op.
    async fn reserve_gfp_code(&self, code: &GfpCode, patient_id: Uuid) -> MarketResult<()>;

    // ----- providers --------------------------------------------------

    /// Inserts a provider. `EmailTaken` on a duplicate email,
    /// `AlreadyExists` on an MHP number collision (caller regenerates and
    /// retries).
    async fn create_provider(&self, provider: HealthcareProvider) -> MarketResult<()>;
    async fn get_provider(&self, id: Uuid) -> MarketResult<Option<HealthcareProvider>>;
    async fn find_provider_by_email(&self, email: &str)
        -> MarketResult<Option<HealthcareProvider>>;
    async fn update_provider(&self, provider: HealthcareProvider) -> MarketResult<()>;

    // ----- packages ---------------------------------------------------

    async fn create_package(&self, package: HealthcarePackage) -> MarketResult<()>;
    async fn get_package(&self, id: Uuid) -> MarketResult<Option<HealthcarePackage>>;
    async fn update_package(&self, package: HealthcarePackage) -> MarketResult<()>;
    async fn list_packages_by_provider(
        &self,
        provider_id: Uuid,
    ) -> MarketResult<Vec<HealthcarePackage>>;
    async fn list_active_packages(&self) -> MarketResult<Vec<HealthcarePackage>>;

    /// Bulk soft-delete of every package owned by a provider. Returns how
    /// many rows were flipped. Existing vouchers are untouched.
    async fn deactivate_provider_packages(&self, provider_id: Uuid) -> MarketResult<u64>;

    // ----- payment transactions ---------------------------------------

    /// Inserts a pending transaction; `AlreadyExists` on a duplicate
    /// reference.
    async fn create_transaction(&self, transaction: PaymentTransaction) -> MarketResult<()>;
    async fn find_transaction_by_reference(
        &self,
        reference: &str,
    ) -> MarketResult<Option<PaymentTransaction>>;

    /// Flips a transaction to SUCCESS and returns the updated row. A row
    /// already in SUCCESS stays there; status never moves back.
    async fn mark_transaction_success(&self, reference: &str) -> MarketResult<PaymentTransaction>;

    // ----- purchases (vouchers) ---------------------------------------

    /// Inserts a voucher; `AlreadyExists` on a duplicate serial, checked
    /// under the same lock as the insert.
    async fn insert_purchase(&self, purchase: PackagePurchase) -> MarketResult<()>;
    async fn get_purchase(&self, id: Uuid) -> MarketResult<Option<PackagePurchase>>;
    async fn find_purchase_by_serial(
        &self,
        serial: &SerialNumber,
    ) -> MarketResult<Option<PackagePurchase>>;
    async fn list_purchases_by_patient(
        &self,
        patient_id: Uuid,
    ) -> MarketResult<Vec<PackagePurchase>>;

    /// Case-insensitive substring match on the serial, for the manual search
    /// channel of the redemption console.
    async fn search_purchases(&self, query: &str) -> MarketResult<Vec<PackagePurchase>>;
    async fn update_purchase(&self, purchase: PackagePurchase) -> MarketResult<()>;
}
