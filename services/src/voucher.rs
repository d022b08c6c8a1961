// services/src/voucher.rs
use std::sync::Arc;

use chrono::Utc;
use log::{info, warn};
use uuid::Uuid;

use models::errors::{MarketError, MarketResult, ValidationError};
use models::identifiers::{MhNumber, SerialNumber, SerialOrigin};
use models::purchase::{PackagePurchase, PurchaseSummary, QrPayload, RedemptionStatus};
use store::MarketStore;

// Serial fragments carry 32 bits of entropy; a handful of retries is
// already far past the point where a collision streak means a broken store.
const MAX_SERIAL_ATTEMPTS: usize = 5;

/// How the redemption console locates a voucher. All three channels are
/// equally valid; the redundancy exists for low-connectivity and
/// hardware-constrained field conditions.
#[derive(Clone, Debug)]
pub enum VoucherLocator {
    /// Raw contents of a scanned QR code.
    QrPayload(String),
    /// The patient's health identifier; resolves to their oldest pending
    /// voucher.
    MhNumber(String),
    /// Free-text serial search from the manual console.
    Search(String),
}

/// Converts a confirmed payment event (or a free selection) into exactly one
/// durable, serial-numbered, QR-encoded voucher, and owns the voucher's
/// one-way redemption transition.
#[derive(Clone)]
pub struct VoucherService {
    store: Arc<dyn MarketStore>,
}

impl VoucherService {
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        VoucherService { store }
    }

    /// Single issuance path for all four triggers (direct purchase, the two
    /// gateway callbacks, free selection). The voucher id is generated
    /// before insert, so the QR payload is encoded exactly once from fields
    /// known up front.
    pub async fn issue(
        &self,
        patient_id: Uuid,
        package_id: Uuid,
        origin: SerialOrigin,
        price: u64,
    ) -> MarketResult<PackagePurchase> {
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

        let now = Utc::now();
        let mut serial = SerialNumber::generate(origin);
        for attempt in 0..MAX_SERIAL_ATTEMPTS {
            let purchase = PackagePurchase {
                id: Uuid::new_v4(),
                serial: serial.clone(),
                patient_id,
                package_id,
                provider_id: package.provider_id,
                price,
                qr_payload: QrPayload {
                    serial: serial.clone(),
                    mh_number: patient.mh_number.clone(),
                    patient_id,
                    package_id,
                    timestamp: now,
                },
                redemption_status: RedemptionStatus::Pending,
                purchased_at: now,
                redeemed_at: None,
                redeemed_by: None,
            };
            match self.store.insert_purchase(purchase.clone()).await {
                Ok(()) => return Ok(purchase),
                Err(MarketError::AlreadyExists(taken)) => {
                    warn!(
                        "voucher serial {} collided (attempt {}), regenerating",
                        taken, attempt
                    );
                    serial = SerialNumber::generate(origin);
                }
                Err(other) => return Err(other),
            }
        }
        Err(MarketError::InternalError(
            "could not allocate a unique voucher serial".to_string(),
        ))
    }

    /// Direct (no-gateway) purchase. A free package takes the FREE path at
    /// price 0; anything else is issued at the package price.
    pub async fn purchase_direct(
        &self,
        patient_id: Uuid,
        package_id: Uuid,
    ) -> MarketResult<PackagePurchase> {
        let package = self
            .store
            .get_package(package_id)
            .await?
            .ok_or_else(|| MarketError::NotFound(format!("package {}", package_id)))?;
        if !package.is_active {
            return Err(MarketError::NotFound(format!("package {}", package_id)));
        }
        if package.is_free {
            self.issue(patient_id, package_id, SerialOrigin::Free, 0)
                .await
        } else {
            self.issue(patient_id, package_id, SerialOrigin::Direct, package.price)
                .await
        }
    }

    /// Redemption transition: PENDING -> REDEEMED, stamping who redeemed and
    /// when. A voucher in any terminal state is refused and left untouched.
    pub async fn redeem(
        &self,
        locator: VoucherLocator,
        staff_name: &str,
    ) -> MarketResult<PackagePurchase> {
        let staff = staff_name.trim();
        if staff.is_empty() {
            return Err(ValidationError::MissingStaffName.into());
        }

        let mut purchase = self.locate(locator).await?;
        if purchase.redemption_status.is_terminal() {
            return Err(MarketError::NotRedeemable {
                serial: purchase.serial,
                status: purchase.redemption_status,
            });
        }

        purchase.redemption_status = RedemptionStatus::Redeemed;
        purchase.redeemed_at = Some(Utc::now());
        purchase.redeemed_by = Some(staff.to_string());
        self.store.update_purchase(purchase.clone()).await?;

        info!("voucher {} redeemed by {}", purchase.serial, staff);
        Ok(purchase)
    }

    /// A patient's vouchers joined with package and provider summaries for
    /// the dashboard listing.
    pub async fn list_for_patient(&self, patient_id: Uuid) -> MarketResult<Vec<PurchaseSummary>> {
        let purchases = self.store.list_purchases_by_patient(patient_id).await?;
        let mut summaries = Vec::with_capacity(purchases.len());
        for purchase in purchases {
            let package = self
                .store
                .get_package(purchase.package_id)
                .await?
                .ok_or_else(|| MarketError::NotFound(format!("package {}", purchase.package_id)))?;
            let provider = self.store.get_provider(purchase.provider_id).await?.ok_or_else(
                || MarketError::NotFound(format!("provider {}", purchase.provider_id)),
            )?;
            summaries.push(PurchaseSummary {
                purchase,
                package_name: package.name,
                treatment_type: package.treatment_type,
                provider_name: provider.name,
                provider_location: provider.location,
            });
        }
        Ok(summaries)
    }

    async fn locate(&self, locator: VoucherLocator) -> MarketResult<PackagePurchase> {
        match locator {
            VoucherLocator::QrPayload(raw) => {
                let payload = QrPayload::decode(&raw)?;
                self.store
                    .find_purchase_by_serial(&payload.serial)
                    .await?
                    .ok_or_else(|| MarketError::NotFound(format!("voucher {}", payload.serial)))
            }
            VoucherLocator::MhNumber(raw) => {
                let mh = MhNumber::new(raw.trim().to_uppercase())
                    .map_err(MarketError::Validation)?;
                let patient = self
                    .store
                    .find_patient_by_mh_number(&mh)
                    .await?
                    .ok_or_else(|| MarketError::NotFound(format!("patient {}", mh)))?;
                let purchases = self.store.list_purchases_by_patient(patient.id).await?;
                purchases
                    .into_iter()
                    .find(|p| p.redemption_status == RedemptionStatus::Pending)
                    .ok_or_else(|| MarketError::NotFound(format!("pending voucher for {}", mh)))
            }
            VoucherLocator::Search(query) => {
                let mut found = self.store.search_purchases(&query).await?;
                if found.is_empty() {
                    return Err(MarketError::NotFound(format!("voucher matching {}", query)));
                }
                Ok(found.remove(0))
            }
        }
    }
}
