// models/src/lib.rs

// Declare all top-level modules within the 'models' crate
pub mod errors;
pub mod identifiers;
pub mod package;
pub mod patient;
pub mod payment;
pub mod provider;
pub mod purchase;

// Re-export the common core types for convenience when other crates use 'models::*'
pub use errors::{MarketError, MarketResult, ValidationError};
pub use identifiers::{GfpCode, MhNumber, MhpNumber, SerialNumber, SerialOrigin};
pub use package::{HealthcarePackage, NewPackage, PackageUpdate};
pub use patient::{
    NewPatient, Patient, Subscription, SubscriptionPlanType, SubscriptionStatus, SubscriptionType,
};
pub use payment::{GatewayKind, PaymentStatus, PaymentTransaction};
pub use provider::{HealthcareProvider, NewProvider, PaymentSettings};
pub use purchase::{PackagePurchase, PurchaseSummary, QrPayload, RedemptionStatus};
