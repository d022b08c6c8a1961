// models/src/errors.rs
use std::io;

use serde::{Deserialize, Serialize};
pub use thiserror::Error;
use uuid::Error as UuidError;

use crate::identifiers::SerialNumber;
use crate::purchase::RedemptionStatus;

#[derive(Debug, Serialize, Deserialize, Error, Clone, PartialEq)]
pub enum MarketError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("Validation error: {0}")]
    Validation(ValidationError),
    #[error("an account with email {0} already exists")]
    EmailTaken(String),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("code {0} is not a recognised programme code")]
    InvalidCode(String),
    #[error("code {0} is already bound to another patient")]
    CodeAlreadyUsed(String),
    #[error("payment {0} has not been verified")]
    PaymentNotVerified(String),
    #[error("payment initialization failed: {0}")]
    PaymentInitializationFailed(String),
    #[error("voucher {serial} is {status} and cannot be redeemed")]
    NotRedeemable {
        serial: SerialNumber,
        status: RedemptionStatus,
    },
    #[error("provider {0} has been revoked")]
    ProviderRevoked(String),
    #[error("subscription is not active for patient {0}")]
    SubscriptionInactive(String),
    #[error("entity already exists: {0}")]
    AlreadyExists(String),
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("An internal error occurred: {0}")]
    InternalError(String),
}

impl From<&str> for MarketError {
    fn from(error: &str) -> Self {
        MarketError::InternalError(error.to_string())
    }
}

impl From<serde_json::Error> for MarketError {
    fn from(err: serde_json::Error) -> Self {
        MarketError::SerializationError(format!("JSON serialization error: {}", err))
    }
}

impl From<io::Error> for MarketError {
    fn from(err: io::Error) -> Self {
        MarketError::StorageError(format!("IO error: {}", err))
    }
}

impl From<UuidError> for MarketError {
    fn from(err: UuidError) -> Self {
        MarketError::InternalError(format!("UUID error: {}", err))
    }
}

impl From<ValidationError> for MarketError {
    fn from(err: ValidationError) -> Self {
        MarketError::Validation(err)
    }
}

#[derive(Debug, Serialize, Deserialize, Error, PartialEq, Clone)]
pub enum ValidationError {
    #[error("required field {0} is missing")]
    MissingField(String),
    #[error("{0} is not a valid email address")]
    InvalidEmail(String),
    #[error("identifier '{0}' is invalid")]
    InvalidIdentifier(String),
    #[error("invalid date format: {0}")]
    InvalidDateFormat(String),
    #[error("unknown payment gateway: {0}")]
    UnknownGateway(String),
    #[error("staff name is required to redeem a voucher")]
    MissingStaffName,
    #[error("package is not free")]
    PackageNotFree,
    #[error("invalid value for {0}")]
    InvalidValue(String),
}

impl ValidationError {
    /// Shorthand used by the services when a request body omits a field.
    pub fn missing(field: &str) -> Self {
        ValidationError::MissingField(field.to_string())
    }
}

/// A type alias for a `Result` that returns a `MarketError` on failure.
pub type MarketResult<T> = Result<T, MarketError>;

/// A type alias for a `Result` that returns a `ValidationError` on failure.
pub type ValidationResult<T> = Result<T, ValidationError>;
