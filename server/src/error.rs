// server/src/error.rs
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use serde_json::json;

use models::errors::MarketError;

/// Boundary wrapper turning a `MarketError` into the uniform JSON failure
/// body `{"error": "..."}` with an HTTP status.
#[derive(Debug)]
pub struct ApiError(pub MarketError);

impl From<MarketError> for ApiError {
    fn from(err: MarketError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            MarketError::NotFound(_) => StatusCode::NOT_FOUND,
            MarketError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            MarketError::Validation(_)
            | MarketError::EmailTaken(_)
            | MarketError::InvalidCode(_)
            | MarketError::CodeAlreadyUsed(_)
            | MarketError::PaymentNotVerified(_)
            | MarketError::NotRedeemable { .. }
            | MarketError::ProviderRevoked(_)
            | MarketError::SubscriptionInactive(_)
            | MarketError::AlreadyExists(_) => StatusCode::BAD_REQUEST,
            MarketError::PaymentInitializationFailed(_)
            | MarketError::StorageError(_)
            | MarketError::SerializationError(_)
            | MarketError::ConfigurationError(_)
            | MarketError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("request failed: {}", self.0);
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_map_not_found_to_404() {
        let response = ApiError(MarketError::NotFound("patient x".into())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn should_map_credentials_to_401() {
        let response = ApiError(MarketError::InvalidCredentials).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn should_map_gateway_failure_to_500() {
        let response =
            ApiError(MarketError::PaymentInitializationFailed("down".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
