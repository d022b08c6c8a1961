// server/src/routes/provider.rs
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use models::errors::ValidationError;
use models::package::{NewPackage, PackageUpdate};
use models::provider::{NewProvider, PaymentSettings};
use services::VoucherLocator;

use crate::error::ApiResult;
use crate::routes::patient::Credentials;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderIdQuery {
    pub provider_id: Uuid,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewProvider>,
) -> ApiResult<Json<Value>> {
    let provider = state.providers.register(body).await?;
    Ok(Json(json!({
        "providerId": provider.id,
        "mhpNumber": provider.mhp_number,
    })))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Credentials>,
) -> ApiResult<Json<Value>> {
    let provider = state.providers.login(&body.email, &body.password).await?;
    Ok(Json(json!({ "providerId": provider.id })))
}

pub async fn profile(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProviderIdQuery>,
) -> ApiResult<Json<Value>> {
    let (provider, packages) = state.providers.profile(query.provider_id).await?;
    Ok(Json(json!({
        "provider": provider,
        "packages": packages,
    })))
}

pub async fn get_payment_settings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProviderIdQuery>,
) -> ApiResult<Json<Value>> {
    let settings = state.providers.payment_settings(query.provider_id).await?;
    Ok(Json(json!({ "settings": settings })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSettingsBody {
    pub provider_id: Uuid,
    #[serde(flatten)]
    pub settings: PaymentSettings,
}

pub async fn set_payment_settings(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PaymentSettingsBody>,
) -> ApiResult<Json<Value>> {
    let settings = state
        .providers
        .set_payment_settings(body.provider_id, body.settings)
        .await?;
    Ok(Json(json!({ "settings": settings })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePackageBody {
    pub provider_id: Uuid,
    #[serde(flatten)]
    pub package: NewPackage,
}

pub async fn create_package(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreatePackageBody>,
) -> ApiResult<Json<Value>> {
    let package = state
        .providers
        .create_package(body.provider_id, body.package)
        .await?;
    Ok(Json(serde_json::to_value(package).map_err(models::MarketError::from)?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePackageBody {
    pub provider_id: Uuid,
    pub package_id: Uuid,
    #[serde(flatten)]
    pub update: PackageUpdate,
}

pub async fn update_package(
    State(state): State<Arc<AppState>>,
    Json(body): Json<UpdatePackageBody>,
) -> ApiResult<Json<Value>> {
    let package = state
        .providers
        .update_package(body.provider_id, body.package_id, body.update)
        .await?;
    Ok(Json(serde_json::to_value(package).map_err(models::MarketError::from)?))
}

/// Redemption console. Exactly one locator channel is used per request:
/// scanned QR contents, the patient's MH number, or a manual serial search.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemBody {
    pub qr_payload: Option<String>,
    pub mh_number: Option<String>,
    pub search: Option<String>,
    pub staff_name: String,
}

pub async fn redeem(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RedeemBody>,
) -> ApiResult<Json<Value>> {
    let locator = if let Some(raw) = body.qr_payload {
        VoucherLocator::QrPayload(raw)
    } else if let Some(mh) = body.mh_number {
        VoucherLocator::MhNumber(mh)
    } else if let Some(query) = body.search {
        VoucherLocator::Search(query)
    } else {
        return Err(models::MarketError::from(ValidationError::missing(
            "qrPayload, mhNumber or search",
        ))
        .into());
    };

    let voucher = state.vouchers.redeem(locator, &body.staff_name).await?;
    Ok(Json(serde_json::to_value(voucher).map_err(models::MarketError::from)?))
}
