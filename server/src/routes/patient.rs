// server/src/routes/patient.rs
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use models::errors::ValidationError;
use models::patient::NewPatient;
use models::GatewayKind;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientIdQuery {
    #[serde(alias = "id")]
    pub patient_id: Uuid,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewPatient>,
) -> ApiResult<Json<Value>> {
    let patient = state.patients.register(body).await?;
    Ok(Json(json!({ "patientId": patient.id })))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Credentials>,
) -> ApiResult<Json<Value>> {
    let patient = state.patients.login(&body.email, &body.password).await?;
    Ok(Json(json!({ "patientId": patient.id })))
}

pub async fn me(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PatientIdQuery>,
) -> ApiResult<Json<Value>> {
    let patient = state.patients.profile(query.patient_id).await?;
    Ok(Json(serde_json::to_value(patient).map_err(models::MarketError::from)?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateSubscriptionBody {
    pub patient_id: Uuid,
    pub gfp_code: Option<String>,
    pub reference: Option<String>,
}

/// One endpoint, two mutually exclusive activation paths: a GFP code or a
/// verified payment reference.
pub async fn activate_subscription(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ActivateSubscriptionBody>,
) -> ApiResult<Json<Value>> {
    let patient = match (body.gfp_code, body.reference) {
        (Some(code), _) => {
            state
                .subscriptions
                .activate_gfp(body.patient_id, &code)
                .await?
        }
        (None, Some(reference)) => {
            state
                .subscriptions
                .activate_paid(body.patient_id, &reference)
                .await?
        }
        (None, None) => {
            return Err(models::MarketError::from(ValidationError::missing(
                "gfpCode or reference",
            ))
            .into())
        }
    };
    Ok(Json(json!({ "patient": patient })))
}

pub async fn subscription_status(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PatientIdQuery>,
) -> ApiResult<Json<Value>> {
    let subscription = state.subscriptions.status(query.patient_id).await?;
    Ok(Json(json!({ "subscription": subscription })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPaymentBody {
    pub patient_id: Uuid,
    pub gateway: GatewayKind,
}

pub async fn subscription_payment(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SubscriptionPaymentBody>,
) -> ApiResult<Json<Value>> {
    let session = state
        .payments
        .initialize_subscription_charge(body.patient_id, body.gateway)
        .await?;
    Ok(Json(json!({
        "paymentUrl": session.payment_url,
        "reference": session.reference,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackagePaymentBody {
    pub patient_id: Uuid,
    pub package_id: Uuid,
    pub gateway: GatewayKind,
}

pub async fn package_payment(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PackagePaymentBody>,
) -> ApiResult<Json<Value>> {
    let session = state
        .payments
        .initialize_package_charge(body.patient_id, body.package_id, body.gateway)
        .await?;
    Ok(Json(json!({
        "paymentUrl": session.payment_url,
        "reference": session.reference,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseBody {
    pub patient_id: Uuid,
    pub package_id: Uuid,
}

/// Direct, no-gateway purchase; free packages come through here too.
pub async fn purchase(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PurchaseBody>,
) -> ApiResult<Json<Value>> {
    let voucher = state
        .vouchers
        .purchase_direct(body.patient_id, body.package_id)
        .await?;
    Ok(Json(serde_json::to_value(voucher).map_err(models::MarketError::from)?))
}

pub async fn purchases(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PatientIdQuery>,
) -> ApiResult<Json<Value>> {
    let listed = state.vouchers.list_for_patient(query.patient_id).await?;
    Ok(Json(serde_json::to_value(listed).map_err(models::MarketError::from)?))
}

pub async fn browse_packages(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PatientIdQuery>,
) -> ApiResult<Json<Value>> {
    let visible = state.catalog.browse(query.patient_id).await?;
    Ok(Json(serde_json::to_value(visible).map_err(models::MarketError::from)?))
}
