// server/src/routes/admin.rs
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeBody {
    pub provider_id: Uuid,
    pub reason: String,
    pub admin_id: String,
}

pub async fn revoke(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RevokeBody>,
) -> ApiResult<Json<Value>> {
    let provider = state
        .providers
        .revoke(body.provider_id, &body.reason, &body.admin_id)
        .await?;
    Ok(Json(json!({ "provider": provider })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreBody {
    pub provider_id: Uuid,
}

pub async fn restore(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RestoreBody>,
) -> ApiResult<Json<Value>> {
    let provider = state.providers.restore(body.provider_id).await?;
    Ok(Json(json!({ "provider": provider })))
}
