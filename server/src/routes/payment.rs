// server/src/routes/payment.rs
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Redirect;
use log::warn;
use serde::Deserialize;

use models::GatewayKind;

use crate::state::AppState;

/// Flutterwave sends the browser back with tx_ref (ours), its own
/// transaction_id and a status hint. Only the reference matters; the
/// authoritative answer comes from the verify call.
#[derive(Debug, Deserialize)]
pub struct FlutterwaveCallbackQuery {
    pub tx_ref: Option<String>,
    #[allow(dead_code)]
    pub transaction_id: Option<String>,
    #[allow(dead_code)]
    pub status: Option<String>,
}

/// Paystack sends both `reference` and the legacy `trxref`.
#[derive(Debug, Deserialize)]
pub struct PaystackCallbackQuery {
    pub reference: Option<String>,
    pub trxref: Option<String>,
}

pub async fn flutterwave_callback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FlutterwaveCallbackQuery>,
) -> Redirect {
    settle(&state, GatewayKind::Flutterwave, query.tx_ref).await
}

pub async fn paystack_callback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PaystackCallbackQuery>,
) -> Redirect {
    let reference = query.reference.or(query.trxref);
    settle(&state, GatewayKind::Paystack, reference).await
}

/// Settles the callback and sends the browser to the dashboard with a
/// `payment=success|failed` flag; the flag is all the dashboard gets.
async fn settle(state: &AppState, kind: GatewayKind, reference: Option<String>) -> Redirect {
    let outcome = match reference {
        Some(reference) => state.payments.settle_callback(kind, &reference).await,
        None => {
            warn!("{} callback arrived without a reference", kind);
            return failed(state);
        }
    };
    match outcome {
        Ok(_) => Redirect::to(&format!("{}?payment=success", state.dashboard_url)),
        Err(err) => {
            warn!("{} callback failed to settle: {}", kind, err);
            failed(state)
        }
    }
}

fn failed(state: &AppState) -> Redirect {
    Redirect::to(&format!("{}?payment=failed", state.dashboard_url))
}
