// gateway/src/adapter.rs
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use models::errors::{MarketError, MarketResult};
use models::GatewayKind;

/// A charge the marketplace wants an external processor to collect.
#[derive(Clone, Debug, Serialize)]
pub struct InitializeCharge {
    /// Minor-unit-free amount in the platform's base currency.
    pub amount: u64,
    pub currency: String,
    pub payer_email: String,
    pub payer_name: String,
    /// Our unique transaction reference, echoed back by the callback.
    pub reference: String,
    /// Where the processor sends the payer's browser afterwards.
    pub redirect_url: String,
}

/// Normalized result of a successful initialization.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChargeSession {
    pub payment_url: String,
    pub reference: String,
}

/// Uniform contract over the external processors. Implementations surface
/// any initialization failure as `PaymentInitializationFailed` and treat an
/// unverifiable transaction as not verified. Nothing is retried.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    fn kind(&self) -> GatewayKind;

    async fn initialize(&self, charge: &InitializeCharge) -> MarketResult<ChargeSession>;

    /// True only when the processor positively confirms the transaction.
    /// Network failures and malformed responses are false: verification
    /// fails closed.
    async fn verify(&self, reference: &str) -> bool;
}

/// Routes a charge to the processor the caller named.
pub struct GatewayRouter {
    flutterwave: Arc<dyn PaymentGateway>,
    paystack: Arc<dyn PaymentGateway>,
}

impl GatewayRouter {
    pub fn new(flutterwave: Arc<dyn PaymentGateway>, paystack: Arc<dyn PaymentGateway>) -> Self {
        GatewayRouter {
            flutterwave,
            paystack,
        }
    }

    pub fn for_kind(&self, kind: GatewayKind) -> &dyn PaymentGateway {
        match kind {
            GatewayKind::Flutterwave => self.flutterwave.as_ref(),
            GatewayKind::Paystack => self.paystack.as_ref(),
        }
    }
}

pub(crate) fn init_failed(detail: impl std::fmt::Display) -> MarketError {
    MarketError::PaymentInitializationFailed(detail.to_string())
}
