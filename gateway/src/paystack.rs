// gateway/src/paystack.rs
use async_trait::async_trait;
use log::{error, warn};
use serde::{Deserialize, Serialize};

use models::errors::MarketResult;
use models::GatewayKind;

use crate::adapter::{init_failed, ChargeSession, InitializeCharge, PaymentGateway};

const DEFAULT_BASE_URL: &str = "https://api.paystack.co";

pub struct PaystackGateway {
    client: reqwest::Client,
    secret_key: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct PskInitializeRequest<'a> {
    email: &'a str,
    /// Paystack takes the amount in minor units (kobo).
    amount: u64,
    reference: &'a str,
    callback_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct PskInitializeResponse {
    status: bool,
    #[serde(default)]
    message: Option<String>,
    data: Option<PskInitializeData>,
}

#[derive(Debug, Deserialize)]
struct PskInitializeData {
    authorization_url: String,
    reference: String,
}

#[derive(Debug, Deserialize)]
struct PskVerifyResponse {
    status: bool,
    data: Option<PskVerifyData>,
}

#[derive(Debug, Deserialize)]
struct PskVerifyData {
    status: String,
}

impl PaystackGateway {
    pub fn new(secret_key: String) -> Self {
        Self::with_base_url(secret_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(secret_key: String, base_url: String) -> Self {
        PaystackGateway {
            client: reqwest::Client::new(),
            secret_key,
            base_url,
        }
    }
}

#[async_trait]
impl PaymentGateway for PaystackGateway {
    fn kind(&self) -> GatewayKind {
        GatewayKind::Paystack
    }

    async fn initialize(&self, charge: &InitializeCharge) -> MarketResult<ChargeSession> {
        let body = PskInitializeRequest {
            email: &charge.payer_email,
            amount: charge.amount * 100,
            reference: &charge.reference,
            callback_url: &charge.redirect_url,
        };

        let response = self
            .client
            .post(format!("{}/transaction/initialize", self.base_url))
            .bearer_auth(&self.secret_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("paystack initialize transport failure: {}", e);
                init_failed(e)
            })?;

        let parsed: PskInitializeResponse = response.json().await.map_err(init_failed)?;
        if !parsed.status {
            return Err(init_failed(
                parsed
                    .message
                    .unwrap_or_else(|| "initialization declined".to_string()),
            ));
        }
        let data = parsed
            .data
            .ok_or_else(|| init_failed("response carried no authorization url"))?;

        Ok(ChargeSession {
            payment_url: data.authorization_url,
            reference: data.reference,
        })
    }

    async fn verify(&self, reference: &str) -> bool {
        let url = format!("{}/transaction/verify/{}", self.base_url, reference);
        let response = match self
            .client
            .get(url)
            .bearer_auth(&self.secret_key)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!("paystack verify failed for {}: {}", reference, e);
                return false;
            }
        };
        match response.json::<PskVerifyResponse>().await {
            Ok(parsed) => {
                parsed.status && parsed.data.map(|d| d.status == "success").unwrap_or(false)
            }
            Err(e) => {
                warn!("paystack verify response unreadable: {}", e);
                false
            }
        }
    }
}
