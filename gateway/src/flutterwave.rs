// gateway/src/flutterwave.rs
use async_trait::async_trait;
use log::{error, warn};
use serde::{Deserialize, Serialize};

use models::errors::MarketResult;
use models::GatewayKind;

use crate::adapter::{init_failed, ChargeSession, InitializeCharge, PaymentGateway};

const DEFAULT_BASE_URL: &str = "https://api.flutterwave.com/v3";

pub struct FlutterwaveGateway {
    client: reqwest::Client,
    secret_key: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct FlwCustomer<'a> {
    email: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct FlwPaymentRequest<'a> {
    tx_ref: &'a str,
    amount: u64,
    currency: &'a str,
    redirect_url: &'a str,
    customer: FlwCustomer<'a>,
}

#[derive(Debug, Deserialize)]
struct FlwPaymentResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    data: Option<FlwPaymentData>,
}

#[derive(Debug, Deserialize)]
struct FlwPaymentData {
    link: String,
}

#[derive(Debug, Deserialize)]
struct FlwVerifyResponse {
    status: String,
    data: Option<FlwVerifyData>,
}

#[derive(Debug, Deserialize)]
struct FlwVerifyData {
    status: String,
}

impl FlutterwaveGateway {
    pub fn new(secret_key: String) -> Self {
        Self::with_base_url(secret_key, DEFAULT_BASE_URL.to_string())
    }

    /// The base URL is injectable so staging endpoints can be pointed at
    /// from configuration.
    pub fn with_base_url(secret_key: String, base_url: String) -> Self {
        FlutterwaveGateway {
            client: reqwest::Client::new(),
            secret_key,
            base_url,
        }
    }
}

#[async_trait]
impl PaymentGateway for FlutterwaveGateway {
    fn kind(&self) -> GatewayKind {
        GatewayKind::Flutterwave
    }

    async fn initialize(&self, charge: &InitializeCharge) -> MarketResult<ChargeSession> {
        let body = FlwPaymentRequest {
            tx_ref: &charge.reference,
            amount: charge.amount,
            currency: &charge.currency,
            redirect_url: &charge.redirect_url,
            customer: FlwCustomer {
                email: &charge.payer_email,
                name: &charge.payer_name,
            },
        };

        let response = self
            .client
            .post(format!("{}/payments", self.base_url))
            .bearer_auth(&self.secret_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("flutterwave initialize transport failure: {}", e);
                init_failed(e)
            })?;

        let parsed: FlwPaymentResponse = response.json().await.map_err(init_failed)?;
        if parsed.status != "success" {
            return Err(init_failed(
                parsed.message.unwrap_or_else(|| parsed.status.clone()),
            ));
        }
        let data = parsed
            .data
            .ok_or_else(|| init_failed("response carried no payment link"))?;

        Ok(ChargeSession {
            payment_url: data.link,
            reference: charge.reference.clone(),
        })
    }

    async fn verify(&self, reference: &str) -> bool {
        let url = format!(
            "{}/transactions/verify_by_reference?tx_ref={}",
            self.base_url, reference
        );
        let response = match self
            .client
            .get(url)
            .bearer_auth(&self.secret_key)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!("flutterwave verify failed for {}: {}", reference, e);
                return false;
            }
        };
        match response.json::<FlwVerifyResponse>().await {
            Ok(parsed) => {
                parsed.status == "success"
                    && parsed
                        .data
                        .map(|d| d.status == "successful")
                        .unwrap_or(false)
            }
            Err(e) => {
                warn!("flutterwave verify response unreadable: {}", e);
                false
            }
        }
    }
}
