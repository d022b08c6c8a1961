// server/src/state.rs
use std::sync::Arc;

use gateway::{FlutterwaveGateway, GatewayRouter, PaystackGateway};
use services::{
    CatalogService, PatientService, PaymentService, ProviderService, SubscriptionService,
    VoucherService,
};
use store::{InMemoryStore, MarketStore};

use crate::config::ServerConfig;

/// Everything the handlers need, shared behind one `Arc`.
pub struct AppState {
    pub patients: PatientService,
    pub providers: ProviderService,
    pub subscriptions: SubscriptionService,
    pub catalog: CatalogService,
    pub vouchers: VoucherService,
    pub payments: PaymentService,
    pub dashboard_url: String,
}

impl AppState {
    pub fn build(config: &ServerConfig) -> Arc<Self> {
        let store: Arc<dyn MarketStore> = Arc::new(InMemoryStore::new());

        let flutterwave = match &config.flutterwave.base_url {
            Some(base) => FlutterwaveGateway::with_base_url(
                config.flutterwave.secret_key.clone(),
                base.clone(),
            ),
            None => FlutterwaveGateway::new(config.flutterwave.secret_key.clone()),
        };
        let paystack = match &config.paystack.base_url {
            Some(base) => {
                PaystackGateway::with_base_url(config.paystack.secret_key.clone(), base.clone())
            }
            None => PaystackGateway::new(config.paystack.secret_key.clone()),
        };
        let router = Arc::new(GatewayRouter::new(Arc::new(flutterwave), Arc::new(paystack)));

        let subscriptions = SubscriptionService::new(store.clone());
        let vouchers = VoucherService::new(store.clone());
        Arc::new(AppState {
            patients: PatientService::new(store.clone()),
            providers: ProviderService::new(store.clone()),
            catalog: CatalogService::new(store.clone(), subscriptions.clone()),
            subscriptions,
            payments: PaymentService::new(
                store.clone(),
                router,
                vouchers.clone(),
                config.currency.clone(),
                config.public_base_url.clone(),
            ),
            vouchers,
            dashboard_url: config.dashboard_url.clone(),
        })
    }
}
