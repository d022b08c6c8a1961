// server/src/routes/mod.rs
use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod patient;
pub mod payment;
pub mod provider;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Patient surface
        .route("/patient/register", post(patient::register))
        .route("/patient/login", post(patient::login))
        .route("/patient/me", get(patient::me))
        .route(
            "/patient/activate-subscription",
            post(patient::activate_subscription).get(patient::subscription_status),
        )
        .route(
            "/patient/subscription-payment",
            post(patient::subscription_payment),
        )
        .route("/patient/package-payment", post(patient::package_payment))
        .route("/patient/purchase", post(patient::purchase))
        .route("/patient/purchases", get(patient::purchases))
        .route("/patient/packages", get(patient::browse_packages))
        // Provider surface
        .route("/provider/register", post(provider::register))
        .route("/provider/login", post(provider::login))
        .route("/provider/profile", get(provider::profile))
        .route(
            "/provider/payment-settings",
            get(provider::get_payment_settings).post(provider::set_payment_settings),
        )
        .route(
            "/provider/packages",
            post(provider::create_package).put(provider::update_package),
        )
        .route("/provider/redeem", post(provider::redeem))
        // Admin surface
        .route(
            "/admin/revoke-provider",
            post(admin::revoke).put(admin::restore),
        )
        // Gateway redirect targets
        .route(
            "/payment/flutterwave/callback",
            get(payment::flutterwave_callback),
        )
        .route("/payment/paystack/callback", get(payment::paystack_callback))
        .with_state(state)
}
