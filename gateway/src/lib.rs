// gateway/src/lib.rs

pub mod adapter;
pub mod flutterwave;
pub mod paystack;

pub use adapter::{ChargeSession, GatewayRouter, InitializeCharge, PaymentGateway};
pub use flutterwave::FlutterwaveGateway;
pub use paystack::PaystackGateway;
