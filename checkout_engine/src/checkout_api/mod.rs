//! The public face of the checkout engine.
//!
//! * [`CheckoutFlowApi`](checkout_flow_api::CheckoutFlowApi) reconciles client checkouts with gateway transactions
//!   and writes paid orders to the ledger.
//! * [`MenuApi`](menu_api::MenuApi) normalizes and stores menu documents.
pub mod checkout_flow_api;
pub mod checkout_objects;
pub mod errors;
pub mod menu_api;
