//! A small, typed client for the parts of the Paystack REST API that a checkout backend needs: initializing a
//! transaction and verifying it by reference.
mod api;
mod config;
mod data_objects;
mod error;

pub use api::PaystackApi;
pub use config::{PaystackConfig, DEFAULT_PAYSTACK_BASE_URL, DEFAULT_PAYSTACK_TIMEOUT};
pub use data_objects::{InitializeTransactionRequest, PaystackEnvelope, TransactionAuthorization, TransactionRecord};
pub use error::PaystackApiError;
