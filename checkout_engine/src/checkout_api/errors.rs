use thiserror::Error;

use crate::{
    db_types::PaymentReference,
    helpers::GenerationError,
    traits::{GatewayError, LedgerError, MenuStoreError},
};

#[derive(Debug, Clone, Error)]
pub enum CheckoutError {
    #[error("Invalid checkout request. {0}")]
    Validation(String),
    #[error("{0}")]
    Generation(#[from] GenerationError),
    #[error("{0}")]
    Gateway(#[from] GatewayError),
    #[error("Payment {reference} was not completed. The gateway reported: {reason}")]
    PaymentNotConfirmed { reference: PaymentReference, reason: String },
    #[error("Payment {reference} could not be confirmed yet. {reason}")]
    PaymentUnconfirmed { reference: PaymentReference, reason: String },
    #[error("Orders must reference a payment that the gateway can verify.")]
    UntrustedPayment,
    #[error("Could not record the order. {0}")]
    Ledger(#[from] LedgerError),
}

#[derive(Debug, Clone, Error)]
pub enum MenuError {
    #[error("Invalid menu document. {0}")]
    InvalidShape(String),
    #[error("{0}")]
    Store(#[from] MenuStoreError),
}
