use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    db_types::{MinorUnits, Order, OrderDetails, PaymentReference, VerifiedPayment},
    helpers::DEFAULT_REFERENCE_PREFIX,
    traits::{GatewayError, GatewayStatus, GatewayVerification},
};

/// The smallest amount, in minor units, that the gateway will accept.
pub const DEFAULT_MINIMUM_AMOUNT: i64 = 50;
/// How many unfinished checkout attempts are remembered before the stalest ones are forgotten.
pub const DEFAULT_MAX_TRACKED_ATTEMPTS: usize = 10_000;

//--------------------------------------   CheckoutOptions    ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutOptions {
    pub minimum_amount: MinorUnits,
    pub default_currency: String,
    pub reference_prefix: String,
    /// When true, `POST /orders` without a payment reference is accepted and the order is recorded as
    /// [`crate::db_types::PaymentTrust::ClientReported`]. Only enable this if payment is verified upstream.
    pub accept_client_reported_payments: bool,
    pub max_tracked_attempts: usize,
}

impl Default for CheckoutOptions {
    fn default() -> Self {
        Self {
            minimum_amount: MinorUnits::from(DEFAULT_MINIMUM_AMOUNT),
            default_currency: fh_common::DEFAULT_CURRENCY.to_string(),
            reference_prefix: DEFAULT_REFERENCE_PREFIX.to_string(),
            accept_client_reported_payments: false,
            max_tracked_attempts: DEFAULT_MAX_TRACKED_ATTEMPTS,
        }
    }
}

//--------------------------------------     NewCheckout      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq)]
pub struct NewCheckout {
    pub email: String,
    pub amount: MinorUnits,
    pub currency: Option<String>,
    /// Customer and cart details. Sent to the gateway as metadata and copied into the order once the payment settles.
    pub metadata: Value,
}

impl NewCheckout {
    pub fn new<S: Into<String>>(email: S, amount: MinorUnits) -> Self {
        Self { email: email.into(), amount, currency: None, metadata: Value::Null }
    }

    pub fn with_currency<S: Into<String>>(mut self, currency: S) -> Self {
        self.currency = Some(currency.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitializedCheckout {
    pub reference: PaymentReference,
    pub authorization_url: String,
    pub access_code: String,
}

//--------------------------------------  VerificationOutcome ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    /// The gateway says the payment failed or was abandoned.
    Status(GatewayStatus),
    /// The gateway says the payment succeeded, but for less (or in another currency) than the checkout asked for.
    AmountMismatch { expected: MinorUnits, expected_currency: String, actual: MinorUnits, actual_currency: String },
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectionReason::Status(status) => write!(f, "payment {status}"),
            RejectionReason::AmountMismatch { expected, expected_currency, actual, actual_currency } => {
                write!(f, "expected {expected} {expected_currency}, but {actual} {actual_currency} was paid")
            },
        }
    }
}

#[derive(Debug, Clone)]
pub enum AmbiguityCause {
    /// The gateway answered without a status we recognise, e.g. `pending`.
    UnrecognisedStatus(Option<String>),
    /// The gateway reported success but left out the amount or currency.
    IncompletePayload,
    /// The verify call itself failed.
    Gateway(GatewayError),
}

impl std::fmt::Display for AmbiguityCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AmbiguityCause::UnrecognisedStatus(Some(s)) => write!(f, "The gateway reported status '{s}'"),
            AmbiguityCause::UnrecognisedStatus(None) => write!(f, "The gateway did not report a status"),
            AmbiguityCause::IncompletePayload => write!(f, "The gateway reported success without an amount"),
            AmbiguityCause::Gateway(e) => write!(f, "{e}"),
        }
    }
}

/// The result of verifying a payment reference with the gateway.
#[derive(Debug, Clone)]
pub enum VerificationOutcome {
    /// The payment succeeded and `order` is in the ledger. `created` is false if an earlier call already recorded it.
    Settled { order: Order, created: bool, payment: VerifiedPayment },
    /// The payment definitely did not go through. No order was recorded.
    Rejected { reference: PaymentReference, reason: RejectionReason, verification: GatewayVerification },
    /// We could not tell whether the payment went through. No order was recorded; verifying again is safe.
    Ambiguous { reference: PaymentReference, cause: AmbiguityCause },
}

impl VerificationOutcome {
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Settled { .. })
    }

    pub fn reference(&self) -> Option<&PaymentReference> {
        match self {
            Self::Settled { order, .. } => order.reference.as_ref(),
            Self::Rejected { reference, .. } => Some(reference),
            Self::Ambiguous { reference, .. } => Some(reference),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Settled { .. } => "settled",
            Self::Rejected { .. } => "rejected",
            Self::Ambiguous { .. } => "ambiguous",
        }
    }
}

//--------------------------------------   OrderSubmission    ---------------------------------------------------------
/// What backs the claim that a submitted order has been paid for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentEvidence {
    /// A reference the gateway can verify. The order is only recorded if verification settles.
    GatewayReference(PaymentReference),
    /// Nothing but the caller's word. Accepted only when
    /// [`CheckoutOptions::accept_client_reported_payments`] is set.
    ClientReported,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderSubmission {
    pub evidence: PaymentEvidence,
    pub details: OrderDetails,
}

impl OrderSubmission {
    pub fn new(evidence: PaymentEvidence, details: OrderDetails) -> Self {
        Self { evidence, details }
    }
}
