use checkout_engine::{
    checkout_objects::{
        AmbiguityCause,
        InitializedCheckout,
        NewCheckout,
        OrderSubmission,
        PaymentEvidence,
        VerificationOutcome,
    },
    db_types::{MinorUnits, Order, OrderDetails, PaymentReference},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::errors::ServerError;

//--------------------------------------   Payments   ---------------------------------------------------------
#[derive(Debug, Clone, Deserialize)]
pub struct InitializePaymentRequest {
    #[serde(default)]
    pub email: String,
    /// Kept as a raw JSON number so that fractional amounts can be refused with a clear message.
    pub amount: Number,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub customer: Value,
    #[serde(default)]
    pub order: Value,
}

impl TryFrom<InitializePaymentRequest> for NewCheckout {
    type Error = ServerError;

    fn try_from(value: InitializePaymentRequest) -> Result<Self, Self::Error> {
        let amount = MinorUnits::try_from(&value.amount).map_err(|_| {
            ServerError::ValidationError(format!("Amount must be a whole number of minor units, but was {}.", value.amount))
        })?;
        let mut metadata = Map::new();
        if !value.customer.is_null() {
            metadata.insert("customer".into(), value.customer);
        }
        if !value.order.is_null() {
            metadata.insert("order".into(), value.order);
        }
        let mut checkout = NewCheckout::new(value.email, amount).with_metadata(Value::Object(metadata));
        checkout.currency = value.currency;
        Ok(checkout)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializePaymentResponse {
    pub public_key: String,
    pub reference: PaymentReference,
    pub authorization_url: String,
    pub access_code: String,
}

impl InitializePaymentResponse {
    pub fn new(checkout: InitializedCheckout, public_key: &str) -> Self {
        Self {
            public_key: public_key.to_string(),
            reference: checkout.reference,
            authorization_url: checkout.authorization_url,
            access_code: checkout.access_code,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyPaymentResponse {
    pub paid: bool,
    /// The gateway's status for the transaction, e.g. `success`, `failed` or `pending`.
    pub status: String,
    /// What we made of it: `settled`, `rejected` or `ambiguous`.
    pub outcome: String,
    pub reference: PaymentReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<MinorUnits>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// True when verifying again later may give a different answer.
    pub retryable: bool,
}

impl TryFrom<VerificationOutcome> for VerifyPaymentResponse {
    type Error = ServerError;

    /// Gateway failures have no response body of their own and are handed back as errors.
    fn try_from(outcome: VerificationOutcome) -> Result<Self, Self::Error> {
        let label = outcome.label().to_string();
        let settled_reference = outcome.reference().cloned().unwrap_or_default();
        match outcome {
            VerificationOutcome::Settled { order, payment, .. } => Ok(Self {
                paid: true,
                status: "success".into(),
                outcome: label,
                reference: settled_reference,
                amount: Some(payment.amount),
                currency: Some(payment.currency),
                paid_at: payment.paid_at,
                order: Some(order),
                reason: None,
                retryable: false,
            }),
            VerificationOutcome::Rejected { reference, reason, verification } => Ok(Self {
                paid: false,
                status: verification.raw_status.unwrap_or_else(|| verification.status.to_string()),
                outcome: label,
                reference,
                amount: verification.amount,
                currency: verification.currency,
                paid_at: None,
                order: None,
                reason: Some(reason.to_string()),
                retryable: false,
            }),
            VerificationOutcome::Ambiguous { cause: AmbiguityCause::Gateway(e), .. } => Err(e.into()),
            VerificationOutcome::Ambiguous { reference, cause } => {
                let status = match &cause {
                    AmbiguityCause::UnrecognisedStatus(Some(s)) => s.clone(),
                    _ => "unknown".to_string(),
                };
                Ok(Self {
                    paid: false,
                    status,
                    outcome: label,
                    reference,
                    amount: None,
                    currency: None,
                    paid_at: None,
                    order: None,
                    reason: Some(cause.to_string()),
                    retryable: true,
                })
            },
        }
    }
}

//--------------------------------------    Orders    ---------------------------------------------------------
/// Reads a `POST /orders` body. A non-empty `reference` makes the gateway the judge of whether the order was paid;
/// without one, the order rests on the caller's word alone.
pub fn order_submission_from_json(body: Value) -> Result<OrderSubmission, ServerError> {
    let Value::Object(map) = body else {
        return Err(ServerError::InvalidRequestBody("An order must be a JSON object.".into()));
    };
    let evidence = match map.get("reference") {
        None | Some(Value::Null) => PaymentEvidence::ClientReported,
        Some(Value::String(s)) if s.trim().is_empty() => PaymentEvidence::ClientReported,
        Some(Value::String(s)) => PaymentEvidence::GatewayReference(PaymentReference::from(s.trim())),
        Some(_) => return Err(ServerError::InvalidRequestBody("The payment reference must be a string.".into())),
    };
    Ok(OrderSubmission::new(evidence, OrderDetails::from_value(Value::Object(map))))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResponse {
    pub success: bool,
    pub order: Order,
}

//--------------------------------------    Admin     ---------------------------------------------------------
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub ok: bool,
    pub service: String,
}
