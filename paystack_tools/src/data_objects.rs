use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Every Paystack response is wrapped in the same envelope. `status` is Paystack's own success flag and is
/// independent of the HTTP status code.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaystackEnvelope<T> {
    pub status: bool,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InitializeTransactionRequest {
    pub email: String,
    /// Amount in the currency's minor unit.
    pub amount: i64,
    pub currency: String,
    pub reference: String,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub metadata: Value,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransactionAuthorization {
    pub authorization_url: String,
    pub access_code: String,
    pub reference: String,
}

/// The subset of a Paystack transaction that the verify endpoint returns and that we care about.
///
/// `status` is kept as the raw string; it is one of `success`, `failed`, `abandoned`, `pending` (and a few rarer
/// values such as `reversed`), and callers decide what to make of anything else.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TransactionRecord {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub gateway_response: Option<String>,
    #[serde(default)]
    pub metadata: Value,
}
