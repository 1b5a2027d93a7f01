use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::db_types::{MinorUnits, PaymentReference};

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// A required credential is missing. Detected before any network I/O.
    #[error("Payment gateway is not configured. {0}")]
    Configuration(String),
    /// The gateway answered, but declined the request.
    #[error("Payment gateway rejected the request. {0}")]
    Rejected(String),
    /// The call did not complete: timeout, DNS, TLS, or an unreadable response.
    #[error("Payment gateway is unavailable. {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitializeTransaction {
    pub email: String,
    pub amount: MinorUnits,
    pub currency: String,
    pub reference: PaymentReference,
    /// Passed through to the gateway and handed back on verification.
    pub metadata: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitializedTransaction {
    pub authorization_url: String,
    pub access_code: String,
    pub reference: PaymentReference,
}

/// The gateway's verdict on a transaction.
///
/// Anything the gateway reports that is not one of the three definite outcomes, including `pending`, is `Unknown`:
/// the payment may still succeed, so it must not be treated as a failure, and it certainly is not a success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayStatus {
    Success,
    Failed,
    Abandoned,
    Unknown,
}

impl GatewayStatus {
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("success") => Self::Success,
            Some("failed") => Self::Failed,
            Some("abandoned") => Self::Abandoned,
            _ => Self::Unknown,
        }
    }
}

impl Display for GatewayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayStatus::Success => write!(f, "success"),
            GatewayStatus::Failed => write!(f, "failed"),
            GatewayStatus::Abandoned => write!(f, "abandoned"),
            GatewayStatus::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayVerification {
    pub status: GatewayStatus,
    /// The status string exactly as the gateway sent it.
    pub raw_status: Option<String>,
    pub amount: Option<MinorUnits>,
    pub currency: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub channel: Option<String>,
    pub metadata: Value,
}

impl GatewayVerification {
    pub fn new(status: GatewayStatus) -> Self {
        Self {
            status,
            raw_status: Some(status.to_string()),
            amount: None,
            currency: None,
            paid_at: None,
            channel: None,
            metadata: Value::Null,
        }
    }

    pub fn with_amount<S: Into<String>>(mut self, amount: MinorUnits, currency: S) -> Self {
        self.amount = Some(amount);
        self.currency = Some(currency.into());
        self
    }

    pub fn with_paid_at(mut self, paid_at: DateTime<Utc>) -> Self {
        self.paid_at = Some(paid_at);
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// A remote payment provider.
///
/// Each method makes exactly one round trip. Implementations must not retry; only the caller knows whether the
/// customer is still around to try again.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    async fn initialize(&self, request: &InitializeTransaction) -> Result<InitializedTransaction, GatewayError>;

    async fn verify(&self, reference: &PaymentReference) -> Result<GatewayVerification, GatewayError>;
}
