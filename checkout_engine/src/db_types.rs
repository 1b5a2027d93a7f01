use std::fmt::Display;

use chrono::{DateTime, Utc};
pub use fh_common::MinorUnits;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

//--------------------------------------   PaymentReference   ---------------------------------------------------------
/// The correlation key between a checkout attempt and the gateway transaction. Always generated locally, see
/// [`crate::helpers::ReferenceGenerator`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentReference(pub String);

impl PaymentReference {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Display for PaymentReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PaymentReference {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for PaymentReference {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

//--------------------------------------       OrderId        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for OrderId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

//--------------------------------------     OrderStatus      ---------------------------------------------------------
/// Orders only ever enter the ledger once payment is established, so there is exactly one status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Paid,
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Paid => write!(f, "paid"),
        }
    }
}

//--------------------------------------     PaymentTrust     ---------------------------------------------------------
/// Records how the "paid" status of an order was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentTrust {
    /// The gateway confirmed the transaction behind the order's reference.
    GatewayVerified,
    /// The caller asserted that the order was paid. No gateway call backs this up.
    ClientReported,
}

impl Display for PaymentTrust {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentTrust::GatewayVerified => write!(f, "gateway_verified"),
            PaymentTrust::ClientReported => write!(f, "client_reported"),
        }
    }
}

//--------------------------------------   VerifiedPayment    ---------------------------------------------------------
/// The authoritative payment facts for an order. These fields only ever come from a successful gateway verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedPayment {
    pub amount: MinorUnits,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

//--------------------------------------     OrderDetails     ---------------------------------------------------------
/// Descriptive, caller-supplied order fields (customer info, line items, notes). Merged verbatim into the serialized
/// order, but never trusted for anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderDetails(Map<String, Value>);

impl OrderDetails {
    /// Keys that belong to the ledger. Callers cannot set them.
    pub const RESERVED_KEYS: [&'static str; 6] = ["id", "reference", "status", "trust", "payment", "createdAt"];

    /// Normalizes an arbitrary JSON value into order details.
    ///
    /// Objects are used as-is, minus [`Self::RESERVED_KEYS`]. `null` yields empty details, and any other value is kept
    /// under a `details` key.
    pub fn from_value(value: Value) -> Self {
        let mut map = match value {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("details".to_string(), other);
                map
            },
        };
        for key in Self::RESERVED_KEYS {
            map.remove(key);
        }
        Self(map)
    }

    /// Adds the fields of `other`, overwriting any existing entries with the same key.
    pub fn merge(&mut self, other: OrderDetails) {
        self.0.extend(other.0);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

//--------------------------------------        Order         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<PaymentReference>,
    pub status: OrderStatus,
    pub trust: PaymentTrust,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<VerifiedPayment>,
    #[serde(flatten)]
    pub details: OrderDetails,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// A new order backed by a successful gateway verification of `reference`.
    pub fn gateway_verified(
        id: OrderId,
        reference: PaymentReference,
        payment: VerifiedPayment,
        details: OrderDetails,
    ) -> Self {
        Self {
            id,
            reference: Some(reference),
            status: OrderStatus::Paid,
            trust: PaymentTrust::GatewayVerified,
            payment: Some(payment),
            details,
            created_at: Utc::now(),
        }
    }

    /// A new order whose payment was asserted by the caller. It carries no reference and no payment facts.
    pub fn client_reported(id: OrderId, details: OrderDetails) -> Self {
        Self {
            id,
            reference: None,
            status: OrderStatus::Paid,
            trust: PaymentTrust::ClientReported,
            payment: None,
            details,
            created_at: Utc::now(),
        }
    }
}

//--------------------------------------    CheckoutState     ---------------------------------------------------------
/// Where a checkout attempt is in its life cycle.
///
/// `Requested → Initialized → Verifying → {Settled | Rejected | Ambiguous}`. An ambiguous attempt may be verified
/// again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutState {
    Requested,
    Initialized,
    Verifying,
    Settled,
    Rejected,
    Ambiguous,
}

impl CheckoutState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Settled | Self::Rejected)
    }
}

impl Display for CheckoutState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CheckoutState::Requested => "requested",
            CheckoutState::Initialized => "initialized",
            CheckoutState::Verifying => "verifying",
            CheckoutState::Settled => "settled",
            CheckoutState::Rejected => "rejected",
            CheckoutState::Ambiguous => "ambiguous",
        };
        f.write_str(s)
    }
}

//--------------------------------------    CheckoutAttempt   ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutAttempt {
    pub reference: PaymentReference,
    pub email: String,
    pub amount: MinorUnits,
    pub currency: String,
    pub state: CheckoutState,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------     MenuDocument     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuDocument {
    pub categories: Vec<MenuCategory>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuCategory {
    pub name: String,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub price: MinorUnits,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub available: bool,
}
