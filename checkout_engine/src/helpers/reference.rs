use chrono::Utc;
use rand::{rngs::OsRng, RngCore};
use thiserror::Error;

use crate::db_types::{OrderId, PaymentReference};

pub const DEFAULT_REFERENCE_PREFIX: &str = "FH";
const REFERENCE_ENTROPY_BYTES: usize = 8;
const ORDER_ID_ENTROPY_BYTES: usize = 4;

#[derive(Debug, Clone, Error)]
#[error("Could not generate a unique identifier. {0}")]
pub struct GenerationError(pub String);

/// Fills `buf` from the operating system's randomness source.
pub fn os_entropy(buf: &mut [u8]) -> Result<(), rand::Error> {
    OsRng.try_fill_bytes(buf)
}

/// Produces payment references and order ids.
///
/// References look like `FH_20241017101500123_9f86d081884c7d65`: prefix, UTC timestamp to the millisecond and 64
/// random bits. They only contain `[A-Za-z0-9_]`, so they can go into a URL path as-is, and the timestamp makes them
/// easy to find in gateway dashboards.
#[derive(Clone)]
pub struct ReferenceGenerator {
    prefix: String,
    entropy: fn(&mut [u8]) -> Result<(), rand::Error>,
}

impl std::fmt::Debug for ReferenceGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReferenceGenerator({})", self.prefix)
    }
}

impl Default for ReferenceGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_REFERENCE_PREFIX)
    }
}

impl ReferenceGenerator {
    /// Non-alphanumeric characters are dropped from `prefix`. An empty result falls back to
    /// [`DEFAULT_REFERENCE_PREFIX`].
    pub fn new(prefix: &str) -> Self {
        Self::with_entropy(prefix, os_entropy)
    }

    pub fn with_entropy(prefix: &str, entropy: fn(&mut [u8]) -> Result<(), rand::Error>) -> Self {
        let prefix = prefix.chars().filter(|c| c.is_ascii_alphanumeric()).collect::<String>();
        let prefix = if prefix.is_empty() { DEFAULT_REFERENCE_PREFIX.to_string() } else { prefix };
        Self { prefix, entropy }
    }

    pub fn prefix(&self) -> &str {
        self.prefix.as_str()
    }

    pub fn generate(&self) -> Result<PaymentReference, GenerationError> {
        let suffix = self.random_hex::<REFERENCE_ENTROPY_BYTES>()?;
        let stamp = Utc::now().format("%Y%m%d%H%M%S%3f");
        Ok(PaymentReference(format!("{}_{stamp}_{suffix}", self.prefix)))
    }

    pub fn generate_order_id(&self) -> Result<OrderId, GenerationError> {
        let suffix = self.random_hex::<ORDER_ID_ENTROPY_BYTES>()?;
        Ok(OrderId(format!("ORD-{}-{suffix}", Utc::now().timestamp_millis())))
    }

    fn random_hex<const N: usize>(&self) -> Result<String, GenerationError> {
        let mut buf = [0u8; N];
        (self.entropy)(&mut buf).map_err(|e| GenerationError(e.to_string()))?;
        Ok(hex::encode(buf))
    }
}
