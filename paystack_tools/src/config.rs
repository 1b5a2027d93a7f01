use std::time::Duration;

use fh_common::Secret;
use log::*;

pub const DEFAULT_PAYSTACK_BASE_URL: &str = "https://api.paystack.co";
pub const DEFAULT_PAYSTACK_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone)]
pub struct PaystackConfig {
    pub base_url: String,
    /// The `sk_test_...` or `sk_live_...` key. Sent as a bearer token on every request.
    pub secret_key: Secret<String>,
    /// The `pk_...` key. Never used for API calls, but handed to the storefront so that it can open the popup.
    pub public_key: String,
    pub timeout: Duration,
}

impl Default for PaystackConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PAYSTACK_BASE_URL.to_string(),
            secret_key: Secret::default(),
            public_key: String::default(),
            timeout: DEFAULT_PAYSTACK_TIMEOUT,
        }
    }
}

impl PaystackConfig {
    pub fn new_from_env_or_default() -> Self {
        let base_url = std::env::var("FH_PAYSTACK_BASE_URL").unwrap_or_else(|_| {
            debug!("FH_PAYSTACK_BASE_URL not set, using {DEFAULT_PAYSTACK_BASE_URL}");
            DEFAULT_PAYSTACK_BASE_URL.to_string()
        });
        let secret_key = Secret::new(std::env::var("FH_PAYSTACK_SECRET_KEY").unwrap_or_else(|_| {
            error!("FH_PAYSTACK_SECRET_KEY not set. Payment initialization and verification will fail.");
            String::default()
        }));
        let public_key = std::env::var("FH_PAYSTACK_PUBLIC_KEY").unwrap_or_else(|_| {
            warn!("FH_PAYSTACK_PUBLIC_KEY not set. The storefront will not receive a public key.");
            String::default()
        });
        let timeout = std::env::var("FH_PAYSTACK_TIMEOUT")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("Invalid value for FH_PAYSTACK_TIMEOUT ({s}). {e}"))
                    .ok()
            })
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_PAYSTACK_TIMEOUT);
        Self { base_url: base_url.trim_end_matches('/').to_string(), secret_key, public_key, timeout }
    }
}
