use std::env;

use checkout_engine::checkout_objects::{CheckoutOptions, DEFAULT_MINIMUM_AMOUNT};
use chrono::Duration;
use fh_common::{is_currency_code, parse_boolean_flag, MinorUnits, Secret};
use log::*;
use paystack_tools::PaystackConfig;

use crate::errors::ServerError;

const DEFAULT_FH_HOST: &str = "127.0.0.1";
const DEFAULT_FH_PORT: u16 = 8360;
/// HS256 keys shorter than the hash output are trivially weaker, so they are refused outright.
pub const MIN_JWT_SECRET_LENGTH: usize = 32;
pub const DEFAULT_ADMIN_SESSION_DURATION: Duration = Duration::hours(12);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub admin: AdminConfig,
    pub paystack: PaystackConfig,
    pub checkout: CheckoutOptions,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_forwarded: bool,
}

impl ServerConfig {
    pub fn new(host: &str, port: u16, admin: AdminConfig) -> Self {
        Self {
            host: host.to_string(),
            port,
            admin,
            paystack: PaystackConfig::default(),
            checkout: CheckoutOptions::default(),
            use_x_forwarded_for: false,
            use_forwarded: false,
        }
    }

    /// Loads the configuration from the environment.
    ///
    /// Everything except the admin credentials has a usable default. Missing or weak admin credentials are an error,
    /// and the server must not start without them.
    pub fn try_from_env() -> Result<Self, ServerError> {
        let admin = AdminConfig::try_from_env()?;
        let host = env::var("FH_HOST").ok().unwrap_or_else(|| DEFAULT_FH_HOST.into());
        let port = env::var("FH_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!("🪛️ {s} is not a valid port for FH_PORT. {e} Using the default, {DEFAULT_FH_PORT}, instead.");
                    DEFAULT_FH_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_FH_PORT);
        let paystack = PaystackConfig::new_from_env_or_default();
        let checkout = checkout_options_from_env();
        let use_x_forwarded_for = parse_boolean_flag(env::var("FH_USE_X_FORWARDED_FOR").ok(), false);
        let use_forwarded = parse_boolean_flag(env::var("FH_USE_FORWARDED").ok(), false);
        Ok(Self { host, port, admin, paystack, checkout, use_x_forwarded_for, use_forwarded })
    }
}

fn checkout_options_from_env() -> CheckoutOptions {
    let defaults = CheckoutOptions::default();
    let minimum_amount = env::var("FH_MINIMUM_AMOUNT")
        .map_err(|_| debug!("🪛️ FH_MINIMUM_AMOUNT is not set. Using the default of {DEFAULT_MINIMUM_AMOUNT}."))
        .and_then(|s| {
            s.trim()
                .parse::<i64>()
                .map_err(|e| warn!("🪛️ Invalid configuration value for FH_MINIMUM_AMOUNT ({s}). {e}"))
        })
        .map(MinorUnits::from)
        .unwrap_or(defaults.minimum_amount);
    let default_currency = match env::var("FH_DEFAULT_CURRENCY") {
        Ok(s) if is_currency_code(s.trim()) => s.trim().to_ascii_uppercase(),
        Ok(s) => {
            warn!("🪛️ FH_DEFAULT_CURRENCY ({s}) is not a currency code. Using {} instead.", defaults.default_currency);
            defaults.default_currency
        },
        Err(_) => defaults.default_currency,
    };
    let reference_prefix = env::var("FH_REFERENCE_PREFIX").unwrap_or(defaults.reference_prefix);
    let accept_client_reported_payments =
        parse_boolean_flag(env::var("FH_ACCEPT_CLIENT_REPORTED_PAYMENTS").ok(), false);
    if accept_client_reported_payments {
        warn!(
            "🚨️ FH_ACCEPT_CLIENT_REPORTED_PAYMENTS is enabled. Orders without a verifiable payment reference will be \
             recorded as paid. Only do this if payments are verified somewhere else. 🚨️"
        );
    }
    CheckoutOptions {
        minimum_amount,
        default_currency,
        reference_prefix,
        accept_client_reported_payments,
        max_tracked_attempts: defaults.max_tracked_attempts,
    }
}

//-------------------------------------------------  AdminConfig  ------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AdminConfig {
    /// The shared admin password.
    pub password: Secret<String>,
    /// The HS256 key used to sign admin session tokens. At least [`MIN_JWT_SECRET_LENGTH`] bytes.
    pub jwt_secret: Secret<String>,
    pub session_duration: Duration,
}

impl AdminConfig {
    pub fn new(password: &str, jwt_secret: &str) -> Result<Self, ServerError> {
        if password.is_empty() {
            return Err(ServerError::ConfigurationError("The admin password may not be empty.".into()));
        }
        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(ServerError::ConfigurationError(format!(
                "The admin JWT secret must be at least {MIN_JWT_SECRET_LENGTH} bytes long."
            )));
        }
        Ok(Self {
            password: Secret::new(password.to_string()),
            jwt_secret: Secret::new(jwt_secret.to_string()),
            session_duration: DEFAULT_ADMIN_SESSION_DURATION,
        })
    }

    pub fn try_from_env() -> Result<Self, ServerError> {
        let password = env::var("FH_ADMIN_PASSWORD")
            .map_err(|e| ServerError::ConfigurationError(format!("{e} [FH_ADMIN_PASSWORD]")))?;
        let jwt_secret = env::var("FH_ADMIN_JWT_SECRET")
            .map_err(|e| ServerError::ConfigurationError(format!("{e} [FH_ADMIN_JWT_SECRET]")))?;
        Self::new(&password, &jwt_secret)
    }
}

//-------------------------------------------------  ServerOptions  ----------------------------------------------------
/// A subset of the server configuration that handlers need. It carries no secrets.
#[derive(Clone, Debug, Default)]
pub struct ServerOptions {
    /// The Paystack public key handed to the storefront so that it can open the payment popup.
    pub paystack_public_key: String,
    pub use_x_forwarded_for: bool,
    pub use_forwarded: bool,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            paystack_public_key: config.paystack.public_key.clone(),
            use_x_forwarded_for: config.use_x_forwarded_for,
            use_forwarded: config.use_forwarded,
        }
    }
}
