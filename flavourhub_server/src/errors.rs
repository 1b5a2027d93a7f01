use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use checkout_engine::{traits::GatewayError, CheckoutError, MenuError};
use log::*;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("{0}")]
    AuthenticationError(#[from] AuthError),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("The payment gateway declined the request. {0}")]
    GatewayRejected(String),
    #[error("The payment gateway could not be reached. Please try again.")]
    GatewayUnavailable,
    #[error("Payments are not configured on this server.")]
    GatewayMisconfigured,
    #[error("{0}")]
    PaymentNotConfirmed(String),
    #[error("{0}")]
    PaymentPending(String),
    #[error("{0}")]
    UntrustedPayment(String),
}

impl ServerError {
    /// True if repeating the exact same request later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::PaymentPending(_) | Self::GatewayUnavailable)
    }
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
                AuthError::TokenIssue(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::GatewayRejected(_) => StatusCode::BAD_REQUEST,
            Self::GatewayUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            Self::GatewayMisconfigured => StatusCode::INTERNAL_SERVER_ERROR,
            Self::PaymentNotConfirmed(_) => StatusCode::BAD_REQUEST,
            Self::PaymentPending(_) => StatusCode::CONFLICT,
            Self::UntrustedPayment(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = if self.is_retryable() {
            serde_json::json!({ "error": self.to_string(), "retryable": true })
        } else {
            serde_json::json!({ "error": self.to_string() })
        };
        HttpResponse::build(self.status_code()).insert_header(ContentType::json()).body(body.to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// Every failed login or authorization ends up here, whatever the underlying reason.
    #[error("Unauthorized.")]
    Unauthorized,
    #[error("Could not issue a session token. {0}")]
    TokenIssue(String),
}

impl From<GatewayError> for ServerError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::Configuration(msg) => {
                error!("💳️ The payment gateway is misconfigured. {msg}");
                Self::GatewayMisconfigured
            },
            GatewayError::Rejected(msg) => Self::GatewayRejected(msg),
            GatewayError::Unavailable(msg) => {
                warn!("💳️ The payment gateway is unavailable. {msg}");
                Self::GatewayUnavailable
            },
        }
    }
}

impl From<CheckoutError> for ServerError {
    fn from(e: CheckoutError) -> Self {
        match e {
            CheckoutError::Validation(msg) => Self::ValidationError(msg),
            CheckoutError::Generation(e) => Self::BackendError(e.to_string()),
            CheckoutError::Gateway(e) => e.into(),
            e @ CheckoutError::PaymentNotConfirmed { .. } => Self::PaymentNotConfirmed(e.to_string()),
            e @ CheckoutError::PaymentUnconfirmed { .. } => Self::PaymentPending(e.to_string()),
            e @ CheckoutError::UntrustedPayment => Self::UntrustedPayment(e.to_string()),
            CheckoutError::Ledger(e) => Self::BackendError(e.to_string()),
        }
    }
}

impl From<MenuError> for ServerError {
    fn from(e: MenuError) -> Self {
        match e {
            e @ MenuError::InvalidShape(_) => Self::InvalidRequestBody(e.to_string()),
            MenuError::Store(e) => Self::BackendError(e.to_string()),
        }
    }
}
