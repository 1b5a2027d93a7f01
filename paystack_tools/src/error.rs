use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaystackApiError {
    #[error("No Paystack secret key has been configured")]
    MissingSecretKey,
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Could not reach Paystack: {0}")]
    Transport(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("Paystack declined the request. {0}")]
    Declined(String),
}

impl PaystackApiError {
    /// True when the remote call completed and Paystack itself reported a failure, as opposed to the call never
    /// completing (or completing with a body we could not make sense of).
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::QueryError { .. } | Self::Declined(_))
    }

    /// The message Paystack sent back with a rejection, if there was one.
    pub fn gateway_message(&self) -> Option<&str> {
        match self {
            Self::QueryError { message, .. } => Some(message.as_str()),
            Self::Declined(message) => Some(message.as_str()),
            _ => None,
        }
    }
}
