use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::PaystackConfig,
    data_objects::{InitializeTransactionRequest, PaystackEnvelope, TransactionAuthorization, TransactionRecord},
    PaystackApiError,
};

#[derive(Clone)]
pub struct PaystackApi {
    config: PaystackConfig,
    client: Arc<Client>,
}

impl PaystackApi {
    /// Builds a client that carries the secret key as a bearer credential on every request.
    ///
    /// Fails with [`PaystackApiError::MissingSecretKey`] if no key is configured, so a client without credentials
    /// can never make a network call.
    pub fn new(config: PaystackConfig) -> Result<Self, PaystackApiError> {
        if config.secret_key.is_empty() {
            return Err(PaystackApiError::MissingSecretKey);
        }
        let mut headers = HeaderMap::with_capacity(2);
        let bearer = format!("Bearer {}", config.secret_key.reveal());
        let mut val = HeaderValue::from_str(&bearer).map_err(|e| PaystackApiError::Initialization(e.to_string()))?;
        val.set_sensitive(true);
        headers.insert(AUTHORIZATION, val);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaystackApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn public_key(&self) -> &str {
        self.config.public_key.as_str()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    /// Sends a single request and unwraps the Paystack envelope. There are no retries.
    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, PaystackApiError> {
        let url = self.url(path);
        trace!("💳️ Sending REST query: {method} {url}");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| PaystackApiError::Transport(e.to_string()))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| PaystackApiError::Transport(e.to_string()))?;
        if !status.is_success() {
            let message = serde_json::from_str::<PaystackEnvelope<serde_json::Value>>(&text)
                .map(|e| e.message)
                .unwrap_or(text);
            debug!("💳️ Paystack returned {status}. {message}");
            return Err(PaystackApiError::QueryError { status: status.as_u16(), message });
        }
        trace!("💳️ REST query successful. {status}");
        let envelope = serde_json::from_str::<PaystackEnvelope<T>>(&text)
            .map_err(|e| PaystackApiError::JsonError(e.to_string()))?;
        match envelope {
            PaystackEnvelope { status: true, data: Some(data), .. } => Ok(data),
            PaystackEnvelope { status: true, data: None, .. } => {
                Err(PaystackApiError::JsonError("Paystack response did not contain any data".to_string()))
            },
            PaystackEnvelope { status: false, message, .. } => Err(PaystackApiError::Declined(message)),
        }
    }

    pub async fn initialize_transaction(
        &self,
        request: &InitializeTransactionRequest,
    ) -> Result<TransactionAuthorization, PaystackApiError> {
        debug!("💳️ Initializing transaction {} for {}", request.reference, request.amount);
        let result = self
            .rest_query::<TransactionAuthorization, _>(Method::POST, "/transaction/initialize", Some(request))
            .await?;
        info!("💳️ Transaction {} initialized", result.reference);
        Ok(result)
    }

    pub async fn verify_transaction(&self, reference: &str) -> Result<TransactionRecord, PaystackApiError> {
        let path = verify_path(reference);
        debug!("💳️ Verifying transaction {reference}");
        let result = self.rest_query::<TransactionRecord, ()>(Method::GET, &path, None).await?;
        info!("💳️ Transaction {reference} has status {}", result.status.as_deref().unwrap_or("<none>"));
        Ok(result)
    }
}

fn verify_path(reference: &str) -> String {
    format!("/transaction/verify/{}", urlencoding::encode(reference))
}
