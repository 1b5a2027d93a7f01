//! Plugs the Paystack REST client into the checkout engine as a [`PaymentGateway`].
use checkout_engine::{
    db_types::{MinorUnits, PaymentReference},
    traits::{
        GatewayError,
        GatewayStatus,
        GatewayVerification,
        InitializeTransaction,
        InitializedTransaction,
        PaymentGateway,
    },
};
use log::*;
use paystack_tools::{InitializeTransactionRequest, PaystackApi, PaystackApiError, PaystackConfig, TransactionRecord};
use serde_json::Value;

#[derive(Clone)]
pub struct PaystackGateway {
    api: Option<PaystackApi>,
}

impl PaystackGateway {
    /// If the configuration has no secret key, the gateway is still created, but every call fails with
    /// [`GatewayError::Configuration`] without touching the network.
    pub fn new(config: PaystackConfig) -> Self {
        match PaystackApi::new(config) {
            Ok(api) => Self { api: Some(api) },
            Err(e) => {
                error!("💳️ Paystack is not available. Payments will fail until this is fixed. {e}");
                Self { api: None }
            },
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api.is_some()
    }

    fn api(&self) -> Result<&PaystackApi, GatewayError> {
        self.api.as_ref().ok_or_else(|| GatewayError::Configuration("No Paystack secret key is configured.".into()))
    }
}

impl PaymentGateway for PaystackGateway {
    async fn initialize(&self, request: &InitializeTransaction) -> Result<InitializedTransaction, GatewayError> {
        let api = self.api()?;
        let paystack_request = InitializeTransactionRequest {
            email: request.email.clone(),
            amount: request.amount.value(),
            currency: request.currency.clone(),
            reference: request.reference.to_string(),
            metadata: request.metadata.clone(),
        };
        let auth = api.initialize_transaction(&paystack_request).await.map_err(to_gateway_error)?;
        if auth.reference != request.reference.as_str() {
            warn!("💳️ Paystack initialized {} but we asked for {}", auth.reference, request.reference);
        }
        Ok(InitializedTransaction {
            authorization_url: auth.authorization_url,
            access_code: auth.access_code,
            reference: request.reference.clone(),
        })
    }

    async fn verify(&self, reference: &PaymentReference) -> Result<GatewayVerification, GatewayError> {
        let api = self.api()?;
        let record = api.verify_transaction(reference.as_str()).await.map_err(to_gateway_error)?;
        verification_from_record(reference, record)
    }
}

pub fn to_gateway_error(e: PaystackApiError) -> GatewayError {
    match e {
        PaystackApiError::MissingSecretKey | PaystackApiError::Initialization(_) => {
            GatewayError::Configuration(e.to_string())
        },
        e if e.is_rejection() => {
            GatewayError::Rejected(e.gateway_message().map(str::to_string).unwrap_or_else(|| e.to_string()))
        },
        e => GatewayError::Unavailable(e.to_string()),
    }
}

pub fn verification_from_record(
    reference: &PaymentReference,
    record: TransactionRecord,
) -> Result<GatewayVerification, GatewayError> {
    if let Some(r) = record.reference.as_deref() {
        if r != reference.as_str() {
            return Err(GatewayError::Unavailable(format!(
                "Paystack answered for transaction {r} when asked about {reference}"
            )));
        }
    }
    let status = GatewayStatus::from_label(record.status.as_deref());
    Ok(GatewayVerification {
        status,
        raw_status: record.status,
        amount: record.amount.map(MinorUnits::from),
        currency: record.currency.map(|c| c.to_ascii_uppercase()),
        paid_at: record.paid_at,
        channel: record.channel,
        metadata: normalize_metadata(record.metadata),
    })
}

/// Paystack hands metadata back as an object, as a JSON-encoded string, or as an empty string or `0` when there is
/// none.
pub fn normalize_metadata(metadata: Value) -> Value {
    match metadata {
        Value::Object(_) => metadata,
        Value::String(s) => match serde_json::from_str::<Value>(&s) {
            Ok(v @ Value::Object(_)) => v,
            _ => Value::Null,
        },
        _ => Value::Null,
    }
}
