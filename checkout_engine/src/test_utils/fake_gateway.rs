use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
        Mutex,
    },
    time::Duration,
};

use log::*;
use serde_json::Value;

use crate::{
    db_types::PaymentReference,
    traits::{GatewayError, GatewayVerification, InitializeTransaction, InitializedTransaction, PaymentGateway},
};

#[derive(Default)]
struct FakeState {
    initialize_calls: AtomicUsize,
    verify_calls: AtomicUsize,
    requests: Mutex<Vec<InitializeTransaction>>,
    metadata: Mutex<HashMap<PaymentReference, Value>>,
    verifications: Mutex<HashMap<PaymentReference, GatewayVerification>>,
    initialize_error: Mutex<Option<GatewayError>>,
    verify_error: Mutex<Option<GatewayError>>,
    verify_delay: Mutex<Option<Duration>>,
}

/// A scriptable, in-process [`PaymentGateway`] that counts its calls.
///
/// Like the real thing, metadata sent on `initialize` is handed back on `verify`, unless the scripted verification
/// carries its own. Verifying a reference with no scripted result is rejected as "not found". Clones share state.
#[derive(Clone, Default)]
pub struct FakeGateway {
    state: Arc<FakeState>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initialize_calls(&self) -> usize {
        self.state.initialize_calls.load(Ordering::SeqCst)
    }

    pub fn verify_calls(&self) -> usize {
        self.state.verify_calls.load(Ordering::SeqCst)
    }

    pub fn initialize_requests(&self) -> Vec<InitializeTransaction> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn set_verification(&self, reference: &PaymentReference, verification: GatewayVerification) {
        self.state.verifications.lock().unwrap().insert(reference.clone(), verification);
    }

    /// Every subsequent `initialize` call fails with `err`.
    pub fn fail_initialize(&self, err: GatewayError) {
        *self.state.initialize_error.lock().unwrap() = Some(err);
    }

    /// Every subsequent `verify` call fails with `err`.
    pub fn fail_verify(&self, err: GatewayError) {
        *self.state.verify_error.lock().unwrap() = Some(err);
    }

    pub fn recover(&self) {
        *self.state.initialize_error.lock().unwrap() = None;
        *self.state.verify_error.lock().unwrap() = None;
    }

    /// Makes `verify` take at least `delay`, which widens the window for races between concurrent verifications.
    pub fn set_verify_delay(&self, delay: Duration) {
        *self.state.verify_delay.lock().unwrap() = Some(delay);
    }
}

impl PaymentGateway for FakeGateway {
    async fn initialize(&self, request: &InitializeTransaction) -> Result<InitializedTransaction, GatewayError> {
        self.state.initialize_calls.fetch_add(1, Ordering::SeqCst);
        self.state.requests.lock().unwrap().push(request.clone());
        if let Some(err) = self.state.initialize_error.lock().unwrap().clone() {
            return Err(err);
        }
        self.state.metadata.lock().unwrap().insert(request.reference.clone(), request.metadata.clone());
        trace!("🧪️ Fake gateway initialized {}", request.reference);
        Ok(InitializedTransaction {
            authorization_url: format!("https://checkout.example.test/{}", request.reference),
            access_code: format!("access_{}", request.reference),
            reference: request.reference.clone(),
        })
    }

    async fn verify(&self, reference: &PaymentReference) -> Result<GatewayVerification, GatewayError> {
        self.state.verify_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.state.verify_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.state.verify_error.lock().unwrap().clone() {
            return Err(err);
        }
        let scripted = self.state.verifications.lock().unwrap().get(reference).cloned();
        let mut verification =
            scripted.ok_or_else(|| GatewayError::Rejected("Transaction reference not found".to_string()))?;
        if verification.metadata.is_null() {
            if let Some(metadata) = self.state.metadata.lock().unwrap().get(reference) {
                verification.metadata = metadata.clone();
            }
        }
        Ok(verification)
    }
}
