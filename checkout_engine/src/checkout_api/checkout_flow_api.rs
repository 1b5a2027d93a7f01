use std::{collections::HashMap, fmt::Debug, sync::Arc};

use chrono::Utc;
use fh_common::is_currency_code;
use log::*;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    checkout_api::{
        checkout_objects::{
            AmbiguityCause,
            CheckoutOptions,
            InitializedCheckout,
            NewCheckout,
            OrderSubmission,
            PaymentEvidence,
            RejectionReason,
            VerificationOutcome,
        },
        errors::CheckoutError,
    },
    db_types::{CheckoutAttempt, CheckoutState, Order, OrderDetails, PaymentReference, VerifiedPayment},
    helpers::ReferenceGenerator,
    traits::{GatewayStatus, GatewayVerification, InitializeTransaction, OrderLedger, PaymentGateway},
};

/// `CheckoutFlowApi` reconciles storefront checkouts with gateway transactions.
///
/// A checkout attempt moves through `Requested → Initialized → Verifying → {Settled | Rejected | Ambiguous}`. Only a
/// verification that the gateway reports as `success` ever results in a gateway-verified order being written to the
/// ledger, and writing is keyed on the payment reference, so a reference can settle at most once no matter how often,
/// or how concurrently, it is verified.
///
/// Clones share the gateway, the ledger and the attempt registry.
pub struct CheckoutFlowApi<G, L> {
    gateway: Arc<G>,
    ledger: L,
    options: CheckoutOptions,
    generator: ReferenceGenerator,
    attempts: Arc<Mutex<HashMap<PaymentReference, CheckoutAttempt>>>,
}

impl<G, L: Clone> Clone for CheckoutFlowApi<G, L> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            ledger: self.ledger.clone(),
            options: self.options.clone(),
            generator: self.generator.clone(),
            attempts: Arc::clone(&self.attempts),
        }
    }
}

impl<G, L> Debug for CheckoutFlowApi<G, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CheckoutFlowApi")
    }
}

impl<G, L> CheckoutFlowApi<G, L> {
    pub fn new(gateway: G, ledger: L, options: CheckoutOptions) -> Self {
        let generator = ReferenceGenerator::new(&options.reference_prefix);
        Self::with_generator(gateway, ledger, options, generator)
    }

    pub fn with_generator(gateway: G, ledger: L, options: CheckoutOptions, generator: ReferenceGenerator) -> Self {
        Self { gateway: Arc::new(gateway), ledger, options, generator, attempts: Arc::new(Mutex::new(HashMap::new())) }
    }

    pub fn options(&self) -> &CheckoutOptions {
        &self.options
    }

    pub fn gateway(&self) -> &G {
        self.gateway.as_ref()
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Moves the attempt for `reference` to `state`. Settled and rejected attempts keep their state.
    async fn set_state(&self, reference: &PaymentReference, state: CheckoutState) -> Option<CheckoutAttempt> {
        let mut attempts = self.attempts.lock().await;
        attempts.get_mut(reference).map(|attempt| {
            if attempt.state.is_terminal() {
                trace!("🔄️ {reference} is already {}. Ignoring the move to {state}", attempt.state);
            } else {
                trace!("🔄️ {reference}: {} → {state}", attempt.state);
                attempt.state = state;
                attempt.updated_at = Utc::now();
            }
            attempt.clone()
        })
    }

    /// Registers a new attempt, forgetting the least recently touched ones if the registry is full.
    async fn track(&self, attempt: CheckoutAttempt) {
        let mut attempts = self.attempts.lock().await;
        let capacity = self.options.max_tracked_attempts.max(1);
        while attempts.len() >= capacity {
            let stalest = attempts.values().min_by_key(|a| a.updated_at).map(|a| a.reference.clone());
            match stalest {
                Some(reference) => {
                    debug!("🔄️ Attempt registry is full. Forgetting {reference}");
                    attempts.remove(&reference);
                },
                None => break,
            }
        }
        attempts.insert(attempt.reference.clone(), attempt);
    }

    /// Number of checkout attempts currently remembered.
    pub async fn tracked_attempts(&self) -> usize {
        self.attempts.lock().await.len()
    }

    fn validate(&self, checkout: &NewCheckout) -> Result<String, CheckoutError> {
        let email = checkout.email.trim();
        if email.is_empty() {
            return Err(CheckoutError::Validation("Email is required.".to_string()));
        }
        if !email.contains('@') {
            return Err(CheckoutError::Validation(format!("'{email}' is not a valid email address.")));
        }
        if checkout.amount < self.options.minimum_amount {
            return Err(CheckoutError::Validation(format!(
                "Amount must be at least {} minor units, but was {}.",
                self.options.minimum_amount.value(),
                checkout.amount.value()
            )));
        }
        let currency = match checkout.currency.as_deref().map(str::trim) {
            None | Some("") => self.options.default_currency.clone(),
            Some(c) if is_currency_code(c) => c.to_ascii_uppercase(),
            Some(c) => return Err(CheckoutError::Validation(format!("'{c}' is not a valid currency code."))),
        };
        Ok(currency)
    }
}

impl<G, L> CheckoutFlowApi<G, L>
where
    G: PaymentGateway,
    L: OrderLedger,
{
    /// Starts a checkout.
    ///
    /// The request is validated and a reference generated before the gateway is contacted; if either step fails, no
    /// remote call is made. No order is created here.
    pub async fn initialize_payment(&self, checkout: NewCheckout) -> Result<InitializedCheckout, CheckoutError> {
        let currency = self.validate(&checkout)?;
        let reference = self.generator.generate().map_err(|e| {
            error!("🔄️ Could not generate a payment reference. {e}");
            e
        })?;
        let email = checkout.email.trim().to_string();
        let attempt = CheckoutAttempt {
            reference: reference.clone(),
            email: email.clone(),
            amount: checkout.amount,
            currency: currency.clone(),
            state: CheckoutState::Requested,
            updated_at: Utc::now(),
        };
        self.track(attempt).await;
        let metadata = with_email(checkout.metadata, &email);
        let request =
            InitializeTransaction { email, amount: checkout.amount, currency, reference: reference.clone(), metadata };
        debug!("🔄️ Initializing checkout {reference} for {} {}", request.amount, request.currency);
        let result = self.gateway.initialize(&request).await;
        match result {
            Ok(tx) => {
                self.set_state(&reference, CheckoutState::Initialized).await;
                info!("🔄️ Checkout {reference} initialized");
                Ok(InitializedCheckout { reference, authorization_url: tx.authorization_url, access_code: tx.access_code })
            },
            Err(e) => {
                // Nothing happened remotely that we could verify later, so the attempt is dropped.
                self.attempts.lock().await.remove(&reference);
                warn!("🔄️ Checkout {reference} could not be initialized. {e}");
                Err(e.into())
            },
        }
    }

    /// Asks the gateway whether the payment for `reference` went through and records the order if it did.
    ///
    /// Gateway failures do not produce an `Err`; they are reported as [`VerificationOutcome::Ambiguous`] so that the
    /// caller can retry.
    pub async fn verify_payment(&self, reference: &PaymentReference) -> Result<VerificationOutcome, CheckoutError> {
        self.settle(reference, OrderDetails::default()).await
    }

    async fn settle(
        &self,
        reference: &PaymentReference,
        extra_details: OrderDetails,
    ) -> Result<VerificationOutcome, CheckoutError> {
        if reference.is_empty() {
            return Err(CheckoutError::Validation("Reference is required.".to_string()));
        }
        if let Some(order) = self.order_for_reference(reference).await? {
            debug!("🔄️ {reference} already settled as order {}", order.id);
            return Ok(settled(order, false));
        }
        let attempt = self.set_state(reference, CheckoutState::Verifying).await;
        if attempt.is_none() {
            debug!("🔄️ {reference} was not initialized by this process. Relying on the gateway alone.");
        }
        // No locks are held during the remote call
        let verification = match self.gateway.verify(reference).await {
            Ok(v) => v,
            Err(e) => {
                warn!("🔄️ Could not verify {reference}. {e}");
                let outcome = VerificationOutcome::Ambiguous { reference: reference.clone(), cause: AmbiguityCause::Gateway(e) };
                return self.conclude(reference, outcome).await;
            },
        };
        let outcome = match verification.status {
            GatewayStatus::Success => {
                self.on_success(reference, attempt.as_ref(), verification, extra_details).await?
            },
            GatewayStatus::Failed | GatewayStatus::Abandoned => {
                info!("🔄️ Payment {reference} was not completed: {}", verification.status);
                VerificationOutcome::Rejected {
                    reference: reference.clone(),
                    reason: RejectionReason::Status(verification.status),
                    verification,
                }
            },
            GatewayStatus::Unknown => {
                info!("🔄️ Payment {reference} has an unrecognised status: {:?}", verification.raw_status);
                VerificationOutcome::Ambiguous {
                    reference: reference.clone(),
                    cause: AmbiguityCause::UnrecognisedStatus(verification.raw_status),
                }
            },
        };
        self.conclude(reference, outcome).await
    }

    /// Records the end of a verification.
    ///
    /// A concurrent verification of the same reference may have settled it while this one was waiting on the gateway,
    /// so an ambiguous result defers to the ledger. Settled attempts are forgotten, since the ledger now answers for
    /// them.
    async fn conclude(
        &self,
        reference: &PaymentReference,
        outcome: VerificationOutcome,
    ) -> Result<VerificationOutcome, CheckoutError> {
        let settled_elsewhere = match &outcome {
            VerificationOutcome::Ambiguous { .. } => self.order_for_reference(reference).await?,
            _ => None,
        };
        let outcome = match settled_elsewhere {
            Some(order) => {
                debug!("🔄️ {reference} was settled by another verification as order {}", order.id);
                settled(order, false)
            },
            None => outcome,
        };
        match &outcome {
            VerificationOutcome::Settled { .. } => {
                self.attempts.lock().await.remove(reference);
            },
            VerificationOutcome::Rejected { .. } => {
                self.set_state(reference, CheckoutState::Rejected).await;
            },
            VerificationOutcome::Ambiguous { .. } => {
                self.set_state(reference, CheckoutState::Ambiguous).await;
            },
        }
        Ok(outcome)
    }

    async fn on_success(
        &self,
        reference: &PaymentReference,
        attempt: Option<&CheckoutAttempt>,
        verification: GatewayVerification,
        extra_details: OrderDetails,
    ) -> Result<VerificationOutcome, CheckoutError> {
        let (amount, currency) = match (verification.amount, verification.currency.clone()) {
            (Some(a), Some(c)) => (a, c.to_ascii_uppercase()),
            _ => {
                warn!("🔄️ Gateway reported success for {reference} without an amount or currency");
                let cause = AmbiguityCause::IncompletePayload;
                return Ok(VerificationOutcome::Ambiguous { reference: reference.clone(), cause });
            },
        };
        if let Some(attempt) = attempt {
            if amount < attempt.amount || currency != attempt.currency {
                error!(
                    "🔄️ Payment {reference} settled for {amount} {currency}, but the checkout was for {} {}",
                    attempt.amount, attempt.currency
                );
                let reason = RejectionReason::AmountMismatch {
                    expected: attempt.amount,
                    expected_currency: attempt.currency.clone(),
                    actual: amount,
                    actual_currency: currency,
                };
                return Ok(VerificationOutcome::Rejected { reference: reference.clone(), reason, verification });
            }
        }
        let payment =
            VerifiedPayment { amount, currency, paid_at: verification.paid_at, channel: verification.channel.clone() };
        let mut details = OrderDetails::from_value(verification.metadata);
        details.merge(extra_details);
        let id = self.generator.generate_order_id()?;
        let order = Order::gateway_verified(id, reference.clone(), payment, details);
        let (order, created) = self.ledger.insert_if_absent(order).await?;
        if created {
            info!("🔄️💰️ Payment {reference} settled. Order {} recorded", order.id);
        } else {
            debug!("🔄️💰️ Payment {reference} settled concurrently. Order {} was already recorded", order.id);
        }
        Ok(settled(order, created))
    }

    /// Records an order submitted directly by the storefront.
    ///
    /// With [`PaymentEvidence::GatewayReference`] the reference is verified first, and an existing order for it is
    /// returned rather than duplicated. [`PaymentEvidence::ClientReported`] is refused unless
    /// [`CheckoutOptions::accept_client_reported_payments`] is set.
    pub async fn submit_order(&self, submission: OrderSubmission) -> Result<Order, CheckoutError> {
        let OrderSubmission { evidence, details } = submission;
        match evidence {
            PaymentEvidence::GatewayReference(reference) => match self.settle(&reference, details).await? {
                VerificationOutcome::Settled { order, .. } => Ok(order),
                VerificationOutcome::Rejected { reference, reason, .. } => {
                    Err(CheckoutError::PaymentNotConfirmed { reference, reason: reason.to_string() })
                },
                VerificationOutcome::Ambiguous { reference, cause } => {
                    Err(CheckoutError::PaymentUnconfirmed { reference, reason: cause.to_string() })
                },
            },
            PaymentEvidence::ClientReported if self.options.accept_client_reported_payments => {
                let id = self.generator.generate_order_id()?;
                let order = self.ledger.append(Order::client_reported(id, details)).await?;
                warn!("🔄️ Order {} recorded on the client's word alone. No gateway verification took place.", order.id);
                Ok(order)
            },
            PaymentEvidence::ClientReported => {
                info!("🔄️ Refusing an order without a payment reference");
                Err(CheckoutError::UntrustedPayment)
            },
        }
    }

    /// All recorded orders, oldest first.
    pub async fn orders(&self) -> Result<Vec<Order>, CheckoutError> {
        Ok(self.ledger.list().await?)
    }

    pub async fn order_for_reference(&self, reference: &PaymentReference) -> Result<Option<Order>, CheckoutError> {
        Ok(self.ledger.find_by_reference(reference).await?)
    }

    /// Where the checkout for `reference` stands.
    ///
    /// Settled references are answered from the ledger. Otherwise this is the last known state of an attempt this
    /// process initialized, if it is still remembered.
    pub async fn checkout_state(&self, reference: &PaymentReference) -> Result<Option<CheckoutState>, CheckoutError> {
        if self.order_for_reference(reference).await?.is_some() {
            return Ok(Some(CheckoutState::Settled));
        }
        Ok(self.attempts.lock().await.get(reference).map(|a| a.state))
    }
}

fn settled(order: Order, created: bool) -> VerificationOutcome {
    let payment = order.payment.clone().unwrap_or_else(|| VerifiedPayment {
        amount: Default::default(),
        currency: String::default(),
        paid_at: None,
        channel: None,
    });
    VerificationOutcome::Settled { order, created, payment }
}

/// Adds the customer's email to the gateway metadata, so that it ends up on the order.
fn with_email(metadata: Value, email: &str) -> Value {
    match metadata {
        Value::Object(mut map) => {
            map.entry("email").or_insert_with(|| Value::String(email.to_string()));
            Value::Object(map)
        },
        Value::Null => serde_json::json!({ "email": email }),
        other => serde_json::json!({ "email": email, "details": other }),
    }
}
