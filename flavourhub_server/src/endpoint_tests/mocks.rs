use checkout_engine::{
    db_types::PaymentReference,
    traits::{GatewayError, GatewayVerification, InitializeTransaction, InitializedTransaction, PaymentGateway},
};
use mockall::mock;

mock! {
    pub Gateway {}
    impl PaymentGateway for Gateway {
        async fn initialize(&self, request: &InitializeTransaction) -> Result<InitializedTransaction, GatewayError>;
        async fn verify(&self, reference: &PaymentReference) -> Result<GatewayVerification, GatewayError>;
    }
}

/// A gateway that accepts every checkout and echoes the reference back.
pub fn accepting_gateway() -> MockGateway {
    let mut gateway = MockGateway::new();
    gateway.expect_initialize().returning(|req| {
        Ok(InitializedTransaction {
            authorization_url: format!("https://checkout.paystack.com/{}", req.reference),
            access_code: "ac_test_123".to_string(),
            reference: req.reference.clone(),
        })
    });
    gateway
}
