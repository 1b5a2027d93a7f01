use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use checkout_engine::{
    checkout_objects::CheckoutOptions,
    db_types::{MinorUnits, PaymentReference},
    test_utils::successful_verification,
    traits::{GatewayError, GatewayStatus, GatewayVerification},
    CheckoutFlowApi,
    MemoryLedger,
};
use serde_json::json;

use super::{
    helpers::{checkout_api, send_request, PUBLIC_KEY},
    mocks::{accepting_gateway, MockGateway},
};
use crate::routes::{InitializePaymentRoute, VerifyPaymentRoute};

type Api = web::Data<CheckoutFlowApi<MockGateway, MemoryLedger>>;

fn configure(api: Api) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(api)
            .service(InitializePaymentRoute::<MockGateway, MemoryLedger>::new())
            .service(VerifyPaymentRoute::<MockGateway, MemoryLedger>::new());
    }
}

fn api_with(gateway: MockGateway) -> Api {
    web::Data::new(checkout_api(gateway, CheckoutOptions::default()))
}

async fn initialize(api: Api, path: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    send_request(TestRequest::post().uri(path).set_json(body), configure(api)).await
}

async fn verify(api: Api, reference: &str) -> (StatusCode, serde_json::Value) {
    let req = TestRequest::get().uri(&format!("/payments/verify/{reference}"));
    send_request(req, configure(api)).await
}

//----------------------------------------------   Initialize  ----------------------------------------------------

#[actix_web::test]
async fn initialize_payment() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockGateway::new();
    gateway
        .expect_initialize()
        .withf(|req| {
            req.email == "a@b.com" &&
                req.amount == MinorUnits::from(500) &&
                req.currency == "GHS" &&
                req.metadata["customer"]["name"] == "Ama" &&
                req.metadata["email"] == "a@b.com"
        })
        .times(1)
        .returning(|req| {
            Ok(checkout_engine::traits::InitializedTransaction {
                authorization_url: format!("https://checkout.paystack.com/{}", req.reference),
                access_code: "ac_test_123".to_string(),
                reference: req.reference.clone(),
            })
        });
    let body = json!({"email": "a@b.com", "amount": 500, "customer": {"name": "Ama"}});
    let (status, body) = initialize(api_with(gateway), "/payments/initialize", body).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["public_key"], PUBLIC_KEY);
    assert_eq!(body["access_code"], "ac_test_123");
    let reference = body["reference"].as_str().unwrap();
    assert!(reference.starts_with("FH_"), "{reference}");
    assert_eq!(body["authorization_url"], format!("https://checkout.paystack.com/{reference}"));
}

#[actix_web::test]
async fn initialize_payment_legacy_path() {
    let _ = env_logger::try_init().ok();
    let body = json!({"email": "a@b.com", "amount": 5000, "currency": "ngn"});
    let (status, body) = initialize(api_with(accepting_gateway()), "/paystack/initialize", body).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body["reference"].as_str().is_some());
}

#[actix_web::test]
async fn invalid_checkouts_never_reach_the_gateway() {
    let _ = env_logger::try_init().ok();
    let cases = [
        (json!({"email": "a@b.com", "amount": 10}), "at least 50"),
        (json!({"email": "", "amount": 500}), "Email is required"),
        (json!({"email": "not-an-email", "amount": 500}), "not a valid email"),
        (json!({"email": "a@b.com", "amount": 500.5}), "whole number"),
        (json!({"email": "a@b.com", "amount": 500, "currency": "cedis"}), "not a valid currency"),
        (json!({"email": "a@b.com"}), "Could not read request body"),
    ];
    for (body, expected) in cases {
        let mut gateway = MockGateway::new();
        gateway.expect_initialize().times(0);
        let (status, res) = initialize(api_with(gateway), "/payments/initialize", body.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        let message = res["error"].as_str().unwrap();
        assert!(message.contains(expected), "{body} gave '{message}'");
    }
}

#[actix_web::test]
async fn initialize_with_gateway_failures() {
    let _ = env_logger::try_init().ok();
    let body = json!({"email": "a@b.com", "amount": 500});

    let mut gateway = MockGateway::new();
    gateway.expect_initialize().times(1).returning(|_| Err(GatewayError::Rejected("Invalid key".into())));
    let (status, res) = initialize(api_with(gateway), "/payments/initialize", body.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(res, json!({"error": "The payment gateway declined the request. Invalid key"}));

    let mut gateway = MockGateway::new();
    gateway.expect_initialize().times(1).returning(|_| Err(GatewayError::Unavailable("connection reset".into())));
    let (status, res) = initialize(api_with(gateway), "/payments/initialize", body.clone()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res["retryable"], true);
    assert!(!res["error"].as_str().unwrap().contains("connection reset"));

    let mut gateway = MockGateway::new();
    gateway.expect_initialize().times(1).returning(|_| Err(GatewayError::Configuration("No secret key".into())));
    let (status, res) = initialize(api_with(gateway), "/payments/initialize", body).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res, json!({"error": "Payments are not configured on this server."}));
}

//----------------------------------------------   Verify  ----------------------------------------------------

#[actix_web::test]
async fn verify_successful_payment_once() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockGateway::new();
    gateway
        .expect_verify()
        .withf(|reference| reference == &PaymentReference::from("FH_123"))
        .times(1)
        .returning(|_| Ok(successful_verification(500).with_metadata(json!({"customer": {"name": "Ama"}}))));
    let api = api_with(gateway);

    let (status, first) = verify(api.clone(), "FH_123").await;
    assert_eq!(status, StatusCode::OK, "{first}");
    assert_eq!(first["paid"], true);
    assert_eq!(first["status"], "success");
    assert_eq!(first["outcome"], "settled");
    assert_eq!(first["reference"], "FH_123");
    assert_eq!(first["amount"], 500);
    assert_eq!(first["currency"], "GHS");
    assert_eq!(first["retryable"], false);
    assert_eq!(first["order"]["trust"], "gateway_verified");
    assert_eq!(first["order"]["customer"]["name"], "Ama");

    // The second call is answered from the ledger. The mock would panic on a second verify.
    let (status, second) = verify(api.clone(), "FH_123").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["order"]["id"], first["order"]["id"]);
    assert_eq!(api.orders().await.unwrap().len(), 1);
}

#[actix_web::test]
async fn verify_legacy_path() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockGateway::new();
    gateway.expect_verify().times(1).returning(|_| Ok(successful_verification(500)));
    let req = TestRequest::get().uri("/paystack/verify/FH_9");
    let (status, body) = send_request(req, configure(api_with(gateway))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["paid"], true);
}

#[actix_web::test]
async fn verify_failed_payment() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockGateway::new();
    gateway.expect_verify().times(1).returning(|_| Ok(GatewayVerification::new(GatewayStatus::Failed)));
    let api = api_with(gateway);
    let (status, body) = verify(api.clone(), "FH_123").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["paid"], false);
    assert_eq!(body["status"], "failed");
    assert_eq!(body["outcome"], "rejected");
    assert_eq!(body["retryable"], false);
    assert!(body.get("order").is_none());
    assert!(api.orders().await.unwrap().is_empty());
}

#[actix_web::test]
async fn verify_pending_payment() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockGateway::new();
    gateway.expect_verify().times(2).returning(|_| {
        let mut verification = GatewayVerification::new(GatewayStatus::Unknown);
        verification.raw_status = Some("pending".into());
        Ok(verification)
    });
    let api = api_with(gateway);
    for _ in 0..2 {
        let (status, body) = verify(api.clone(), "FH_123").await;
        assert_eq!(status, StatusCode::ACCEPTED, "{body}");
        assert_eq!(body["paid"], false);
        assert_eq!(body["status"], "pending");
        assert_eq!(body["outcome"], "ambiguous");
        assert_eq!(body["retryable"], true);
    }
    assert!(api.orders().await.unwrap().is_empty());
}

#[actix_web::test]
async fn verify_success_without_amount_is_not_settled() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockGateway::new();
    gateway.expect_verify().times(1).returning(|_| Ok(GatewayVerification::new(GatewayStatus::Success)));
    let api = api_with(gateway);
    let (status, body) = verify(api.clone(), "FH_123").await;
    assert_eq!(status, StatusCode::ACCEPTED, "{body}");
    assert_eq!(body["paid"], false);
    assert!(api.orders().await.unwrap().is_empty());
}

#[actix_web::test]
async fn verify_with_gateway_failures() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockGateway::new();
    gateway
        .expect_verify()
        .times(1)
        .returning(|_| Err(GatewayError::Rejected("Transaction reference not found".into())));
    let (status, body) = verify(api_with(gateway), "FH_404").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "The payment gateway declined the request. Transaction reference not found"}));

    let mut gateway = MockGateway::new();
    gateway.expect_verify().times(1).returning(|_| Err(GatewayError::Unavailable("timed out".into())));
    let (status, body) = verify(api_with(gateway), "FH_123").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["retryable"], true);

    let mut gateway = MockGateway::new();
    gateway.expect_verify().times(1).returning(|_| Err(GatewayError::Configuration("No secret key".into())));
    let (status, body) = verify(api_with(gateway), "FH_123").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Payments are not configured on this server."}));
    assert!(body.get("retryable").is_none());
}
