use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use checkout_engine::{
    checkout_objects::CheckoutOptions,
    test_utils::successful_verification,
    traits::{GatewayStatus, GatewayVerification},
    CheckoutFlowApi,
    MemoryLedger,
};
use serde_json::json;

use super::{
    helpers::{admin_token, checkout_api, send_request},
    mocks::MockGateway,
};
use crate::routes::{AdminOrdersRoute, CreateOrderRoute, VerifyPaymentRoute};

type Api = web::Data<CheckoutFlowApi<MockGateway, MemoryLedger>>;

fn configure(api: Api) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(api)
            .service(AdminOrdersRoute::<MockGateway, MemoryLedger>::new())
            .service(CreateOrderRoute::<MockGateway, MemoryLedger>::new())
            .service(VerifyPaymentRoute::<MockGateway, MemoryLedger>::new());
    }
}

async fn post_order(api: Api, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    send_request(TestRequest::post().uri("/orders").set_json(body), configure(api)).await
}

async fn admin_orders(api: Api, token: Option<&str>) -> (StatusCode, serde_json::Value) {
    let mut req = TestRequest::get().uri("/orders/admin");
    if let Some(token) = token {
        req = req.insert_header(("Authorization", format!("Bearer {token}")));
    }
    send_request(req, configure(api)).await
}

#[actix_web::test]
async fn order_with_verified_reference() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockGateway::new();
    gateway.expect_verify().times(1).returning(|_| Ok(successful_verification(1500)));
    let api = web::Data::new(checkout_api(gateway, CheckoutOptions::default()));
    let body = json!({
        "reference": "FH_42",
        "customer": {"name": "Kofi", "phone": "0240000000"},
        "items": [{"id": "mains-jollof", "qty": 3}],
        "status": "refunded"
    });
    let (status, res) = post_order(api.clone(), body.clone()).await;
    assert_eq!(status, StatusCode::OK, "{res}");
    assert_eq!(res["success"], true);
    let order = &res["order"];
    assert_eq!(order["reference"], "FH_42");
    assert_eq!(order["status"], "paid");
    assert_eq!(order["trust"], "gateway_verified");
    assert_eq!(order["payment"]["amount"], 1500);
    assert_eq!(order["items"][0]["qty"], 3);
    assert_eq!(order["customer"]["name"], "Kofi");

    // Submitting again, or verifying, returns the same order without asking the gateway again
    let (status, again) = post_order(api.clone(), body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["order"]["id"], order["id"]);
    let req = TestRequest::get().uri("/payments/verify/FH_42");
    let (status, verified) = send_request(req, configure(api.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(verified["order"]["id"], order["id"]);
    assert_eq!(api.orders().await.unwrap().len(), 1);
}

#[actix_web::test]
async fn order_with_failed_payment() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockGateway::new();
    gateway.expect_verify().times(1).returning(|_| Ok(GatewayVerification::new(GatewayStatus::Abandoned)));
    let api = web::Data::new(checkout_api(gateway, CheckoutOptions::default()));
    let (status, res) = post_order(api.clone(), json!({"reference": "FH_42", "items": []})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{res}");
    assert!(res.get("retryable").is_none());
    assert!(api.orders().await.unwrap().is_empty());
}

#[actix_web::test]
async fn order_with_pending_payment() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockGateway::new();
    gateway.expect_verify().times(1).returning(|_| {
        let mut verification = GatewayVerification::new(GatewayStatus::Unknown);
        verification.raw_status = Some("ongoing".into());
        Ok(verification)
    });
    let api = web::Data::new(checkout_api(gateway, CheckoutOptions::default()));
    let (status, res) = post_order(api.clone(), json!({"reference": "FH_42"})).await;
    assert_eq!(status, StatusCode::CONFLICT, "{res}");
    assert_eq!(res["retryable"], true);
    assert!(api.orders().await.unwrap().is_empty());
}

#[actix_web::test]
async fn orders_without_reference_are_refused_by_default() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockGateway::new();
    gateway.expect_verify().times(0);
    let api = web::Data::new(checkout_api(gateway, CheckoutOptions::default()));
    for body in [json!({"items": [1]}), json!({"items": [1], "reference": ""}), json!({"reference": null})] {
        let (status, res) = post_order(api.clone(), body.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert!(res["error"].as_str().is_some());
    }
    assert!(api.orders().await.unwrap().is_empty());
}

#[actix_web::test]
async fn client_reported_orders_when_enabled() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockGateway::new();
    gateway.expect_verify().times(0);
    let options = CheckoutOptions { accept_client_reported_payments: true, ..Default::default() };
    let api = web::Data::new(checkout_api(gateway, options));
    let (status, res) = post_order(api.clone(), json!({"items": [1], "id": "ORD-forged"})).await;
    assert_eq!(status, StatusCode::OK, "{res}");
    let order = &res["order"];
    assert_eq!(order["trust"], "client_reported");
    assert_ne!(order["id"], "ORD-forged");
    assert!(order.get("payment").is_none());
    assert!(order.get("reference").is_none());
    assert_eq!(api.orders().await.unwrap().len(), 1);
}

#[actix_web::test]
async fn malformed_orders() {
    let _ = env_logger::try_init().ok();
    let api = web::Data::new(checkout_api(MockGateway::new(), CheckoutOptions::default()));
    let (status, _) = post_order(api.clone(), json!(["not", "an", "object"])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = post_order(api.clone(), json!({"reference": 42})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let req = TestRequest::post().uri("/orders").insert_header(("Content-Type", "application/json")).set_payload("{");
    let (status, res) = send_request(req, configure(api)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(res["error"].as_str().unwrap().starts_with("Could not read request body"));
}

#[actix_web::test]
async fn admin_order_list_requires_a_session() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockGateway::new();
    gateway.expect_verify().times(1).returning(|_| Ok(successful_verification(500)));
    let api = web::Data::new(checkout_api(gateway, CheckoutOptions::default()));
    let (status, _) = post_order(api.clone(), json!({"reference": "FH_1"})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, res) = admin_orders(api.clone(), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(res, json!({"error": "Unauthorized."}));

    let (status, _) = admin_orders(api.clone(), Some("not.a.token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = admin_token();
    let (status, res) = admin_orders(api.clone(), Some(&token)).await;
    assert_eq!(status, StatusCode::OK, "{res}");
    let orders = res.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["reference"], "FH_1");
}
