use actix_web::{
    body::{to_bytes, MessageBody},
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use checkout_engine::{checkout_objects::CheckoutOptions, traits::PaymentGateway, CheckoutFlowApi, MemoryLedger};
use log::debug;
use serde_json::Value;

use crate::{
    auth::AdminSessionGate,
    config::{AdminConfig, ServerOptions},
    server::json_config,
};

pub const ADMIN_PASSWORD: &str = "correct horse battery staple";
// DO NOT re-use this secret anywhere.
pub const JWT_SECRET: &str = "endpoint-tests-only-0123456789abcdef";
pub const PUBLIC_KEY: &str = "pk_test_storefront";

pub fn admin_gate() -> AdminSessionGate {
    AdminSessionGate::new(&AdminConfig::new(ADMIN_PASSWORD, JWT_SECRET).unwrap()).unwrap()
}

pub fn admin_token() -> String {
    admin_gate().login(ADMIN_PASSWORD).expect("Admin login should succeed")
}

pub fn checkout_api<G: PaymentGateway>(gateway: G, options: CheckoutOptions) -> CheckoutFlowApi<G, MemoryLedger> {
    CheckoutFlowApi::new(gateway, MemoryLedger::new(), options)
}

/// Registers the shared app data every route expects, then runs `req` through an app configured by `configure`.
///
/// Returns the status and the body, parsed as JSON if possible and as a string otherwise. Errors raised by
/// middleware are rendered the same way actix would render them.
pub async fn send_request<F>(req: TestRequest, configure: F) -> (StatusCode, Value)
where F: FnOnce(&mut ServiceConfig) {
    let options = ServerOptions { paystack_public_key: PUBLIC_KEY.to_string(), ..Default::default() };
    let app = App::new()
        .app_data(web::Data::new(admin_gate()))
        .app_data(web::Data::new(options))
        .app_data(json_config())
        .configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let (status, bytes) = match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => {
            let status = res.status();
            (status, to_bytes(res.into_body()).await.unwrap())
        },
        Err(e) => {
            let res = e.error_response();
            let status = res.status();
            (status, res.into_body().try_into_bytes().unwrap())
        },
    };
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}

