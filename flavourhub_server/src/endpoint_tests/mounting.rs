use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use checkout_engine::{
    checkout_objects::CheckoutOptions,
    db_types::{MenuCategory, MenuDocument, MenuItem, MinorUnits},
    MemoryLedger,
    MemoryMenuStore,
    MenuApi,
};
use chrono::Utc;
use serde_json::json;

use super::{
    helpers::{checkout_api, send_request, ADMIN_PASSWORD},
    mocks::{accepting_gateway, MockGateway},
};
use crate::server::configure_routes;

fn sample_menu() -> MenuDocument {
    let item = MenuItem {
        id: "mains-jollof".into(),
        name: "Jollof Rice".into(),
        price: MinorUnits::from(4500),
        description: None,
        image: None,
        available: true,
    };
    MenuDocument { categories: vec![MenuCategory { name: "Mains".into(), items: vec![item] }], updated_at: Utc::now() }
}

/// The same layout as the running server: every route under `/api`, and again at the root.
fn configure_server() -> impl FnOnce(&mut ServiceConfig) {
    let checkout = web::Data::new(checkout_api(accepting_gateway(), CheckoutOptions::default()));
    let menu = web::Data::new(MenuApi::new(MemoryMenuStore::with_menu(sample_menu())));
    move |cfg| {
        cfg.app_data(checkout)
            .app_data(menu)
            .service(web::scope("/api").configure(configure_routes::<MockGateway, MemoryLedger, MemoryMenuStore>))
            .configure(configure_routes::<MockGateway, MemoryLedger, MemoryMenuStore>);
    }
}

#[actix_web::test]
async fn routes_answer_under_api_and_at_the_root() {
    let _ = env_logger::try_init().ok();
    for prefix in ["/api", ""] {
        let req = TestRequest::post()
            .uri(&format!("{prefix}/payments/initialize"))
            .set_json(json!({"email": "a@b.com", "amount": 500}));
        let (status, body) = send_request(req, configure_server()).await;
        assert_eq!(status, StatusCode::OK, "{prefix}: {body}");
        assert!(body["reference"].as_str().unwrap().starts_with("FH_"));

        let req = TestRequest::post()
            .uri(&format!("{prefix}/paystack/initialize"))
            .set_json(json!({"email": "a@b.com", "amount": 500}));
        let (status, body) = send_request(req, configure_server()).await;
        assert_eq!(status, StatusCode::OK, "{prefix}: {body}");

        let req = TestRequest::get().uri(&format!("{prefix}/orders/admin"));
        let (status, body) = send_request(req, configure_server()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{prefix}: {body}");

        let req = TestRequest::post().uri(&format!("{prefix}/admin/login")).set_json(json!({"password": ADMIN_PASSWORD}));
        let (status, body) = send_request(req, configure_server()).await;
        assert_eq!(status, StatusCode::OK, "{prefix}: {body}");
        assert!(body["token"].as_str().is_some());

        let req = TestRequest::get().uri(&format!("{prefix}/menu"));
        let (status, body) = send_request(req, configure_server()).await;
        assert_eq!(status, StatusCode::OK, "{prefix}: {body}");
        assert_eq!(body["categories"][0]["items"][0]["name"], "Jollof Rice");

        let req = TestRequest::get().uri(&format!("{prefix}/health"));
        let (status, _) = send_request(req, configure_server()).await;
        assert_eq!(status, StatusCode::OK, "{prefix}");
    }
    let (status, body) = send_request(TestRequest::get().uri("/"), configure_server()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
}

#[actix_web::test]
async fn unknown_prefixes_are_not_routed() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/v2/payments/initialize").set_json(json!({"email": "a@b.com", "amount": 500}));
    let (status, _) = send_request(req, configure_server()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
