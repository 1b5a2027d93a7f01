use actix_web::{http::StatusCode, test::TestRequest, web::ServiceConfig};
use serde_json::json;

use super::helpers::{admin_gate, send_request, ADMIN_PASSWORD};
use crate::routes::AdminLoginRoute;

fn configure(cfg: &mut ServiceConfig) {
    cfg.service(AdminLoginRoute::new());
}

async fn login(body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    send_request(TestRequest::post().uri("/admin/login").set_json(body), configure).await
}

#[actix_web::test]
async fn login_with_correct_password() {
    let _ = env_logger::try_init().ok();
    let (status, body) = login(json!({"password": ADMIN_PASSWORD})).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let token = body["token"].as_str().expect("A token in the response");
    let claims = admin_gate().authorize(token).expect("The issued token should be valid");
    assert_eq!(claims.role, "admin");
}

#[actix_web::test]
async fn login_with_wrong_password() {
    let _ = env_logger::try_init().ok();
    for body in [json!({"password": "hunter2"}), json!({"password": ""}), json!({})] {
        let (status, res) = login(body.clone()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{body}");
        assert_eq!(res, json!({"error": "Unauthorized."}));
    }
}

#[actix_web::test]
async fn login_without_body() {
    let _ = env_logger::try_init().ok();
    let (status, res) = send_request(TestRequest::post().uri("/admin/login"), configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(res["error"].as_str().is_some());
}
