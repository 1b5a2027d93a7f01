use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use checkout_engine::{MemoryMenuStore, MenuApi};
use serde_json::{json, Value};

use super::helpers::{admin_token, send_request};
use crate::routes::{GetMenuRoute, ReplaceMenuRoute};

type Api = web::Data<MenuApi<MemoryMenuStore>>;

fn new_api() -> Api {
    web::Data::new(MenuApi::new(MemoryMenuStore::new()))
}

fn configure(api: Api) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(api)
            .service(GetMenuRoute::<MemoryMenuStore>::new())
            .service(ReplaceMenuRoute::<MemoryMenuStore>::new());
    }
}

async fn get_menu(api: Api) -> (StatusCode, Value) {
    send_request(TestRequest::get().uri("/menu"), configure(api)).await
}

async fn put_menu(api: Api, token: Option<&str>, body: Value) -> (StatusCode, Value) {
    let mut req = TestRequest::put().uri("/admin/menu").set_json(body);
    if let Some(token) = token {
        req = req.insert_header(("Authorization", format!("Bearer {token}")));
    }
    send_request(req, configure(api)).await
}

fn sample_categories() -> Value {
    json!([
        {"name": "Mains", "items": [
            {"name": "Jollof Rice", "price": 4500, "description": "Smoky party jollof"},
            {"id": "waakye", "name": "Waakye", "price": 3500, "available": false}
        ]},
        {"name": "Drinks", "items": [{"name": "Sobolo", "price": 1000}]}
    ])
}

#[actix_web::test]
async fn no_menu_yet() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_menu(new_api()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().is_some());
}

#[actix_web::test]
async fn replacing_the_menu_requires_a_session() {
    let _ = env_logger::try_init().ok();
    let api = new_api();
    let (status, body) = put_menu(api.clone(), None, json!({"categories": sample_categories()})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "Unauthorized."}));
    let (status, _) = put_menu(api.clone(), Some("abc.def.ghi"), json!({"categories": sample_categories()})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = get_menu(api).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn all_menu_shapes_are_accepted() {
    let _ = env_logger::try_init().ok();
    let token = admin_token();
    let shapes = [
        json!({"menu": {"categories": sample_categories()}}),
        json!({"categories": sample_categories()}),
        sample_categories(),
    ];
    for shape in shapes {
        let api = new_api();
        let (status, saved) = put_menu(api.clone(), Some(&token), shape.clone()).await;
        assert_eq!(status, StatusCode::OK, "{shape} gave {saved}");
        let categories = saved["categories"].as_array().unwrap();
        assert_eq!(categories.len(), 2);
        let mains = &categories[0]["items"];
        assert_eq!(mains[0]["id"], "mains-jollof-rice");
        assert_eq!(mains[0]["price"], 4500);
        assert_eq!(mains[0]["available"], true);
        assert_eq!(mains[1]["id"], "waakye");
        assert_eq!(mains[1]["available"], false);
        assert!(saved["updatedAt"].as_str().is_some());

        let (status, current) = get_menu(api).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(current, saved);
    }
}

#[actix_web::test]
async fn invalid_menus_are_refused() {
    let _ = env_logger::try_init().ok();
    let token = admin_token();
    let api = new_api();
    let (status, _) = put_menu(api.clone(), Some(&token), json!({"categories": sample_categories()})).await;
    assert_eq!(status, StatusCode::OK);
    let (_, before) = get_menu(api.clone()).await;

    let invalid = [
        json!({}),
        json!([]),
        json!({"categories": [{"name": "", "items": []}]}),
        json!([{"name": "Mains", "items": [{"name": "Jollof", "price": 45.5}]}]),
        json!([{"name": "Mains", "items": [{"name": "Jollof", "price": -1}]}]),
        json!([{"name": "Mains", "items": [{"name": "Jollof"}]}]),
        json!([{"name": "Mains", "items": [{"name": "Jollof", "price": 1}, {"name": "jollof", "price": 2}]}]),
    ];
    for body in invalid {
        let (status, res) = put_menu(api.clone(), Some(&token), body.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body} gave {res}");
    }
    let (_, after) = get_menu(api).await;
    assert_eq!(before, after);
}
