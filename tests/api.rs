use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use vnshop::api::{router, AppState};
use vnshop::catalog::FixtureCatalog;
use vnshop::domain::value_objects::{Money, Weight};
use vnshop::notify::EventPublisher;
use vnshop::search::SearchEngine;
use vnshop::shipping::ShippingCalculator;
use vnshop::store::AppStore;

fn app_with_threshold(threshold: i64) -> Router {
    let shipping = ShippingCalculator::new("Hồ Chí Minh", Money::vnd(threshold), Weight::grams(500)).unwrap();
    let state = AppState::new(
        Arc::new(FixtureCatalog::sample().with_admins(["a1"])),
        AppStore::in_memory(),
        SearchEngine::default(),
        shipping,
        EventPublisher::disabled(),
    )
    .with_suggestion_debounce(Duration::from_millis(50));
    router(state)
}

fn app() -> Router { app_with_threshold(500_000) }

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&v).unwrap())
        }
        None => Body::empty(),
    };
    let res = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) { send(app, Method::GET, uri, None).await }

fn ids(products: &Value) -> Vec<String> {
    products.as_array().unwrap().iter().map(|p| p["id"].as_str().unwrap().to_string()).collect()
}

fn address() -> Value {
    json!({
        "email": "lan@example.vn", "recipient": "Nguyễn Thị Lan", "phone": "0901234567",
        "street": "12 Lý Tự Trọng", "ward": "Bến Nghé", "district": "Quận 1", "province": "Hà Nội"
    })
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get(&app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data_source"], "fixture");
}

#[tokio::test]
async fn test_search_filters_and_sorts() {
    let (status, body) = get(&app(), "/api/v1/search?q=tai%20nghe&in_stock=true&sort=price_asc").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body["products"]), vec!["airpods-pro2", "wh1000xm5"]);
    assert_eq!(body["total_count"], 2);
    assert_eq!(body["total_pages"], 1);
    assert!(body.get("hints").is_none());
}

#[tokio::test]
async fn test_search_clamps_bad_pagination() {
    let (status, body) = get(&app(), "/api/v1/products?page=-3&limit=0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["filters"]["page"], 1);
    assert_eq!(body["filters"]["limit"], 12);
    assert_eq!(body["total_count"], 12);
    assert_eq!(body["products"].as_array().unwrap().len(), 12);
}

#[tokio::test]
async fn test_search_tolerates_unparseable_params() {
    let app = app();
    let (status, body) = get(&app, "/api/v1/search?page=abc&limit=1.5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["filters"]["page"], 1);
    assert_eq!(body["filters"]["limit"], 1);

    let (status, body) = get(&app, "/api/v1/search?rating=high&min_price=cheap&in_stock=1").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["filters"]["min_rating"].is_null());
    assert!(body["filters"]["price_range"].is_null());
    assert_eq!(body["filters"]["in_stock"], true);
    assert!(!ids(&body["products"]).contains(&"rog-g16".to_string()));

    let (status, body) = get(&app, "/api/v1/products?page=99999999999999999999").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["filters"]["page"], u32::MAX);
    assert!(body["products"].as_array().unwrap().is_empty());

    let (status, scored) = get(&app, "/api/v1/search/fuzzy?q=iphone&limit=many").await;
    assert_eq!(status, StatusCode::OK);
    assert!(!scored.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_search_page_past_end_is_empty() {
    let (_, body) = get(&app(), "/api/v1/search?limit=5&page=4").await;
    assert_eq!(body["total_count"], 12);
    assert_eq!(body["total_pages"], 3);
    assert!(body["products"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_search_carries_localized_hints() {
    let app = app();
    let (_, vi) = get(&app, "/api/v1/search?q=xyzzy").await;
    assert_eq!(vi["total_count"], 0);
    assert_eq!(vi["hints"][0], "Kiểm tra lại chính tả từ khóa");

    let req = Request::builder().uri("/api/v1/search?q=xyzzy").header(header::ACCEPT_LANGUAGE, "en-US").body(Body::empty()).unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let en: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(en["hints"][0], "Check the spelling of your search");
}

#[tokio::test]
async fn test_fuzzy_and_suggestions() {
    let app = app();
    let (_, scored) = get(&app, "/api/v1/search/fuzzy?q=apple%20watch").await;
    assert_eq!(scored[0]["product"]["id"], "aw-s9");

    let (_, body) = get(&app, "/api/v1/search/suggestions?q=iphone").await;
    assert_eq!(body["suggestions"][0], "iPhone 15 Pro Max");
    assert!(body["suggestions"].as_array().unwrap().len() <= 5);
    assert!(body.get("superseded").is_none());
}

#[tokio::test]
async fn test_suggestions_answer_only_the_latest_keystroke() {
    let app = app();
    let first = {
        let app = app.clone();
        tokio::spawn(async move { get(&app, "/api/v1/search/suggestions?q=ip&session=typing").await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    let (status, latest) = get(&app, "/api/v1/search/suggestions?q=iphone&session=typing").await;
    let (_, dropped) = first.await.unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(latest["superseded"], false);
    assert_eq!(latest["suggestions"][0], "iPhone 15 Pro Max");
    assert_eq!(dropped["superseded"], true);
    assert!(dropped["suggestions"].as_array().unwrap().is_empty());

    // Other sessions are not affected.
    let (_, other) = get(&app, "/api/v1/search/suggestions?q=ip&session=other").await;
    assert_eq!(other["superseded"], false);

    let (status, _) = get(&app, "/api/v1/search/suggestions?q=ip&session=bad$id").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_product_and_categories() {
    let app = app();
    let (status, body) = get(&app, "/api/v1/products/mba-m3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["brand"], "Apple");

    let (status, body) = get(&app, "/api/v1/products/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "product_not_found");
    assert_eq!(body["message"], "Không tìm thấy sản phẩm");
    assert_eq!(body["message_en"], "Product not found");

    let (_, cats) = get(&app, "/api/v1/categories").await;
    assert_eq!(cats[0]["icon"], "phone");
    assert_eq!(cats[0]["icon_name"], "smartphone");
}

#[tokio::test]
async fn test_cart_flow() {
    let app = app();
    let (status, cart) = send(&app, Method::POST, "/api/v1/cart/s1", Some(json!({"product_id": "anker-10k", "quantity": 2}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(cart["item_count"], 2);
    assert_eq!(cart["free_shipping"], true);

    send(&app, Method::POST, "/api/v1/cart/s1", Some(json!({"product_id": "anker-10k"}))).await;
    let (_, cart) = get(&app, "/api/v1/cart/s1").await;
    assert_eq!(cart["line_count"], 1);
    assert_eq!(cart["item_count"], 3);

    let (_, cart) = send(&app, Method::PUT, "/api/v1/cart/s1/items/anker-10k", Some(json!({"quantity": 0}))).await;
    assert_eq!(cart["line_count"], 0);

    let (status, body) = send(&app, Method::DELETE, "/api/v1/cart/s1/items/anker-10k", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "cart_item_not_found");

    let (status, _) = send(&app, Method::DELETE, "/api/v1/cart/s1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_cart_rejects_bad_input() {
    let app = app();
    let (status, body) = send(&app, Method::POST, "/api/v1/cart/s1", Some(json!({"product_id": "nope"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "product_not_found");

    let (status, body) = send(&app, Method::POST, "/api/v1/cart/s1", Some(json!({"product_id": "anker-10k", "quantity": 0}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "invalid_input");

    let (status, body) = send(&app, Method::POST, "/api/v1/cart/s1", Some(json!({"quantity": "lots"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "invalid_input");

    let (status, _) = get(&app, "/api/v1/cart/bad$id").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cart_respects_stock_and_line_cap() {
    let app = app();
    let (status, body) = send(&app, Method::POST, "/api/v1/cart/s1", Some(json!({"product_id": "rog-g16"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "out_of_stock");
    assert_eq!(body["message_en"], "Not enough stock for this item");

    // aw-s9 has 3 units left
    let (status, _) = send(&app, Method::POST, "/api/v1/cart/s1", Some(json!({"product_id": "aw-s9", "quantity": 2}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = send(&app, Method::POST, "/api/v1/cart/s1", Some(json!({"product_id": "aw-s9", "quantity": 2}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "out_of_stock");
    let (status, _) = send(&app, Method::PUT, "/api/v1/cart/s1/items/aw-s9", Some(json!({"quantity": 4}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (_, cart) = send(&app, Method::PUT, "/api/v1/cart/s1/items/aw-s9", Some(json!({"quantity": 3}))).await;
    assert_eq!(cart["item_count"], 3);

    let (status, _) = send(&app, Method::POST, "/api/v1/cart/s1", Some(json!({"product_id": "anker-10k", "quantity": 99}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = send(&app, Method::POST, "/api/v1/cart/s1", Some(json!({"product_id": "anker-10k"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "invalid_quantity");
    let (_, cart) = get(&app, "/api/v1/cart/s1").await;
    assert_eq!(cart["item_count"], 102);
}

#[tokio::test]
async fn test_shipping_quotes() {
    let app = app_with_threshold(50_000_000);
    send(&app, Method::POST, "/api/v1/cart/s1", Some(json!({"product_id": "anker-10k"}))).await;

    let (status, opts) = send(&app, Method::POST, "/api/v1/shipping/s1/quotes", Some(json!({"province": "Hà Nội", "district": "Ba Đình"}))).await;
    assert_eq!(status, StatusCode::OK);
    let carriers: Vec<&str> = opts["quotes"].as_array().unwrap().iter().map(|q| q["carrier"].as_str().unwrap()).collect();
    assert_eq!(carriers, vec!["SHOP", "VNPOST", "GHTK", "GHN"]);
    assert_eq!(opts["free_shipping"], false);

    let (_, opts) = send(&app, Method::POST, "/api/v1/shipping/s1/quotes", Some(json!({"province": "Hà Nội", "district": ""}))).await;
    assert!(opts["quotes"].as_array().unwrap().is_empty());

    let (status, body) = send(&app, Method::POST, "/api/v1/shipping/s1/quotes", Some(json!({"province": "Atlantis", "district": "X"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "unknown_destination");
}

#[tokio::test]
async fn test_checkout_places_confirmed_order() {
    let app = app();
    send(&app, Method::POST, "/api/v1/cart/s1", Some(json!({"product_id": "anker-10k"}))).await;

    let mut req = address();
    req["carrier"] = json!("GHTK");
    let (status, order) = send(&app, Method::POST, "/api/v1/checkout/s1", Some(req)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["status"], "confirmed");
    assert_eq!(order["carrier"], "GHTK");
    assert!(order["tracking_number"].as_str().unwrap().starts_with("GHTK"));
    assert!(order["order_number"].as_str().unwrap().starts_with("VN"));
    assert_eq!(order["shipping_fee"]["amount"], "0");
    assert_ne!(order["shipping_quoted"]["amount"], "0");

    let (_, cart) = get(&app, "/api/v1/cart/s1").await;
    assert_eq!(cart["line_count"], 0);
    let (_, orders) = get(&app, "/api/v1/orders/s1").await;
    assert_eq!(orders.as_array().unwrap().len(), 1);
    let (_, other) = get(&app, "/api/v1/orders/s2").await;
    assert!(other.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_checkout_validation() {
    let app = app();
    let (status, body) = send(&app, Method::POST, "/api/v1/checkout/s1", Some(address())).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "empty_cart");

    send(&app, Method::POST, "/api/v1/cart/s1", Some(json!({"product_id": "anker-10k"}))).await;
    let mut bad = address();
    bad["email"] = json!("not-an-email");
    let (status, body) = send(&app, Method::POST, "/api/v1/checkout/s1", Some(bad)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "invalid_input");

    let mut no_email = address();
    no_email.as_object_mut().unwrap().remove("email");
    let (status, _) = send(&app, Method::POST, "/api/v1/checkout/s1", Some(no_email.clone())).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    send(&app, Method::PUT, "/api/v1/session/s1", Some(json!({"user_id": "u1", "email": "lan@example.vn"}))).await;
    let (status, order) = send(&app, Method::POST, "/api/v1/checkout/s1", Some(no_email)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["email"], "lan@example.vn");
}

#[tokio::test]
async fn test_session_and_wishlist() {
    let app = app();
    let (_, user) = get(&app, "/api/v1/session/s1").await;
    assert!(user.is_null());

    let (status, user) = send(&app, Method::PUT, "/api/v1/session/s1", Some(json!({"user_id": "u1", "email": "an@shop.vn", "display_name": "An"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["role"], "customer");

    let (status, _) = send(&app, Method::DELETE, "/api/v1/session/s1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, toggled) = send(&app, Method::POST, "/api/v1/wishlist/s1/wh1000xm5", None).await;
    assert_eq!(toggled["wishlisted"], true);
    send(&app, Method::POST, "/api/v1/wishlist/s1/aw-s9", None).await;
    let (_, list) = get(&app, "/api/v1/wishlist/s1").await;
    assert_eq!(ids(&list), vec!["wh1000xm5", "aw-s9"]);

    let (_, toggled) = send(&app, Method::POST, "/api/v1/wishlist/s1/wh1000xm5", None).await;
    assert_eq!(toggled["wishlisted"], false);
    let (status, _) = send(&app, Method::POST, "/api/v1/wishlist/s1/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_requires_admin_role() {
    let app = app();
    let (status, body) = get(&app, "/api/v1/admin/s9/dashboard").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "session_required");

    send(&app, Method::PUT, "/api/v1/session/s9", Some(json!({"user_id": "u9", "email": "c@shop.vn"}))).await;
    let (status, _) = get(&app, "/api/v1/admin/s9/dashboard").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_role_cannot_be_chosen_by_the_client() {
    let app = app();
    let (status, user) = send(&app, Method::PUT, "/api/v1/session/s7", Some(json!({"user_id": "u7", "email": "x@shop.vn", "role": "admin"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["role"], "customer");

    let (status, body) = get(&app, "/api/v1/admin/s7/dashboard").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
    let (status, _) = get(&app, "/api/v1/admin/s7/products").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let uri = format!("/api/v1/admin/s7/orders/{}/status", uuid::Uuid::nil());
    let (status, _) = send(&app, Method::PUT, &uri, Some(json!({"status": "shipped"}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_dashboard_and_order_status() {
    let app = app();
    let (_, admin) = send(&app, Method::PUT, "/api/v1/session/admin", Some(json!({"user_id": "a1", "email": "admin@shop.vn"}))).await;
    assert_eq!(admin["role"], "admin");
    send(&app, Method::POST, "/api/v1/cart/s1", Some(json!({"product_id": "airpods-pro2", "quantity": 2}))).await;
    let (_, order) = send(&app, Method::POST, "/api/v1/checkout/s1", Some(address())).await;
    let order_id = order["id"].as_str().unwrap().to_string();

    let (status, stats) = get(&app, "/api/v1/admin/admin/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["order_count"], 1);
    assert_eq!(stats["top_products"][0]["product_id"], "airpods-pro2");
    assert_eq!(stats["top_products"][0]["units"], 2);
    assert_eq!(stats["orders_by_status"]["confirmed"], 1);
    let low: Vec<&str> = stats["low_stock"].as_array().unwrap().iter().map(|s| s["product_id"].as_str().unwrap()).collect();
    assert_eq!(low, vec!["rog-g16", "aw-s9"]);
    let (status, lenient) = get(&app, "/api/v1/admin/admin/dashboard?low_stock=few").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(lenient["low_stock"], stats["low_stock"]);

    let uri = format!("/api/v1/admin/admin/orders/{order_id}/status");
    let (status, updated) = send(&app, Method::PUT, &uri, Some(json!({"status": "shipped"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "shipped");

    let (status, body) = send(&app, Method::PUT, &uri, Some(json!({"status": "pending"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "invalid_transition");

    let missing = format!("/api/v1/admin/admin/orders/{}/status", uuid::Uuid::nil());
    let (status, _) = send(&app, Method::PUT, &missing, Some(json!({"status": "shipped"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, listing) = get(&app, "/api/v1/admin/admin/products?category=laptop").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["total_count"], 2);
}
