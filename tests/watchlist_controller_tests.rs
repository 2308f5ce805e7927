use std::{str::FromStr, sync::Arc};

use async_trait::async_trait;
use axum::{
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use stockwatch::{
    config, routes,
    services::{
        connection_registry::{ClientHandle, ConnectionRegistry, Outbound},
        memory_store::MemoryWatchlistStore,
        price_lookup::PriceLookup,
        store::WatchlistStore,
    },
    AppState,
};
use tower::ServiceExt;

// Every symbol trades at 10.55.
struct FlatPrice;

#[async_trait]
impl PriceLookup for FlatPrice {
    async fn current_price(&self, _symbol: &str) -> Option<Decimal> {
        Decimal::from_str("10.55").ok()
    }
}

fn test_state() -> AppState {
    AppState {
        settings: config::load(),
        store: Arc::new(MemoryWatchlistStore::new()),
        prices: Arc::new(FlatPrice),
        connections: ConnectionRegistry::new(),
    }
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(b) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(axum::body::Body::empty()).unwrap(),
    };

    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn create_watchlist(app: &Router, user_id: i64, name: &str) -> i64 {
    let (status, body) = call(
        app,
        "POST",
        "/api/watchlists/create",
        Some(json!({ "user_id": user_id, "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["watchlist_id"].as_i64().unwrap()
}

async fn add_item(app: &Router, watchlist_id: i64, symbol: &str) -> (StatusCode, Value) {
    call(
        app,
        "POST",
        &format!("/api/watchlists/add/{watchlist_id}/items"),
        Some(json!({ "stock_symbol": symbol })),
    )
    .await
}

#[tokio::test]
async fn create_and_get_watchlist() {
    let app = routes::app(test_state());

    let id = create_watchlist(&app, 1, "Bilancosu Iyi Beklenenler").await;

    let (status, body) = call(&app, "GET", &format!("/api/watchlists/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], 1);
    assert_eq!(body["name"], "Bilancosu Iyi Beklenenler");
    assert!(body["created_at"].is_string());

    let (status, body) = call(&app, "GET", "/api/watchlists/user/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn create_watchlist_requires_name() {
    let app = routes::app(test_state());
    let (status, body) = call(
        &app,
        "POST",
        "/api/watchlists/create",
        Some(json!({ "user_id": 1, "name": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Watchlist name is required");
}

#[tokio::test]
async fn get_unknown_watchlist_returns_404() {
    let app = routes::app(test_state());

    let (status, body) = call(&app, "GET", "/api/watchlists/123", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["detail"].as_str().unwrap().contains("123"));

    let (status, _) = call(&app, "GET", "/api/watchlists/123/items", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn add_item_uppercases_and_rejects_duplicates() {
    let app = routes::app(test_state());
    let id = create_watchlist(&app, 1, "Tech").await;

    let (status, body) = add_item(&app, id, "orge").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stock_symbol"], "ORGE");
    assert_eq!(body["alert_price"], Value::Null);

    let (status, body) = add_item(&app, id, "ORGE").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("already in the watchlist"));

    let (status, body) = call(&app, "GET", &format!("/api/watchlists/{id}/items"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn add_item_rejects_bad_symbol_and_missing_watchlist() {
    let app = routes::app(test_state());
    let id = create_watchlist(&app, 1, "Tech").await;

    let (status, _) = add_item(&app, id, "NOT A SYMBOL").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = add_item(&app, 999, "ORGE").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn add_item_notifies_connected_owner() {
    let state = test_state();
    let (handle, mut rx) = ClientHandle::new(8);
    state.connections.register(4, handle);
    let app = routes::app(state);

    let id = create_watchlist(&app, 4, "Banks").await;
    let (status, _) = add_item(&app, id, "AKBNK").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(
        rx.try_recv().unwrap(),
        Outbound::Text("Stock AKBNK added to watchlist Banks.".to_string())
    );
}

#[tokio::test]
async fn set_and_remove_alert_price() {
    let app = routes::app(test_state());
    let id = create_watchlist(&app, 1, "Tech").await;
    let (_, item) = add_item(&app, id, "ORGE").await;
    let item_id = item["item_id"].as_i64().unwrap();

    let (status, body) = call(
        &app,
        "PUT",
        &format!("/api/watchlists/{item_id}/alert/create"),
        Some(json!({ "alert_price": 10.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["alert_price"], "10.50");

    let (status, body) = call(
        &app,
        "DELETE",
        &format!("/api/watchlists/{item_id}/alert/delete"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["alert_price"], Value::Null);
}

#[tokio::test]
async fn alert_price_must_be_positive() {
    let app = routes::app(test_state());
    let id = create_watchlist(&app, 1, "Tech").await;
    let (_, item) = add_item(&app, id, "ORGE").await;
    let item_id = item["item_id"].as_i64().unwrap();

    for bad in [json!(0), json!(-3.2), json!("0.001")] {
        let (status, _) = call(
            &app,
            "PUT",
            &format!("/api/watchlists/{item_id}/alert/create"),
            Some(json!({ "alert_price": bad })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (status, _) = call(
        &app,
        "PUT",
        "/api/watchlists/555/alert/create",
        Some(json!({ "alert_price": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_watchlist_cascades_items() {
    let state = test_state();
    let store = state.store.clone();
    let app = routes::app(state);

    let id = create_watchlist(&app, 1, "Tech").await;
    let (_, item) = add_item(&app, id, "ORGE").await;
    let item_id = item["item_id"].as_i64().unwrap();

    let (status, body) = call(&app, "DELETE", &format!("/api/watchlists/delete/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Bool(true));

    assert!(store.get_item(item_id).await.unwrap().is_none());

    let (status, _) = call(&app, "DELETE", &format!("/api/watchlists/delete/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_item_then_404() {
    let app = routes::app(test_state());
    let id = create_watchlist(&app, 1, "Tech").await;
    let (_, item) = add_item(&app, id, "ORGE").await;
    let item_id = item["item_id"].as_i64().unwrap();

    let uri = format!("/api/watchlists/delete-item/{item_id}");
    let (status, body) = call(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Bool(true));

    let (status, _) = call(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn check_alerts_reports_count() {
    let state = test_state();
    let (handle, mut rx) = ClientHandle::new(8);
    state.connections.register(1, handle);
    let app = routes::app(state);

    let (status, body) = call(&app, "POST", "/api/watchlists/check-alerts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Checked 0 alerts");
    assert_eq!(body["checked"], 0);

    let id = create_watchlist(&app, 1, "Tech").await;
    let (_, item) = add_item(&app, id, "ORGE").await;
    let _ = rx.try_recv(); // "added to watchlist" notice
    let item_id = item["item_id"].as_i64().unwrap();
    call(
        &app,
        "PUT",
        &format!("/api/watchlists/{item_id}/alert/create"),
        Some(json!({ "alert_price": "10.50" })),
    )
    .await;

    let (status, body) = call(&app, "POST", "/api/watchlists/check-alerts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Checked 1 alerts");
    assert_eq!(body["checked"], 1);

    match rx.try_recv().unwrap() {
        Outbound::Text(msg) => assert!(msg.starts_with("🚨 Stock Alert: ORGE")),
        other => panic!("unexpected outbound {other:?}"),
    }
}

#[tokio::test]
async fn disconnect_endpoint_unregisters_user() {
    let state = test_state();
    let (handle, _rx) = ClientHandle::new(8);
    state.connections.register(8, handle);
    let registry = state.connections.clone();
    let app = routes::app(state);

    let (status, body) = call(&app, "POST", "/api/connections/8/disconnect", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["disconnected"], true);
    assert!(!registry.is_connected(8));

    let (_, body) = call(&app, "POST", "/api/connections/8/disconnect", None).await;
    assert_eq!(body["disconnected"], false);
}

#[tokio::test]
async fn health_and_fallback() {
    let app = routes::app(test_state());

    let (status, body) = call(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = call(&app, "GET", "/health/db", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["store"], "ok");

    let (status, _) = call(&app, "GET", "/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
