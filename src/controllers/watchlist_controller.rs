use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::DateTime;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    models::{ItemId, UserId, Watchlist, WatchlistId, WatchlistItem},
    services::{alert_sweep, watchlist_service},
    AppState,
};

fn fmt_ts(ts: i64) -> Value {
    match DateTime::from_timestamp(ts, 0) {
        Some(dt) => Value::String(dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
        None => Value::Null,
    }
}

fn watchlist_json(w: &Watchlist) -> Value {
    json!({
        "watchlist_id": w.watchlist_id,
        "user_id": w.user_id,
        "name": w.name,
        "created_at": fmt_ts(w.created_at),
    })
}

fn item_json(it: &WatchlistItem) -> Value {
    json!({
        "item_id": it.item_id,
        "watchlist_id": it.watchlist_id,
        "stock_symbol": it.stock_symbol,
        "alert_price": it.alert_price.map(|p| format!("{:.2}", p)),
        "added_at": fmt_ts(it.added_at),
    })
}

#[derive(Deserialize)]
pub struct CreateWatchlistBody {
    pub user_id: UserId,
    pub name: String,
}

#[derive(Deserialize)]
pub struct AddItemBody {
    pub stock_symbol: String,
}

#[derive(Deserialize)]
pub struct AlertPriceBody {
    pub alert_price: Decimal,
}

// POST /api/watchlists/create
pub async fn post_create_watchlist(
    State(state): State<AppState>,
    Json(body): Json<CreateWatchlistBody>,
) -> AppResult<Json<Value>> {
    let w = watchlist_service::create_watchlist(&state, body.user_id, &body.name).await?;
    Ok(Json(watchlist_json(&w)))
}

// POST /api/watchlists/add/:id/items
pub async fn post_add_item(
    State(state): State<AppState>,
    Path(watchlist_id): Path<WatchlistId>,
    Json(body): Json<AddItemBody>,
) -> AppResult<Json<Value>> {
    let item = watchlist_service::add_item(&state, watchlist_id, &body.stock_symbol).await?;
    Ok(Json(item_json(&item)))
}

// GET /api/watchlists/:id
pub async fn get_watchlist(
    State(state): State<AppState>,
    Path(watchlist_id): Path<WatchlistId>,
) -> AppResult<Json<Value>> {
    let w = watchlist_service::get_watchlist(&state, watchlist_id).await?;
    Ok(Json(watchlist_json(&w)))
}

// GET /api/watchlists/user/:user_id
pub async fn get_user_watchlists(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> AppResult<Json<Value>> {
    let lists = watchlist_service::list_user_watchlists(&state, user_id).await?;
    Ok(Json(Value::Array(lists.iter().map(watchlist_json).collect())))
}

// GET /api/watchlists/:id/items
pub async fn get_watchlist_items(
    State(state): State<AppState>,
    Path(watchlist_id): Path<WatchlistId>,
) -> AppResult<Json<Value>> {
    let items = watchlist_service::list_items(&state, watchlist_id).await?;
    Ok(Json(Value::Array(items.iter().map(item_json).collect())))
}

// DELETE /api/watchlists/delete/:id
pub async fn delete_watchlist(
    State(state): State<AppState>,
    Path(watchlist_id): Path<WatchlistId>,
) -> AppResult<Json<bool>> {
    Ok(Json(watchlist_service::delete_watchlist(&state, watchlist_id).await?))
}

// DELETE /api/watchlists/delete-item/:id
pub async fn delete_item(
    State(state): State<AppState>,
    Path(item_id): Path<ItemId>,
) -> AppResult<Json<bool>> {
    Ok(Json(watchlist_service::delete_item(&state, item_id).await?))
}

// PUT /api/watchlists/:id/alert/create
pub async fn put_alert_price(
    State(state): State<AppState>,
    Path(item_id): Path<ItemId>,
    Json(body): Json<AlertPriceBody>,
) -> AppResult<Json<Value>> {
    let item = watchlist_service::set_alert_price(&state, item_id, body.alert_price).await?;
    Ok(Json(item_json(&item)))
}

// DELETE /api/watchlists/:id/alert/delete
pub async fn delete_alert_price(
    State(state): State<AppState>,
    Path(item_id): Path<ItemId>,
) -> AppResult<Json<Value>> {
    let item = watchlist_service::remove_alert_price(&state, item_id).await?;
    Ok(Json(item_json(&item)))
}

// POST /api/watchlists/check-alerts
// Manual sweep, on top of the scheduled one.
pub async fn post_check_alerts(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let summary = alert_sweep::run_sweep(&state).await?;
    Ok(Json(json!({
        "message": format!("Checked {} alerts", summary.checked),
        "checked": summary.checked,
    })))
}
