use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::{
    error::{AppError, AppResult},
    models::{ItemId, UserId, Watchlist, WatchlistId, WatchlistItem},
    AppState,
};

use super::alert_evaluator::normalize_price;

// DECIMAL(10, 2)
const MAX_ALERT_PRICE: i64 = 99_999_999;

fn symbol_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z0-9][A-Z0-9.\-]{0,9}$").expect("valid symbol regex"))
}

/// Upper-cases and validates a stock symbol.
pub fn normalize_symbol(symbol: &str) -> AppResult<String> {
    let sym = symbol.trim().to_uppercase();
    if !symbol_re().is_match(&sym) {
        return Err(AppError::InvalidInput(format!(
            "Invalid stock symbol: {:?}",
            symbol.trim()
        )));
    }
    Ok(sym)
}

/// Validates an alert threshold and brings it to two fractional digits.
pub fn normalize_alert_price(price: Decimal) -> AppResult<Decimal> {
    let price = normalize_price(price);
    if price <= Decimal::ZERO {
        return Err(AppError::InvalidInput(
            "Alert price must be greater than zero".to_string(),
        ));
    }
    if price > Decimal::from(MAX_ALERT_PRICE) {
        return Err(AppError::InvalidInput(format!(
            "Alert price must not exceed {MAX_ALERT_PRICE}"
        )));
    }
    Ok(price)
}

async fn require_watchlist(state: &AppState, watchlist_id: WatchlistId) -> AppResult<Watchlist> {
    state
        .store
        .get_watchlist(watchlist_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Watchlist with id {watchlist_id} does not exist")))
}

fn item_not_found(item_id: ItemId) -> AppError {
    AppError::NotFound(format!("Watchlist item with id {item_id} does not exist"))
}

pub async fn create_watchlist(state: &AppState, user_id: UserId, name: &str) -> AppResult<Watchlist> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("Watchlist name is required".to_string()));
    }
    if name.chars().count() > 255 {
        return Err(AppError::InvalidInput(
            "Watchlist name must be at most 255 characters".to_string(),
        ));
    }

    state.store.create_watchlist(user_id, name).await
}

pub async fn get_watchlist(state: &AppState, watchlist_id: WatchlistId) -> AppResult<Watchlist> {
    require_watchlist(state, watchlist_id).await
}

pub async fn list_user_watchlists(state: &AppState, user_id: UserId) -> AppResult<Vec<Watchlist>> {
    state.store.list_user_watchlists(user_id).await
}

pub async fn list_items(state: &AppState, watchlist_id: WatchlistId) -> AppResult<Vec<WatchlistItem>> {
    require_watchlist(state, watchlist_id).await?;
    state.store.list_items(watchlist_id).await
}

/// Adds a symbol to a watchlist and tells the owner, if connected.
pub async fn add_item(
    state: &AppState,
    watchlist_id: WatchlistId,
    symbol: &str,
) -> AppResult<WatchlistItem> {
    let sym = normalize_symbol(symbol)?;
    let watchlist = require_watchlist(state, watchlist_id).await?;

    if state.store.find_item(watchlist_id, &sym).await?.is_some() {
        return Err(AppError::Duplicate(format!(
            "Stock with symbol {sym} is already in the watchlist"
        )));
    }

    let item = state.store.insert_item(watchlist_id, &sym).await?;

    state.connections.send_to(
        watchlist.user_id,
        format!("Stock {} added to watchlist {}.", sym, watchlist.name),
    );

    Ok(item)
}

pub async fn delete_watchlist(state: &AppState, watchlist_id: WatchlistId) -> AppResult<bool> {
    if !state.store.delete_watchlist(watchlist_id).await? {
        return Err(AppError::NotFound(format!(
            "Watchlist with id {watchlist_id} does not exist"
        )));
    }
    Ok(true)
}

pub async fn delete_item(state: &AppState, item_id: ItemId) -> AppResult<bool> {
    if !state.store.delete_item(item_id).await? {
        return Err(item_not_found(item_id));
    }
    Ok(true)
}

pub async fn set_alert_price(
    state: &AppState,
    item_id: ItemId,
    alert_price: Decimal,
) -> AppResult<WatchlistItem> {
    let price = normalize_alert_price(alert_price)?;
    state
        .store
        .set_alert_price(item_id, Some(price))
        .await?
        .ok_or_else(|| item_not_found(item_id))
}

pub async fn remove_alert_price(state: &AppState, item_id: ItemId) -> AppResult<WatchlistItem> {
    state
        .store
        .set_alert_price(item_id, None)
        .await?
        .ok_or_else(|| item_not_found(item_id))
}
