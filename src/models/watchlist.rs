use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type WatchlistId = i64;
pub type ItemId = i64;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Watchlist {
    #[serde(rename = "_id")]
    pub watchlist_id: WatchlistId,

    pub user_id: UserId,
    pub name: String,

    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchlistItem {
    #[serde(rename = "_id")]
    pub item_id: ItemId,

    pub watchlist_id: WatchlistId,

    // always upper-case
    pub stock_symbol: String,

    // None = not monitored for alerts
    #[serde(default)]
    pub alert_price: Option<Decimal>,

    pub added_at: i64,
}

impl WatchlistItem {
    pub fn has_alert(&self) -> bool {
        self.alert_price.is_some()
    }
}
