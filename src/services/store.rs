use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::{
    error::AppResult,
    models::{ItemId, UserId, Watchlist, WatchlistId, WatchlistItem},
};

/// Persistence for watchlists and their items.
///
/// Implementations only store and fetch. Existence and duplicate checks live
/// in `watchlist_service`, so every backend reports the same errors.
#[async_trait]
pub trait WatchlistStore: Send + Sync {
    async fn ping(&self) -> AppResult<()>;

    async fn create_watchlist(&self, user_id: UserId, name: &str) -> AppResult<Watchlist>;
    async fn get_watchlist(&self, watchlist_id: WatchlistId) -> AppResult<Option<Watchlist>>;
    async fn list_user_watchlists(&self, user_id: UserId) -> AppResult<Vec<Watchlist>>;

    /// Removes the watchlist and all of its items. Returns false if it did not exist.
    async fn delete_watchlist(&self, watchlist_id: WatchlistId) -> AppResult<bool>;

    async fn insert_item(&self, watchlist_id: WatchlistId, symbol: &str) -> AppResult<WatchlistItem>;
    async fn get_item(&self, item_id: ItemId) -> AppResult<Option<WatchlistItem>>;
    async fn find_item(
        &self,
        watchlist_id: WatchlistId,
        symbol: &str,
    ) -> AppResult<Option<WatchlistItem>>;
    async fn list_items(&self, watchlist_id: WatchlistId) -> AppResult<Vec<WatchlistItem>>;
    async fn delete_item(&self, item_id: ItemId) -> AppResult<bool>;

    /// Sets (or clears, with `None`) the alert threshold. Returns the updated item.
    async fn set_alert_price(
        &self,
        item_id: ItemId,
        alert_price: Option<Decimal>,
    ) -> AppResult<Option<WatchlistItem>>;

    /// Every item, across all watchlists, that has a non-null alert price.
    async fn items_with_alert(&self) -> AppResult<Vec<WatchlistItem>>;

    /// Owner of the watchlist the item belongs to.
    async fn owning_user_id(&self, item: &WatchlistItem) -> AppResult<Option<UserId>> {
        Ok(self
            .get_watchlist(item.watchlist_id)
            .await?
            .map(|w| w.user_id))
    }
}
