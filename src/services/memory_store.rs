use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;

use crate::{
    error::{AppError, AppResult},
    models::{ItemId, UserId, Watchlist, WatchlistId, WatchlistItem},
};

use super::store::WatchlistStore;

#[derive(Default)]
struct Tables {
    watchlists: BTreeMap<WatchlistId, Watchlist>,
    items: BTreeMap<ItemId, WatchlistItem>,
    next_watchlist_id: WatchlistId,
    next_item_id: ItemId,
}

/// Process-local store. Used by the tests and by `WATCHLIST_STORE=memory`.
#[derive(Default)]
pub struct MemoryWatchlistStore {
    tables: Mutex<Tables>,
}

impl MemoryWatchlistStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| AppError::Storage("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl WatchlistStore for MemoryWatchlistStore {
    async fn ping(&self) -> AppResult<()> {
        self.lock().map(|_| ())
    }

    async fn create_watchlist(&self, user_id: UserId, name: &str) -> AppResult<Watchlist> {
        let mut t = self.lock()?;
        t.next_watchlist_id += 1;

        let watchlist = Watchlist {
            watchlist_id: t.next_watchlist_id,
            user_id,
            name: name.to_string(),
            created_at: Utc::now().timestamp(),
        };
        t.watchlists.insert(watchlist.watchlist_id, watchlist.clone());
        Ok(watchlist)
    }

    async fn get_watchlist(&self, watchlist_id: WatchlistId) -> AppResult<Option<Watchlist>> {
        Ok(self.lock()?.watchlists.get(&watchlist_id).cloned())
    }

    async fn list_user_watchlists(&self, user_id: UserId) -> AppResult<Vec<Watchlist>> {
        Ok(self
            .lock()?
            .watchlists
            .values()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete_watchlist(&self, watchlist_id: WatchlistId) -> AppResult<bool> {
        let mut t = self.lock()?;
        if t.watchlists.remove(&watchlist_id).is_none() {
            return Ok(false);
        }
        t.items.retain(|_, it| it.watchlist_id != watchlist_id);
        Ok(true)
    }

    async fn insert_item(&self, watchlist_id: WatchlistId, symbol: &str) -> AppResult<WatchlistItem> {
        let mut t = self.lock()?;

        // mirrors the unique (watchlist_id, stock_symbol) index of the mongo store
        if t
            .items
            .values()
            .any(|it| it.watchlist_id == watchlist_id && it.stock_symbol == symbol)
        {
            return Err(AppError::Duplicate(format!(
                "Stock with symbol {symbol} is already in the watchlist"
            )));
        }

        t.next_item_id += 1;
        let item = WatchlistItem {
            item_id: t.next_item_id,
            watchlist_id,
            stock_symbol: symbol.to_string(),
            alert_price: None,
            added_at: Utc::now().timestamp(),
        };
        t.items.insert(item.item_id, item.clone());
        Ok(item)
    }

    async fn get_item(&self, item_id: ItemId) -> AppResult<Option<WatchlistItem>> {
        Ok(self.lock()?.items.get(&item_id).cloned())
    }

    async fn find_item(
        &self,
        watchlist_id: WatchlistId,
        symbol: &str,
    ) -> AppResult<Option<WatchlistItem>> {
        Ok(self
            .lock()?
            .items
            .values()
            .find(|it| it.watchlist_id == watchlist_id && it.stock_symbol == symbol)
            .cloned())
    }

    async fn list_items(&self, watchlist_id: WatchlistId) -> AppResult<Vec<WatchlistItem>> {
        Ok(self
            .lock()?
            .items
            .values()
            .filter(|it| it.watchlist_id == watchlist_id)
            .cloned()
            .collect())
    }

    async fn delete_item(&self, item_id: ItemId) -> AppResult<bool> {
        Ok(self.lock()?.items.remove(&item_id).is_some())
    }

    async fn set_alert_price(
        &self,
        item_id: ItemId,
        alert_price: Option<Decimal>,
    ) -> AppResult<Option<WatchlistItem>> {
        let mut t = self.lock()?;
        Ok(t.items.get_mut(&item_id).map(|it| {
            it.alert_price = alert_price;
            it.clone()
        }))
    }

    async fn items_with_alert(&self) -> AppResult<Vec<WatchlistItem>> {
        Ok(self
            .lock()?
            .items
            .values()
            .filter(|it| it.has_alert())
            .cloned()
            .collect())
    }
}
