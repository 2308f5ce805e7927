use async_trait::async_trait;
use chrono::Utc;
use futures_util::StreamExt;
use mongodb::{
    bson::{doc, to_bson, Document},
    error::{ErrorKind, WriteFailure},
    options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument},
    Collection, Cursor, Database,
};
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::{ItemId, UserId, Watchlist, WatchlistId, WatchlistItem},
};

use super::store::WatchlistStore;

pub const WATCHLISTS: &str = "watchlists";
pub const WATCHLIST_ITEMS: &str = "watchlist_items";
const COUNTERS: &str = "counters";

#[derive(Debug, Serialize, Deserialize)]
struct Counter {
    #[serde(rename = "_id")]
    id: String,
    seq: i64,
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        *err.kind,
        ErrorKind::Write(WriteFailure::WriteError(ref we)) if we.code == 11000
    )
}

async fn collect<T>(mut cursor: Cursor<T>) -> AppResult<Vec<T>>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    let mut out = Vec::new();
    while let Some(res) = cursor.next().await {
        out.push(res?);
    }
    Ok(out)
}

#[derive(Clone)]
pub struct MongoWatchlistStore {
    db: Database,
}

impl MongoWatchlistStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn watchlists(&self) -> Collection<Watchlist> {
        self.db.collection::<Watchlist>(WATCHLISTS)
    }

    fn items(&self) -> Collection<WatchlistItem> {
        self.db.collection::<WatchlistItem>(WATCHLIST_ITEMS)
    }

    // Sequential integer ids, one counter document per collection.
    async fn next_id(&self, name: &str) -> AppResult<i64> {
        let opts = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        let counter = self
            .db
            .collection::<Counter>(COUNTERS)
            .find_one_and_update(doc! { "_id": name }, doc! { "$inc": { "seq": 1_i64 } }, opts)
            .await?;

        counter
            .map(|c| c.seq)
            .ok_or_else(|| AppError::Storage(format!("id counter {name} missing")))
    }
}

#[async_trait]
impl WatchlistStore for MongoWatchlistStore {
    async fn ping(&self) -> AppResult<()> {
        self.db.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }

    async fn create_watchlist(&self, user_id: UserId, name: &str) -> AppResult<Watchlist> {
        let watchlist = Watchlist {
            watchlist_id: self.next_id(WATCHLISTS).await?,
            user_id,
            name: name.to_string(),
            created_at: Utc::now().timestamp(),
        };

        self.watchlists().insert_one(&watchlist, None).await?;
        Ok(watchlist)
    }

    async fn get_watchlist(&self, watchlist_id: WatchlistId) -> AppResult<Option<Watchlist>> {
        Ok(self
            .watchlists()
            .find_one(doc! { "_id": watchlist_id }, None)
            .await?)
    }

    async fn list_user_watchlists(&self, user_id: UserId) -> AppResult<Vec<Watchlist>> {
        let find_opts = FindOptions::builder().sort(doc! { "_id": 1 }).build();
        let cursor = self
            .watchlists()
            .find(doc! { "user_id": user_id }, find_opts)
            .await?;
        collect(cursor).await
    }

    async fn delete_watchlist(&self, watchlist_id: WatchlistId) -> AppResult<bool> {
        // items first: a failure in between leaves the watchlist in place to retry
        self.items()
            .delete_many(doc! { "watchlist_id": watchlist_id }, None)
            .await?;

        let res = self
            .watchlists()
            .delete_one(doc! { "_id": watchlist_id }, None)
            .await?;

        Ok(res.deleted_count > 0)
    }

    async fn insert_item(&self, watchlist_id: WatchlistId, symbol: &str) -> AppResult<WatchlistItem> {
        let item = WatchlistItem {
            item_id: self.next_id(WATCHLIST_ITEMS).await?,
            watchlist_id,
            stock_symbol: symbol.to_string(),
            alert_price: None,
            added_at: Utc::now().timestamp(),
        };

        match self.items().insert_one(&item, None).await {
            Ok(_) => Ok(item),
            Err(e) if is_duplicate_key(&e) => Err(AppError::Duplicate(format!(
                "Stock with symbol {symbol} is already in the watchlist"
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_item(&self, item_id: ItemId) -> AppResult<Option<WatchlistItem>> {
        Ok(self.items().find_one(doc! { "_id": item_id }, None).await?)
    }

    async fn find_item(
        &self,
        watchlist_id: WatchlistId,
        symbol: &str,
    ) -> AppResult<Option<WatchlistItem>> {
        Ok(self
            .items()
            .find_one(
                doc! { "watchlist_id": watchlist_id, "stock_symbol": symbol },
                None,
            )
            .await?)
    }

    async fn list_items(&self, watchlist_id: WatchlistId) -> AppResult<Vec<WatchlistItem>> {
        let find_opts = FindOptions::builder().sort(doc! { "added_at": 1 }).build();
        let cursor = self
            .items()
            .find(doc! { "watchlist_id": watchlist_id }, find_opts)
            .await?;
        collect(cursor).await
    }

    async fn delete_item(&self, item_id: ItemId) -> AppResult<bool> {
        let res = self
            .items()
            .delete_one(doc! { "_id": item_id }, None)
            .await?;
        Ok(res.deleted_count > 0)
    }

    async fn set_alert_price(
        &self,
        item_id: ItemId,
        alert_price: Option<Decimal>,
    ) -> AppResult<Option<WatchlistItem>> {
        let price = to_bson(&alert_price).map_err(|e| AppError::Storage(e.to_string()))?;
        let update: Document = doc! { "$set": { "alert_price": price } };

        let opts = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        Ok(self
            .items()
            .find_one_and_update(doc! { "_id": item_id }, update, opts)
            .await?)
    }

    async fn items_with_alert(&self) -> AppResult<Vec<WatchlistItem>> {
        let cursor = self
            .items()
            .find(doc! { "alert_price": { "$ne": null } }, None)
            .await?;
        collect(cursor).await
    }
}
