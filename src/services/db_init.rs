use mongodb::{
    bson::doc,
    options::IndexOptions,
    Database, IndexModel,
};

use crate::error::AppResult;

use super::mongo_store::{WATCHLISTS, WATCHLIST_ITEMS};

pub async fn ensure_indexes(db: &Database) -> AppResult<()> {
    // watchlists: list by owner
    {
        let col = db.collection::<mongodb::bson::Document>(WATCHLISTS);
        let model = IndexModel::builder()
            .keys(doc! { "user_id": 1 })
            .build();

        col.create_index(model, None).await?;
    }

    // watchlist_items: one item per (watchlist_id, stock_symbol)
    {
        let col = db.collection::<mongodb::bson::Document>(WATCHLIST_ITEMS);
        let model = IndexModel::builder()
            .keys(doc! { "watchlist_id": 1, "stock_symbol": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        col.create_index(model, None).await?;
    }

    // watchlist_items: sweep scan over alert-bearing items
    {
        let col = db.collection::<mongodb::bson::Document>(WATCHLIST_ITEMS);
        let model = IndexModel::builder()
            .keys(doc! { "alert_price": 1 })
            .build();

        col.create_index(model, None).await?;
    }

    Ok(())
}
