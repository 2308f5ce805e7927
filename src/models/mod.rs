pub mod watchlist;
pub mod notification;

pub use watchlist::{ItemId, UserId, Watchlist, WatchlistId, WatchlistItem};
pub use notification::{SweepSummary, TriggerNotification};
