pub mod finnhub;
pub mod price_lookup;

pub mod store;
pub mod memory_store;
pub mod mongo_store;
pub mod db_init;

pub mod connection_registry;
pub mod alert_evaluator;
pub mod notification_dispatcher;
pub mod alert_sweep;

pub mod watchlist_service;
