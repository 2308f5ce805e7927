//! Library entrypoint for stockwatch.
//!
//! Integration tests under `tests/` build an `AppState` from the pieces
//! exported here (in-memory store, fake price lookups) and drive the routers
//! directly.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub mod controllers;
pub mod routes;

use services::{
    connection_registry::ConnectionRegistry, price_lookup::PriceLookup, store::WatchlistStore,
};

#[derive(Clone)]
pub struct AppState {
    pub settings: config::Settings,
    pub store: Arc<dyn WatchlistStore>,
    pub prices: Arc<dyn PriceLookup>,
    pub connections: ConnectionRegistry,
}
