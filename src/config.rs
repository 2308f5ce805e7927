use std::{env, time::Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Mongo,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub mongodb_uri: String,
    pub mongodb_db: String,
    pub host: String,
    pub port: u16,

    pub finnhub_api_key: String,
    pub store_backend: StoreBackend,

    // 0 = scheduled sweeps disabled, only /check-alerts runs them
    pub alert_sweep_interval_secs: u64,
}

impl Settings {
    pub fn alert_sweep_interval(&self) -> Option<Duration> {
        if self.alert_sweep_interval_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.alert_sweep_interval_secs))
        }
    }
}

fn parse_store_backend(raw: &str) -> StoreBackend {
    match raw.trim().to_lowercase().as_str() {
        "memory" | "mem" | "in-memory" => StoreBackend::Memory,
        _ => StoreBackend::Mongo,
    }
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let mongodb_uri = env::var("MONGODB_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

    let mongodb_db = env::var("MONGODB_DB")
        .unwrap_or_else(|_| "stockwatch".to_string());

    let host = env::var("HOST")
        .unwrap_or_else(|_| "127.0.0.1".to_string());

    let port = env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(8002);

    let finnhub_api_key = env::var("FINNHUB_API_KEY").unwrap_or_default();

    let store_backend = env::var("WATCHLIST_STORE")
        .map(|s| parse_store_backend(&s))
        .unwrap_or(StoreBackend::Mongo);

    let alert_sweep_interval_secs = env::var("ALERT_SWEEP_INTERVAL_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(60);

    Settings {
        mongodb_uri,
        mongodb_db,
        host,
        port,
        finnhub_api_key,
        store_backend,
        alert_sweep_interval_secs,
    }
}
