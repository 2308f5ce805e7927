use std::{net::SocketAddr, sync::Arc};

use mongodb::Client;
use tracing_subscriber::EnvFilter;

use stockwatch::{
    config::{self, StoreBackend},
    routes,
    services::{
        alert_sweep, connection_registry::ConnectionRegistry, db_init, finnhub::FinnhubClient,
        memory_store::MemoryWatchlistStore, mongo_store::MongoWatchlistStore, store::WatchlistStore,
    },
    AppState,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("stockwatch=info,tower_http=info")),
        )
        .init();

    let settings = config::load();

    let store: Arc<dyn WatchlistStore> = match settings.store_backend {
        StoreBackend::Mongo => {
            let client = Client::with_uri_str(&settings.mongodb_uri)
                .await
                .expect("Failed to connect to MongoDB");
            let db = client.database(&settings.mongodb_db);

            if let Err(e) = db_init::ensure_indexes(&db).await {
                tracing::warn!("could not create indexes: {}", e);
            }

            Arc::new(MongoWatchlistStore::new(db))
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory watchlist store, data is lost on restart");
            Arc::new(MemoryWatchlistStore::new())
        }
    };

    let state = AppState {
        settings: settings.clone(),
        store,
        prices: Arc::new(FinnhubClient::new(settings.finnhub_api_key.clone())),
        connections: ConnectionRegistry::new(),
    };

    match settings.alert_sweep_interval() {
        Some(every) => {
            tracing::info!("alert sweep every {:?}", every);
            alert_sweep::spawn_alert_sweeper(state.clone(), every);
        }
        None => tracing::info!("scheduled alert sweep disabled"),
    }

    let app = routes::app(state);

    let ip = settings
        .host
        .parse::<std::net::IpAddr>()
        .expect("HOST must be an IP address");
    let addr = SocketAddr::from((ip, settings.port));
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listener");
    axum::serve(listener, app).await.expect("server error");
}
