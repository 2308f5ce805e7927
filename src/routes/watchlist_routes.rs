use axum::{Router, routing::{delete, get, post, put}};
use crate::{AppState, controllers::watchlist_controller};

// Path params share the name `:id` wherever they sit at the same position.
pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/watchlists/create", post(watchlist_controller::post_create_watchlist))
        .route("/api/watchlists/check-alerts", post(watchlist_controller::post_check_alerts))
        .route("/api/watchlists/add/:id/items", post(watchlist_controller::post_add_item))
        .route("/api/watchlists/user/:user_id", get(watchlist_controller::get_user_watchlists))
        .route("/api/watchlists/delete/:id", delete(watchlist_controller::delete_watchlist))
        .route("/api/watchlists/delete-item/:id", delete(watchlist_controller::delete_item))
        .route("/api/watchlists/:id", get(watchlist_controller::get_watchlist))
        .route("/api/watchlists/:id/items", get(watchlist_controller::get_watchlist_items))
        .route("/api/watchlists/:id/alert/create", put(watchlist_controller::put_alert_price))
        .route("/api/watchlists/:id/alert/delete", delete(watchlist_controller::delete_alert_price))
}
