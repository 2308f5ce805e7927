use axum::{Router, routing::{get, post}};
use crate::{AppState, controllers::realtime_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/ws/:user_id", get(realtime_controller::ws_notifications))
        .route("/api/connections/:user_id/disconnect", post(realtime_controller::post_disconnect))
}
