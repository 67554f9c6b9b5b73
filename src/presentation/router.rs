// Route table for the dashboard HTTP bridge
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    add_parameter, click_button, click_button_at, finished, get_loading, get_state, health_check,
    keys, load, post_activity, scan, send_event, undo,
};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboard/state", get(get_state))
        .route("/dashboard/loading", get(get_loading))
        .route("/dashboard/load", post(load))
        .route("/dashboard/finished", post(finished))
        .route("/dashboard/events", post(send_event))
        .route("/dashboard/buttons/:id/click", post(click_button))
        .route("/dashboard/buttons/by-index/:index/click", post(click_button_at))
        .route("/dashboard/activities", post(post_activity))
        .route("/dashboard/parameters", post(add_parameter))
        .route("/dashboard/undo", post(undo))
        .route("/dashboard/scan", post(scan))
        .route("/dashboard/keys", post(keys))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
