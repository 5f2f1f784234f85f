use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/panic", post(handlers::alerts::create_alert))
        .route("/api/panic/today", get(handlers::alerts::today_alerts))
        .route(
            "/api/panic/:id/status",
            put(handlers::alerts::update_alert_status),
        )
        .route("/api/admin/panic", get(handlers::alerts::list_alerts))
        .route(
            "/api/admin/panic/:id",
            delete(handlers::alerts::delete_alert),
        )
}
