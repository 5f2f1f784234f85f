use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/admin/shifts", get(handlers::shifts::week_view))
        .route(
            "/api/admin/shifts/generate",
            post(handlers::shifts::generate_shifts),
        )
        .route(
            "/api/admin/shifts/:date",
            put(handlers::shifts::assign_shifts),
        )
        .route(
            "/api/admin/shifts/:date",
            delete(handlers::shifts::delete_shifts),
        )
        .route("/api/admin/roster/on-duty", get(handlers::shifts::on_duty))
        .route("/api/relawan/my-shifts", get(handlers::shifts::my_shifts))
}
