use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/admin/patterns", get(handlers::patterns::list_patterns))
        .route(
            "/api/admin/patterns/copy",
            post(handlers::patterns::copy_day_pattern),
        )
        .route(
            "/api/admin/patterns/entries/:id",
            put(handlers::patterns::set_pattern_entry_active),
        )
        .route(
            "/api/admin/patterns/:day",
            get(handlers::patterns::get_day_pattern),
        )
        .route(
            "/api/admin/patterns/:day",
            put(handlers::patterns::set_day_pattern),
        )
        .route(
            "/api/admin/patterns/:day/members",
            post(handlers::patterns::add_pattern_member),
        )
        .route(
            "/api/admin/patterns/:day/members/:volunteer_id",
            delete(handlers::patterns::remove_pattern_member),
        )
        .route(
            "/api/admin/patterns/:day/swap",
            post(handlers::patterns::swap_pattern_member),
        )
        .route("/api/admin/relawan", get(handlers::patterns::list_relawan))
}
