use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/admin/automation",
            get(handlers::automation::automation_status),
        )
        .route(
            "/api/admin/automation",
            put(handlers::automation::set_automation),
        )
        .route(
            "/api/admin/automation/run",
            post(handlers::automation::force_run),
        )
}
