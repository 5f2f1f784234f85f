use axum::{extract::State, Json};
use chrono::Utc;
use std::sync::Arc;

use siaga_core::{
    errors::SiagaError,
    models::roster::{
        AutomationStatusResponse, ForceGenerationRequest, GenerateShiftsResponse,
        SetAutomationRequest,
    },
    roster::{local_today, lookahead_window, DEFAULT_LOOKAHEAD_DAYS},
};
use tracing::info;

use crate::{
    handlers::shifts::generation_response,
    middleware::{error_handling::AppError, identity::CurrentUser},
    ApiState,
};

#[axum::debug_handler]
pub async fn automation_status(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
) -> Result<Json<AutomationStatusResponse>, AppError> {
    user.require_admin()?;

    Ok(Json(current_status(&state).await?))
}

#[axum::debug_handler]
pub async fn set_automation(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Json(payload): Json<SetAutomationRequest>,
) -> Result<Json<AutomationStatusResponse>, AppError> {
    user.require_admin()?;

    siaga_db::repositories::settings::set_automation_enabled(&state.db_pool, payload.enabled)
        .await
        .map_err(SiagaError::Database)?;
    info!(
        "Shift automation {} by {}",
        if payload.enabled { "enabled" } else { "disabled" },
        user.id
    );

    Ok(Json(current_status(&state).await?))
}

#[axum::debug_handler]
pub async fn force_run(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Json(payload): Json<ForceGenerationRequest>,
) -> Result<Json<GenerateShiftsResponse>, AppError> {
    user.require_admin()?;

    if !(1..=30).contains(&payload.days) {
        return Err(AppError(SiagaError::Validation(
            "days must be between 1 and 30".to_string(),
        )));
    }

    let Some(mut lock) = siaga_db::repositories::settings::try_generation_lock(&state.db_pool)
        .await
        .map_err(SiagaError::Database)?
    else {
        return Err(AppError(SiagaError::Conflict(
            "A generation run is already in progress".to_string(),
        )));
    };

    let today = local_today(state.timezone);
    let (start, end) = lookahead_window(today, payload.days);
    match &payload.reason {
        Some(reason) => info!(
            "Forced generation for {}..{} by {} ({})",
            start, end, user.id, reason
        ),
        None => info!("Forced generation for {}..{} by {}", start, end, user.id),
    }

    // The lock is released whichever way generation went, then errors
    // propagate in the order they occurred.
    let outcome = siaga_db::repositories::shifts::generate_from_patterns(
        &state.db_pool,
        start,
        end,
        false,
    )
    .await;
    let unlock = siaga_db::repositories::settings::release_generation_lock(&mut lock).await;
    let report = outcome.map_err(SiagaError::Database)?;
    unlock.map_err(SiagaError::Database)?;

    siaga_db::repositories::settings::record_generation_run(&state.db_pool, Utc::now())
        .await
        .map_err(SiagaError::Database)?;

    Ok(Json(generation_response(&state.db_pool, report).await?))
}

async fn current_status(state: &ApiState) -> Result<AutomationStatusResponse, SiagaError> {
    let enabled = siaga_db::repositories::settings::automation_enabled(&state.db_pool)
        .await
        .map_err(SiagaError::Database)?;
    let last_generation_at = siaga_db::repositories::settings::last_generation_at(&state.db_pool)
        .await
        .map_err(SiagaError::Database)?;

    Ok(AutomationStatusResponse {
        enabled,
        last_generation_at,
        schedule: "daily".to_string(),
        lookahead_days: DEFAULT_LOOKAHEAD_DAYS,
    })
}
