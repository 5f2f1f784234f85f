use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;

use siaga_core::{
    alerts::{check_transition, fallback_contacts, AlertStatus, DuplicatePolicy, Role},
    errors::SiagaError,
    models::{
        alert::{
            AlertResponse, CreateAlertRequest, CreateAlertResponse, DeleteAlertResponse,
            DeliveryFailureResponse, DuplicateAlertResponse, ListAlertsQuery, ListAlertsResponse,
            TodayAlertsResponse, UpdateAlertStatusRequest,
        },
        user::UserSummary,
    },
    roster::{local_day_bounds, local_today},
};
use siaga_db::models::{DbPanicAlert, DbUser};
use siaga_notify::message::{emergency_message, AlertContext};
use siaga_notify::Recipient;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    middleware::{error_handling::AppError, identity::CurrentUser},
    ApiState,
};

#[axum::debug_handler]
pub async fn create_alert(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Json(payload): Json<CreateAlertRequest>,
) -> Result<Response, AppError> {
    validate_coordinates(payload.latitude, payload.longitude)?;
    if let Some(description) = &payload.description {
        if description.chars().count() > 500 {
            return Err(AppError(SiagaError::Validation(
                "description must be at most 500 characters".to_string(),
            )));
        }
    }

    let today = local_today(state.timezone);

    // At most one non-resolved alert per reporter per local day
    if state.duplicate_policy == DuplicatePolicy::RejectSameDay {
        let (start, end) = local_day_bounds(state.timezone, today);
        let existing = siaga_db::repositories::alerts::find_active_alert_for_reporter(
            &state.db_pool,
            user.id,
            start,
            end,
        )
        .await
        .map_err(SiagaError::Database)?;

        if let Some(existing) = existing {
            let users = load_alert_users(&state.db_pool, std::slice::from_ref(&existing)).await?;
            let body = DuplicateAlertResponse {
                error: "An active alert already exists for today".to_string(),
                existing_alert: build_alert_response(&existing, &users)?,
            };
            return Ok((StatusCode::CONFLICT, Json(body)).into_response());
        }
    }

    let alert = siaga_db::repositories::alerts::create_alert(
        &state.db_pool,
        user.id,
        payload.latitude,
        payload.longitude,
        payload.description.as_deref(),
    )
    .await
    .map_err(SiagaError::Database)?;
    info!("Alert {} created by {}", alert.id, user.id);

    // Resolve the on-duty set immediately before dispatch
    let roster = siaga_db::repositories::roster::resolve_on_duty(&state.db_pool, today)
        .await
        .map_err(SiagaError::Database)?;

    let users = load_alert_users(&state.db_pool, std::slice::from_ref(&alert)).await?;
    let alert_response = build_alert_response(&alert, &users)?;

    if roster.is_empty() {
        // Degraded success: the alert is recorded, the reporter gets the
        // national emergency numbers instead of a dispatch.
        warn!(
            "Nobody on duty for alert {}; returning fallback contacts",
            alert.id
        );
        let response = CreateAlertResponse {
            alert: alert_response,
            notified: Vec::new(),
            delivery_failures: Vec::new(),
            fallback_contacts: Some(fallback_contacts()),
        };
        return Ok((StatusCode::CREATED, Json(response)).into_response());
    }

    let recipients = recipients_in_duty_order(&state.db_pool, &roster.volunteer_ids).await?;
    let message = emergency_message(
        &AlertContext {
            alert_id: alert.id,
            created_at: alert.created_at,
            reporter_name: user.name.clone(),
            reporter_phone: user.phone.clone(),
            description: alert.description.clone(),
            latitude: alert.latitude,
            longitude: alert.longitude,
        },
        state.timezone,
        &state.dashboard_url,
    );
    let report = state.alert_router.dispatch(&message, &recipients).await;

    let response = CreateAlertResponse {
        alert: alert_response,
        notified: report.notified,
        delivery_failures: report
            .failures
            .into_iter()
            .map(|failure| DeliveryFailureResponse {
                volunteer_id: failure.volunteer_id,
                channel: failure.channel.map(|channel| channel.to_string()),
                reason: failure.reason,
            })
            .collect(),
        fallback_contacts: None,
    };

    Ok((StatusCode::CREATED, Json(response)).into_response())
}

#[axum::debug_handler]
pub async fn today_alerts(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
) -> Result<Json<TodayAlertsResponse>, AppError> {
    let today = local_today(state.timezone);

    match user.role {
        Role::Admin => {}
        Role::Relawan => {
            let on_duty = siaga_db::repositories::roster::is_on_duty(&state.db_pool, user.id, today)
                .await
                .map_err(SiagaError::Database)?;
            if !on_duty {
                return Err(AppError(SiagaError::Authorization(
                    "Only relawan on today's roster may view today's alerts".to_string(),
                )));
            }
        }
        Role::User => {
            return Err(AppError(SiagaError::Authorization(
                "Admin or on-duty relawan access required".to_string(),
            )));
        }
    }

    let (start, end) = local_day_bounds(state.timezone, today);
    let alerts = siaga_db::repositories::alerts::get_alerts_between(&state.db_pool, start, end)
        .await
        .map_err(SiagaError::Database)?;

    let users = load_alert_users(&state.db_pool, &alerts).await?;
    let alerts = alerts
        .iter()
        .map(|alert| build_alert_response(alert, &users))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(TodayAlertsResponse {
        date: today,
        alerts,
    }))
}

#[axum::debug_handler]
pub async fn update_alert_status(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAlertStatusRequest>,
) -> Result<Json<AlertResponse>, AppError> {
    let alert = siaga_db::repositories::alerts::get_alert_by_id(&state.db_pool, id)
        .await
        .map_err(SiagaError::Database)?
        .ok_or_else(|| SiagaError::NotFound(format!("Alert with ID {id} not found")))?;

    let current = alert.status.parse::<AlertStatus>().map_err(|_| {
        SiagaError::Internal(format!("Alert {} has unknown status {}", alert.id, alert.status).into())
    })?;

    // Roster membership only matters for relawan; the guard never consults
    // it for admins, and plain users are rejected outright.
    let on_duty = if user.role == Role::Relawan {
        siaga_db::repositories::roster::is_on_duty(
            &state.db_pool,
            user.id,
            local_today(state.timezone),
        )
        .await
        .map_err(SiagaError::Database)?
    } else {
        false
    };

    let actor = user.actor(on_duty);
    let effect = check_transition(&actor, current, alert.handled_by, payload.status)
        .map_err(|denied| denied.into_error())?;

    let (handled_by, handled_at) = if effect.stamp_handler {
        (Some(actor.id), Some(Utc::now()))
    } else {
        (None, None)
    };

    let updated = siaga_db::repositories::alerts::update_alert_status(
        &state.db_pool,
        id,
        effect.new_status.as_str(),
        handled_by,
        handled_at,
    )
    .await
    .map_err(SiagaError::Database)?;
    info!(
        "Alert {} moved from {} to {} by {}",
        id, current, effect.new_status, actor.id
    );

    let users = load_alert_users(&state.db_pool, std::slice::from_ref(&updated)).await?;
    Ok(Json(build_alert_response(&updated, &users)?))
}

#[axum::debug_handler]
pub async fn list_alerts(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Query(query): Query<ListAlertsQuery>,
) -> Result<Json<ListAlertsResponse>, AppError> {
    user.require_admin()?;

    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let offset = query.offset.unwrap_or(0).max(0);
    let (start, end) = match query.date {
        Some(date) => {
            let (start, end) = local_day_bounds(state.timezone, date);
            (Some(start), Some(end))
        }
        None => (None, None),
    };
    let status = query.status.map(|status| status.as_str());

    let alerts = siaga_db::repositories::alerts::list_alerts(
        &state.db_pool,
        status,
        start,
        end,
        limit,
        offset,
    )
    .await
    .map_err(SiagaError::Database)?;
    let total = siaga_db::repositories::alerts::count_alerts(&state.db_pool, status, start, end)
        .await
        .map_err(SiagaError::Database)?;

    let users = load_alert_users(&state.db_pool, &alerts).await?;
    let alerts = alerts
        .iter()
        .map(|alert| build_alert_response(alert, &users))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(ListAlertsResponse {
        alerts,
        total,
        limit,
        offset,
    }))
}

#[axum::debug_handler]
pub async fn delete_alert(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteAlertResponse>, AppError> {
    user.require_admin()?;

    let removed = siaga_db::repositories::alerts::delete_alert(&state.db_pool, id)
        .await
        .map_err(SiagaError::Database)?;
    if removed == 0 {
        return Err(AppError(SiagaError::NotFound(format!(
            "Alert with ID {id} not found"
        ))));
    }
    info!("Alert {} deleted by {}", id, user.id);

    Ok(Json(DeleteAlertResponse { id }))
}

fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), AppError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(AppError(SiagaError::Validation(
            "latitude must be between -90 and 90".to_string(),
        )));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(AppError(SiagaError::Validation(
            "longitude must be between -180 and 180".to_string(),
        )));
    }
    Ok(())
}

fn summary_for(users: &HashMap<Uuid, DbUser>, id: Uuid) -> UserSummary {
    let name = users.get(&id).map(|user| user.name.clone()).unwrap_or_default();
    UserSummary { id, name }
}

fn build_alert_response(
    alert: &DbPanicAlert,
    users: &HashMap<Uuid, DbUser>,
) -> Result<AlertResponse, SiagaError> {
    let status = alert.status.parse::<AlertStatus>().map_err(|_| {
        SiagaError::Internal(format!("Alert {} has unknown status {}", alert.id, alert.status).into())
    })?;

    Ok(AlertResponse {
        id: alert.id,
        reporter: summary_for(users, alert.reporter_id),
        latitude: alert.latitude,
        longitude: alert.longitude,
        description: alert.description.clone(),
        status,
        handled_by: alert.handled_by.map(|handler| summary_for(users, handler)),
        handled_at: alert.handled_at,
        created_at: alert.created_at,
    })
}

/// Batch-fetches every user referenced by the given alerts (reporters and
/// handlers) in one query.
async fn load_alert_users(
    pool: &PgPool,
    alerts: &[DbPanicAlert],
) -> Result<HashMap<Uuid, DbUser>, SiagaError> {
    let mut ids: Vec<Uuid> = Vec::new();
    for alert in alerts {
        ids.push(alert.reporter_id);
        if let Some(handler) = alert.handled_by {
            ids.push(handler);
        }
    }
    ids.sort_unstable();
    ids.dedup();

    let users = siaga_db::repositories::users::get_users_by_ids(pool, &ids)
        .await
        .map_err(SiagaError::Database)?;
    Ok(users.into_iter().map(|user| (user.id, user)).collect())
}

/// Contact rows for the resolved roster, kept in duty order so the first
/// volunteer on the roster is the first one notified.
async fn recipients_in_duty_order(
    pool: &PgPool,
    volunteer_ids: &[Uuid],
) -> Result<Vec<Recipient>, SiagaError> {
    let users = siaga_db::repositories::users::get_users_by_ids(pool, volunteer_ids)
        .await
        .map_err(SiagaError::Database)?;
    let by_id: HashMap<Uuid, DbUser> = users.into_iter().map(|user| (user.id, user)).collect();

    Ok(volunteer_ids
        .iter()
        .filter_map(|id| by_id.get(id))
        .map(|user| Recipient {
            volunteer_id: user.id,
            name: user.name.clone(),
            phone: user.phone.clone(),
            email: user.email.clone(),
        })
        .collect())
}
