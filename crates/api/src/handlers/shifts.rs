use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Duration, NaiveDate};
use std::collections::HashMap;
use std::sync::Arc;

use siaga_core::{
    alerts::Role,
    errors::SiagaError,
    models::{
        roster::{
            AssignShiftsRequest, DeleteShiftsResponse, GenerateShiftsRequest,
            GenerateShiftsResponse, GeneratedDayResponse, GenerationSummary, MyShiftDay,
            MyShiftsQuery, MyShiftsResponse, OnDutyQuery, OnDutyResponse, ShiftDayResponse,
            ShiftWeekResponse, SkippedDayResponse, WeekViewQuery,
        },
        user::UserSummary,
    },
    roster::{date_range, local_today, resolve_duty, week_start, DayOfWeek, GenerationReport},
};
use siaga_db::models::DbUser;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::{
    handlers::patterns::{dedup_ids, require_relawan, validate_roster_size},
    middleware::{error_handling::AppError, identity::CurrentUser},
    ApiState,
};

#[axum::debug_handler]
pub async fn week_view(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Query(query): Query<WeekViewQuery>,
) -> Result<Json<ShiftWeekResponse>, AppError> {
    user.require_admin()?;

    let start = query
        .start_date
        .unwrap_or_else(|| local_today(state.timezone));
    let end = query.end_date.unwrap_or_else(|| start + Duration::days(6));
    if end < start {
        return Err(AppError(SiagaError::Validation(
            "end_date must be on or after start_date".to_string(),
        )));
    }

    let rows = siaga_db::repositories::shifts::get_shifts_in_range(&state.db_pool, start, end)
        .await
        .map_err(SiagaError::Database)?;

    let mut by_date: HashMap<NaiveDate, Vec<UserSummary>> = HashMap::new();
    for row in rows {
        by_date.entry(row.shift_date).or_default().push(UserSummary {
            id: row.volunteer_id,
            name: row.name,
        });
    }

    let days = date_range(start, end)
        .map(|date| ShiftDayResponse {
            date,
            day_of_week: DayOfWeek::from(date),
            volunteers: by_date.remove(&date).unwrap_or_default(),
        })
        .collect();

    Ok(Json(ShiftWeekResponse {
        start_date: start,
        end_date: end,
        days,
    }))
}

#[axum::debug_handler]
pub async fn assign_shifts(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Path(date): Path<NaiveDate>,
    Json(payload): Json<AssignShiftsRequest>,
) -> Result<Json<ShiftDayResponse>, AppError> {
    user.require_admin()?;

    let volunteer_ids = dedup_ids(&payload.volunteer_ids);
    validate_roster_size(volunteer_ids.len())?;
    require_relawan(&state.db_pool, &volunteer_ids).await?;

    siaga_db::repositories::shifts::replace_shifts_for_date(&state.db_pool, date, &volunteer_ids)
        .await
        .map_err(SiagaError::Database)?;
    info!(
        "Shifts for {} replaced with {} volunteers by {}",
        date,
        volunteer_ids.len(),
        user.id
    );

    let users = siaga_db::repositories::users::get_users_by_ids(&state.db_pool, &volunteer_ids)
        .await
        .map_err(SiagaError::Database)?;
    let by_id: HashMap<Uuid, DbUser> = users.into_iter().map(|user| (user.id, user)).collect();

    Ok(Json(ShiftDayResponse {
        date,
        day_of_week: DayOfWeek::from(date),
        volunteers: volunteer_ids
            .iter()
            .map(|id| summary_for(&by_id, *id))
            .collect(),
    }))
}

#[axum::debug_handler]
pub async fn delete_shifts(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Path(date): Path<NaiveDate>,
) -> Result<Json<DeleteShiftsResponse>, AppError> {
    user.require_admin()?;

    // Deleting a date with no rows is not an error; the response reports zero.
    let removed = siaga_db::repositories::shifts::delete_shifts_for_date(&state.db_pool, date)
        .await
        .map_err(SiagaError::Database)?;
    info!("Removed {} shift rows for {} by {}", removed, date, user.id);

    Ok(Json(DeleteShiftsResponse { date, removed }))
}

#[axum::debug_handler]
pub async fn generate_shifts(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Json(payload): Json<GenerateShiftsRequest>,
) -> Result<Json<GenerateShiftsResponse>, AppError> {
    user.require_admin()?;

    if payload.end_date < payload.start_date {
        return Err(AppError(SiagaError::Validation(
            "end_date must be on or after start_date".to_string(),
        )));
    }
    if payload.start_date < local_today(state.timezone) {
        return Err(AppError(SiagaError::Validation(
            "start_date must not be in the past".to_string(),
        )));
    }

    let report = siaga_db::repositories::shifts::generate_from_patterns(
        &state.db_pool,
        payload.start_date,
        payload.end_date,
        payload.overwrite,
    )
    .await
    .map_err(SiagaError::Database)?;
    info!(
        "Generation for {}..{} by {}: {} generated, {} skipped",
        payload.start_date,
        payload.end_date,
        user.id,
        report.generated.len(),
        report.skipped.len()
    );

    Ok(Json(generation_response(&state.db_pool, report).await?))
}

#[axum::debug_handler]
pub async fn on_duty(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Query(query): Query<OnDutyQuery>,
) -> Result<Json<OnDutyResponse>, AppError> {
    user.require_admin()?;

    let date = query.date.unwrap_or_else(|| local_today(state.timezone));
    let roster = siaga_db::repositories::roster::resolve_on_duty(&state.db_pool, date)
        .await
        .map_err(SiagaError::Database)?;

    let users =
        siaga_db::repositories::users::get_users_by_ids(&state.db_pool, &roster.volunteer_ids)
            .await
            .map_err(SiagaError::Database)?;
    let by_id: HashMap<Uuid, DbUser> = users.into_iter().map(|user| (user.id, user)).collect();

    Ok(Json(OnDutyResponse {
        date,
        source: roster.source,
        volunteers: roster
            .volunteer_ids
            .iter()
            .map(|id| summary_for(&by_id, *id))
            .collect(),
    }))
}

#[axum::debug_handler]
pub async fn my_shifts(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Query(query): Query<MyShiftsQuery>,
) -> Result<Json<MyShiftsResponse>, AppError> {
    if user.role != Role::Relawan {
        return Err(AppError(SiagaError::Authorization(
            "Relawan access required".to_string(),
        )));
    }

    let today = local_today(state.timezone);
    let offset = query.week_offset.unwrap_or(0);
    let start = week_start(today) + Duration::weeks(i64::from(offset));
    let end = start + Duration::days(6);

    let rows = siaga_db::repositories::shifts::get_shifts_in_range(&state.db_pool, start, end)
        .await
        .map_err(SiagaError::Database)?;
    let patterns = siaga_db::repositories::patterns::list_patterns(&state.db_pool)
        .await
        .map_err(SiagaError::Database)?;

    // Each day resolves with the same suppression rule as dispatch: any
    // shift row for the date hides the weekly pattern entirely.
    let mut days = Vec::with_capacity(7);
    for date in date_range(start, end) {
        let day_of_week = DayOfWeek::from(date);
        let shift_ids: Vec<Uuid> = rows
            .iter()
            .filter(|row| row.shift_date == date)
            .map(|row| row.volunteer_id)
            .collect();
        let pattern_ids: Vec<Uuid> = patterns
            .iter()
            .filter(|entry| entry.is_active && entry.day_of_week == day_of_week.as_str())
            .map(|entry| entry.volunteer_id)
            .collect();

        let roster = resolve_duty(&shift_ids, &pattern_ids);
        let scheduled = roster.contains(user.id);
        days.push(MyShiftDay {
            date,
            day_of_week,
            is_today: date == today,
            is_past: date < today,
            scheduled,
            source: scheduled.then_some(roster.source),
        });
    }

    let on_duty_today =
        siaga_db::repositories::roster::is_on_duty(&state.db_pool, user.id, today)
            .await
            .map_err(SiagaError::Database)?;
    let scheduled_days = days.iter().filter(|day| day.scheduled).count();

    Ok(Json(MyShiftsResponse {
        week_start: start,
        week_end: end,
        on_duty_today,
        scheduled_days,
        days,
    }))
}

fn summary_for(users: &HashMap<Uuid, DbUser>, id: Uuid) -> UserSummary {
    let name = users.get(&id).map(|user| user.name.clone()).unwrap_or_default();
    UserSummary { id, name }
}

/// Resolves volunteer names for a generation report. Shared by the manual
/// generate endpoint and the automation force-run.
pub(crate) async fn generation_response(
    pool: &PgPool,
    report: GenerationReport,
) -> Result<GenerateShiftsResponse, SiagaError> {
    let mut ids: Vec<Uuid> = report
        .generated
        .iter()
        .flat_map(|day| day.volunteer_ids.iter().copied())
        .collect();
    ids.sort_unstable();
    ids.dedup();

    let users = siaga_db::repositories::users::get_users_by_ids(pool, &ids)
        .await
        .map_err(SiagaError::Database)?;
    let by_id: HashMap<Uuid, DbUser> = users.into_iter().map(|user| (user.id, user)).collect();

    let generated = report
        .generated
        .iter()
        .map(|day| GeneratedDayResponse {
            date: day.date,
            day_of_week: day.day_of_week,
            volunteers: day
                .volunteer_ids
                .iter()
                .map(|id| summary_for(&by_id, *id))
                .collect(),
            replaced: day.replaced,
        })
        .collect();
    let skipped = report
        .skipped
        .iter()
        .map(|day| SkippedDayResponse {
            date: day.date,
            day_of_week: day.day_of_week,
            reason: day.reason.message().to_string(),
        })
        .collect();
    let summary = GenerationSummary {
        total_days: report.total_days(),
        generated_days: report.generated.len(),
        skipped_days: report.skipped.len(),
    };

    Ok(GenerateShiftsResponse {
        generated,
        skipped,
        summary,
    })
}
