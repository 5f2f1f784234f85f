use axum::{
    extract::{Path, State},
    Json,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use siaga_core::{
    alerts::Role,
    errors::SiagaError,
    models::{
        roster::{
            AddPatternMemberRequest, CopyDayPatternRequest, DayPatternResponse,
            ListPatternsResponse, PatternEntryResponse, SetDayPatternRequest,
            SetPatternActiveRequest, SwapPatternMemberRequest,
        },
        user::{ListRelawanResponse, UserResponse, UserSummary},
    },
    roster::DayOfWeek,
};
use siaga_db::models::{DbPatternEntry, DbUser};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::{
    middleware::{error_handling::AppError, identity::CurrentUser},
    ApiState,
};

#[axum::debug_handler]
pub async fn list_patterns(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
) -> Result<Json<ListPatternsResponse>, AppError> {
    user.require_admin()?;

    let entries = siaga_db::repositories::patterns::list_patterns(&state.db_pool)
        .await
        .map_err(SiagaError::Database)?;
    let ids: Vec<Uuid> = entries.iter().map(|entry| entry.volunteer_id).collect();
    let users = load_volunteers(&state.db_pool, &ids).await?;

    let days = DayOfWeek::ALL
        .into_iter()
        .map(|day| DayPatternResponse {
            day_of_week: day,
            entries: entries
                .iter()
                .filter(|entry| entry.day_of_week == day.as_str())
                .map(|entry| entry_response(entry, &users))
                .collect(),
        })
        .collect();

    Ok(Json(ListPatternsResponse { days }))
}

#[axum::debug_handler]
pub async fn get_day_pattern(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Path(day): Path<String>,
) -> Result<Json<DayPatternResponse>, AppError> {
    user.require_admin()?;
    let day = day.parse::<DayOfWeek>()?;

    Ok(Json(refreshed_day(&state.db_pool, day).await?))
}

#[axum::debug_handler]
pub async fn set_day_pattern(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Path(day): Path<String>,
    Json(payload): Json<SetDayPatternRequest>,
) -> Result<Json<DayPatternResponse>, AppError> {
    user.require_admin()?;
    let day = day.parse::<DayOfWeek>()?;

    let volunteer_ids = dedup_ids(&payload.volunteer_ids);
    validate_roster_size(volunteer_ids.len())?;
    require_relawan(&state.db_pool, &volunteer_ids).await?;

    siaga_db::repositories::patterns::replace_day(&state.db_pool, day.as_str(), &volunteer_ids)
        .await
        .map_err(SiagaError::Database)?;
    info!(
        "Pattern for {} replaced with {} volunteers by {}",
        day,
        volunteer_ids.len(),
        user.id
    );

    Ok(Json(refreshed_day(&state.db_pool, day).await?))
}

#[axum::debug_handler]
pub async fn add_pattern_member(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Path(day): Path<String>,
    Json(payload): Json<AddPatternMemberRequest>,
) -> Result<Json<DayPatternResponse>, AppError> {
    user.require_admin()?;
    let day = day.parse::<DayOfWeek>()?;

    require_relawan(&state.db_pool, std::slice::from_ref(&payload.volunteer_id)).await?;

    let entries = siaga_db::repositories::patterns::get_day_entries(&state.db_pool, day.as_str())
        .await
        .map_err(SiagaError::Database)?;
    if entries.len() >= 4 {
        return Err(AppError(SiagaError::Validation(
            "A day pattern holds at most 4 volunteers".to_string(),
        )));
    }
    if entries
        .iter()
        .any(|entry| entry.volunteer_id == payload.volunteer_id)
    {
        return Err(AppError(SiagaError::Conflict(format!(
            "Volunteer is already in the {day} pattern"
        ))));
    }

    siaga_db::repositories::patterns::add_entry(&state.db_pool, day.as_str(), payload.volunteer_id)
        .await
        .map_err(SiagaError::Database)?;
    info!(
        "Volunteer {} added to the {} pattern by {}",
        payload.volunteer_id, day, user.id
    );

    Ok(Json(refreshed_day(&state.db_pool, day).await?))
}

#[axum::debug_handler]
pub async fn remove_pattern_member(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Path((day, volunteer_id)): Path<(String, Uuid)>,
) -> Result<Json<DayPatternResponse>, AppError> {
    user.require_admin()?;
    let day = day.parse::<DayOfWeek>()?;

    let removed =
        siaga_db::repositories::patterns::remove_entry(&state.db_pool, day.as_str(), volunteer_id)
            .await
            .map_err(SiagaError::Database)?;
    if removed == 0 {
        return Err(AppError(SiagaError::NotFound(format!(
            "Volunteer is not in the {day} pattern"
        ))));
    }
    info!(
        "Volunteer {} removed from the {} pattern by {}",
        volunteer_id, day, user.id
    );

    Ok(Json(refreshed_day(&state.db_pool, day).await?))
}

#[axum::debug_handler]
pub async fn swap_pattern_member(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Path(day): Path<String>,
    Json(payload): Json<SwapPatternMemberRequest>,
) -> Result<Json<DayPatternResponse>, AppError> {
    user.require_admin()?;
    let day = day.parse::<DayOfWeek>()?;

    require_relawan(
        &state.db_pool,
        std::slice::from_ref(&payload.new_volunteer_id),
    )
    .await?;

    let replacement = siaga_db::repositories::patterns::get_entry(
        &state.db_pool,
        day.as_str(),
        payload.new_volunteer_id,
    )
    .await
    .map_err(SiagaError::Database)?;
    if replacement.is_some() {
        return Err(AppError(SiagaError::Conflict(format!(
            "Volunteer is already in the {day} pattern"
        ))));
    }

    let swapped = siaga_db::repositories::patterns::swap_entry(
        &state.db_pool,
        day.as_str(),
        payload.old_volunteer_id,
        payload.new_volunteer_id,
    )
    .await
    .map_err(SiagaError::Database)?;
    if swapped.is_none() {
        return Err(AppError(SiagaError::NotFound(format!(
            "Volunteer is not in the {day} pattern"
        ))));
    }
    info!(
        "Volunteer {} swapped for {} in the {} pattern by {}",
        payload.old_volunteer_id, payload.new_volunteer_id, day, user.id
    );

    Ok(Json(refreshed_day(&state.db_pool, day).await?))
}

#[axum::debug_handler]
pub async fn copy_day_pattern(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Json(payload): Json<CopyDayPatternRequest>,
) -> Result<Json<DayPatternResponse>, AppError> {
    user.require_admin()?;

    let CopyDayPatternRequest {
        from_day,
        to_day,
        overwrite,
    } = payload;
    if from_day == to_day {
        return Err(AppError(SiagaError::Validation(
            "from_day and to_day must differ".to_string(),
        )));
    }

    let source = siaga_db::repositories::patterns::get_active_day_volunteers(
        &state.db_pool,
        from_day.as_str(),
    )
    .await
    .map_err(SiagaError::Database)?;
    if source.is_empty() {
        return Err(AppError(SiagaError::Validation(format!(
            "Day {from_day} has no active pattern entries to copy"
        ))));
    }

    let target = siaga_db::repositories::patterns::get_day_entries(&state.db_pool, to_day.as_str())
        .await
        .map_err(SiagaError::Database)?;
    if !target.is_empty() && !overwrite {
        return Err(AppError(SiagaError::Conflict(format!(
            "Day {to_day} already has a pattern; set overwrite to replace it"
        ))));
    }

    siaga_db::repositories::patterns::replace_day(&state.db_pool, to_day.as_str(), &source)
        .await
        .map_err(SiagaError::Database)?;
    info!(
        "Pattern copied from {} to {} by {}",
        from_day, to_day, user.id
    );

    Ok(Json(refreshed_day(&state.db_pool, to_day).await?))
}

#[axum::debug_handler]
pub async fn set_pattern_entry_active(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetPatternActiveRequest>,
) -> Result<Json<DayPatternResponse>, AppError> {
    user.require_admin()?;

    let entry =
        siaga_db::repositories::patterns::set_entry_active(&state.db_pool, id, payload.is_active)
            .await
            .map_err(SiagaError::Database)?
            .ok_or_else(|| {
                SiagaError::NotFound(format!("Pattern entry with ID {id} not found"))
            })?;

    let day = entry.day_of_week.parse::<DayOfWeek>().map_err(|_| {
        SiagaError::Internal(
            format!("Pattern entry {} has unknown day {}", entry.id, entry.day_of_week).into(),
        )
    })?;
    info!(
        "Pattern entry {} set {} by {}",
        id,
        if payload.is_active { "active" } else { "inactive" },
        user.id
    );

    Ok(Json(refreshed_day(&state.db_pool, day).await?))
}

#[axum::debug_handler]
pub async fn list_relawan(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
) -> Result<Json<ListRelawanResponse>, AppError> {
    user.require_admin()?;

    let users = siaga_db::repositories::users::list_relawan(&state.db_pool)
        .await
        .map_err(SiagaError::Database)?;
    let relawan = users
        .into_iter()
        .map(|db_user| {
            let role = db_user.role.parse::<Role>().map_err(|_| {
                SiagaError::Internal(
                    format!("User {} has unknown role {}", db_user.id, db_user.role).into(),
                )
            })?;
            Ok(UserResponse {
                id: db_user.id,
                name: db_user.name,
                email: db_user.email,
                phone: db_user.phone,
                role,
            })
        })
        .collect::<Result<Vec<_>, SiagaError>>()?;

    Ok(Json(ListRelawanResponse { relawan }))
}

pub(crate) fn dedup_ids(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

pub(crate) fn validate_roster_size(count: usize) -> Result<(), AppError> {
    if !(1..=4).contains(&count) {
        return Err(AppError(SiagaError::Validation(
            "volunteer_ids must contain between 1 and 4 volunteers".to_string(),
        )));
    }
    Ok(())
}

/// Every id must reference an existing user with role relawan; anything else
/// is a validation error, not a partial assignment.
pub(crate) async fn require_relawan(pool: &PgPool, volunteer_ids: &[Uuid]) -> Result<(), SiagaError> {
    let users = siaga_db::repositories::users::get_users_by_ids(pool, volunteer_ids)
        .await
        .map_err(SiagaError::Database)?;

    for id in volunteer_ids {
        let Some(db_user) = users.iter().find(|user| user.id == *id) else {
            return Err(SiagaError::Validation(format!(
                "Volunteer {id} does not exist"
            )));
        };
        if db_user.role != Role::Relawan.as_str() {
            return Err(SiagaError::Validation(format!(
                "User {} is not a relawan",
                db_user.id
            )));
        }
    }
    Ok(())
}

fn entry_response(entry: &DbPatternEntry, users: &HashMap<Uuid, DbUser>) -> PatternEntryResponse {
    let name = users
        .get(&entry.volunteer_id)
        .map(|user| user.name.clone())
        .unwrap_or_default();
    PatternEntryResponse {
        id: entry.id,
        volunteer: UserSummary {
            id: entry.volunteer_id,
            name,
        },
        is_active: entry.is_active,
    }
}

async fn load_volunteers(
    pool: &PgPool,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, DbUser>, SiagaError> {
    let unique = dedup_ids(ids);
    let users = siaga_db::repositories::users::get_users_by_ids(pool, &unique)
        .await
        .map_err(SiagaError::Database)?;
    Ok(users.into_iter().map(|user| (user.id, user)).collect())
}

/// Re-reads the day after a mutation so the response reflects exactly what
/// the store now holds.
async fn refreshed_day(pool: &PgPool, day: DayOfWeek) -> Result<DayPatternResponse, SiagaError> {
    let entries = siaga_db::repositories::patterns::get_day_entries(pool, day.as_str())
        .await
        .map_err(SiagaError::Database)?;
    let ids: Vec<Uuid> = entries.iter().map(|entry| entry.volunteer_id).collect();
    let users = load_volunteers(pool, &ids).await?;

    Ok(DayPatternResponse {
        day_of_week: day,
        entries: entries
            .iter()
            .map(|entry| entry_response(entry, &users))
            .collect(),
    })
}
