use crate::repositories::patterns;
use chrono::NaiveDate;
use eyre::Result;
use siaga_core::roster::{resolve_duty, DayOfWeek, DutyRoster};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn shift_volunteers_for_date(
    pool: &Pool<Postgres>,
    date: NaiveDate,
) -> Result<Vec<Uuid>> {
    let volunteer_ids = sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT volunteer_id
        FROM shift
        WHERE shift_date = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(date)
    .fetch_all(pool)
    .await?;

    Ok(volunteer_ids)
}

/// The effective on-duty set for one date. Fetches both sources and lets
/// the resolver apply the shift-over-pattern priority.
pub async fn resolve_on_duty(pool: &Pool<Postgres>, date: NaiveDate) -> Result<DutyRoster> {
    let shift_volunteers = shift_volunteers_for_date(pool, date).await?;
    let pattern_volunteers =
        patterns::get_active_day_volunteers(pool, DayOfWeek::from(date).as_str()).await?;

    Ok(resolve_duty(&shift_volunteers, &pattern_volunteers))
}

/// Membership in the resolved set. A pattern entry alone does not put a
/// volunteer on duty on a date that has shift rows.
pub async fn is_on_duty(
    pool: &Pool<Postgres>,
    volunteer_id: Uuid,
    date: NaiveDate,
) -> Result<bool> {
    let roster = resolve_on_duty(pool, date).await?;

    Ok(roster.contains(volunteer_id))
}
