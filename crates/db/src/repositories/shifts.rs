use crate::models::{DbShift, DbShiftWithVolunteer};
use crate::repositories::patterns;
use chrono::NaiveDate;
use eyre::Result;
use siaga_core::roster::{
    date_range, plan_generation_day, DayOfWeek, DayPlan, GeneratedDay, GenerationReport,
    SkippedDay,
};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn get_shifts_for_date(pool: &Pool<Postgres>, date: NaiveDate) -> Result<Vec<DbShift>> {
    let shifts = sqlx::query_as::<_, DbShift>(
        r#"
        SELECT id, volunteer_id, shift_date, created_at
        FROM shift
        WHERE shift_date = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(date)
    .fetch_all(pool)
    .await?;

    Ok(shifts)
}

pub async fn insert_shifts_for_date(
    pool: &Pool<Postgres>,
    date: NaiveDate,
    volunteer_ids: &[Uuid],
) -> Result<Vec<DbShift>> {
    let mut tx = pool.begin().await?;

    let mut shifts = Vec::with_capacity(volunteer_ids.len());
    for volunteer_id in volunteer_ids {
        let shift = sqlx::query_as::<_, DbShift>(
            r#"
            INSERT INTO shift (volunteer_id, shift_date)
            VALUES ($1, $2)
            RETURNING id, volunteer_id, shift_date, created_at
            "#,
        )
        .bind(volunteer_id)
        .bind(date)
        .fetch_one(&mut *tx)
        .await?;
        shifts.push(shift);
    }

    tx.commit().await?;

    Ok(shifts)
}

/// Deletes and reinserts the date's roster in one transaction; the date
/// never observes a partial roster.
pub async fn replace_shifts_for_date(
    pool: &Pool<Postgres>,
    date: NaiveDate,
    volunteer_ids: &[Uuid],
) -> Result<Vec<DbShift>> {
    tracing::debug!(
        "Replacing shifts for {}: {} volunteers",
        date,
        volunteer_ids.len()
    );

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        DELETE FROM shift
        WHERE shift_date = $1
        "#,
    )
    .bind(date)
    .execute(&mut *tx)
    .await?;

    let mut shifts = Vec::with_capacity(volunteer_ids.len());
    for volunteer_id in volunteer_ids {
        let shift = sqlx::query_as::<_, DbShift>(
            r#"
            INSERT INTO shift (volunteer_id, shift_date)
            VALUES ($1, $2)
            RETURNING id, volunteer_id, shift_date, created_at
            "#,
        )
        .bind(volunteer_id)
        .bind(date)
        .fetch_one(&mut *tx)
        .await?;
        shifts.push(shift);
    }

    tx.commit().await?;

    Ok(shifts)
}

pub async fn delete_shifts_for_date(pool: &Pool<Postgres>, date: NaiveDate) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM shift
        WHERE shift_date = $1
        "#,
    )
    .bind(date)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

pub async fn get_shifts_in_range(
    pool: &Pool<Postgres>,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<DbShiftWithVolunteer>> {
    let shifts = sqlx::query_as::<_, DbShiftWithVolunteer>(
        r#"
        SELECT s.shift_date, s.volunteer_id, u.name
        FROM shift s
        JOIN users u ON u.id = s.volunteer_id
        WHERE s.shift_date >= $1 AND s.shift_date <= $2
        ORDER BY s.shift_date ASC, s.created_at ASC
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(shifts)
}

/// Materializes the weekly pattern into shift rows over [start, end].
///
/// Each date is planned from its current rows and the weekday's active
/// pattern, then applied in its own transaction; a failure mid-range keeps
/// the dates already written.
pub async fn generate_from_patterns(
    pool: &Pool<Postgres>,
    start: NaiveDate,
    end: NaiveDate,
    overwrite: bool,
) -> Result<GenerationReport> {
    tracing::debug!(
        "Generating shifts from {} to {} (overwrite={})",
        start,
        end,
        overwrite
    );

    let mut report = GenerationReport::default();

    for date in date_range(start, end) {
        let day_of_week = DayOfWeek::from(date);
        let existing = get_shifts_for_date(pool, date).await?;
        let pattern =
            patterns::get_active_day_volunteers(pool, day_of_week.as_str()).await?;

        match plan_generation_day(!existing.is_empty(), &pattern, overwrite) {
            DayPlan::Skip(reason) => {
                tracing::debug!("Skipping {}: {}", date, reason.message());
                report.skipped.push(SkippedDay {
                    date,
                    day_of_week,
                    reason,
                });
            }
            DayPlan::Insert(volunteer_ids) => {
                insert_shifts_for_date(pool, date, &volunteer_ids).await?;
                report.generated.push(GeneratedDay {
                    date,
                    day_of_week,
                    volunteer_ids,
                    replaced: false,
                });
            }
            DayPlan::Replace(volunteer_ids) => {
                replace_shifts_for_date(pool, date, &volunteer_ids).await?;
                report.generated.push(GeneratedDay {
                    date,
                    day_of_week,
                    volunteer_ids,
                    replaced: true,
                });
            }
        }
    }

    tracing::debug!(
        "Generation finished: {} generated, {} skipped",
        report.generated.len(),
        report.skipped.len()
    );

    Ok(report)
}
