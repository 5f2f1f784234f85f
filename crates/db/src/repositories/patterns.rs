use crate::models::DbPatternEntry;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn list_patterns(pool: &Pool<Postgres>) -> Result<Vec<DbPatternEntry>> {
    let entries = sqlx::query_as::<_, DbPatternEntry>(
        r#"
        SELECT id, day_of_week, volunteer_id, is_active, created_at
        FROM weekly_pattern
        ORDER BY day_of_week, created_at ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

pub async fn get_day_entries(pool: &Pool<Postgres>, day: &str) -> Result<Vec<DbPatternEntry>> {
    let entries = sqlx::query_as::<_, DbPatternEntry>(
        r#"
        SELECT id, day_of_week, volunteer_id, is_active, created_at
        FROM weekly_pattern
        WHERE day_of_week = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(day)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

/// Volunteer ids feeding roster resolution and shift generation; inactive
/// entries are excluded here, not downstream.
pub async fn get_active_day_volunteers(pool: &Pool<Postgres>, day: &str) -> Result<Vec<Uuid>> {
    let volunteer_ids = sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT volunteer_id
        FROM weekly_pattern
        WHERE day_of_week = $1 AND is_active = TRUE
        ORDER BY created_at ASC
        "#,
    )
    .bind(day)
    .fetch_all(pool)
    .await?;

    Ok(volunteer_ids)
}

/// Swaps the whole day roster in one transaction, so concurrent readers
/// never observe a half-replaced day.
pub async fn replace_day(
    pool: &Pool<Postgres>,
    day: &str,
    volunteer_ids: &[Uuid],
) -> Result<Vec<DbPatternEntry>> {
    tracing::debug!(
        "Replacing pattern for {}: {} volunteers",
        day,
        volunteer_ids.len()
    );

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        DELETE FROM weekly_pattern
        WHERE day_of_week = $1
        "#,
    )
    .bind(day)
    .execute(&mut *tx)
    .await?;

    let mut entries = Vec::with_capacity(volunteer_ids.len());
    for volunteer_id in volunteer_ids {
        let entry = sqlx::query_as::<_, DbPatternEntry>(
            r#"
            INSERT INTO weekly_pattern (day_of_week, volunteer_id)
            VALUES ($1, $2)
            RETURNING id, day_of_week, volunteer_id, is_active, created_at
            "#,
        )
        .bind(day)
        .bind(volunteer_id)
        .fetch_one(&mut *tx)
        .await?;
        entries.push(entry);
    }

    tx.commit().await?;

    Ok(entries)
}

pub async fn add_entry(
    pool: &Pool<Postgres>,
    day: &str,
    volunteer_id: Uuid,
) -> Result<DbPatternEntry> {
    let entry = sqlx::query_as::<_, DbPatternEntry>(
        r#"
        INSERT INTO weekly_pattern (day_of_week, volunteer_id)
        VALUES ($1, $2)
        RETURNING id, day_of_week, volunteer_id, is_active, created_at
        "#,
    )
    .bind(day)
    .bind(volunteer_id)
    .fetch_one(pool)
    .await?;

    Ok(entry)
}

pub async fn get_entry(
    pool: &Pool<Postgres>,
    day: &str,
    volunteer_id: Uuid,
) -> Result<Option<DbPatternEntry>> {
    let entry = sqlx::query_as::<_, DbPatternEntry>(
        r#"
        SELECT id, day_of_week, volunteer_id, is_active, created_at
        FROM weekly_pattern
        WHERE day_of_week = $1 AND volunteer_id = $2
        "#,
    )
    .bind(day)
    .bind(volunteer_id)
    .fetch_optional(pool)
    .await?;

    Ok(entry)
}

pub async fn get_entry_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbPatternEntry>> {
    let entry = sqlx::query_as::<_, DbPatternEntry>(
        r#"
        SELECT id, day_of_week, volunteer_id, is_active, created_at
        FROM weekly_pattern
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(entry)
}

pub async fn remove_entry(pool: &Pool<Postgres>, day: &str, volunteer_id: Uuid) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM weekly_pattern
        WHERE day_of_week = $1 AND volunteer_id = $2
        "#,
    )
    .bind(day)
    .bind(volunteer_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Rewrites one entry to a different volunteer, keeping its activation flag
/// and position. Returns None when the old volunteer has no entry that day.
pub async fn swap_entry(
    pool: &Pool<Postgres>,
    day: &str,
    old_volunteer_id: Uuid,
    new_volunteer_id: Uuid,
) -> Result<Option<DbPatternEntry>> {
    let entry = sqlx::query_as::<_, DbPatternEntry>(
        r#"
        UPDATE weekly_pattern
        SET volunteer_id = $3
        WHERE day_of_week = $1 AND volunteer_id = $2
        RETURNING id, day_of_week, volunteer_id, is_active, created_at
        "#,
    )
    .bind(day)
    .bind(old_volunteer_id)
    .bind(new_volunteer_id)
    .fetch_optional(pool)
    .await?;

    Ok(entry)
}

pub async fn set_entry_active(
    pool: &Pool<Postgres>,
    id: Uuid,
    is_active: bool,
) -> Result<Option<DbPatternEntry>> {
    let entry = sqlx::query_as::<_, DbPatternEntry>(
        r#"
        UPDATE weekly_pattern
        SET is_active = $2
        WHERE id = $1
        RETURNING id, day_of_week, volunteer_id, is_active, created_at
        "#,
    )
    .bind(id)
    .bind(is_active)
    .fetch_optional(pool)
    .await?;

    Ok(entry)
}
