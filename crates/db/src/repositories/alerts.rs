use crate::models::DbPanicAlert;
use chrono::{DateTime, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn create_alert(
    pool: &Pool<Postgres>,
    reporter_id: Uuid,
    latitude: f64,
    longitude: f64,
    description: Option<&str>,
) -> Result<DbPanicAlert> {
    tracing::debug!(
        "Creating panic alert: reporter={}, lat={}, lng={}",
        reporter_id,
        latitude,
        longitude
    );

    let alert = sqlx::query_as::<_, DbPanicAlert>(
        r#"
        INSERT INTO panic_alert (reporter_id, latitude, longitude, description)
        VALUES ($1, $2, $3, $4)
        RETURNING id, reporter_id, latitude, longitude, description, status,
                  handled_by, handled_at, created_at
        "#,
    )
    .bind(reporter_id)
    .bind(latitude)
    .bind(longitude)
    .bind(description)
    .fetch_one(pool)
    .await?;

    Ok(alert)
}

pub async fn get_alert_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbPanicAlert>> {
    let alert = sqlx::query_as::<_, DbPanicAlert>(
        r#"
        SELECT id, reporter_id, latitude, longitude, description, status,
               handled_by, handled_at, created_at
        FROM panic_alert
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(alert)
}

/// The reporter's newest non-resolved alert inside [start, end). Anything
/// short of resolved, cancelled included, blocks a same-day duplicate.
pub async fn find_active_alert_for_reporter(
    pool: &Pool<Postgres>,
    reporter_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Option<DbPanicAlert>> {
    let alert = sqlx::query_as::<_, DbPanicAlert>(
        r#"
        SELECT id, reporter_id, latitude, longitude, description, status,
               handled_by, handled_at, created_at
        FROM panic_alert
        WHERE reporter_id = $1
          AND created_at >= $2 AND created_at < $3
          AND status <> 'resolved'
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(reporter_id)
    .bind(start)
    .bind(end)
    .fetch_optional(pool)
    .await?;

    Ok(alert)
}

pub async fn get_alerts_between(
    pool: &Pool<Postgres>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<DbPanicAlert>> {
    let alerts = sqlx::query_as::<_, DbPanicAlert>(
        r#"
        SELECT id, reporter_id, latitude, longitude, description, status,
               handled_by, handled_at, created_at
        FROM panic_alert
        WHERE created_at >= $1 AND created_at < $2
        ORDER BY created_at DESC
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(alerts)
}

pub async fn list_alerts(
    pool: &Pool<Postgres>,
    status: Option<&str>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    limit: i64,
    offset: i64,
) -> Result<Vec<DbPanicAlert>> {
    let alerts = sqlx::query_as::<_, DbPanicAlert>(
        r#"
        SELECT id, reporter_id, latitude, longitude, description, status,
               handled_by, handled_at, created_at
        FROM panic_alert
        WHERE ($1::text IS NULL OR status = $1)
          AND ($2::timestamptz IS NULL OR created_at >= $2)
          AND ($3::timestamptz IS NULL OR created_at < $3)
        ORDER BY created_at DESC
        LIMIT $4 OFFSET $5
        "#,
    )
    .bind(status)
    .bind(start)
    .bind(end)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(alerts)
}

pub async fn count_alerts(
    pool: &Pool<Postgres>,
    status: Option<&str>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<i64> {
    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM panic_alert
        WHERE ($1::text IS NULL OR status = $1)
          AND ($2::timestamptz IS NULL OR created_at >= $2)
          AND ($3::timestamptz IS NULL OR created_at < $3)
        "#,
    )
    .bind(status)
    .bind(start)
    .bind(end)
    .fetch_one(pool)
    .await?;

    Ok(total)
}

/// Writes the new status; handler fields are only ever filled in, never
/// cleared, so the relawan who first took the alert stays recorded.
pub async fn update_alert_status(
    pool: &Pool<Postgres>,
    id: Uuid,
    status: &str,
    handled_by: Option<Uuid>,
    handled_at: Option<DateTime<Utc>>,
) -> Result<DbPanicAlert> {
    let alert = sqlx::query_as::<_, DbPanicAlert>(
        r#"
        UPDATE panic_alert
        SET status = $2,
            handled_by = COALESCE($3, handled_by),
            handled_at = COALESCE($4, handled_at)
        WHERE id = $1
        RETURNING id, reporter_id, latitude, longitude, description, status,
                  handled_by, handled_at, created_at
        "#,
    )
    .bind(id)
    .bind(status)
    .bind(handled_by)
    .bind(handled_at)
    .fetch_one(pool)
    .await?;

    Ok(alert)
}

pub async fn delete_alert(pool: &Pool<Postgres>, id: Uuid) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM panic_alert
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
