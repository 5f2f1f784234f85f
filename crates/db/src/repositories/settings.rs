use crate::models::DbSetting;
use chrono::{DateTime, Utc};
use eyre::Result;
use sqlx::pool::PoolConnection;
use sqlx::{Pool, Postgres};

pub const AUTOMATION_ENABLED_KEY: &str = "shift_automation_enabled";
pub const LAST_GENERATION_KEY: &str = "last_shift_generation";

/// Advisory-lock key shared by every process that runs shift generation.
pub const GENERATION_LOCK_KEY: i64 = 0x5349_4147;

pub async fn get_setting(pool: &Pool<Postgres>, key: &str) -> Result<Option<String>> {
    let value = sqlx::query_scalar::<_, String>(
        r#"
        SELECT value
        FROM app_settings
        WHERE key = $1
        "#,
    )
    .bind(key)
    .fetch_optional(pool)
    .await?;

    Ok(value)
}

pub async fn set_setting(pool: &Pool<Postgres>, key: &str, value: &str) -> Result<DbSetting> {
    let setting = sqlx::query_as::<_, DbSetting>(
        r#"
        INSERT INTO app_settings (key, value, updated_at)
        VALUES ($1, $2, NOW())
        ON CONFLICT (key)
        DO UPDATE SET value = $2, updated_at = NOW()
        RETURNING key, value, updated_at
        "#,
    )
    .bind(key)
    .bind(value)
    .fetch_one(pool)
    .await?;

    Ok(setting)
}

/// Whether the daily generation trigger should run. An absent row reads as
/// enabled; only an explicit "false" disables it.
pub async fn automation_enabled(pool: &Pool<Postgres>) -> Result<bool> {
    let setting = get_setting(pool, AUTOMATION_ENABLED_KEY).await?;

    Ok(setting.map_or(true, |value| value.trim() != "false"))
}

pub async fn set_automation_enabled(pool: &Pool<Postgres>, enabled: bool) -> Result<DbSetting> {
    let value = if enabled { "true" } else { "false" };

    set_setting(pool, AUTOMATION_ENABLED_KEY, value).await
}

pub async fn last_generation_at(pool: &Pool<Postgres>) -> Result<Option<DateTime<Utc>>> {
    let Some(value) = get_setting(pool, LAST_GENERATION_KEY).await? else {
        return Ok(None);
    };

    match DateTime::parse_from_rfc3339(&value) {
        Ok(at) => Ok(Some(at.with_timezone(&Utc))),
        Err(e) => {
            tracing::warn!("Stored {} is not a timestamp: {}", LAST_GENERATION_KEY, e);
            Ok(None)
        }
    }
}

pub async fn record_generation_run(pool: &Pool<Postgres>, at: DateTime<Utc>) -> Result<DbSetting> {
    set_setting(pool, LAST_GENERATION_KEY, &at.to_rfc3339()).await
}

/// Tries to take the cross-process generation lock. Returns the connection
/// holding it; the lock lives exactly as long as that session, so the caller
/// must keep the connection alive for the whole run and release it after.
pub async fn try_generation_lock(
    pool: &Pool<Postgres>,
) -> Result<Option<PoolConnection<Postgres>>> {
    let mut conn = pool.acquire().await?;

    let acquired = sqlx::query_scalar::<_, bool>("SELECT pg_try_advisory_lock($1)")
        .bind(GENERATION_LOCK_KEY)
        .fetch_one(&mut *conn)
        .await?;

    if acquired {
        Ok(Some(conn))
    } else {
        Ok(None)
    }
}

/// Releases the lock before the connection returns to the pool; pooled
/// sessions outlive the run and would otherwise keep holding it.
pub async fn release_generation_lock(conn: &mut PoolConnection<Postgres>) -> Result<()> {
    sqlx::query("SELECT pg_advisory_unlock($1)")
        .bind(GENERATION_LOCK_KEY)
        .execute(&mut **conn)
        .await?;

    Ok(())
}
