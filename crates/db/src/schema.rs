use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create users table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name VARCHAR(255) NOT NULL,
            email VARCHAR(255) NOT NULL UNIQUE,
            phone VARCHAR(32) NULL,
            role VARCHAR(32) NOT NULL DEFAULT 'user',
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create weekly_pattern table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS weekly_pattern (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            day_of_week VARCHAR(16) NOT NULL,
            volunteer_id UUID NOT NULL REFERENCES users(id),
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT uq_weekly_pattern_day_volunteer UNIQUE (day_of_week, volunteer_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create shift table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS shift (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            volunteer_id UUID NOT NULL REFERENCES users(id),
            shift_date DATE NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create panic_alert table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS panic_alert (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            reporter_id UUID NOT NULL REFERENCES users(id),
            latitude DOUBLE PRECISION NOT NULL,
            longitude DOUBLE PRECISION NOT NULL,
            description TEXT NULL,
            status VARCHAR(16) NOT NULL DEFAULT 'pending',
            handled_by UUID NULL REFERENCES users(id),
            handled_at TIMESTAMP WITH TIME ZONE NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create app_settings table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS app_settings (
            key VARCHAR(64) PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes; one statement per query, the pool prepares each
    for index in [
        "CREATE INDEX IF NOT EXISTS idx_weekly_pattern_day ON weekly_pattern(day_of_week);",
        "CREATE INDEX IF NOT EXISTS idx_shift_date ON shift(shift_date);",
        "CREATE INDEX IF NOT EXISTS idx_shift_volunteer_date ON shift(volunteer_id, shift_date);",
        "CREATE INDEX IF NOT EXISTS idx_panic_alert_status ON panic_alert(status);",
        "CREATE INDEX IF NOT EXISTS idx_panic_alert_reporter_created ON panic_alert(reporter_id, created_at);",
        "CREATE INDEX IF NOT EXISTS idx_panic_alert_created_at ON panic_alert(created_at);",
        "CREATE INDEX IF NOT EXISTS idx_users_role ON users(role);",
    ] {
        sqlx::query(index).execute(pool).await?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}
