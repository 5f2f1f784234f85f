use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbPatternEntry {
    pub id: Uuid,
    pub day_of_week: String,
    pub volunteer_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbShift {
    pub id: Uuid,
    pub volunteer_id: Uuid,
    pub shift_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Shift row joined with the volunteer's name, for range views.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbShiftWithVolunteer {
    pub shift_date: NaiveDate,
    pub volunteer_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbPanicAlert {
    pub id: Uuid,
    pub reporter_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub description: Option<String>,
    pub status: String,
    pub handled_by: Option<Uuid>,
    pub handled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSetting {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}
