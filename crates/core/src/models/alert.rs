use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::alerts::{AlertStatus, EmergencyContact};
use crate::models::user::UserSummary;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAlertRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertResponse {
    pub id: Uuid,
    pub reporter: UserSummary,
    pub latitude: f64,
    pub longitude: f64,
    pub description: Option<String>,
    pub status: AlertStatus,
    pub handled_by: Option<UserSummary>,
    pub handled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryFailureResponse {
    pub volunteer_id: Uuid,
    /// "whatsapp" or "email"; absent when no channel was usable at all.
    pub channel: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAlertResponse {
    pub alert: AlertResponse,
    pub notified: Vec<Uuid>,
    pub delivery_failures: Vec<DeliveryFailureResponse>,
    /// Present when nobody was on duty: the alert is still recorded, but
    /// the reporter should call these numbers directly.
    pub fallback_contacts: Option<Vec<EmergencyContact>>,
}

/// Conflict body returned when the reporter already has an active alert
/// for the current local day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateAlertResponse {
    pub error: String,
    pub existing_alert: AlertResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAlertStatusRequest {
    pub status: AlertStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodayAlertsResponse {
    pub date: NaiveDate,
    pub alerts: Vec<AlertResponse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListAlertsQuery {
    pub date: Option<NaiveDate>,
    pub status: Option<AlertStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListAlertsResponse {
    pub alerts: Vec<AlertResponse>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteAlertResponse {
    pub id: Uuid,
}
