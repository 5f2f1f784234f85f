use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use uuid::Uuid;

/// A rendered alert, ready for any channel. WhatsApp uses the body alone;
/// email uses both fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub subject: String,
    pub body: String,
}

/// The alert facts the message template needs.
#[derive(Debug, Clone)]
pub struct AlertContext {
    pub alert_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub reporter_name: String,
    pub reporter_phone: Option<String>,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

/// Renders the emergency notification sent to every on-duty volunteer.
/// Timestamps are shown in the roster timezone, not UTC.
pub fn emergency_message(alert: &AlertContext, timezone: Tz, dashboard_url: &str) -> AlertMessage {
    let local_time = alert
        .created_at
        .with_timezone(&timezone)
        .format("%d/%m/%Y %H:%M:%S %Z");

    let mut body = String::new();
    body.push_str("EMERGENCY ALERT - SIAGA\n\n");
    body.push_str("A new report needs immediate attention:\n\n");
    body.push_str(&format!("Time: {local_time}\n"));
    body.push_str(&format!("Reporter: {}\n", alert.reporter_name));
    body.push_str(&format!(
        "Contact: {}\n",
        alert.reporter_phone.as_deref().unwrap_or("not provided")
    ));
    if let Some(description) = &alert.description {
        body.push_str(&format!("Description: {description}\n"));
    }
    body.push_str(&format!(
        "Location: {}, {}\n",
        alert.latitude, alert.longitude
    ));
    body.push_str(&format!(
        "Maps: https://maps.google.com/?q={},{}\n",
        alert.latitude, alert.longitude
    ));
    body.push_str(&format!("\nDashboard: {dashboard_url}\n"));

    AlertMessage {
        subject: format!("[SIAGA] Emergency alert {}", alert.alert_id),
        body,
    }
}
