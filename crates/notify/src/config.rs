use eyre::{eyre, Result};
use std::env;

/// Configuration for alert delivery channels.
///
/// Every channel is optional; the service runs with whatever subset the
/// environment provides, down to none at all (alerts are then recorded
/// without outbound notification and the delivery failures say so).
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    /// Fonnte API token; WhatsApp delivery is disabled when absent.
    pub fonnte_token: Option<String>,
    /// Fonnte endpoint, overridable for tests and self-hosted relays.
    pub fonnte_base_url: String,
    /// SMTP relay; email delivery is disabled when absent.
    pub smtp: Option<SmtpConfig>,
    /// Sender mailbox for outbound alert email.
    pub mail_from: String,
    /// Volunteer dashboard link embedded in alert messages.
    pub dashboard_url: String,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl NotifyConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let fonnte_token = env::var("FONNTE_TOKEN").ok();

        let fonnte_base_url = env::var("FONNTE_BASE_URL")
            .unwrap_or_else(|_| "https://api.fonnte.com".to_string());

        let smtp = match env::var("SMTP_HOST").ok() {
            Some(host) => {
                let port = env::var("SMTP_PORT")
                    .unwrap_or_else(|_| "587".to_string())
                    .parse::<u16>()
                    .map_err(|_| eyre!("SMTP_PORT must be a valid port number"))?;

                let username = env::var("SMTP_USERNAME")
                    .map_err(|_| eyre!("SMTP_USERNAME must be set when SMTP_HOST is set"))?;

                let password = env::var("SMTP_PASSWORD")
                    .map_err(|_| eyre!("SMTP_PASSWORD must be set when SMTP_HOST is set"))?;

                Some(SmtpConfig {
                    host,
                    port,
                    username,
                    password,
                })
            }
            None => None,
        };

        let mail_from = env::var("MAIL_FROM")
            .unwrap_or_else(|_| "SIAGA Alerts <alerts@siaga.localhost>".to_string());

        let dashboard_url =
            env::var("DASHBOARD_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        Ok(Self {
            fonnte_token,
            fonnte_base_url,
            smtp,
            mail_from,
            dashboard_url,
        })
    }
}
