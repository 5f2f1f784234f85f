use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};
use uuid::Uuid;

pub mod config;
pub mod email;
pub mod message;
pub mod whatsapp;

use crate::config::NotifyConfig;
use crate::message::AlertMessage;

/// Delivery channels for emergency alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    WhatsApp,
    Email,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::WhatsApp => "whatsapp",
            Channel::Email => "email",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One way of delivering an alert message to a single target address.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn channel(&self) -> Channel;

    async fn send(&self, target: &str, message: &AlertMessage) -> eyre::Result<()>;
}

/// An on-duty volunteer to notify, with the contact points on record.
#[derive(Debug, Clone)]
pub struct Recipient {
    pub volunteer_id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFailure {
    pub volunteer_id: Uuid,
    /// None when the recipient had no usable contact channel at all.
    pub channel: Option<Channel>,
    pub reason: String,
}

/// Outcome of one alert dispatch across all recipients.
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    pub notified: Vec<Uuid>,
    pub failures: Vec<DeliveryFailure>,
}

/// Routes one alert to every recipient over the best channel available:
/// WhatsApp when the recipient has a phone number and a WhatsApp sender is
/// configured, email otherwise. A failed or impossible delivery is recorded
/// and the remaining recipients are still attempted.
pub struct AlertRouter {
    whatsapp: Option<Box<dyn Notifier>>,
    email: Option<Box<dyn Notifier>>,
}

impl AlertRouter {
    pub fn new(whatsapp: Option<Box<dyn Notifier>>, email: Option<Box<dyn Notifier>>) -> Self {
        Self { whatsapp, email }
    }

    /// Builds the router from whatever channels the environment configures.
    /// A channel that fails to initialize is logged and left out; alert
    /// creation must keep working with the channels that remain.
    pub fn from_config(config: &NotifyConfig) -> Self {
        let whatsapp = config.fonnte_token.as_ref().map(|token| {
            Box::new(whatsapp::WhatsAppSender::new(
                token.clone(),
                config.fonnte_base_url.clone(),
            )) as Box<dyn Notifier>
        });

        let email = config.smtp.as_ref().and_then(|smtp| {
            match email::EmailSender::new(
                &smtp.host,
                smtp.port,
                smtp.username.clone(),
                smtp.password.clone(),
                &config.mail_from,
            ) {
                Ok(sender) => Some(Box::new(sender) as Box<dyn Notifier>),
                Err(e) => {
                    warn!("Email channel disabled: {}", e);
                    None
                }
            }
        });

        Self { whatsapp, email }
    }

    pub fn active_channels(&self) -> Vec<Channel> {
        let mut channels = Vec::new();
        if self.whatsapp.is_some() {
            channels.push(Channel::WhatsApp);
        }
        if self.email.is_some() {
            channels.push(Channel::Email);
        }
        channels
    }

    pub async fn dispatch(
        &self,
        message: &AlertMessage,
        recipients: &[Recipient],
    ) -> DispatchReport {
        let mut report = DispatchReport::default();

        for recipient in recipients {
            let Some((notifier, target)) = self.channel_for(recipient) else {
                warn!("No usable contact channel for {}", recipient.name);
                report.failures.push(DeliveryFailure {
                    volunteer_id: recipient.volunteer_id,
                    channel: None,
                    reason: "no usable contact channel".to_string(),
                });
                continue;
            };

            match notifier.send(&target, message).await {
                Ok(()) => {
                    info!("Notified {} via {}", recipient.name, notifier.channel());
                    report.notified.push(recipient.volunteer_id);
                }
                Err(e) => {
                    warn!(
                        "Failed to notify {} via {}: {}",
                        recipient.name,
                        notifier.channel(),
                        e
                    );
                    report.failures.push(DeliveryFailure {
                        volunteer_id: recipient.volunteer_id,
                        channel: Some(notifier.channel()),
                        reason: e.to_string(),
                    });
                }
            }
        }

        report
    }

    fn channel_for(&self, recipient: &Recipient) -> Option<(&dyn Notifier, String)> {
        if let (Some(whatsapp), Some(phone)) = (&self.whatsapp, &recipient.phone) {
            return Some((whatsapp.as_ref(), phone.clone()));
        }
        if let Some(email) = &self.email {
            return Some((email.as_ref(), recipient.email.clone()));
        }
        None
    }
}
