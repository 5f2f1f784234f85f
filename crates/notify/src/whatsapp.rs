use async_trait::async_trait;
use eyre::{eyre, Result};
use serde::Deserialize;

use crate::message::AlertMessage;
use crate::{Channel, Notifier};

/// WhatsApp delivery through the Fonnte gateway.
pub struct WhatsAppSender {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

/// The fields of Fonnte's response the router acts on. HTTP 200 with
/// `status: false` still means the message was not sent.
#[derive(Debug, Deserialize)]
struct FonnteResponse {
    status: Option<bool>,
    reason: Option<String>,
}

impl WhatsAppSender {
    pub fn new(token: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            base_url,
        }
    }
}

/// Normalizes a phone number to the Indonesian international form Fonnte
/// expects: digits only, `0`-prefixed local numbers rewritten to `62`.
pub fn format_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    if let Some(rest) = digits.strip_prefix('0') {
        format!("62{rest}")
    } else if digits.starts_with("62") {
        digits
    } else {
        format!("62{digits}")
    }
}

#[async_trait]
impl Notifier for WhatsAppSender {
    fn channel(&self) -> Channel {
        Channel::WhatsApp
    }

    async fn send(&self, target: &str, message: &AlertMessage) -> Result<()> {
        let params = [
            ("target", format_phone(target)),
            ("message", message.body.clone()),
            ("countryCode", "62".to_string()),
            ("delay", "1".to_string()),
        ];

        let response = self
            .client
            .post(format!("{}/send", self.base_url))
            .header("Authorization", &self.token)
            .form(&params)
            .send()
            .await?;

        let http_status = response.status();
        if !http_status.is_success() {
            return Err(eyre!("Fonnte returned HTTP {}", http_status));
        }

        let body: FonnteResponse = response.json().await?;
        if body.status != Some(true) {
            let reason = body.reason.unwrap_or_else(|| "no reason given".to_string());
            return Err(eyre!("Fonnte rejected the message: {}", reason));
        }

        tracing::debug!("WhatsApp message delivered to {}", format_phone(target));
        Ok(())
    }
}
