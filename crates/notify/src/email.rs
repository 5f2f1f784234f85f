use async_trait::async_trait;
use eyre::{eyre, Result};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::message::AlertMessage;
use crate::{Channel, Notifier};

/// Email delivery over an authenticated STARTTLS relay.
pub struct EmailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl EmailSender {
    pub fn new(
        host: &str,
        port: u16,
        username: String,
        password: String,
        from: &str,
    ) -> Result<Self> {
        let from = from
            .parse::<Mailbox>()
            .map_err(|e| eyre!("Invalid sender address: {e}"))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
            .port(port)
            .credentials(Credentials::new(username, password))
            .build();

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Notifier for EmailSender {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    async fn send(&self, target: &str, message: &AlertMessage) -> Result<()> {
        let to = target
            .parse::<Mailbox>()
            .map_err(|e| eyre!("Invalid recipient address: {e}"))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())?;

        self.transport.send(email).await?;

        tracing::debug!("Email delivered to {}", target);
        Ok(())
    }
}
