use crate::email::{DeliveryReceipt, EmailError, EmailMessage, MailTransport};
use async_trait::async_trait;
use tracing::info;

pub struct NullProvider;

impl NullProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NullProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MailTransport for NullProvider {
    async fn send_email(&self, message: &EmailMessage) -> Result<DeliveryReceipt, EmailError> {
        message.validate()?;

        let recipients = message
            .to
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        let body_preview = message.html_or_text().chars().take(200).collect::<String>();

        // Log the email that would have been sent
        info!(
            "NULL EMAIL PROVIDER - Would send email:\n\
             From: {}\n\
             To: {}\n\
             Reply-To: {}\n\
             Subject: {}\n\
             Body (first 200 chars): {}{}",
            message.from,
            recipients,
            message.first_reply_to().unwrap_or("(none)"),
            message.subject,
            body_preview,
            if message.html_or_text().chars().count() > 200 { "..." } else { "" }
        );

        tracing::debug!(
            "NULL EMAIL PROVIDER - Full email message:\n\
             From: {}\n\
             To: {:?}\n\
             Reply-To: {:?}\n\
             Subject: {}\n\
             Text:\n{}\n\nHTML:\n{}",
            message.from,
            message.to,
            message.reply_to,
            message.subject,
            message.text,
            message.html
        );

        Ok(DeliveryReceipt {
            id: None,
            accepted_recipients: message.to.len() as u64,
            rejected_recipients: 0,
        })
    }

    fn name(&self) -> &str {
        "Null Email Provider (Logging Only)"
    }
}
