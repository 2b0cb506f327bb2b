pub mod config;
pub mod error;
pub mod mime;
pub mod providers;
pub mod types;

pub use config::*;
pub use error::*;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Submits `message` once. Messages that fail validation never reach
    /// the network.
    async fn send_email(&self, message: &EmailMessage) -> Result<DeliveryReceipt, EmailError>;

    fn name(&self) -> &str;

    /// Like [`MailTransport::send_email`], but gives up with
    /// [`EmailError::Cancelled`] as soon as `cancel` fires. The in-flight
    /// request is dropped, which aborts it.
    async fn send_email_cancellable(
        &self,
        message: &EmailMessage,
        cancel: &CancellationToken,
    ) -> Result<DeliveryReceipt, EmailError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!("Email send via {} cancelled", self.name());
                Err(EmailError::Cancelled)
            }
            result = self.send_email(message) => result,
        }
    }
}

pub type DynMailTransport = Arc<dyn MailTransport>;

pub fn create_transport(config: &EmailProviderConfig) -> Result<DynMailTransport, EmailError> {
    match config {
        EmailProviderConfig::SparkPost(sparkpost_config) => Ok(Arc::new(
            providers::sparkpost::SparkPostProvider::new(sparkpost_config)?,
        )),
        EmailProviderConfig::Null => Ok(Arc::new(providers::null::NullProvider::new())),
    }
}
