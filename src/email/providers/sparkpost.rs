pub mod payload;

use async_trait::async_trait;
use reqwest::{
    Client, StatusCode,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderValue},
};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::email::{DeliveryReceipt, EmailError, EmailMessage, MailTransport, SparkPostConfig};
use payload::{TransmissionPayload, TransmissionResponse, capitalize_first, parse_error_body};

pub struct SparkPostProvider {
    client: Client,
    api_key: HeaderValue,
    transmissions_url: url::Url,
}

impl SparkPostProvider {
    pub fn new(config: &SparkPostConfig) -> Result<Self, EmailError> {
        let api_key = config.api_key.trim();
        if api_key.is_empty() {
            return Err(EmailError::ConfigError(
                "SparkPost API key not configured".to_string(),
            ));
        }

        let mut api_key = HeaderValue::from_str(api_key).map_err(|_| {
            EmailError::ConfigError(
                "SparkPost API key contains characters not allowed in a header".to_string(),
            )
        })?;
        api_key.set_sensitive(true);

        if config.timeout_secs == 0 {
            return Err(EmailError::ConfigError(
                "SparkPost request timeout must be at least one second".to_string(),
            ));
        }

        let transmissions_url = config.transmissions_url()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EmailError::ConfigError(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            transmissions_url,
        })
    }

    pub fn transmissions_url(&self) -> &url::Url {
        &self.transmissions_url
    }

    async fn failure_from_response(response: reqwest::Response) -> EmailError {
        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return network_error(e),
        };
        let failure = parse_error_body(&body);

        let code = failure.code.unwrap_or_else(|| u32::from(status.as_u16()));
        let message = failure
            .message
            .unwrap_or_else(|| fallback_message(status, &body));

        EmailError::ProviderError {
            code,
            message: capitalize_first(&message),
        }
    }
}

fn fallback_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if !body.is_empty() && body.len() <= 200 {
        return body.to_string();
    }
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.to_string())
}

fn network_error(e: reqwest::Error) -> EmailError {
    let kind = if e.is_timeout() {
        "request timed out"
    } else if e.is_connect() {
        "could not connect"
    } else {
        "request failed"
    };
    EmailError::NetworkError(format!("SparkPost {}: {}", kind, e))
}

#[async_trait]
impl MailTransport for SparkPostProvider {
    async fn send_email(&self, message: &EmailMessage) -> Result<DeliveryReceipt, EmailError> {
        message.validate()?;

        let payload = TransmissionPayload::from(message);
        debug!(
            "Sending transmission via SparkPost to {} recipient(s)",
            payload.recipients.len()
        );

        let response = self
            .client
            .post(self.transmissions_url.clone())
            .header(AUTHORIZATION, self.api_key.clone())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to reach SparkPost: {}", e);
                network_error(e)
            })?;

        if !response.status().is_success() {
            let err = Self::failure_from_response(response).await;
            error!("SparkPost rejected transmission: {}", err);
            return Err(err);
        }

        let body = response.text().await.map_err(network_error)?;
        let acknowledgment: TransmissionResponse = serde_json::from_str(&body).map_err(|e| {
            error!("Malformed SparkPost acknowledgment: {}", e);
            EmailError::ResponseError(e.to_string())
        })?;

        let receipt = DeliveryReceipt::from(acknowledgment);
        info!(
            "Transmission accepted by SparkPost. ID: {:?}, accepted: {}, rejected: {}",
            receipt.id, receipt.accepted_recipients, receipt.rejected_recipients
        );
        Ok(receipt)
    }

    fn name(&self) -> &str {
        "SparkPost"
    }
}
