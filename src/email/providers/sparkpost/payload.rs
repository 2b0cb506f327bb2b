use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::email::mime::{decode_header_text, encode_header_text};
use crate::email::{DeliveryReceipt, EmailMessage, Mailbox};

/// Body of `POST /transmissions`.
#[derive(Debug, Clone, Serialize)]
pub struct TransmissionPayload {
    pub content: TransmissionContent,
    pub recipients: Vec<Recipient>,
    #[serde(rename = "replyTo", skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransmissionContent {
    pub from: NamedAddress,
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recipient {
    pub address: NamedAddress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedAddress {
    pub name: String,
    pub email: String,
}

impl From<&Mailbox> for NamedAddress {
    fn from(mailbox: &Mailbox) -> Self {
        Self {
            name: mailbox
                .name
                .as_deref()
                .map(encode_header_text)
                .unwrap_or_default(),
            email: mailbox.address.clone(),
        }
    }
}

impl From<&EmailMessage> for TransmissionPayload {
    fn from(message: &EmailMessage) -> Self {
        Self {
            content: TransmissionContent {
                from: NamedAddress::from(&message.from),
                subject: decode_header_text(&message.subject),
                html: message.html_or_text().to_string(),
                text: message.text.clone(),
            },
            recipients: message
                .to
                .iter()
                .map(|mailbox| Recipient {
                    address: mailbox.into(),
                })
                .collect(),
            reply_to: message.first_reply_to().map(str::to_string),
        }
    }
}

/// Successful `POST /transmissions` response.
#[derive(Debug, Deserialize)]
pub struct TransmissionResponse {
    pub results: TransmissionResults,
}

#[derive(Debug, Default, Deserialize)]
pub struct TransmissionResults {
    pub id: Option<String>,
    #[serde(default)]
    pub total_accepted_recipients: u64,
    #[serde(default)]
    pub total_rejected_recipients: u64,
}

impl From<TransmissionResponse> for DeliveryReceipt {
    fn from(response: TransmissionResponse) -> Self {
        DeliveryReceipt {
            id: response.results.id,
            accepted_recipients: response.results.total_accepted_recipients,
            rejected_recipients: response.results.total_rejected_recipients,
        }
    }
}

/// Code and message pulled out of an error response body.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ProviderFailure {
    pub code: Option<u32>,
    pub message: Option<String>,
}

/// Reads either the flat `{"code", "message"}` shape or the documented
/// `{"errors": [{"code", "message", "description"}]}` shape. The first
/// entry of `errors` wins.
pub fn parse_error_body(body: &str) -> ProviderFailure {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return ProviderFailure::default();
    };

    let entry = match value.get("errors").and_then(Value::as_array) {
        Some(errors) => match errors.first() {
            Some(first) => first,
            None => return ProviderFailure::default(),
        },
        None => &value,
    };

    let code = entry.get("code").and_then(|code| match code {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    });

    let message = entry
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.trim().is_empty())
        .map(|message| match entry.get("description").and_then(Value::as_str) {
            Some(description) if !description.trim().is_empty() => {
                format!("{}: {}", message.trim(), description.trim())
            }
            _ => message.trim().to_string(),
        });

    ProviderFailure { code, message }
}

/// Upper-cases the first character so provider messages read consistently.
pub fn capitalize_first(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
