use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::ValidateEmail;

use crate::email::EmailError;

/// An address with an optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mailbox {
    pub address: String,
    pub name: Option<String>,
}

impl Mailbox {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.name = if name.is_empty() { None } else { Some(name) };
        self
    }

    pub fn validate(&self) -> Result<(), EmailError> {
        if self.address.validate_email() {
            Ok(())
        } else {
            Err(EmailError::InvalidEmail(self.address.clone()))
        }
    }
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} <{}>", name, self.address),
            None => write!(f, "{}", self.address),
        }
    }
}

/// Parses `addr` or `Display Name <addr>`.
impl FromStr for Mailbox {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mailbox = match (s.rfind('<'), s.ends_with('>')) {
            (Some(open), true) => {
                let address = s[open + 1..s.len() - 1].trim();
                let name = s[..open].trim().trim_matches('"').trim();
                Mailbox::new(address).with_name(name)
            }
            (None, false) => Mailbox::new(s),
            _ => return Err(EmailError::InvalidEmail(s.to_string())),
        };
        mailbox.validate()?;
        Ok(mailbox)
    }
}

/// A provider-independent outbound message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailMessage {
    pub from: Mailbox,
    pub to: Vec<Mailbox>,
    pub reply_to: Vec<String>,
    pub subject: String,
    pub html: String,
    pub text: String,
}

impl EmailMessage {
    pub fn new(from: Mailbox, to: Mailbox, subject: impl Into<String>) -> Self {
        Self {
            from,
            to: vec![to],
            reply_to: Vec::new(),
            subject: subject.into(),
            html: String::new(),
            text: String::new(),
        }
    }

    pub fn with_recipient(mut self, to: Mailbox) -> Self {
        self.to.push(to);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = html.into();
        self
    }

    pub fn with_reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to.push(reply_to.into());
        self
    }

    /// Checks the invariants every transport relies on. Runs before any
    /// network traffic.
    pub fn validate(&self) -> Result<(), EmailError> {
        if self.from.address.trim().is_empty() {
            return Err(EmailError::ValidationError(
                "sender address is missing".to_string(),
            ));
        }
        self.from.validate()?;

        if self.to.is_empty() {
            return Err(EmailError::ValidationError(
                "at least one recipient is required".to_string(),
            ));
        }
        for recipient in &self.to {
            recipient.validate()?;
        }

        if let Some(reply_to) = self.first_reply_to() {
            Mailbox::new(reply_to).validate()?;
        }

        Ok(())
    }

    /// HTML rendering of the message, falling back to the text body.
    pub fn html_or_text(&self) -> &str {
        if self.html.is_empty() {
            &self.text
        } else {
            &self.html
        }
    }

    pub fn first_reply_to(&self) -> Option<&str> {
        self.reply_to.first().map(String::as_str)
    }
}

/// Acknowledgment returned once the provider accepted a transmission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    pub id: Option<String>,
    pub accepted_recipients: u64,
    pub rejected_recipients: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> EmailMessage {
        EmailMessage::new(
            Mailbox::new("jane@x.com").with_name("Jane Doe"),
            Mailbox::new("bob@y.com").with_name("Bob"),
            "Hello",
        )
    }

    #[test]
    fn test_mailbox_parse_plain_address() {
        let mailbox: Mailbox = "bob@example.com".parse().unwrap();
        assert_eq!(mailbox.address, "bob@example.com");
        assert_eq!(mailbox.name, None);
    }

    #[test]
    fn test_mailbox_parse_with_name() {
        let mailbox: Mailbox = "\"Jane Doe\" <jane@example.com>".parse().unwrap();
        assert_eq!(mailbox.address, "jane@example.com");
        assert_eq!(mailbox.name.as_deref(), Some("Jane Doe"));
        assert_eq!(mailbox.to_string(), "Jane Doe <jane@example.com>");
    }

    #[test]
    fn test_mailbox_parse_rejects_garbage() {
        assert!("not an address".parse::<Mailbox>().is_err());
        assert!("Jane <jane@example.com".parse::<Mailbox>().is_err());
    }

    #[test]
    fn test_validate_accepts_well_formed_message() {
        assert!(message().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_recipients() {
        let mut msg = message();
        msg.to.clear();
        assert!(matches!(
            msg.validate(),
            Err(EmailError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_missing_sender() {
        let mut msg = message();
        msg.from = Mailbox::new("");
        assert!(matches!(
            msg.validate(),
            Err(EmailError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_recipient_address() {
        let msg = message().with_recipient(Mailbox::new("bob-at-example"));
        let err = msg.validate().unwrap_err();
        assert!(err.is_validation());
        assert!(matches!(err, EmailError::InvalidEmail(addr) if addr == "bob-at-example"));
    }

    #[test]
    fn test_validate_rejects_bad_reply_to() {
        let msg = message().with_reply_to("support at x");
        assert!(matches!(
            msg.validate(),
            Err(EmailError::InvalidEmail(addr)) if addr == "support at x"
        ));

        let msg = message().with_reply_to("support@x.com");
        assert!(msg.validate().is_ok());
    }

    #[test]
    fn test_html_falls_back_to_text() {
        let msg = message().with_text("Hi Bob");
        assert_eq!(msg.html_or_text(), "Hi Bob");

        let msg = msg.with_html("<p>Hi Bob</p>");
        assert_eq!(msg.html_or_text(), "<p>Hi Bob</p>");
    }

    #[test]
    fn test_first_reply_to() {
        let msg = message();
        assert_eq!(msg.first_reply_to(), None);

        let msg = msg
            .with_reply_to("first@x.com")
            .with_reply_to("second@x.com");
        assert_eq!(msg.first_reply_to(), Some("first@x.com"));
    }
}
