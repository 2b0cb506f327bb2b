use serde::{Deserialize, Serialize};

use crate::email::{EmailError, Mailbox};

pub const SPARKPOST_US_ENDPOINT: &str = "https://api.sparkpost.com/api/v1";
pub const SPARKPOST_EU_ENDPOINT: &str = "https://api.eu.sparkpost.com/api/v1";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmailConfig {
    pub from_address: String,
    pub from_name: Option<String>,
    pub reply_to: Option<String>,
    #[serde(flatten)]
    pub provider: EmailProviderConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum EmailProviderConfig {
    SparkPost(SparkPostConfig),
    Null,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SparkPostConfig {
    pub api_key: String,
    #[serde(default)]
    pub region: SparkPostRegion,
    /// Overrides the region's API base URL, e.g. for an enterprise account.
    pub endpoint: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SparkPostRegion {
    #[default]
    Us,
    Eu,
}

fn default_timeout_secs() -> u64 {
    30
}

impl SparkPostConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            region: SparkPostRegion::default(),
            endpoint: None,
            timeout_secs: default_timeout_secs(),
        }
    }

    /// API base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        let url = match (&self.endpoint, self.region) {
            (Some(endpoint), _) => endpoint.as_str(),
            (None, SparkPostRegion::Us) => SPARKPOST_US_ENDPOINT,
            (None, SparkPostRegion::Eu) => SPARKPOST_EU_ENDPOINT,
        };
        url.trim_end_matches('/')
    }

    pub fn transmissions_url(&self) -> Result<url::Url, EmailError> {
        let raw = format!("{}/transmissions", self.base_url());
        url::Url::parse(&raw)
            .map_err(|e| EmailError::ConfigError(format!("Invalid SparkPost endpoint {}: {}", raw, e)))
    }
}

impl EmailConfig {
    pub fn format_from(&self) -> String {
        self.sender().to_string()
    }

    /// Replaces the configured sender, e.g. with one given on the command line.
    pub fn override_sender(&mut self, sender: Mailbox) {
        self.from_address = sender.address;
        self.from_name = sender.name;
    }

    pub fn sender(&self) -> Mailbox {
        let mailbox = Mailbox::new(self.from_address.clone());
        match &self.from_name {
            Some(name) => mailbox.with_name(name.clone()),
            None => mailbox,
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            from_address: "noreply@example.com".to_string(),
            from_name: None,
            reply_to: None,
            provider: EmailProviderConfig::Null,
        }
    }
}
