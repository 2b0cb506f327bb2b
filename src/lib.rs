use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod email;
pub mod startup_checks;

use email::{EmailConfig, EmailError};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,
    pub email: EmailConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub name: String,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "sparkpost-mailer".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, EmailError> {
        Ok(toml_edit::de::from_str::<Config>(content)?)
    }

    pub async fn load_from_file(path: &Path) -> Result<Self, EmailError> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_toml(&content)
    }
}
