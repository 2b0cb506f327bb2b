use crate::Config;
use crate::email::{EmailProviderConfig, Mailbox};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum StartupCheckError {
    #[error("SparkPost API key is empty")]
    ApiKeyMissing,

    #[error("Sender address is invalid: {0}")]
    InvalidSender(String),

    #[error("Reply-to address is invalid: {0}")]
    InvalidReplyTo(String),

    #[error("SparkPost endpoint is invalid: {0}")]
    InvalidEndpoint(String),

    #[error("Request timeout must be at least one second")]
    ZeroTimeout,
}

pub fn perform_startup_checks(config: &Config) -> Result<(), Vec<StartupCheckError>> {
    let mut errors = Vec::new();

    info!("Performing startup checks...");

    let email = &config.email;
    match email.sender().validate() {
        Ok(()) => info!("Sender address: {}", email.format_from()),
        Err(e) => {
            error!("Sender address check failed: {}", e);
            errors.push(StartupCheckError::InvalidSender(email.from_address.clone()));
        }
    }

    if let Some(reply_to) = &email.reply_to
        && let Err(e) = Mailbox::new(reply_to.clone()).validate()
    {
        error!("Reply-to address check failed: {}", e);
        errors.push(StartupCheckError::InvalidReplyTo(reply_to.clone()));
    }

    match &email.provider {
        EmailProviderConfig::SparkPost(sparkpost) => {
            if sparkpost.api_key.trim().is_empty() {
                error!("SparkPost API key is not configured");
                errors.push(StartupCheckError::ApiKeyMissing);
            }

            match sparkpost.transmissions_url() {
                Ok(url) => info!("SparkPost transmissions endpoint: {}", url),
                Err(e) => {
                    error!("{}", e);
                    errors.push(StartupCheckError::InvalidEndpoint(
                        sparkpost.base_url().to_string(),
                    ));
                }
            }

            if sparkpost.timeout_secs == 0 {
                errors.push(StartupCheckError::ZeroTimeout);
            }
        }
        EmailProviderConfig::Null => {
            warn!("Null email provider configured; messages will only be logged");
        }
    }

    if errors.is_empty() {
        info!("All startup checks passed");
        Ok(())
    } else {
        error!("Startup checks failed with {} errors", errors.len());
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::email::{EmailConfig, SparkPostConfig};

    fn sparkpost_config(sparkpost: SparkPostConfig) -> Config {
        Config {
            email: EmailConfig {
                from_address: "jane@example.com".to_string(),
                from_name: Some("Jane".to_string()),
                reply_to: None,
                provider: EmailProviderConfig::SparkPost(sparkpost),
            },
            ..Config::default()
        }
    }

    #[test]
    fn test_default_config_passes() {
        assert!(perform_startup_checks(&Config::default()).is_ok());
    }

    #[test]
    fn test_valid_sparkpost_config_passes() {
        let config = sparkpost_config(SparkPostConfig::new("abc123"));
        assert!(perform_startup_checks(&config).is_ok());
    }

    #[test]
    fn test_overridden_sender_is_the_one_checked() {
        let mut config = sparkpost_config(SparkPostConfig::new("abc123"));
        config.email.from_address = "not-an-address".to_string();
        assert!(matches!(
            perform_startup_checks(&config).unwrap_err().as_slice(),
            [StartupCheckError::InvalidSender(_)]
        ));

        config
            .email
            .override_sender("Jane <jane@example.com>".parse().unwrap());
        assert!(perform_startup_checks(&config).is_ok());

        config.email.override_sender(Mailbox::new("jane at example"));
        assert!(perform_startup_checks(&config).is_err());
    }

    #[test]
    fn test_all_problems_are_reported() {
        let mut config = sparkpost_config(SparkPostConfig {
            endpoint: Some("::nope::".to_string()),
            timeout_secs: 0,
            ..SparkPostConfig::new("")
        });
        config.email.from_address = "jane".to_string();
        config.email.reply_to = Some("also wrong".to_string());

        let errors = perform_startup_checks(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(matches!(errors[0], StartupCheckError::InvalidSender(_)));
        assert!(matches!(errors[1], StartupCheckError::InvalidReplyTo(_)));
        assert!(matches!(errors[2], StartupCheckError::ApiKeyMissing));
        assert!(matches!(errors[3], StartupCheckError::InvalidEndpoint(_)));
        assert!(matches!(errors[4], StartupCheckError::ZeroTimeout));
    }
}
