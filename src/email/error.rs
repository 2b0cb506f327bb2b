use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("Email configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid email message: {0}")]
    ValidationError(String),

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("SparkPost error ({code}): {message}")]
    ProviderError { code: u32, message: String },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Unexpected provider response: {0}")]
    ResponseError(String),

    #[error("Email send cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml_edit::de::Error),
}

impl EmailError {
    /// True when the message was rejected before anything left the process.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EmailError::ValidationError(_) | EmailError::InvalidEmail(_)
        )
    }
}
