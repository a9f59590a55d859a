/// Error types for the Machine Translation module
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MtError {
    /// A language code that cannot be sent to a provider
    #[error("Invalid locale: {0}")]
    InvalidLocale(String),
    /// Provider misconfiguration (missing key, rejected credentials, bad request)
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// Transport failure while talking to the provider
    #[error("Network error: {0}")]
    NetworkError(String),
    /// The provider failed to translate
    #[error("Translation error: {0}")]
    TranslationError(String),
}

impl From<reqwest::Error> for MtError {
    fn from(err: reqwest::Error) -> Self {
        MtError::NetworkError(err.to_string())
    }
}

/// Result type for MT operations
pub type MtResult<T> = Result<T, MtError>;
