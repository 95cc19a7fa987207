use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Provider rejected credentials: {0}")]
    AuthFailure(String),
    #[error("Provider request failed: {0}")]
    ProviderRequest(String),
    #[error("Provider request timed out: {0}")]
    ProviderTimeout(String),
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
    #[error("Requested slot is no longer available")]
    SlotUnavailable,
    #[error("No calendar connection for provider {0}")]
    ConnectionNotFound(String),
    #[error("Stored connection has no refresh token; calendar must be reconnected")]
    RefreshTokenMissing,
    #[error("Token encryption error: {0}")]
    Crypto(String),
}
