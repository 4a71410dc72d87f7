use http::StatusCode;
use relay_core::HttpError;
use thiserror::Error;

/// Errors that can occur while preparing or relaying a chat stream
#[derive(Debug, Error)]
pub enum AgentError {
    /// Client sent a request that does not describe a valid chat
    #[error("invalid request: {0}")]
    Validation(String),

    /// Named provider does not exist in configuration
    #[error("provider not found: {provider}")]
    ProviderNotFound { provider: String },

    /// Provider answered with a failure
    #[error("provider error{}: {message}", status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Provider {
        /// HTTP status from the provider, absent for in-stream error events
        status: Option<u16>,
        message: String,
    },

    /// Transport failure talking to the provider, before or during streaming
    #[error("network error: {0}")]
    Network(String),

    /// Provider answered without an event stream
    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),

    /// Unexpected internal error
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl HttpError for AgentError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ProviderNotFound { .. } => StatusCode::NOT_FOUND,
            Self::Provider { .. } | Self::Network(_) | Self::UnexpectedShape(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::ProviderNotFound { .. } => "not_found_error",
            Self::Provider { .. } => "provider_error",
            Self::Network(_) => "network_error",
            Self::UnexpectedShape(_) => "unexpected_shape_error",
            Self::Internal(_) => "internal_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Internal(_) => "an internal error occurred".to_owned(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for AgentError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}
