//! Error types and handling for the `AgroClim` dashboard

use std::collections::HashMap;
use thiserror::Error;

/// Machine-readable error codes attached to API errors.
///
/// Commands match on these to decide between "retry later" advice and
/// "fix your setup" advice in the rendered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Backend rejected the credentials (HTTP 401/403)
    ApiUnauthorized,
    /// Requested resource does not exist (HTTP 404)
    ApiNotFound,
    /// Backend rate limit hit (HTTP 429)
    ApiRateLimit,
    /// Transport-level failure (DNS, connect, timeout, 5xx after retries)
    ApiNetworkError,
    /// Backend answered 2xx but the body could not be understood
    ApiInvalidResponse,
}

/// Main error type for the `AgroClim` application
#[derive(Error, Debug)]
pub enum AgroClimError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Backend API communication errors
    #[error("API error: {message}")]
    Api {
        message: String,
        code: ErrorCode,
        context: HashMap<String, String>,
    },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Cache operation errors
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl AgroClimError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error with a network-error code and no context
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
            code: ErrorCode::ApiNetworkError,
            context: HashMap::new(),
        }
    }

    /// Create a new API error carrying a code and diagnostic context
    pub fn api_with_context<S: Into<String>>(
        message: S,
        code: ErrorCode,
        context: HashMap<String, String>,
    ) -> Self {
        Self::Api {
            message: message.into(),
            code,
            context,
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// The API error code, if this is an API error.
    #[must_use]
    pub fn api_code(&self) -> Option<ErrorCode> {
        match self {
            AgroClimError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            AgroClimError::Config { .. } => {
                "Configuration error. Please check your config file and backend settings."
                    .to_string()
            }
            AgroClimError::Api { message, code, .. } => match code {
                ErrorCode::ApiUnauthorized => {
                    "The backend rejected your credentials. Please check your access token."
                        .to_string()
                }
                ErrorCode::ApiNotFound => format!("Not found: {message}"),
                ErrorCode::ApiRateLimit => {
                    "The backend is rate limiting requests. Please try again shortly.".to_string()
                }
                ErrorCode::ApiNetworkError => {
                    "Unable to reach the dashboard backend. Please check your internet connection."
                        .to_string()
                }
                ErrorCode::ApiInvalidResponse => {
                    format!("The backend sent a response we could not understand: {message}")
                }
            },
            AgroClimError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            AgroClimError::Cache { .. } => {
                "Cache operation failed. You may need to clear your cache.".to_string()
            }
            AgroClimError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
            AgroClimError::General { message } => message.clone(),
        }
    }
}
