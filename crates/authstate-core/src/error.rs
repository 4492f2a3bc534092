//! Error types for authstate.
//!
//! This module provides a unified error type with explicit variants for
//! identity-provider failures, input validation, and configuration errors.

use thiserror::Error;

/// The unified error type for authstate operations.
///
/// Errors are `Clone` so that a failure payload can be stored inside a
/// [`Session`](crate::Session) snapshot and handed to every observer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The identity provider rejected a call or reported an error event.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Input validation errors (redirect URI, claims).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Configuration errors.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    /// Returns the provider error, if this is one.
    pub fn as_provider(&self) -> Option<&ProviderError> {
        match self {
            Error::Provider(err) => Some(err),
            _ => None,
        }
    }
}

/// Failures reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The authorization server could not be reached.
    #[error("identity provider unavailable: {message}")]
    Unavailable { message: String },

    /// The provider rejected the request or raised an error event.
    #[error("{}", rejected_message(.error, .description))]
    Rejected {
        error: String,
        description: Option<String>,
    },

    /// The token could not be renewed (e.g. the refresh token expired).
    #[error("token refresh failed: {reason}")]
    RefreshFailed { reason: String },

    /// A login or logout redirect could not be issued.
    #[error("redirect failed: {message}")]
    Navigation { message: String },

    /// The provider was used before `init` completed.
    #[error("identity provider not initialized")]
    NotInitialized,
}

impl ProviderError {
    /// Create a rejection without a description.
    pub fn rejected(error: impl Into<String>) -> Self {
        ProviderError::Rejected {
            error: error.into(),
            description: None,
        }
    }
}

fn rejected_message(error: &str, description: &Option<String>) -> String {
    match description {
        Some(description) => format!("{}: {}", error, description),
        None => error.to_string(),
    }
}

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidInputError {
    /// Invalid redirect URI.
    #[error("invalid redirect URI '{value}': {reason}")]
    RedirectUri { value: String, reason: String },

    /// Invalid token claims.
    #[error("invalid claims: {reason}")]
    Claims { reason: String },
}

/// Configuration loading errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The configuration document could not be parsed.
    #[error("failed to parse configuration: {message}")]
    Parse { message: String },

    /// A required environment variable is missing.
    #[error("environment variable {name} is not set")]
    MissingEnv { name: String },

    /// An environment variable holds an unusable value.
    #[error("environment variable {name} is invalid: {reason}")]
    InvalidEnv { name: String, reason: String },
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(ConfigError::from(err))
    }
}
