use thiserror::Error;

use crate::action_type::ActionType;

/// Whether a failure is correctable by the caller or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad input: invalid type token, malformed fields, quota, missing record.
    Client,
    /// Persistence, locking, plugin or configuration failure.
    Server,
}

/// Error surfaced by every action management operation.
#[derive(Debug, Error)]
pub enum ActionMgtError {
    /// The supplied type token does not name a known action type.
    #[error("invalid action type: {0}")]
    InvalidActionType(String),

    /// A field failed validation.
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// The tenant already holds the maximum number of actions of this type.
    #[error("maximum number of actions ({max}) reached for action type {action_type}")]
    QuotaExceeded { action_type: ActionType, max: u32 },

    /// No action with the given id exists under the given type.
    #[error("no action configured for type {action_type} with id {id}")]
    NotFound { action_type: ActionType, id: String },

    /// An action with the given id already exists.
    #[error("action already exists: {0}")]
    Conflict(String),

    /// The persistence backend failed.
    #[error("store error: {0}")]
    Store(String),

    /// A type-specific plugin failed unexpectedly.
    #[error("plugin error: {0}")]
    Plugin(String),

    /// A serialization lock could not be acquired.
    #[error("lock acquisition failed: {0}")]
    Lock(String),

    /// The service was misconfigured.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ActionMgtError {
    /// Build a validation error for the named field.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Classify the error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidActionType(_)
            | Self::Validation { .. }
            | Self::QuotaExceeded { .. }
            | Self::NotFound { .. }
            | Self::Conflict(_) => ErrorCategory::Client,
            Self::Store(_) | Self::Plugin(_) | Self::Lock(_) | Self::Configuration(_) => {
                ErrorCategory::Server
            }
        }
    }

    /// Returns `true` if the caller can correct the request and retry.
    pub fn is_client_error(&self) -> bool {
        self.category() == ErrorCategory::Client
    }

    /// Name of the offending field for validation errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}
