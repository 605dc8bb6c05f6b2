//! Error taxonomy.
//!
//! [`RestError`] is the closed set of expected failures a resource can report.
//! Every variant carries an HTTP status and converts into a
//! [`RestResult`](crate::RestResult) holding an [`ErrorEnvelope`].
//!
//! | Kind | Status |
//! |---|---|
//! | `BadRequest` | 400 |
//! | `NotAuthorized` | 401 |
//! | `NotAllowed` | 403 |
//! | `NotFound` | 404 |
//! | `AlreadyExists` | 409 |
//! | `Validation` | 400 |
//! | `Custom` | chosen by the resource |
//!
//! Failures outside the taxonomy travel as [`HandlerError::Unhandled`] and are
//! never turned into a result by the dispatcher.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::verb::Verb;

/// Result type returned by resource operations and action handlers.
pub type HandlerResult = Result<crate::Outcome, HandlerError>;

/// Classification of a [`RestError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed request (unknown verb, bad body, bad filter).
    BadRequest,
    /// The authorization hook rejected the request.
    NotAuthorized,
    /// The resource does not support the requested operation.
    NotAllowed,
    /// The addressed item or action does not exist.
    NotFound,
    /// An item with the same primary key already exists.
    AlreadyExists,
    /// The payload was rejected by the validator.
    Validation,
    /// A resource-defined kind with its own status.
    Custom,
}

impl ErrorKind {
    /// Machine-readable code used in error envelopes.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::BadRequest => "BAD_REQUEST",
            Self::NotAuthorized => "NOT_AUTHORIZED",
            Self::NotAllowed => "NOT_ALLOWED",
            Self::NotFound => "NOT_FOUND",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::Validation => "VALIDATION_ERROR",
            Self::Custom => "CUSTOM",
        }
    }
}

/// Expected, status-bearing failure of a REST operation.
///
/// # Example
///
/// ```
/// use rested_core::{ErrorKind, RestError};
/// use http::StatusCode;
///
/// let err = RestError::not_found_item("users", "42");
/// assert_eq!(err.kind(), ErrorKind::NotFound);
/// assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
/// assert!(err.to_string().contains("42"));
/// ```
#[derive(Error, Debug, Clone)]
pub enum RestError {
    /// Malformed request.
    #[error("Bad request: {message}")]
    BadRequest {
        /// Human-readable error message.
        message: String,
    },

    /// Authorization hook returned false.
    #[error("Not authorized: {message}")]
    NotAuthorized {
        /// Human-readable error message.
        message: String,
    },

    /// Operation not supported by the resource.
    #[error("Not allowed: {message}")]
    NotAllowed {
        /// Human-readable error message.
        message: String,
    },

    /// Item or action not found.
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
        /// Resource name, when the missing thing is an item.
        resource: Option<String>,
        /// Primary key of the missing item.
        key: Option<String>,
    },

    /// Primary key collision on create.
    #[error("Already exists: {message}")]
    AlreadyExists {
        /// Human-readable error message.
        message: String,
        /// Resource name.
        resource: Option<String>,
        /// The colliding primary key.
        key: Option<String>,
    },

    /// Payload rejected by validation.
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable error message.
        message: String,
        /// Field-level messages.
        #[source]
        field_errors: Option<FieldErrors>,
    },

    /// Resource-defined error kind.
    #[error("{message}")]
    Custom {
        /// Status to respond with.
        status: StatusCode,
        /// Machine-readable code.
        code: String,
        /// Human-readable error message.
        message: String,
        /// Structured detail payload.
        details: Option<serde_json::Value>,
    },
}

impl RestError {
    /// Creates a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Creates a not authorized error with the default message.
    #[must_use]
    pub fn not_authorized() -> Self {
        Self::NotAuthorized {
            message: "Not Authorized".to_string(),
        }
    }

    /// Creates a not allowed error.
    #[must_use]
    pub fn not_allowed(message: impl Into<String>) -> Self {
        Self::NotAllowed {
            message: message.into(),
        }
    }

    /// Creates a not allowed error naming the rejected verb.
    #[must_use]
    pub fn verb_not_allowed(resource: &str, verb: Verb) -> Self {
        Self::not_allowed(format!("{resource} does not support {verb} here"))
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            resource: None,
            key: None,
        }
    }

    /// Creates a not found error for a specific item.
    #[must_use]
    pub fn not_found_item(resource: impl Into<String>, key: impl Into<String>) -> Self {
        let resource = resource.into();
        let key = key.into();
        Self::NotFound {
            message: format!("{resource} with key '{key}' not found"),
            resource: Some(resource),
            key: Some(key),
        }
    }

    /// Creates an already-exists error for a specific item.
    #[must_use]
    pub fn already_exists(resource: impl Into<String>, key: Option<String>) -> Self {
        let resource = resource.into();
        let message = match &key {
            Some(key) => format!("{resource} with key '{key}' already exists"),
            None => format!("{resource} already exists"),
        };
        Self::AlreadyExists {
            message,
            resource: Some(resource),
            key,
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: None,
        }
    }

    /// Creates a validation error with field-level messages.
    #[must_use]
    pub fn validation_with_fields(message: impl Into<String>, field_errors: FieldErrors) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: Some(field_errors),
        }
    }

    /// Creates a resource-defined error.
    #[must_use]
    pub fn custom(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Custom {
            status,
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Attaches a detail payload to a [`RestError::Custom`]. Other kinds
    /// derive their details from their own fields and are returned unchanged.
    #[must_use]
    pub fn with_details(mut self, value: serde_json::Value) -> Self {
        if let Self::Custom { details, .. } = &mut self {
            *details = Some(value);
        }
        self
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::BadRequest { .. } => ErrorKind::BadRequest,
            Self::NotAuthorized { .. } => ErrorKind::NotAuthorized,
            Self::NotAllowed { .. } => ErrorKind::NotAllowed,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Custom { .. } => ErrorKind::Custom,
        }
    }

    /// Returns the canonical status for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } | Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::NotAuthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::NotAllowed { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::AlreadyExists { .. } => StatusCode::CONFLICT,
            Self::Custom { status, .. } => *status,
        }
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest { message }
            | Self::NotAuthorized { message }
            | Self::NotAllowed { message }
            | Self::NotFound { message, .. }
            | Self::AlreadyExists { message, .. }
            | Self::Validation { message, .. }
            | Self::Custom { message, .. } => message,
        }
    }

    /// Converts this error to a serializable envelope.
    #[must_use]
    pub fn to_envelope(&self) -> ErrorEnvelope {
        let code = match self {
            Self::Custom { code, .. } => code.clone(),
            other => other.kind().code().to_string(),
        };

        ErrorEnvelope {
            error: ErrorDetail {
                code,
                message: self.message().to_string(),
                kind: self.kind(),
                details: self.details(),
            },
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Validation {
                field_errors: Some(errors),
                ..
            } => serde_json::to_value(errors).ok(),
            Self::NotFound {
                resource: Some(resource),
                key: Some(key),
                ..
            }
            | Self::AlreadyExists {
                resource: Some(resource),
                key: Some(key),
                ..
            } => Some(serde_json::json!({
                "resource": resource,
                "key": key,
            })),
            Self::Custom { details, .. } => details.clone(),
            _ => None,
        }
    }
}

/// Field-level validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("Field validation errors")]
pub struct FieldErrors {
    /// Map of field path to its error messages.
    pub fields: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error for a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the number of fields with errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

/// Serializable error body placed in a [`RestResult`](crate::RestResult).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorDetail,
}

/// Error detail within an envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Error kind.
    pub kind: ErrorKind,
    /// Additional structured details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Failure raised by a resource operation or action handler.
///
/// `Rest` errors are expected and become results; `Unhandled` errors are
/// defects or collaborator failures and propagate out of dispatch.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// A taxonomy error.
    #[error(transparent)]
    Rest(#[from] RestError),

    /// Anything else.
    #[error("unhandled failure: {0}")]
    Unhandled(#[source] anyhow::Error),
}

impl HandlerError {
    /// Wraps an unclassified failure.
    pub fn unhandled(err: impl Into<anyhow::Error>) -> Self {
        Self::Unhandled(err.into())
    }
}

impl From<anyhow::Error> for HandlerError {
    fn from(err: anyhow::Error) -> Self {
        Self::Unhandled(err)
    }
}

/// Configuration fault detected while a resource type is being defined.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// Two actions share the same `(verb, path)` key.
    #[error("{resource} already has an action for {method} '{path}'")]
    DuplicateAction {
        /// Resource name.
        resource: String,
        /// Verb of the duplicated key.
        method: Verb,
        /// Path suffix of the duplicated key (empty for verb-only actions).
        path: String,
    },

    /// An action path suffix is malformed.
    #[error("{resource} action path '{path}' is invalid: {reason}")]
    InvalidActionPath {
        /// Resource name.
        resource: String,
        /// The rejected path suffix.
        path: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Actions were declared against a resource type that was later replaced,
    /// so their handlers can no longer be called.
    #[error("{resource} dropped {count} action(s) declared before its validator was replaced")]
    DiscardedActions {
        /// Resource name.
        resource: String,
        /// Number of dropped actions.
        count: usize,
    },

    /// The resource name is not an identifier.
    #[error("resource name '{name}' must contain only letters, digits and underscores and cannot start with a digit")]
    InvalidResourceName {
        /// The rejected name.
        name: String,
    },
}
