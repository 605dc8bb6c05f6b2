//! Dispatch results.

use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::error::RestError;

/// The uniform result of one dispatch.
///
/// Exactly one is produced per request. The response adapter turns it into
/// the framework's native response.
#[derive(Debug, Clone, PartialEq)]
pub struct RestResult {
    status: StatusCode,
    headers: HeaderMap,
    data: Option<Value>,
}

impl RestResult {
    /// Creates a result with the given status and payload.
    #[must_use]
    pub fn new(status: StatusCode, data: Option<Value>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            data,
        }
    }

    /// `200 OK` with a payload.
    #[must_use]
    pub fn ok(data: Value) -> Self {
        Self::new(StatusCode::OK, Some(data))
    }

    /// `201 Created` with a payload.
    #[must_use]
    pub fn created(data: Value) -> Self {
        Self::new(StatusCode::CREATED, Some(data))
    }

    /// `204 No Content`.
    #[must_use]
    pub fn no_content() -> Self {
        Self::new(StatusCode::NO_CONTENT, None)
    }

    /// Serializes `value` into a result with `status`.
    ///
    /// # Errors
    ///
    /// Returns the serialization error if `value` cannot be represented as JSON.
    pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::new(status, Some(serde_json::to_value(value)?)))
    }

    /// Converts a taxonomy error into its result: canonical status and
    /// envelope payload.
    #[must_use]
    pub fn from_error(err: &RestError) -> Self {
        let data = serde_json::to_value(err.to_envelope()).ok();
        Self::new(err.status_code(), data)
    }

    /// Adds a header, replacing any existing value.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Response status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Response payload.
    #[must_use]
    pub const fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Drops the payload, keeping status and headers.
    #[must_use]
    pub fn without_data(mut self) -> Self {
        self.data = None;
        self
    }

    /// Splits into status, headers and payload.
    #[must_use]
    pub fn into_parts(self) -> (StatusCode, HeaderMap, Option<Value>) {
        (self.status, self.headers, self.data)
    }
}

impl From<RestError> for RestResult {
    fn from(err: RestError) -> Self {
        Self::from_error(&err)
    }
}

/// What a handler hands back before normalization.
///
/// Raw values get the default status for the operation; a complete
/// [`RestResult`] passes through untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A bare payload.
    Raw(Value),
    /// A payload with an explicit status.
    Status(StatusCode, Value),
    /// A finished result.
    Result(RestResult),
}

impl Outcome {
    /// A bare `null` payload.
    #[must_use]
    pub const fn empty() -> Self {
        Self::Raw(Value::Null)
    }

    /// Normalizes into a [`RestResult`], using `default_status` for raw values.
    #[must_use]
    pub fn into_result(self, default_status: StatusCode) -> RestResult {
        match self {
            Self::Raw(value) => RestResult::new(default_status, Some(value)),
            Self::Status(status, value) => RestResult::new(status, Some(value)),
            Self::Result(result) => result,
        }
    }
}

impl From<Value> for Outcome {
    fn from(value: Value) -> Self {
        Self::Raw(value)
    }
}

impl From<RestResult> for Outcome {
    fn from(result: RestResult) -> Self {
        Self::Result(result)
    }
}

impl From<(StatusCode, Value)> for Outcome {
    fn from((status, value): (StatusCode, Value)) -> Self {
        Self::Status(status, value)
    }
}
