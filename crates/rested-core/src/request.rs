//! Transport-agnostic request shape.
//!
//! A [`Request`] is produced by an adapter from whatever native request type
//! the web framework uses. Dispatch only reads it.

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;
use indexmap::IndexMap;
use rested_router::Params;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::RestError;
use crate::verb::Verb;

/// Query parameters as an ordered `name -> [values]` mapping.
///
/// Names keep first-seen order; repeated names accumulate their values.
///
/// # Example
///
/// ```rust
/// use rested_core::QueryParams;
///
/// let query = QueryParams::parse("age__gt=30&tag=a&tag=b").unwrap();
/// assert_eq!(query.get("age__gt"), Some("30"));
/// assert_eq!(query.get_all("tag"), &["a".to_string(), "b".to_string()]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    inner: IndexMap<String, Vec<String>>,
}

impl QueryParams {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes an `application/x-www-form-urlencoded` query string.
    ///
    /// A leading `?` is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::BadRequest`] if the string is not valid form encoding.
    pub fn parse(raw: &str) -> Result<Self, RestError> {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(raw)
            .map_err(|e| RestError::bad_request(format!("Invalid query string: {e}")))?;
        Ok(pairs.into_iter().collect())
    }

    /// Adds a value under `name`, keeping earlier values.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.entry(name.into()).or_default().push(value.into());
    }

    /// Returns the first value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns every value for `name`, or an empty slice.
    #[must_use]
    pub fn get_all(&self, name: &str) -> &[String] {
        self.inner.get(name).map_or(&[], Vec::as_slice)
    }

    /// Returns true if `name` was supplied.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    /// Iterates over names and their values in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of distinct names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if no parameters were supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<N, V> FromIterator<(N, V)> for QueryParams
where
    N: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut query = Self::new();
        for (name, value) in iter {
            query.append(name, value);
        }
        query
    }
}

/// The abstract request consumed by dispatch.
///
/// `method` is kept as supplied by the adapter; it is normalized into a
/// [`Verb`] when dispatch starts, so an unknown method surfaces as a
/// `BadRequest` result rather than a construction failure.
#[derive(Debug, Clone, Default)]
pub struct Request {
    method: String,
    path_params: Params,
    query: QueryParams,
    headers: HeaderMap,
    body: Bytes,
}

impl Request {
    /// Starts building a request for `method`.
    #[must_use]
    pub fn builder(method: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(method)
    }

    /// Creates a request from its parts.
    #[must_use]
    pub fn from_parts(
        method: impl Into<String>,
        path_params: Params,
        query: QueryParams,
        headers: HeaderMap,
        body: Bytes,
    ) -> Self {
        Self {
            method: method.into(),
            path_params,
            query,
            headers,
            body,
        }
    }

    /// The method as supplied by the adapter.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Normalizes the method into a [`Verb`].
    ///
    /// # Errors
    ///
    /// Returns [`RestError::BadRequest`] for unknown methods.
    pub fn verb(&self) -> Result<Verb, RestError> {
        Verb::parse(&self.method)
    }

    /// Path parameters captured by the route.
    #[must_use]
    pub fn path_params(&self) -> &Params {
        &self.path_params
    }

    /// Returns one path parameter.
    #[must_use]
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name)
    }

    /// Query parameters.
    #[must_use]
    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    /// Request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Raw body bytes.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Decodes the body as JSON. An empty body decodes as `null`.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::BadRequest`] if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, RestError> {
        let result = if self.body.is_empty() {
            serde_json::from_value(serde_json::Value::Null)
        } else {
            serde_json::from_slice(&self.body)
        };
        result.map_err(|e| RestError::bad_request(format!("Invalid JSON body: {e}")))
    }

    /// Copies route-captured parameters into the request, overriding duplicates.
    pub fn merge_path_params(&mut self, params: &Params) {
        self.path_params.merge(params);
    }
}

/// Builder for [`Request`].
///
/// Errors from header or body conversion are held until [`build`](Self::build).
#[derive(Debug)]
pub struct RequestBuilder {
    request: Request,
    error: Option<RestError>,
}

impl RequestBuilder {
    fn new(method: impl Into<String>) -> Self {
        Self {
            request: Request {
                method: method.into(),
                ..Request::default()
            },
            error: None,
        }
    }

    fn fail(&mut self, err: RestError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    /// Adds a path parameter.
    #[must_use]
    pub fn path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.path_params.insert(name, value);
        self
    }

    /// Adds a query parameter value.
    #[must_use]
    pub fn query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.query.append(name, value);
        self
    }

    /// Replaces the query parameters with a decoded query string.
    #[must_use]
    pub fn query_string(mut self, raw: &str) -> Self {
        match QueryParams::parse(raw) {
            Ok(query) => self.request.query = query,
            Err(err) => self.fail(err),
        }
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.request.headers.append(name, value);
            }
            _ => self.fail(RestError::bad_request(format!("Invalid header: {name}"))),
        }
        self
    }

    /// Sets a raw body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.request.body = body.into();
        self
    }

    /// Serializes `value` as the JSON body and sets `content-type`.
    #[must_use]
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => {
                self.request.body = Bytes::from(bytes);
                self.request.headers.insert(
                    http::header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
            }
            Err(e) => self.fail(RestError::bad_request(format!("Invalid JSON body: {e}"))),
        }
        self
    }

    /// Finishes the request.
    ///
    /// # Errors
    ///
    /// Returns the first error recorded while building.
    pub fn build(self) -> Result<Request, RestError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.request),
        }
    }
}
