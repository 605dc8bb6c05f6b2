//! Test request building.

use http::Method;
use rested_core::Request;
use serde::Serialize;

/// Entry points for test requests.
pub struct TestRequest;

impl TestRequest {
    /// Creates a new GET request.
    pub fn get(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::GET, uri)
    }

    /// Creates a new POST request.
    pub fn post(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::POST, uri)
    }

    /// Creates a new PUT request.
    pub fn put(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::PUT, uri)
    }

    /// Creates a new PATCH request.
    pub fn patch(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::PATCH, uri)
    }

    /// Creates a new DELETE request.
    pub fn delete(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::DELETE, uri)
    }

    /// Creates a new OPTIONS request.
    pub fn options(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::OPTIONS, uri)
    }

    /// Creates a new HEAD request.
    pub fn head(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::HEAD, uri)
    }
}

/// Builder for constructing test requests.
///
/// The URI may carry a query string; it is decoded into the request's query
/// parameters and stripped from the path.
#[must_use]
pub struct TestRequestBuilder {
    method: String,
    path: String,
    query: String,
    extra_query: Vec<(String, String)>,
    path_params: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl TestRequestBuilder {
    /// Creates a new request builder. Any method token is accepted, so
    /// unsupported verbs can be tested too.
    pub fn new(method: impl AsRef<str>, uri: impl AsRef<str>) -> Self {
        let uri = uri.as_ref();
        let (path, query) = uri.split_once('?').unwrap_or((uri, ""));
        Self {
            method: method.as_ref().to_string(),
            path: path.to_string(),
            query: query.to_string(),
            extra_query: Vec::new(),
            path_params: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Adds a query parameter value.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_query.push((name.into(), value.into()));
        self
    }

    /// Sets a path parameter directly, for dispatching without a route table.
    pub fn path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.push((name.into(), value.into()));
        self
    }

    /// Sets a header on the request.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let request = TestRequest::get("/users")
    ///     .header("Authorization", "Bearer token")
    ///     .build();
    /// ```
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the body to serialized JSON.
    ///
    /// # Panics
    ///
    /// Panics if the value cannot be serialized.
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        self.body = Some(serde_json::to_vec(value).expect("serializable body"));
        self.header("content-type", "application/json")
    }

    /// Sets a raw body.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// The path without the query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Builds the request.
    ///
    /// # Panics
    ///
    /// Panics if a header or the query string is malformed.
    pub fn build(self) -> Request {
        self.into_parts().1
    }

    /// Builds the request and returns it with its path, ready for
    /// `Api::handle`.
    ///
    /// # Panics
    ///
    /// Panics if a header or the query string is malformed.
    pub fn into_parts(self) -> (String, Request) {
        let mut builder = Request::builder(self.method).query_string(&self.query);

        for (name, value) in self.extra_query {
            builder = builder.query_param(name, value);
        }
        for (name, value) in self.path_params {
            builder = builder.path_param(name, value);
        }
        for (name, value) in &self.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = self.body {
            builder = builder.body(body);
        }

        let request = builder.build().expect("valid test request");
        (self.path, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_string_is_split_from_path() {
        let (path, request) = TestRequest::get("/users?age__gt=30&name=Ann")
            .query("role", "admin")
            .into_parts();

        assert_eq!(path, "/users");
        assert_eq!(request.method(), "GET");
        assert_eq!(request.query().get("age__gt"), Some("30"));
        assert_eq!(request.query().get("role"), Some("admin"));
        assert_eq!(request.query().len(), 3);
    }

    #[test]
    fn test_json_body_and_headers() {
        let request = TestRequest::post("/users")
            .header("X-User", "ann")
            .json(&json!({"name": "Ann"}))
            .build();

        assert_eq!(request.header("x-user"), Some("ann"));
        assert_eq!(request.header("content-type"), Some("application/json"));
        let body: serde_json::Value = request.json().unwrap();
        assert_eq!(body["name"], "Ann");
    }

    #[test]
    fn test_path_params_and_custom_method() {
        let request = TestRequestBuilder::new("BREW", "/pots/1")
            .path_param("pots_pk", "1")
            .build();

        assert_eq!(request.path_param("pots_pk"), Some("1"));
        assert!(request.verb().is_err());
    }
}
