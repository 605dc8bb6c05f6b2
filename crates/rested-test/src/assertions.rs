//! Assertions on dispatch results.

use http::StatusCode;
use rested_core::{ErrorKind, RestResult};
use serde_json::Value;

/// Assertion helpers for [`RestResult`].
///
/// Every method panics with a descriptive message on mismatch and returns
/// `&Self` so checks can be chained.
pub trait ResultAssertions {
    /// Asserts the status.
    fn assert_status(&self, expected: StatusCode) -> &Self;

    /// Asserts the status as a number.
    fn assert_status_code(&self, expected: u16) -> &Self;

    /// Asserts a header value.
    fn assert_header(&self, name: &str, expected: &str) -> &Self;

    /// Asserts that the result carries no data.
    fn assert_no_data(&self) -> &Self;

    /// Asserts the whole data payload.
    fn assert_json_eq(&self, expected: &Value) -> &Self;

    /// Asserts one value inside the data, addressed by a dotted path such as
    /// `items.0.name`.
    fn assert_json_field(&self, path: &str, expected: &Value) -> &Self;

    /// Asserts that the data is an error envelope of the given kind.
    fn assert_error_kind(&self, expected: ErrorKind) -> &Self;
}

impl ResultAssertions for RestResult {
    fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status(),
            expected,
            "Expected status {}, got {} with data {:?}",
            expected,
            self.status(),
            self.data()
        );
        self
    }

    fn assert_status_code(&self, expected: u16) -> &Self {
        assert_eq!(
            self.status().as_u16(),
            expected,
            "Expected status {}, got {} with data {:?}",
            expected,
            self.status().as_u16(),
            self.data()
        );
        self
    }

    fn assert_header(&self, name: &str, expected: &str) -> &Self {
        let actual = self
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_else(|| panic!("Header '{name}' not found"));
        assert_eq!(
            actual, expected,
            "Header '{name}': expected '{expected}', got '{actual}'"
        );
        self
    }

    fn assert_no_data(&self) -> &Self {
        assert!(
            self.data().is_none(),
            "Expected no data, got {:?}",
            self.data()
        );
        self
    }

    fn assert_json_eq(&self, expected: &Value) -> &Self {
        let actual = self.data().expect("Result should carry data");
        assert_eq!(actual, expected, "JSON data mismatch");
        self
    }

    fn assert_json_field(&self, path: &str, expected: &Value) -> &Self {
        let data = self.data().expect("Result should carry data");
        let actual = json_path(data, path)
            .unwrap_or_else(|| panic!("JSON path '{path}' not found in: {data:?}"));
        assert_eq!(
            actual, expected,
            "JSON field '{path}': expected {expected:?}, got {actual:?}"
        );
        self
    }

    fn assert_error_kind(&self, expected: ErrorKind) -> &Self {
        let data = self.data().expect("Result should carry an error envelope");
        let kind = json_path(data, "error.kind")
            .unwrap_or_else(|| panic!("Not an error envelope: {data:?}"));
        let expected_kind = serde_json::to_value(expected).expect("serializable kind");
        assert_eq!(kind, &expected_kind, "Error kind mismatch in {data:?}");
        self
    }
}

/// Simple JSON path accessor.
fn json_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.split('.') {
        if segment.is_empty() {
            continue;
        }
        // "items.0.name" indexes arrays
        if let Ok(index) = segment.parse::<usize>() {
            current = current.get(index)?;
        } else {
            current = current.get(segment)?;
        }
    }
    Some(current)
}
