//! Payload validation.

use rested_core::FieldErrors;
use serde_json::Value;

/// Whether a payload creates an item or modifies one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Full payload; required fields are enforced.
    Create,
    /// Partial payload; required-field checks are off.
    Update,
}

impl ValidationMode {
    /// Returns true for partial validation.
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        matches!(self, Self::Update)
    }
}

/// Checks incoming payloads before they reach the store.
pub trait Validator: Send + Sync + 'static {
    /// Validates `payload`.
    ///
    /// # Errors
    ///
    /// Returns the field-level messages when the payload is rejected.
    fn validate(&self, payload: &Value, mode: ValidationMode) -> Result<(), FieldErrors>;
}

impl<F> Validator for F
where
    F: Fn(&Value, ValidationMode) -> Result<(), FieldErrors> + Send + Sync + 'static,
{
    fn validate(&self, payload: &Value, mode: ValidationMode) -> Result<(), FieldErrors> {
        self(payload, mode)
    }
}

/// Accepts every payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl Validator for AcceptAll {
    fn validate(&self, _payload: &Value, _mode: ValidationMode) -> Result<(), FieldErrors> {
        Ok(())
    }
}

/// Requires a JSON object carrying the named fields.
///
/// In [`ValidationMode::Update`] only the object shape is checked, and
/// required fields that are present must not be `null`.
///
/// # Example
///
/// ```
/// use rested_model::{RequiredFields, ValidationMode, Validator};
/// use serde_json::json;
///
/// let validator = RequiredFields::new(["email", "name"]);
/// assert!(validator.validate(&json!({"email": "a@b.c", "name": "A"}), ValidationMode::Create).is_ok());
/// assert!(validator.validate(&json!({"name": "A"}), ValidationMode::Create).is_err());
/// assert!(validator.validate(&json!({"name": "B"}), ValidationMode::Update).is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequiredFields {
    fields: Vec<String>,
}

impl RequiredFields {
    /// Creates a validator for the given field names.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

impl Validator for RequiredFields {
    fn validate(&self, payload: &Value, mode: ValidationMode) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        let Some(object) = payload.as_object() else {
            errors.add("$", "must be a JSON object");
            return Err(errors);
        };

        for field in &self.fields {
            match object.get(field) {
                Some(Value::Null) => errors.add(field.as_str(), "must not be null"),
                None if !mode.is_partial() => errors.add(field.as_str(), "is required"),
                _ => {}
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_fields_reports_each_missing() {
        let validator = RequiredFields::new(["email", "name"]);
        let errors = validator
            .validate(&json!({}), ValidationMode::Create)
            .unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.fields["email"], vec!["is required".to_string()]);
    }

    #[test]
    fn test_required_fields_rejects_non_object() {
        let validator = RequiredFields::new(["email"]);
        let errors = validator
            .validate(&json!([1, 2]), ValidationMode::Update)
            .unwrap_err();
        assert!(errors.fields.contains_key("$"));
    }

    #[test]
    fn test_partial_mode_rejects_explicit_null() {
        let validator = RequiredFields::new(["email"]);
        let errors = validator
            .validate(&json!({"email": null}), ValidationMode::Update)
            .unwrap_err();
        assert_eq!(errors.fields["email"], vec!["must not be null".to_string()]);
    }

    #[test]
    fn test_closure_validator() {
        let validator = |payload: &Value, _mode: ValidationMode| {
            if payload.get("age").and_then(Value::as_i64).is_some_and(|a| a < 0) {
                let mut errors = FieldErrors::new();
                errors.add("age", "must be positive");
                return Err(errors);
            }
            Ok(())
        };

        assert!(validator.validate(&json!({"age": 3}), ValidationMode::Create).is_ok());
        assert!(validator.validate(&json!({"age": -1}), ValidationMode::Create).is_err());
    }

    #[test]
    fn test_accept_all() {
        assert!(AcceptAll.validate(&json!(null), ValidationMode::Create).is_ok());
    }
}
