//! Query-string filter grammar.
//!
//! Parameter names follow `field[__operator]`; values are coerced by lexical
//! shape. The result is an ordered list of [`FilterExpression`]s that a
//! storage collaborator ANDs together.
//!
//! ```text
//! age__gt=30              -> age  gt  Int(30)
//! name=John               -> name eq  String("John")
//! tags__in=a,b,c          -> tags in  List([a, b, c])
//! created__gte=2024-01-01 -> created gte Date(2024-01-01)
//! ```
//!
//! Unknown suffixes are not errors: `first__name=x` filters on the field
//! `first__name` with `eq`. The only parse failure is an `in` list with no
//! elements.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

use crate::error::RestError;
use crate::request::QueryParams;

/// Comparison operator of a filter expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// Equal
    Eq,
    /// Not equal
    Ne,
    /// Greater than
    Gt,
    /// Greater than or equal
    Gte,
    /// Less than
    Lt,
    /// Less than or equal
    Lte,
    /// Member of a list
    In,
    /// Contains a value
    Contains,
}

impl Operator {
    /// Wire token used as the parameter-name suffix.
    #[must_use]
    pub const fn token(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::In => "in",
            Self::Contains => "contains",
        }
    }

    /// Looks up an operator by its exact wire token.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "eq" => Some(Self::Eq),
            "ne" => Some(Self::Ne),
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            "in" => Some(Self::In),
            "contains" => Some(Self::Contains),
            _ => None,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A coerced filter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FilterValue {
    /// `true` / `false`, any case
    Bool(bool),
    /// Integer-shaped value
    Int(i64),
    /// Decimal-shaped value
    Float(f64),
    /// `YYYY-MM-DD`
    Date(NaiveDate),
    /// `YYYY-MM-DDTHH:MM:SS[.fff][Z|+HH:MM]`, normalized to UTC
    DateTime(DateTime<Utc>),
    /// Anything else
    String(String),
    /// Elements of an `in` list
    List(Vec<FilterValue>),
}

impl FilterValue {
    /// Coerces a raw string by lexical shape.
    ///
    /// Order: boolean, integer, float, date, datetime, string. Values that
    /// look like a date but are not on the calendar stay strings.
    #[must_use]
    pub fn coerce(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("true") {
            return Self::Bool(true);
        }
        if raw.eq_ignore_ascii_case("false") {
            return Self::Bool(false);
        }

        if int_shape().is_match(raw) {
            if let Ok(value) = raw.parse::<i64>() {
                return Self::Int(value);
            }
        }

        if float_shape().is_match(raw) {
            if let Ok(value) = raw.parse::<f64>() {
                return Self::Float(value);
            }
        }

        if date_shape().is_match(raw) {
            if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                return Self::Date(date);
            }
            return Self::String(raw.to_string());
        }

        if let Some(captures) = datetime_shape().captures(raw) {
            if let Some(value) = parse_datetime(raw, captures.name("offset").is_some()) {
                return Self::DateTime(value);
            }
        }

        Self::String(raw.to_string())
    }

    /// Returns the string content for [`FilterValue::String`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements for [`FilterValue::List`].
    #[must_use]
    pub fn as_list(&self) -> Option<&[FilterValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

fn parse_datetime(raw: &str, has_offset: bool) -> Option<DateTime<Utc>> {
    if has_offset {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    } else {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

fn int_shape() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[+-]?\d+$").expect("valid regex"))
}

fn float_shape() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[+-]?(?:\d+\.\d*|\.\d+|\d+)(?:[eE][+-]?\d+)?$").expect("valid regex")
    })
}

fn date_shape() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"))
}

fn datetime_shape() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?(?P<offset>Z|[+-]\d{2}:\d{2})?$")
            .expect("valid regex")
    })
}

/// One `(field, operator, value)` predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterExpression {
    /// Field name
    pub field: String,
    /// Comparison operator
    pub operator: Operator,
    /// Coerced value
    pub value: FilterValue,
}

impl FilterExpression {
    /// Creates an expression.
    #[must_use]
    pub fn new(field: impl Into<String>, operator: Operator, value: FilterValue) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }
}

/// Why a filter could not be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// An `in` filter had no elements after splitting.
    #[error("Filter '{parameter}' uses 'in' with an empty list")]
    EmptyList {
        /// The offending parameter name.
        parameter: String,
    },
}

impl From<FilterError> for RestError {
    fn from(err: FilterError) -> Self {
        RestError::bad_request(err.to_string())
    }
}

/// Query parameter naming the fields to return. Never read as a filter,
/// whatever the reserved prefix.
pub const FIELDS_PARAM: &str = "_fields";

/// Grammar knobs for the filter parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSyntax {
    /// Separates the field from the operator token.
    pub separator: String,
    /// Separates `in` list elements.
    pub list_delimiter: String,
    /// Parameters starting with this prefix are control parameters.
    pub reserved_prefix: Option<String>,
}

impl Default for FilterSyntax {
    fn default() -> Self {
        Self {
            separator: "__".to_string(),
            list_delimiter: ",".to_string(),
            reserved_prefix: Some("_".to_string()),
        }
    }
}

impl FilterSyntax {
    /// Splits a parameter name into field and operator.
    fn split_name<'a>(&self, name: &'a str) -> (&'a str, Operator) {
        match name.rsplit_once(self.separator.as_str()) {
            Some((field, token)) if !field.is_empty() => match Operator::from_token(token) {
                Some(operator) => (field, operator),
                None => (name, Operator::Eq),
            },
            _ => (name, Operator::Eq),
        }
    }

    fn is_reserved(&self, name: &str) -> bool {
        name == FIELDS_PARAM
            || self
                .reserved_prefix
                .as_deref()
                .is_some_and(|prefix| !prefix.is_empty() && name.starts_with(prefix))
    }

    fn parse_value(
        &self,
        name: &str,
        operator: Operator,
        raw: &str,
    ) -> Result<FilterValue, FilterError> {
        if operator != Operator::In {
            return Ok(FilterValue::coerce(raw));
        }

        let items: Vec<FilterValue> = raw
            .split(self.list_delimiter.as_str())
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(FilterValue::coerce)
            .collect();

        if items.is_empty() {
            return Err(FilterError::EmptyList {
                parameter: name.to_string(),
            });
        }
        Ok(FilterValue::List(items))
    }

    /// Builds filter expressions from query parameters.
    ///
    /// Each value of a repeated parameter yields its own expression. Output
    /// follows parameter order, then value order.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::EmptyList`] for an `in` filter without elements.
    pub fn parse(&self, query: &QueryParams) -> Result<Vec<FilterExpression>, FilterError> {
        let mut filters = Vec::new();

        for (name, values) in query.iter() {
            if self.is_reserved(name) {
                continue;
            }

            let (field, operator) = self.split_name(name);
            for raw in values {
                let value = self.parse_value(name, operator, raw)?;
                filters.push(FilterExpression::new(field, operator, value));
            }
        }

        Ok(filters)
    }
}

/// Parses query parameters with the default grammar.
///
/// # Errors
///
/// Returns [`RestError::BadRequest`] when an `in` filter has no elements.
///
/// # Example
///
/// ```
/// use rested_core::filter::{self, FilterValue, Operator};
/// use rested_core::QueryParams;
///
/// let query = QueryParams::parse("age__gt=30&name=John").unwrap();
/// let filters = filter::parse(&query).unwrap();
///
/// assert_eq!(filters[0].field, "age");
/// assert_eq!(filters[0].operator, Operator::Gt);
/// assert_eq!(filters[0].value, FilterValue::Int(30));
/// assert_eq!(filters[1].value, FilterValue::String("John".into()));
/// ```
pub fn parse(query: &QueryParams) -> Result<Vec<FilterExpression>, RestError> {
    Ok(FilterSyntax::default().parse(query)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn one(raw: &str) -> Vec<FilterExpression> {
        parse(&QueryParams::parse(raw).unwrap()).unwrap()
    }

    #[test]
    fn test_operator_suffix() {
        let filters = one("age__gt=30");
        assert_eq!(
            filters,
            vec![FilterExpression::new("age", Operator::Gt, FilterValue::Int(30))]
        );
    }

    #[test]
    fn test_default_eq() {
        let filters = one("name=John");
        assert_eq!(filters[0].operator, Operator::Eq);
        assert_eq!(filters[0].field, "name");
        assert_eq!(filters[0].value, FilterValue::String("John".into()));
    }

    #[test]
    fn test_unknown_suffix_is_part_of_field() {
        let filters = one("first__name=Ann");
        assert_eq!(filters[0].field, "first__name");
        assert_eq!(filters[0].operator, Operator::Eq);
    }

    #[test]
    fn test_last_separator_wins() {
        let filters = one("author__name__contains=ann");
        assert_eq!(filters[0].field, "author__name");
        assert_eq!(filters[0].operator, Operator::Contains);
    }

    #[test]
    fn test_empty_field_keeps_whole_name() {
        let filters = one("__gt=1");
        assert_eq!(filters[0].field, "__gt");
        assert_eq!(filters[0].operator, Operator::Eq);
    }

    #[test]
    fn test_in_list() {
        let filters = one("tags__in=a,b,c");
        assert_eq!(filters[0].operator, Operator::In);
        assert_eq!(
            filters[0].value,
            FilterValue::List(vec![
                FilterValue::String("a".into()),
                FilterValue::String("b".into()),
                FilterValue::String("c".into()),
            ])
        );
    }

    #[test]
    fn test_in_list_coerces_each_element() {
        let filters = one("ids__in=1, 2.5 ,true,,x");
        assert_eq!(
            filters[0].value,
            FilterValue::List(vec![
                FilterValue::Int(1),
                FilterValue::Float(2.5),
                FilterValue::Bool(true),
                FilterValue::String("x".into()),
            ])
        );
    }

    #[test]
    fn test_empty_in_is_bad_request() {
        for raw in ["ids__in=", "ids__in=,", "ids__in=%20,%20"] {
            let err = parse(&QueryParams::parse(raw).unwrap()).unwrap_err();
            assert!(matches!(err, RestError::BadRequest { .. }), "{raw}");
        }
    }

    #[test]
    fn test_date_value() {
        let filters = one("created__gte=2024-01-01");
        assert_eq!(filters[0].operator, Operator::Gte);
        assert_eq!(
            filters[0].value,
            FilterValue::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        );
    }

    #[test]
    fn test_invalid_calendar_date_stays_string() {
        let filters = one("created=2024-02-30");
        assert_eq!(filters[0].value, FilterValue::String("2024-02-30".into()));
    }

    #[test]
    fn test_datetime_values() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(
            FilterValue::coerce("2024-03-01T12:30:00"),
            FilterValue::DateTime(expected)
        );
        assert_eq!(
            FilterValue::coerce("2024-03-01T12:30:00Z"),
            FilterValue::DateTime(expected)
        );
        assert_eq!(
            FilterValue::coerce("2024-03-01T14:30:00+02:00"),
            FilterValue::DateTime(expected)
        );
        assert!(matches!(
            FilterValue::coerce("2024-03-01T12:30:00.250"),
            FilterValue::DateTime(_)
        ));
    }

    #[test]
    fn test_coercion_order() {
        assert_eq!(FilterValue::coerce("TRUE"), FilterValue::Bool(true));
        assert_eq!(FilterValue::coerce("False"), FilterValue::Bool(false));
        assert_eq!(FilterValue::coerce("-12"), FilterValue::Int(-12));
        assert_eq!(FilterValue::coerce("3.25"), FilterValue::Float(3.25));
        assert_eq!(FilterValue::coerce("1e3"), FilterValue::Float(1000.0));
        assert_eq!(FilterValue::coerce("nan"), FilterValue::String("nan".into()));
        assert_eq!(FilterValue::coerce(""), FilterValue::String(String::new()));
    }

    #[test]
    fn test_integer_overflow_degrades_to_float() {
        assert!(matches!(
            FilterValue::coerce("99999999999999999999"),
            FilterValue::Float(_)
        ));
    }

    #[test]
    fn test_repeated_parameter_yields_one_expression_each() {
        let filters = one("age__gt=18&age__gt=21&name=x");
        assert_eq!(filters.len(), 3);
        assert_eq!(filters[0].value, FilterValue::Int(18));
        assert_eq!(filters[1].value, FilterValue::Int(21));
        assert_eq!(filters[2].field, "name");
    }

    #[test]
    fn test_reserved_parameters_skipped() {
        let filters = one("_fields=id,name&active=true");
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].field, "active");
    }

    #[test]
    fn test_custom_syntax() {
        let syntax = FilterSyntax {
            separator: ".".to_string(),
            list_delimiter: "|".to_string(),
            reserved_prefix: None,
        };
        let query = QueryParams::parse("score.lte=9&id.in=1|2&_x=1").unwrap();
        let filters = syntax.parse(&query).unwrap();

        assert_eq!(filters.len(), 3);
        assert_eq!(filters[0].operator, Operator::Lte);
        assert_eq!(
            filters[1].value,
            FilterValue::List(vec![FilterValue::Int(1), FilterValue::Int(2)])
        );
        assert_eq!(filters[2].field, "_x");
    }

    #[test]
    fn test_fields_param_skipped_without_underscore_prefix() {
        let query = QueryParams::parse("_fields=id&$page=2&name=Ann").unwrap();

        for prefix in [None, Some("$".to_string()), Some(String::new())] {
            let syntax = FilterSyntax {
                reserved_prefix: prefix.clone(),
                ..FilterSyntax::default()
            };
            let fields: Vec<String> = syntax
                .parse(&query)
                .unwrap()
                .into_iter()
                .map(|f| f.field)
                .collect();
            let expected: &[&str] = if prefix.as_deref() == Some("$") {
                &["name"]
            } else {
                &["$page", "name"]
            };
            assert_eq!(fields, expected, "prefix {prefix:?}");
        }
    }

    #[test]
    fn test_value_serialization() {
        let json = serde_json::to_value(FilterExpression::new(
            "age",
            Operator::Gte,
            FilterValue::Int(3),
        ))
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"field": "age", "operator": "gte", "value": {"type": "int", "value": 3}})
        );
    }

    proptest! {
        #[test]
        fn prop_integers_coerce_to_int(n in any::<i64>()) {
            prop_assert_eq!(FilterValue::coerce(&n.to_string()), FilterValue::Int(n));
        }

        #[test]
        fn prop_field_and_operator_split(
            field in "[a-z][a-z0-9_]{0,10}[a-z0-9]",
            op in prop::sample::select(vec![
                Operator::Eq, Operator::Ne, Operator::Gt, Operator::Gte,
                Operator::Lt, Operator::Lte, Operator::Contains,
            ]),
        ) {
            prop_assume!(!field.contains("__"));
            let mut query = QueryParams::new();
            query.append(format!("{field}__{}", op.token()), "v");
            let filters = parse(&query).unwrap();
            prop_assert_eq!(filters.len(), 1);
            prop_assert_eq!(&filters[0].field, &field);
            prop_assert_eq!(filters[0].operator, op);
        }

        #[test]
        fn prop_never_fails_without_in(name in "[a-z]{1,8}", value in ".*") {
            let mut query = QueryParams::new();
            query.append(name, value);
            prop_assert!(parse(&query).is_ok());
        }

        #[test]
        fn prop_in_list_length(items in prop::collection::vec("[a-z]{1,5}", 1..8)) {
            let mut query = QueryParams::new();
            query.append("tags__in", items.join(","));
            let filters = parse(&query).unwrap();
            prop_assert_eq!(filters[0].value.as_list().map(<[FilterValue]>::len), Some(items.len()));
        }
    }
}
