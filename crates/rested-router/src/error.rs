//! Route registration errors.

use thiserror::Error;

/// Errors raised while assembling a [`RouteTable`](crate::RouteTable).
///
/// These surface at application-assembly time, never while resolving paths.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The same pattern (up to parameter naming) was registered twice.
    #[error("route '{pattern}' conflicts with already registered route '{existing}'")]
    Duplicate {
        /// The rejected pattern.
        pattern: String,
        /// The pattern registered first.
        existing: String,
    },

    /// Two patterns capture the same position under different names.
    #[error("route '{pattern}' renames parameter '{existing}' already used at the same position")]
    ParamConflict {
        /// The rejected pattern.
        pattern: String,
        /// The segment registered first (e.g. `{id}`).
        existing: String,
    },

    /// A wildcard segment appeared before the end of the pattern.
    #[error("wildcard must be the last segment in route '{pattern}'")]
    WildcardNotLast {
        /// The rejected pattern.
        pattern: String,
    },

    /// A `{}` or bare `*` segment.
    #[error("route '{pattern}' has a parameter without a name")]
    EmptyParamName {
        /// The rejected pattern.
        pattern: String,
    },
}
