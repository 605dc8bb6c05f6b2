//! Route metadata table.
//!
//! A [`RouteTable`] maps URL patterns to whatever the application binds to
//! them (usually a resource endpoint). It is filled once while the
//! application is assembled and only read afterwards.

use crate::error::RouteError;
use crate::node::{Conflict, Node};
use crate::params::Params;

/// A registered URL pattern and the target responsible for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMeta<T> {
    /// The pattern as registered, e.g. `/users/{users_pk}`.
    pub pattern: String,
    /// The resource (or anything else) bound to the pattern.
    pub target: T,
}

/// A successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a, T> {
    /// The route that matched.
    pub route: &'a RouteMeta<T>,
    /// Parameters captured from the path.
    pub params: Params,
}

/// Pattern → target table backed by a radix tree.
///
/// Static segments win over `{param}` segments, which win over a trailing
/// `*wildcard`.
///
/// # Example
///
/// ```rust
/// use rested_router::RouteTable;
///
/// let mut table = RouteTable::new();
/// table.insert("/users", "users").unwrap();
/// table.insert("/users/{users_pk}", "users").unwrap();
/// table.insert("/users/{users_pk}/*action", "users").unwrap();
///
/// let found = table.resolve("/users/42/reports/daily").unwrap();
/// assert_eq!(found.route.target, "users");
/// assert_eq!(found.params.get("users_pk"), Some("42"));
/// assert_eq!(found.params.get("action"), Some("reports/daily"));
/// ```
#[derive(Debug, Clone)]
pub struct RouteTable<T> {
    root: Node,
    routes: Vec<RouteMeta<T>>,
}

impl<T> Default for RouteTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RouteTable<T> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            routes: Vec::new(),
        }
    }

    /// Registers `target` under `pattern`.
    ///
    /// # Errors
    ///
    /// Fails if the pattern is malformed or collides with a registered one.
    pub fn insert(&mut self, pattern: &str, target: T) -> Result<(), RouteError> {
        let segments = Node::parse_pattern(pattern)?;
        let index = self.routes.len();

        self.root.insert(&segments, index).map_err(|conflict| match conflict {
            Conflict::Route(existing) => RouteError::Duplicate {
                pattern: pattern.to_string(),
                existing: self.routes[existing].pattern.clone(),
            },
            Conflict::ParamName(existing) => RouteError::ParamConflict {
                pattern: pattern.to_string(),
                existing,
            },
        })?;

        self.routes.push(RouteMeta {
            pattern: pattern.to_string(),
            target,
        });
        Ok(())
    }

    /// Resolves a concrete path.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_, T>> {
        let (index, params) = self.root.match_path(path)?;
        Some(RouteMatch {
            route: &self.routes[index],
            params,
        })
    }

    /// Iterates over registered routes in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &RouteMeta<T>> {
        self.routes.iter()
    }

    /// Number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
