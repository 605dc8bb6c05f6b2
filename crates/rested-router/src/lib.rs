//! URL pattern table for rested.
//!
//! Applications bind each resource to a handful of URL patterns when they are
//! assembled. This crate stores those bindings as [`RouteMeta`] records and
//! resolves concrete paths back to them with a radix tree, capturing path
//! parameters along the way.
//!
//! # Pattern syntax
//!
//! - `users` : literal segment
//! - `{users_pk}` : named parameter capturing one segment
//! - `*action` : catch-all capturing the rest of the path (last segment only)
//!
//! # Example
//!
//! ```rust
//! use rested_router::RouteTable;
//!
//! let mut table = RouteTable::new();
//! table.insert("/orgs/{org}/users/{users_pk}", "org-users").unwrap();
//!
//! let found = table.resolve("/orgs/acme/users/7").unwrap();
//! assert_eq!(found.route.target, "org-users");
//! assert_eq!(found.params.get("org"), Some("acme"));
//! assert_eq!(found.params.get("users_pk"), Some("7"));
//! ```

#![forbid(unsafe_code)]

mod error;
mod node;
mod params;
mod table;

pub use error::RouteError;
pub use node::{Node, SegmentKind};
pub use params::Params;
pub use table::{RouteMatch, RouteMeta, RouteTable};
