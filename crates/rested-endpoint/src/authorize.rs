//! The authorization hook.
//!
//! Dispatch does not authenticate anybody. Before a handler runs it asks an
//! [`Authorizer`] whether the request may proceed, passing the
//! `requires_authorization` flag of the resolved operation. A `false` answer
//! yields `401 Not Authorized` and the handler is never invoked.
//!
//! # Example
//!
//! ```
//! use rested_core::Request;
//! use rested_endpoint::{Authorizer, RequireHeader};
//!
//! let hook = RequireHeader::new("authorization");
//! let anonymous = Request::builder("GET").build().unwrap();
//! assert!(hook.authorize(&anonymous, false));
//! assert!(!hook.authorize(&anonymous, true));
//! ```

use std::fmt;

use rested_core::Request;

/// Decides whether a request may run an operation.
pub trait Authorizer: Send + Sync + 'static {
    /// Returns true if the request may proceed.
    fn authorize(&self, request: &Request, requires_authorization: bool) -> bool;
}

impl<F> Authorizer for F
where
    F: Fn(&Request, bool) -> bool + Send + Sync + 'static,
{
    fn authorize(&self, request: &Request, requires_authorization: bool) -> bool {
        self(request, requires_authorization)
    }
}

/// Allows everything. The default.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn authorize(&self, _request: &Request, _requires_authorization: bool) -> bool {
        true
    }
}

/// Denies every operation that requires authorization.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAll;

impl Authorizer for DenyAll {
    fn authorize(&self, _request: &Request, requires_authorization: bool) -> bool {
        !requires_authorization
    }
}

/// Treats the presence of a non-empty header as proof of identity.
///
/// Useful when an upstream gateway has already authenticated the caller and
/// forwards its identity in a header.
#[derive(Clone)]
pub struct RequireHeader {
    name: String,
}

impl RequireHeader {
    /// Requires `name` on protected operations.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_lowercase(),
        }
    }
}

impl Authorizer for RequireHeader {
    fn authorize(&self, request: &Request, requires_authorization: bool) -> bool {
        !requires_authorization || request.header(&self.name).is_some_and(|v| !v.is_empty())
    }
}

impl fmt::Debug for RequireHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequireHeader")
            .field("name", &self.name)
            .finish()
    }
}
