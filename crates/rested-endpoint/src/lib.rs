//! # rested endpoint
//!
//! Turns abstract requests into [`RestResult`](rested_core::RestResult)s.
//!
//! - [`Endpoint`] - the dispatcher for one resource: custom action lookup,
//!   default verb mapping, authorization, outcome normalization
//! - [`Authorizer`] - the authorization hook, with [`AllowAll`],
//!   [`DenyAll`] and [`RequireHeader`]
//! - [`Api`] - URL patterns bound to endpoints
//!
//! ## Default verb mapping
//!
//! | Verb | Collection | Item |
//! |---|---|---|
//! | GET | query | get |
//! | POST | create | not allowed |
//! | PUT, PATCH | not allowed | update |
//! | DELETE | not allowed | delete |
//! | HEAD | query without data | get without data |
//! | OPTIONS | verbs and actions | verbs and actions |

#![doc(html_root_url = "https://docs.rs/rested-endpoint/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod api;
mod authorize;
mod endpoint;
mod error;

pub use api::{Api, ApiBuilder, BoxFuture, RouteInfo};
pub use authorize::{AllowAll, Authorizer, DenyAll, RequireHeader};
pub use endpoint::{Endpoint, EndpointBuilder};
pub use error::{ApiError, DispatchError};
