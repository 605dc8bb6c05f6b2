//! # rested core
//!
//! Transport-agnostic building blocks for REST resources:
//!
//! - [`Request`] and [`QueryParams`] - the abstract request an adapter hands in
//! - [`RestResult`] and [`Outcome`] - what dispatch hands back
//! - [`RestError`] - the error taxonomy, each kind with its HTTP status
//! - [`filter`] - the `field__operator=value` query grammar
//! - [`Resource`], [`Capabilities`] - the operations a resource supports
//! - [`ActionRegistry`], [`ActionCell`] - custom `(verb, path)` actions

#![doc(html_root_url = "https://docs.rs/rested-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod capability;
mod error;
pub mod filter;
mod request;
mod resource;
mod result;
mod verb;

pub use action::{
    Action, ActionCell, ActionFuture, ActionHandler, ActionMeta, ActionRegistry, ActionTarget,
};
pub use capability::{Capabilities, Capability};
pub use error::{
    ErrorDetail, ErrorEnvelope, ErrorKind, FieldErrors, HandlerError, HandlerResult,
    RegistrationError, RestError,
};
pub use filter::{FilterError, FIELDS_PARAM, FilterExpression, FilterSyntax, FilterValue, Operator};
pub use request::{QueryParams, Request, RequestBuilder};
pub use resource::{is_valid_name, Resource, Target};
pub use result::{Outcome, RestResult};
pub use verb::Verb;

/// Path parameters, re-exported from the router.
pub use rested_router::Params;
