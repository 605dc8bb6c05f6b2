//! # rested model
//!
//! [`ModelResource`] implements every [`Resource`](rested_core::Resource)
//! operation by delegating to a [`Store`], with payloads checked by a
//! [`Validator`] and queries built by the filter grammar.

#![doc(html_root_url = "https://docs.rs/rested-model/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod resource;
mod store;
mod validate;

pub use resource::ModelResource;
pub use rested_core::FIELDS_PARAM;
pub use store::{Item, Store, StoreError};
pub use validate::{AcceptAll, RequiredFields, ValidationMode, Validator};
