//! # rested
//!
//! **Transport-agnostic REST dispatch**
//!
//! rested maps abstract requests onto resources and back into results:
//!
//! - **Resources** declare capabilities (query, get, create, update, delete)
//!   and custom actions keyed by verb and path suffix
//! - **Endpoints** dispatch a request to a custom action or to the default
//!   verb mapping, ask the authorization hook, and normalize what the handler
//!   returns into a status, headers and a JSON payload
//! - **Filters** turn query strings such as `age__gt=30&tags__in=a,b` into
//!   typed expressions for the persistence layer
//! - **Errors** are a closed taxonomy that maps onto HTTP statuses, plus an
//!   unhandled path for real failures
//!
//! No HTTP server is included; an adapter builds a [`Request`](core::Request)
//! from whatever transport it serves and writes the
//! [`RestResult`](core::RestResult) back.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rested::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new().with_defaults().with_env_prefix("APP").load()?;
//!     rested::init_logging(&config)?;
//!
//!     let users = rested::model_from_config("users", my_store, &config)
//!         .validator(RequiredFields::new(["email"]));
//!
//!     let api = Api::builder()
//!         .resource("/users", rested::endpoint_from_config(users, &config)?)?
//!         .build();
//!
//!     let request = Request::builder("GET").query_string("age__gte=18").build()?;
//!     let result = api.handle("/users", request).await?;
//!     println!("{} {:?}", result.status(), result.data());
//!     Ok(())
//! }
//! ```
//!
//! ## Dispatch
//!
//! ```text
//! path → Api route → Endpoint → verb → item/collection → action or default
//!                                                          ↓
//!                 RestResult ← normalize ← handler ← authorize
//! ```

#![doc(html_root_url = "https://docs.rs/rested/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use rested_core as core;

// Re-export route table types
pub use rested_router as router;

// Re-export the default CRUD resource
pub use rested_model as model;

// Re-export dispatch types
pub use rested_endpoint as endpoint;

// Re-export configuration types
pub use rested_config as config;

// Re-export logging setup
pub use rested_telemetry as telemetry;

use rested_config::RestedConfig;
use rested_core::{RegistrationError, Resource};
use rested_endpoint::Endpoint;
use rested_model::{ModelResource, Store};
use rested_telemetry::TelemetryResult;

/// Installs the global log subscriber described by `config.logging`.
///
/// # Errors
///
/// Fails for an invalid level directive or when a subscriber is already set.
pub fn init_logging(config: &RestedConfig) -> TelemetryResult<()> {
    rested_telemetry::init_logging(&config.logging.to_log_config())
}

/// Builds an endpoint with the endpoint section of `config`.
///
/// # Errors
///
/// See [`EndpointBuilder::build`](rested_endpoint::EndpointBuilder::build).
pub fn endpoint_from_config<R: Resource>(
    resource: R,
    config: &RestedConfig,
) -> Result<Endpoint<R>, RegistrationError> {
    Endpoint::builder(resource)
        .config(config.endpoint.clone())
        .build()
}

/// Creates a store-backed resource using the filter grammar of `config`.
pub fn model_from_config<S: Store>(
    name: impl Into<String>,
    store: S,
    config: &RestedConfig,
) -> ModelResource<S> {
    ModelResource::new(name, store).filter_syntax(config.filters.syntax())
}

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use rested::prelude::*;
/// ```
pub mod prelude {
    pub use rested_core::{
        ActionMeta, ActionRegistry, ActionTarget, Capabilities, Capability, ErrorKind,
        FilterExpression, FilterSyntax, FilterValue, HandlerError, HandlerResult, Operator,
        Outcome, RegistrationError, Request, Resource, RestError, RestResult, Target, Verb,
    };

    // Re-export dispatch types
    pub use rested_endpoint::{
        AllowAll, Api, ApiError, Authorizer, DenyAll, DispatchError, Endpoint, RequireHeader,
    };

    // Re-export the default CRUD resource
    pub use rested_model::{
        AcceptAll, Item, ModelResource, RequiredFields, Store, StoreError, ValidationMode,
        Validator,
    };

    // Re-export configuration
    pub use rested_config::{ConfigError, ConfigLoader, RestedConfig};
}
