//! Dispatch and assembly errors.

use rested_core::RegistrationError;
use rested_router::RouteError;
use thiserror::Error;

/// A failure that escapes dispatch.
///
/// Taxonomy errors never appear here; they are turned into a
/// [`RestResult`](rested_core::RestResult). What remains is fatal for the
/// request and should surface as a 500-class response in the adapter.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A handler or collaborator failed outside the error taxonomy.
    #[error("{resource}: unhandled failure")]
    Unhandled {
        /// Resource that was dispatching.
        resource: String,
        /// The underlying failure.
        #[source]
        source: anyhow::Error,
    },

    /// The action table could not be declared.
    #[error(transparent)]
    Registration(#[from] RegistrationError),
}

/// Errors raised while assembling an [`Api`](crate::Api).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// A URL pattern was rejected by the route table.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// An endpoint's resource or actions were rejected.
    #[error(transparent)]
    Registration(#[from] RegistrationError),
}
