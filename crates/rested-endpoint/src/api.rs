//! Application assembly.
//!
//! An [`Api`] is the route table of an application: URL patterns bound to
//! endpoints. It is assembled once, then only read.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use rested_core::{Params, Request, Resource, RestError, RestResult};
use rested_router::RouteTable;

use crate::endpoint::Endpoint;
use crate::error::{ApiError, DispatchError};

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Type-erased endpoint, so endpoints over different resources share a table.
trait Dispatch: Send + Sync {
    fn resource_name(&self) -> &str;

    fn action_param(&self) -> &str;

    fn dispatch<'a>(
        &'a self,
        request: &'a Request,
    ) -> BoxFuture<'a, Result<RestResult, DispatchError>>;
}

impl<R: Resource> Dispatch for Endpoint<R> {
    fn resource_name(&self) -> &str {
        self.resource().name()
    }

    fn action_param(&self) -> &str {
        &self.config().action_param
    }

    fn dispatch<'a>(
        &'a self,
        request: &'a Request,
    ) -> BoxFuture<'a, Result<RestResult, DispatchError>> {
        Box::pin(Endpoint::dispatch(self, request))
    }
}

/// What a route pattern is bound to.
#[derive(Clone)]
struct Binding {
    endpoint: Arc<dyn Dispatch>,
    /// Fixed action path for collection action routes.
    action: Option<String>,
}

/// A registered route, for introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteInfo<'a> {
    /// The URL pattern.
    pub pattern: &'a str,
    /// Name of the resource bound to it.
    pub resource: &'a str,
    /// Action path fixed by the route, for collection action routes.
    pub action: Option<&'a str>,
}

/// Builder for [`Api`].
#[derive(Default)]
pub struct ApiBuilder {
    table: RouteTable<Binding>,
}

impl ApiBuilder {
    /// Binds a resource endpoint under `base`.
    ///
    /// Registers, for `base = "/users"` and primary key `users_pk`:
    ///
    /// - `/users` for the collection
    /// - `/users/{users_pk}` for items
    /// - `/users/{users_pk}/*action` for item actions
    /// - `/users/<path>` and `/users/<path>/*action` for every action that
    ///   answers collection requests, so `logs` also answers `logs/2024`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Route`] if a pattern collides with one already
    /// registered.
    pub fn resource<R: Resource>(
        mut self,
        base: &str,
        endpoint: impl Into<Arc<Endpoint<R>>>,
    ) -> Result<Self, ApiError> {
        let endpoint: Arc<Endpoint<R>> = endpoint.into();
        let base = base.trim_end_matches('/');
        let primary_key = endpoint.resource().primary_key().into_owned();
        let action_param = endpoint.config().action_param.clone();
        let collection_paths = endpoint.collection_paths()?;
        let erased: Arc<dyn Dispatch> = endpoint;

        self.insert(base, &erased, None)?;
        self.insert(&format!("{base}/{{{primary_key}}}"), &erased, None)?;
        self.insert(
            &format!("{base}/{{{primary_key}}}/*{action_param}"),
            &erased,
            None,
        )?;
        for path in collection_paths {
            self.insert(&format!("{base}/{path}"), &erased, Some(path.clone()))?;
            self.insert(
                &format!("{base}/{path}/*{action_param}"),
                &erased,
                Some(path),
            )?;
        }

        tracing::debug!(resource = %erased.resource_name(), base = %base, "bound resource");
        Ok(self)
    }

    /// Binds an endpoint to one explicit pattern.
    ///
    /// The pattern should capture the primary key and action parameters the
    /// endpoint expects, e.g. `/orgs/{org}/users/{users_pk}`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Route`] for a malformed or colliding pattern.
    pub fn route<R: Resource>(
        mut self,
        pattern: &str,
        endpoint: impl Into<Arc<Endpoint<R>>>,
    ) -> Result<Self, ApiError> {
        let endpoint: Arc<Endpoint<R>> = endpoint.into();
        let erased: Arc<dyn Dispatch> = endpoint;
        self.insert(pattern, &erased, None)?;
        Ok(self)
    }

    fn insert(
        &mut self,
        pattern: &str,
        endpoint: &Arc<dyn Dispatch>,
        action: Option<String>,
    ) -> Result<(), ApiError> {
        self.table.insert(
            pattern,
            Binding {
                endpoint: Arc::clone(endpoint),
                action,
            },
        )?;
        Ok(())
    }

    /// Finishes assembly.
    pub fn build(self) -> Api {
        Api { table: self.table }
    }
}

/// Route table of an application.
///
/// # Example
///
/// ```ignore
/// let api = Api::builder()
///     .resource("/users", Endpoint::new(users)?)?
///     .resource("/orders", Endpoint::new(orders)?)?
///     .build();
///
/// let result = api.handle("/users/42", request).await?;
/// ```
pub struct Api {
    table: RouteTable<Binding>,
}

impl Api {
    /// Starts assembling an application.
    pub fn builder() -> ApiBuilder {
        ApiBuilder::default()
    }

    /// Resolves `path`, merges its parameters into `request` and dispatches.
    ///
    /// An unknown path yields a `404` result.
    ///
    /// # Errors
    ///
    /// Propagates [`DispatchError`] from the endpoint.
    pub async fn handle(&self, path: &str, mut request: Request) -> Result<RestResult, DispatchError> {
        let Some(found) = self.table.resolve(path) else {
            tracing::debug!(path = %path, "no route");
            return Ok(RestResult::from_error(&RestError::not_found(format!(
                "No route for {path}"
            ))));
        };

        let binding = &found.route.target;
        let mut params: Params = found.params;
        if let Some(action) = &binding.action {
            let action_param = binding.endpoint.action_param();
            let remaining = match params.get(action_param) {
                Some(tail) if !tail.is_empty() => format!("{action}/{tail}"),
                _ => action.clone(),
            };
            params.insert(action_param, remaining);
        }
        request.merge_path_params(&params);

        binding.endpoint.dispatch(&request).await
    }

    /// Registered routes in registration order.
    pub fn routes(&self) -> impl Iterator<Item = RouteInfo<'_>> {
        self.table.routes().map(|route| RouteInfo {
            pattern: &route.pattern,
            resource: route.target.endpoint.resource_name(),
            action: route.target.action.as_deref(),
        })
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl std::fmt::Debug for Api {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.routes()).finish()
    }
}
