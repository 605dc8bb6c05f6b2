//! The endpoint dispatcher.
//!
//! An [`Endpoint`] binds one [`Resource`] to its action table, its
//! authorization hook and its [`EndpointConfig`]. Dispatching a request:
//!
//! 1. normalizes the verb (`BadRequest` for anything outside the verb set)
//! 2. decides item or collection targeting from the primary-key parameter
//! 3. looks up a custom action for the verb and the remaining path
//! 4. otherwise falls back to the default verb mapping, checked against the
//!    resource's capabilities
//! 5. asks the [`Authorizer`]
//! 6. runs the handler and normalizes its outcome into a [`RestResult`]
//!
//! Taxonomy errors raised anywhere along the way become results. Unclassified
//! failures come back as [`DispatchError::Unhandled`].

use std::fmt;
use std::sync::Arc;

use http::header::ALLOW;
use http::{HeaderValue, StatusCode};
use rested_config::EndpointConfig;
use rested_core::{
    is_valid_name, Action, ActionCell, ActionRegistry, ActionTarget, Capabilities, Capability,
    HandlerError, HandlerResult, RegistrationError, Request, Resource, RestError, RestResult,
    Target, Verb,
};
use serde_json::json;
use tracing::Instrument;

use crate::authorize::{AllowAll, Authorizer};
use crate::error::DispatchError;

/// What a request resolved to.
enum Resolved<'e, R> {
    Action(&'e Action<R>),
    Operation(Capability),
    Options,
}

/// A resource ready to serve requests.
///
/// # Example
///
/// ```ignore
/// use rested_endpoint::{Endpoint, RequireHeader};
///
/// let users = Endpoint::builder(users_resource)
///     .protected(true)
///     .authorizer(RequireHeader::new("x-user"))
///     .build()?;
///
/// let result = users.dispatch(&request).await?;
/// ```
pub struct Endpoint<R> {
    resource: R,
    config: EndpointConfig,
    authorizer: Arc<dyn Authorizer>,
    actions: ActionCell<R>,
}

/// Builder for [`Endpoint`].
pub struct EndpointBuilder<R> {
    resource: R,
    config: EndpointConfig,
    authorizer: Arc<dyn Authorizer>,
}

impl<R: Resource> EndpointBuilder<R> {
    /// Replaces the endpoint configuration.
    #[must_use]
    pub fn config(mut self, config: EndpointConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the authorization flag used for the default CRUD operations.
    #[must_use]
    pub fn protected(mut self, protected: bool) -> Self {
        self.config.protected = protected;
        self
    }

    /// Sets the authorization hook.
    #[must_use]
    pub fn authorizer<A: Authorizer>(mut self, authorizer: A) -> Self {
        self.authorizer = Arc::new(authorizer);
        self
    }

    /// Sets a hook shared with other endpoints.
    #[must_use]
    pub fn shared_authorizer(mut self, authorizer: Arc<dyn Authorizer>) -> Self {
        self.authorizer = authorizer;
        self
    }

    /// Validates the resource name and declares its actions.
    ///
    /// # Errors
    ///
    /// Returns the [`RegistrationError`] for an invalid resource name or a
    /// rejected action declaration.
    pub fn build(self) -> Result<Endpoint<R>, RegistrationError> {
        let name = self.resource.name();
        if !is_valid_name(name) {
            return Err(RegistrationError::InvalidResourceName {
                name: name.to_string(),
            });
        }

        let endpoint = Endpoint {
            resource: self.resource,
            config: self.config,
            authorizer: self.authorizer,
            actions: ActionCell::new(),
        };
        endpoint.actions.get(&endpoint.resource)?;
        Ok(endpoint)
    }
}

impl<R: Resource> Endpoint<R> {
    /// Starts building an endpoint with the default configuration and
    /// [`AllowAll`].
    pub fn builder(resource: R) -> EndpointBuilder<R> {
        EndpointBuilder {
            resource,
            config: EndpointConfig::default(),
            authorizer: Arc::new(AllowAll),
        }
    }

    /// Builds an endpoint with the defaults.
    ///
    /// # Errors
    ///
    /// See [`EndpointBuilder::build`].
    pub fn new(resource: R) -> Result<Self, RegistrationError> {
        Self::builder(resource).build()
    }

    /// The served resource.
    pub fn resource(&self) -> &R {
        &self.resource
    }

    /// The endpoint configuration.
    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    /// The declared action table.
    ///
    /// # Errors
    ///
    /// Only fails if the declaration failed, which `build` already rules out.
    pub fn actions(&self) -> Result<&ActionRegistry<R>, RegistrationError> {
        self.actions.get(&self.resource)
    }

    /// Path suffixes of actions reachable without a primary key.
    pub(crate) fn collection_paths(&self) -> Result<Vec<String>, RegistrationError> {
        let mut paths: Vec<String> = Vec::new();
        for meta in self.actions()?.metas() {
            if !meta.is_verb_only()
                && meta.target != ActionTarget::Item
                && !paths.contains(&meta.path)
            {
                paths.push(meta.path.clone());
            }
        }
        Ok(paths)
    }

    /// Dispatches one request.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Unhandled`] when a handler fails outside the
    /// error taxonomy. Every taxonomy error is returned as a result instead.
    pub async fn dispatch(&self, request: &Request) -> Result<RestResult, DispatchError> {
        let name = self.resource.name();
        let verb = match request.verb() {
            Ok(verb) => verb,
            Err(err) => {
                tracing::debug!(resource = %name, method = %request.method(), "unsupported method");
                return Ok(RestResult::from_error(&err));
            }
        };

        let primary_key = self.resource.primary_key();
        let target = Target::of(request, &primary_key);

        let span = tracing::info_span!(
            "dispatch",
            resource = %name,
            method = %verb,
            target = target.as_str(),
        );

        let result = self.run(request, verb, target).instrument(span).await?;
        Ok(if verb == Verb::Head {
            result.without_data()
        } else {
            result
        })
    }

    async fn run(
        &self,
        request: &Request,
        verb: Verb,
        target: Target<'_>,
    ) -> Result<RestResult, DispatchError> {
        let registry = self.actions()?;
        let remaining = request
            .path_param(&self.config.action_param)
            .unwrap_or_default()
            .trim_matches('/');

        let resolved = match self.resolve(registry, verb, &target, remaining) {
            Ok(resolved) => resolved,
            Err(err) => {
                tracing::debug!(error = %err, "no handler for request");
                return Ok(RestResult::from_error(&err));
            }
        };

        let (requires_authorization, default_status) = match &resolved {
            Resolved::Action(action) => (action.meta().requires_authorization, StatusCode::OK),
            Resolved::Operation(Capability::Create) => (self.config.protected, StatusCode::CREATED),
            Resolved::Operation(_) => (self.config.protected, StatusCode::OK),
            Resolved::Options => (false, StatusCode::OK),
        };

        if !self.authorizer.authorize(request, requires_authorization) {
            tracing::warn!(requires_authorization, "authorization denied");
            return Ok(RestResult::from_error(&RestError::not_authorized()));
        }

        let outcome = match resolved {
            Resolved::Action(action) => {
                tracing::debug!(action = %action.meta().path, "invoking action");
                action.invoke(&self.resource, request).await
            }
            Resolved::Operation(capability) => {
                tracing::debug!(operation = %capability, "invoking default operation");
                self.invoke(capability, request, target).await
            }
            Resolved::Options => Ok(self.options(registry).into()),
        };

        match outcome {
            Ok(outcome) => {
                let result = outcome.into_result(default_status);
                tracing::debug!(status = result.status().as_u16(), "dispatched");
                Ok(result)
            }
            Err(HandlerError::Rest(err)) => {
                tracing::debug!(status = err.status_code().as_u16(), error = %err, "request rejected");
                Ok(RestResult::from_error(&err))
            }
            Err(HandlerError::Unhandled(source)) => {
                tracing::error!(error = %source, "unhandled failure");
                Err(DispatchError::Unhandled {
                    resource: self.resource.name().to_string(),
                    source,
                })
            }
        }
    }

    fn resolve<'e>(
        &self,
        registry: &'e ActionRegistry<R>,
        verb: Verb,
        target: &Target<'_>,
        remaining: &str,
    ) -> Result<Resolved<'e, R>, RestError> {
        if let Some(action) = registry.lookup(verb, remaining, target) {
            return Ok(Resolved::Action(action));
        }

        let name = self.resource.name();
        if !remaining.is_empty() {
            return Err(RestError::not_found(format!(
                "{name} has no action: {remaining}"
            )));
        }

        let capability = match (verb, target.is_item()) {
            (Verb::Options, _) => return Ok(Resolved::Options),
            (Verb::Get | Verb::Head, false) => Capability::Query,
            (Verb::Get | Verb::Head, true) => Capability::Get,
            (Verb::Post, false) => Capability::Create,
            (Verb::Put | Verb::Patch, true) => Capability::Update,
            (Verb::Delete, true) => Capability::Delete,
            _ => return Err(RestError::verb_not_allowed(name, verb)),
        };

        if !self.resource.capabilities().contains(capability) {
            return Err(RestError::not_allowed(format!(
                "{name} does not implement {capability}"
            )));
        }
        Ok(Resolved::Operation(capability))
    }

    async fn invoke(
        &self,
        capability: Capability,
        request: &Request,
        target: Target<'_>,
    ) -> HandlerResult {
        let pk = target.primary_key().unwrap_or_default();
        match capability {
            Capability::Query => self.resource.query(request).await,
            Capability::Get => self.resource.get(request, pk).await,
            Capability::Create => self.resource.create(request).await,
            Capability::Update => self.resource.update(request, pk).await,
            Capability::Delete => self.resource.delete(request, pk).await,
        }
    }

    /// Lists the verbs the default mapping supports plus every declared action.
    fn options(&self, registry: &ActionRegistry<R>) -> RestResult {
        let capabilities = self.resource.capabilities();
        let verbs: Vec<Verb> = Verb::ALL
            .into_iter()
            .filter(|verb| {
                default_supports(capabilities, *verb) || registry.metas().any(|m| m.method == *verb)
            })
            .collect();

        let data = json!({
            "resource": self.resource.name(),
            "verbs": verbs,
            "actions": registry.metas().collect::<Vec<_>>(),
        });

        let result = RestResult::ok(data);
        if !self.config.allow_header {
            return result;
        }

        let allow = verbs
            .iter()
            .map(Verb::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        match HeaderValue::from_str(&allow) {
            Ok(value) => result.with_header(ALLOW, value),
            Err(_) => result,
        }
    }
}

/// Whether the default mapping answers `verb` for some targeting.
fn default_supports(capabilities: Capabilities, verb: Verb) -> bool {
    match verb {
        Verb::Get | Verb::Head => {
            capabilities.contains(Capability::Query) || capabilities.contains(Capability::Get)
        }
        Verb::Post => capabilities.contains(Capability::Create),
        Verb::Put | Verb::Patch => capabilities.contains(Capability::Update),
        Verb::Delete => capabilities.contains(Capability::Delete),
        Verb::Options => true,
    }
}

impl<R: Resource> fmt::Debug for Endpoint<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("resource", &self.resource.name())
            .field("config", &self.config)
            .field("actions", &self.actions)
            .finish_non_exhaustive()
    }
}
