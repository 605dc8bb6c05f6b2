//! The default CRUD resource.

use std::borrow::Cow;
use std::fmt;

use rested_core::{
    ActionHandler, ActionMeta, ActionRegistry, Capabilities, FilterSyntax, HandlerError,
    HandlerResult, Outcome, RegistrationError, Request, Resource, RestError, RestResult,
    FIELDS_PARAM,
};
use serde_json::Value;

use crate::store::{Item, Store, StoreError};
use crate::validate::{AcceptAll, ValidationMode, Validator};

/// A resource whose operations are delegated to a [`Store`].
///
/// | Operation | Store call | Success |
/// |---|---|---|
/// | query | `query(filters)` | list of items |
/// | get | `get(pk)` | the item, or `NotFound` |
/// | create | `create(payload)` | the stored item |
/// | update | `update(pk, changes)` | the updated item, or `NotFound` |
/// | delete | `delete(pk)` | `204`, or `NotFound` |
///
/// Create payloads are validated in full, update payloads partially; update
/// payloads lose their read-only fields before reaching the store.
///
/// # Example
///
/// ```ignore
/// use rested_model::{ModelResource, RequiredFields};
///
/// let users = ModelResource::new("users", store)
///     .validator(RequiredFields::new(["email"]))
///     .read_only(["id", "created_at"])
///     .action(ActionMeta::new(Verb::Post, "activate"), activate);
/// ```
///
/// Set the validator before adding actions: an endpoint built over a resource
/// whose actions were dropped by [`validator`](Self::validator) fails with
/// [`RegistrationError::DiscardedActions`].
pub struct ModelResource<S, V = AcceptAll> {
    name: String,
    primary_key: Option<String>,
    store: S,
    validator: V,
    read_only: Vec<String>,
    capabilities: Capabilities,
    filters: FilterSyntax,
    actions: Vec<(ActionMeta, ActionHandler<Self>)>,
    discarded_actions: usize,
}

impl<S: Store> ModelResource<S> {
    /// Creates a resource with every capability and no validation.
    pub fn new(name: impl Into<String>, store: S) -> Self {
        Self {
            name: name.into(),
            primary_key: None,
            store,
            validator: AcceptAll,
            read_only: Vec::new(),
            capabilities: Capabilities::all(),
            filters: FilterSyntax::default(),
            actions: Vec::new(),
            discarded_actions: 0,
        }
    }
}

impl<S: Store, V: Validator> ModelResource<S, V> {
    /// Replaces the validator.
    ///
    /// Handlers are typed against the resource, so actions added earlier
    /// cannot be kept. They are counted instead, and declaring the actions of
    /// the new resource fails with [`RegistrationError::DiscardedActions`].
    pub fn validator<W: Validator>(self, validator: W) -> ModelResource<S, W> {
        if !self.actions.is_empty() {
            tracing::warn!(
                resource = %self.name,
                count = self.actions.len(),
                "validator replaced after actions were declared"
            );
        }
        ModelResource {
            name: self.name,
            primary_key: self.primary_key,
            store: self.store,
            validator,
            read_only: self.read_only,
            capabilities: self.capabilities,
            filters: self.filters,
            discarded_actions: self.discarded_actions + self.actions.len(),
            actions: Vec::new(),
        }
    }

    /// Overrides the primary-key path parameter name.
    #[must_use]
    pub fn primary_key_param(mut self, name: impl Into<String>) -> Self {
        self.primary_key = Some(name.into());
        self
    }

    /// Fields stripped from update payloads.
    #[must_use]
    pub fn read_only<I, F>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        self.read_only = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Restricts the supported operations.
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Replaces the filter grammar.
    #[must_use]
    pub fn filter_syntax(mut self, syntax: FilterSyntax) -> Self {
        self.filters = syntax;
        self
    }

    /// Adds a custom action, registered when the endpoint is built.
    #[must_use]
    pub fn action<F>(mut self, meta: ActionMeta, handler: F) -> Self
    where
        F: for<'a> Fn(&'a Self, &'a Request) -> rested_core::ActionFuture<'a>
            + Send
            + Sync
            + 'static,
    {
        self.actions.push((meta, std::sync::Arc::new(handler)));
        self
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn store_error(&self, err: StoreError) -> HandlerError {
        match err {
            StoreError::NotFound { key } => RestError::not_found_item(&self.name, key).into(),
            StoreError::AlreadyExists { key } => RestError::already_exists(&self.name, key).into(),
            StoreError::Unavailable(reason) => {
                HandlerError::unhandled(anyhow::anyhow!("{} store unavailable: {reason}", self.name))
            }
            StoreError::Other(err) => HandlerError::Unhandled(err),
        }
    }

    fn payload(&self, request: &Request, mode: ValidationMode) -> Result<Item, HandlerError> {
        let payload: Value = request.json()?;

        if let Err(errors) = self.validator.validate(&payload, mode) {
            tracing::debug!(resource = %self.name, fields = errors.len(), "payload rejected");
            return Err(
                RestError::validation_with_fields(format!("Invalid {} payload", self.name), errors)
                    .into(),
            );
        }

        match payload {
            Value::Object(item) => Ok(item),
            _ => Err(RestError::validation(format!("{} payload must be a JSON object", self.name)).into()),
        }
    }
}

/// Top-level field selection from `_fields=a,b`; `None` keeps everything.
fn requested_fields(request: &Request) -> Option<Vec<&str>> {
    let raw = request.query().get(FIELDS_PARAM)?;
    let fields: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect();
    if fields.is_empty() || fields.contains(&"*") {
        None
    } else {
        Some(fields)
    }
}

fn restrict(mut item: Item, fields: Option<&[&str]>) -> Value {
    if let Some(fields) = fields {
        item.retain(|key, _| fields.contains(&key.as_str()));
    }
    Value::Object(item)
}

impl<S: Store, V: Validator> Resource for ModelResource<S, V> {
    fn name(&self) -> &str {
        &self.name
    }

    fn primary_key(&self) -> Cow<'_, str> {
        match &self.primary_key {
            Some(pk) => Cow::Borrowed(pk),
            None => Cow::Owned(format!("{}_pk", self.name)),
        }
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn declare_actions(&self, actions: &mut ActionRegistry<Self>) -> Result<(), RegistrationError> {
        if self.discarded_actions > 0 {
            return Err(RegistrationError::DiscardedActions {
                resource: self.name.clone(),
                count: self.discarded_actions,
            });
        }
        for (meta, handler) in &self.actions {
            actions.insert(meta.clone(), handler.clone())?;
        }
        Ok(())
    }

    async fn query(&self, request: &Request) -> HandlerResult {
        let filters = self.filters.parse(request.query()).map_err(RestError::from)?;
        let fields = requested_fields(request);
        tracing::debug!(resource = %self.name, filters = filters.len(), "querying store");

        let items = self
            .store
            .query(&filters)
            .await
            .map_err(|e| self.store_error(e))?;

        let items = items
            .into_iter()
            .map(|item| restrict(item, fields.as_deref()))
            .collect();
        Ok(Outcome::Raw(Value::Array(items)))
    }

    async fn get(&self, request: &Request, pk: &str) -> HandlerResult {
        let fields = requested_fields(request);
        match self.store.get(pk).await.map_err(|e| self.store_error(e))? {
            Some(item) => Ok(Outcome::Raw(restrict(item, fields.as_deref()))),
            None => Err(RestError::not_found_item(&self.name, pk).into()),
        }
    }

    async fn create(&self, request: &Request) -> HandlerResult {
        let item = self.payload(request, ValidationMode::Create)?;
        let created = self
            .store
            .create(item)
            .await
            .map_err(|e| self.store_error(e))?;
        Ok(Outcome::Raw(Value::Object(created)))
    }

    async fn update(&self, request: &Request, pk: &str) -> HandlerResult {
        let mut changes = self.payload(request, ValidationMode::Update)?;
        for field in &self.read_only {
            changes.remove(field);
        }

        match self
            .store
            .update(pk, changes)
            .await
            .map_err(|e| self.store_error(e))?
        {
            Some(item) => Ok(Outcome::Raw(Value::Object(item))),
            None => Err(RestError::not_found_item(&self.name, pk).into()),
        }
    }

    async fn delete(&self, _request: &Request, pk: &str) -> HandlerResult {
        if self.store.delete(pk).await.map_err(|e| self.store_error(e))? {
            Ok(Outcome::Result(RestResult::no_content()))
        } else {
            Err(RestError::not_found_item(&self.name, pk).into())
        }
    }
}

impl<S, V> fmt::Debug for ModelResource<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelResource")
            .field("name", &self.name)
            .field("capabilities", &self.capabilities)
            .field("read_only", &self.read_only)
            .field("actions", &self.actions.len())
            .finish_non_exhaustive()
    }
}
