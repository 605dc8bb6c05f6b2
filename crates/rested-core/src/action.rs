//! Custom actions.
//!
//! A resource declares extra `(verb, path)` operations once, through
//! [`Resource::declare_actions`]. The resulting [`ActionRegistry`] is
//! immutable; [`ActionCell`] computes it exactly once even when many
//! requests race to be first.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use crate::error::{HandlerResult, RegistrationError};
use crate::request::Request;
use crate::resource::{Resource, Target};
use crate::verb::Verb;

/// Future returned by an action handler.
pub type ActionFuture<'a> = Pin<Box<dyn Future<Output = HandlerResult> + Send + 'a>>;

/// Type-erased action handler.
pub type ActionHandler<R> =
    Arc<dyn for<'a> Fn(&'a R, &'a Request) -> ActionFuture<'a> + Send + Sync>;

/// Which requests an action answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionTarget {
    /// Only requests addressing a single item.
    #[default]
    Item,
    /// Only requests addressing the collection.
    Collection,
    /// Both.
    Any,
}

impl ActionTarget {
    /// Returns true if a request with the given targeting may use this action.
    #[must_use]
    pub const fn accepts(&self, target: &Target<'_>) -> bool {
        match self {
            Self::Any => true,
            Self::Item => target.is_item(),
            Self::Collection => !target.is_item(),
        }
    }
}

/// Immutable description of a custom action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionMeta {
    /// The verb the action answers.
    pub method: Verb,
    /// Path suffix after the resource path; empty for verb-only actions.
    pub path: String,
    /// Passed to the authorization hook.
    pub requires_authorization: bool,
    /// Item, collection, or both.
    pub target: ActionTarget,
    /// Free-form description for introspection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ActionMeta {
    /// Creates metadata for `method` on `path`, item-scoped and protected.
    #[must_use]
    pub fn new(method: Verb, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            requires_authorization: true,
            target: ActionTarget::Item,
            description: None,
        }
    }

    /// Metadata for a verb-only action, which overrides the default mapping
    /// for `method` when no path remains.
    #[must_use]
    pub fn verb(method: Verb) -> Self {
        Self::new(method, "")
    }

    /// Makes the action answer collection requests.
    #[must_use]
    pub fn collection(mut self) -> Self {
        self.target = ActionTarget::Collection;
        self
    }

    /// Makes the action answer item and collection requests.
    #[must_use]
    pub fn any_target(mut self) -> Self {
        self.target = ActionTarget::Any;
        self
    }

    /// Marks the action as not requiring authorization.
    #[must_use]
    pub fn public(mut self) -> Self {
        self.requires_authorization = false;
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns true for verb-only actions.
    #[must_use]
    pub fn is_verb_only(&self) -> bool {
        self.path.is_empty()
    }

    fn matches_path(&self, remaining: &str) -> bool {
        if self.path.is_empty() {
            return remaining.is_empty();
        }
        remaining
            .strip_prefix(self.path.as_str())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }
}

/// A registered action: metadata plus handler.
pub struct Action<R> {
    meta: ActionMeta,
    handler: ActionHandler<R>,
}

impl<R> Action<R> {
    /// The action's metadata.
    #[must_use]
    pub const fn meta(&self) -> &ActionMeta {
        &self.meta
    }

    /// Runs the handler.
    pub fn invoke<'a>(&'a self, resource: &'a R, request: &'a Request) -> ActionFuture<'a> {
        (self.handler)(resource, request)
    }
}

impl<R> Clone for Action<R> {
    fn clone(&self) -> Self {
        Self {
            meta: self.meta.clone(),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<R> fmt::Debug for Action<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

/// Table of the custom actions one resource declared.
///
/// Keys are `(verb, path)`. Path-scoped actions are kept longest path first
/// so that lookup picks the most specific suffix.
///
/// # Example
///
/// ```
/// use rested_core::{ActionMeta, ActionRegistry, Outcome, Request, Target, Verb};
/// # use rested_core::{Capabilities, Resource};
/// # struct Users;
/// # impl Resource for Users {
/// #     fn name(&self) -> &str { "users" }
/// #     fn capabilities(&self) -> Capabilities { Capabilities::empty() }
/// # }
///
/// let mut actions = ActionRegistry::<Users>::new("users");
/// actions
///     .register(ActionMeta::new(Verb::Post, "activate"), |_users, _req| {
///         Box::pin(async { Ok(Outcome::Raw(serde_json::json!({"active": true}))) })
///     })
///     .unwrap();
///
/// let found = actions.lookup(Verb::Post, "activate", &Target::Item("1"));
/// assert!(found.is_some());
/// assert!(actions.lookup(Verb::Post, "activate", &Target::Collection).is_none());
/// ```
pub struct ActionRegistry<R> {
    resource: String,
    actions: Vec<Action<R>>,
}

impl<R> ActionRegistry<R> {
    /// Creates an empty table for the named resource.
    #[must_use]
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            actions: Vec::new(),
        }
    }

    /// Name of the owning resource.
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Registers an action.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::DuplicateAction`] if `(method, path)` is
    /// already taken and [`RegistrationError::InvalidActionPath`] for a
    /// malformed path.
    pub fn register<F>(&mut self, meta: ActionMeta, handler: F) -> Result<(), RegistrationError>
    where
        F: for<'a> Fn(&'a R, &'a Request) -> ActionFuture<'a> + Send + Sync + 'static,
    {
        self.insert(meta, Arc::new(handler))
    }

    /// Registers an action with an already shared handler.
    ///
    /// # Errors
    ///
    /// Same as [`register`](Self::register).
    pub fn insert(
        &mut self,
        meta: ActionMeta,
        handler: ActionHandler<R>,
    ) -> Result<(), RegistrationError> {
        self.validate_path(&meta.path)?;

        if self
            .actions
            .iter()
            .any(|a| a.meta.method == meta.method && a.meta.path == meta.path)
        {
            return Err(RegistrationError::DuplicateAction {
                resource: self.resource.clone(),
                method: meta.method,
                path: meta.path,
            });
        }

        tracing::debug!(
            resource = %self.resource,
            method = %meta.method,
            path = %meta.path,
            "registered action"
        );

        // Stable insert keeps declaration order among equal lengths.
        let position = self
            .actions
            .iter()
            .position(|a| a.meta.path.len() < meta.path.len())
            .unwrap_or(self.actions.len());
        self.actions.insert(position, Action { meta, handler });
        Ok(())
    }

    fn validate_path(&self, path: &str) -> Result<(), RegistrationError> {
        let reason = if path.starts_with('/') || path.ends_with('/') {
            Some("must not start or end with '/'")
        } else if path.contains("//") {
            Some("must not contain empty segments")
        } else if path
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '{' | '}' | '*' | '?' | '#'))
        {
            Some("must not contain whitespace or route syntax")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(RegistrationError::InvalidActionPath {
                resource: self.resource.clone(),
                path: path.to_string(),
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Finds the action for `method` and the path left after the resource.
    ///
    /// A path-scoped action matches when the remaining path equals its
    /// suffix or continues it with `/`; the longest suffix wins. A verb-only
    /// action matches only when nothing remains. In both cases the action's
    /// target must accept `target`.
    #[must_use]
    pub fn lookup(&self, method: Verb, remaining: &str, target: &Target<'_>) -> Option<&Action<R>> {
        let remaining = remaining.trim_matches('/');
        self.actions.iter().find(|action| {
            action.meta.method == method
                && action.meta.target.accepts(target)
                && action.meta.matches_path(remaining)
        })
    }

    /// Iterates over all actions, longest path first.
    pub fn iter(&self) -> impl Iterator<Item = &Action<R>> {
        self.actions.iter()
    }

    /// Iterates over all action metadata.
    pub fn metas(&self) -> impl Iterator<Item = &ActionMeta> {
        self.actions.iter().map(Action::meta)
    }

    /// Number of registered actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns true if no actions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl<R> fmt::Debug for ActionRegistry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("resource", &self.resource)
            .field("actions", &self.actions)
            .finish()
    }
}

/// Write-once holder of a resource's [`ActionRegistry`].
///
/// The first call to [`get`](Self::get) runs
/// [`Resource::declare_actions`]; concurrent first callers block until that
/// single run finishes and then all observe the same table. A declaration
/// failure is stored and returned to every caller.
///
/// `new` is `const`, so a cell can live in a `static`.
pub struct ActionCell<R> {
    cell: OnceLock<Result<ActionRegistry<R>, RegistrationError>>,
}

impl<R> ActionCell<R> {
    /// Creates an empty cell.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Returns true once the table has been computed.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<R: Resource> ActionCell<R> {
    /// Returns the table, declaring it on first access.
    ///
    /// # Errors
    ///
    /// Returns the [`RegistrationError`] raised by the declaration.
    pub fn get(&self, resource: &R) -> Result<&ActionRegistry<R>, RegistrationError> {
        self.cell
            .get_or_init(|| {
                let mut registry = ActionRegistry::new(resource.name());
                resource.declare_actions(&mut registry)?;
                tracing::debug!(
                    resource = %registry.resource(),
                    actions = registry.len(),
                    "declared actions"
                );
                Ok(registry)
            })
            .as_ref()
            .map_err(Clone::clone)
    }
}

impl<R> Default for ActionCell<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for ActionCell<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionCell")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Capabilities, Outcome};
    use serde_json::json;

    struct Jobs;

    impl Resource for Jobs {
        fn name(&self) -> &str {
            "jobs"
        }

        fn capabilities(&self) -> Capabilities {
            Capabilities::empty()
        }
    }

    fn reply(
        tag: &'static str,
    ) -> impl for<'a> Fn(&'a Jobs, &'a Request) -> ActionFuture<'a> + Send + Sync + 'static {
        move |_, _| Box::pin(async move { Ok(Outcome::Raw(json!(tag))) })
    }

    async fn run(
        registry: &ActionRegistry<Jobs>,
        method: Verb,
        path: &str,
        target: &Target<'_>,
    ) -> Option<serde_json::Value> {
        let request = Request::builder(method.as_str()).build().unwrap();
        let action = registry.lookup(method, path, target)?;
        match action.invoke(&Jobs, &request).await.unwrap() {
            Outcome::Raw(value) => Some(value),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let mut registry = ActionRegistry::new("jobs");
        registry
            .register(ActionMeta::new(Verb::Post, "run"), reply("a"))
            .unwrap();
        let err = registry
            .register(ActionMeta::new(Verb::Post, "run").collection(), reply("b"))
            .unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateAction { .. }));

        registry
            .register(ActionMeta::new(Verb::Get, "run"), reply("c"))
            .unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_invalid_paths_rejected() {
        let mut registry = ActionRegistry::new("jobs");
        for path in ["/run", "run/", "a//b", "has space", "{id}", "*rest"] {
            let err = registry
                .register(ActionMeta::new(Verb::Post, path), reply("x"))
                .unwrap_err();
            assert!(
                matches!(err, RegistrationError::InvalidActionPath { .. }),
                "{path}"
            );
        }
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_longest_suffix_wins() {
        let mut registry = ActionRegistry::new("jobs");
        registry
            .register(ActionMeta::new(Verb::Post, "logs"), reply("logs"))
            .unwrap();
        registry
            .register(ActionMeta::new(Verb::Post, "logs/archive"), reply("archive"))
            .unwrap();
        let item = Target::Item("1");

        assert_eq!(run(&registry, Verb::Post, "logs/archive", &item).await, Some(json!("archive")));
        assert_eq!(run(&registry, Verb::Post, "logs/archive/2024", &item).await, Some(json!("archive")));
        assert_eq!(run(&registry, Verb::Post, "logs/other", &item).await, Some(json!("logs")));
        assert_eq!(run(&registry, Verb::Post, "logsx", &item).await, None);
    }

    #[tokio::test]
    async fn test_verb_only_needs_empty_remaining_path() {
        let mut registry = ActionRegistry::new("jobs");
        registry
            .register(ActionMeta::verb(Verb::Delete).any_target(), reply("purge"))
            .unwrap();

        assert_eq!(
            run(&registry, Verb::Delete, "", &Target::Collection).await,
            Some(json!("purge"))
        );
        assert_eq!(run(&registry, Verb::Delete, "/", &Target::Item("1")).await, Some(json!("purge")));
        assert_eq!(run(&registry, Verb::Delete, "extra", &Target::Item("1")).await, None);
    }

    #[tokio::test]
    async fn test_path_action_beats_verb_only() {
        let mut registry = ActionRegistry::new("jobs");
        registry
            .register(ActionMeta::verb(Verb::Post), reply("verb"))
            .unwrap();
        registry
            .register(ActionMeta::new(Verb::Post, "retry"), reply("retry"))
            .unwrap();
        let item = Target::Item("1");

        assert_eq!(run(&registry, Verb::Post, "retry", &item).await, Some(json!("retry")));
        assert_eq!(run(&registry, Verb::Post, "", &item).await, Some(json!("verb")));
    }

    #[test]
    fn test_target_filtering() {
        let mut registry = ActionRegistry::new("jobs");
        registry
            .register(ActionMeta::new(Verb::Post, "import").collection(), reply("import"))
            .unwrap();

        assert!(registry.lookup(Verb::Post, "import", &Target::Collection).is_some());
        assert!(registry.lookup(Verb::Post, "import", &Target::Item("3")).is_none());
        assert!(registry.lookup(Verb::Get, "import", &Target::Collection).is_none());
    }

    #[test]
    fn test_meta_defaults() {
        let meta = ActionMeta::new(Verb::Post, "activate");
        assert!(meta.requires_authorization);
        assert_eq!(meta.target, ActionTarget::Item);
        assert!(!meta.is_verb_only());
        assert!(!meta.clone().public().requires_authorization);
        assert_eq!(meta.describe("Activate").description.as_deref(), Some("Activate"));
    }

    #[test]
    fn test_cell_caches_failure() {
        struct Broken;

        impl Resource for Broken {
            fn name(&self) -> &str {
                "broken"
            }

            fn capabilities(&self) -> Capabilities {
                Capabilities::empty()
            }

            fn declare_actions(
                &self,
                actions: &mut ActionRegistry<Self>,
            ) -> Result<(), RegistrationError> {
                actions.register(ActionMeta::new(Verb::Post, "x"), |_, _| {
                    Box::pin(async { Ok(Outcome::empty()) })
                })?;
                actions.register(ActionMeta::new(Verb::Post, "x"), |_, _| {
                    Box::pin(async { Ok(Outcome::empty()) })
                })
            }
        }

        let cell = ActionCell::new();
        assert!(!cell.is_initialized());
        let first = cell.get(&Broken).unwrap_err();
        let second = cell.get(&Broken).unwrap_err();
        assert_eq!(first, second);
        assert!(cell.is_initialized());
    }
}
