//! The resource abstraction.

use std::borrow::Cow;
use std::future::Future;

use crate::action::ActionRegistry;
use crate::capability::{Capabilities, Capability};
use crate::error::{HandlerResult, RegistrationError, RestError};
use crate::request::Request;

/// Whether a request addresses the collection or one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    /// No primary key in the path.
    Collection,
    /// The primary key taken from the path.
    Item(&'a str),
}

impl<'a> Target<'a> {
    /// Determines targeting from the primary-key path parameter. An empty
    /// value counts as absent.
    #[must_use]
    pub fn of(request: &'a Request, primary_key: &str) -> Self {
        match request.path_param(primary_key) {
            Some(pk) if !pk.is_empty() => Self::Item(pk),
            _ => Self::Collection,
        }
    }

    /// Returns true for item targeting.
    #[must_use]
    pub const fn is_item(&self) -> bool {
        matches!(self, Self::Item(_))
    }

    /// Returns the primary key for item targeting.
    #[must_use]
    pub const fn primary_key(&self) -> Option<&'a str> {
        match self {
            Self::Item(pk) => Some(pk),
            Self::Collection => None,
        }
    }

    /// `"item"` or `"collection"`, for logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Item(_) => "item",
            Self::Collection => "collection",
        }
    }
}

fn unsupported(name: &str, cap: Capability) -> HandlerResult {
    Err(RestError::not_allowed(format!("{name} does not implement {cap}")).into())
}

/// A logical entity exposed over REST verbs.
///
/// Implementors declare which operations they support through
/// [`capabilities`](Self::capabilities) and override the matching methods.
/// The defaults answer `NotAllowed`, so a capability that is declared but
/// not overridden is still safe.
///
/// Operation futures must be `Send` so that endpoints can be driven from any
/// executor thread.
///
/// # Example
///
/// ```
/// use rested_core::{Capabilities, Capability, HandlerResult, Outcome, Request, Resource};
/// use serde_json::json;
///
/// struct Health;
///
/// impl Resource for Health {
///     fn name(&self) -> &str {
///         "health"
///     }
///
///     fn capabilities(&self) -> Capabilities {
///         Capabilities::from(Capability::Query)
///     }
///
///     async fn query(&self, _request: &Request) -> HandlerResult {
///         Ok(Outcome::Raw(json!({"status": "ok"})))
///     }
/// }
/// ```
pub trait Resource: Send + Sync + Sized + 'static {
    /// Resource name; must be an identifier (`[A-Za-z_][A-Za-z0-9_]*`).
    fn name(&self) -> &str;

    /// Name of the path parameter carrying the primary key.
    fn primary_key(&self) -> Cow<'_, str> {
        Cow::Owned(format!("{}_pk", self.name()))
    }

    /// Operations this resource supports.
    fn capabilities(&self) -> Capabilities;

    /// Declares custom actions. Called once per endpoint.
    fn declare_actions(&self, actions: &mut ActionRegistry<Self>) -> Result<(), RegistrationError> {
        let _ = actions;
        Ok(())
    }

    /// Lists or searches the collection.
    fn query(&self, request: &Request) -> impl Future<Output = HandlerResult> + Send {
        let _ = request;
        let result = unsupported(self.name(), Capability::Query);
        async move { result }
    }

    /// Reads one item.
    fn get(&self, request: &Request, pk: &str) -> impl Future<Output = HandlerResult> + Send {
        let _ = (request, pk);
        let result = unsupported(self.name(), Capability::Get);
        async move { result }
    }

    /// Creates an item.
    fn create(&self, request: &Request) -> impl Future<Output = HandlerResult> + Send {
        let _ = request;
        let result = unsupported(self.name(), Capability::Create);
        async move { result }
    }

    /// Modifies one item.
    fn update(&self, request: &Request, pk: &str) -> impl Future<Output = HandlerResult> + Send {
        let _ = (request, pk);
        let result = unsupported(self.name(), Capability::Update);
        async move { result }
    }

    /// Removes one item.
    fn delete(&self, request: &Request, pk: &str) -> impl Future<Output = HandlerResult> + Send {
        let _ = (request, pk);
        let result = unsupported(self.name(), Capability::Delete);
        async move { result }
    }
}

/// Returns true if `name` is a valid resource name.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Empty;

    impl Resource for Empty {
        fn name(&self) -> &str {
            "empty"
        }

        fn capabilities(&self) -> Capabilities {
            Capabilities::empty()
        }
    }

    #[test]
    fn test_default_primary_key() {
        assert_eq!(Empty.primary_key(), "empty_pk");
    }

    #[test]
    fn test_target_of() {
        let item = Request::builder("GET").path_param("empty_pk", "5").build().unwrap();
        assert_eq!(Target::of(&item, "empty_pk"), Target::Item("5"));

        let blank = Request::builder("GET").path_param("empty_pk", "").build().unwrap();
        assert_eq!(Target::of(&blank, "empty_pk"), Target::Collection);

        let collection = Request::builder("GET").build().unwrap();
        let target = Target::of(&collection, "empty_pk");
        assert!(!target.is_item());
        assert_eq!(target.as_str(), "collection");
    }

    #[tokio::test]
    async fn test_default_operations_not_allowed() {
        let request = Request::builder("GET").build().unwrap();
        let err = Empty.get(&request, "1").await.unwrap_err();
        match err {
            crate::HandlerError::Rest(RestError::NotAllowed { message }) => {
                assert_eq!(message, "empty does not implement get");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_valid_names() {
        assert!(is_valid_name("users"));
        assert!(is_valid_name("_private2"));
        assert!(!is_valid_name("2fast"));
        assert!(!is_valid_name("user-accounts"));
        assert!(!is_valid_name(""));
    }
}
