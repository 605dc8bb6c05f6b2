//! Path parameter storage.
//!
//! Routes rarely capture more than a couple of values (a primary key and
//! maybe an action path), so parameters live inline in a small vector.

use smallvec::SmallVec;

/// Number of parameters stored inline before spilling to the heap.
const INLINE_PARAMS: usize = 4;

/// Named values captured from a request path.
///
/// Names are unique: [`Params::insert`] replaces an existing value, while
/// [`Params::push`] appends unconditionally and is meant for matchers that
/// already guarantee uniqueness.
///
/// # Example
///
/// ```rust
/// use rested_router::Params;
///
/// let mut params = Params::new();
/// params.push("users_pk", "42");
/// params.insert("action", "activate");
///
/// assert_eq!(params.get("users_pk"), Some("42"));
/// assert_eq!(params.get("action"), Some("activate"));
/// assert_eq!(params.get("unknown"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    inner: SmallVec<[(String, String); INLINE_PARAMS]>,
}

impl Params {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter without checking for an existing name.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Sets a parameter, replacing the value if the name is already present.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.inner.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.inner.push((name, value)),
        }
    }

    /// Returns the value captured for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if a value was captured for `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Removes the last captured parameter. Used by the matcher to backtrack.
    pub(crate) fn pop(&mut self) {
        self.inner.pop();
    }

    /// Copies every parameter from `other` into `self`, overriding duplicates.
    pub fn merge(&mut self, other: &Params) {
        for (name, value) in other {
            self.insert(name, value);
        }
    }

    /// Returns true if no parameters were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Iterates over `(name, value)` pairs in capture order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a str, &'a str);
    type IntoIter = std::iter::Map<
        std::slice::Iter<'a, (String, String)>,
        fn(&'a (String, String)) -> (&'a str, &'a str),
    >;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<N, V> FromIterator<(N, V)> for Params
where
    N: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_new() {
        let params = Params::new();
        assert!(params.is_empty());
        assert_eq!(params.len(), 0);
    }

    #[test]
    fn test_params_insert_replaces() {
        let mut params = Params::new();
        params.insert("users_pk", "1");
        params.insert("users_pk", "2");

        assert_eq!(params.len(), 1);
        assert_eq!(params.get("users_pk"), Some("2"));
    }

    #[test]
    fn test_params_push_and_pop() {
        let mut params = Params::new();
        params.push("a", "1");
        params.push("b", "2");
        params.pop();

        assert_eq!(params.len(), 1);
        assert!(params.contains("a"));
        assert!(!params.contains("b"));
    }

    #[test]
    fn test_params_merge_overrides() {
        let mut base: Params = [("users_pk", "1"), ("action", "x")].into_iter().collect();
        let other: Params = [("action", "activate")].into_iter().collect();

        base.merge(&other);
        assert_eq!(base.get("users_pk"), Some("1"));
        assert_eq!(base.get("action"), Some("activate"));
    }

    #[test]
    fn test_params_iter_keeps_order() {
        let mut params = Params::new();
        params.push("a", "1");
        params.push("b", "2");

        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("a", "1"), ("b", "2")]);
    }

    #[test]
    fn test_params_spill_past_inline_capacity() {
        let mut params = Params::new();
        for i in 0..10 {
            params.push(format!("key{i}"), format!("value{i}"));
        }

        assert_eq!(params.len(), 10);
        assert_eq!(params.get("key7"), Some("value7"));
    }
}
