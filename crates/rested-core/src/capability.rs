//! Declared CRUD capabilities of a resource type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One CRUD operation a resource may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// List or search the collection
    Query,
    /// Read a single item
    Get,
    /// Create an item in the collection
    Create,
    /// Modify a single item
    Update,
    /// Remove a single item
    Delete,
}

impl Capability {
    /// Every capability in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Query,
        Self::Get,
        Self::Create,
        Self::Update,
        Self::Delete,
    ];

    const fn bit(self) -> u8 {
        match self {
            Self::Query => 1,
            Self::Get => 1 << 1,
            Self::Create => 1 << 2,
            Self::Update => 1 << 3,
            Self::Delete => 1 << 4,
        }
    }

    /// Lowercase operation name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Get => "get",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of [`Capability`] values, stored as a bitset.
///
/// A resource declares its set once; the dispatcher checks it before calling
/// an operation.
///
/// # Example
///
/// ```
/// use rested_core::{Capabilities, Capability};
///
/// let caps = Capabilities::read_only().with(Capability::Create);
/// assert!(caps.contains(Capability::Get));
/// assert!(caps.contains(Capability::Create));
/// assert!(!caps.contains(Capability::Delete));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Capabilities(u8);

impl Capabilities {
    /// No capabilities.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Every capability.
    #[must_use]
    pub const fn all() -> Self {
        Self::empty()
            .with(Capability::Query)
            .with(Capability::Get)
            .with(Capability::Create)
            .with(Capability::Update)
            .with(Capability::Delete)
    }

    /// `query` and `get` only.
    #[must_use]
    pub const fn read_only() -> Self {
        Self::empty().with(Capability::Query).with(Capability::Get)
    }

    /// Returns a copy with `cap` added.
    #[must_use]
    pub const fn with(self, cap: Capability) -> Self {
        Self(self.0 | cap.bit())
    }

    /// Returns a copy with `cap` removed.
    #[must_use]
    pub const fn without(self, cap: Capability) -> Self {
        Self(self.0 & !cap.bit())
    }

    /// Adds `cap`.
    pub fn insert(&mut self, cap: Capability) {
        self.0 |= cap.bit();
    }

    /// Returns true if `cap` is declared.
    #[must_use]
    pub const fn contains(&self, cap: Capability) -> bool {
        self.0 & cap.bit() != 0
    }

    /// Returns true if nothing is declared.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterates over the declared capabilities in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL.into_iter().filter(|cap| self.contains(*cap))
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<Capability> for Capabilities {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        let mut caps = Self::empty();
        for cap in iter {
            caps.insert(cap);
        }
        caps
    }
}

impl From<Capability> for Capabilities {
    fn from(cap: Capability) -> Self {
        Self::empty().with(cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_contains_everything() {
        let caps = Capabilities::all();
        for cap in Capability::ALL {
            assert!(caps.contains(cap));
        }
        assert_eq!(caps.iter().count(), 5);
    }

    #[test]
    fn test_empty() {
        let caps = Capabilities::empty();
        assert!(caps.is_empty());
        assert_eq!(caps.iter().next(), None);
    }

    #[test]
    fn test_insert_and_without() {
        let mut caps = Capabilities::empty();
        caps.insert(Capability::Delete);
        caps.insert(Capability::Query);

        assert_eq!(
            caps.iter().collect::<Vec<_>>(),
            vec![Capability::Query, Capability::Delete]
        );
        assert!(!caps.without(Capability::Query).contains(Capability::Query));
    }

    #[test]
    fn test_from_iterator() {
        let caps: Capabilities = [Capability::Get, Capability::Update].into_iter().collect();
        assert!(caps.contains(Capability::Update));
        assert!(!caps.contains(Capability::Create));
        assert_eq!(format!("{caps:?}"), "{Get, Update}");
    }
}
