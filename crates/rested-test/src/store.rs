//! In-memory persistence collaborator.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};

use chrono::SecondsFormat;
use parking_lot::RwLock;
use rested_core::{FilterExpression, FilterValue, Operator};
use rested_model::{Item, Store, StoreError};
use serde_json::Value;

/// A [`Store`] keeping items in a map keyed by one of their fields.
///
/// Items created without a key get the next integer. Queries evaluate every
/// filter expression against the stored JSON, so endpoint tests can check
/// filtering end to end.
///
/// # Example
///
/// ```
/// use rested_test::MemoryStore;
/// use serde_json::json;
///
/// let store = MemoryStore::new("id").with_items([
///     json!({"id": 1, "name": "Ann"}),
///     json!({"id": 2, "name": "Bob"}),
/// ]);
/// assert_eq!(store.len(), 2);
/// assert_eq!(store.item("2").unwrap()["name"], "Bob");
/// ```
#[derive(Debug)]
pub struct MemoryStore {
    key: String,
    items: RwLock<BTreeMap<String, Item>>,
    next_id: AtomicU64,
    offline: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new("id")
    }
}

impl MemoryStore {
    /// Creates an empty store keyed by `key`.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            items: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
            offline: AtomicBool::new(false),
        }
    }

    /// Seeds the store.
    ///
    /// # Panics
    ///
    /// Panics if an item is not a JSON object or lacks the key field.
    #[must_use]
    pub fn with_items(self, items: impl IntoIterator<Item = Value>) -> Self {
        {
            let mut stored = self.items.write();
            for item in items {
                let Value::Object(item) = item else {
                    panic!("seed items must be JSON objects");
                };
                let key = item
                    .get(&self.key)
                    .map(key_string)
                    .expect("seed items must carry the key field");
                self.bump_next_id(&key);
                stored.insert(key, item);
            }
        }
        self
    }

    /// Makes every operation fail with [`StoreError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, AtomicOrdering::SeqCst);
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// A copy of one stored item.
    pub fn item(&self, key: &str) -> Option<Item> {
        self.items.read().get(key).cloned()
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(AtomicOrdering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".into()));
        }
        Ok(())
    }

    fn bump_next_id(&self, key: &str) {
        if let Ok(n) = key.parse::<u64>() {
            self.next_id.fetch_max(n.saturating_add(1), AtomicOrdering::SeqCst);
        }
    }
}

/// Map key for a JSON key value: strings unquoted, everything else as JSON.
fn key_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl Store for MemoryStore {
    async fn create(&self, mut item: Item) -> Result<Item, StoreError> {
        self.check_online()?;
        let mut items = self.items.write();

        let key = match item.get(&self.key) {
            Some(value) => key_string(value),
            None => {
                let id = self.next_id.fetch_add(1, AtomicOrdering::SeqCst);
                item.insert(self.key.clone(), Value::from(id));
                id.to_string()
            }
        };

        if items.contains_key(&key) {
            return Err(StoreError::already_exists(key));
        }
        self.bump_next_id(&key);
        items.insert(key, item.clone());
        Ok(item)
    }

    async fn get(&self, pk: &str) -> Result<Option<Item>, StoreError> {
        self.check_online()?;
        Ok(self.items.read().get(pk).cloned())
    }

    async fn update(&self, pk: &str, mut changes: Item) -> Result<Option<Item>, StoreError> {
        self.check_online()?;
        changes.remove(&self.key);
        let mut items = self.items.write();
        Ok(items.get_mut(pk).map(|item| {
            item.extend(changes);
            item.clone()
        }))
    }

    async fn delete(&self, pk: &str) -> Result<bool, StoreError> {
        self.check_online()?;
        Ok(self.items.write().remove(pk).is_some())
    }

    async fn query(&self, filters: &[FilterExpression]) -> Result<Vec<Item>, StoreError> {
        self.check_online()?;
        Ok(self
            .items
            .read()
            .values()
            .filter(|item| filters.iter().all(|f| matches(item, f)))
            .cloned()
            .collect())
    }
}

/// A value reduced to something comparable across JSON and filter types.
#[derive(Debug, PartialEq)]
enum Scalar {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Scalar {
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => n.as_f64().map(Self::Number),
            Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }

    fn from_filter(value: &FilterValue) -> Option<Self> {
        match value {
            FilterValue::Bool(b) => Some(Self::Bool(*b)),
            FilterValue::Int(i) => Some(Self::Number(*i as f64)),
            FilterValue::Float(f) => Some(Self::Number(*f)),
            FilterValue::Date(d) => Some(Self::Text(d.to_string())),
            FilterValue::DateTime(dt) => {
                Some(Self::Text(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)))
            }
            FilterValue::String(s) => Some(Self::Text(s.clone())),
            FilterValue::List(_) => None,
        }
    }

    fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.partial_cmp(b),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

fn equals(field: &Value, value: &FilterValue) -> bool {
    match (Scalar::from_json(field), Scalar::from_filter(value)) {
        (Some(a), Some(b)) => a.compare(&b) == Some(Ordering::Equal),
        _ => false,
    }
}

fn matches(item: &Item, filter: &FilterExpression) -> bool {
    let Some(field) = item.get(&filter.field) else {
        return filter.operator == Operator::Ne;
    };

    let ordering = || {
        Scalar::from_json(field)
            .zip(Scalar::from_filter(&filter.value))
            .and_then(|(a, b)| a.compare(&b))
    };

    match filter.operator {
        Operator::Eq => equals(field, &filter.value),
        Operator::Ne => !equals(field, &filter.value),
        Operator::Gt => ordering() == Some(Ordering::Greater),
        Operator::Gte => matches!(ordering(), Some(Ordering::Greater | Ordering::Equal)),
        Operator::Lt => ordering() == Some(Ordering::Less),
        Operator::Lte => matches!(ordering(), Some(Ordering::Less | Ordering::Equal)),
        Operator::In => filter
            .value
            .as_list()
            .is_some_and(|values| values.iter().any(|v| equals(field, v))),
        Operator::Contains => match field {
            Value::Array(elements) => elements.iter().any(|e| equals(e, &filter.value)),
            Value::String(s) => match Scalar::from_filter(&filter.value) {
                Some(Scalar::Text(needle)) => s.contains(&needle),
                Some(Scalar::Number(n)) => s.contains(&n.to_string()),
                _ => false,
            },
            _ => false,
        },
    }
}
