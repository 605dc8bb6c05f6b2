//! `ModelResource` against a small keyed store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use http::StatusCode;
use parking_lot::Mutex;
use rested_core::{
    Capabilities, Capability, FilterExpression, FilterValue, HandlerError, Operator, Outcome,
    Request, Resource, RestError,
};
use rested_model::{Item, ModelResource, RequiredFields, Store, StoreError};
use serde_json::{json, Value};

#[derive(Default)]
struct KeyedStore {
    items: Mutex<BTreeMap<String, Item>>,
    last_filters: Mutex<Vec<FilterExpression>>,
    offline: AtomicBool,
}

impl KeyedStore {
    fn seeded(items: &[Value]) -> Self {
        let store = Self::default();
        for item in items {
            let item = item.as_object().unwrap().clone();
            let key = item["id"].to_string();
            store.items.lock().insert(key, item);
        }
        store
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".into()));
        }
        Ok(())
    }
}

impl Store for KeyedStore {
    async fn create(&self, item: Item) -> Result<Item, StoreError> {
        self.check_online()?;
        let key = item.get("id").map(Value::to_string).unwrap_or_default();
        let mut items = self.items.lock();
        if items.contains_key(&key) {
            return Err(StoreError::already_exists(key));
        }
        items.insert(key, item.clone());
        Ok(item)
    }

    async fn get(&self, pk: &str) -> Result<Option<Item>, StoreError> {
        self.check_online()?;
        Ok(self.items.lock().get(pk).cloned())
    }

    async fn update(&self, pk: &str, changes: Item) -> Result<Option<Item>, StoreError> {
        self.check_online()?;
        let mut items = self.items.lock();
        Ok(items.get_mut(pk).map(|item| {
            item.extend(changes);
            item.clone()
        }))
    }

    async fn delete(&self, pk: &str) -> Result<bool, StoreError> {
        self.check_online()?;
        Ok(self.items.lock().remove(pk).is_some())
    }

    async fn query(&self, filters: &[FilterExpression]) -> Result<Vec<Item>, StoreError> {
        self.check_online()?;
        *self.last_filters.lock() = filters.to_vec();
        Ok(self.items.lock().values().cloned().collect())
    }
}

fn users() -> ModelResource<KeyedStore, RequiredFields> {
    let store = KeyedStore::seeded(&[
        json!({"id": 1, "name": "Ann", "email": "ann@example.com", "role": "admin"}),
        json!({"id": 2, "name": "Bob", "email": "bob@example.com", "role": "user"}),
    ]);
    ModelResource::new("users", store)
        .validator(RequiredFields::new(["id", "email"]))
        .read_only(["id", "role"])
}

fn raw(outcome: Outcome) -> Value {
    match outcome {
        Outcome::Raw(value) => value,
        other => panic!("expected raw outcome, got {other:?}"),
    }
}

fn rest_error(err: HandlerError) -> RestError {
    match err {
        HandlerError::Rest(err) => err,
        HandlerError::Unhandled(err) => panic!("unexpected unhandled error: {err}"),
    }
}

#[tokio::test]
async fn query_passes_parsed_filters_to_store() {
    let users = users();
    let request = Request::builder("GET")
        .query_string("age__gte=21&role=admin&_fields=name")
        .build()
        .unwrap();

    let items = raw(users.query(&request).await.unwrap());
    assert_eq!(items, json!([{"name": "Ann"}, {"name": "Bob"}]));

    let filters = users.store().last_filters.lock().clone();
    assert_eq!(
        filters,
        vec![
            FilterExpression::new("age", Operator::Gte, FilterValue::Int(21)),
            FilterExpression::new("role", Operator::Eq, FilterValue::String("admin".into())),
        ]
    );
}

#[tokio::test]
async fn query_rejects_empty_in_list() {
    let request = Request::builder("GET")
        .query_string("ids__in=")
        .build()
        .unwrap();
    let err = rest_error(users().query(&request).await.unwrap_err());
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_restricts_fields() {
    let request = Request::builder("GET")
        .query_param("_fields", "id, email")
        .build()
        .unwrap();
    let item = raw(users().get(&request, "1").await.unwrap());
    assert_eq!(item, json!({"id": 1, "email": "ann@example.com"}));
}

#[tokio::test]
async fn get_missing_is_not_found() {
    let request = Request::builder("GET").build().unwrap();
    let err = rest_error(users().get(&request, "404").await.unwrap_err());
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    assert!(matches!(err, RestError::NotFound { key: Some(ref k), .. } if k == "404"));
}

#[tokio::test]
async fn create_validates_and_detects_collisions() {
    let users = users();

    let missing_email = Request::builder("POST")
        .json(&json!({"id": 3}))
        .build()
        .unwrap();
    let err = rest_error(users.create(&missing_email).await.unwrap_err());
    assert!(matches!(err, RestError::Validation { .. }));
    let envelope = err.to_envelope();
    assert_eq!(
        envelope.error.details.unwrap()["fields"]["email"],
        json!(["is required"])
    );

    let duplicate = Request::builder("POST")
        .json(&json!({"id": 1, "email": "again@example.com"}))
        .build()
        .unwrap();
    let err = rest_error(users.create(&duplicate).await.unwrap_err());
    assert_eq!(err.status_code(), StatusCode::CONFLICT);

    let fresh = Request::builder("POST")
        .json(&json!({"id": 3, "email": "cy@example.com"}))
        .build()
        .unwrap();
    let created = raw(users.create(&fresh).await.unwrap());
    assert_eq!(created["email"], "cy@example.com");
}

#[tokio::test]
async fn create_rejects_malformed_json() {
    let request = Request::builder("POST").body("{oops").build().unwrap();
    let err = rest_error(users().create(&request).await.unwrap_err());
    assert!(matches!(err, RestError::BadRequest { .. }));
}

#[tokio::test]
async fn update_is_partial_and_strips_read_only_fields() {
    let users = users();
    let request = Request::builder("PATCH")
        .json(&json!({"name": "Annie", "role": "root", "id": 99}))
        .build()
        .unwrap();

    let updated = raw(users.update(&request, "1").await.unwrap());
    assert_eq!(updated["name"], "Annie");
    assert_eq!(updated["role"], "admin");
    assert_eq!(updated["id"], 1);

    let err = rest_error(users.update(&request, "77").await.unwrap_err());
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_requires_object_payload() {
    let request = Request::builder("PUT").json(&json!([1])).build().unwrap();
    let err = rest_error(users().update(&request, "1").await.unwrap_err());
    assert!(matches!(err, RestError::Validation { .. }));
}

#[tokio::test]
async fn delete_returns_no_content_then_not_found() {
    let users = users();
    let request = Request::builder("DELETE").build().unwrap();

    match users.delete(&request, "2").await.unwrap() {
        Outcome::Result(result) => {
            assert_eq!(result.status(), StatusCode::NO_CONTENT);
            assert!(result.data().is_none());
        }
        other => panic!("expected a finished result, got {other:?}"),
    }

    let err = rest_error(users.delete(&request, "2").await.unwrap_err());
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unavailable_store_is_unhandled() {
    let users = users();
    users.store().offline.store(true, Ordering::SeqCst);
    let request = Request::builder("GET").build().unwrap();

    let err = users.get(&request, "1").await.unwrap_err();
    assert!(matches!(err, HandlerError::Unhandled(_)));
    assert!(err.to_string().contains("users store unavailable"));
}

#[test]
fn primary_key_and_capabilities() {
    let users = users().with_capabilities(Capabilities::read_only());
    assert_eq!(users.primary_key(), "users_pk");
    assert!(users.capabilities().contains(Capability::Get));
    assert!(!users.capabilities().contains(Capability::Delete));

    let renamed = users.primary_key_param("id");
    assert_eq!(renamed.primary_key(), "id");
}
