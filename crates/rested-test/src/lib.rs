//! # rested test
//!
//! Test utilities for rested resources and endpoints. Nothing here touches
//! the network: requests are built in memory, stored items live in a map,
//! and results are checked with assertion helpers.
//!
//! - [`MemoryStore`] - a [`Store`](rested_model::Store) over a map, with
//!   filter evaluation and a switch to simulate an unreachable backend
//! - [`TestRequest`] - fluent builder for requests, path and query included
//! - [`ResultAssertions`] - assertions on [`RestResult`](rested_core::RestResult)
//!
//! ## Example
//!
//! ```ignore
//! use rested_test::{MemoryStore, ResultAssertions, TestRequest};
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn lists_adults() {
//!     let api = app(MemoryStore::new("id").with_items([json!({"id": 1, "age": 30})]));
//!
//!     let (path, request) = TestRequest::get("/users?age__gte=18").into_parts();
//!     let result = api.handle(&path, request).await.unwrap();
//!
//!     result.assert_status_code(200).assert_json_field("0.id", &json!(1));
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/rested-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod assertions;
mod request;
mod store;

pub use assertions::ResultAssertions;
pub use request::{TestRequest, TestRequestBuilder};
pub use store::MemoryStore;
