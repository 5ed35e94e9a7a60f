//! The `DocumentStore` trait.
//!
//! Implemented by storage backends (`agora-store-sqlite`, `agora-store-rest`).
//! Repositories depend on this abstraction, never on a concrete backend.

use std::future::Future;

use serde_json::{Map, Value};

use crate::document::{Document, DocumentId, Filter, Patch};

/// Abstraction over a remote document store.
///
/// Documents are opaque JSON objects grouped into named collections. Ids are
/// assigned by the store on [`add`](DocumentStore::add) and stable
/// thereafter.
///
/// [`update`](DocumentStore::update) must apply its [`Patch`] atomically:
/// two concurrent array-union or array-remove callers may not lose each
/// other's elements. Whether that happens under a local transaction or on a
/// server is the backend's concern.
///
/// All methods return `Send` futures so the trait can be used from
/// multi-threaded async runtimes.
pub trait DocumentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Every document in `collection`, in insertion order.
  fn get_all<'a>(
    &'a self,
    collection: &'a str,
  ) -> impl Future<Output = Result<Vec<Document>, Self::Error>> + Send + 'a;

  /// Retrieve one document. Absence is `Ok(None)`, not an error.
  fn get<'a>(
    &'a self,
    collection: &'a str,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Document>, Self::Error>> + Send + 'a;

  /// Every document in `collection` matching `filter`, in insertion order.
  fn query<'a>(
    &'a self,
    collection: &'a str,
    filter: &'a Filter,
  ) -> impl Future<Output = Result<Vec<Document>, Self::Error>> + Send + 'a;

  /// Persist a new document and return the store-assigned id.
  fn add<'a>(
    &'a self,
    collection: &'a str,
    fields: Map<String, Value>,
  ) -> impl Future<Output = Result<DocumentId, Self::Error>> + Send + 'a;

  /// Apply `patch` to an existing document atomically. An unknown id is an
  /// error.
  fn update<'a>(
    &'a self,
    collection: &'a str,
    id: &'a str,
    patch: Patch,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Delete a document. An unknown id is an error.
  fn delete<'a>(
    &'a self,
    collection: &'a str,
    id: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
