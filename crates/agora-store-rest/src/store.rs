//! [`RestStore`] — the HTTP implementation of [`DocumentStore`].

use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde_json::{json, Map, Value};

use agora_core::{
  document::{Document, DocumentId, Filter, Patch},
  store::DocumentStore,
};

use crate::{
  wire::{self, summarize_body},
  Error, RestConfig, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An agora document store backed by the hosted backend service.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based and the
/// bearer token is shared across clones.
#[derive(Clone)]
pub struct RestStore {
  pub(crate) http: reqwest::Client,
  config:          RestConfig,
  // Written on sign-in/out, read per request. Never held across an await.
  token:           Arc<RwLock<Option<String>>>,
}

impl RestStore {
  pub fn new(config: RestConfig) -> Result<Self> {
    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self {
      http,
      config,
      token: Arc::new(RwLock::new(None)),
    })
  }

  pub(crate) fn rest_url(&self, collection: &str) -> String {
    format!(
      "{}/rest/v1/{}",
      self.config.base_url.trim_end_matches('/'),
      collection
    )
  }

  pub(crate) fn auth_url(&self, path: &str) -> String {
    format!(
      "{}/auth/v1/{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  pub(crate) fn api_key(&self) -> &str {
    &self.config.api_key
  }

  /// The current bearer: the signed-in user's access token, or the api key.
  pub(crate) fn bearer(&self) -> String {
    self
      .token
      .read()
      .ok()
      .and_then(|token| token.clone())
      .unwrap_or_else(|| self.config.api_key.clone())
  }

  pub(crate) fn set_token(&self, token: Option<String>) {
    if let Ok(mut guard) = self.token.write() {
      *guard = token;
    }
  }

  pub(crate) fn apply_headers(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    req
      .header("apikey", &self.config.api_key)
      .header("Authorization", format!("Bearer {}", self.bearer()))
  }

  /// Surface a non-success response as [`Error::Api`], logging the status
  /// and a body summary.
  pub(crate) async fn check(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
    if resp.status().is_success() {
      return Ok(resp);
    }
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    let summary = summarize_body(&body);
    tracing::warn!(status = %status, body = %summary, "{context} failed");
    Err(Error::Api { status, summary })
  }

  async fn fetch_rows(
    &self,
    collection: &str,
    params: &[(&str, &str)],
    context: &str,
  ) -> Result<Vec<Map<String, Value>>> {
    let url = self.rest_url(collection);
    tracing::debug!(%url, "{context}");

    let resp = self
      .apply_headers(self.http.get(&url))
      .query(params)
      .header("Accept", "application/json")
      .send()
      .await?;
    let resp = Self::check(resp, context).await?;

    Ok(resp.json().await?)
  }
}

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for RestStore {
  type Error = Error;

  async fn get_all(&self, collection: &str) -> Result<Vec<Document>> {
    let rows = self
      .fetch_rows(collection, &[("select", "*")], "fetching collection")
      .await?;
    Ok(rows.into_iter().map(wire::into_document).collect())
  }

  async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
    let id_param = format!("eq.{id}");
    let rows = self
      .fetch_rows(
        collection,
        &[("select", "*"), ("id", id_param.as_str()), ("limit", "1")],
        "fetching document",
      )
      .await?;
    Ok(rows.into_iter().next().map(wire::into_document))
  }

  async fn query(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>> {
    let (field, value) = wire::filter_pair(filter);
    let rows = self
      .fetch_rows(
        collection,
        &[("select", "*"), (field.as_str(), value.as_str())],
        "querying collection",
      )
      .await?;
    Ok(rows.into_iter().map(wire::into_document).collect())
  }

  async fn add(&self, collection: &str, fields: Map<String, Value>) -> Result<DocumentId> {
    let url = self.rest_url(collection);
    tracing::debug!(%url, "inserting document");

    let resp = self
      .apply_headers(self.http.post(&url))
      .header("Prefer", "return=representation")
      .json(&Value::Object(fields))
      .send()
      .await?;
    let resp = Self::check(resp, "inserting document").await?;

    let rows: Vec<Map<String, Value>> = resp.json().await?;
    let inserted = rows
      .into_iter()
      .next()
      .map(wire::into_document)
      .ok_or_else(|| Error::MissingRepresentation {
        collection: collection.to_owned(),
      })?;
    Ok(inserted.id)
  }

  async fn update(&self, collection: &str, id: &str, patch: Patch) -> Result<()> {
    // The server folds the ops under its own transaction; the document is
    // never read back here.
    let url = self.rest_url("rpc/apply_patch");
    tracing::debug!(%url, collection, id, "applying patch");

    let body = json!({
      "collection": collection,
      "id":         id,
      "ops":        wire::patch_ops(&patch),
    });

    let resp = self
      .apply_headers(self.http.post(&url))
      .json(&body)
      .send()
      .await?;
    Self::check(resp, "applying patch").await?;
    Ok(())
  }

  async fn delete(&self, collection: &str, id: &str) -> Result<()> {
    let url = self.rest_url(collection);
    tracing::debug!(%url, id, "deleting document");

    let id_param = format!("eq.{id}");
    let resp = self
      .apply_headers(self.http.delete(&url))
      .query(&[("id", id_param.as_str())])
      .header("Prefer", "return=representation")
      .send()
      .await?;
    let resp = Self::check(resp, "deleting document").await?;

    // An empty representation means the filter matched nothing.
    let rows: Vec<Map<String, Value>> = resp.json().await?;
    if rows.is_empty() {
      return Err(Error::DocumentNotFound {
        collection: collection.to_owned(),
        id:         id.to_owned(),
      });
    }
    Ok(())
  }
}
