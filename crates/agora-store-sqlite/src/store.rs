//! [`SqliteStore`] — the SQLite implementation of [`DocumentStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use serde_json::{Map, Value};
use uuid::Uuid;

use agora_core::{
  document::{Document, DocumentId, Filter, Patch},
  store::DocumentStore,
};

use crate::{schema::SCHEMA, Error, Result};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An agora document store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted, and every
/// clone shares the one worker thread that serialises database access.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Fetch `(doc_id, body)` rows for a whole collection, oldest first.
  async fn collection_rows(&self, collection: &str) -> Result<Vec<(String, String)>> {
    let collection = collection.to_owned();
    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT doc_id, body FROM documents
           WHERE collection = ?1
           ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![collection], |row| {
            Ok((row.get(0)?, row.get(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }
}

fn decode_row(id: String, body: &str) -> Result<Document> {
  let fields: Map<String, Value> = serde_json::from_str(body)?;
  Ok(Document::new(id, fields))
}

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for SqliteStore {
  type Error = Error;

  async fn get_all(&self, collection: &str) -> Result<Vec<Document>> {
    let rows = self.collection_rows(collection).await?;
    rows
      .into_iter()
      .map(|(id, body)| decode_row(id, &body))
      .collect()
  }

  async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
    let collection = collection.to_owned();
    let id_owned = id.to_owned();

    let body: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT body FROM documents WHERE collection = ?1 AND doc_id = ?2",
              rusqlite::params![collection, id_owned],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    body.map(|body| decode_row(id.to_owned(), &body)).transpose()
  }

  async fn query(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>> {
    // Bodies are opaque JSON to SQLite; predicates run over the decoded maps.
    let rows = self.collection_rows(collection).await?;
    let mut documents = rows
      .into_iter()
      .map(|(id, body)| decode_row(id, &body))
      .collect::<Result<Vec<_>>>()?;
    documents.retain(|doc| filter.matches(&doc.fields));
    Ok(documents)
  }

  async fn add(&self, collection: &str, fields: Map<String, Value>) -> Result<DocumentId> {
    let id = Uuid::new_v4().hyphenated().to_string();
    let body = Value::Object(fields).to_string();
    let created_at = Utc::now().to_rfc3339();

    let collection = collection.to_owned();
    let id_clone = id.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO documents (collection, doc_id, body, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![collection, id_clone, body, created_at],
        )?;
        Ok(())
      })
      .await?;

    Ok(id)
  }

  async fn update(&self, collection: &str, id: &str, patch: Patch) -> Result<()> {
    let collection_owned = collection.to_owned();
    let id_owned = id.to_owned();

    // Read-patch-write inside one transaction on the worker thread, so
    // concurrent callers fold their array ops instead of overwriting each
    // other.
    let outcome: Option<Result<(), serde_json::Error>> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let body: Option<String> = tx
          .query_row(
            "SELECT body FROM documents WHERE collection = ?1 AND doc_id = ?2",
            rusqlite::params![collection_owned, id_owned],
            |row| row.get(0),
          )
          .optional()?;

        let Some(body) = body else {
          return Ok(None);
        };

        let mut fields: Map<String, Value> = match serde_json::from_str(&body) {
          Ok(fields) => fields,
          Err(e) => return Ok(Some(Err(e))),
        };
        patch.apply(&mut fields);
        let new_body = Value::Object(fields).to_string();

        tx.execute(
          "UPDATE documents SET body = ?3 WHERE collection = ?1 AND doc_id = ?2",
          rusqlite::params![collection_owned, id_owned, new_body],
        )?;
        tx.commit()?;

        Ok(Some(Ok(())))
      })
      .await?;

    match outcome {
      None => Err(Error::DocumentNotFound {
        collection: collection.to_owned(),
        id:         id.to_owned(),
      }),
      Some(Err(e)) => Err(Error::Json(e)),
      Some(Ok(())) => Ok(()),
    }
  }

  async fn delete(&self, collection: &str, id: &str) -> Result<()> {
    let collection_owned = collection.to_owned();
    let id_owned = id.to_owned();

    let deleted: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM documents WHERE collection = ?1 AND doc_id = ?2",
          rusqlite::params![collection_owned, id_owned],
        )?)
      })
      .await?;

    if deleted == 0 {
      return Err(Error::DocumentNotFound {
        collection: collection.to_owned(),
        id:         id.to_owned(),
      });
    }
    Ok(())
  }
}
