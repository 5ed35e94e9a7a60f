//! Error type for `agora-store-rest`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The backend answered with a non-success status. The body is reduced to
  /// a length-and-digest summary so secrets never end up in logs or error
  /// chains.
  #[error("backend answered {status} ({summary})")]
  Api {
    status:  reqwest::StatusCode,
    summary: String,
  },

  /// Delete addressed a document that does not exist.
  #[error("document not found: {collection}/{id}")]
  DocumentNotFound { collection: String, id: String },

  /// A write with `Prefer: return=representation` came back empty.
  #[error("backend returned no representation for insert into {collection}")]
  MissingRepresentation { collection: String },

  #[error("config error: {0}")]
  Config(#[from] ::config::ConfigError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
