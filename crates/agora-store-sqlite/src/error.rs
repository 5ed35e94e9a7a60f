//! Error type for `agora-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// Update or delete addressed a document that does not exist.
  #[error("document not found: {collection}/{id}")]
  DocumentNotFound { collection: String, id: String },

  #[error("email already registered")]
  EmailTaken,

  /// Unknown email and wrong password answer identically.
  #[error("invalid email or password")]
  InvalidCredentials,

  #[error("token sign-in is not supported by the sqlite backend")]
  TokenSignInUnsupported,

  #[error("password hash error: {0}")]
  PasswordHash(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
