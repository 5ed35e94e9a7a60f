//! Error types for `agora-core`.

use thiserror::Error;

/// The failure taxonomy every repository operation resolves into.
///
/// Backend error types never cross a repository boundary: repositories box
/// them into [`Error::Store`], preserving the message, and raise the other
/// variants themselves from their own guards.
#[derive(Debug, Error)]
pub enum Error {
  /// The operation requires a signed-in user and there is none.
  #[error("not signed in")]
  AuthRequired,

  /// The signed-in user may not perform this operation on this record.
  #[error("permission denied: {0}")]
  PermissionDenied(String),

  /// A record the operation depends on does not exist. Absence on a plain
  /// lookup is not an error; this variant is for operations that cannot
  /// proceed without the record.
  #[error("not found: {0}")]
  NotFound(String),

  /// Transport or backend failure, message preserved verbatim.
  #[error("store error: {0}")]
  Store(Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
