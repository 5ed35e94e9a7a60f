//! SQLite backend for the agora document store.
//!
//! Implements both [`DocumentStore`](agora_core::store::DocumentStore) and
//! [`AuthProvider`](agora_core::auth::AuthProvider) over a single database
//! file. Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime; that same thread is what makes
//! patch application atomic.
//!
//! Used for local deployments and as the integration-test backend of the app
//! crates.

mod auth;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
