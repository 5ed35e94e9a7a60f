//! HTTP backend for the agora document store.
//!
//! Talks JSON to the hosted backend service, which exposes each collection
//! as a table under `/rest/v1/{collection}` (PostgREST conventions: `eq.` /
//! `cs.` filter operators, `Prefer: return=representation` on writes) and
//! password/token auth under `/auth/v1/`.
//!
//! Patches are never applied client-side: [`RestStore`] posts the encoded
//! op list to the `apply_patch` RPC, and the server folds array unions and
//! removals under its own transaction. That keeps the atomicity contract of
//! [`DocumentStore::update`](agora_core::store::DocumentStore::update) off
//! this client entirely.
//!
//! Rows come back with their `id` column inline; it is stripped into
//! [`Document::id`](agora_core::document::Document) and never kept among the
//! fields. The service returns rows in insertion order (its tables carry an
//! insertion-ordered key).

mod auth;
mod store;
mod wire;

pub mod config;
pub mod error;

pub use config::RestConfig;
pub use error::{Error, Result};
pub use store::RestStore;
