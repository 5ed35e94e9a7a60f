//! Core types and trait definitions for the agora client data layer.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! backend crates (`agora-store-sqlite`, `agora-store-rest`) implement its
//! traits; the app crates build repositories and view-models on top of the
//! traits, never on a concrete backend.

pub mod auth;
pub mod document;
pub mod error;
pub mod session;
pub mod state;
pub mod store;

pub use error::{Error, Result};
