//! Client data layer for the community-events app.
//!
//! Three pieces, assembled by the embedding shell:
//!
//! - [`Event`] and [`Comment`], the stored document shape,
//! - [`EventRepository`], normalized operations over any
//!   [`DocumentStore`](agora_core::store::DocumentStore),
//! - [`EventViewModel`], observable state for the event screens.

pub mod model;
pub mod repository;
pub mod view_model;

pub use model::{Comment, Event, EventUpdate, NewEvent};
pub use repository::EventRepository;
pub use view_model::EventViewModel;

#[cfg(test)]
mod tests;
