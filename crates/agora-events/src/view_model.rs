//! [`EventViewModel`] — observable state for the event screens.
//!
//! All screens share one [`ViewState`] slot; each intent ends by re-fetching
//! the list its screen shows, so the collection always reflects the store
//! rather than a locally patched guess.

use tokio::sync::watch;

use agora_core::{state::ViewState, store::DocumentStore, Result};

use crate::{
  model::{Event, EventUpdate, NewEvent},
  repository::EventRepository,
};

/// Which list an intent refreshes after its mutation settles.
#[derive(Debug, Clone, Copy)]
enum Refetch {
  All,
  Attending,
  Created,
}

/// View-model for the event screens.
///
/// Every intent runs the same cycle: `begin` (loading up, stale error
/// cleared), exactly one repository call, then `finish` with a full
/// re-fetch or `fail` with the error message. A failed intent leaves the
/// collection as it was.
pub struct EventViewModel<S> {
  repo:  EventRepository<S>,
  state: watch::Sender<ViewState<Event>>,
}

impl<S: DocumentStore> EventViewModel<S> {
  pub fn new(repo: EventRepository<S>) -> Self {
    let (state, _rx) = watch::channel(ViewState::default());
    Self { repo, state }
  }

  /// Subscribe to state changes.
  pub fn subscribe(&self) -> watch::Receiver<ViewState<Event>> {
    self.state.subscribe()
  }

  /// Snapshot of the current state.
  pub fn state(&self) -> ViewState<Event> {
    self.state.borrow().clone()
  }

  // ─── Loads ─────────────────────────────────────────────────────────────────

  /// Load every active event.
  pub async fn load_all(&self) {
    self.begin();
    self.settle(Ok(()), Refetch::All).await;
  }

  /// Load the events the signed-in user attends.
  pub async fn load_attending(&self) {
    self.begin();
    self.settle(Ok(()), Refetch::Attending).await;
  }

  /// Load the events the signed-in user organizes.
  pub async fn load_created(&self) {
    self.begin();
    self.settle(Ok(()), Refetch::Created).await;
  }

  // ─── Mutations ─────────────────────────────────────────────────────────────

  /// Create an event, then refresh the full list.
  pub async fn create(&self, input: NewEvent) {
    self.begin();
    let outcome = self.repo.create(input).await.map(|_id| ());
    self.settle(outcome, Refetch::All).await;
  }

  /// Join an event's attendee list, then refresh the full list.
  pub async fn confirm_attendance(&self, event_id: &str) {
    self.begin();
    let outcome = self.repo.confirm_attendance(event_id).await;
    self.settle(outcome, Refetch::All).await;
  }

  /// Leave an event's attendee list, then refresh the full list.
  pub async fn cancel_attendance(&self, event_id: &str) {
    self.begin();
    let outcome = self.repo.cancel_attendance(event_id).await;
    self.settle(outcome, Refetch::All).await;
  }

  /// Leave an event from the attending screen: same mutation as
  /// [`cancel_attendance`](Self::cancel_attendance), but the attending list
  /// is what gets refreshed, so the event drops out of view.
  pub async fn cancel_attendance_from_attending(&self, event_id: &str) {
    self.begin();
    let outcome = self.repo.cancel_attendance(event_id).await;
    self.settle(outcome, Refetch::Attending).await;
  }

  /// Comment on an event, then refresh the full list.
  pub async fn add_comment(&self, event_id: &str, text: &str) {
    self.begin();
    let outcome = self.repo.add_comment(event_id, text).await;
    self.settle(outcome, Refetch::All).await;
  }

  /// Rate an event, then refresh the full list.
  pub async fn add_rating(&self, event_id: &str, rating: f32) {
    self.begin();
    let outcome = self.repo.add_rating(event_id, rating).await;
    self.settle(outcome, Refetch::All).await;
  }

  /// Edit an owned event, then refresh the created list.
  pub async fn update(&self, event_id: &str, update: EventUpdate) {
    self.begin();
    let outcome = self.repo.update(event_id, update).await;
    self.settle(outcome, Refetch::Created).await;
  }

  /// Delete an owned event, then refresh the created list.
  pub async fn delete(&self, event_id: &str) {
    self.begin();
    let outcome = self.repo.delete(event_id).await;
    self.settle(outcome, Refetch::Created).await;
  }

  /// Drop the current error message, keeping everything else.
  pub fn clear_error(&self) {
    self.state.send_modify(|s| s.error = None);
  }

  // ─── Cycle ─────────────────────────────────────────────────────────────────

  fn begin(&self) {
    self.state.send_modify(|s| s.begin());
  }

  /// Second half of the intent cycle: on success re-fetch the screen's
  /// list, on failure (of the mutation or of the re-fetch itself) publish
  /// the error and keep the collection.
  async fn settle(&self, outcome: Result<()>, refetch: Refetch) {
    let fetched = match outcome {
      Ok(()) => match refetch {
        Refetch::All => self.repo.list_all().await,
        Refetch::Attending => self.repo.list_attending().await,
        Refetch::Created => self.repo.list_created().await,
      },
      Err(e) => Err(e),
    };

    match fetched {
      Ok(events) => self.state.send_modify(|s| s.finish(events)),
      Err(e) => self.state.send_modify(|s| s.fail(e.to_string())),
    }
  }
}
