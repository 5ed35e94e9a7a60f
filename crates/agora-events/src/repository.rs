//! [`EventRepository`] — normalized access to the `events` collection.
//!
//! Every operation resolves into the [`agora_core::Error`] taxonomy; no
//! backend error type crosses this boundary. Identity comes from the
//! injected [`Session`], read once per call.
//!
//! | operation           | auth     | result                                |
//! |---------------------|----------|---------------------------------------|
//! | `list_all`          | no       | active events, soonest first          |
//! | `get_by_id`         | no       | `Ok(None)` when absent                |
//! | `create`            | required | id of the new event                   |
//! | `confirm_attendance`| required | caller joins the attendee list        |
//! | `cancel_attendance` | required | caller leaves the attendee list       |
//! | `list_attending`    | required | events the caller attends             |
//! | `add_comment`       | required | comment appended                      |
//! | `add_rating`        | required | rating recorded, mean recomputed      |
//! | `list_created`      | required | caller's own events, newest first     |
//! | `update`            | organizer| editable fields rewritten             |
//! | `delete`            | organizer| event removed                         |

use std::{collections::BTreeMap, sync::Arc};

use chrono::Utc;
use serde_json::json;

use agora_core::{
  auth::AuthUser,
  document::{Document, Filter, Patch},
  session::Session,
  store::DocumentStore,
  Error, Result,
};

use crate::model::{Comment, Event, EventUpdate, NewEvent};

const COLLECTION: &str = "events";

/// Data access for the events app, generic over the storage backend.
pub struct EventRepository<S> {
  store:   Arc<S>,
  session: Session,
}

impl<S> Clone for EventRepository<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), session: self.session.clone() }
  }
}

impl<S: DocumentStore> EventRepository<S> {
  pub fn new(store: Arc<S>, session: Session) -> Self {
    Self { store, session }
  }

  /// Every active event, soonest first.
  pub async fn list_all(&self) -> Result<Vec<Event>> {
    let documents = self
      .store
      .get_all(COLLECTION)
      .await
      .map_err(|e| Error::Store(Box::new(e)))?;

    let mut events = decode_list(documents);
    events.retain(|event| event.is_active);
    events.sort_by_key(|event| event.date);
    Ok(events)
  }

  /// One event by id. Absence is `Ok(None)`.
  pub async fn get_by_id(&self, event_id: &str) -> Result<Option<Event>> {
    let document = self
      .store
      .get(COLLECTION, event_id)
      .await
      .map_err(|e| Error::Store(Box::new(e)))?;

    document
      .map(Event::from_document)
      .transpose()
      .map_err(|e| Error::Store(Box::new(e)))
  }

  /// Create an event organized by the signed-in user; returns the new id.
  ///
  /// The organizer's name is their full email, kept for display on cards
  /// they no longer control.
  pub async fn create(&self, input: NewEvent) -> Result<String> {
    let user = self.require_user()?;

    let event = Event {
      id:             String::new(),
      title:          input.title,
      description:    input.description,
      date:           input.date,
      time:           input.time,
      location:       input.location,
      category:       input.category,
      organizer_id:   user.uid.clone(),
      organizer_name: user.email.clone().unwrap_or_else(|| "user".to_owned()),
      attendees:      Vec::new(),
      max_attendees:  input.max_attendees,
      image_url:      None,
      is_active:      true,
      created_at:     Utc::now(),
      comments:       Vec::new(),
      ratings:        BTreeMap::new(),
      average_rating: 0.0,
    };

    let fields = event.to_fields().map_err(|e| Error::Store(Box::new(e)))?;
    self
      .store
      .add(COLLECTION, fields)
      .await
      .map_err(|e| Error::Store(Box::new(e)))
  }

  /// Join the attendee list. The union runs inside the store, so two
  /// concurrent confirmations keep both callers.
  pub async fn confirm_attendance(&self, event_id: &str) -> Result<()> {
    let user = self.require_user()?;
    let patch = Patch::new().array_union("attendees", vec![json!(user.uid)]);
    self.apply(event_id, patch).await
  }

  /// Leave the attendee list. Leaving an event never joined succeeds and
  /// changes nothing.
  pub async fn cancel_attendance(&self, event_id: &str) -> Result<()> {
    let user = self.require_user()?;
    let patch = Patch::new().array_remove("attendees", vec![json!(user.uid)]);
    self.apply(event_id, patch).await
  }

  /// Events the signed-in user attends, in store order.
  pub async fn list_attending(&self) -> Result<Vec<Event>> {
    let user = self.require_user()?;
    let filter = Filter::array_contains("attendees", json!(user.uid));
    let documents = self
      .store
      .query(COLLECTION, &filter)
      .await
      .map_err(|e| Error::Store(Box::new(e)))?;

    Ok(decode_list(documents))
  }

  /// Append a comment authored by the signed-in user, stamped with their
  /// display name and the current time.
  pub async fn add_comment(&self, event_id: &str, text: impl Into<String>) -> Result<()> {
    let user = self.require_user()?;
    let comment = Comment {
      user_id:   user.uid.clone(),
      user_name: user.display_name().to_owned(),
      text:      text.into(),
      timestamp: Utc::now(),
    };
    let encoded = serde_json::to_value(&comment).map_err(|e| Error::Store(Box::new(e)))?;
    let patch = Patch::new().array_union("comments", vec![encoded]);
    self.apply(event_id, patch).await
  }

  /// Record (or replace) the signed-in user's rating and recompute the
  /// stored mean.
  ///
  /// Read-modify-write without compare-and-swap: when two users rate at the
  /// same time, the later write wins and may drop the earlier entry.
  pub async fn add_rating(&self, event_id: &str, rating: f32) -> Result<()> {
    let user = self.require_user()?;

    let event = self
      .get_by_id(event_id)
      .await?
      .ok_or_else(|| Error::NotFound(format!("event {event_id}")))?;

    let mut ratings = event.ratings;
    ratings.insert(user.uid, rating);
    let average = ratings.values().sum::<f32>() / ratings.len() as f32;

    let encoded = serde_json::to_value(&ratings).map_err(|e| Error::Store(Box::new(e)))?;
    let patch = Patch::new()
      .set("ratings", encoded)
      .set("average_rating", json!(average));
    self.apply(event_id, patch).await
  }

  /// Events organized by the signed-in user, newest first.
  pub async fn list_created(&self) -> Result<Vec<Event>> {
    let user = self.require_user()?;
    let filter = Filter::field_eq("organizer_id", json!(user.uid));
    let documents = self
      .store
      .query(COLLECTION, &filter)
      .await
      .map_err(|e| Error::Store(Box::new(e)))?;

    let mut events = decode_list(documents);
    events.sort_by_key(|event| std::cmp::Reverse(event.date));
    Ok(events)
  }

  /// Rewrite the editable fields. Only the organizer may edit; attendance,
  /// comments and ratings pass through unchanged.
  pub async fn update(&self, event_id: &str, update: EventUpdate) -> Result<()> {
    self.guard_organizer(event_id, "edit").await?;

    let patch = Patch::new()
      .set("title", json!(update.title))
      .set("description", json!(update.description))
      .set("date", json!(update.date))
      .set("time", json!(update.time))
      .set("location", json!(update.location))
      .set("category", json!(update.category))
      .set("max_attendees", json!(update.max_attendees));
    self.apply(event_id, patch).await
  }

  /// Remove the event. Only the organizer may delete.
  pub async fn delete(&self, event_id: &str) -> Result<()> {
    self.guard_organizer(event_id, "delete").await?;
    self
      .store
      .delete(COLLECTION, event_id)
      .await
      .map_err(|e| Error::Store(Box::new(e)))
  }

  fn require_user(&self) -> Result<AuthUser> {
    self.session.current_user().ok_or(Error::AuthRequired)
  }

  /// `NotFound` when the event is missing, `PermissionDenied` when the
  /// caller is not its organizer.
  async fn guard_organizer(&self, event_id: &str, action: &str) -> Result<()> {
    let user = self.require_user()?;
    let event = self
      .get_by_id(event_id)
      .await?
      .ok_or_else(|| Error::NotFound(format!("event {event_id}")))?;

    if event.organizer_id != user.uid {
      return Err(Error::PermissionDenied(format!(
        "only the organizer may {action} an event"
      )));
    }
    Ok(())
  }

  async fn apply(&self, event_id: &str, patch: Patch) -> Result<()> {
    self
      .store
      .update(COLLECTION, event_id, patch)
      .await
      .map_err(|e| Error::Store(Box::new(e)))
  }
}

/// Decode a fetched list. Undecodable records are skipped rather than
/// failing the whole list.
fn decode_list(documents: Vec<Document>) -> Vec<Event> {
  documents
    .into_iter()
    .filter_map(|document| Event::from_document(document).ok())
    .collect()
}
