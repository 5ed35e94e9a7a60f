//! The stored shape of an event and its embedded records.
//!
//! Stored documents are decoded leniently: every field carries a serde
//! default, so sparse records written by older clients still produce an
//! [`Event`]. The id is never part of the body; it travels on the
//! [`Document`](agora_core::document::Document) envelope and is attached
//! on decode.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{ser::Error as _, Deserialize, Serialize};
use serde_json::{Map, Value};

use agora_core::{auth::UserId, document::Document};

// ─── Event ───────────────────────────────────────────────────────────────────

/// A community event, as stored in the `events` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
  /// Store-assigned id. Lives outside the document body.
  #[serde(skip)]
  pub id: String,

  #[serde(default)]
  pub title:          String,
  #[serde(default)]
  pub description:    String,
  /// Day the event takes place. The display time is kept separately, as
  /// entered.
  #[serde(default = "Utc::now")]
  pub date:           DateTime<Utc>,
  #[serde(default)]
  pub time:           String,
  #[serde(default)]
  pub location:       String,
  #[serde(default)]
  pub category:       String,
  #[serde(default)]
  pub organizer_id:   UserId,
  /// Organizer's email at creation time, kept verbatim for display.
  #[serde(default)]
  pub organizer_name: String,
  #[serde(default)]
  pub attendees:      Vec<UserId>,
  /// Capacity; `None` means unlimited.
  #[serde(default)]
  pub max_attendees:  Option<u32>,
  #[serde(default)]
  pub image_url:      Option<String>,
  /// Withdrawn events are flagged inactive rather than deleted, so
  /// attendance history survives.
  #[serde(default = "default_true")]
  pub is_active:      bool,
  #[serde(default = "Utc::now")]
  pub created_at:     DateTime<Utc>,
  #[serde(default)]
  pub comments:       Vec<Comment>,
  /// One rating per user, keyed by uid. A re-rating replaces the entry.
  #[serde(default)]
  pub ratings:        BTreeMap<UserId, f32>,
  /// Mean over `ratings`, recomputed on every rating write.
  #[serde(default)]
  pub average_rating: f32,
}

fn default_true() -> bool {
  true
}

impl Event {
  /// Whether `user_id` is on the attendee list.
  pub fn is_user_attending(&self, user_id: &str) -> bool {
    self.attendees.iter().any(|uid| uid == user_id)
  }

  /// Full iff a capacity is set and reached. Unlimited events are never
  /// full.
  pub fn is_full(&self) -> bool {
    match self.max_attendees {
      Some(max) => self.attendees.len() >= max as usize,
      None => false,
    }
  }

  /// Encode into a document body. The id is not written into the fields.
  pub fn to_fields(&self) -> serde_json::Result<Map<String, Value>> {
    match serde_json::to_value(self)? {
      Value::Object(map) => Ok(map),
      _ => Err(serde_json::Error::custom("event did not encode to an object")),
    }
  }

  /// Decode a stored document, attaching its store id.
  pub fn from_document(document: Document) -> serde_json::Result<Self> {
    let mut event: Event = serde_json::from_value(Value::Object(document.fields))?;
    event.id = document.id;
    Ok(event)
  }
}

// ─── Comments ────────────────────────────────────────────────────────────────

/// A comment embedded in its event's document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
  #[serde(default)]
  pub user_id:   UserId,
  /// Author's display name at posting time (the email local part).
  #[serde(default)]
  pub user_name: String,
  #[serde(default)]
  pub text:      String,
  #[serde(default = "Utc::now")]
  pub timestamp: DateTime<Utc>,
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Caller-supplied fields for [`create`](crate::EventRepository::create).
///
/// Organizer identity, timestamps and the empty attendance, comment and
/// rating state are stamped by the repository.
#[derive(Debug, Clone)]
pub struct NewEvent {
  pub title:         String,
  pub description:   String,
  pub date:          DateTime<Utc>,
  pub time:          String,
  pub location:      String,
  pub category:      String,
  pub max_attendees: Option<u32>,
}

/// The editable fields of an event, written wholesale by
/// [`update`](crate::EventRepository::update). Attendance, comments and
/// ratings are never touched by an edit.
#[derive(Debug, Clone)]
pub struct EventUpdate {
  pub title:         String,
  pub description:   String,
  pub date:          DateTime<Utc>,
  pub time:          String,
  pub location:      String,
  pub category:      String,
  pub max_attendees: Option<u32>,
}
