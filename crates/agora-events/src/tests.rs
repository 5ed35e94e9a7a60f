use std::sync::{
  atomic::{AtomicBool, Ordering},
  Arc,
};

use chrono::{Duration, Utc};
use serde_json::{json, Map, Value};

use agora_core::{
  auth::AuthUser,
  document::{Document, DocumentId, Filter, Patch},
  session::Session,
  store::DocumentStore,
  Error,
};
use agora_store_sqlite::SqliteStore;

use crate::{EventRepository, EventUpdate, EventViewModel, NewEvent};

// ─── Helpers ─────────────────────────────────────────────────────────────────

async fn store() -> Arc<SqliteStore> {
  Arc::new(SqliteStore::open_in_memory().await.expect("open in-memory store"))
}

fn session_for(uid: &str, email: &str) -> Session {
  let session = Session::new();
  session.set(Some(AuthUser::new(uid, Some(email.to_owned()))));
  session
}

fn repo(store: &Arc<SqliteStore>, session: &Session) -> EventRepository<SqliteStore> {
  EventRepository::new(Arc::clone(store), session.clone())
}

fn new_event(title: &str, days_out: i64) -> NewEvent {
  NewEvent {
    title:         title.to_owned(),
    description:   "a neighbourhood gathering".to_owned(),
    date:          Utc::now() + Duration::days(days_out),
    time:          "18:00".to_owned(),
    location:      "the commons".to_owned(),
    category:      "community".to_owned(),
    max_attendees: None,
  }
}

// ─── Repository: create and fetch ────────────────────────────────────────────

#[tokio::test]
async fn create_then_get_round_trips() {
  let store = store().await;
  let repo = repo(&store, &session_for("ada-uid", "ada@example.com"));

  let id = repo.create(new_event("picnic", 3)).await.unwrap();
  let event = repo.get_by_id(&id).await.unwrap().unwrap();

  assert_eq!(event.id, id);
  assert_eq!(event.title, "picnic");
  assert_eq!(event.organizer_id, "ada-uid");
  assert_eq!(event.organizer_name, "ada@example.com");
  assert!(event.is_active);
  assert!(event.attendees.is_empty());
  assert!(event.comments.is_empty());
  assert_eq!(event.average_rating, 0.0);
}

#[tokio::test]
async fn get_by_id_of_missing_event_is_none() {
  let store = store().await;
  let repo = repo(&store, &session_for("ada-uid", "ada@example.com"));

  assert_eq!(repo.get_by_id("nope").await.unwrap(), None);
}

#[tokio::test]
async fn create_without_a_session_is_auth_required() {
  let store = store().await;
  let repo = repo(&store, &Session::new());

  let outcome = repo.create(new_event("picnic", 3)).await;

  assert!(matches!(outcome, Err(Error::AuthRequired)));
}

#[tokio::test]
async fn list_all_sorts_by_soonest_first() {
  let store = store().await;
  let repo = repo(&store, &session_for("ada-uid", "ada@example.com"));

  repo.create(new_event("later", 5)).await.unwrap();
  repo.create(new_event("soonest", 1)).await.unwrap();
  repo.create(new_event("middle", 3)).await.unwrap();

  let titles: Vec<_> = repo
    .list_all()
    .await
    .unwrap()
    .into_iter()
    .map(|event| event.title)
    .collect();

  assert_eq!(titles, vec!["soonest", "middle", "later"]);
}

#[tokio::test]
async fn list_all_skips_inactive_events() {
  let store = store().await;
  let repo = repo(&store, &session_for("ada-uid", "ada@example.com"));

  repo.create(new_event("kept", 1)).await.unwrap();
  let withdrawn = repo.create(new_event("withdrawn", 2)).await.unwrap();
  store
    .update("events", &withdrawn, Patch::new().set("is_active", json!(false)))
    .await
    .unwrap();

  let events = repo.list_all().await.unwrap();

  assert_eq!(events.len(), 1);
  assert_eq!(events[0].title, "kept");
}

#[tokio::test]
async fn undecodable_documents_are_skipped_on_list() {
  let store = store().await;
  let repo = repo(&store, &session_for("ada-uid", "ada@example.com"));

  repo.create(new_event("good", 1)).await.unwrap();
  let mut garbage = Map::new();
  garbage.insert("date".to_owned(), json!(7));
  store.add("events", garbage).await.unwrap();

  let events = repo.list_all().await.unwrap();

  assert_eq!(events.len(), 1);
  assert_eq!(events[0].title, "good");
}

// ─── Repository: attendance ──────────────────────────────────────────────────

#[tokio::test]
async fn confirm_attendance_adds_the_caller_once() {
  let store = store().await;
  let repo = repo(&store, &session_for("ada-uid", "ada@example.com"));
  let id = repo.create(new_event("picnic", 3)).await.unwrap();

  repo.confirm_attendance(&id).await.unwrap();
  repo.confirm_attendance(&id).await.unwrap();

  let event = repo.get_by_id(&id).await.unwrap().unwrap();
  assert_eq!(event.attendees, vec!["ada-uid"]);
  assert!(event.is_user_attending("ada-uid"));
}

#[tokio::test]
async fn simultaneous_confirmations_keep_both_attendees() {
  let store = store().await;
  let ada = repo(&store, &session_for("ada-uid", "ada@example.com"));
  let brin = repo(&store, &session_for("brin-uid", "brin@example.com"));
  let id = ada.create(new_event("picnic", 3)).await.unwrap();

  let (a, b) = tokio::join!(ada.confirm_attendance(&id), brin.confirm_attendance(&id));
  a.unwrap();
  b.unwrap();

  let event = ada.get_by_id(&id).await.unwrap().unwrap();
  assert_eq!(event.attendees.len(), 2);
}

#[tokio::test]
async fn cancel_attendance_removes_only_the_caller() {
  let store = store().await;
  let ada = repo(&store, &session_for("ada-uid", "ada@example.com"));
  let brin = repo(&store, &session_for("brin-uid", "brin@example.com"));
  let id = ada.create(new_event("picnic", 3)).await.unwrap();
  ada.confirm_attendance(&id).await.unwrap();
  brin.confirm_attendance(&id).await.unwrap();

  ada.cancel_attendance(&id).await.unwrap();

  let event = ada.get_by_id(&id).await.unwrap().unwrap();
  assert_eq!(event.attendees, vec!["brin-uid"]);
}

#[tokio::test]
async fn cancelling_an_event_never_joined_succeeds() {
  let store = store().await;
  let ada = repo(&store, &session_for("ada-uid", "ada@example.com"));
  let id = ada.create(new_event("picnic", 3)).await.unwrap();

  ada.cancel_attendance(&id).await.unwrap();

  let event = ada.get_by_id(&id).await.unwrap().unwrap();
  assert!(event.attendees.is_empty());
}

#[tokio::test]
async fn full_event_still_accepts_confirmations() {
  // Capacity is a display concern; the store never rejects a join.
  let store = store().await;
  let ada = repo(&store, &session_for("ada-uid", "ada@example.com"));
  let brin = repo(&store, &session_for("brin-uid", "brin@example.com"));

  let mut input = new_event("tiny", 3);
  input.max_attendees = Some(1);
  let id = ada.create(input).await.unwrap();

  ada.confirm_attendance(&id).await.unwrap();
  brin.confirm_attendance(&id).await.unwrap();

  let event = ada.get_by_id(&id).await.unwrap().unwrap();
  assert_eq!(event.attendees.len(), 2);
  assert!(event.is_full());
}

#[tokio::test]
async fn list_attending_scopes_to_the_caller() {
  let store = store().await;
  let ada = repo(&store, &session_for("ada-uid", "ada@example.com"));
  let brin = repo(&store, &session_for("brin-uid", "brin@example.com"));

  let joined = ada.create(new_event("joined", 1)).await.unwrap();
  let skipped = ada.create(new_event("skipped", 2)).await.unwrap();
  ada.confirm_attendance(&joined).await.unwrap();
  brin.confirm_attendance(&skipped).await.unwrap();

  let events = ada.list_attending().await.unwrap();

  assert_eq!(events.len(), 1);
  assert_eq!(events[0].title, "joined");
}

// ─── Repository: comments and ratings ────────────────────────────────────────

#[tokio::test]
async fn add_comment_stamps_author_and_display_name() {
  let store = store().await;
  let repo = repo(&store, &session_for("ada-uid", "ada@example.com"));
  let id = repo.create(new_event("picnic", 3)).await.unwrap();

  repo.add_comment(&id, "count me in").await.unwrap();

  let event = repo.get_by_id(&id).await.unwrap().unwrap();
  assert_eq!(event.comments.len(), 1);
  assert_eq!(event.comments[0].user_id, "ada-uid");
  assert_eq!(event.comments[0].user_name, "ada");
  assert_eq!(event.comments[0].text, "count me in");
}

#[tokio::test]
async fn sequential_ratings_average_exactly() {
  let store = store().await;
  let ada = repo(&store, &session_for("ada-uid", "ada@example.com"));
  let brin = repo(&store, &session_for("brin-uid", "brin@example.com"));
  let id = ada.create(new_event("picnic", 3)).await.unwrap();

  ada.add_rating(&id, 4.0).await.unwrap();
  brin.add_rating(&id, 5.0).await.unwrap();

  let event = ada.get_by_id(&id).await.unwrap().unwrap();
  assert_eq!(event.ratings.len(), 2);
  assert_eq!(event.ratings["ada-uid"], 4.0);
  assert_eq!(event.average_rating, 4.5);
}

#[tokio::test]
async fn re_rating_replaces_the_existing_entry() {
  let store = store().await;
  let repo = repo(&store, &session_for("ada-uid", "ada@example.com"));
  let id = repo.create(new_event("picnic", 3)).await.unwrap();

  repo.add_rating(&id, 2.0).await.unwrap();
  repo.add_rating(&id, 4.0).await.unwrap();

  let event = repo.get_by_id(&id).await.unwrap().unwrap();
  assert_eq!(event.ratings.len(), 1);
  assert_eq!(event.average_rating, 4.0);
}

#[tokio::test]
async fn rating_a_missing_event_is_not_found() {
  let store = store().await;
  let repo = repo(&store, &session_for("ada-uid", "ada@example.com"));

  let outcome = repo.add_rating("nope", 4.0).await;

  assert!(matches!(outcome, Err(Error::NotFound(_))));
}

// ─── Repository: the organizer guard ─────────────────────────────────────────

#[tokio::test]
async fn list_created_scopes_to_the_caller_newest_first() {
  let store = store().await;
  let ada = repo(&store, &session_for("ada-uid", "ada@example.com"));
  let brin = repo(&store, &session_for("brin-uid", "brin@example.com"));

  ada.create(new_event("older", 1)).await.unwrap();
  ada.create(new_event("newer", 5)).await.unwrap();
  brin.create(new_event("not mine", 3)).await.unwrap();

  let titles: Vec<_> = ada
    .list_created()
    .await
    .unwrap()
    .into_iter()
    .map(|event| event.title)
    .collect();

  assert_eq!(titles, vec!["newer", "older"]);
}

#[tokio::test]
async fn update_rewrites_only_the_editable_fields() {
  let store = store().await;
  let ada = repo(&store, &session_for("ada-uid", "ada@example.com"));
  let brin = repo(&store, &session_for("brin-uid", "brin@example.com"));
  let id = ada.create(new_event("picnic", 3)).await.unwrap();
  brin.confirm_attendance(&id).await.unwrap();

  ada
    .update(&id, EventUpdate {
      title:         "garden party".to_owned(),
      description:   "moved outdoors".to_owned(),
      date:          Utc::now() + Duration::days(9),
      time:          "17:00".to_owned(),
      location:      "the garden".to_owned(),
      category:      "community".to_owned(),
      max_attendees: Some(40),
    })
    .await
    .unwrap();

  let event = ada.get_by_id(&id).await.unwrap().unwrap();
  assert_eq!(event.title, "garden party");
  assert_eq!(event.max_attendees, Some(40));
  assert_eq!(event.attendees, vec!["brin-uid"]);
  assert_eq!(event.organizer_name, "ada@example.com");
}

#[tokio::test]
async fn update_by_another_user_is_permission_denied() {
  let store = store().await;
  let ada = repo(&store, &session_for("ada-uid", "ada@example.com"));
  let brin = repo(&store, &session_for("brin-uid", "brin@example.com"));
  let id = ada.create(new_event("picnic", 3)).await.unwrap();

  let outcome = brin
    .update(&id, EventUpdate {
      title:         "hijacked".to_owned(),
      description:   String::new(),
      date:          Utc::now(),
      time:          String::new(),
      location:      String::new(),
      category:      String::new(),
      max_attendees: None,
    })
    .await;

  assert!(matches!(outcome, Err(Error::PermissionDenied(_))));
  let event = ada.get_by_id(&id).await.unwrap().unwrap();
  assert_eq!(event.title, "picnic");
}

#[tokio::test]
async fn update_of_missing_event_is_not_found() {
  let store = store().await;
  let repo = repo(&store, &session_for("ada-uid", "ada@example.com"));

  let outcome = repo
    .update("nope", EventUpdate {
      title:         String::new(),
      description:   String::new(),
      date:          Utc::now(),
      time:          String::new(),
      location:      String::new(),
      category:      String::new(),
      max_attendees: None,
    })
    .await;

  assert!(matches!(outcome, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn delete_by_the_organizer_removes_the_event() {
  let store = store().await;
  let repo = repo(&store, &session_for("ada-uid", "ada@example.com"));
  let id = repo.create(new_event("picnic", 3)).await.unwrap();

  repo.delete(&id).await.unwrap();

  assert_eq!(repo.get_by_id(&id).await.unwrap(), None);
}

#[tokio::test]
async fn delete_by_another_user_is_permission_denied() {
  let store = store().await;
  let ada = repo(&store, &session_for("ada-uid", "ada@example.com"));
  let brin = repo(&store, &session_for("brin-uid", "brin@example.com"));
  let id = ada.create(new_event("picnic", 3)).await.unwrap();

  let outcome = brin.delete(&id).await;

  assert!(matches!(outcome, Err(Error::PermissionDenied(_))));
  assert!(ada.get_by_id(&id).await.unwrap().is_some());
}

// ─── View-model ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn load_all_publishes_the_collection() {
  let store = store().await;
  let session = session_for("ada-uid", "ada@example.com");
  repo(&store, &session).create(new_event("picnic", 3)).await.unwrap();
  let vm = EventViewModel::new(repo(&store, &session));

  vm.load_all().await;

  let state = vm.state();
  assert!(!state.loading);
  assert_eq!(state.error, None);
  assert_eq!(state.items.len(), 1);
}

#[tokio::test]
async fn failed_intent_keeps_the_collection_and_reports() {
  let store = store().await;
  let session = session_for("ada-uid", "ada@example.com");
  let id = repo(&store, &session).create(new_event("picnic", 3)).await.unwrap();
  let vm = EventViewModel::new(repo(&store, &session));
  vm.load_all().await;

  session.set(None);
  vm.confirm_attendance(&id).await;

  let state = vm.state();
  assert!(!state.loading);
  assert_eq!(state.error.as_deref(), Some("not signed in"));
  assert_eq!(state.items.len(), 1);
}

#[tokio::test]
async fn successful_mutation_refetches_the_list() {
  let store = store().await;
  let session = session_for("ada-uid", "ada@example.com");
  let id = repo(&store, &session).create(new_event("picnic", 3)).await.unwrap();
  let vm = EventViewModel::new(repo(&store, &session));

  vm.confirm_attendance(&id).await;

  let state = vm.state();
  assert!(!state.loading);
  assert_eq!(state.items.len(), 1);
  assert!(state.items[0].is_user_attending("ada-uid"));
}

#[tokio::test]
async fn cancel_from_attending_refetches_the_attending_list() {
  let store = store().await;
  let session = session_for("ada-uid", "ada@example.com");
  let repo = repo(&store, &session);
  let kept = repo.create(new_event("kept", 1)).await.unwrap();
  let left = repo.create(new_event("left", 2)).await.unwrap();
  repo.confirm_attendance(&kept).await.unwrap();
  repo.confirm_attendance(&left).await.unwrap();

  let vm = EventViewModel::new(repo);
  vm.load_attending().await;
  assert_eq!(vm.state().items.len(), 2);

  vm.cancel_attendance_from_attending(&left).await;

  let state = vm.state();
  assert_eq!(state.items.len(), 1);
  assert_eq!(state.items[0].title, "kept");
}

#[tokio::test]
async fn update_refetches_the_created_list() {
  let store = store().await;
  let session = session_for("ada-uid", "ada@example.com");
  let id = repo(&store, &session).create(new_event("picnic", 3)).await.unwrap();
  let vm = EventViewModel::new(repo(&store, &session));

  vm.update(&id, EventUpdate {
    title:         "garden party".to_owned(),
    description:   "moved outdoors".to_owned(),
    date:          Utc::now() + Duration::days(9),
    time:          "17:00".to_owned(),
    location:      "the garden".to_owned(),
    category:      "community".to_owned(),
    max_attendees: None,
  })
  .await;

  let state = vm.state();
  assert!(!state.loading);
  assert_eq!(state.items.len(), 1);
  assert_eq!(state.items[0].title, "garden party");
}

#[tokio::test]
async fn delete_refetches_the_created_list() {
  let store = store().await;
  let session = session_for("ada-uid", "ada@example.com");
  let repo = repo(&store, &session);
  let removed = repo.create(new_event("removed", 1)).await.unwrap();
  repo.create(new_event("kept", 2)).await.unwrap();

  let vm = EventViewModel::new(repo);
  vm.load_created().await;
  assert_eq!(vm.state().items.len(), 2);

  vm.delete(&removed).await;

  let state = vm.state();
  assert_eq!(state.items.len(), 1);
  assert_eq!(state.items[0].title, "kept");
}

#[tokio::test]
async fn clear_error_keeps_the_collection() {
  let store = store().await;
  let session = session_for("ada-uid", "ada@example.com");
  repo(&store, &session).create(new_event("picnic", 3)).await.unwrap();
  let vm = EventViewModel::new(repo(&store, &session));
  vm.load_all().await;

  session.set(None);
  vm.load_created().await;
  assert!(vm.state().error.is_some());

  vm.clear_error();

  let state = vm.state();
  assert_eq!(state.error, None);
  assert_eq!(state.items.len(), 1);
}

// ─── View-model against a failing backend ────────────────────────────────────

/// Store double that can refuse reads while letting writes through,
/// delegating everything to a real in-memory store.
struct FlakyStore {
  inner:      SqliteStore,
  fail_reads: AtomicBool,
}

#[derive(Debug, thiserror::Error)]
enum FlakyError {
  #[error("simulated outage")]
  Outage,
  #[error(transparent)]
  Store(#[from] agora_store_sqlite::Error),
}

impl FlakyStore {
  async fn new() -> Arc<Self> {
    let inner = SqliteStore::open_in_memory().await.expect("open in-memory store");
    Arc::new(Self { inner, fail_reads: AtomicBool::new(false) })
  }

  fn refuse_reads(&self) {
    self.fail_reads.store(true, Ordering::SeqCst);
  }

  fn reads_allowed(&self) -> Result<(), FlakyError> {
    if self.fail_reads.load(Ordering::SeqCst) {
      Err(FlakyError::Outage)
    } else {
      Ok(())
    }
  }
}

impl DocumentStore for FlakyStore {
  type Error = FlakyError;

  async fn get_all(&self, collection: &str) -> Result<Vec<Document>, FlakyError> {
    self.reads_allowed()?;
    Ok(self.inner.get_all(collection).await?)
  }

  async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, FlakyError> {
    self.reads_allowed()?;
    Ok(self.inner.get(collection, id).await?)
  }

  async fn query(
    &self,
    collection: &str,
    filter: &Filter,
  ) -> Result<Vec<Document>, FlakyError> {
    self.reads_allowed()?;
    Ok(self.inner.query(collection, filter).await?)
  }

  async fn add(
    &self,
    collection: &str,
    fields: Map<String, Value>,
  ) -> Result<DocumentId, FlakyError> {
    Ok(self.inner.add(collection, fields).await?)
  }

  async fn update(&self, collection: &str, id: &str, patch: Patch) -> Result<(), FlakyError> {
    Ok(self.inner.update(collection, id, patch).await?)
  }

  async fn delete(&self, collection: &str, id: &str) -> Result<(), FlakyError> {
    Ok(self.inner.delete(collection, id).await?)
  }
}

#[tokio::test]
async fn refetch_failure_reports_and_keeps_the_old_collection() {
  let flaky = FlakyStore::new().await;
  let session = session_for("ada-uid", "ada@example.com");
  let repo = EventRepository::new(Arc::clone(&flaky), session.clone());
  let id = repo.create(new_event("picnic", 3)).await.unwrap();

  let vm = EventViewModel::new(repo);
  vm.load_all().await;
  assert_eq!(vm.state().items.len(), 1);

  // The join itself lands; only the follow-up re-fetch fails.
  flaky.refuse_reads();
  vm.confirm_attendance(&id).await;

  let state = vm.state();
  assert!(!state.loading);
  assert_eq!(state.error.as_deref(), Some("store error: simulated outage"));
  assert_eq!(state.items.len(), 1);
  assert!(state.items[0].attendees.is_empty());
}
