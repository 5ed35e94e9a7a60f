//! The observable UI state triple shared by list-bearing view-models.

/// Snapshot of a list screen: the collection, an in-flight flag and the
/// latest failure message.
///
/// Every view-model intent moves a `ViewState` through the same cycle:
/// [`begin`](ViewState::begin) when the intent starts, then exactly one of
/// [`finish`](ViewState::finish) or [`fail`](ViewState::fail). `loading` is
/// therefore `false` whenever no intent is outstanding, and a failed intent
/// leaves `items` exactly as they were.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState<T> {
  pub items:   Vec<T>,
  pub loading: bool,
  pub error:   Option<String>,
}

impl<T> ViewState<T> {
  /// Mark an intent as started: raise `loading`, clear any stale error.
  pub fn begin(&mut self) {
    self.loading = true;
    self.error = None;
  }

  /// Settle an intent successfully with a fresh collection.
  pub fn finish(&mut self, items: Vec<T>) {
    self.items = items;
    self.loading = false;
  }

  /// Settle an intent with a failure, leaving `items` untouched.
  pub fn fail(&mut self, message: impl Into<String>) {
    self.loading = false;
    self.error = Some(message.into());
  }
}

// Manual impl: a `T: Default` bound would serve no purpose for a Vec.
impl<T> Default for ViewState<T> {
  fn default() -> Self {
    Self { items: Vec::new(), loading: false, error: None }
  }
}
