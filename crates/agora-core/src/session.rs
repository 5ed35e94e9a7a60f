//! Observable session state and the authentication view-model.
//!
//! The process-wide identity lives in a single [`Session`] value created at
//! composition time and handed to everything that needs it. There is no
//! ambient global: repositories read the session they were given, and tests
//! construct as many independent sessions as they like.

use std::sync::Arc;

use tokio::sync::watch;

use crate::auth::{AuthProvider, AuthUser, UserId};

// ─── Session ─────────────────────────────────────────────────────────────────

/// Shared, observable holder of the current signed-in user.
///
/// Cloning is cheap and every clone observes the same state. `None` means
/// signed out.
#[derive(Clone)]
pub struct Session {
  tx: Arc<watch::Sender<Option<AuthUser>>>,
}

impl Session {
  /// A fresh signed-out session.
  pub fn new() -> Self {
    let (tx, _rx) = watch::channel(None);
    Self { tx: Arc::new(tx) }
  }

  /// Snapshot of the current user.
  pub fn current_user(&self) -> Option<AuthUser> {
    self.tx.borrow().clone()
  }

  /// Snapshot of the current user's id.
  pub fn current_uid(&self) -> Option<UserId> {
    self.tx.borrow().as_ref().map(|user| user.uid.clone())
  }

  /// Subscribe to identity changes. The receiver starts at the value
  /// current at subscription time and is notified of every change after it.
  pub fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
    self.tx.subscribe()
  }

  /// Publish a new identity (`None` to sign out). Succeeds even when no
  /// subscriber currently exists.
  pub fn set(&self, user: Option<AuthUser>) {
    self.tx.send_replace(user);
  }
}

impl Default for Session {
  fn default() -> Self {
    Self::new()
  }
}

// ─── Auth view-model ─────────────────────────────────────────────────────────

/// Phase of the most recent authentication intent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthPhase {
  #[default]
  Idle,
  Loading,
  Success,
  Error(String),
}

/// Observable output of [`AuthViewModel`]: the intent phase plus a mirror
/// of the session's current user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthViewState {
  pub phase:        AuthPhase,
  pub current_user: Option<AuthUser>,
}

/// View-model for the sign-in / sign-up screens.
///
/// Owns the intent phase; the identity itself lives in the injected
/// [`Session`]. A background task mirrors session changes into
/// [`AuthViewState::current_user`] so a single subscription gives consumers
/// both. The mirror is released when the view-model is dropped.
pub struct AuthViewModel<P> {
  provider: Arc<P>,
  session:  Session,
  state:    Arc<watch::Sender<AuthViewState>>,
  mirror:   tokio::task::JoinHandle<()>,
}

impl<P: AuthProvider> AuthViewModel<P> {
  /// Build a view-model over `provider`, mirroring `session`.
  ///
  /// Must be called from within a tokio runtime.
  pub fn new(provider: Arc<P>, session: Session) -> Self {
    let initial = AuthViewState {
      phase:        AuthPhase::Idle,
      current_user: session.current_user(),
    };
    let (tx, _rx) = watch::channel(initial);
    let state = Arc::new(tx);

    let mirror = {
      let state = Arc::clone(&state);
      let mut changes = session.subscribe();
      tokio::spawn(async move {
        while changes.changed().await.is_ok() {
          let user = changes.borrow_and_update().clone();
          state.send_modify(|s| s.current_user = user);
        }
      })
    };

    Self { provider, session, state, mirror }
  }

  /// Subscribe to state changes.
  pub fn subscribe(&self) -> watch::Receiver<AuthViewState> {
    self.state.subscribe()
  }

  /// Snapshot of the current state.
  pub fn state(&self) -> AuthViewState {
    self.state.borrow().clone()
  }

  /// Sign in with email and password.
  ///
  /// Blank credentials fail locally, without a provider round-trip.
  pub async fn sign_in(&self, email: &str, password: &str) {
    if Self::reject_blank(email, password) {
      self.set_phase(AuthPhase::Error(BLANK_CREDENTIALS.into()));
      return;
    }
    self.set_phase(AuthPhase::Loading);
    match self.provider.sign_in(email, password).await {
      Ok(user) => self.settle_signed_in(user),
      Err(e) => self.set_phase(AuthPhase::Error(e.to_string())),
    }
  }

  /// Create an account and sign in as it.
  pub async fn sign_up(&self, email: &str, password: &str) {
    if Self::reject_blank(email, password) {
      self.set_phase(AuthPhase::Error(BLANK_CREDENTIALS.into()));
      return;
    }
    self.set_phase(AuthPhase::Loading);
    match self.provider.sign_up(email, password).await {
      Ok(user) => self.settle_signed_in(user),
      Err(e) => self.set_phase(AuthPhase::Error(e.to_string())),
    }
  }

  /// Sign in by exchanging a federated identity token.
  pub async fn sign_in_with_token(&self, token: &str) {
    self.set_phase(AuthPhase::Loading);
    match self.provider.sign_in_with_token(token).await {
      Ok(user) => self.settle_signed_in(user),
      Err(e) => self.set_phase(AuthPhase::Error(e.to_string())),
    }
  }

  /// Sign out. The local session is cleared even when backend revocation
  /// fails; the failure is logged and not surfaced.
  pub async fn sign_out(&self) {
    if let Err(e) = self.provider.sign_out().await {
      tracing::warn!(error = %e, "sign-out revocation failed");
    }
    self.session.set(None);
    self.state.send_modify(|s| {
      s.phase = AuthPhase::Idle;
      s.current_user = None;
    });
  }

  /// Return the phase to [`AuthPhase::Idle`], keeping the current user.
  /// Called by the rendering layer after it has consumed a terminal phase.
  pub fn reset(&self) {
    self.set_phase(AuthPhase::Idle);
  }

  fn reject_blank(email: &str, password: &str) -> bool {
    email.trim().is_empty() || password.trim().is_empty()
  }

  fn settle_signed_in(&self, user: AuthUser) {
    self.session.set(Some(user.clone()));
    self.state.send_modify(|s| {
      s.phase = AuthPhase::Success;
      s.current_user = Some(user);
    });
  }

  fn set_phase(&self, phase: AuthPhase) {
    self.state.send_modify(|s| s.phase = phase);
  }
}

impl<P> Drop for AuthViewModel<P> {
  fn drop(&mut self) {
    self.mirror.abort();
  }
}

const BLANK_CREDENTIALS: &str = "email and password must not be empty";
