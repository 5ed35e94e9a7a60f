//! Identity types and the authentication provider seam.

use std::future::Future;

/// Store-assigned identifier of an authenticated user.
pub type UserId = String;

/// The signed-in identity as reported by an [`AuthProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
  pub uid:   UserId,
  pub email: Option<String>,
}

impl AuthUser {
  pub fn new(uid: impl Into<UserId>, email: Option<String>) -> Self {
    Self { uid: uid.into(), email }
  }

  /// Short human-readable name: the local part of the email, or `"user"`
  /// when no email is on record.
  pub fn display_name(&self) -> &str {
    match &self.email {
      Some(email) => email.split('@').next().unwrap_or("user"),
      None => "user",
    }
  }
}

/// Abstraction over an authentication backend.
///
/// Providers verify credentials and create accounts; they do not hold
/// session state. Publishing the returned [`AuthUser`] into a
/// [`Session`](crate::session::Session) is the caller's job, normally done
/// by [`AuthViewModel`](crate::session::AuthViewModel).
pub trait AuthProvider: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Verify `email`/`password` and return the signed-in identity.
  fn sign_in<'a>(
    &'a self,
    email: &'a str,
    password: &'a str,
  ) -> impl Future<Output = Result<AuthUser, Self::Error>> + Send + 'a;

  /// Create an account and return its identity.
  fn sign_up<'a>(
    &'a self,
    email: &'a str,
    password: &'a str,
  ) -> impl Future<Output = Result<AuthUser, Self::Error>> + Send + 'a;

  /// Exchange a federated identity token for a signed-in identity.
  fn sign_in_with_token<'a>(
    &'a self,
    token: &'a str,
  ) -> impl Future<Output = Result<AuthUser, Self::Error>> + Send + 'a;

  /// Revoke any backend-side session.
  fn sign_out(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
