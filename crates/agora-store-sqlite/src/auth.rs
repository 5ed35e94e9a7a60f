//! Password authentication backed by the `users` table.
//!
//! Passwords are stored as argon2id PHC strings. Hashing and verification
//! run on the async caller's thread; only the row lookups go through the
//! connection worker.

use argon2::{
  password_hash::SaltString, Argon2, PasswordHash, PasswordHasher,
  PasswordVerifier,
};
use chrono::Utc;
use rand_core::OsRng;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use agora_core::auth::{AuthProvider, AuthUser};

use crate::{store::SqliteStore, Error, Result};

fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| Error::PasswordHash(e.to_string()))
}

impl AuthProvider for SqliteStore {
  type Error = Error;

  async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser> {
    let email_owned = email.to_owned();
    let row: Option<(String, String, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT uid, email, password_hash FROM users WHERE email = ?1",
              rusqlite::params![email_owned],
              |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?,
        )
      })
      .await?;

    // Unknown email and wrong password must be indistinguishable.
    let Some((uid, email, hash)) = row else {
      return Err(Error::InvalidCredentials);
    };

    let parsed = PasswordHash::new(&hash)
      .map_err(|e| Error::PasswordHash(e.to_string()))?;
    Argon2::default()
      .verify_password(password.as_bytes(), &parsed)
      .map_err(|_| Error::InvalidCredentials)?;

    Ok(AuthUser::new(uid, Some(email)))
  }

  async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser> {
    let hash = hash_password(password)?;
    let uid = Uuid::new_v4().hyphenated().to_string();
    let created_at = Utc::now().to_rfc3339();

    let email_owned = email.to_owned();
    let uid_clone = uid.clone();
    let inserted: bool = self
      .conn
      .call(move |conn| {
        let taken: bool = conn
          .query_row(
            "SELECT 1 FROM users WHERE email = ?1",
            rusqlite::params![email_owned],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if taken {
          return Ok(false);
        }

        conn.execute(
          "INSERT INTO users (uid, email, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![uid_clone, email_owned, hash, created_at],
        )?;
        Ok(true)
      })
      .await?;

    if !inserted {
      return Err(Error::EmailTaken);
    }
    Ok(AuthUser::new(uid, Some(email.to_owned())))
  }

  async fn sign_in_with_token(&self, _token: &str) -> Result<AuthUser> {
    Err(Error::TokenSignInUnsupported)
  }

  /// There is no server-side session to revoke.
  async fn sign_out(&self) -> Result<()> {
    Ok(())
  }
}
