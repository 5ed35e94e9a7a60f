//! Password and token authentication against the backend's `/auth/v1/`
//! endpoints.
//!
//! A successful sign-in stores the returned access token inside the
//! [`RestStore`]; every later document request carries it as the bearer.
//! Signing out drops the token locally before attempting revocation, so a
//! failed revocation never keeps the client authenticated.

use serde::Deserialize;
use serde_json::json;

use agora_core::auth::{AuthProvider, AuthUser};

use crate::{store::RestStore, Result};

#[derive(Debug, Deserialize)]
struct TokenResponse {
  access_token: String,
  user:         WireUser,
}

#[derive(Debug, Deserialize)]
struct WireUser {
  id:    String,
  email: Option<String>,
}

impl RestStore {
  async fn token_request(&self, url: &str, body: serde_json::Value, context: &str) -> Result<AuthUser> {
    let resp = self
      .apply_headers(self.http.post(url))
      .json(&body)
      .send()
      .await?;
    let resp = Self::check(resp, context).await?;

    let token: TokenResponse = resp.json().await?;
    self.set_token(Some(token.access_token));
    Ok(AuthUser::new(token.user.id, token.user.email))
  }
}

impl AuthProvider for RestStore {
  type Error = crate::Error;

  async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser> {
    let url = format!("{}?grant_type=password", self.auth_url("token"));
    tracing::debug!("password sign-in");
    self
      .token_request(
        &url,
        json!({ "email": email, "password": password }),
        "password sign-in",
      )
      .await
  }

  async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser> {
    let url = self.auth_url("signup");
    tracing::debug!("sign-up");
    self
      .token_request(
        &url,
        json!({ "email": email, "password": password }),
        "sign-up",
      )
      .await
  }

  async fn sign_in_with_token(&self, token: &str) -> Result<AuthUser> {
    let url = format!("{}?grant_type=id_token", self.auth_url("token"));
    tracing::debug!("token sign-in");
    self
      .token_request(
        &url,
        json!({ "provider": "google", "id_token": token }),
        "token sign-in",
      )
      .await
  }

  async fn sign_out(&self) -> Result<()> {
    let bearer = self.bearer();
    self.set_token(None);

    let url = self.auth_url("logout");
    tracing::debug!("signing out");
    let resp = self
      .http
      .post(&url)
      .header("apikey", self.api_key())
      .header("Authorization", format!("Bearer {bearer}"))
      .send()
      .await?;
    Self::check(resp, "signing out").await?;
    Ok(())
  }
}
