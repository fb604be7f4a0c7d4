//! The `IdentityProvider` trait and the token bundles it hands out.
//!
//! Credential issuance is delegated entirely to the provider; nothing in
//! this workspace signs or verifies tokens.

use std::future::Future;

use serde::{Deserialize, Serialize};

/// Tokens issued on a successful password login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSet {
  pub access_token:  String,
  pub id_token:      String,
  pub refresh_token: String,
  /// Lifetime of the access token in seconds.
  pub expires_in:    u64,
}

/// Tokens issued when exchanging a refresh token. The refresh token itself
/// is not rotated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshedTokens {
  pub access_token: String,
  pub id_token:     String,
  pub expires_in:   u64,
}

pub trait IdentityProvider: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Exchange a username and password for a [`TokenSet`].
  fn authenticate(
    &self,
    username: &str,
    password: &str,
  ) -> impl Future<Output = Result<TokenSet, Self::Error>> + Send;

  /// Exchange a refresh token for fresh access and id tokens.
  fn refresh(
    &self,
    refresh_token: &str,
  ) -> impl Future<Output = Result<RefreshedTokens, Self::Error>> + Send;
}
