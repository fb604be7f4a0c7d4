//! Identity for the fusion service.
//!
//! - [`CognitoClient`] talks to the identity provider for password logins
//!   and refresh-token exchanges.
//! - [`token`] decodes JWT claims locally to check expiry. Signatures are
//!   never verified here; an upstream gateway is trusted with that.

pub mod cognito;
pub mod error;
pub mod token;

use chrono::{DateTime, Utc};
use fusion_core::identity::IdentityProvider;

pub use cognito::CognitoClient;
pub use error::{Error, Result};
pub use token::{Claims, bearer_token, decode_claims, is_expired};

/// Return `access_token` if it is still valid at `now`, otherwise exchange
/// `refresh_token` for a new access token.
pub async fn ensure_fresh<P>(
  provider: &P,
  access_token: &str,
  refresh_token: &str,
  now: DateTime<Utc>,
) -> Result<String, P::Error>
where
  P: IdentityProvider,
{
  if !is_expired(access_token, now) {
    return Ok(access_token.to_owned());
  }

  tracing::info!("access token expired, refreshing");
  let refreshed = provider.refresh(refresh_token).await?;
  Ok(refreshed.access_token)
}
