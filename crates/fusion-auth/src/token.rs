//! Local JWT inspection.
//!
//! Only the payload segment is read. Nothing here checks the signature, so
//! the result is good for deciding whether a token is worth sending, not
//! for deciding whether to trust it.

use base64::{
  Engine as _, alphabet,
  engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// base64url that tolerates both padded and unpadded input.
const B64URL: GeneralPurpose = GeneralPurpose::new(
  &alphabet::URL_SAFE,
  GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// The claims this service cares about. Unknown claims are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
  #[serde(default)]
  pub sub:       String,
  /// Access tokens carry `username`, id tokens `cognito:username`.
  #[serde(default, alias = "cognito:username")]
  pub username:  Option<String>,
  #[serde(default)]
  pub email:     Option<String>,
  /// Expiry, epoch seconds.
  pub exp:       i64,
  #[serde(default)]
  pub iat:       Option<i64>,
  #[serde(default)]
  pub token_use: Option<String>,
}

impl Claims {
  pub fn expires_at(&self) -> Option<DateTime<Utc>> { DateTime::from_timestamp(self.exp, 0) }

  pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool { self.exp < now.timestamp() }

  /// The username when present, otherwise the subject.
  pub fn principal(&self) -> &str { self.username.as_deref().unwrap_or(&self.sub) }
}

/// Decode the payload segment of a JWT without verifying it.
pub fn decode_claims(token: &str) -> Result<Claims> {
  let mut segments = token.split('.');
  let payload = match (segments.next(), segments.next()) {
    (Some(_), Some(payload)) if !payload.is_empty() => payload,
    _ => return Err(Error::TokenFormat("expected header.payload.signature".into())),
  };

  let bytes = B64URL
    .decode(payload)
    .map_err(|e| Error::TokenFormat(format!("payload is not base64url: {e}")))?;
  serde_json::from_slice(&bytes)
    .map_err(|e| Error::TokenFormat(format!("payload is not a claims object: {e}")))
}

/// `true` when the token's `exp` is in the past. A token that cannot be
/// decoded counts as expired.
pub fn is_expired(token: &str, now: DateTime<Utc>) -> bool {
  match decode_claims(token) {
    Ok(claims) => claims.is_expired_at(now),
    Err(error) => {
      tracing::debug!(%error, "undecodable token treated as expired");
      true
    }
  }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
/// The scheme is matched case-insensitively.
pub fn bearer_token(header: &str) -> Option<&str> {
  let (scheme, token) = header.trim().split_once(char::is_whitespace)?;
  let token = token.trim();
  (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
pub(crate) mod tests {
  use base64::engine::general_purpose::URL_SAFE_NO_PAD;
  use chrono::TimeZone;
  use serde_json::json;

  use super::*;

  /// An unsigned token carrying `claims`.
  pub(crate) fn jwt(claims: serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","kid":"test"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.c2lnbmF0dXJl")
  }

  fn at(secs: i64) -> DateTime<Utc> { Utc.timestamp_opt(secs, 0).unwrap() }

  #[test]
  fn decodes_access_token_claims() {
    let token = jwt(json!({
      "sub": "abc-123",
      "username": "luke",
      "exp": 2_000,
      "iat": 1_000,
      "token_use": "access",
      "scope": "aws.cognito.signin.user.admin",
    }));

    let claims = decode_claims(&token).unwrap();
    assert_eq!(claims.sub, "abc-123");
    assert_eq!(claims.principal(), "luke");
    assert_eq!(claims.exp, 2_000);
    assert_eq!(claims.token_use.as_deref(), Some("access"));
  }

  #[test]
  fn id_token_username_alias() {
    let token = jwt(json!({ "sub": "s", "cognito:username": "leia", "exp": 1 }));
    assert_eq!(decode_claims(&token).unwrap().principal(), "leia");
  }

  #[test]
  fn padded_payload_is_accepted() {
    let payload = base64::engine::general_purpose::URL_SAFE.encode(r#"{"sub":"x","exp":5}"#);
    let token = format!("e30.{payload}.sig");
    assert_eq!(decode_claims(&token).unwrap().exp, 5);
  }

  #[test]
  fn past_expiry_is_expired_regardless_of_signature() {
    let token = jwt(json!({ "sub": "s", "exp": 1_000 }));
    assert!(is_expired(&token, at(1_001)));
    assert!(!is_expired(&token, at(1_000)));
    assert!(!is_expired(&token, at(999)));
  }

  #[test]
  fn malformed_tokens_are_expired() {
    for bad in ["", "not-a-jwt", "a..c", "a.!!!.c", "a.e30.c"] {
      assert!(is_expired(bad, at(0)), "{bad:?}");
    }
    assert!(matches!(decode_claims("a.e30.c"), Err(Error::TokenFormat(_))));
  }

  #[test]
  fn extracts_bearer_token() {
    assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
    assert_eq!(bearer_token("bearer   abc"), Some("abc"));
    assert_eq!(bearer_token("Basic dXNlcjpwYXNz"), None);
    assert_eq!(bearer_token("Bearer"), None);
    assert_eq!(bearer_token("Bearer   "), None);
  }
}
