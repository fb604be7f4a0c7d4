//! Plain-text reports printed by each subcommand.

use std::fmt::Write as _;

use chrono::{DateTime, SecondsFormat, Utc};
use fusion_auth::Claims;
use fusion_core::identity::{RefreshedTokens, TokenSet};

pub fn login(tokens: &TokenSet) -> String {
  let mut out = String::from("Authentication successful.\n");
  let _ = writeln!(out, "\nAccess token:\n{}", tokens.access_token);
  let _ = writeln!(out, "\nId token (for API Gateway):\n{}", tokens.id_token);
  let _ = writeln!(out, "\nRefresh token:\n{}", tokens.refresh_token);
  let _ = writeln!(out, "\nExpires in: {} seconds", tokens.expires_in);
  let _ = writeln!(out, "\n# shell exports");
  let _ = writeln!(out, "export ACCESS_TOKEN=\"{}\"", tokens.access_token);
  let _ = writeln!(out, "export ID_TOKEN=\"{}\"", tokens.id_token);
  let _ = writeln!(out, "export REFRESH_TOKEN=\"{}\"", tokens.refresh_token);
  out
}

pub fn refresh(tokens: &RefreshedTokens) -> String {
  let mut out = String::from("Token refreshed.\n");
  let _ = writeln!(out, "\nAccess token:\n{}", tokens.access_token);
  let _ = writeln!(out, "\nExpires in: {} seconds", tokens.expires_in);
  let _ = writeln!(out, "\n# shell exports");
  let _ = writeln!(out, "export ACCESS_TOKEN=\"{}\"", tokens.access_token);
  out
}

pub fn check(claims: &Claims, now: DateTime<Utc>) -> String {
  let expired = claims.is_expired_at(now);
  let expires_at = claims
    .expires_at()
    .map_or_else(|| format!("{} (out of range)", claims.exp), rfc3339);

  let mut out = String::new();
  let _ = writeln!(out, "User:         {}", claims.principal());
  let _ = writeln!(out, "Expires at:   {expires_at}");
  let _ = writeln!(out, "Current time: {}", rfc3339(now));
  let _ = writeln!(out, "Status:       {}", if expired { "EXPIRED" } else { "VALID" });
  if expired {
    let _ = writeln!(out, "\nUse the refresh command to get a new token.");
  }
  out
}

fn rfc3339(t: DateTime<Utc>) -> String { t.to_rfc3339_opts(SecondsFormat::Secs, true) }

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn claims(exp: i64) -> Claims {
    Claims {
      sub:       "abc-123".into(),
      username:  Some("luke".into()),
      email:     None,
      exp,
      iat:       None,
      token_use: Some("access".into()),
    }
  }

  #[test]
  fn check_reports_valid_token() {
    let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let out = check(&claims(1_700_003_600), now);

    assert!(out.contains("User:         luke"), "{out}");
    assert!(out.contains("Expires at:   2023-11-14T23:13:20Z"), "{out}");
    assert!(out.contains("Status:       VALID"), "{out}");
    assert!(!out.contains("refresh command"));
  }

  #[test]
  fn check_reports_expired_token_with_advice() {
    let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let mut c = claims(1_600_000_000);
    c.username = None;
    let out = check(&c, now);

    assert!(out.contains("User:         abc-123"), "{out}");
    assert!(out.contains("Status:       EXPIRED"), "{out}");
    assert!(out.contains("refresh command"));
  }

  #[test]
  fn login_report_lists_exports() {
    let out = login(&TokenSet {
      access_token:  "a".into(),
      id_token:      "i".into(),
      refresh_token: "r".into(),
      expires_in:    3600,
    });
    assert!(out.contains("export ACCESS_TOKEN=\"a\""));
    assert!(out.contains("export ID_TOKEN=\"i\""));
    assert!(out.contains("export REFRESH_TOKEN=\"r\""));
    assert!(out.contains("Expires in: 3600 seconds"));
  }
}
