//! HTTP clients for the two external services the orchestrator fuses.
//!
//! - [`RegistryClient`] — the Star Wars API (people and planets).
//! - [`ConditionClient`] — OpenWeatherMap current weather.
//!
//! Neither client retries; a failed request surfaces as an [`Error`] and the
//! caller decides what to do with it.

pub mod error;
pub mod registry;
pub mod weather;

use std::time::Duration;

pub use error::{Error, Result};
pub use registry::RegistryClient;
pub use weather::ConditionClient;

/// Per-request timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the shared [`reqwest::Client`] used by both upstream clients.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
  Ok(
    reqwest::Client::builder()
      .timeout(timeout)
      .user_agent(concat!("fusion/", env!("CARGO_PKG_VERSION")))
      .build()?,
  )
}

/// GET `url` and decode a JSON body. The query string is left out of error
/// messages since it may carry an API key.
pub(crate) async fn get_json<T>(client: &reqwest::Client, url: reqwest::Url) -> Result<T>
where
  T: serde::de::DeserializeOwned,
{
  let shown = redacted(&url);
  let resp = client.get(url).send().await.map_err(reqwest::Error::without_url)?;

  if !resp.status().is_success() {
    return Err(Error::Status { url: shown, status: resp.status() });
  }

  let bytes = resp.bytes().await.map_err(reqwest::Error::without_url)?;
  serde_json::from_slice(&bytes).map_err(|e| Error::Malformed {
    url:    shown,
    reason: e.to_string(),
  })
}

fn redacted(url: &reqwest::Url) -> String {
  let mut shown = url.clone();
  shown.set_query(None);
  shown.to_string()
}

/// Parse a base URL, making sure relative joins append to its path.
pub(crate) fn base_url(raw: &str) -> Result<reqwest::Url> {
  let normalised = if raw.ends_with('/') { raw.to_owned() } else { format!("{raw}/") };
  reqwest::Url::parse(&normalised).map_err(|_| Error::InvalidBaseUrl(raw.to_owned()))
}
