//! [`RegistryClient`] — subjects from the Star Wars API.
//!
//! A subject lookup is two dependent requests: the person record, then the
//! planet its `homeworld` URL points at.

use fusion_core::{record::Subject, upstream::SubjectRegistry};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::{Error, Result, base_url, get_json};

pub const DEFAULT_BASE_URL: &str = "https://swapi.dev/api/";

#[derive(Debug, Deserialize)]
struct PersonBody {
  name:      String,
  /// Absolute URL of the planet resource.
  homeworld: String,
}

#[derive(Debug, Deserialize)]
struct PlanetBody {
  name:    String,
  climate: String,
}

/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct RegistryClient {
  client:   Client,
  base_url: Url,
}

impl RegistryClient {
  pub fn new(client: Client, base: &str) -> Result<Self> {
    Ok(Self { client, base_url: base_url(base)? })
  }

  fn person_url(&self, subject_id: &str) -> Result<Url> {
    let valid = !subject_id.is_empty()
      && subject_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
      return Err(Error::InvalidSubjectId(subject_id.to_owned()));
    }
    self
      .base_url
      .join(&format!("people/{subject_id}/"))
      .map_err(|_| Error::InvalidSubjectId(subject_id.to_owned()))
  }
}

impl SubjectRegistry for RegistryClient {
  type Error = Error;

  async fn fetch_subject(&self, subject_id: &str) -> Result<Subject> {
    let person: PersonBody = get_json(&self.client, self.person_url(subject_id)?).await?;

    let homeworld = Url::parse(&person.homeworld).map_err(|e| Error::Malformed {
      url:    format!("homeworld of subject {subject_id}"),
      reason: e.to_string(),
    })?;
    let planet: PlanetBody = get_json(&self.client, homeworld).await?;

    tracing::debug!(subject_id, planet = %planet.name, "registry subject resolved");
    Ok(Subject {
      id:                subject_id.to_owned(),
      display_name:      person.name,
      habitat_name:      planet.name,
      habitat_condition: planet.climate.to_lowercase(),
    })
  }
}
