//! [`ConditionClient`] — current weather from OpenWeatherMap.
//!
//! Habitats are fictional, so each one is mapped to a real city with a
//! similar climate before the lookup.

use fusion_core::{record::ConditionReading, upstream::ConditionSource};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::{Error, Result, base_url, get_json};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/";

/// City used for any habitat missing from [`LOCALES`].
pub const DEFAULT_LOCALE: &str = "London";

/// Habitat (lower-case) → city with a comparable climate.
pub const LOCALES: &[(&str, &str)] = &[
  ("tatooine", "Cairo"),  // desert
  ("hoth", "Moscow"),     // cold
  ("endor", "Vancouver"), // forest
  ("naboo", "Rome"),      // temperate
];

const KELVIN_OFFSET: f64 = 273.15;

/// The city whose weather stands in for `habitat`'s. Case-insensitive.
pub fn locale_for(habitat: &str) -> &'static str {
  let habitat = habitat.trim().to_lowercase();
  LOCALES
    .iter()
    .find(|(name, _)| *name == habitat)
    .map_or(DEFAULT_LOCALE, |(_, city)| *city)
}

/// Kelvin to whole degrees Celsius, rounded to nearest.
pub fn kelvin_to_celsius(kelvin: f64) -> i32 { (kelvin - KELVIN_OFFSET).round() as i32 }

#[derive(Debug, Deserialize)]
struct WeatherBody {
  main:    MainBody,
  weather: Vec<SummaryBody>,
}

#[derive(Debug, Deserialize)]
struct MainBody {
  /// Kelvin, the API's default unit.
  temp:     f64,
  humidity: u8,
}

#[derive(Debug, Deserialize)]
struct SummaryBody {
  description: String,
}

#[derive(Debug, Clone)]
pub struct ConditionClient {
  client:   Client,
  base_url: Url,
  api_key:  String,
}

impl ConditionClient {
  pub fn new(client: Client, base: &str, api_key: impl Into<String>) -> Result<Self> {
    Ok(Self { client, base_url: base_url(base)?, api_key: api_key.into() })
  }

  fn weather_url(&self, city: &str) -> Result<Url> {
    let mut url = self
      .base_url
      .join("data/2.5/weather")
      .map_err(|_| Error::InvalidBaseUrl(self.base_url.to_string()))?;
    url
      .query_pairs_mut()
      .append_pair("q", city)
      .append_pair("appid", &self.api_key);
    Ok(url)
  }
}

impl ConditionSource for ConditionClient {
  type Error = Error;

  async fn current_conditions(&self, habitat: &str) -> Result<ConditionReading> {
    let city = locale_for(habitat);
    let url = self.weather_url(city)?;
    let body: WeatherBody = get_json(&self.client, url).await?;

    let description = body
      .weather
      .into_iter()
      .next()
      .map(|w| w.description)
      .ok_or_else(|| Error::Malformed {
        url:    format!("weather for {city}"),
        reason: "empty `weather` list".to_owned(),
      })?;

    tracing::debug!(habitat, city, "conditions fetched");
    Ok(ConditionReading {
      temperature_celsius: kelvin_to_celsius(body.main.temp),
      description,
      humidity_percent: body.main.humidity,
    })
  }
}
