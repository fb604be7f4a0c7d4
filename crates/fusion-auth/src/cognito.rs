//! [`CognitoClient`] — `InitiateAuth` against an AWS Cognito user pool app
//! client.
//!
//! The app client must allow `USER_PASSWORD_AUTH` and have no client secret.
//! Requests are plain JSON-over-HTTP; no request signing is involved for
//! this action.

use fusion_core::identity::{IdentityProvider, RefreshedTokens, TokenSet};
use reqwest::{Client, StatusCode, Url, header};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const DEFAULT_REGION: &str = "us-east-1";

const TARGET: &str = "AWSCognitoIdentityProviderService.InitiateAuth";
const CONTENT_TYPE: &str = "application/x-amz-json-1.1";

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthRequest<'a> {
  auth_flow:       &'a str,
  client_id:       &'a str,
  auth_parameters: AuthParameters<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct AuthParameters<'a> {
  #[serde(skip_serializing_if = "Option::is_none")]
  username:      Option<&'a str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  password:      Option<&'a str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  refresh_token: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
  authentication_result: Option<AuthenticationResult>,
  challenge_name:        Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
  access_token:  Option<String>,
  id_token:      Option<String>,
  refresh_token: Option<String>,
  expires_in:    Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ServiceError {
  #[serde(rename = "__type")]
  kind:    String,
  #[serde(default, alias = "Message")]
  message: String,
}

// ─── Client ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct CognitoClient {
  client:    Client,
  endpoint:  Url,
  client_id: String,
}

impl CognitoClient {
  /// `endpoint` overrides the regional endpoint derived from `region`.
  pub fn new(
    client: Client,
    region: &str,
    client_id: impl Into<String>,
    endpoint: Option<&str>,
  ) -> Result<Self> {
    let raw = match endpoint {
      Some(e) => e.to_owned(),
      None => format!("https://cognito-idp.{region}.amazonaws.com/"),
    };
    let endpoint =
      Url::parse(&raw).map_err(|e| Error::Malformed(format!("endpoint {raw:?}: {e}")))?;
    Ok(Self { client, endpoint, client_id: client_id.into() })
  }

  pub fn endpoint(&self) -> &Url { &self.endpoint }

  async fn initiate_auth(
    &self,
    flow: &str,
    parameters: AuthParameters<'_>,
  ) -> Result<AuthenticationResult> {
    let body = serde_json::to_vec(&InitiateAuthRequest {
      auth_flow:       flow,
      client_id:       &self.client_id,
      auth_parameters: parameters,
    })
    .map_err(|e| Error::Malformed(e.to_string()))?;

    let resp = self
      .client
      .post(self.endpoint.clone())
      .header("X-Amz-Target", TARGET)
      .header(header::CONTENT_TYPE, CONTENT_TYPE)
      .body(body)
      .send()
      .await?;

    let status = resp.status();
    let bytes = resp.bytes().await?;

    if !status.is_success() {
      return Err(service_error(status, &bytes));
    }

    let parsed: InitiateAuthResponse =
      serde_json::from_slice(&bytes).map_err(|e| Error::Malformed(e.to_string()))?;

    match (parsed.authentication_result, parsed.challenge_name) {
      (Some(result), _) => Ok(result),
      (None, Some(challenge)) => Err(Error::Rejected(format!("challenge {challenge} required"))),
      (None, None) => Err(Error::Rejected("no authentication result".into())),
    }
  }
}

/// A 4xx carrying a Cognito `__type` is a refusal; anything else is the
/// provider misbehaving.
fn service_error(status: StatusCode, bytes: &[u8]) -> Error {
  match serde_json::from_slice::<ServiceError>(bytes) {
    Ok(err) if status.is_client_error() => {
      tracing::debug!(kind = %err.kind, %status, "identity provider refused request");
      let kind = err.kind.rsplit('#').next().unwrap_or(&err.kind).to_owned();
      if err.message.is_empty() {
        Error::Rejected(kind)
      } else {
        Error::Rejected(format!("{kind}: {}", err.message))
      }
    }
    _ => Error::Status { status, body: String::from_utf8_lossy(bytes).into_owned() },
  }
}

fn field(value: Option<String>, name: &str) -> Result<String> {
  value.ok_or_else(|| Error::Malformed(format!("authentication result without {name}")))
}

// ─── IdentityProvider impl ───────────────────────────────────────────────────

impl IdentityProvider for CognitoClient {
  type Error = Error;

  async fn authenticate(&self, username: &str, password: &str) -> Result<TokenSet> {
    let result = self
      .initiate_auth("USER_PASSWORD_AUTH", AuthParameters {
        username:      Some(username),
        password:      Some(password),
        refresh_token: None,
      })
      .await?;

    tracing::info!(username, "password login succeeded");
    Ok(TokenSet {
      access_token:  field(result.access_token, "AccessToken")?,
      id_token:      field(result.id_token, "IdToken")?,
      refresh_token: field(result.refresh_token, "RefreshToken")?,
      expires_in:    result.expires_in.unwrap_or_default(),
    })
  }

  async fn refresh(&self, refresh_token: &str) -> Result<RefreshedTokens> {
    let result = self
      .initiate_auth("REFRESH_TOKEN_AUTH", AuthParameters {
        username:      None,
        password:      None,
        refresh_token: Some(refresh_token),
      })
      .await?;

    tracing::info!("refresh token exchanged");
    Ok(RefreshedTokens {
      access_token: field(result.access_token, "AccessToken")?,
      id_token:     field(result.id_token, "IdToken")?,
      expires_in:   result.expires_in.unwrap_or_default(),
    })
  }
}
