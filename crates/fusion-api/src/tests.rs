//! Router tests: in-memory SQLite for cache and history, fakes for the
//! upstream services and the identity provider.

use std::sync::{
  Arc, Mutex,
  atomic::{AtomicI64, Ordering},
};

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use fusion_core::{
  Backend, FusionService,
  clock::Clock,
  identity::{IdentityProvider, RefreshedTokens, TokenSet},
  record::{ConditionReading, Subject},
  upstream::{ConditionSource, SubjectRegistry},
};
use fusion_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use thiserror::Error;
use tower::ServiceExt as _;

use crate::{
  AppState, AuthPolicy,
  auth::{EXPIRED_TOKEN, MISSING_TOKEN},
  custom::INVALID_INPUT,
  error::TOKEN_HINT,
  router,
};

// ─── Test doubles ────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
#[error("{0}")]
struct Boom(&'static str);

/// Knows every subject except `404`.
#[derive(Clone, Default)]
struct FakeRegistry {
  requested: Arc<Mutex<Vec<String>>>,
}

impl FakeRegistry {
  fn requested(&self) -> Vec<String> { self.requested.lock().unwrap().clone() }
}

impl SubjectRegistry for FakeRegistry {
  type Error = Boom;

  async fn fetch_subject(&self, subject_id: &str) -> Result<Subject, Boom> {
    self.requested.lock().unwrap().push(subject_id.to_owned());
    if subject_id == "404" {
      return Err(Boom("registry returned 404"));
    }
    Ok(Subject {
      id:                subject_id.to_owned(),
      display_name:      format!("Subject {subject_id}"),
      habitat_name:      "Tatooine".into(),
      habitat_condition: "arid".into(),
    })
  }
}

#[derive(Clone, Default)]
struct FakeConditions;

impl ConditionSource for FakeConditions {
  type Error = Boom;

  async fn current_conditions(&self, _habitat: &str) -> Result<ConditionReading, Boom> {
    Ok(ConditionReading {
      temperature_celsius: 27,
      description:         "clear sky".into(),
      humidity_percent:    10,
    })
  }
}

/// Accepts `luke` / `usetheforce` and the refresh token `good-refresh`.
struct FakeIdentity;

impl IdentityProvider for FakeIdentity {
  type Error = Boom;

  async fn authenticate(&self, username: &str, password: &str) -> Result<TokenSet, Boom> {
    if (username, password) != ("luke", "usetheforce") {
      return Err(Boom("NotAuthorizedException"));
    }
    Ok(TokenSet {
      access_token:  "access".into(),
      id_token:      "id".into(),
      refresh_token: "good-refresh".into(),
      expires_in:    3600,
    })
  }

  async fn refresh(&self, refresh_token: &str) -> Result<RefreshedTokens, Boom> {
    if refresh_token != "good-refresh" {
      return Err(Boom("NotAuthorizedException"));
    }
    Ok(RefreshedTokens {
      access_token: "access-2".into(),
      id_token:     "id-2".into(),
      expires_in:   3600,
    })
  }
}

/// Advances one second on every read so that records get distinct stamps.
struct TickingClock(AtomicI64);

const START_SECS: i64 = 1_700_000_000;

impl Clock for TickingClock {
  fn now(&self) -> DateTime<Utc> {
    let secs = self.0.fetch_add(1, Ordering::SeqCst);
    DateTime::from_timestamp(secs, 0).unwrap()
  }
}

struct TestBackend;

impl Backend for TestBackend {
  type Cache = SqliteStore;
  type Store = SqliteStore;
  type Registry = FakeRegistry;
  type Conditions = FakeConditions;
}

// ─── Harness ─────────────────────────────────────────────────────────────────

struct Harness {
  state:    AppState<TestBackend, FakeIdentity>,
  registry: FakeRegistry,
}

impl Harness {
  async fn new(require_token: bool) -> Self {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let registry = FakeRegistry::default();
    let fusion = FusionService::<TestBackend>::new(
      store.clone(),
      store,
      registry.clone(),
      FakeConditions,
    )
    .with_clock(Arc::new(TickingClock(AtomicI64::new(START_SECS))));

    let state = AppState {
      fusion:   Arc::new(fusion),
      identity: Arc::new(FakeIdentity),
      auth:     Arc::new(AuthPolicy { require_token }),
    };
    Self { state, registry }
  }

  fn app(&self) -> Router { router(self.state.clone()) }

  async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
    let resp = self.app().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, body)
  }

  async fn get(&self, uri: &str) -> (StatusCode, Value) {
    self.send(Request::get(uri).body(Body::empty()).unwrap()).await
  }

  async fn post(&self, uri: &str, body: &str) -> (StatusCode, Value) {
    let req = Request::post(uri)
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_owned()))
      .unwrap();
    self.send(req).await
  }
}

fn jwt(exp: i64) -> String {
  let payload = URL_SAFE_NO_PAD.encode(json!({ "sub": "abc", "exp": exp }).to_string());
  format!("eyJhbGciOiJSUzI1NiJ9.{payload}.sig")
}

fn bearer(uri: &str, token: &str) -> Request<Body> {
  Request::get(uri)
    .header(header::AUTHORIZATION, format!("Bearer {token}"))
    .body(Body::empty())
    .unwrap()
}

// ─── /fused ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn fused_defaults_to_first_subject() {
  let h = Harness::new(false).await;
  let (status, body) = h.get("/fused").await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(h.registry.requested(), vec!["1"]);
  assert_eq!(body["subjectName"], "Subject 1");
  assert_eq!(body["habitatName"], "Tatooine");
  assert_eq!(body["habitatCondition"], "arid");
  assert_eq!(body["reading"]["temperatureCelsius"], 27);
  assert!(body["id"].is_string());
  assert!(body["createdAtEpochMillis"].is_i64());
}

#[tokio::test]
async fn fused_accepts_either_parameter_name() {
  let h = Harness::new(false).await;
  h.get("/fused?subjectId=4").await;
  h.get("/fused?characterId=5").await;
  h.get("/fused?subjectId=").await;

  assert_eq!(h.registry.requested(), vec!["4", "5", "1"]);
}

#[tokio::test]
async fn fused_rejects_both_parameter_names_with_json_body() {
  let h = Harness::new(false).await;
  let (status, body) = h.get("/fused?subjectId=1&characterId=2").await;

  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()), "{body}");
  assert!(h.registry.requested().is_empty());
}

#[tokio::test]
async fn history_rejects_both_cursor_names_with_json_body() {
  let h = Harness::new(false).await;
  let (status, body) = h.get("/history?offset=1&cursor=2").await;

  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["message"].is_string(), "{body}");
}

#[tokio::test]
async fn fused_repeat_is_served_from_cache() {
  let h = Harness::new(false).await;
  let (_, first) = h.get("/fused?subjectId=2").await;
  let (status, second) = h.get("/fused?subjectId=2").await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(first, second);
  assert_eq!(h.registry.requested().len(), 1);
}

#[tokio::test]
async fn upstream_failure_is_a_generic_500() {
  let h = Harness::new(false).await;
  let (status, body) = h.get("/fused?subjectId=404").await;

  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(body, json!({ "message": "Internal Server Error" }));
}

// ─── /history ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn history_is_newest_first_and_pages_by_offset() {
  let h = Harness::new(false).await;
  for id in ["1", "2", "3"] {
    h.get(&format!("/fused?subjectId={id}")).await;
  }

  let (status, page) = h.get("/history?limit=2").await;
  assert_eq!(status, StatusCode::OK);
  let names: Vec<&str> = page
    .as_array()
    .unwrap()
    .iter()
    .map(|r| r["subjectName"].as_str().unwrap())
    .collect();
  assert_eq!(names, vec!["Subject 3", "Subject 2"]);

  let cursor = page[1]["createdAtEpochMillis"].as_i64().unwrap();
  let (_, rest) = h.get(&format!("/history?offset={cursor}")).await;
  assert_eq!(rest.as_array().unwrap().len(), 1);
  assert_eq!(rest[0]["subjectName"], "Subject 1");
}

#[tokio::test]
async fn history_ignores_junk_parameters() {
  let h = Harness::new(false).await;
  h.get("/fused").await;

  let (status, body) = h.get("/history?limit=abc&offset=yesterday").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn history_excludes_custom_records() {
  let h = Harness::new(false).await;
  h.post("/custom", r#"{"name":"n","description":"d"}"#).await;

  let (status, body) = h.get("/history").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!([]));
}

// ─── /custom ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn custom_record_is_created() {
  let h = Harness::new(false).await;
  let (status, body) = h
    .post("/custom", r#"{"name":"Lightsaber","description":"An elegant weapon"}"#)
    .await;

  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["name"], "Lightsaber");
  assert_eq!(body["description"], "An elegant weapon");
  assert!(body["id"].is_string());
}

#[tokio::test]
async fn custom_record_requires_both_fields() {
  let h = Harness::new(false).await;
  for input in [r#"{"name":"only"}"#, r#"{"name":"  ","description":"d"}"#, ""] {
    let (status, body) = h.post("/custom", input).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{input:?}");
    assert_eq!(body["message"], INVALID_INPUT);
  }
}

#[tokio::test]
async fn custom_record_rejects_malformed_json() {
  let h = Harness::new(false).await;
  let (status, body) = h.post("/custom", "{not json").await;

  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["message"].as_str().unwrap().starts_with("Invalid JSON body"));
}

// ─── /login and /refresh ─────────────────────────────────────────────────────

#[tokio::test]
async fn login_returns_tokens() {
  let h = Harness::new(true).await;
  let (status, body) = h.post("/login", r#"{"username":"luke","password":"usetheforce"}"#).await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(
    body,
    json!({
      "accessToken": "access",
      "idToken": "id",
      "refreshToken": "good-refresh",
      "expiresIn": 3600,
    })
  );
}

#[tokio::test]
async fn login_validates_then_maps_rejection() {
  let h = Harness::new(false).await;

  let (status, body) = h.post("/login", r#"{"username":"luke"}"#).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["message"], "Username and password required");

  let (status, body) = h.post("/login", r#"{"username":"luke","password":"nope"}"#).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(body, json!({ "message": "Authentication failed" }));
}

#[tokio::test]
async fn refresh_exchanges_token() {
  let h = Harness::new(false).await;

  let (status, body) = h.post("/refresh", r#"{"refreshToken":"good-refresh"}"#).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["accessToken"], "access-2");

  let (status, body) = h.post("/refresh", "{}").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["message"], "Refresh token required");

  let (status, body) = h.post("/refresh", r#"{"refreshToken":"stolen"}"#).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(body["message"], "Token refresh failed");
}

// ─── Bearer guard ────────────────────────────────────────────────────────────

#[tokio::test]
async fn guard_rejects_missing_token_with_hint() {
  let h = Harness::new(true).await;
  let (status, body) = h.get("/fused").await;

  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(body, json!({ "message": MISSING_TOKEN, "hint": TOKEN_HINT }));
  assert!(h.registry.requested().is_empty());
}

#[tokio::test]
async fn guard_rejects_non_bearer_scheme() {
  let h = Harness::new(true).await;
  let req = Request::get("/history")
    .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
    .body(Body::empty())
    .unwrap();
  let (status, body) = h.send(req).await;

  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(body["message"], MISSING_TOKEN);
}

#[tokio::test]
async fn guard_rejects_expired_and_garbage_tokens() {
  let h = Harness::new(true).await;
  for token in [jwt(START_SECS - 60), "garbage".to_owned()] {
    let (status, body) = h.send(bearer("/fused", &token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "{token}");
    assert_eq!(body["message"], EXPIRED_TOKEN);
    assert_eq!(body["hint"], TOKEN_HINT);
  }
}

#[tokio::test]
async fn guard_admits_live_token() {
  let h = Harness::new(true).await;
  let token = jwt(START_SECS + 3600);

  let (status, _) = h.send(bearer("/fused", &token)).await;
  assert_eq!(status, StatusCode::OK);

  let req = Request::post("/custom")
    .header(header::AUTHORIZATION, format!("bearer {token}"))
    .body(Body::from(r#"{"name":"n","description":"d"}"#))
    .unwrap();
  let (status, _) = h.send(req).await;
  assert_eq!(status, StatusCode::CREATED);
}
