//! Wiring for the fusion HTTP server.
//!
//! Turns a [`ServerConfig`] into a ready-to-serve axum [`Router`]: the
//! SQLite store, the upstream and identity clients, the orchestrator and
//! the API routes.

pub mod config;
pub mod error;
pub mod housekeeping;

pub use config::ServerConfig;
pub use error::{Error, Result};

use std::sync::Arc;

use axum::Router;
use fusion_api::{AppState, AuthPolicy};
use fusion_auth::CognitoClient;
use fusion_core::{
  Backend, FusionService,
  observe::{NoopObserver, Observer, TracingObserver},
};
use fusion_store_sqlite::SqliteStore;
use fusion_upstream::{ConditionClient, RegistryClient};
use tower_http::trace::TraceLayer;

// ─── Backend ─────────────────────────────────────────────────────────────────

/// Production collaborators: one SQLite file for cache and durable
/// records, HTTP clients for everything else.
pub struct LiveBackend;

impl Backend for LiveBackend {
  type Cache = SqliteStore;
  type Store = SqliteStore;
  type Registry = RegistryClient;
  type Conditions = ConditionClient;
}

pub type LiveState = AppState<LiveBackend, CognitoClient>;

// ─── Assembly ────────────────────────────────────────────────────────────────

/// Everything `main` needs to serve.
pub struct Server {
  pub state: LiveState,
  /// Handle on the store for the housekeeping task.
  pub store: SqliteStore,
}

impl Server {
  pub async fn build(cfg: &ServerConfig) -> Result<Self> {
    let store = SqliteStore::open(&cfg.database_path, cfg.tables()?).await?;

    let http = fusion_upstream::http_client(cfg.request_timeout())?;
    let registry = RegistryClient::new(http.clone(), &cfg.registry_base_url)?;
    let conditions =
      ConditionClient::new(http.clone(), &cfg.weather_base_url, cfg.weather_api_key.clone())?;
    let identity = CognitoClient::new(
      http,
      &cfg.cognito_region,
      cfg.cognito_client_id.clone(),
      cfg.cognito_endpoint.as_deref(),
    )?;

    if cfg.weather_api_key.is_empty() {
      tracing::warn!("weather_api_key is empty; condition lookups will be rejected");
    }

    let observer: Arc<dyn Observer> =
      if cfg.offline { Arc::new(NoopObserver) } else { Arc::new(TracingObserver) };
    let fusion =
      FusionService::<LiveBackend>::new(store.clone(), store.clone(), registry, conditions)
        .with_observer(observer)
        .with_cache_ttl(cfg.cache_ttl());

    let state = AppState {
      fusion:   Arc::new(fusion),
      identity: Arc::new(identity),
      auth:     Arc::new(AuthPolicy { require_token: cfg.require_token }),
    };
    Ok(Self { state, store })
  }

  /// The API router, wrapped in an HTTP trace layer unless `offline`.
  pub fn router(&self, offline: bool) -> Router {
    let api = fusion_api::router(self.state.clone());
    if offline { api } else { api.layer(TraceLayer::new_for_http()) }
  }
}

// ─── Integration tests ───────────────────────────────────────────────────────
