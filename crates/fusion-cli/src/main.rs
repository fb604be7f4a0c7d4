//! `fusion-token` — obtain and inspect identity tokens for the fusion API.
//!
//! # Usage
//!
//! ```
//! fusion-token --client-id <id> login <username> <password>
//! fusion-token --client-id <id> refresh <refresh-token>
//! fusion-token check <access-token>
//! ```

mod report;

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use fusion_auth::{CognitoClient, cognito::DEFAULT_REGION, decode_claims};
use fusion_core::identity::IdentityProvider;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "fusion-token", about = "Obtain and inspect identity tokens for the fusion API")]
struct Args {
  /// Cognito app client id (required for login and refresh).
  #[arg(long, env = "FUSION_COGNITO_CLIENT_ID")]
  client_id: Option<String>,

  #[arg(long, env = "FUSION_COGNITO_REGION", default_value = DEFAULT_REGION)]
  region: String,

  /// Override the Cognito endpoint URL.
  #[arg(long, env = "FUSION_COGNITO_ENDPOINT")]
  endpoint: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Exchange a username and password for tokens.
  Login { username: String, password: String },
  /// Exchange a refresh token for a new access token.
  Refresh { refresh_token: String },
  /// Decode a token locally and report whether it has expired.
  Check { token: String },
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  match &args.command {
    Command::Login { username, password } => {
      let tokens = provider(&args)?
        .authenticate(username, password)
        .await
        .context("login failed")?;
      print!("{}", report::login(&tokens));
    }
    Command::Refresh { refresh_token } => {
      let tokens = provider(&args)?
        .refresh(refresh_token)
        .await
        .context("token refresh failed")?;
      print!("{}", report::refresh(&tokens));
    }
    Command::Check { token } => {
      let claims = decode_claims(token).context("invalid token format")?;
      print!("{}", report::check(&claims, Utc::now()));
    }
  }

  Ok(())
}

fn provider(args: &Args) -> Result<CognitoClient> {
  let client_id = args
    .client_id
    .clone()
    .context("--client-id (or FUSION_COGNITO_CLIENT_ID) is required")?;
  let http = reqwest::Client::builder()
    .timeout(Duration::from_secs(30))
    .build()
    .context("failed to build HTTP client")?;
  CognitoClient::new(http, &args.region, client_id, args.endpoint.as_deref())
    .context("invalid Cognito endpoint")
}
