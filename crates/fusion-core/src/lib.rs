//! Core types and trait definitions for the fusion service.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! orchestrator only talks to its collaborators through the traits declared
//! here; `fusion-upstream`, `fusion-auth` and `fusion-store-sqlite` provide
//! the concrete implementations.

// Native `async fn` in traits; the `Send` bounds are spelled out on each
// method instead.
#![allow(async_fn_in_trait)]

pub mod cache;
pub mod clock;
pub mod error;
pub mod identity;
pub mod observe;
pub mod orchestrator;
pub mod record;
pub mod store;
pub mod upstream;

pub use error::{Error, Result};
pub use orchestrator::{Backend, FusionService};

/// Boxed error used wherever a collaborator's own error type is erased.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
