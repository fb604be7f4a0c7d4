//! SQLite backend for the fusion cache and durable stores.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. One database file holds both tables;
//! their names come from configuration.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use schema::{TableName, Tables};
pub use store::SqliteStore;
