//! SQLite backend for the training sources.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime.

mod decode;
mod schema;
mod source;

pub mod error;

pub use error::{Error, Result};
pub use schema::Provision;
pub use source::SqliteSource;
