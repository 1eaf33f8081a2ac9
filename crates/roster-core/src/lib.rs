//! Core types and the reconciliation engine for the training matrix.
//!
//! This crate is deliberately free of HTTP and database dependencies. It turns
//! the rows read from the five logical sources into a [`Matrix`] of resolved
//! statuses: keys are normalised, the visible audience is filtered, the
//! relevant columns are derived, and every cell is resolved from its current
//! and historical records.

pub mod columns;
pub mod dataset;
pub mod entity;
pub mod error;
pub mod export;
pub mod filter;
pub mod key;
pub mod matrix;
pub mod resolve;
pub mod source;

pub use dataset::{DataQuality, Dataset, RawDataset};
pub use error::{Error, Result};
pub use filter::MatrixFilter;
pub use matrix::Matrix;
pub use resolve::ResolvedCell;
