//! # refdesk Common Library
//!
//! Shared code for the refdesk reference-material service including:
//! - Record model and the file-backed record store
//! - Hierarchy derivation (class → semester → subject → exam → material)
//! - Search and reporting queries
//! - Operator allow-list
//! - Configuration loading

pub mod config;
pub mod error;
pub mod navigator;
pub mod operators;
pub mod record;
pub mod search;
pub mod store;

pub use error::{Error, Result};
pub use operators::{OperatorRegistry, UserId};
pub use record::{Record, RecordField, Semester};
pub use store::{ImportRejection, RecordStore};
