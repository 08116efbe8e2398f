//! Casedesk database layer
//!
//! This crate provides the document store for case studies,
//! using SQLite via sqlx for persistence. Optional document sections
//! are persisted as JSON columns.

pub mod error;
pub mod models;
pub mod repository;
mod utils;

pub use error::DbError;
pub use models::*;
pub use repository::Database;

/// Re-export sqlx types for convenience
pub use sqlx::SqlitePool;
