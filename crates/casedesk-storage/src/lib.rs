//! Casedesk image storage
//!
//! This crate provides the image object store for case-study assets:
//! upload a byte buffer and get back a durable public URL, delete by a
//! previously issued URL. S3-compatible and local-disk backends.

pub mod error;
pub mod local;
pub mod s3;
pub mod store;

pub use error::StorageError;
pub use local::LocalStore;
pub use s3::{S3Config, S3Store};
pub use store::{ImageStore, object_key};
