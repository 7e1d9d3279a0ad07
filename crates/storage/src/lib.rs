//! Object storage for raw posting batches.
//!
//! [`StorageBackend`] is built explicitly from config (local filesystem for
//! development, S3 otherwise) and handed to [`RawStore`] by reference.

pub mod backend;
pub mod error;
pub mod raw;

pub use backend::StorageBackend;
pub use error::StorageError;
pub use raw::RawStore;
