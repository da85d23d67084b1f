//! # storage-adapters
//!
//! Implementations of the `domains` ports: the relational store and the
//! media blob store. Each backend sits behind its own cargo feature.

#[cfg(feature = "db-sqlite")]
pub mod sqlite;

#[cfg(feature = "media-local")]
pub mod local_media;

#[cfg(feature = "db-sqlite")]
pub use sqlite::SqliteStore;

#[cfg(feature = "media-local")]
pub use local_media::LocalMediaStore;
