//! microblog/crates/domains/src/lib.rs
//!
//! The domain model, error taxonomy and port definitions for the microblog.

pub mod error;
pub mod models;
pub mod ports;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use ports::*;
