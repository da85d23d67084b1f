//! # services
//!
//! Business rules of the microblog, written against the `domains` ports.
//! Every operation opens its own store transaction and commits it before
//! returning; any early return drops the handle, which rolls back.

mod media;
mod tweets;
mod users;

use std::sync::Arc;

use domains::ports::{MediaStore, Store};

/// Display names handed out to users created on their first request.
pub const NAMES: &[&str] = &[
    "Tom", "Anna", "Jason", "Samantha", "Erik", "George", "Julia", "Emma",
];

/// The domain service shared by all request handlers.
#[derive(Clone)]
pub struct MicroblogService {
    store: Arc<dyn Store>,
    media: Arc<dyn MediaStore>,
}

impl MicroblogService {
    pub fn new(store: Arc<dyn Store>, media: Arc<dyn MediaStore>) -> Self {
        Self { store, media }
    }
}
