//! # Local Media Store
//! Local filesystem implementation of `MediaStore`.
//! Features: Content-addressable storage and directory sharding.

use std::ffi::OsStr;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use domains::ports::MediaStore;
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

pub struct LocalMediaStore {
    /// Root directory for all uploads (e.g., "./data/images")
    root_path: PathBuf,
    /// Public URL prefix (e.g., "/api/app/images")
    url_prefix: String,
}

impl LocalMediaStore {
    pub async fn new(root: PathBuf, url_prefix: &str) -> anyhow::Result<Self> {
        fs::create_dir_all(root.join(".tmp")).await?;
        Ok(Self {
            root_path: root,
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        })
    }

    /// Generates a sharded path: "ab/cd/abcd...hash.ext"
    fn get_sharded_path(&self, name: &str) -> PathBuf {
        let mut path = self.root_path.clone();
        path.push(&name[0..2]);
        path.push(&name[2..4]);
        path.push(name);
        path
    }

    fn temp_path(&self) -> PathBuf {
        self.root_path.join(".tmp").join(Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    /// Saves an upload using its SHA-256 hash as the filename, keeping the
    /// original extension so the file is served with a sensible type.
    /// Identical uploads share one file.
    async fn save_upload(&self, data: Bytes, filename: &str) -> anyhow::Result<String> {
        let hash = hex::encode(Sha256::digest(&data[..]));
        let name = match extension_of(filename) {
            Some(ext) => format!("{hash}.{ext}"),
            None => hash,
        };

        let target_path = self.get_sharded_path(&name);
        if fs::try_exists(&target_path).await? {
            debug!(%name, "upload already stored");
            return Ok(name);
        }

        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Write then rename so readers never see a half-written file.
        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, &data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&temp_path, &target_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        debug!(%name, size = data.len(), "upload stored");
        Ok(name)
    }

    fn url_for(&self, name: &str) -> String {
        format!("{}/{}", self.url_prefix, name)
    }

    async fn load(&self, name: &str) -> anyhow::Result<Option<Bytes>> {
        if !is_stored_name(name) {
            return Ok(None);
        }
        match fs::read(self.get_sharded_path(name)).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn is_extension(ext: &str) -> bool {
    (1..=8).contains(&ext.len()) && ext.bytes().all(|b| b.is_ascii_alphanumeric())
}

fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase)
        .filter(|ext| is_extension(ext))
}

/// `<64 lowercase hex chars>[.<ext>]`. Anything else cannot have been
/// produced by `save_upload`, which also keeps path separators out.
fn is_stored_name(name: &str) -> bool {
    let (hash, ext) = match name.split_once('.') {
        Some((hash, ext)) => (hash, Some(ext)),
        None => (name, None),
    };
    hash.len() == 64
        && hash.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
        && ext.map_or(true, |e| is_extension(e) && e == e.to_ascii_lowercase())
}
