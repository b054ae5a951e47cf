//! Binary object storage for item images.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;

/// Bucket name used for item images.
pub const ITEM_IMAGES_BUCKET: &str = "item-images";

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `bytes` at `path`, returning the object's public URL.
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<String, StoreError>;
    async fn delete(&self, path: &str) -> Result<(), StoreError>;
    /// Map a public URL produced by [`upload`](Self::upload) back to its path.
    fn path_for_url<'a>(&self, url: &'a str) -> Option<&'a str>;
}

/// Storage path for an image of `item_id` owned by `user_id`.
pub fn item_image_path(user_id: &str, item_id: &str, file_name: &str) -> String {
    format!("{user_id}/{item_id}/{file_name}")
}

/// Rejects empty, absolute and parent-relative object paths.
fn check_object_path(path: &str) -> Result<(), StoreError> {
    let normal = !path.is_empty()
        && Path::new(path)
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if normal {
        Ok(())
    } else {
        Err(StoreError::InvalidId(path.to_string()))
    }
}

fn object_url(base_url: &str, path: &str) -> String {
    format!("{base_url}/{ITEM_IMAGES_BUCKET}/{path}")
}

fn strip_object_url<'a>(base_url: &str, url: &'a str) -> Option<&'a str> {
    url.strip_prefix(base_url)?
        .strip_prefix('/')?
        .strip_prefix(ITEM_IMAGES_BUCKET)?
        .strip_prefix('/')
        .filter(|path| check_object_path(path).is_ok())
}

/// [`ObjectStorage`] writing objects below a directory on local disk.
///
/// Files land at `{root}/item-images/{path}`; the server exposes `root`
/// under `base_url`, so the returned URLs are directly fetchable.
pub struct FileObjectStorage {
    root: PathBuf,
    base_url: String,
}

impl FileObjectStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_path(&self, path: &str) -> Result<PathBuf, StoreError> {
        check_object_path(path)?;
        Ok(self.root.join(ITEM_IMAGES_BUCKET).join(path))
    }
}

#[async_trait]
impl ObjectStorage for FileObjectStorage {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<String, StoreError> {
        let dest = self.file_path(path)?;
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&dest, &bytes).await?;
        tracing::debug!(path, size = bytes.len(), "Stored object");
        Ok(object_url(&self.base_url, path))
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        match tokio::fs::remove_file(self.file_path(path)?).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn path_for_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        strip_object_url(&self.base_url, url)
    }
}

/// In-memory [`ObjectStorage`] serving URLs under `base_url`.
pub struct MemoryObjectStorage {
    base_url: String,
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryObjectStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    pub async fn contains(&self, path: &str) -> bool {
        self.objects.read().await.contains_key(path)
    }
}

#[async_trait]
impl ObjectStorage for MemoryObjectStorage {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<String, StoreError> {
        check_object_path(path)?;
        self.objects.write().await.insert(path.to_string(), bytes);
        Ok(object_url(&self.base_url, path))
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        self.objects.write().await.remove(path);
        Ok(())
    }

    fn path_for_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        strip_object_url(&self.base_url, url)
    }
}
