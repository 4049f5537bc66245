use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

/// Root of the blob store: one flat directory of small JSON objects
#[derive(Debug, Clone)]
pub struct BlobConnection {
    root: PathBuf,
}

impl BlobConnection {
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        info!("Blob storage root ready at {}", root.display());
        Ok(Self { root })
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
