use crate::storage::blob::connection::BlobConnection;
use crate::storage::blob::models::status_record::StatusDocument;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io;
use std::sync::Arc;
use tracing::{debug, warn};

const STATUS_KEY: &str = "status.json";
/// Process-wide last-push marker; lives in the store because the
/// handling process is not guaranteed to persist across invocations
const LAST_UPDATE_KEY: &str = "last_update";

#[async_trait]
pub trait StatusRepository {
    async fn get_status(&self) -> io::Result<Option<StatusDocument>>;

    /// Overwrites the snapshot wholesale; no merge with prior content
    async fn put_status(&self, status: &StatusDocument) -> io::Result<()>;

    async fn get_last_update(&self) -> io::Result<Option<DateTime<Utc>>>;

    async fn set_last_update(&self, at: DateTime<Utc>) -> io::Result<()>;
}

pub struct FsStatusRepository {
    connection: Arc<BlobConnection>,
}

impl FsStatusRepository {
    pub fn new(connection: Arc<BlobConnection>) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl StatusRepository for FsStatusRepository {
    async fn get_status(&self) -> io::Result<Option<StatusDocument>> {
        let path = self.connection.path_for(STATUS_KEY);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes).map_err(io::Error::other)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn put_status(&self, status: &StatusDocument) -> io::Result<()> {
        let bytes = serde_json::to_vec(status).map_err(io::Error::other)?;
        tokio::fs::write(self.connection.path_for(STATUS_KEY), bytes).await?;
        debug!(
            "Stored status snapshot ({} zones)",
            status.summary.total_zones
        );
        Ok(())
    }

    async fn get_last_update(&self) -> io::Result<Option<DateTime<Utc>>> {
        let path = self.connection.path_for(LAST_UPDATE_KEY);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        match DateTime::parse_from_rfc3339(raw.trim()) {
            Ok(at) => Ok(Some(at.with_timezone(&Utc))),
            Err(e) => {
                warn!("Corrupt last-update marker ({}), treating as absent", e);
                Ok(None)
            }
        }
    }

    async fn set_last_update(&self, at: DateTime<Utc>) -> io::Result<()> {
        tokio::fs::write(self.connection.path_for(LAST_UPDATE_KEY), at.to_rfc3339()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_last_update_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FsStatusRepository::new(Arc::new(BlobConnection::new(dir.path()).unwrap()));

        assert!(repo.get_last_update().await.unwrap().is_none());

        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap();
        repo.set_last_update(at).await.unwrap();
        assert_eq!(repo.get_last_update().await.unwrap(), Some(at));
    }

    #[tokio::test]
    async fn test_corrupt_marker_treated_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FsStatusRepository::new(Arc::new(BlobConnection::new(dir.path()).unwrap()));
        std::fs::write(dir.path().join("last_update"), b"not a timestamp").unwrap();
        assert!(repo.get_last_update().await.unwrap().is_none());
    }
}
