use crate::storage::blob::connection::BlobConnection;
use crate::storage::blob::models::zone_record::{ZoneDocument, ZoneMetadata};
use async_trait::async_trait;
use std::io;
use std::sync::Arc;
use tracing::{debug, warn};

/// Valid zone keys are EIC-style codes: ASCII alphanumeric plus '-'.
/// Anything else is refused before it can touch the filesystem.
pub fn is_valid_zone_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= 64
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[async_trait]
pub trait ZoneRepository {
    /// Reads the full published document for a zone
    async fn get_document(&self, zone: &str) -> io::Result<Option<ZoneDocument>>;

    /// Reads only the sidecar metadata for a zone
    async fn get_metadata(&self, zone: &str) -> io::Result<Option<ZoneMetadata>>;

    /// Writes document and metadata for a zone (last writer wins)
    async fn put(&self, document: &ZoneDocument, metadata: &ZoneMetadata) -> io::Result<()>;

    /// Lists metadata of every stored zone, status entries excluded
    async fn list_metadata(&self) -> io::Result<Vec<ZoneMetadata>>;
}

pub struct FsZoneRepository {
    connection: Arc<BlobConnection>,
}

impl FsZoneRepository {
    pub fn new(connection: Arc<BlobConnection>) -> Self {
        Self { connection }
    }

    /// Write to a sibling temp file and rename over the target, so a
    /// crash mid-write never leaves a truncated JSON object behind.
    /// Document and sidecar are still two separate renames; a crash
    /// between them can pair a fresh document with stale metadata.
    async fn write_atomic(&self, key: &str, bytes: Vec<u8>) -> io::Result<()> {
        let path = self.connection.path_for(key);
        let tmp = self.connection.path_for(&format!("{key}.tmp"));
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await
    }
}

#[async_trait]
impl ZoneRepository for FsZoneRepository {
    async fn get_document(&self, zone: &str) -> io::Result<Option<ZoneDocument>> {
        if !is_valid_zone_key(zone) {
            return Ok(None);
        }
        let path = self.connection.path_for(&format!("{zone}.json"));
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes).map_err(io::Error::other)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn get_metadata(&self, zone: &str) -> io::Result<Option<ZoneMetadata>> {
        if !is_valid_zone_key(zone) {
            return Ok(None);
        }
        let path = self.connection.path_for(&format!("{zone}.meta.json"));
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes).map_err(io::Error::other)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn put(&self, document: &ZoneDocument, metadata: &ZoneMetadata) -> io::Result<()> {
        if !is_valid_zone_key(&document.zone) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid zone key: {}", document.zone),
            ));
        }
        let doc_bytes = serde_json::to_vec(document).map_err(io::Error::other)?;
        let meta_bytes = serde_json::to_vec(metadata).map_err(io::Error::other)?;
        self.write_atomic(&format!("{}.json", document.zone), doc_bytes)
            .await?;
        self.write_atomic(&format!("{}.meta.json", document.zone), meta_bytes)
            .await?;
        debug!(
            "Stored zone document for {} ({} points)",
            document.zone, document.points
        );
        Ok(())
    }

    async fn list_metadata(&self) -> io::Result<Vec<ZoneMetadata>> {
        let mut entries = tokio::fs::read_dir(self.connection.root()).await?;
        let mut result = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            let Some(zone) = name.strip_suffix(".meta.json") else {
                continue;
            };
            if !is_valid_zone_key(zone) {
                continue;
            }
            match tokio::fs::read(entry.path()).await {
                Ok(bytes) => match serde_json::from_slice::<ZoneMetadata>(&bytes) {
                    Ok(meta) => result.push(meta),
                    Err(e) => warn!("Skipping undecodable metadata {}: {}", name, e),
                },
                Err(e) => warn!("Skipping unreadable metadata {}: {}", name, e),
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::blob::models::zone_record::{LICENSE_TEXT, PricePoint};
    use chrono::{TimeZone, Utc};

    fn sample(zone: &str) -> (ZoneDocument, ZoneMetadata) {
        let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let data = vec![
            PricePoint { time: t0, price: 42.0 },
            PricePoint { time: t0 + chrono::Duration::hours(1), price: -1.5 },
        ];
        let document = ZoneDocument {
            zone: zone.to_string(),
            name: "Test Zone".to_string(),
            license: LICENSE_TEXT.to_string(),
            updated: t0,
            points: data.len(),
            res: "60m".to_string(),
            data,
        };
        let metadata = ZoneMetadata {
            zone: zone.to_string(),
            name: "Test Zone".to_string(),
            updated: t0,
            count: 2,
            currency: "EUR".to_string(),
            res: 60,
            seq: 3,
            latest: Some(t0 + chrono::Duration::hours(1)),
        };
        (document, metadata)
    }

    #[test]
    fn test_zone_key_validation() {
        assert!(is_valid_zone_key("10YNL----------L"));
        assert!(is_valid_zone_key("10Y1001A1001A82H"));
        assert!(!is_valid_zone_key(""));
        assert!(!is_valid_zone_key("../etc/passwd"));
        assert!(!is_valid_zone_key("status.json"));
    }

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FsZoneRepository::new(Arc::new(BlobConnection::new(dir.path()).unwrap()));

        let (document, metadata) = sample("10YNL----------L");
        repo.put(&document, &metadata).await.unwrap();

        let read = repo.get_document("10YNL----------L").await.unwrap().unwrap();
        assert_eq!(read.zone, "10YNL----------L");
        assert_eq!(read.data.len(), 2);
        assert_eq!(read.data[1].price, -1.5);

        let meta = repo.get_metadata("10YNL----------L").await.unwrap().unwrap();
        assert_eq!(meta.seq, 3);
        assert_eq!(meta.res, 60);
    }

    #[tokio::test]
    async fn test_put_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FsZoneRepository::new(Arc::new(BlobConnection::new(dir.path()).unwrap()));

        let (document, metadata) = sample("10YNL----------L");
        repo.put(&document, &metadata).await.unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert!(names.iter().all(|n| !n.ends_with(".tmp")));
        assert_eq!(names.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_zone_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FsZoneRepository::new(Arc::new(BlobConnection::new(dir.path()).unwrap()));
        assert!(repo.get_document("10YBE----------2").await.unwrap().is_none());
        assert!(repo.get_metadata("10YBE----------2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_skips_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FsZoneRepository::new(Arc::new(BlobConnection::new(dir.path()).unwrap()));

        let (doc_a, meta_a) = sample("10YNL----------L");
        let (doc_b, meta_b) = sample("10YBE----------2");
        repo.put(&doc_a, &meta_a).await.unwrap();
        repo.put(&doc_b, &meta_b).await.unwrap();

        // Status snapshot and marker must not show up as zones
        std::fs::write(dir.path().join("status.json"), b"{}").unwrap();
        std::fs::write(dir.path().join("last_update"), b"2026-03-01T00:00:00Z").unwrap();

        let listed = repo.list_metadata().await.unwrap();
        assert_eq!(listed.len(), 2);
    }
}
