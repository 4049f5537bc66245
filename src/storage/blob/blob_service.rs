use crate::env_config::models::app_setting::AppSettings;
use crate::storage::blob::connection::BlobConnection;
use crate::storage::blob::repository::status_repository::{FsStatusRepository, StatusRepository};
use crate::storage::blob::repository::zone_repository::{FsZoneRepository, ZoneRepository};
use std::io;
use std::sync::Arc;
use tracing::info;

pub struct BlobService {
    pub connection: Arc<BlobConnection>,
    pub repository_zone: Arc<dyn ZoneRepository + Send + Sync>,
    pub repository_status: Arc<dyn StatusRepository + Send + Sync>,
}

impl BlobService {
    pub fn new(settings: &Arc<AppSettings>) -> io::Result<Self> {
        info!("Initializing blob storage service components");

        let connection = Arc::new(BlobConnection::new(&settings.app_env.storage_dir)?);

        let repository_zone = Arc::new(FsZoneRepository::new(connection.clone()));
        let repository_status = Arc::new(FsStatusRepository::new(connection.clone()));

        info!("Blob storage service initialized successfully");

        Ok(Self {
            connection,
            repository_zone,
            repository_status,
        })
    }
}
