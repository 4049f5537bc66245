pub mod status_repository;
pub mod zone_repository;
