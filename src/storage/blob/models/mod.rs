pub mod status_record;
pub mod zone_record;
