pub mod blob_service;
pub mod connection;
pub mod models;
pub mod repository;
