//! Concrete port implementations.

pub mod csv_export_adapter;
pub mod file_config_adapter;
pub mod http_document_adapter;
pub mod oplab_adapter;
pub mod sqlite_store_adapter;
