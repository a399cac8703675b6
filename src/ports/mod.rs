//! Port traits at the seams between domain logic and the outside world.

pub mod config_port;
pub mod store_port;
pub mod document_port;
pub mod market_data_port;
