pub mod config;
pub mod logging;
pub mod persisted_field;
pub mod persistence;
pub mod version;
