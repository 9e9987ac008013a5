//! State core for a crafting price tracker.
//!
//! Holds per-currency item prices, per-recipe cost splits and craft amounts,
//! and keeps them consistent under incremental edits. Storage is injected
//! through [`util::persistence::KeyValueStore`].

pub mod app;
pub mod domain;
pub mod error;
pub mod infra;
pub mod util;

pub use domain::AppState;
pub use error::TrackerError;
