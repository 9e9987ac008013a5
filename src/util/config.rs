use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::craft_amounts::DEFAULT_CRAFT_AMOUNT;

pub const ENV_DATA_DIR: &str = "CRAFT_TRACKER_DATA_DIR";
pub const ENV_GAME_PRICES: &str = "CRAFT_TRACKER_GAME_PRICES";
pub const ENV_DEFAULT_CRAFT_AMOUNT: &str = "CRAFT_TRACKER_DEFAULT_CRAFT_AMOUNT";
pub const ENV_LOG: &str = "CRAFT_TRACKER_LOG";

/// Session-wide settings chosen once by the integrator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Directory holding `storage.json`. `None` uses the platform config dir.
    pub data_dir: Option<PathBuf>,
    /// Game price snapshot to reconcile on startup.
    pub game_prices_path: Option<PathBuf>,
    pub default_craft_amount: u32,
    /// Currency that receives legacy prices and is created for new users.
    pub default_currency_name: String,
    pub default_currency_symbol: String,
    /// Symbol given to currencies first seen in game price data.
    pub game_currency_symbol: String,
    pub log_filter: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            game_prices_path: None,
            default_craft_amount: DEFAULT_CRAFT_AMOUNT,
            default_currency_name: "Personal".to_string(),
            default_currency_symbol: "$".to_string(),
            game_currency_symbol: String::new(),
            log_filter: "info".to_string(),
        }
    }
}

impl TrackerConfig {
    /// Defaults overlaid with `CRAFT_TRACKER_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|value| !value.is_empty()) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(path) = lookup(ENV_GAME_PRICES).filter(|value| !value.is_empty()) {
            self.game_prices_path = Some(PathBuf::from(path));
        }
        if let Some(raw) = lookup(ENV_DEFAULT_CRAFT_AMOUNT) {
            match raw.trim().parse::<u32>() {
                Ok(amount) => self.default_craft_amount = amount,
                Err(err) => warn!(value = %raw, %err, "ignoring invalid default craft amount"),
            }
        }
        if let Some(filter) = lookup(ENV_LOG).or_else(|| lookup("RUST_LOG")) {
            self.log_filter = filter;
        }
        self
    }
}
