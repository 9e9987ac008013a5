//! Game reference price snapshots read from disk.
//!
//! The snapshot is produced elsewhere (exported from the game's stores); this
//! module only decodes it into [`GameCurrencies`].

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::{info, warn};

use crate::domain::{GameCurrencies, GamePrice};

const SNAPSHOT_FILENAME: &str = "game_prices.json";

/// Snapshots older than this are reported as stale but still used.
pub const SNAPSHOT_STALE_AFTER: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode snapshot: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq)]
pub struct GamePriceSnapshot {
    pub version: u32,
    /// Export time as written by the producer (RFC 3339).
    pub exported_at: Option<String>,
    pub currencies: GameCurrencies,
}

impl GamePriceSnapshot {
    pub fn exported_at_time(&self) -> Option<OffsetDateTime> {
        self.exported_at
            .as_deref()
            .and_then(|raw| OffsetDateTime::parse(raw, &Rfc3339).ok())
    }

    /// Time since export, `None` when the export time is missing or invalid.
    pub fn age(&self) -> Option<Duration> {
        self.age_at(OffsetDateTime::now_utc())
    }

    fn age_at(&self, now: OffsetDateTime) -> Option<Duration> {
        let exported = self.exported_at_time()?;
        let secs = (now - exported).whole_seconds().max(0) as u64;
        Some(Duration::from_secs(secs))
    }

    pub fn is_stale(&self) -> bool {
        self.age().map(|age| age > SNAPSHOT_STALE_AFTER).unwrap_or(true)
    }

    /// Human-readable age string.
    pub fn age_string(&self) -> String {
        match self.age() {
            Some(age) => format_age(age),
            None => "unknown".to_string(),
        }
    }

    pub fn item_count(&self) -> usize {
        self.currencies.values().map(Vec::len).sum()
    }
}

/// Default location: `<data_local_dir>/craft-cost-tracker/game_prices.json`.
pub fn default_snapshot_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("craft-cost-tracker")
        .join(SNAPSHOT_FILENAME)
}

pub fn load_game_price_snapshot(path: &Path) -> Result<GamePriceSnapshot, SnapshotError> {
    let content = fs::read_to_string(path)?;
    let snapshot = parse_game_price_snapshot(&content)?;
    info!(
        path = %path.display(),
        currencies = snapshot.currencies.len(),
        items = snapshot.item_count(),
        age = %snapshot.age_string(),
        "loaded game price snapshot"
    );
    if snapshot.is_stale() {
        warn!(age = %snapshot.age_string(), "game price snapshot is stale");
    }
    Ok(snapshot)
}

pub fn parse_game_price_snapshot(content: &str) -> Result<GamePriceSnapshot, SnapshotError> {
    let dto: SnapshotDto = serde_json::from_str(content)?;
    Ok(GamePriceSnapshot::from(dto))
}

fn format_age(age: Duration) -> String {
    let secs = age.as_secs();
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86400 {
        format!("{}h", secs / 3600)
    } else {
        format!("{}d", secs / 86400)
    }
}

#[derive(Debug, Deserialize)]
struct SnapshotDto {
    #[serde(default = "default_version", alias = "Version")]
    version: u32,
    #[serde(default, alias = "exportedAt", alias = "ExportedAt")]
    exported_at: Option<String>,
    #[serde(default, alias = "Currencies")]
    currencies: BTreeMap<String, Vec<GamePriceDto>>,
}

fn default_version() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct GamePriceDto {
    #[serde(alias = "itemName", alias = "ItemName")]
    item_name: String,
    #[serde(default, alias = "Price", deserialize_with = "price_from_json")]
    price: Option<f64>,
}

impl From<GamePriceDto> for GamePrice {
    fn from(dto: GamePriceDto) -> Self {
        GamePrice::new(dto.item_name, dto.price.filter(|price| price.is_finite()))
    }
}

impl From<SnapshotDto> for GamePriceSnapshot {
    fn from(dto: SnapshotDto) -> Self {
        Self {
            version: dto.version,
            exported_at: dto.exported_at,
            currencies: dto
                .currencies
                .into_iter()
                .map(|(name, prices)| (name, prices.into_iter().map(GamePrice::from).collect()))
                .collect(),
        }
    }
}

/// Accepts a number, a numeric string, or null. Unparseable strings read as
/// "no price".
fn price_from_json<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct PriceVisitor;

    impl<'de> serde::de::Visitor<'de> for PriceVisitor {
        type Value = Option<f64>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a number, numeric string or null")
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value as f64))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value as f64))
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.trim().parse::<f64>().ok())
        }
    }

    deserializer.deserialize_any(PriceVisitor)
}
