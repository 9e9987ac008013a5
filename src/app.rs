use std::path::PathBuf;

use thiserror::Error;
use tracing::{info, warn};

use crate::{
    domain::{AppState, SessionSummary},
    error::TrackerError,
    infra::game_prices::{default_snapshot_path, load_game_price_snapshot},
    util::{
        config::TrackerConfig,
        persistence::{JsonFileStore, KeyValueStore, StoreError},
    },
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to open storage: {0}")]
    Storage(#[from] StoreError),
    #[error(transparent)]
    Tracker(#[from] TrackerError),
}

/// Opens the configured store and session, then reconciles game prices.
pub fn open_session(config: &TrackerConfig) -> Result<AppState<JsonFileStore>, AppError> {
    let store = match &config.data_dir {
        Some(dir) => JsonFileStore::open_in_dir(dir)?,
        None => JsonFileStore::open_default()?,
    };
    info!(path = %store.path().display(), "using storage");

    let mut state = AppState::open(store, config)?;
    reconcile_game_prices(&mut state, config)?;
    Ok(state)
}

/// Loads the game price snapshot, if any, into `state`. A missing or broken
/// snapshot leaves the session as it was.
pub fn reconcile_game_prices<S: KeyValueStore>(
    state: &mut AppState<S>,
    config: &TrackerConfig,
) -> Result<(), TrackerError> {
    let path = snapshot_path(config);
    if !path.exists() {
        info!(path = %path.display(), "no game price snapshot found");
        return Ok(());
    }
    match load_game_price_snapshot(&path) {
        Ok(snapshot) => state.update_with_game_currencies(snapshot.currencies),
        Err(err) => {
            warn!(path = %path.display(), %err, "skipping game price snapshot");
            Ok(())
        }
    }
}

fn snapshot_path(config: &TrackerConfig) -> PathBuf {
    config
        .game_prices_path
        .clone()
        .unwrap_or_else(default_snapshot_path)
}

pub fn run(config: &TrackerConfig) -> Result<SessionSummary, AppError> {
    let state = open_session(config)?;
    Ok(state.summary())
}
