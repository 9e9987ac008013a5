use std::fs;

use craft_cost_tracker::{
    app,
    domain::{keys, AppState, ItemPrice},
    util::{
        config::TrackerConfig,
        persistence::{JsonFileStore, KeyValueStore},
    },
    TrackerError,
};
use serde_json::json;
use tempfile::tempdir;

const SNAPSHOT: &str = r#"{
    "version": 1,
    "exportedAt": "2024-05-01T08:00:00Z",
    "currencies": {
        "Personal": [{"itemName": "Iron Bar", "price": 6}],
        "Gold": [{"itemName": "Iron Bar", "price": "7.5"}, {"itemName": "Wheat", "price": null}]
    }
}"#;

fn config_in(dir: &std::path::Path) -> TrackerConfig {
    TrackerConfig {
        data_dir: Some(dir.to_path_buf()),
        game_prices_path: Some(dir.join("game_prices.json")),
        ..TrackerConfig::default()
    }
}

#[test]
fn edits_survive_reopening_the_file_store() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path());

    {
        let mut state = app::open_session(&config).unwrap();
        state.update_price("Copper Ore", 1.25, None).unwrap();
        state.add_new_currency("EUR", "€", "Personal").unwrap();
        state.update_price("Copper Ore", 1.5, Some("EUR")).unwrap();
        state.init_recipe_cost_percentage("Smelt Copper", &["Copper Bar", "Slag"]).unwrap();
        state.update_item_cost_percentage("Smelt Copper", "Copper Bar", 90.0).unwrap();
        state.update_recipe_craft_amount("Smelt Copper", 25).unwrap();
    }

    let state = app::open_session(&config).unwrap();
    let list = state.currency_list();
    assert_eq!(list.price_of("Copper Ore", "Personal"), Some(1.25));
    assert_eq!(list.price_of("Copper Ore", "EUR"), Some(1.5));
    assert_eq!(state.recipe_craft_amount("Smelt Copper"), 25);
    assert_eq!(state.recipe_craft_amount("Smelt Tin"), 100);

    let split = state.recipe_cost_percentage("Smelt Copper", &["Copper Bar", "Slag"]);
    assert_eq!(split.percentage_of("Copper Bar"), Some(90.0));
    assert_eq!(split.percentage_of("Slag"), Some(10.0));
}

#[test]
fn snapshot_is_reconciled_on_open_without_losing_user_prices() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path());
    fs::write(dir.path().join("game_prices.json"), SNAPSHOT).unwrap();

    {
        let mut state = app::open_session(&config).unwrap();
        state.update_price("Leather", 3.0, Some("Personal")).unwrap();
    }

    let state = app::open_session(&config).unwrap();
    let list = state.currency_list();
    assert_eq!(list.price_of("Iron Bar", "Personal"), Some(6.0));
    assert_eq!(list.price_of("Leather", "Personal"), Some(3.0));
    assert_eq!(list.price_of("Iron Bar", "Gold"), Some(7.5));
    assert_eq!(list.selected_currency, "Personal");
    assert_eq!(state.game_prices().len(), 2);

    let summary = app::run(&config).unwrap();
    assert_eq!(summary.currencies.len(), 2);
    assert_eq!(summary.game_currencies, 2);
}

#[test]
fn broken_snapshot_is_skipped() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path());
    fs::write(dir.path().join("game_prices.json"), "{ nope").unwrap();

    let state = app::open_session(&config).unwrap();
    assert_eq!(state.currency_list().currencies.len(), 1);
    assert!(state.game_prices().is_empty());
}

#[test]
fn legacy_document_is_migrated_and_key_removed() {
    let dir = tempdir().unwrap();
    {
        let mut store = JsonFileStore::open_in_dir(dir.path()).unwrap();
        store
            .set(
                keys::LEGACY_PRICES,
                json!([{"itemName": "Iron Ore", "price": 0.5}, {"itemName": "Clay"}]),
            )
            .unwrap();
    }

    let store = JsonFileStore::open_in_dir(dir.path()).unwrap();
    let state = AppState::open(store, &TrackerConfig::default()).unwrap();
    assert_eq!(
        state.prices(),
        &[ItemPrice::new("Iron Ore", Some(0.5)), ItemPrice::new("Clay", None)]
    );

    let store = JsonFileStore::open_in_dir(dir.path()).unwrap();
    assert_eq!(store.get(keys::LEGACY_PRICES).unwrap(), None);
}

#[test]
fn unknown_recipe_error_is_surfaced() {
    let dir = tempdir().unwrap();
    let mut state = app::open_session(&config_in(dir.path())).unwrap();
    let err = state.update_item_cost_percentage("Smelt Gold", "Gold Bar", 10.0).unwrap_err();
    assert!(matches!(err, TrackerError::UnknownRecipe(_)));
    assert_eq!(err.to_string(), "no cost percentages stored for recipe \"Smelt Gold\"");
}

#[test]
fn failed_write_leaves_state_and_store_untouched() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "").unwrap();
    let store = JsonFileStore::open(blocker.join("storage.json")).unwrap();
    let mut state = AppState::open(store, &config_in(dir.path())).unwrap();

    let err = state.update_price("Iron Bar", 5.0, None).unwrap_err();
    assert!(matches!(err, TrackerError::Store(_)));
    assert!(state.prices().is_empty());
    assert_eq!(state.store().get(keys::CURRENCY_LIST).unwrap(), None);
}
