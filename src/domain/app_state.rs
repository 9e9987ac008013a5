use serde::Serialize;
use tracing::{debug, info, warn};

use super::{
    craft_amounts::{craft_amount, with_craft_amount},
    entities::{
        Currency, CurrencyList, GameCurrencies, ItemPrice, RecipeCostPercentage, RecipeCraftAmounts,
        SelectedVariants,
    },
    filters::ItemFilter,
    percentages::{default_percentages, find_recipe, with_initialized_recipe, with_updated_percentage},
};
use crate::{
    error::TrackerError,
    util::{
        config::TrackerConfig,
        persisted_field::PersistedField,
        persistence::KeyValueStore,
    },
};

/// Storage keys. `filter` also accepts the older plain-string form.
pub mod keys {
    pub const CURRENCY_LIST: &str = "currencyList";
    pub const SELECTED_VARIANT: &str = "selectedVariant";
    pub const FILTER_PROFESSIONS: &str = "filterProfessions";
    pub const FILTER_CRAFT_STATIONS: &str = "filterCraftStations";
    pub const FILTER: &str = "filter";
    pub const COST_PERCENTAGES: &str = "costPercentages";
    pub const RECIPE_CRAFT_AMOUNT: &str = "RecipeCraftAmmount";
    /// Flat price list from before currencies existed. Read once, then removed.
    pub const LEGACY_PRICES: &str = "prices";
}

/// Per-session state manager.
///
/// Owns the injected store and one persisted field per entity. Every mutation
/// builds a new value from the current one and writes it through before it
/// becomes visible. Edits are serialized by `&mut self`.
pub struct AppState<S: KeyValueStore> {
    store: S,
    default_craft_amount: u32,
    game_currency_symbol: String,
    currency_list: PersistedField<CurrencyList>,
    cost_percentages: PersistedField<Vec<RecipeCostPercentage>>,
    craft_amounts: PersistedField<RecipeCraftAmounts>,
    selected_variants: PersistedField<SelectedVariants>,
    filter_professions: PersistedField<Vec<String>>,
    filter_craft_stations: PersistedField<Vec<String>>,
    filter: PersistedField<ItemFilter>,
    game_prices: GameCurrencies,
}

impl<S: KeyValueStore> AppState<S> {
    /// Loads every field from `store` and folds in legacy prices if present.
    pub fn open(store: S, config: &TrackerConfig) -> Result<Self, TrackerError> {
        let default_list = || CurrencyList {
            selected_currency: config.default_currency_name.clone(),
            currencies: vec![Currency::new(
                config.default_currency_name.as_str(),
                config.default_currency_symbol.as_str(),
            )],
        };

        let mut state = Self {
            currency_list: PersistedField::load(&store, keys::CURRENCY_LIST, default_list)?,
            cost_percentages: PersistedField::load(&store, keys::COST_PERCENTAGES, Vec::new)?,
            craft_amounts: PersistedField::load(&store, keys::RECIPE_CRAFT_AMOUNT, RecipeCraftAmounts::new)?,
            selected_variants: PersistedField::load(&store, keys::SELECTED_VARIANT, SelectedVariants::new)?,
            filter_professions: PersistedField::load(&store, keys::FILTER_PROFESSIONS, Vec::new)?,
            filter_craft_stations: PersistedField::load(&store, keys::FILTER_CRAFT_STATIONS, Vec::new)?,
            filter: PersistedField::load(&store, keys::FILTER, ItemFilter::default)?,
            game_prices: GameCurrencies::new(),
            default_craft_amount: config.default_craft_amount,
            game_currency_symbol: config.game_currency_symbol.clone(),
            store,
        };
        state.migrate_legacy_prices(config)?;

        info!(
            currencies = state.currency_list.get().currencies.len(),
            selected = %state.currency_list.get().selected_currency,
            recipes = state.cost_percentages.get().len(),
            "session opened"
        );
        Ok(state)
    }

    fn migrate_legacy_prices(&mut self, config: &TrackerConfig) -> Result<(), TrackerError> {
        let Some(raw) = self.store.get(keys::LEGACY_PRICES)? else {
            return Ok(());
        };
        match serde_json::from_value::<Vec<ItemPrice>>(raw) {
            Ok(legacy) => {
                let next = self.currency_list.get().with_legacy_prices(
                    &legacy,
                    &config.default_currency_name,
                    &config.default_currency_symbol,
                );
                self.currency_list.set(&mut self.store, next)?;
                info!(items = legacy.len(), currency = %config.default_currency_name, "migrated legacy prices");
            }
            Err(err) => warn!(%err, "dropping unreadable legacy prices"),
        }
        self.store.remove(keys::LEGACY_PRICES)?;
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    // ---- currencies ---------------------------------------------------------

    pub fn currency_list(&self) -> &CurrencyList {
        self.currency_list.get()
    }

    /// Prices of the selected currency.
    pub fn prices(&self) -> &[ItemPrice] {
        self.currency_list.get().prices()
    }

    pub fn currency_symbol(&self) -> &str {
        self.currency_list.get().currency_symbol()
    }

    /// Game reference prices from the last reconciliation of this session.
    pub fn game_prices(&self) -> &GameCurrencies {
        &self.game_prices
    }

    pub fn set_selected_currency(&mut self, name: &str) -> Result<(), TrackerError> {
        let next = self.currency_list.get().with_selected_currency(name);
        self.replace_currency_list(next)
    }

    pub fn add_new_currency(&mut self, name: &str, symbol: &str, copy_from: &str) -> Result<(), TrackerError> {
        let next = self.currency_list.get().with_new_currency(name, symbol, copy_from);
        self.replace_currency_list(next)
    }

    pub fn delete_currency(&mut self, name: &str) -> Result<(), TrackerError> {
        let next = self.currency_list.get().without_currency(name);
        self.replace_currency_list(next)
    }

    pub fn reset_currency(&mut self, name: &str) -> Result<(), TrackerError> {
        let next = self.currency_list.get().with_reset_currency(name);
        self.replace_currency_list(next)
    }

    /// Sets a price in `currency_name`, or in the selected currency.
    /// Non-finite prices are ignored.
    pub fn update_price(&mut self, item_name: &str, new_price: f64, currency_name: Option<&str>) -> Result<(), TrackerError> {
        let next = self.currency_list.get().with_price(item_name, new_price, currency_name);
        self.replace_currency_list(next)
    }

    /// Merges fetched game currencies into the ledger. Safe to call again with
    /// the same payload.
    pub fn update_with_game_currencies(&mut self, game: GameCurrencies) -> Result<(), TrackerError> {
        let next = self
            .currency_list
            .get()
            .with_game_currencies(&game, &self.game_currency_symbol);
        self.replace_currency_list(next)?;
        info!(currencies = game.len(), "reconciled game currencies");
        self.game_prices = game;
        Ok(())
    }

    fn replace_currency_list(&mut self, next: CurrencyList) -> Result<(), TrackerError> {
        if &next == self.currency_list.get() {
            debug!("currency list unchanged");
            return Ok(());
        }
        self.currency_list.set(&mut self.store, next)?;
        Ok(())
    }

    // ---- cost percentages -----------------------------------------------------

    pub fn item_cost_percentages(&self) -> &[RecipeCostPercentage] {
        self.cost_percentages.get()
    }

    /// Stored split for `recipe_key`, or the default split over `products`
    /// when nothing was stored yet. Does not write.
    pub fn recipe_cost_percentage<P: AsRef<str>>(&self, recipe_key: &str, products: &[P]) -> RecipeCostPercentage {
        find_recipe(self.cost_percentages.get(), recipe_key)
            .cloned()
            .unwrap_or_else(|| RecipeCostPercentage {
                recipe_key: recipe_key.to_string(),
                percentages: default_percentages(products),
            })
    }

    /// Stores the default split for `recipe_key` unless one exists.
    pub fn init_recipe_cost_percentage<P: AsRef<str>>(
        &mut self,
        recipe_key: &str,
        products: &[P],
    ) -> Result<RecipeCostPercentage, TrackerError> {
        if find_recipe(self.cost_percentages.get(), recipe_key).is_none() {
            let next = with_initialized_recipe(self.cost_percentages.get(), recipe_key, products);
            self.cost_percentages.set(&mut self.store, next)?;
            debug!(recipe = recipe_key, "initialized cost split");
        }
        Ok(self.recipe_cost_percentage(recipe_key, products))
    }

    /// Edits one product's share and re-normalizes the recipe's split.
    pub fn update_item_cost_percentage(
        &mut self,
        recipe_key: &str,
        product_name: &str,
        new_percentage: f64,
    ) -> Result<(), TrackerError> {
        let next = with_updated_percentage(self.cost_percentages.get(), recipe_key, product_name, new_percentage)?;
        self.cost_percentages.set(&mut self.store, next)?;
        Ok(())
    }

    // ---- craft amounts ----------------------------------------------------------

    pub fn recipe_craft_amount(&self, recipe_key: &str) -> u32 {
        craft_amount(self.craft_amounts.get(), recipe_key, self.default_craft_amount)
    }

    pub fn update_recipe_craft_amount(&mut self, recipe_key: &str, amount: u32) -> Result<(), TrackerError> {
        self.craft_amounts
            .update(&mut self.store, |amounts| with_craft_amount(amounts, recipe_key, amount))?;
        Ok(())
    }

    // ---- variants and filters -----------------------------------------------------

    pub fn selected_variants(&self) -> &SelectedVariants {
        self.selected_variants.get()
    }

    pub fn set_selected_variants(&mut self, variants: SelectedVariants) -> Result<(), TrackerError> {
        self.selected_variants.set(&mut self.store, variants)?;
        Ok(())
    }

    pub fn set_selected_variant(&mut self, recipe_name: &str, variant_key: &str) -> Result<(), TrackerError> {
        self.selected_variants.update(&mut self.store, |variants| {
            let mut next = variants.clone();
            next.insert(recipe_name.to_string(), variant_key.to_string());
            next
        })?;
        Ok(())
    }

    pub fn filter_professions(&self) -> &[String] {
        self.filter_professions.get()
    }

    pub fn set_filter_professions(&mut self, professions: Vec<String>) -> Result<(), TrackerError> {
        self.filter_professions.set(&mut self.store, professions)?;
        Ok(())
    }

    pub fn filter_craft_stations(&self) -> &[String] {
        self.filter_craft_stations.get()
    }

    pub fn set_filter_craft_stations(&mut self, stations: Vec<String>) -> Result<(), TrackerError> {
        self.filter_craft_stations.set(&mut self.store, stations)?;
        Ok(())
    }

    pub fn filter_name(&self) -> &str {
        &self.filter.get().name
    }

    pub fn set_filter_name(&mut self, name: &str) -> Result<(), TrackerError> {
        self.filter.update(&mut self.store, |filter| ItemFilter {
            name: name.to_string(),
            ..filter.clone()
        })?;
        Ok(())
    }

    pub fn filter_with_recipe(&self) -> bool {
        self.filter.get().with_recipe
    }

    pub fn set_filter_with_recipe(&mut self, with_recipe: bool) -> Result<(), TrackerError> {
        self.filter.update(&mut self.store, |filter| ItemFilter {
            with_recipe,
            ..filter.clone()
        })?;
        Ok(())
    }

    pub fn summary(&self) -> SessionSummary {
        let list = self.currency_list.get();
        SessionSummary {
            selected_currency: list.selected_currency.clone(),
            currency_symbol: list.currency_symbol().to_string(),
            currencies: list
                .currencies
                .iter()
                .map(|currency| CurrencySummary {
                    name: currency.name.clone(),
                    symbol: currency.symbol.clone(),
                    items: currency.item_prices.len(),
                    priced_items: currency.item_prices.iter().filter(|entry| entry.value().is_some()).count(),
                })
                .collect(),
            recipes_with_cost_split: self.cost_percentages.get().len(),
            recipes_with_craft_amount: self.craft_amounts.get().len(),
            game_currencies: self.game_prices.len(),
        }
    }
}

/// Serializable overview of a session.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub selected_currency: String,
    pub currency_symbol: String,
    pub currencies: Vec<CurrencySummary>,
    pub recipes_with_cost_split: usize,
    pub recipes_with_craft_amount: usize,
    pub game_currencies: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencySummary {
    pub name: String,
    pub symbol: String,
    pub items: usize,
    pub priced_items: usize,
}
