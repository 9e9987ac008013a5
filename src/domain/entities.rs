use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A user-entered price for one item. `None` means "not set".
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPrice {
    pub item_name: String,
    #[serde(default)]
    pub price: Option<f64>,
}

impl ItemPrice {
    pub fn new(item_name: impl Into<String>, price: Option<f64>) -> Self {
        Self {
            item_name: item_name.into(),
            price,
        }
    }

    /// Price if set and a real number.
    pub fn value(&self) -> Option<f64> {
        self.price.filter(|price| !price.is_nan())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub item_prices: Vec<ItemPrice>,
}

impl Currency {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            item_prices: Vec::new(),
        }
    }

    pub fn with_item_prices(mut self, item_prices: Vec<ItemPrice>) -> Self {
        self.item_prices = item_prices;
        self
    }

    pub fn item_price(&self, item_name: &str) -> Option<&ItemPrice> {
        self.item_prices.iter().find(|entry| entry.item_name == item_name)
    }
}

/// All currencies known to the user plus the active one.
///
/// `selected_currency` is either empty or names exactly one entry of
/// `currencies`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyList {
    #[serde(default)]
    pub selected_currency: String,
    #[serde(default)]
    pub currencies: Vec<Currency>,
}

/// One product's share of a recipe's cost, in percent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeCostProdPercentage {
    pub product_name: String,
    pub percentage: f64,
}

impl RecipeCostProdPercentage {
    pub fn new(product_name: impl Into<String>, percentage: f64) -> Self {
        Self {
            product_name: product_name.into(),
            percentage,
        }
    }
}

/// Cost split for one recipe (or recipe variant). Order matters: edits spill
/// over onto later products first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeCostPercentage {
    pub recipe_key: String,
    pub percentages: Vec<RecipeCostProdPercentage>,
}

impl RecipeCostPercentage {
    pub fn total(&self) -> f64 {
        self.percentages.iter().map(|entry| entry.percentage).sum()
    }

    pub fn percentage_of(&self, product_name: &str) -> Option<f64> {
        self.percentages
            .iter()
            .find(|entry| entry.product_name == product_name)
            .map(|entry| entry.percentage)
    }
}

/// Desired craft quantity per recipe key.
pub type RecipeCraftAmounts = BTreeMap<String, u32>;

/// Chosen variant per recipe name.
pub type SelectedVariants = BTreeMap<String, String>;

/// Reference price published by the game for one item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamePrice {
    pub item_name: String,
    #[serde(default)]
    pub price: Option<f64>,
}

impl GamePrice {
    pub fn new(item_name: impl Into<String>, price: Option<f64>) -> Self {
        Self {
            item_name: item_name.into(),
            price,
        }
    }
}

/// Game reference prices keyed by currency name.
pub type GameCurrencies = BTreeMap<String, Vec<GamePrice>>;
