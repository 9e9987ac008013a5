//! Price ledger, cost split normalization and the session that ties them to
//! storage.

pub mod app_state;
pub mod craft_amounts;
pub mod entities;
pub mod filters;
pub mod ledger;
pub mod percentages;

pub use app_state::{keys, AppState, CurrencySummary, SessionSummary};
pub use craft_amounts::DEFAULT_CRAFT_AMOUNT;
pub use entities::{
    Currency, CurrencyList, GameCurrencies, GamePrice, ItemPrice, RecipeCostPercentage, RecipeCostProdPercentage,
    RecipeCraftAmounts, SelectedVariants,
};
pub use filters::ItemFilter;
pub use percentages::fix_percentages;
