//! Per-currency price bookkeeping.
//!
//! Every operation borrows the current [`CurrencyList`] and returns a new one.
//! The input is never touched, so callers can compare old and new values to
//! detect changes.

use tracing::debug;

use super::entities::{Currency, CurrencyList, GameCurrencies, ItemPrice};

impl CurrencyList {
    pub fn currency(&self, name: &str) -> Option<&Currency> {
        self.currencies.iter().find(|currency| currency.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.currency(name).is_some()
    }

    pub fn selected(&self) -> Option<&Currency> {
        if self.selected_currency.is_empty() {
            return None;
        }
        self.currency(&self.selected_currency)
    }

    /// Item prices of the selected currency, empty when nothing is selected.
    pub fn prices(&self) -> &[ItemPrice] {
        self.selected()
            .map(|currency| currency.item_prices.as_slice())
            .unwrap_or(&[])
    }

    pub fn currency_symbol(&self) -> &str {
        self.selected()
            .map(|currency| currency.symbol.as_str())
            .unwrap_or("")
    }

    pub fn price_of(&self, item_name: &str, currency_name: &str) -> Option<f64> {
        self.currency(currency_name)?
            .item_price(item_name)
            .and_then(ItemPrice::value)
    }

    pub fn with_selected_currency(&self, name: &str) -> CurrencyList {
        if !self.contains(name) {
            debug!(currency = name, "ignoring selection of unknown currency");
            return self.clone();
        }
        CurrencyList {
            selected_currency: name.to_string(),
            currencies: self.currencies.clone(),
        }
    }

    /// Appends `name`, seeding its prices from `copy_from` when that currency
    /// exists. Duplicate names leave the list as is.
    pub fn with_new_currency(&self, name: &str, symbol: &str, copy_from: &str) -> CurrencyList {
        if self.contains(name) {
            debug!(currency = name, "currency already exists");
            return self.clone();
        }
        let item_prices = self
            .currency(copy_from)
            .map(|source| source.item_prices.clone())
            .unwrap_or_default();

        let mut currencies = self.currencies.clone();
        currencies.push(Currency::new(name, symbol).with_item_prices(item_prices));
        CurrencyList {
            selected_currency: self.selected_currency.clone(),
            currencies,
        }
    }

    /// Drops `name`. Deleting the selected currency clears the selection.
    pub fn without_currency(&self, name: &str) -> CurrencyList {
        let selected_currency = if self.selected_currency == name {
            String::new()
        } else {
            self.selected_currency.clone()
        };
        CurrencyList {
            selected_currency,
            currencies: self
                .currencies
                .iter()
                .filter(|currency| currency.name != name)
                .cloned()
                .collect(),
        }
    }

    pub fn with_reset_currency(&self, name: &str) -> CurrencyList {
        self.map_currency(name, |currency| Currency {
            item_prices: Vec::new(),
            ..currency.clone()
        })
    }

    /// Sets the price of `item_name` in `currency_name`, or in the selected
    /// currency when none is given. Non-finite prices are rejected and the
    /// list comes back unchanged.
    pub fn with_price(&self, item_name: &str, new_price: f64, currency_name: Option<&str>) -> CurrencyList {
        if !new_price.is_finite() {
            debug!(item = item_name, price = new_price, "rejecting non-finite price");
            return self.clone();
        }
        let target = currency_name.unwrap_or(self.selected_currency.as_str());
        self.map_currency(target, |currency| Currency {
            item_prices: upsert_price(&currency.item_prices, item_name, Some(new_price)),
            ..currency.clone()
        })
    }

    /// Folds game reference prices into the list.
    ///
    /// Currencies missing locally are appended with `symbol_for_new`. Upstream
    /// prices replace local ones for the same item, upstream items without a
    /// price are only added when missing, and local-only items are kept.
    /// Applying the same payload twice yields the same list.
    pub fn with_game_currencies(&self, game: &GameCurrencies, symbol_for_new: &str) -> CurrencyList {
        let mut currencies = self.currencies.clone();
        for (name, game_prices) in game {
            let index = match currencies.iter().position(|currency| &currency.name == name) {
                Some(index) => index,
                None => {
                    currencies.push(Currency::new(name.as_str(), symbol_for_new));
                    currencies.len() - 1
                }
            };

            let mut item_prices = currencies[index].item_prices.clone();
            for game_price in game_prices {
                match game_price.price.filter(|price| price.is_finite()) {
                    Some(price) => {
                        item_prices = upsert_price(&item_prices, &game_price.item_name, Some(price));
                    }
                    None => {
                        if !item_prices.iter().any(|entry| entry.item_name == game_price.item_name) {
                            item_prices.push(ItemPrice::new(game_price.item_name.as_str(), None));
                        }
                    }
                }
            }
            currencies[index].item_prices = item_prices;
        }
        CurrencyList {
            selected_currency: self.selected_currency.clone(),
            currencies,
        }
    }

    /// Moves a flat legacy price list into `default_name`, creating and
    /// selecting that currency if needed. Existing entries for the same item
    /// keep their current price.
    pub fn with_legacy_prices(&self, legacy: &[ItemPrice], default_name: &str, default_symbol: &str) -> CurrencyList {
        let mut next = if self.contains(default_name) {
            self.clone()
        } else {
            self.with_new_currency(default_name, default_symbol, "")
        };
        if next.selected_currency.is_empty() {
            next.selected_currency = default_name.to_string();
        }
        next.map_currency(default_name, |currency| {
            let mut item_prices = currency.item_prices.clone();
            for entry in legacy {
                if !item_prices.iter().any(|existing| existing.item_name == entry.item_name) {
                    item_prices.push(entry.clone());
                }
            }
            Currency {
                item_prices,
                ..currency.clone()
            }
        })
    }

    fn map_currency(&self, name: &str, f: impl Fn(&Currency) -> Currency) -> CurrencyList {
        CurrencyList {
            selected_currency: self.selected_currency.clone(),
            currencies: self
                .currencies
                .iter()
                .map(|currency| if currency.name == name { f(currency) } else { currency.clone() })
                .collect(),
        }
    }
}

fn upsert_price(item_prices: &[ItemPrice], item_name: &str, price: Option<f64>) -> Vec<ItemPrice> {
    let mut next = item_prices.to_vec();
    match next.iter_mut().find(|entry| entry.item_name == item_name) {
        Some(entry) => entry.price = price,
        None => next.push(ItemPrice::new(item_name, price)),
    }
    next
}
