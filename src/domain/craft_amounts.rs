use super::entities::RecipeCraftAmounts;

/// Craft quantity used for recipes the user never adjusted.
pub const DEFAULT_CRAFT_AMOUNT: u32 = 100;

pub fn craft_amount(amounts: &RecipeCraftAmounts, recipe_key: &str, default: u32) -> u32 {
    amounts.get(recipe_key).copied().unwrap_or(default)
}

/// Stores `amount` for `recipe_key` as given; zero is accepted.
pub fn with_craft_amount(amounts: &RecipeCraftAmounts, recipe_key: &str, amount: u32) -> RecipeCraftAmounts {
    let mut next = amounts.clone();
    next.insert(recipe_key.to_string(), amount);
    next
}
