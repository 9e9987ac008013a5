use thiserror::Error;

use crate::util::persistence::StoreError;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("no cost percentages stored for recipe {0:?}")]
    UnknownRecipe(String),
    #[error("recipe {recipe_key:?} has no product {product_name:?}")]
    UnknownProduct {
        recipe_key: String,
        product_name: String,
    },
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}
