//! Cost split normalization across a recipe's products.

use tracing::debug;

use super::entities::{RecipeCostPercentage, RecipeCostProdPercentage};
use crate::error::TrackerError;

/// Re-derives a recipe's cost split after `product_name` was set to
/// `new_percentage`.
///
/// Walking in list order, every other product keeps its share while there is
/// room under 100 and is clamped to the remainder once there is not (the
/// remainder can go negative when `new_percentage` alone exceeds 100). The
/// last product then absorbs whatever is left so the total lands on 100.
///
/// When the edited product is itself the last entry no closing correction
/// happens, so the total can end up away from 100.
pub fn fix_percentages(
    product_name: &str,
    new_percentage: f64,
    percentages: &[RecipeCostProdPercentage],
) -> Vec<RecipeCostProdPercentage> {
    let last = percentages.len().saturating_sub(1);
    let mut sum = new_percentage;

    percentages
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            if entry.product_name == product_name {
                return RecipeCostProdPercentage::new(entry.product_name.as_str(), new_percentage);
            }

            let mut candidate = entry.percentage;
            if sum + candidate > 100.0 {
                candidate = 100.0 - sum;
            }
            sum += candidate;

            if index == last {
                candidate += 100.0 - sum;
            }
            RecipeCostProdPercentage::new(entry.product_name.as_str(), candidate)
        })
        .collect()
}

/// Default split for a fresh recipe: the first product carries the full cost.
pub fn default_percentages<S: AsRef<str>>(products: &[S]) -> Vec<RecipeCostProdPercentage> {
    products
        .iter()
        .enumerate()
        .map(|(index, product)| {
            let share = if index == 0 { 100.0 } else { 0.0 };
            RecipeCostProdPercentage::new(product.as_ref(), share)
        })
        .collect()
}

pub fn find_recipe<'a>(entries: &'a [RecipeCostPercentage], recipe_key: &str) -> Option<&'a RecipeCostPercentage> {
    entries.iter().find(|entry| entry.recipe_key == recipe_key)
}

/// Adds a default entry for `recipe_key` unless one exists.
pub fn with_initialized_recipe<S: AsRef<str>>(
    entries: &[RecipeCostPercentage],
    recipe_key: &str,
    products: &[S],
) -> Vec<RecipeCostPercentage> {
    let mut next = entries.to_vec();
    if find_recipe(entries, recipe_key).is_none() {
        next.push(RecipeCostPercentage {
            recipe_key: recipe_key.to_string(),
            percentages: default_percentages(products),
        });
    }
    next
}

/// Applies [`fix_percentages`] to the entry for `recipe_key` and returns the
/// new collection.
pub fn with_updated_percentage(
    entries: &[RecipeCostPercentage],
    recipe_key: &str,
    product_name: &str,
    new_percentage: f64,
) -> Result<Vec<RecipeCostPercentage>, TrackerError> {
    let current = find_recipe(entries, recipe_key).ok_or_else(|| TrackerError::UnknownRecipe(recipe_key.to_string()))?;
    if current.percentage_of(product_name).is_none() {
        return Err(TrackerError::UnknownProduct {
            recipe_key: recipe_key.to_string(),
            product_name: product_name.to_string(),
        });
    }

    let percentages = fix_percentages(product_name, new_percentage, &current.percentages);
    debug!(recipe = recipe_key, product = product_name, new_percentage, "normalized cost split");

    Ok(entries
        .iter()
        .map(|entry| {
            if entry.recipe_key == recipe_key {
                RecipeCostPercentage {
                    recipe_key: entry.recipe_key.clone(),
                    percentages: percentages.clone(),
                }
            } else {
                entry.clone()
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn split(values: &[(&str, f64)]) -> Vec<RecipeCostProdPercentage> {
        values
            .iter()
            .map(|(name, pct)| RecipeCostProdPercentage::new(*name, *pct))
            .collect()
    }

    fn values(entries: &[RecipeCostProdPercentage]) -> Vec<f64> {
        entries.iter().map(|entry| entry.percentage).collect()
    }

    #[test]
    fn raising_middle_product_clamps_earlier_and_zeroes_last() {
        let out = fix_percentages("B", 60.0, &split(&[("A", 50.0), ("B", 30.0), ("C", 20.0)]));
        assert_eq!(out, split(&[("A", 40.0), ("B", 60.0), ("C", 0.0)]));
    }

    #[test]
    fn lowering_first_product_pushes_slack_to_last() {
        let out = fix_percentages("A", 10.0, &split(&[("A", 50.0), ("B", 30.0), ("C", 20.0)]));
        assert_eq!(values(&out), vec![10.0, 30.0, 60.0]);
    }

    #[test]
    fn over_allocation_goes_negative_then_closes_on_last() {
        let out = fix_percentages("A", 120.0, &split(&[("A", 50.0), ("B", 30.0), ("C", 20.0)]));
        assert_eq!(values(&out), vec![120.0, -20.0, 0.0]);
        assert_eq!(values(&out).iter().sum::<f64>(), 100.0);
    }

    #[test]
    fn editing_last_product_skips_correction() {
        let out = fix_percentages("B", 10.0, &split(&[("A", 70.0), ("B", 30.0)]));
        assert_eq!(values(&out), vec![70.0, 10.0]);

        let out = fix_percentages("B", 50.0, &split(&[("A", 70.0), ("B", 30.0)]));
        assert_eq!(values(&out), vec![50.0, 50.0]);
    }

    #[test]
    fn last_product_above_100_pushes_earlier_negative() {
        let out = fix_percentages("B", 120.0, &split(&[("A", 70.0), ("B", 30.0)]));
        assert_eq!(values(&out), vec![-20.0, 120.0]);

        let out = fix_percentages("B", 150.0, &split(&[("A", 0.0), ("B", 0.0)]));
        assert_eq!(values(&out), vec![-50.0, 150.0]);
        assert_eq!(values(&out).iter().sum::<f64>(), 100.0);
    }

    #[test]
    fn lone_product_above_100_keeps_total_above_100() {
        let out = fix_percentages("A", 150.0, &split(&[("A", 100.0)]));
        assert_eq!(values(&out), vec![150.0]);
    }

    #[test]
    fn single_product_takes_the_new_value() {
        let out = fix_percentages("A", 100.0, &split(&[("A", 100.0)]));
        assert_eq!(values(&out), vec![100.0]);
    }

    #[test]
    fn empty_list_stays_empty() {
        assert!(fix_percentages("A", 40.0, &[]).is_empty());
    }

    #[test]
    fn default_split_puts_everything_on_first_product() {
        let out = default_percentages(&["Iron Bar", "Slag"]);
        assert_eq!(out, split(&[("Iron Bar", 100.0), ("Slag", 0.0)]));
    }

    #[test]
    fn unknown_recipe_is_an_error() {
        let err = with_updated_percentage(&[], "Smelt Iron", "Iron Bar", 50.0).unwrap_err();
        assert!(matches!(err, TrackerError::UnknownRecipe(key) if key == "Smelt Iron"));
    }

    #[test]
    fn unknown_product_is_an_error() {
        let entries = with_initialized_recipe(&[], "Smelt Iron", &["Iron Bar", "Slag"]);
        let err = with_updated_percentage(&entries, "Smelt Iron", "Gold Bar", 50.0).unwrap_err();
        assert!(matches!(err, TrackerError::UnknownProduct { .. }));
    }

    #[test]
    fn update_touches_only_the_named_recipe() {
        let entries = with_initialized_recipe(&[], "Smelt Iron", &["Iron Bar", "Slag"]);
        let entries = with_initialized_recipe(&entries, "Smelt Copper", &["Copper Bar", "Slag"]);
        let next = with_updated_percentage(&entries, "Smelt Iron", "Iron Bar", 75.0).unwrap();

        assert_eq!(values(&next[0].percentages), vec![75.0, 25.0]);
        assert_eq!(next[1], entries[1]);
    }

    #[test]
    fn initializing_twice_keeps_existing_split() {
        let entries = with_initialized_recipe(&[], "Smelt Iron", &["Iron Bar", "Slag"]);
        let entries = with_updated_percentage(&entries, "Smelt Iron", "Iron Bar", 60.0).unwrap();
        let again = with_initialized_recipe(&entries, "Smelt Iron", &["Iron Bar", "Slag"]);
        assert_eq!(again, entries);
    }

    fn arb_split() -> impl Strategy<Value = Vec<RecipeCostProdPercentage>> {
        prop::collection::vec(0u8..=100, 1..8).prop_map(|raw| {
            raw.into_iter()
                .enumerate()
                .map(|(index, pct)| RecipeCostProdPercentage::new(format!("P{index}"), f64::from(pct)))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn non_last_edit_always_closes_on_100(list in arb_split(), pick in any::<prop::sample::Index>(), new in 0u8..=150) {
            prop_assume!(list.len() >= 2);
            let index = pick.index(list.len() - 1);
            let name = list[index].product_name.clone();
            let out = fix_percentages(&name, f64::from(new), &list);

            prop_assert_eq!(out.len(), list.len());
            prop_assert_eq!(out[index].percentage, f64::from(new));
            prop_assert_eq!(out.iter().map(|entry| entry.percentage).sum::<f64>(), 100.0);
            for (before, after) in list.iter().zip(&out) {
                prop_assert_eq!(&before.product_name, &after.product_name);
            }
        }

        #[test]
        fn repeating_an_edit_changes_nothing(list in arb_split(), pick in any::<prop::sample::Index>(), new in 0u8..=150) {
            let name = list[pick.index(list.len())].product_name.clone();
            let once = fix_percentages(&name, f64::from(new), &list);
            let twice = fix_percentages(&name, f64::from(new), &once);
            prop_assert_eq!(twice, once);
        }
    }
}
