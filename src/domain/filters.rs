use serde::{Deserialize, Serialize};

/// Free-text item filter plus the "only items with a recipe" toggle, stored
/// together under one key.
///
/// Older documents hold only the filter text as a plain string; those read
/// with the toggle at its default.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredFilter")]
pub struct ItemFilter {
    pub name: String,
    pub with_recipe: bool,
}

impl Default for ItemFilter {
    fn default() -> Self {
        Self {
            name: String::new(),
            with_recipe: default_with_recipe(),
        }
    }
}

fn default_with_recipe() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredFilter {
    Name(String),
    Fields(FilterFields),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FilterFields {
    #[serde(default)]
    name: String,
    #[serde(default = "default_with_recipe")]
    with_recipe: bool,
}

impl From<StoredFilter> for ItemFilter {
    fn from(stored: StoredFilter) -> Self {
        match stored {
            StoredFilter::Name(name) => ItemFilter {
                name,
                ..ItemFilter::default()
            },
            StoredFilter::Fields(fields) => ItemFilter {
                name: fields.name,
                with_recipe: fields.with_recipe,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn partial_document_fills_defaults() {
        let filter: ItemFilter = serde_json::from_value(json!({"name": "bar"})).unwrap();
        assert_eq!(filter, ItemFilter { name: "bar".into(), with_recipe: true });
    }

    #[test]
    fn plain_string_reads_as_name() {
        let filter: ItemFilter = serde_json::from_value(json!("iron")).unwrap();
        assert_eq!(filter, ItemFilter { name: "iron".into(), with_recipe: true });
    }

    #[test]
    fn writes_object_form() {
        let filter = ItemFilter { name: "clay".into(), with_recipe: false };
        assert_eq!(serde_json::to_value(&filter).unwrap(), json!({"name": "clay", "withRecipe": false}));
    }
}
