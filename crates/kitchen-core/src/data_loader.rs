//! Data-driven catalog loading from JSON.
//!
//! Feature-gated behind `data-loader`. Foods reference each other by name;
//! all foods are registered first, then results, combinations and toppings
//! are resolved, so declaration order in the file does not matter.

use crate::catalog::{CatalogBuilder, CatalogError, FoodKind, FoodTags, PrepMethod, PrepSpeed};
use crate::id::FoodId;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("unknown food reference: {0}")]
    UnknownFoodRef(String),
}

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// Top-level catalog document.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogData {
    #[serde(default)]
    pub foods: Vec<FoodData>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodKindData {
    #[default]
    Food,
    Drink,
    Pizza,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FoodData {
    pub name: String,
    #[serde(default)]
    pub kind: FoodKindData,
    /// Required toppings, for pizzas used as order targets.
    #[serde(default)]
    pub toppings: Vec<String>,
    #[serde(default)]
    pub method: PrepMethod,
    #[serde(default)]
    pub speed: PrepSpeed,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub combinations: Vec<CombinationData>,
    #[serde(default)]
    pub tags: FoodTags,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CombinationData {
    pub partner: String,
    pub result: String,
}

// ---------------------------------------------------------------------------
// Loading functions
// ---------------------------------------------------------------------------

pub fn load_catalog_json(json: &str) -> Result<CatalogBuilder, DataLoadError> {
    let data: CatalogData = serde_json::from_str(json)?;
    build_catalog(&data)
}

pub fn load_catalog_json_bytes(bytes: &[u8]) -> Result<CatalogBuilder, DataLoadError> {
    let data: CatalogData = serde_json::from_slice(bytes)?;
    build_catalog(&data)
}

/// Build a catalog from parsed data, resolving every name.
pub fn build_catalog(data: &CatalogData) -> Result<CatalogBuilder, DataLoadError> {
    build_foods(&data.foods)
}

/// Register and wire up a list of food definitions.
pub fn build_foods(foods: &[FoodData]) -> Result<CatalogBuilder, DataLoadError> {
    let mut builder = CatalogBuilder::new();

    // Pass 1: register every food so references can point forward.
    let ids: Vec<FoodId> = foods
        .iter()
        .map(|food| {
            let kind = match food.kind {
                FoodKindData::Food => FoodKind::Food,
                FoodKindData::Drink => FoodKind::Drink,
                FoodKindData::Pizza => FoodKind::plain_pizza(),
            };
            builder.register_food(&food.name, kind)
        })
        .collect();

    // Pass 2: resolve references.
    for (food, &id) in foods.iter().zip(&ids) {
        let resolve = |name: &str| {
            builder
                .food_id(name)
                .ok_or_else(|| DataLoadError::UnknownFoodRef(name.to_string()))
        };

        let result = food.result.as_deref().map(resolve).transpose()?;
        let toppings = food
            .toppings
            .iter()
            .map(|t| resolve(t))
            .collect::<Result<Vec<_>, _>>()?;
        let combinations = food
            .combinations
            .iter()
            .map(|c| Ok((resolve(&c.partner)?, resolve(&c.result)?)))
            .collect::<Result<Vec<_>, DataLoadError>>()?;

        builder.set_preparation(id, food.method, food.speed, result)?;
        builder.set_tags(id, food.tags)?;
        for (partner, result) in combinations {
            builder.add_combination(id, partner, result)?;
        }
        if !toppings.is_empty() {
            if food.kind != FoodKindData::Pizza {
                log::warn!("{}: toppings on a non-pizza food are ignored", food.name);
                continue;
            }
            builder.mutate_food(&food.name, |def| def.kind = FoodKind::Pizza { toppings })?;
        }
    }

    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CombineSide;

    const MENU: &str = r#"{
        "foods": [
            { "name": "patty_raw", "method": "fry", "result": "patty_cooked", "tags": { "raw": true } },
            { "name": "patty_cooked", "method": "fry", "result": "patty_burnt" },
            { "name": "patty_burnt", "tags": { "burnt": true } },
            { "name": "bun", "combinations": [ { "partner": "patty_cooked", "result": "burger" } ] },
            { "name": "burger" },
            { "name": "soda", "kind": "drink" },
            { "name": "cheese" },
            { "name": "pizza_cheese", "kind": "pizza", "toppings": ["cheese"] }
        ]
    }"#;

    #[test]
    fn load_menu_with_forward_references() {
        let catalog = load_catalog_json(MENU).unwrap().build().unwrap();
        assert_eq!(catalog.len(), 8);

        let raw = catalog.food_id("patty_raw").unwrap();
        let def = catalog.get(raw).unwrap();
        assert_eq!(def.method, PrepMethod::Fry);
        assert_eq!(def.result, catalog.food_id("patty_cooked"));
        assert!(def.tags.raw);

        let bun = catalog.food_id("bun").unwrap();
        let patty = catalog.food_id("patty_cooked").unwrap();
        let m = catalog.resolve_combination(patty, bun).unwrap();
        assert_eq!(m.base, CombineSide::Second);
        assert_eq!(Some(m.result), catalog.food_id("burger"));

        let soda = catalog.food_id("soda").unwrap();
        assert!(catalog.get(soda).unwrap().kind.is_drink());

        let pizza = catalog.food_id("pizza_cheese").unwrap();
        let cheese = catalog.food_id("cheese").unwrap();
        assert_eq!(catalog.get(pizza).unwrap().kind.toppings(), &[cheese]);
    }

    #[test]
    fn bytes_entry_point() {
        let builder = load_catalog_json_bytes(MENU.as_bytes()).unwrap();
        assert!(builder.food_id("burger").is_some());
    }

    #[test]
    fn unknown_reference_is_an_error() {
        let json = r#"{ "foods": [ { "name": "a", "result": "ghost" } ] }"#;
        match load_catalog_json(json) {
            Err(DataLoadError::UnknownFoodRef(name)) => assert_eq!(name, "ghost"),
            other => panic!("expected UnknownFoodRef, got {other:?}"),
        }
    }

    #[test]
    fn bad_json_is_a_parse_error() {
        assert!(matches!(
            load_catalog_json("{ not json"),
            Err(DataLoadError::JsonParse(_))
        ));
    }

    #[test]
    fn empty_document_fails_at_build() {
        let builder = load_catalog_json("{}").unwrap();
        assert!(matches!(builder.build(), Err(CatalogError::Empty)));
    }
}
