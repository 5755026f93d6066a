//! Serde data file structs for kitchen levels.
//!
//! A level bundles the food catalog, the kitchen configuration and the
//! station and belt layout. Foods are referenced by name everywhere; the
//! loader resolves names into ids.

use kitchen_core::catalog::PrepMethod;
use kitchen_core::config::KitchenConfig;
use kitchen_core::conveyor::BeltDirection;
use kitchen_core::data_loader::FoodData;
use serde::Deserialize;

/// A complete level file.
#[derive(Debug, Clone, Deserialize)]
pub struct LevelData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub config: KitchenConfig,
    pub foods: Vec<FoodData>,
    #[serde(default)]
    pub stations: Vec<StationData>,
    #[serde(default)]
    pub belts: Vec<BeltDirection>,
}

/// A station in the level layout.
#[derive(Debug, Clone, Deserialize)]
pub struct StationData {
    /// Optional handle for looking the station up after loading.
    #[serde(default)]
    pub label: Option<String>,
    pub kind: StationKindData,
    /// Item the station starts with.
    #[serde(default)]
    pub item: Option<ItemData>,
}

/// Station behaviour with food names still unresolved.
#[derive(Debug, Clone, Deserialize)]
pub enum StationKindData {
    Counter,
    AutomaticPrep {
        method: PrepMethod,
        rate: f64,
    },
    ManualPrep {
        method: PrepMethod,
        rate: f64,
    },
    Spawner {
        #[serde(default)]
        food: Option<String>,
    },
    Garbage {
        #[serde(default)]
        destroy_plates: bool,
    },
}

/// A kitchen item by name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemData {
    #[serde(default)]
    pub food: Option<String>,
    #[serde(default)]
    pub plate: bool,
    #[serde(default)]
    pub toppings: Vec<String>,
}
