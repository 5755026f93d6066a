//! Immutable food catalog: what every food is, how it is prepared, and what
//! it combines into.
//!
//! The catalog is assembled with a [`CatalogBuilder`] (register foods first,
//! then wire up preparation results and combinations by [`FoodId`]) and
//! frozen with [`CatalogBuilder::build`], which rejects empty catalogs,
//! duplicate identifiers and dangling references.

use crate::id::FoodId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Food classification
// ---------------------------------------------------------------------------

/// How a food is transformed at a station.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrepMethod {
    #[default]
    None,
    Wash,
    Chop,
    Fry,
    DeepFry,
    Combine,
    Soda,
    Coffee,
    Grate,
    Oven,
}

/// Whether preparation takes time or happens on placement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrepSpeed {
    #[default]
    Normal,
    Instant,
}

/// Food type. Pizzas carry a topping list: on a catalog entry used as an
/// order target it is the set of toppings the customer wants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FoodKind {
    Food,
    Drink,
    Pizza { toppings: Vec<FoodId> },
}

impl FoodKind {
    /// A pizza with no required toppings.
    pub fn plain_pizza() -> Self {
        FoodKind::Pizza {
            toppings: Vec::new(),
        }
    }

    pub fn is_pizza(&self) -> bool {
        matches!(self, FoodKind::Pizza { .. })
    }

    pub fn is_drink(&self) -> bool {
        matches!(self, FoodKind::Drink)
    }

    /// Required toppings for pizza entries, empty for everything else.
    pub fn toppings(&self) -> &[FoodId] {
        match self {
            FoodKind::Pizza { toppings } => toppings,
            _ => &[],
        }
    }
}

/// Behavioural tags on a food entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodTags {
    /// Uncooked variant; never satisfies a pizza order.
    pub raw: bool,
    /// Burnt variant; reaching it emits a burn notification.
    pub burnt: bool,
    /// Pizza base that accepts toppings instead of changing identity.
    pub pizza_base: bool,
    /// Preparing it with no result leaves an empty plate (washing).
    pub plate_residue: bool,
    /// A soiled plate; refused by the garbage.
    pub dirty_plate: bool,
}

impl FoodTags {
    pub fn raw() -> Self {
        Self {
            raw: true,
            ..Self::default()
        }
    }

    pub fn burnt() -> Self {
        Self {
            burnt: true,
            ..Self::default()
        }
    }

    pub fn pizza_base() -> Self {
        Self {
            raw: true,
            pizza_base: true,
            ..Self::default()
        }
    }

    pub fn dirty_plate() -> Self {
        Self {
            plate_residue: true,
            dirty_plate: true,
            ..Self::default()
        }
    }
}

/// One row of a combination table: `self + partner -> result`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Combination {
    pub partner: FoodId,
    pub result: FoodId,
}

/// A food definition in the catalog.
#[derive(Debug, Clone)]
pub struct FoodDef {
    pub name: String,
    pub kind: FoodKind,
    pub method: PrepMethod,
    pub speed: PrepSpeed,
    /// What this food becomes once its preparation completes.
    pub result: Option<FoodId>,
    pub combinations: Vec<Combination>,
    pub tags: FoodTags,
}

impl FoodDef {
    /// Look up this food's combination result with `partner`, if registered.
    pub fn combination_with(&self, partner: FoodId) -> Option<FoodId> {
        self.combinations
            .iter()
            .find(|c| c.partner == partner)
            .map(|c| c.result)
    }
}

/// Which side of a combination lookup owns the matching table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombineSide {
    First,
    Second,
}

/// A resolved combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombineMatch {
    pub base: CombineSide,
    pub result: FoodId,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for constructing an immutable [`Catalog`].
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    foods: Vec<FoodDef>,
    name_to_id: HashMap<String, FoodId>,
    duplicates: Vec<String>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a food with no preparation and no combinations. Returns its ID.
    pub fn register_food(&mut self, name: &str, kind: FoodKind) -> FoodId {
        let id = FoodId(self.foods.len() as u32);
        self.foods.push(FoodDef {
            name: name.to_string(),
            kind,
            method: PrepMethod::None,
            speed: PrepSpeed::Normal,
            result: None,
            combinations: Vec::new(),
            tags: FoodTags::default(),
        });
        if self.name_to_id.insert(name.to_string(), id).is_some() {
            self.duplicates.push(name.to_string());
        }
        id
    }

    /// Set how `food` is prepared and what it becomes.
    pub fn set_preparation(
        &mut self,
        food: FoodId,
        method: PrepMethod,
        speed: PrepSpeed,
        result: Option<FoodId>,
    ) -> Result<(), CatalogError> {
        let def = self.def_mut(food)?;
        def.method = method;
        def.speed = speed;
        def.result = result;
        Ok(())
    }

    /// Register `base + partner -> result` in `base`'s combination table.
    pub fn add_combination(
        &mut self,
        base: FoodId,
        partner: FoodId,
        result: FoodId,
    ) -> Result<(), CatalogError> {
        self.def_mut(base)?
            .combinations
            .push(Combination { partner, result });
        Ok(())
    }

    pub fn set_tags(&mut self, food: FoodId, tags: FoodTags) -> Result<(), CatalogError> {
        self.def_mut(food)?.tags = tags;
        Ok(())
    }

    /// Mutate an existing food by name.
    pub fn mutate_food<F>(&mut self, name: &str, f: F) -> Result<(), CatalogError>
    where
        F: FnOnce(&mut FoodDef),
    {
        let id = self
            .name_to_id
            .get(name)
            .copied()
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))?;
        f(self.def_mut(id)?);
        Ok(())
    }

    /// Lookup food ID by name.
    pub fn food_id(&self, name: &str) -> Option<FoodId> {
        self.name_to_id.get(name).copied()
    }

    fn def_mut(&mut self, id: FoodId) -> Result<&mut FoodDef, CatalogError> {
        self.foods
            .get_mut(id.0 as usize)
            .ok_or(CatalogError::InvalidFoodRef(id))
    }

    /// Finalize and build the immutable catalog.
    pub fn build(self) -> Result<Catalog, CatalogError> {
        if self.foods.is_empty() {
            return Err(CatalogError::Empty);
        }
        if let Some(name) = self.duplicates.into_iter().next() {
            return Err(CatalogError::DuplicateName(name));
        }

        let count = self.foods.len();
        let valid = |id: FoodId| (id.0 as usize) < count;
        for def in &self.foods {
            let refs = def
                .result
                .iter()
                .copied()
                .chain(def.combinations.iter().flat_map(|c| [c.partner, c.result]))
                .chain(def.kind.toppings().iter().copied());
            for id in refs {
                if !valid(id) {
                    return Err(CatalogError::InvalidFoodRef(id));
                }
            }
        }

        Ok(Catalog {
            foods: self.foods,
            name_to_id: self.name_to_id,
        })
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Immutable catalog. Frozen after build().
#[derive(Debug, Clone)]
pub struct Catalog {
    foods: Vec<FoodDef>,
    name_to_id: HashMap<String, FoodId>,
}

impl Catalog {
    pub fn get(&self, id: FoodId) -> Option<&FoodDef> {
        self.foods.get(id.0 as usize)
    }

    pub fn food_id(&self, name: &str) -> Option<FoodId> {
        self.name_to_id.get(name).copied()
    }

    /// Display name for logging. Unknown IDs render as `"?"`.
    pub fn name(&self, id: FoodId) -> &str {
        self.get(id).map(|d| d.name.as_str()).unwrap_or("?")
    }

    pub fn len(&self) -> usize {
        self.foods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FoodId, &FoodDef)> {
        self.foods
            .iter()
            .enumerate()
            .map(|(i, def)| (FoodId(i as u32), def))
    }

    /// Whether `id` is a pizza base that takes toppings.
    pub fn is_pizza_base(&self, id: Option<FoodId>) -> bool {
        id.and_then(|id| self.get(id))
            .is_some_and(|def| def.tags.pizza_base && def.kind.is_pizza())
    }

    pub fn is_pizza(&self, id: FoodId) -> bool {
        self.get(id).is_some_and(|def| def.kind.is_pizza())
    }

    /// Resolve `first + second`. `first`'s table is consulted before
    /// `second`'s; the returned side names whose entry matched.
    pub fn resolve_combination(&self, first: FoodId, second: FoodId) -> Option<CombineMatch> {
        if let Some(result) = self.get(first).and_then(|d| d.combination_with(second)) {
            return Some(CombineMatch {
                base: CombineSide::First,
                result,
            });
        }
        self.get(second)
            .and_then(|d| d.combination_with(first))
            .map(|result| CombineMatch {
                base: CombineSide::Second,
                result,
            })
    }

    /// The first food tagged as a dirty plate, if the catalog has one.
    pub fn dirty_plate(&self) -> Option<FoodId> {
        self.iter()
            .find(|(_, def)| def.tags.dirty_plate)
            .map(|(id, _)| id)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog has no foods")]
    Empty,
    #[error("duplicate food identifier: {0}")]
    DuplicateName(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid food reference: {0:?}")]
    InvalidFoodRef(FoodId),
}
