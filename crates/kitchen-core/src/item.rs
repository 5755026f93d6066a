use crate::catalog::Catalog;
use crate::id::FoodId;
use serde::{Deserialize, Serialize};

/// What currently sits in a slot: an optional food, a plate, and the
/// toppings of a pizza.
///
/// "No item" is modelled by the owning slot as `Option<KitchenItem>::None`.
/// A `KitchenItem` with no food and no plate is a distinct, valid state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitchenItem {
    pub food: Option<FoodId>,
    pub plate: bool,
    /// Only meaningful while `food` is a pizza.
    pub toppings: Vec<FoodId>,
}

impl KitchenItem {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn food(food: FoodId) -> Self {
        Self {
            food: Some(food),
            ..Self::default()
        }
    }

    pub fn plate() -> Self {
        Self {
            plate: true,
            ..Self::default()
        }
    }

    pub fn plated(food: FoodId) -> Self {
        Self {
            food: Some(food),
            plate: true,
            toppings: Vec::new(),
        }
    }

    pub fn with_toppings(mut self, toppings: impl IntoIterator<Item = FoodId>) -> Self {
        for t in toppings {
            self.add_topping(t);
        }
        self
    }

    pub fn has_food(&self) -> bool {
        self.food.is_some()
    }

    /// A plate carrying nothing.
    pub fn is_empty_plate(&self) -> bool {
        self.plate && self.food.is_none()
    }

    /// Food without a plate underneath.
    pub fn is_unplated_food(&self) -> bool {
        self.food.is_some() && !self.plate
    }

    /// Replace the food identity and set the plate flag. Toppings carry over
    /// only when both the previous and the new food are pizzas.
    pub fn init(&mut self, catalog: &Catalog, food: Option<FoodId>, plate: bool) {
        let keep_toppings = match (self.food, food) {
            (Some(old), Some(new)) => catalog.is_pizza(old) && catalog.is_pizza(new),
            _ => false,
        };
        if !keep_toppings {
            self.toppings.clear();
        }
        self.food = food;
        self.plate = plate;
    }

    /// Add a topping. Returns `false` if it was already present.
    pub fn add_topping(&mut self, topping: FoodId) -> bool {
        if self.toppings.contains(&topping) {
            return false;
        }
        self.toppings.push(topping);
        true
    }

    pub fn clear_toppings(&mut self) {
        self.toppings.clear();
    }

    /// Toppings as a sorted, deduplicated set for order matching.
    pub fn topping_set(&self) -> Vec<FoodId> {
        topping_set(&self.toppings)
    }
}

pub(crate) fn topping_set(toppings: &[FoodId]) -> Vec<FoodId> {
    let mut set = toppings.to_vec();
    set.sort_unstable();
    set.dedup();
    set
}
