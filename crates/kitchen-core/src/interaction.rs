//! Countertop interaction resolution.
//!
//! [`resolve`] decides what happens when the item an actor is holding meets
//! the item held by a plain counter slot. Rules are checked in order and the
//! first match wins:
//!
//! 1. Empty hands, occupied slot: the actor takes the item.
//! 2. Full hands, empty slot: the item is placed.
//! 3. Both occupied:
//!    - an empty plate on the slot absorbs unplated food,
//!    - an empty plate in hand plates unprepared food on the slot,
//!    - a registered combination of the two foods is applied,
//!    - otherwise nothing happens.
//!
//! The resolver never fails. A non-match returns [`InteractionResult::None`]
//! and hands the incoming item straight back.

use crate::catalog::{Catalog, CombineSide, PrepMethod};
use crate::item::KitchenItem;
use serde::{Deserialize, Serialize};

/// Outcome tag of an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionResult {
    None,
    PlacedByPlayer,
    /// Held food was deposited while its plate stayed with the actor.
    PlacedObjectByPlayer,
    TakenByPlayer,
    CombinedByPlayer,
}

/// Result of an interaction plus whatever the actor holds afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionResponse {
    pub result: InteractionResult,
    pub item: Option<KitchenItem>,
}

impl InteractionResponse {
    pub fn new(result: InteractionResult, item: Option<KitchenItem>) -> Self {
        Self { result, item }
    }

    /// Nothing happened; `item` goes back to the actor untouched.
    pub fn refused(item: Option<KitchenItem>) -> Self {
        Self::new(InteractionResult::None, item)
    }
}

/// Resolve an interaction between a station slot and an incoming item.
pub fn resolve(
    catalog: &Catalog,
    slot: &mut Option<KitchenItem>,
    incoming: Option<KitchenItem>,
) -> InteractionResponse {
    let Some(incoming) = incoming else {
        return match slot.take() {
            Some(item) => InteractionResponse::new(InteractionResult::TakenByPlayer, Some(item)),
            None => InteractionResponse::refused(None),
        };
    };

    let Some(station) = slot.as_mut() else {
        *slot = Some(incoming);
        return InteractionResponse::new(InteractionResult::PlacedByPlayer, None);
    };

    if station.is_empty_plate() && incoming.is_unplated_food() {
        let KitchenItem { food, toppings, .. } = incoming;
        station.food = food;
        station.toppings = toppings;
        return InteractionResponse::new(InteractionResult::CombinedByPlayer, None);
    }

    if incoming.is_empty_plate() && station.is_unplated_food() {
        let unprepared = station
            .food
            .and_then(|f| catalog.get(f))
            .is_some_and(|def| def.method == PrepMethod::None);
        if unprepared {
            station.plate = true;
            return InteractionResponse::new(InteractionResult::CombinedByPlayer, None);
        }
    }

    let (Some(_), Some(_)) = (station.food, incoming.food) else {
        return InteractionResponse::refused(Some(incoming));
    };

    combine(catalog, slot, incoming)
}

/// Apply a registered combination between the slot's item and `incoming`.
/// Both items must carry food.
fn combine(
    catalog: &Catalog,
    slot: &mut Option<KitchenItem>,
    mut incoming: KitchenItem,
) -> InteractionResponse {
    let Some(station) = slot.as_mut() else {
        return InteractionResponse::refused(Some(incoming));
    };
    let (Some(station_food), Some(incoming_food)) = (station.food, incoming.food) else {
        return InteractionResponse::refused(Some(incoming));
    };
    let Some(matched) = catalog.resolve_combination(station_food, incoming_food) else {
        return InteractionResponse::refused(Some(incoming));
    };

    // Two plates in, one plate out: the actor keeps the spare.
    let spare = (station.plate && incoming.plate).then(KitchenItem::plate);
    let plate = station.plate || incoming.plate;

    if catalog.is_pizza_base(Some(station_food)) {
        if station.toppings.contains(&matched.result) {
            return InteractionResponse::refused(Some(incoming));
        }
        station.add_topping(matched.result);
        station.plate = plate;
        return InteractionResponse::new(InteractionResult::CombinedByPlayer, spare);
    }

    if catalog.is_pizza_base(Some(incoming_food)) {
        if !incoming.add_topping(matched.result) {
            return InteractionResponse::refused(Some(incoming));
        }
        incoming.plate = plate;
        *slot = Some(incoming);
        return InteractionResponse::new(InteractionResult::CombinedByPlayer, spare);
    }

    match matched.base {
        CombineSide::First => station.init(catalog, Some(matched.result), plate),
        CombineSide::Second => {
            incoming.init(catalog, Some(matched.result), plate);
            *slot = Some(incoming);
        }
    }
    InteractionResponse::new(InteractionResult::CombinedByPlayer, spare)
}
