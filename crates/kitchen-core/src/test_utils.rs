//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::catalog::{Catalog, CatalogBuilder, FoodKind, FoodTags, PrepMethod, PrepSpeed};
use crate::config::KitchenConfig;
use crate::fixed::Fixed64;
use crate::id::FoodId;
use crate::kitchen::Kitchen;
use crate::station::StationKind;

// ===========================================================================
// Fixed-point helper
// ===========================================================================

pub fn fixed(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

// ===========================================================================
// Reference menu
// ===========================================================================

/// A small but complete menu: a burger chain, chopped and fried sides, an
/// instant egg, a drink, pizzas with toppings, and dirty plates.
#[derive(Debug, Clone)]
pub struct ReferenceMenu {
    pub catalog: Catalog,
    // Burgers
    pub bun: FoodId,
    pub patty_raw: FoodId,
    pub patty_cooked: FoodId,
    pub patty_burnt: FoodId,
    pub burger: FoodId,
    // Sides
    pub lettuce: FoodId,
    pub lettuce_chopped: FoodId,
    pub potato: FoodId,
    pub potato_chopped: FoodId,
    pub fries: FoodId,
    pub egg: FoodId,
    pub egg_fried: FoodId,
    // Drinks
    pub cup: FoodId,
    pub soda: FoodId,
    // Pizzas
    pub cheese: FoodId,
    pub pepperoni: FoodId,
    pub olives: FoodId,
    pub pizza_raw: FoodId,
    pub pizza: FoodId,
    pub pizza_burnt: FoodId,
    pub pizza_margherita: FoodId,
    pub pizza_pepperoni: FoodId,
    // Dishes
    pub dirty_plate: FoodId,
}

pub fn reference_builder() -> CatalogBuilder {
    let mut b = CatalogBuilder::new();

    let bun = b.register_food("bun", FoodKind::Food);
    let patty_raw = b.register_food("patty_raw", FoodKind::Food);
    let patty_cooked = b.register_food("patty_cooked", FoodKind::Food);
    let patty_burnt = b.register_food("patty_burnt", FoodKind::Food);
    let burger = b.register_food("burger", FoodKind::Food);

    let lettuce = b.register_food("lettuce", FoodKind::Food);
    let lettuce_chopped = b.register_food("lettuce_chopped", FoodKind::Food);
    let potato = b.register_food("potato", FoodKind::Food);
    let potato_chopped = b.register_food("potato_chopped", FoodKind::Food);
    let fries = b.register_food("fries", FoodKind::Food);
    let egg = b.register_food("egg", FoodKind::Food);
    let egg_fried = b.register_food("egg_fried", FoodKind::Food);

    let cup = b.register_food("cup", FoodKind::Food);
    let soda = b.register_food("soda", FoodKind::Drink);

    let cheese = b.register_food("cheese", FoodKind::Food);
    let pepperoni = b.register_food("pepperoni", FoodKind::Food);
    let olives = b.register_food("olives", FoodKind::Food);
    let pizza_raw = b.register_food("pizza_raw", FoodKind::plain_pizza());
    let pizza = b.register_food("pizza", FoodKind::plain_pizza());
    let pizza_burnt = b.register_food("pizza_burnt", FoodKind::plain_pizza());
    b.register_food(
        "pizza_margherita",
        FoodKind::Pizza {
            toppings: vec![cheese],
        },
    );
    b.register_food(
        "pizza_pepperoni",
        FoodKind::Pizza {
            toppings: vec![cheese, pepperoni],
        },
    );

    let dirty_plate = b.register_food("dirty_plate", FoodKind::Food);

    let prep = |b: &mut CatalogBuilder, food, method, speed, result| {
        b.set_preparation(food, method, speed, result)
            .expect("reference food exists");
    };
    prep(&mut b, patty_raw, PrepMethod::Fry, PrepSpeed::Normal, Some(patty_cooked));
    prep(&mut b, patty_cooked, PrepMethod::Fry, PrepSpeed::Normal, Some(patty_burnt));
    prep(&mut b, lettuce, PrepMethod::Chop, PrepSpeed::Normal, Some(lettuce_chopped));
    prep(&mut b, potato, PrepMethod::Chop, PrepSpeed::Normal, Some(potato_chopped));
    prep(&mut b, potato_chopped, PrepMethod::DeepFry, PrepSpeed::Normal, Some(fries));
    prep(&mut b, egg, PrepMethod::Fry, PrepSpeed::Instant, Some(egg_fried));
    prep(&mut b, cup, PrepMethod::Soda, PrepSpeed::Normal, Some(soda));
    prep(&mut b, pizza_raw, PrepMethod::Oven, PrepSpeed::Normal, Some(pizza));
    prep(&mut b, pizza, PrepMethod::Oven, PrepSpeed::Normal, Some(pizza_burnt));
    prep(&mut b, dirty_plate, PrepMethod::Wash, PrepSpeed::Normal, None);

    b.add_combination(bun, patty_cooked, burger)
        .expect("reference food exists");
    for topping in [cheese, pepperoni, olives] {
        b.add_combination(pizza_raw, topping, topping)
            .expect("reference food exists");
    }

    let tag = |b: &mut CatalogBuilder, food, tags| {
        b.set_tags(food, tags).expect("reference food exists");
    };
    tag(&mut b, patty_raw, FoodTags::raw());
    tag(&mut b, patty_burnt, FoodTags::burnt());
    tag(&mut b, pizza_raw, FoodTags::pizza_base());
    tag(&mut b, pizza_burnt, FoodTags::burnt());
    tag(&mut b, dirty_plate, FoodTags::dirty_plate());

    b
}

pub fn reference_menu() -> ReferenceMenu {
    let catalog = reference_builder()
        .build()
        .expect("reference catalog is valid");
    let id = |name: &str| catalog.food_id(name).expect("reference food exists");
    ReferenceMenu {
        bun: id("bun"),
        patty_raw: id("patty_raw"),
        patty_cooked: id("patty_cooked"),
        patty_burnt: id("patty_burnt"),
        burger: id("burger"),
        lettuce: id("lettuce"),
        lettuce_chopped: id("lettuce_chopped"),
        potato: id("potato"),
        potato_chopped: id("potato_chopped"),
        fries: id("fries"),
        egg: id("egg"),
        egg_fried: id("egg_fried"),
        cup: id("cup"),
        soda: id("soda"),
        cheese: id("cheese"),
        pepperoni: id("pepperoni"),
        olives: id("olives"),
        pizza_raw: id("pizza_raw"),
        pizza: id("pizza"),
        pizza_burnt: id("pizza_burnt"),
        pizza_margherita: id("pizza_margherita"),
        pizza_pepperoni: id("pizza_pepperoni"),
        dirty_plate: id("dirty_plate"),
        catalog,
    }
}

// ===========================================================================
// Kitchen helpers
// ===========================================================================

/// Config with the reference menu and a fixed seed.
pub fn config() -> KitchenConfig {
    let mut config = KitchenConfig {
        seed: 7,
        ..KitchenConfig::default()
    };
    config.orders.menu = ["burger", "fries", "soda", "pizza_pepperoni"]
        .into_iter()
        .map(String::from)
        .collect();
    config
}

/// Kitchen with the reference menu and no stations.
pub fn kitchen() -> Kitchen {
    Kitchen::new(reference_menu().catalog, config()).expect("reference kitchen is valid")
}

pub fn fryer(rate: f64) -> StationKind {
    StationKind::AutomaticPrep {
        method: PrepMethod::Fry,
        rate: fixed(rate),
    }
}

pub fn deep_fryer(rate: f64) -> StationKind {
    StationKind::AutomaticPrep {
        method: PrepMethod::DeepFry,
        rate: fixed(rate),
    }
}

pub fn oven(rate: f64) -> StationKind {
    StationKind::AutomaticPrep {
        method: PrepMethod::Oven,
        rate: fixed(rate),
    }
}

pub fn chopping_board(rate: f64) -> StationKind {
    StationKind::ManualPrep {
        method: PrepMethod::Chop,
        rate: fixed(rate),
    }
}

pub fn sink(rate: f64) -> StationKind {
    StationKind::ManualPrep {
        method: PrepMethod::Wash,
        rate: fixed(rate),
    }
}

/// Run the kitchen for `seconds` of simulated time.
pub fn run_seconds(kitchen: &mut Kitchen, seconds: f64) {
    let ticks = kitchen.ticks(seconds);
    kitchen.advance(ticks);
}
