//! Whole-kitchen scenarios: orders against the clock, plating rules, pizza
//! matching, preparation timing and the plate conveyor.

use fixed::types::I32F32;
use kitchen_core::conveyor::BeltDirection;
use kitchen_core::event::{Event, EventKind};
use kitchen_core::interaction::{resolve, InteractionResult};
use kitchen_core::item::KitchenItem;
use kitchen_core::kitchen::Kitchen;
use kitchen_core::order::{CompletionOutcome, ExpireReason};
use kitchen_core::prep::PROGRESS_MAX;
use kitchen_core::station::StationKind;
use kitchen_core::test_utils::*;
use std::cell::RefCell;
use std::rc::Rc;

fn record(k: &mut Kitchen, kind: EventKind) -> Rc<RefCell<Vec<Event>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    k.on(kind, Box::new(move |e| sink.borrow_mut().push(e.clone())));
    seen
}

// ============================================================================
// Orders against the clock
// ============================================================================

#[test]
fn burger_delivered_at_ten_seconds() {
    let m = reference_menu();
    let mut k = kitchen();
    let wait = k.ticks(60.0);
    let order = k.add_order(m.burger, wait);

    run_seconds(&mut k, 10.0);
    let outcome = k.deliver(&KitchenItem::plated(m.burger));

    match outcome {
        CompletionOutcome::Completed { order: done, score, .. } => {
            assert_eq!(done, order);
            assert!((10..=30).contains(&score));
            assert_eq!(k.scoreboard().score, u64::from(score));
        }
        other => panic!("expected completion, got {other:?}"),
    }
    assert_eq!(k.orders().pending_count(), 0);
    assert_eq!(k.scoreboard().orders_completed, 1);

    // The cancelled expiry never counts as a miss.
    run_seconds(&mut k, 60.0);
    assert_eq!(k.scoreboard().orders_missed, 0);
}

#[test]
fn burger_left_waiting_expires_at_sixty_seconds() {
    let m = reference_menu();
    let mut k = kitchen();
    let expired = record(&mut k, EventKind::OrderExpired);
    let wait = k.ticks(60.0);
    let order = k.add_order(m.burger, wait);

    k.advance(wait - 1);
    assert_eq!(k.orders().pending_count(), 1);
    k.step();
    assert_eq!(k.orders().pending_count(), 0);
    assert_eq!(k.scoreboard().orders_missed, 1);
    assert_eq!(
        expired.borrow().as_slice(),
        &[Event::OrderExpired {
            order,
            food: m.burger,
            reason: ExpireReason::Timeout,
            tick: wait,
        }]
    );

    // Too late now.
    assert_eq!(
        k.deliver(&KitchenItem::plated(m.burger)),
        CompletionOutcome::NoMatch
    );
}

#[test]
fn oldest_matching_order_is_served_first() {
    let m = reference_menu();
    let mut k = kitchen();
    let first = k.add_order(m.fries, 1000);
    k.step();
    let second = k.add_order(m.fries, 1000);

    let served = k.complete_order(m.fries, &[], true);
    assert!(matches!(served, CompletionOutcome::Completed { order, .. } if order == first));
    assert!(k.orders().get(second).is_some());
}

// ============================================================================
// Plating
// ============================================================================

#[test]
fn empty_plate_onto_unplated_fries() {
    let m = reference_menu();
    let mut k = kitchen();
    let counter = k
        .add_station_with_item(StationKind::Counter, KitchenItem::food(m.fries))
        .unwrap();

    let r = k.interact(counter, Some(KitchenItem::plate()));
    assert_eq!(r.result, InteractionResult::CombinedByPlayer);
    assert!(r.item.is_none());
    assert_eq!(
        k.station(counter).unwrap().item(),
        Some(&KitchenItem::plated(m.fries))
    );
}

#[test]
fn food_without_plate_warns_and_stays_pending() {
    let m = reference_menu();
    let mut k = kitchen();
    let warnings = record(&mut k, EventKind::NoPlateWarning);
    let order = k.add_order(m.burger, 1000);

    let outcome = k.deliver(&KitchenItem::food(m.burger));
    assert_eq!(
        outcome,
        CompletionOutcome::NoPlate {
            order,
            food: m.burger
        }
    );
    assert_eq!(warnings.borrow().len(), 1);
    assert_eq!(k.orders().pending_count(), 1);
    assert_eq!(k.scoreboard().orders_completed, 0);
}

#[test]
fn drink_without_plate_completes() {
    let m = reference_menu();
    let mut k = kitchen();
    k.add_order(m.soda, 1000);
    assert!(matches!(
        k.deliver(&KitchenItem::food(m.soda)),
        CompletionOutcome::Completed { .. }
    ));
}

// ============================================================================
// Combinations and pizzas
// ============================================================================

#[test]
fn registered_pairs_combine_in_both_orders() {
    let m = reference_menu();
    let pairs = [
        (m.bun, m.patty_cooked, KitchenItem::food(m.burger)),
        (
            m.pizza_raw,
            m.cheese,
            KitchenItem::food(m.pizza_raw).with_toppings([m.cheese]),
        ),
        (
            m.pizza_raw,
            m.olives,
            KitchenItem::food(m.pizza_raw).with_toppings([m.olives]),
        ),
    ];
    for (a, b, expected) in pairs {
        for (held, placed) in [(a, b), (b, a)] {
            let mut slot = Some(KitchenItem::food(placed));
            let r = resolve(&m.catalog, &mut slot, Some(KitchenItem::food(held)));
            assert_eq!(r.result, InteractionResult::CombinedByPlayer);
            assert_eq!(slot.as_ref(), Some(&expected));
        }
    }
}

#[test]
fn unregistered_pair_is_refused_both_ways() {
    let m = reference_menu();
    for (held, placed) in [(m.bun, m.soda), (m.soda, m.bun)] {
        let mut slot = Some(KitchenItem::food(placed));
        let r = resolve(&m.catalog, &mut slot, Some(KitchenItem::food(held)));
        assert_eq!(r.result, InteractionResult::None);
        assert_eq!(r.item, Some(KitchenItem::food(held)));
        assert_eq!(slot, Some(KitchenItem::food(placed)));
    }
}

#[test]
fn same_topping_twice_is_kept_once() {
    let m = reference_menu();
    let mut k = kitchen();
    let counter = k
        .add_station_with_item(StationKind::Counter, KitchenItem::food(m.pizza_raw))
        .unwrap();
    k.interact(counter, Some(KitchenItem::food(m.cheese)));
    let again = k.interact(counter, Some(KitchenItem::food(m.cheese)));
    assert_eq!(again.result, InteractionResult::None);
    assert_eq!(again.item, Some(KitchenItem::food(m.cheese)));
    assert_eq!(k.station(counter).unwrap().item().unwrap().toppings, vec![m.cheese]);
}

#[test]
fn pizza_orders_match_topping_sets() {
    let m = reference_menu();
    let cases = [
        (vec![m.cheese], false),
        (vec![m.cheese, m.pepperoni, m.olives], false),
        (vec![m.pepperoni, m.cheese], true),
        (vec![m.cheese, m.pepperoni], true),
    ];
    for (toppings, matches) in cases {
        let mut k = kitchen();
        k.add_order(m.pizza_pepperoni, 1000);
        let outcome = k.complete_order(m.pizza, &toppings, false);
        assert_eq!(
            matches!(outcome, CompletionOutcome::Completed { .. }),
            matches,
            "toppings {toppings:?}"
        );
    }
}

#[test]
fn pizza_orders_ignore_the_delivered_bake() {
    let m = reference_menu();
    for food in [m.pizza_raw, m.pizza, m.pizza_burnt] {
        let mut k = kitchen();
        let order = k.add_order(m.pizza_margherita, 1000);
        let outcome = k.complete_order(food, &[m.cheese], false);
        assert!(
            matches!(outcome, CompletionOutcome::Completed { order: done, .. } if done == order),
            "delivered {food:?}"
        );
    }
}

#[test]
fn raw_pizza_order_is_never_filled_by_toppings() {
    let m = reference_menu();
    let mut k = kitchen();
    k.add_order(m.pizza_raw, 1000);
    assert_eq!(
        k.complete_order(m.pizza, &[], true),
        CompletionOutcome::NoMatch
    );
    assert_eq!(k.orders().pending_count(), 1);
}

// ============================================================================
// Preparation timing
// ============================================================================

#[test]
fn automatic_station_finishes_after_max_over_rate() {
    let m = reference_menu();
    for rate in [1u32, 4, 5, 10, 25] {
        let mut k = kitchen();
        let stove = k
            .add_station(StationKind::AutomaticPrep {
                method: kitchen_core::catalog::PrepMethod::Fry,
                rate: I32F32::from_num(rate),
            })
            .unwrap();
        k.interact(stove, Some(KitchenItem::food(m.patty_raw)));
        let needed = u64::from(PROGRESS_MAX / rate);

        k.advance(needed - 1);
        assert_eq!(
            k.station(stove).unwrap().item().unwrap().food,
            Some(m.patty_raw),
            "rate {rate}"
        );
        k.step();
        assert_eq!(
            k.station(stove).unwrap().item().unwrap().food,
            Some(m.patty_cooked),
            "rate {rate}"
        );
    }
}

#[test]
fn removing_food_resets_progress() {
    let m = reference_menu();
    let mut k = kitchen();
    let stove = k.add_station(fryer(4.0)).unwrap();

    k.interact(stove, Some(KitchenItem::food(m.patty_raw)));
    k.advance(20);
    let patty = k.interact(stove, None).item;
    k.interact(stove, patty);
    assert_eq!(k.station(stove).unwrap().progress(), Some(fixed(0.0)));

    // A full 25 ticks again, not the 5 left over.
    k.advance(24);
    assert_eq!(
        k.station(stove).unwrap().item().unwrap().food,
        Some(m.patty_raw)
    );
    k.step();
    assert_eq!(
        k.station(stove).unwrap().item().unwrap().food,
        Some(m.patty_cooked)
    );
}

// ============================================================================
// Conveyor
// ============================================================================

#[test]
fn sent_off_plate_comes_back_after_the_delay() {
    let m = reference_menu();
    let mut k = kitchen();
    let out = k.add_belt(BeltDirection::SendOff);
    let back = k.add_belt(BeltDirection::Return);
    let order = k.add_order(m.burger, 10_000);

    k.interact_belt(out, Some(KitchenItem::plated(m.burger)));
    run_seconds(&mut k, 1.5);
    assert!(k.orders().get(order).is_none());
    assert!(k.conveyor().belt(out).unwrap().item().is_none());
    assert_eq!(k.conveyor().pending_returns(), 1);

    let delay = k.ticks(5.0);
    k.advance(delay - 1);
    assert!(k.conveyor().belt(back).unwrap().item().is_none());
    k.step();
    assert_eq!(
        k.conveyor().belt(back).unwrap().item(),
        Some(&KitchenItem::plate())
    );
    assert_eq!(k.conveyor().pending_returns(), 0);
}

#[test]
fn plate_return_waits_for_a_free_belt() {
    let m = reference_menu();
    let mut k = kitchen();
    let out = k.add_belt(BeltDirection::SendOff);
    let back = k.add_belt(BeltDirection::Return);
    let returned = record(&mut k, EventKind::PlateReturned);

    // The opening plate occupies the only return belt.
    k.start_shift();
    assert_eq!(returned.borrow().len(), 1);

    k.interact_belt(out, Some(KitchenItem::plated(m.fries)));
    run_seconds(&mut k, 1.5 + 5.0);
    assert_eq!(k.conveyor().pending_returns(), 1);

    // Still blocked on the next retries.
    run_seconds(&mut k, 3.0);
    assert_eq!(k.conveyor().pending_returns(), 1);
    assert_eq!(returned.borrow().len(), 1);

    let taken = k.interact_belt(back, None);
    assert_eq!(taken.result, InteractionResult::TakenByPlayer);
    run_seconds(&mut k, 1.0);
    assert_eq!(k.conveyor().pending_returns(), 0);
    assert_eq!(returned.borrow().len(), 2);
    assert!(k.conveyor().belt(back).unwrap().item().is_some());
}

#[test]
fn dirty_plates_come_back_when_configured() {
    let m = reference_menu();
    let mut config = config();
    config.conveyor.return_dirty_plates = true;
    let mut k = Kitchen::new(m.catalog.clone(), config).unwrap();
    let back = k.add_belt(BeltDirection::Return);
    k.start_shift();
    assert_eq!(
        k.conveyor().belt(back).unwrap().item(),
        Some(&KitchenItem::plated(m.dirty_plate))
    );
}
