//! Kitchen Core -- gameplay logic for a cooking arcade game.
//!
//! This crate decides what happens in the kitchen and nothing else:
//! rendering, audio and input are left to whoever subscribes to its events.
//!
//! # Step Pipeline
//!
//! Each call to [`kitchen::Kitchen::step`] advances the kitchen by one tick:
//!
//! 1. **Clock** -- Increment the tick counter.
//! 2. **Stations** -- Advance preparation on every station.
//! 3. **Conveyor** -- Deliver arriving plates and return clean ones.
//! 4. **Orders** -- Spawn new orders and expire overdue ones.
//! 5. **Shift** -- End the shift when its time is up.
//! 6. **Delivery** -- Hand buffered events to subscribers.
//!
//! Actor calls between steps resolve synchronously and deliver their events
//! before returning.
//!
//! # Key Types
//!
//! - [`kitchen::Kitchen`] -- Owns the stations, conveyor and order book.
//! - [`catalog::Catalog`] -- Immutable food definitions, preparation chains
//!   and combination tables (frozen at startup).
//! - [`item::KitchenItem`] -- What sits in a slot: food, plate, toppings.
//! - [`interaction::resolve`] -- Place/take/combine rules for counters.
//! - [`station::Station`] -- Counters, preparation stations, spawners and
//!   the garbage.
//! - [`prep::PrepMachine`] -- Progress toward a preparation result.
//! - [`order::OrderManager`] -- Order spawning, expiry and matching.
//! - [`conveyor::Conveyor`] -- Send-off and return belts.
//! - [`event::EventBus`] -- Subscription-based event bus with buffered delivery.
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point type for deterministic rates.

pub mod catalog;
pub mod config;
pub mod conveyor;
#[cfg(feature = "data-loader")]
pub mod data_loader;
pub mod event;
pub mod fixed;
pub mod id;
pub mod interaction;
pub mod item;
pub mod kitchen;
pub mod order;
pub mod prep;
pub mod rng;
pub mod scheduler;
pub mod score;
pub mod sim;
pub mod station;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
