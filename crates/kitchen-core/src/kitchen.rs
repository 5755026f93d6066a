//! The kitchen: owns every station, the conveyor and the order book, and
//! advances them on a fixed tick.
//!
//! # Architecture
//!
//! The `Kitchen` owns:
//! - The immutable [`Catalog`]
//! - Stations in a slotmap arena, each with its own slot and prep machine
//! - A [`Conveyor`] of send-off and return belts
//! - An [`OrderManager`] that also receives conveyor deliveries
//! - A [`ShiftClock`], a [`Scoreboard`] and an [`EventBus`]
//!
//! # Step pipeline
//!
//! Each `step()` runs:
//! 1. **Clock** -- increment the tick counter
//! 2. **Stations** -- advance preparation
//! 3. **Conveyor** -- fire belt arrivals and plate returns
//! 4. **Orders** -- fire spawn and expiry timers
//! 5. **Shift** -- end the shift if its time is up
//! 6. **Delivery** -- hand buffered events to subscribers
//!
//! Actor calls (`interact`, `complete_order`, ...) run between steps and
//! deliver their own events before returning.

use crate::catalog::{Catalog, CatalogBuilder, CatalogError};
use crate::config::{ConfigError, KitchenConfig};
use crate::conveyor::{BeltDirection, Conveyor, ConveyorNote};
use crate::event::{
    Event, EventBus, EventFilter, EventKind, InteractionSite, Listener, SubscriberPriority,
};
use crate::fixed::{Fixed64, Ticks};
use crate::id::{BeltId, FoodId, OrderId, StationId, SubscriptionId};
use crate::interaction::{InteractionResponse, InteractionResult};
use crate::item::KitchenItem;
use crate::order::{CompletionOutcome, DeliverySink, OrderManager, OrderNote};
use crate::score::Scoreboard;
use crate::sim::{AdvanceResult, ShiftClock, ShiftState, SimState};
use crate::station::{Station, StationKind, StationNote};
use slotmap::SlotMap;

#[derive(Debug, thiserror::Error)]
pub enum KitchenError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug)]
pub struct Kitchen {
    catalog: Catalog,
    config: KitchenConfig,
    pub sim_state: SimState,
    paused: bool,
    stations: SlotMap<StationId, Station>,
    conveyor: Conveyor,
    orders: OrderManager,
    shift: ShiftClock,
    scoreboard: Scoreboard,
    event_bus: EventBus,
}

impl Kitchen {
    /// Validate the configuration and resolve the menu against the catalog.
    pub fn new(catalog: Catalog, config: KitchenConfig) -> Result<Self, KitchenError> {
        config.validate()?;
        let menu = config
            .orders
            .menu
            .iter()
            .map(|name| {
                catalog
                    .food_id(name)
                    .ok_or_else(|| ConfigError::UnknownMenuFood(name.clone()))
            })
            .collect::<Result<Vec<FoodId>, _>>()?;

        let tps = config.ticks_per_second;
        let orders = OrderManager::new(menu, config.orders.timing(tps), config.seed);
        let conveyor = Conveyor::new(config.conveyor.timing(tps));
        let shift = ShiftClock::new(config.shift_seconds.map(|s| config.ticks(s)));

        Ok(Self {
            catalog,
            config,
            sim_state: SimState::new(),
            paused: false,
            stations: SlotMap::with_key(),
            conveyor,
            orders,
            shift,
            scoreboard: Scoreboard::default(),
            event_bus: EventBus::default(),
        })
    }

    /// Build the catalog and the kitchen in one go.
    pub fn from_builder(builder: CatalogBuilder, config: KitchenConfig) -> Result<Self, KitchenError> {
        Self::new(builder.build()?, config)
    }

    // -----------------------------------------------------------------------
    // Layout
    // -----------------------------------------------------------------------

    pub fn add_station(&mut self, kind: StationKind) -> Result<StationId, ConfigError> {
        validate_station(&kind)?;
        Ok(self.stations.insert(Station::new(kind)))
    }

    /// Add a station pre-seeded with an item. A seeded automatic station
    /// reports `PrepStarted` on the next delivery, so subscribers added
    /// after the layout still see it.
    pub fn add_station_with_item(
        &mut self,
        kind: StationKind,
        item: KitchenItem,
    ) -> Result<StationId, ConfigError> {
        validate_station(&kind)?;
        let (station, notes) = Station::with_item(&self.catalog, kind, item);
        let id = self.stations.insert(station);
        let now = self.sim_state.tick;
        for note in notes {
            self.emit_station_note(id, note, now);
        }
        Ok(id)
    }

    pub fn add_belt(&mut self, direction: BeltDirection) -> BeltId {
        self.conveyor.add_belt(direction)
    }

    // -----------------------------------------------------------------------
    // Actor calls
    // -----------------------------------------------------------------------

    /// An actor holding `item` (or nothing) interacts with a station. Unknown
    /// stations hand the item straight back.
    pub fn interact(&mut self, station: StationId, item: Option<KitchenItem>) -> InteractionResponse {
        let now = self.sim_state.tick;
        let Some(target) = self.stations.get_mut(station) else {
            log::warn!("interaction with unknown station {station:?}");
            return InteractionResponse::refused(item);
        };
        let report = target.interact(&self.catalog, item);
        log::debug!("station {station:?}: {:?}", report.response.result);

        if let Some(event) = interaction_event(report.response.result, InteractionSite::Station(station), now) {
            self.emit(event);
        }
        for note in report.notes {
            self.emit_station_note(station, note, now);
        }
        self.flush();
        report.response
    }

    /// Sustained-action signal on a manual station. Returns whether the
    /// station is preparing afterwards.
    pub fn interact_with_task(&mut self, station: StationId) -> bool {
        let now = self.sim_state.tick;
        let Some(target) = self.stations.get_mut(station) else {
            log::warn!("task signal for unknown station {station:?}");
            return false;
        };
        let notes = target.interact_with_task(&self.catalog);
        let preparing = target.is_preparing();
        for note in notes {
            self.emit_station_note(station, note, now);
        }
        self.flush();
        preparing
    }

    pub fn interact_belt(&mut self, belt: BeltId, item: Option<KitchenItem>) -> InteractionResponse {
        let now = self.sim_state.tick;
        let response = self.conveyor.interact(belt, item, now);
        if let Some(event) = interaction_event(response.result, InteractionSite::Belt(belt), now) {
            self.emit(event);
        }
        self.flush();
        response
    }

    pub fn start_shift(&mut self) -> bool {
        let now = self.sim_state.tick;
        if !self.shift.start(now) {
            return false;
        }
        log::info!("shift started at tick {now}");
        self.emit(Event::ShiftStarted { tick: now });
        self.orders.start(now);
        self.conveyor.prime(now, &self.catalog);
        self.flush();
        true
    }

    /// End a running shift: stop spawning and drop every pending order.
    pub fn end_shift(&mut self) -> bool {
        let ended = self.finish_shift();
        self.flush();
        ended
    }

    pub fn add_random_order(&mut self) -> Option<OrderId> {
        let id = self.orders.add_random_order(self.sim_state.tick);
        self.flush();
        id
    }

    pub fn add_order(&mut self, food: FoodId, max_wait: Ticks) -> OrderId {
        let id = self.orders.add_order(food, self.sim_state.tick, max_wait);
        self.flush();
        id
    }

    pub fn complete_order(
        &mut self,
        food: FoodId,
        toppings: &[FoodId],
        has_plate: bool,
    ) -> CompletionOutcome {
        let outcome = self
            .orders
            .complete_order(&self.catalog, food, toppings, has_plate);
        self.flush();
        outcome
    }

    /// Hand an item straight to the order book.
    pub fn deliver(&mut self, item: &KitchenItem) -> CompletionOutcome {
        let outcome = self.orders.deliver(&self.catalog, item, self.sim_state.tick);
        self.flush();
        outcome
    }

    pub fn expire_order(&mut self, order: OrderId) -> bool {
        let expired = self.orders.expire_order(order).is_some();
        self.flush();
        expired
    }

    // -----------------------------------------------------------------------
    // Event system
    // -----------------------------------------------------------------------

    pub fn on(&mut self, kind: EventKind, listener: Listener) -> SubscriptionId {
        self.event_bus.on(kind, listener)
    }

    pub fn on_filtered(
        &mut self,
        kind: EventKind,
        priority: SubscriberPriority,
        filter: Option<EventFilter>,
        listener: Listener,
    ) -> SubscriptionId {
        self.event_bus.on_filtered(kind, priority, filter, listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.event_bus.unsubscribe(id)
    }

    pub fn suppress_event(&mut self, kind: EventKind) {
        self.event_bus.suppress(kind);
    }

    // -----------------------------------------------------------------------
    // Advance
    // -----------------------------------------------------------------------

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Run `steps` ticks, stopping early if the shift runs out.
    pub fn advance(&mut self, steps: u64) -> AdvanceResult {
        let mut result = AdvanceResult::default();
        if self.paused {
            return result;
        }
        for _ in 0..steps {
            result.steps_run += 1;
            if self.step_internal() {
                result.shift_ended = true;
                break;
            }
        }
        result
    }

    pub fn step(&mut self) -> AdvanceResult {
        self.advance(1)
    }

    /// One tick. Returns whether the shift ended during it.
    fn step_internal(&mut self) -> bool {
        self.sim_state.tick += 1;
        let now = self.sim_state.tick;

        let mut station_notes = Vec::new();
        for (id, station) in self.stations.iter_mut() {
            for note in station.tick(&self.catalog) {
                station_notes.push((id, note));
            }
        }
        for (id, note) in station_notes {
            self.emit_station_note(id, note, now);
        }

        self.conveyor.tick(now, &self.catalog, &mut self.orders);
        self.orders.tick(now);

        let shift_ended = self.shift.is_due(now) && self.finish_shift();
        self.flush();
        shift_ended
    }

    fn finish_shift(&mut self) -> bool {
        if !self.shift.end() {
            return false;
        }
        let now = self.sim_state.tick;
        self.orders.stop();
        log::info!("shift over at tick {now}: {}", self.scoreboard);
        self.emit(Event::ShiftEnded { tick: now });
        true
    }

    // -----------------------------------------------------------------------
    // Internal: events
    // -----------------------------------------------------------------------

    fn emit(&mut self, event: Event) {
        self.scoreboard.record(&event);
        self.event_bus.emit(event);
    }

    fn emit_station_note(&mut self, station: StationId, note: StationNote, tick: Ticks) {
        let event = match note {
            StationNote::PrepStarted => Event::PrepStarted { station, tick },
            StationNote::PrepEnded => Event::PrepEnded { station, tick },
            StationNote::PrepPaused => Event::PrepPaused { station, tick },
            StationNote::FoodBurnt { food } => {
                log::debug!("station {station:?} burnt {}", self.catalog.name(food));
                Event::FoodBurnt { station, food, tick }
            }
            StationNote::Prepared { from, to } => Event::FoodPrepared {
                station,
                from,
                to,
                tick,
            },
        };
        self.emit(event);
    }

    /// Turn order and conveyor notes into events, then deliver everything
    /// buffered so far.
    fn flush(&mut self) {
        let tick = self.sim_state.tick;
        for note in self.conveyor.drain_notes() {
            let event = match note {
                ConveyorNote::SentOff { belt } => Event::PlateSentOff { belt, tick },
                ConveyorNote::PlateReturned { belt } => Event::PlateReturned { belt, tick },
                ConveyorNote::Delivered { .. } => continue,
            };
            self.emit(event);
        }
        for note in self.orders.drain_notes() {
            let event = match note {
                OrderNote::Created { order, food } => Event::OrderCreated { order, food, tick },
                OrderNote::Completed { order, food, score } => Event::OrderCompleted {
                    order,
                    food,
                    score,
                    tick,
                },
                OrderNote::Expired {
                    order,
                    food,
                    reason,
                } => Event::OrderExpired {
                    order,
                    food,
                    reason,
                    tick,
                },
                OrderNote::NoPlate { order, food } => Event::NoPlateWarning { order, food, tick },
            };
            self.emit(event);
        }
        self.event_bus.deliver();
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &KitchenConfig {
        &self.config
    }

    pub fn tick(&self) -> Ticks {
        self.sim_state.tick
    }

    /// Convert seconds to ticks at this kitchen's tick rate.
    pub fn ticks(&self, seconds: f64) -> Ticks {
        self.config.ticks(seconds)
    }

    pub fn food_id(&self, name: &str) -> Option<FoodId> {
        self.catalog.food_id(name)
    }

    pub fn station(&self, id: StationId) -> Option<&Station> {
        self.stations.get(id)
    }

    pub fn stations(&self) -> impl Iterator<Item = (StationId, &Station)> {
        self.stations.iter()
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    pub fn conveyor(&self) -> &Conveyor {
        &self.conveyor
    }

    pub fn orders(&self) -> &OrderManager {
        &self.orders
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    pub fn shift_state(&self) -> ShiftState {
        self.shift.state()
    }

    pub fn shift_remaining(&self) -> Option<Ticks> {
        self.shift.remaining(self.sim_state.tick)
    }
}

fn validate_station(kind: &StationKind) -> Result<(), ConfigError> {
    match kind {
        StationKind::AutomaticPrep { rate, .. } | StationKind::ManualPrep { rate, .. }
            if *rate <= Fixed64::ZERO =>
        {
            Err(ConfigError::ZeroPrepRate)
        }
        _ => Ok(()),
    }
}

fn interaction_event(result: InteractionResult, site: InteractionSite, tick: Ticks) -> Option<Event> {
    match result {
        InteractionResult::None => None,
        InteractionResult::PlacedByPlayer | InteractionResult::PlacedObjectByPlayer => {
            Some(Event::ItemPlaced { site, tick })
        }
        InteractionResult::TakenByPlayer => Some(Event::ItemTaken { site, tick }),
        InteractionResult::CombinedByPlayer => Some(Event::ItemCombined { site, tick }),
    }
}
