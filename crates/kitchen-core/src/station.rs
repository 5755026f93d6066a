//! Stations: a slot plus behaviour selected by [`StationKind`].
//!
//! Plain counters defer to [`interaction::resolve`]. Preparation stations
//! filter what they accept by preparation method and own a [`PrepMachine`];
//! spawners and the garbage are fixed-function.
//!
//! Every change of slot contents bumps the station generation. Preparation
//! runs record the generation they started under, and a completion that no
//! longer matches is discarded.

use crate::catalog::{Catalog, PrepMethod, PrepSpeed};
use crate::fixed::Fixed64;
use crate::id::FoodId;
use crate::interaction::{self, InteractionResponse, InteractionResult};
use crate::item::KitchenItem;
use crate::prep::{PrepMachine, PrepMode, PrepPhase, PrepTick};
use serde::{Deserialize, Serialize};

/// Station behaviour. Rates are progress units per tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StationKind {
    Counter,
    AutomaticPrep { method: PrepMethod, rate: Fixed64 },
    ManualPrep { method: PrepMethod, rate: Fixed64 },
    /// Infinite dispenser. `None` hands out empty plates.
    Spawner { food: Option<FoodId> },
    Garbage { destroy_plates: bool },
}

impl StationKind {
    pub fn method(&self) -> Option<PrepMethod> {
        match self {
            StationKind::AutomaticPrep { method, .. } | StationKind::ManualPrep { method, .. } => {
                Some(*method)
            }
            _ => None,
        }
    }

    fn prep_machine(&self) -> Option<PrepMachine> {
        match self {
            StationKind::AutomaticPrep { rate, .. } => {
                Some(PrepMachine::new(PrepMode::Automatic, *rate))
            }
            StationKind::ManualPrep { rate, .. } => Some(PrepMachine::new(PrepMode::Manual, *rate)),
            _ => None,
        }
    }
}

/// Things a station reports besides the interaction result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationNote {
    PrepStarted,
    PrepEnded,
    PrepPaused,
    FoodBurnt { food: FoodId },
    /// A preparation transformed `from`. `to` is `None` when the food was
    /// reduced to an empty plate.
    Prepared { from: FoodId, to: Option<FoodId> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationReport {
    pub response: InteractionResponse,
    pub notes: Vec<StationNote>,
}

impl StationReport {
    fn plain(response: InteractionResponse) -> Self {
        Self {
            response,
            notes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Station {
    kind: StationKind,
    slot: Option<KitchenItem>,
    prep: Option<PrepMachine>,
    generation: u64,
}

impl Station {
    pub fn new(kind: StationKind) -> Self {
        let prep = kind.prep_machine();
        let slot = match &kind {
            StationKind::Spawner { food: Some(food) } => Some(KitchenItem::food(*food)),
            StationKind::Spawner { food: None } => Some(KitchenItem::plate()),
            _ => None,
        };
        Self {
            kind,
            slot,
            prep,
            generation: 0,
        }
    }

    /// Station pre-seeded with an item. Spawners and the garbage ignore the
    /// seed. Seeded automatic stations start preparing straight away and
    /// report it in the returned notes.
    pub fn with_item(
        catalog: &Catalog,
        kind: StationKind,
        item: KitchenItem,
    ) -> (Self, Vec<StationNote>) {
        let mut station = Self::new(kind);
        let mut notes = Vec::new();
        if matches!(
            station.kind,
            StationKind::Spawner { .. } | StationKind::Garbage { .. }
        ) {
            return (station, notes);
        }
        station.slot = Some(item);
        station.generation += 1;
        if matches!(station.kind, StationKind::AutomaticPrep { .. }) {
            station.begin_automatic(catalog, &mut notes);
        }
        (station, notes)
    }

    pub fn kind(&self) -> &StationKind {
        &self.kind
    }

    pub fn item(&self) -> Option<&KitchenItem> {
        self.slot.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn progress(&self) -> Option<Fixed64> {
        self.prep.as_ref().map(PrepMachine::progress)
    }

    pub fn phase(&self) -> Option<PrepPhase> {
        self.prep.as_ref().map(PrepMachine::phase)
    }

    /// Whether a preparation is running or paused on this station.
    pub fn is_preparing(&self) -> bool {
        self.prep.as_ref().is_some_and(PrepMachine::is_active)
    }

    pub fn interact(&mut self, catalog: &Catalog, incoming: Option<KitchenItem>) -> StationReport {
        match self.kind {
            StationKind::Counter => {
                let response = interaction::resolve(catalog, &mut self.slot, incoming);
                if response.result != InteractionResult::None {
                    self.generation += 1;
                }
                StationReport::plain(response)
            }
            StationKind::AutomaticPrep { method, .. } => {
                self.interact_prep(catalog, method, PrepMode::Automatic, incoming)
            }
            StationKind::ManualPrep { method, .. } => {
                self.interact_prep(catalog, method, PrepMode::Manual, incoming)
            }
            StationKind::Spawner { .. } => self.interact_spawner(incoming),
            StationKind::Garbage { destroy_plates } => {
                self.interact_garbage(catalog, destroy_plates, incoming)
            }
        }
    }

    /// Sustained-action signal from an actor working a manual station.
    /// Starts a run when idle, resumes it when paused.
    pub fn interact_with_task(&mut self, catalog: &Catalog) -> Vec<StationNote> {
        let mut notes = Vec::new();
        let StationKind::ManualPrep { method, .. } = self.kind else {
            return notes;
        };
        let Some(def) = self
            .slot
            .as_ref()
            .and_then(|item| item.food)
            .and_then(|food| catalog.get(food))
        else {
            return notes;
        };
        if def.method != method {
            return notes;
        }
        let generation = self.generation;
        let Some(prep) = self.prep.as_mut() else {
            return notes;
        };
        match prep.phase() {
            PrepPhase::Idle | PrepPhase::Complete => {
                prep.start(generation);
                notes.push(StationNote::PrepStarted);
            }
            PrepPhase::Paused => {
                prep.signal();
                notes.push(StationNote::PrepStarted);
            }
            PrepPhase::InProgress => {
                prep.signal();
            }
        }
        notes
    }

    /// Advance any running preparation by one tick.
    pub fn tick(&mut self, catalog: &Catalog) -> Vec<StationNote> {
        let mut notes = Vec::new();
        let Some(prep) = self.prep.as_mut() else {
            return notes;
        };
        match prep.tick() {
            PrepTick::Idle | PrepTick::Advanced => {}
            PrepTick::Paused => notes.push(StationNote::PrepPaused),
            PrepTick::Completed { occupant } => {
                if occupant != self.generation {
                    log::warn!(
                        "discarding stale preparation (run {occupant}, station at {})",
                        self.generation
                    );
                    prep.reset();
                    return notes;
                }
                self.complete(catalog, &mut notes);
            }
        }
        notes
    }

    // -- Preparation stations --

    fn interact_prep(
        &mut self,
        catalog: &Catalog,
        method: PrepMethod,
        mode: PrepMode,
        incoming: Option<KitchenItem>,
    ) -> StationReport {
        let Some(mut incoming) = incoming else {
            let Some(item) = self.slot.take() else {
                return StationReport::plain(InteractionResponse::refused(None));
            };
            self.generation += 1;
            let mut notes = Vec::new();
            if let Some(prep) = self.prep.as_mut() {
                if prep.is_active() {
                    notes.push(StationNote::PrepEnded);
                }
                prep.reset();
            }
            return StationReport {
                response: InteractionResponse::new(InteractionResult::TakenByPlayer, Some(item)),
                notes,
            };
        };

        if self.slot.is_some() {
            return StationReport::plain(InteractionResponse::refused(Some(incoming)));
        }
        let Some(food) = incoming.food else {
            return StationReport::plain(InteractionResponse::refused(Some(incoming)));
        };
        let accepted = catalog.get(food).is_some_and(|def| def.method == method);
        if !accepted {
            return StationReport::plain(InteractionResponse::refused(Some(incoming)));
        }

        let keep_whole = mode == PrepMode::Manual && method == PrepMethod::Wash;
        let response = if incoming.plate && !keep_whole {
            incoming.plate = false;
            self.slot = Some(incoming);
            InteractionResponse::new(
                InteractionResult::PlacedObjectByPlayer,
                Some(KitchenItem::plate()),
            )
        } else {
            self.slot = Some(incoming);
            InteractionResponse::new(InteractionResult::PlacedByPlayer, None)
        };
        self.generation += 1;

        let mut notes = Vec::new();
        match mode {
            PrepMode::Automatic => self.begin_automatic(catalog, &mut notes),
            PrepMode::Manual => self.transform_instant(catalog, &mut notes),
        }
        StationReport { response, notes }
    }

    /// Start preparing whatever sits in the slot, transforming instant foods
    /// on the spot.
    fn begin_automatic(&mut self, catalog: &Catalog, notes: &mut Vec<StationNote>) {
        self.transform_instant(catalog, notes);
        if self.matches_method(catalog, PrepSpeed::Normal) {
            let generation = self.generation;
            if let Some(prep) = self.prep.as_mut() {
                prep.start(generation);
                notes.push(StationNote::PrepStarted);
            }
        }
    }

    /// Apply instant preparations until the food stops qualifying. Bounded
    /// by the catalog size so a cyclic catalog cannot spin forever.
    fn transform_instant(&mut self, catalog: &Catalog, notes: &mut Vec<StationNote>) {
        for _ in 0..catalog.len() {
            if !self.matches_method(catalog, PrepSpeed::Instant) {
                return;
            }
            self.transform(catalog, notes);
        }
    }

    fn matches_method(&self, catalog: &Catalog, speed: PrepSpeed) -> bool {
        let Some(method) = self.kind.method() else {
            return false;
        };
        self.slot
            .as_ref()
            .and_then(|item| item.food)
            .and_then(|food| catalog.get(food))
            .is_some_and(|def| def.method == method && def.speed == speed && method != PrepMethod::None)
    }

    fn complete(&mut self, catalog: &Catalog, notes: &mut Vec<StationNote>) {
        self.transform(catalog, notes);
        self.generation += 1;
        let automatic = matches!(self.kind, StationKind::AutomaticPrep { .. });
        if automatic {
            self.transform_instant(catalog, notes);
        }
        let restart = automatic && self.matches_method(catalog, PrepSpeed::Normal);
        let generation = self.generation;
        if let Some(prep) = self.prep.as_mut() {
            if restart {
                prep.start(generation);
            } else {
                prep.reset();
                notes.push(StationNote::PrepEnded);
            }
        }
    }

    /// Replace the slot's food with its preparation result.
    fn transform(&mut self, catalog: &Catalog, notes: &mut Vec<StationNote>) {
        let automatic = matches!(self.kind, StationKind::AutomaticPrep { .. });
        let Some(item) = self.slot.as_mut() else {
            return;
        };
        let Some(from) = item.food else {
            return;
        };
        let Some(def) = catalog.get(from) else {
            return;
        };
        let plate = item.plate && !automatic;

        match def.result {
            Some(to) => {
                item.init(catalog, Some(to), plate);
                let burnt = catalog.get(to).is_some_and(|d| d.tags.burnt);
                if burnt {
                    item.clear_toppings();
                    notes.push(StationNote::FoodBurnt { food: to });
                }
                log::debug!("prepared {} -> {}", def.name, catalog.name(to));
                notes.push(StationNote::Prepared {
                    from,
                    to: Some(to),
                });
            }
            None if def.tags.plate_residue => {
                item.init(catalog, None, true);
                log::debug!("prepared {} -> empty plate", def.name);
                notes.push(StationNote::Prepared { from, to: None });
            }
            None => {}
        }
    }

    // -- Fixed-function stations --

    fn interact_spawner(&mut self, incoming: Option<KitchenItem>) -> StationReport {
        if incoming.is_some() {
            return StationReport::plain(InteractionResponse::refused(incoming));
        }
        StationReport::plain(InteractionResponse::new(
            InteractionResult::TakenByPlayer,
            self.slot.clone(),
        ))
    }

    fn interact_garbage(
        &mut self,
        catalog: &Catalog,
        destroy_plates: bool,
        incoming: Option<KitchenItem>,
    ) -> StationReport {
        let Some(incoming) = incoming else {
            return StationReport::plain(InteractionResponse::refused(None));
        };
        if incoming.food.is_none() {
            return StationReport::plain(InteractionResponse::refused(Some(incoming)));
        }
        let dirty = incoming
            .food
            .and_then(|food| catalog.get(food))
            .is_some_and(|def| def.tags.dirty_plate);
        if dirty {
            return StationReport::plain(InteractionResponse::refused(Some(incoming)));
        }
        if incoming.plate && !destroy_plates {
            return StationReport::plain(InteractionResponse::refused(Some(KitchenItem::plate())));
        }
        StationReport::plain(InteractionResponse::new(
            InteractionResult::PlacedByPlayer,
            None,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{self, ReferenceMenu};

    fn fryer(rate: u32) -> StationKind {
        StationKind::AutomaticPrep {
            method: PrepMethod::Fry,
            rate: Fixed64::from_num(rate),
        }
    }

    fn chopping_board(rate: u32) -> StationKind {
        StationKind::ManualPrep {
            method: PrepMethod::Chop,
            rate: Fixed64::from_num(rate),
        }
    }

    fn tick_n(station: &mut Station, m: &ReferenceMenu, n: u32) -> Vec<StationNote> {
        let mut notes = Vec::new();
        for _ in 0..n {
            notes.extend(station.tick(&m.catalog));
        }
        notes
    }

    #[test]
    fn fryer_refuses_wrong_method() {
        let m = test_utils::reference_menu();
        let mut s = Station::new(fryer(10));
        let r = s.interact(&m.catalog, Some(KitchenItem::food(m.lettuce)));
        assert_eq!(r.response.result, InteractionResult::None);
        assert_eq!(r.response.item, Some(KitchenItem::food(m.lettuce)));
        assert!(s.item().is_none());
    }

    #[test]
    fn fryer_cooks_after_max_over_rate_ticks() {
        let m = test_utils::reference_menu();
        let mut s = Station::new(fryer(10));
        let r = s.interact(&m.catalog, Some(KitchenItem::food(m.patty_raw)));
        assert_eq!(r.response.result, InteractionResult::PlacedByPlayer);
        assert_eq!(r.notes, vec![StationNote::PrepStarted]);

        assert!(tick_n(&mut s, &m, 9).is_empty());
        assert_eq!(s.item().unwrap().food, Some(m.patty_raw));
        let notes = s.tick(&m.catalog);
        assert!(notes.contains(&StationNote::Prepared {
            from: m.patty_raw,
            to: Some(m.patty_cooked)
        }));
        assert_eq!(s.item().unwrap().food, Some(m.patty_cooked));
        // Cooked patties keep frying toward burnt.
        assert!(s.is_preparing());
    }

    #[test]
    fn fryer_burns_and_stops() {
        let m = test_utils::reference_menu();
        let mut s = Station::new(fryer(50));
        s.interact(&m.catalog, Some(KitchenItem::food(m.patty_raw)));
        let notes = tick_n(&mut s, &m, 4);
        assert!(notes.contains(&StationNote::FoodBurnt {
            food: m.patty_burnt
        }));
        assert!(notes.contains(&StationNote::PrepEnded));
        assert_eq!(s.item().unwrap().food, Some(m.patty_burnt));
        assert!(!s.is_preparing());
    }

    #[test]
    fn plated_food_leaves_its_plate_with_the_actor() {
        let m = test_utils::reference_menu();
        let mut s = Station::new(fryer(10));
        let r = s.interact(&m.catalog, Some(KitchenItem::plated(m.patty_raw)));
        assert_eq!(r.response.result, InteractionResult::PlacedObjectByPlayer);
        assert_eq!(r.response.item, Some(KitchenItem::plate()));
        assert!(!s.item().unwrap().plate);
    }

    #[test]
    fn instant_food_transforms_on_placement() {
        let m = test_utils::reference_menu();
        let mut s = Station::new(fryer(10));
        let r = s.interact(&m.catalog, Some(KitchenItem::food(m.egg)));
        assert_eq!(r.response.result, InteractionResult::PlacedByPlayer);
        assert_eq!(s.item().unwrap().food, Some(m.egg_fried));
        assert!(!r.notes.contains(&StationNote::PrepStarted));
        assert!(!s.is_preparing());
    }

    #[test]
    fn removal_discards_progress() {
        let m = test_utils::reference_menu();
        let mut s = Station::new(fryer(10));
        s.interact(&m.catalog, Some(KitchenItem::food(m.patty_raw)));
        tick_n(&mut s, &m, 5);
        let r = s.interact(&m.catalog, None);
        assert_eq!(r.response.result, InteractionResult::TakenByPlayer);
        assert_eq!(r.notes, vec![StationNote::PrepEnded]);
        assert_eq!(s.progress(), Some(Fixed64::ZERO));

        s.interact(&m.catalog, r.response.item);
        assert_eq!(s.progress(), Some(Fixed64::ZERO));
        tick_n(&mut s, &m, 9);
        assert_eq!(s.item().unwrap().food, Some(m.patty_raw));
        s.tick(&m.catalog);
        assert_eq!(s.item().unwrap().food, Some(m.patty_cooked));
    }

    #[test]
    fn manual_station_needs_engagement() {
        let m = test_utils::reference_menu();
        let mut s = Station::new(chopping_board(25));
        let r = s.interact(&m.catalog, Some(KitchenItem::food(m.lettuce)));
        assert!(r.notes.is_empty());
        tick_n(&mut s, &m, 10);
        assert_eq!(s.progress(), Some(Fixed64::ZERO));

        assert_eq!(
            s.interact_with_task(&m.catalog),
            vec![StationNote::PrepStarted]
        );
        let mut notes = Vec::new();
        for _ in 0..4 {
            s.interact_with_task(&m.catalog);
            notes.extend(s.tick(&m.catalog));
        }
        assert!(notes.contains(&StationNote::PrepEnded));
        assert_eq!(s.item().unwrap().food, Some(m.lettuce_chopped));
    }

    #[test]
    fn manual_station_pauses_when_left_alone() {
        let m = test_utils::reference_menu();
        let mut s = Station::new(chopping_board(10));
        s.interact(&m.catalog, Some(KitchenItem::food(m.lettuce)));
        s.interact_with_task(&m.catalog);
        let notes = tick_n(&mut s, &m, 6);
        assert_eq!(notes, vec![StationNote::PrepPaused]);
        assert_eq!(s.phase(), Some(PrepPhase::Paused));
        assert_eq!(s.progress(), Some(Fixed64::from_num(50)));

        s.interact_with_task(&m.catalog);
        s.tick(&m.catalog);
        assert_eq!(s.progress(), Some(Fixed64::from_num(60)));
    }

    #[test]
    fn manual_station_keeps_the_plate() {
        let m = test_utils::reference_menu();
        let mut s = Station::new(StationKind::ManualPrep {
            method: PrepMethod::Wash,
            rate: Fixed64::from_num(100),
        });
        let r = s.interact(&m.catalog, Some(KitchenItem::plated(m.dirty_plate)));
        assert_eq!(r.response.result, InteractionResult::PlacedByPlayer);
        s.interact_with_task(&m.catalog);
        let notes = s.tick(&m.catalog);
        assert!(notes.contains(&StationNote::Prepared {
            from: m.dirty_plate,
            to: None
        }));
        assert_eq!(s.item(), Some(&KitchenItem::plate()));
    }

    #[test]
    fn task_signal_ignored_for_wrong_food() {
        let m = test_utils::reference_menu();
        let mut s = Station::new(StationKind::Counter);
        s.interact(&m.catalog, Some(KitchenItem::food(m.lettuce)));
        assert!(s.interact_with_task(&m.catalog).is_empty());
    }

    #[test]
    fn spawner_is_infinite_and_refuses_items() {
        let m = test_utils::reference_menu();
        let mut s = Station::new(StationKind::Spawner { food: Some(m.bun) });
        for _ in 0..3 {
            let r = s.interact(&m.catalog, None);
            assert_eq!(r.response.result, InteractionResult::TakenByPlayer);
            assert_eq!(r.response.item, Some(KitchenItem::food(m.bun)));
        }
        let r = s.interact(&m.catalog, Some(KitchenItem::plate()));
        assert_eq!(r.response.result, InteractionResult::None);

        let mut plates = Station::new(StationKind::Spawner { food: None });
        let r = plates.interact(&m.catalog, None);
        assert_eq!(r.response.item, Some(KitchenItem::plate()));
    }

    #[test]
    fn garbage_scrapes_plates_and_destroys_food() {
        let m = test_utils::reference_menu();
        let mut bin = Station::new(StationKind::Garbage {
            destroy_plates: false,
        });
        let r = bin.interact(&m.catalog, Some(KitchenItem::plated(m.patty_burnt)));
        assert_eq!(r.response.result, InteractionResult::None);
        assert_eq!(r.response.item, Some(KitchenItem::plate()));

        let r = bin.interact(&m.catalog, Some(KitchenItem::food(m.patty_burnt)));
        assert_eq!(r.response.result, InteractionResult::PlacedByPlayer);
        assert!(r.response.item.is_none());
        assert!(bin.item().is_none());

        let r = bin.interact(&m.catalog, Some(KitchenItem::food(m.dirty_plate)));
        assert_eq!(r.response.result, InteractionResult::None);
        assert_eq!(r.response.item, Some(KitchenItem::food(m.dirty_plate)));
    }

    #[test]
    fn garbage_can_destroy_plates() {
        let m = test_utils::reference_menu();
        let mut bin = Station::new(StationKind::Garbage {
            destroy_plates: true,
        });
        let r = bin.interact(&m.catalog, Some(KitchenItem::plated(m.burger)));
        assert_eq!(r.response.result, InteractionResult::PlacedByPlayer);
        assert!(r.response.item.is_none());

        // Nothing to throw away on an empty plate.
        let r = bin.interact(&m.catalog, Some(KitchenItem::plate()));
        assert_eq!(r.response.result, InteractionResult::None);
        assert_eq!(r.response.item, Some(KitchenItem::plate()));
    }

    #[test]
    fn generation_bumps_on_content_change() {
        let m = test_utils::reference_menu();
        let mut s = Station::new(StationKind::Counter);
        assert_eq!(s.generation(), 0);
        s.interact(&m.catalog, Some(KitchenItem::food(m.bun)));
        assert_eq!(s.generation(), 1);
        s.interact(&m.catalog, Some(KitchenItem::food(m.soda)));
        assert_eq!(s.generation(), 1);
        s.interact(&m.catalog, None);
        assert_eq!(s.generation(), 2);
    }

    #[test]
    fn seeded_fryer_starts_cooking() {
        let m = test_utils::reference_menu();
        let (mut s, notes) =
            Station::with_item(&m.catalog, fryer(50), KitchenItem::food(m.patty_raw));
        assert_eq!(notes, vec![StationNote::PrepStarted]);
        tick_n(&mut s, &m, 2);
        assert_eq!(s.item().unwrap().food, Some(m.patty_cooked));
    }

    #[test]
    fn seeded_counter_reports_nothing() {
        let m = test_utils::reference_menu();
        let (s, notes) =
            Station::with_item(&m.catalog, StationKind::Counter, KitchenItem::food(m.bun));
        assert!(notes.is_empty());
        assert_eq!(s.item(), Some(&KitchenItem::food(m.bun)));
    }

    #[test]
    fn completion_for_an_old_occupant_is_discarded() {
        let m = test_utils::reference_menu();
        let mut s = Station::new(fryer(50));
        s.interact(&m.catalog, Some(KitchenItem::food(m.patty_raw)));
        assert!(s.is_preparing());

        // The run was started for the previous occupant.
        s.generation += 1;
        let notes = tick_n(&mut s, &m, 2);
        assert!(notes.is_empty());
        assert_eq!(s.item(), Some(&KitchenItem::food(m.patty_raw)));
        assert!(!s.is_preparing());
    }
}
