//! Plate circulation on conveyor belts.
//!
//! Send-off belts carry whatever the actor puts on them to the far end,
//! where food is offered to a [`DeliverySink`] and the item is destroyed.
//! Each plate that leaves this way is owed back: after a delay the conveyor
//! looks for a free return belt and rolls a fresh plate in, polling again on
//! a fixed interval while every return belt is occupied.

use crate::catalog::Catalog;
use crate::config::ConveyorTiming;
use crate::fixed::Ticks;
use crate::id::BeltId;
use crate::interaction::{InteractionResponse, InteractionResult};
use crate::item::KitchenItem;
use crate::order::{CompletionOutcome, DeliverySink};
use crate::scheduler::Scheduler;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BeltDirection {
    SendOff,
    Return,
}

#[derive(Debug, Clone)]
pub struct Belt {
    pub direction: BeltDirection,
    item: Option<KitchenItem>,
    rolling: bool,
    generation: u64,
}

impl Belt {
    fn new(direction: BeltDirection) -> Self {
        Self {
            direction,
            item: None,
            rolling: false,
            generation: 0,
        }
    }

    pub fn item(&self) -> Option<&KitchenItem> {
        self.item.as_ref()
    }

    pub fn is_rolling(&self) -> bool {
        self.rolling
    }

    pub fn can_accept_plate(&self) -> bool {
        self.item.is_none()
    }

    fn load(&mut self, item: KitchenItem) {
        self.item = Some(item);
        self.rolling = true;
        self.generation += 1;
    }

    fn unload(&mut self) -> Option<KitchenItem> {
        self.rolling = false;
        self.generation += 1;
        self.item.take()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BeltTask {
    Arrive { belt: BeltId, generation: u64 },
    ReturnPlate,
}

/// Conveyor activity reported to the kitchen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConveyorNote {
    SentOff { belt: BeltId },
    Delivered {
        belt: BeltId,
        item: KitchenItem,
        outcome: CompletionOutcome,
    },
    PlateReturned { belt: BeltId },
}

#[derive(Debug, Clone)]
pub struct Conveyor {
    belts: SlotMap<BeltId, Belt>,
    timing: ConveyorTiming,
    timers: Scheduler<BeltTask>,
    pending_returns: u32,
    notes: Vec<ConveyorNote>,
}

impl Conveyor {
    pub fn new(timing: ConveyorTiming) -> Self {
        Self {
            belts: SlotMap::with_key(),
            timing,
            timers: Scheduler::new(),
            pending_returns: 0,
            notes: Vec::new(),
        }
    }

    pub fn add_belt(&mut self, direction: BeltDirection) -> BeltId {
        self.belts.insert(Belt::new(direction))
    }

    pub fn belt(&self, id: BeltId) -> Option<&Belt> {
        self.belts.get(id)
    }

    pub fn belts(&self) -> impl Iterator<Item = (BeltId, &Belt)> {
        self.belts.iter()
    }

    /// Plates sent off and not yet returned.
    pub fn pending_returns(&self) -> u32 {
        self.pending_returns
    }

    /// Roll the opening plate onto a return belt.
    pub fn prime(&mut self, now: Ticks, catalog: &Catalog) {
        if !self.timing.return_plates {
            return;
        }
        if let Some(belt) = self.find_return_belt() {
            self.emit_plate(now, catalog, belt);
        }
    }

    /// An actor interacts with a belt. Empty hands take from a return belt;
    /// an item goes onto an empty send-off belt.
    pub fn interact(
        &mut self,
        belt_id: BeltId,
        incoming: Option<KitchenItem>,
        now: Ticks,
    ) -> InteractionResponse {
        let Some(belt) = self.belts.get_mut(belt_id) else {
            log::warn!("interaction with unknown belt {belt_id:?}");
            return InteractionResponse::refused(incoming);
        };
        match (belt.direction, incoming) {
            (BeltDirection::Return, None) if belt.item.is_some() => {
                let item = belt.unload();
                InteractionResponse::new(InteractionResult::TakenByPlayer, item)
            }
            (BeltDirection::SendOff, Some(item)) if belt.can_accept_plate() => {
                belt.load(item);
                let generation = belt.generation;
                self.timers.schedule(
                    now + self.timing.travel,
                    BeltTask::Arrive {
                        belt: belt_id,
                        generation,
                    },
                );
                log::debug!("belt {belt_id:?} sending off");
                self.notes.push(ConveyorNote::SentOff { belt: belt_id });
                InteractionResponse::new(InteractionResult::PlacedByPlayer, None)
            }
            (_, incoming) => InteractionResponse::refused(incoming),
        }
    }

    /// Fire due arrivals and plate returns.
    pub fn tick(&mut self, now: Ticks, catalog: &Catalog, sink: &mut dyn DeliverySink) {
        for (_, task) in self.timers.drain_due(now) {
            match task {
                BeltTask::Arrive { belt, generation } => {
                    self.arrive(belt, generation, now, catalog, sink);
                }
                BeltTask::ReturnPlate => self.return_plate(now, catalog),
            }
        }
    }

    fn arrive(
        &mut self,
        belt_id: BeltId,
        generation: u64,
        now: Ticks,
        catalog: &Catalog,
        sink: &mut dyn DeliverySink,
    ) {
        let Some(belt) = self.belts.get_mut(belt_id) else {
            return;
        };
        if belt.generation != generation {
            log::debug!("belt {belt_id:?} changed before arrival, dropping");
            return;
        }
        if belt.direction == BeltDirection::Return {
            belt.rolling = false;
            return;
        }
        let Some(item) = belt.unload() else {
            return;
        };

        let outcome = if item.has_food() {
            sink.deliver(catalog, &item, now)
        } else {
            CompletionOutcome::NoMatch
        };
        if item.plate && self.timing.return_plates {
            self.pending_returns += 1;
            self.timers
                .schedule(now + self.timing.return_delay, BeltTask::ReturnPlate);
        }
        self.notes.push(ConveyorNote::Delivered {
            belt: belt_id,
            item,
            outcome,
        });
    }

    fn return_plate(&mut self, now: Ticks, catalog: &Catalog) {
        if self.pending_returns == 0 {
            return;
        }
        match self.find_return_belt() {
            Some(belt) => {
                self.pending_returns -= 1;
                self.emit_plate(now, catalog, belt);
            }
            None => {
                self.timers
                    .schedule(now + self.timing.retry, BeltTask::ReturnPlate);
            }
        }
    }

    fn find_return_belt(&self) -> Option<BeltId> {
        self.belts
            .iter()
            .find(|(_, b)| b.direction == BeltDirection::Return && b.can_accept_plate())
            .map(|(id, _)| id)
    }

    fn emit_plate(&mut self, now: Ticks, catalog: &Catalog, belt_id: BeltId) {
        let plate = match catalog.dirty_plate() {
            Some(dirty) if self.timing.return_dirty_plates => KitchenItem::plated(dirty),
            _ => KitchenItem::plate(),
        };
        if let Some(belt) = self.belts.get_mut(belt_id) {
            belt.load(plate);
            let generation = belt.generation;
            self.timers.schedule(
                now + self.timing.travel,
                BeltTask::Arrive {
                    belt: belt_id,
                    generation,
                },
            );
            log::debug!("belt {belt_id:?} returning a plate");
            self.notes.push(ConveyorNote::PlateReturned { belt: belt_id });
        }
    }

    pub fn drain_notes(&mut self) -> Vec<ConveyorNote> {
        std::mem::take(&mut self.notes)
    }
}
