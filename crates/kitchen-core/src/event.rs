//! Typed kitchen events with per-kind ring buffers.
//!
//! Events are buffered while an operation runs (an interaction, an order
//! call, a tick) and delivered in one batch before that operation returns.
//! Each event kind has its own [`EventBuffer`] with a fixed capacity.
//!
//! Subscribers register for one kind with a priority and an optional filter
//! and get back a [`SubscriptionId`]. Unsubscribing is idempotent.
//!
//! # Suppression
//!
//! Event kinds can be suppressed via [`EventBus::suppress`], which prevents
//! any allocation or recording for that kind.

use crate::fixed::Ticks;
use crate::id::*;
use crate::order::ExpireReason;
use slotmap::SlotMap;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// Where an interaction happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionSite {
    Station(StationId),
    Belt(BeltId),
}

/// A kitchen event. All events carry the tick at which they occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // -- Preparation --
    PrepStarted {
        station: StationId,
        tick: Ticks,
    },
    PrepEnded {
        station: StationId,
        tick: Ticks,
    },
    PrepPaused {
        station: StationId,
        tick: Ticks,
    },
    FoodPrepared {
        station: StationId,
        from: FoodId,
        /// `None` when the food was reduced to an empty plate.
        to: Option<FoodId>,
        tick: Ticks,
    },
    FoodBurnt {
        station: StationId,
        food: FoodId,
        tick: Ticks,
    },

    // -- Interaction --
    ItemPlaced {
        site: InteractionSite,
        tick: Ticks,
    },
    ItemTaken {
        site: InteractionSite,
        tick: Ticks,
    },
    ItemCombined {
        site: InteractionSite,
        tick: Ticks,
    },

    // -- Orders --
    OrderCreated {
        order: OrderId,
        food: FoodId,
        tick: Ticks,
    },
    OrderCompleted {
        order: OrderId,
        food: FoodId,
        score: u32,
        tick: Ticks,
    },
    OrderExpired {
        order: OrderId,
        food: FoodId,
        reason: ExpireReason,
        tick: Ticks,
    },
    NoPlateWarning {
        order: OrderId,
        food: FoodId,
        tick: Ticks,
    },

    // -- Conveyor --
    PlateSentOff {
        belt: BeltId,
        tick: Ticks,
    },
    PlateReturned {
        belt: BeltId,
        tick: Ticks,
    },

    // -- Shift --
    ShiftStarted {
        tick: Ticks,
    },
    ShiftEnded {
        tick: Ticks,
    },
}

/// Discriminant tag for event types, used for subscription and suppression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PrepStarted,
    PrepEnded,
    PrepPaused,
    FoodPrepared,
    FoodBurnt,
    ItemPlaced,
    ItemTaken,
    ItemCombined,
    OrderCreated,
    OrderCompleted,
    OrderExpired,
    NoPlateWarning,
    PlateSentOff,
    PlateReturned,
    ShiftStarted,
    ShiftEnded,
}

/// Total number of event kinds.
const EVENT_KIND_COUNT: usize = 16;

impl EventKind {
    pub const ALL: [EventKind; EVENT_KIND_COUNT] = [
        EventKind::PrepStarted,
        EventKind::PrepEnded,
        EventKind::PrepPaused,
        EventKind::FoodPrepared,
        EventKind::FoodBurnt,
        EventKind::ItemPlaced,
        EventKind::ItemTaken,
        EventKind::ItemCombined,
        EventKind::OrderCreated,
        EventKind::OrderCompleted,
        EventKind::OrderExpired,
        EventKind::NoPlateWarning,
        EventKind::PlateSentOff,
        EventKind::PlateReturned,
        EventKind::ShiftStarted,
        EventKind::ShiftEnded,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

impl Event {
    /// Get the discriminant kind for this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::PrepStarted { .. } => EventKind::PrepStarted,
            Event::PrepEnded { .. } => EventKind::PrepEnded,
            Event::PrepPaused { .. } => EventKind::PrepPaused,
            Event::FoodPrepared { .. } => EventKind::FoodPrepared,
            Event::FoodBurnt { .. } => EventKind::FoodBurnt,
            Event::ItemPlaced { .. } => EventKind::ItemPlaced,
            Event::ItemTaken { .. } => EventKind::ItemTaken,
            Event::ItemCombined { .. } => EventKind::ItemCombined,
            Event::OrderCreated { .. } => EventKind::OrderCreated,
            Event::OrderCompleted { .. } => EventKind::OrderCompleted,
            Event::OrderExpired { .. } => EventKind::OrderExpired,
            Event::NoPlateWarning { .. } => EventKind::NoPlateWarning,
            Event::PlateSentOff { .. } => EventKind::PlateSentOff,
            Event::PlateReturned { .. } => EventKind::PlateReturned,
            Event::ShiftStarted { .. } => EventKind::ShiftStarted,
            Event::ShiftEnded { .. } => EventKind::ShiftEnded,
        }
    }

    pub fn tick(&self) -> Ticks {
        match self {
            Event::PrepStarted { tick, .. }
            | Event::PrepEnded { tick, .. }
            | Event::PrepPaused { tick, .. }
            | Event::FoodPrepared { tick, .. }
            | Event::FoodBurnt { tick, .. }
            | Event::ItemPlaced { tick, .. }
            | Event::ItemTaken { tick, .. }
            | Event::ItemCombined { tick, .. }
            | Event::OrderCreated { tick, .. }
            | Event::OrderCompleted { tick, .. }
            | Event::OrderExpired { tick, .. }
            | Event::NoPlateWarning { tick, .. }
            | Event::PlateSentOff { tick, .. }
            | Event::PlateReturned { tick, .. }
            | Event::ShiftStarted { tick }
            | Event::ShiftEnded { tick } => *tick,
        }
    }
}

// ---------------------------------------------------------------------------
// EventBuffer
// ---------------------------------------------------------------------------

/// A pre-allocated ring buffer of recent events. Fixed capacity; when full,
/// the oldest events are dropped. History only: delivery reads from the
/// bus's pending queues, never from here.
#[derive(Debug)]
pub struct EventBuffer {
    events: Vec<Option<Event>>,
    /// Next write position.
    head: usize,
    len: usize,
    /// Total events ever written (including dropped).
    total_written: u64,
}

impl EventBuffer {
    /// A capacity of 0 is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
            total_written: 0,
        }
    }

    /// Push an event. If full, the oldest event is dropped.
    pub fn push(&mut self, event: Event) {
        let capacity = self.capacity();
        self.events[self.head] = Some(event);
        self.head = (self.head + 1) % capacity;
        if self.len < capacity {
            self.len += 1;
        }
        self.total_written += 1;
    }

    pub fn capacity(&self) -> usize {
        self.events.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        let capacity = self.capacity();
        let start = if self.len < capacity { 0 } else { self.head };
        (0..self.len).filter_map(move |i| self.events[(start + i) % capacity].as_ref())
    }

    /// Remove and return all buffered events, oldest first.
    pub fn drain(&mut self) -> Vec<Event> {
        let capacity = self.capacity();
        let start = if self.len < capacity { 0 } else { self.head };
        let drained = (0..self.len)
            .filter_map(|i| self.events[(start + i) % capacity].take())
            .collect();
        self.head = 0;
        self.len = 0;
        drained
    }
}

// ---------------------------------------------------------------------------
// Subscribers
// ---------------------------------------------------------------------------

/// Receives events read-only.
pub type Listener = Box<dyn FnMut(&Event)>;

/// Optional predicate that filters events for a subscriber.
pub type EventFilter = Box<dyn Fn(&Event) -> bool>;

/// Priority level for event subscribers. Lower priorities run first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SubscriberPriority {
    Pre = 0,
    #[default]
    Normal = 1,
    Post = 2,
}

struct Subscriber {
    kind: EventKind,
    listener: Listener,
    priority: SubscriberPriority,
    filter: Option<EventFilter>,
    insertion_order: u64,
}

impl std::fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriber")
            .field("kind", &self.kind)
            .field("priority", &self.priority)
            .field("filtered", &self.filter.is_some())
            .field("insertion_order", &self.insertion_order)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Holds one pending queue and one history ring per event kind, the
/// subscribers and suppression flags.
pub struct EventBus {
    /// Emitted but not yet delivered. Unbounded.
    pending: [Vec<Event>; EVENT_KIND_COUNT],
    buffers: [Option<EventBuffer>; EVENT_KIND_COUNT],
    suppressed: [bool; EVENT_KIND_COUNT],
    subscribers: SlotMap<SubscriptionId, Subscriber>,
    default_capacity: usize,
    next_insertion_order: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("pending", &self.pending.iter().map(Vec::len).sum::<usize>())
            .field("buffers", &self.buffers)
            .field("suppressed", &self.suppressed)
            .field("subscribers", &self.subscribers.len())
            .field("default_capacity", &self.default_capacity)
            .finish_non_exhaustive()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EventBus {
    pub fn new(default_capacity: usize) -> Self {
        Self {
            pending: Default::default(),
            buffers: Default::default(),
            suppressed: [false; EVENT_KIND_COUNT],
            subscribers: SlotMap::with_key(),
            default_capacity,
            next_insertion_order: 0,
        }
    }

    /// Suppressed kinds are never buffered or delivered.
    pub fn suppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = true;
        self.pending[kind.index()].clear();
        self.buffers[kind.index()] = None;
    }

    pub fn is_suppressed(&self, kind: EventKind) -> bool {
        self.suppressed[kind.index()]
    }

    pub fn emit(&mut self, event: Event) {
        let idx = event.kind().index();
        if self.suppressed[idx] {
            return;
        }
        let capacity = self.default_capacity;
        self.buffers[idx]
            .get_or_insert_with(|| EventBuffer::new(capacity))
            .push(event.clone());
        self.pending[idx].push(event);
    }

    /// Subscribe with normal priority and no filter.
    pub fn on(&mut self, kind: EventKind, listener: Listener) -> SubscriptionId {
        self.on_filtered(kind, SubscriberPriority::Normal, None, listener)
    }

    pub fn on_filtered(
        &mut self,
        kind: EventKind,
        priority: SubscriberPriority,
        filter: Option<EventFilter>,
        listener: Listener,
    ) -> SubscriptionId {
        let insertion_order = self.next_insertion_order;
        self.next_insertion_order += 1;
        self.subscribers.insert(Subscriber {
            kind,
            listener,
            priority,
            filter,
            insertion_order,
        })
    }

    /// Remove a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id).is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Deliver all buffered events, kind by kind, to subscribers ordered by
    /// `(priority, insertion_order)`. Pending queues are empty afterwards.
    pub fn deliver(&mut self) {
        for kind in EventKind::ALL {
            let idx = kind.index();
            if self.pending[idx].is_empty() {
                continue;
            }
            let events = std::mem::take(&mut self.pending[idx]);

            let mut order: Vec<(SubscriberPriority, u64, SubscriptionId)> = self
                .subscribers
                .iter()
                .filter(|(_, s)| s.kind == kind)
                .map(|(id, s)| (s.priority, s.insertion_order, id))
                .collect();
            order.sort_unstable();

            for (_, _, id) in order {
                let Some(sub) = self.subscribers.get_mut(id) else {
                    continue;
                };
                for event in &events {
                    if let Some(filter) = &sub.filter
                        && !filter(event)
                    {
                        continue;
                    }
                    (sub.listener)(event);
                }
            }
        }
    }

    /// Recent events of one kind, delivered or not.
    pub fn buffer(&self, kind: EventKind) -> Option<&EventBuffer> {
        self.buffers[kind.index()].as_ref()
    }

    /// Events of one kind waiting for the next delivery.
    pub fn pending(&self, kind: EventKind) -> usize {
        self.pending[kind.index()].len()
    }

    /// Drop pending events without delivering them.
    pub fn clear(&mut self) {
        for queue in &mut self.pending {
            queue.clear();
        }
    }
}
