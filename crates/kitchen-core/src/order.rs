//! Order lifecycle: spawning, timed expiry and delivery matching.
//!
//! Pending orders live in an arena and a queue kept in creation order.
//! Matching scans the queue front to back and completes at most one order
//! per delivery. Each order owns an expiry task; completing or expiring the
//! order cancels it, so a late timer finds nothing to act on.

use crate::catalog::Catalog;
use crate::config::OrderTiming;
use crate::fixed::Ticks;
use crate::id::{FoodId, OrderId, TaskId};
use crate::item::{topping_set, KitchenItem};
use crate::rng::SimRng;
use crate::scheduler::Scheduler;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderState {
    Pending,
    Completed,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpireReason {
    /// The customer ran out of patience.
    Timeout,
    /// The manager was stopped with the order still pending.
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Target food. Required pizza toppings come from its catalog entry.
    pub food: FoodId,
    pub created_at: Ticks,
    pub max_wait: Ticks,
    pub state: OrderState,
    expiry: Option<TaskId>,
}

impl Order {
    pub fn deadline(&self) -> Ticks {
        self.created_at.saturating_add(self.max_wait)
    }
}

/// Result of offering food to the order book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    Completed { order: OrderId, food: FoodId, score: u32 },
    /// The food matches a pending order but arrived without a plate. The
    /// order stays pending.
    NoPlate { order: OrderId, food: FoodId },
    NoMatch,
}

/// Lifecycle changes reported by the order manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderNote {
    Created { order: OrderId, food: FoodId },
    Completed { order: OrderId, food: FoodId, score: u32 },
    Expired { order: OrderId, food: FoodId, reason: ExpireReason },
    NoPlate { order: OrderId, food: FoodId },
}

/// Where conveyor deliveries end up.
pub trait DeliverySink {
    fn deliver(&mut self, catalog: &Catalog, item: &KitchenItem, now: Ticks) -> CompletionOutcome;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OrderTask {
    Spawn,
    Expire(OrderId),
}

#[derive(Debug, Clone)]
pub struct OrderManager {
    orders: SlotMap<OrderId, Order>,
    queue: Vec<OrderId>,
    menu: Vec<FoodId>,
    timing: OrderTiming,
    rng: SimRng,
    timers: Scheduler<OrderTask>,
    active: bool,
    notes: Vec<OrderNote>,
}

impl OrderManager {
    pub fn new(menu: Vec<FoodId>, timing: OrderTiming, seed: u64) -> Self {
        Self {
            orders: SlotMap::with_key(),
            queue: Vec::new(),
            menu,
            timing,
            rng: SimRng::new(seed),
            timers: Scheduler::new(),
            active: false,
            notes: Vec::new(),
        }
    }

    /// Start the spawn loop: one order right away, then one per randomized
    /// interval until [`stop`](Self::stop).
    pub fn start(&mut self, now: Ticks) {
        if self.active {
            return;
        }
        self.active = true;
        self.spawn(now);
    }

    /// Stop spawning and force-expire every pending order.
    pub fn stop(&mut self) {
        self.active = false;
        self.timers.cancel_where(|t| *t == OrderTask::Spawn);
        for id in std::mem::take(&mut self.queue) {
            self.finish_expired(id, ExpireReason::Shutdown);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Enqueue an order for a random menu item. `None` if the menu is empty.
    pub fn add_random_order(&mut self, now: Ticks) -> Option<OrderId> {
        let Some(index) = self.rng.index(self.menu.len()) else {
            log::warn!("cannot add an order: the menu is empty");
            return None;
        };
        let food = self.menu[index];
        let max_wait = self.rng.range(self.timing.wait_min, self.timing.wait_max);
        Some(self.add_order(food, now, max_wait))
    }

    /// Enqueue an order with an explicit target and patience.
    pub fn add_order(&mut self, food: FoodId, now: Ticks, max_wait: Ticks) -> OrderId {
        let id = self.orders.insert(Order {
            food,
            created_at: now,
            max_wait,
            state: OrderState::Pending,
            expiry: None,
        });
        let task = self
            .timers
            .schedule(now.saturating_add(max_wait), OrderTask::Expire(id));
        if let Some(order) = self.orders.get_mut(id) {
            order.expiry = Some(task);
        }
        self.queue.push(id);
        log::info!("order {id:?} created at tick {now}, waits {max_wait} ticks");
        self.notes.push(OrderNote::Created { order: id, food });
        id
    }

    /// Offer delivered food to the pending orders.
    ///
    /// A delivered pizza matches any pending pizza order whose target is
    /// neither raw nor burnt and whose required toppings equal the delivered
    /// toppings as a set. Other
    /// foods match by identity and need a plate, except drinks.
    pub fn complete_order(
        &mut self,
        catalog: &Catalog,
        food: FoodId,
        toppings: &[FoodId],
        has_plate: bool,
    ) -> CompletionOutcome {
        let Some(delivered) = catalog.get(food) else {
            log::warn!("delivered food {food:?} is not in the catalog");
            return CompletionOutcome::NoMatch;
        };
        let delivered_pizza = delivered.kind.is_pizza();
        let delivered_set = topping_set(toppings);

        let mut hit = None;
        for (index, &id) in self.queue.iter().enumerate() {
            let Some(order) = self.orders.get(id) else {
                continue;
            };
            let Some(target) = catalog.get(order.food) else {
                continue;
            };
            let target_pizza = target.kind.is_pizza() && !target.tags.raw && !target.tags.burnt;

            if delivered_pizza && target_pizza {
                if topping_set(target.kind.toppings()) == delivered_set {
                    hit = Some((index, id, order.food));
                    break;
                }
            } else if order.food == food {
                if has_plate || delivered.kind.is_drink() {
                    hit = Some((index, id, order.food));
                    break;
                }
                log::debug!("order {id:?} matched {} without a plate", delivered.name);
                self.notes.push(OrderNote::NoPlate { order: id, food });
                return CompletionOutcome::NoPlate { order: id, food };
            }
        }

        let Some((index, id, target)) = hit else {
            return CompletionOutcome::NoMatch;
        };
        self.queue.remove(index);
        if let Some(task) = self.orders.remove(id).and_then(|order| order.expiry) {
            self.timers.cancel(task);
        }
        let score = self
            .rng
            .range_inclusive(self.timing.score_min, self.timing.score_max);
        log::info!("order {id:?} completed with {}, +{score}", catalog.name(target));
        self.notes.push(OrderNote::Completed {
            order: id,
            food: target,
            score,
        });
        CompletionOutcome::Completed {
            order: id,
            food: target,
            score,
        }
    }

    /// Expire a pending order as missed. Unknown or finished orders are
    /// ignored.
    pub fn expire_order(&mut self, id: OrderId) -> Option<Order> {
        let index = self.queue.iter().position(|&q| q == id)?;
        self.queue.remove(index);
        self.finish_expired(id, ExpireReason::Timeout)
    }

    fn finish_expired(&mut self, id: OrderId, reason: ExpireReason) -> Option<Order> {
        let mut order = self.orders.remove(id)?;
        if let Some(task) = order.expiry.take() {
            self.timers.cancel(task);
        }
        order.state = OrderState::Expired;
        log::info!("order {id:?} expired ({reason:?})");
        self.notes.push(OrderNote::Expired {
            order: id,
            food: order.food,
            reason,
        });
        Some(order)
    }

    /// Fire due spawn and expiry timers.
    pub fn tick(&mut self, now: Ticks) {
        for (_, task) in self.timers.drain_due(now) {
            match task {
                OrderTask::Spawn if self.active => self.spawn(now),
                OrderTask::Spawn => {}
                OrderTask::Expire(id) => {
                    if self.expire_order(id).is_none() {
                        log::warn!("expiry fired for settled order {id:?}");
                    }
                }
            }
        }
    }

    fn spawn(&mut self, now: Ticks) {
        self.add_random_order(now);
        let pause = self
            .rng
            .range(self.timing.spawn_min, self.timing.spawn_max)
            .max(1);
        self.timers.schedule(now + pause, OrderTask::Spawn);
    }

    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.orders.get(id)
    }

    /// Pending orders in creation order.
    pub fn pending(&self) -> impl Iterator<Item = (OrderId, &Order)> {
        self.queue
            .iter()
            .filter_map(|&id| self.orders.get(id).map(|o| (id, o)))
    }

    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    pub fn drain_notes(&mut self) -> Vec<OrderNote> {
        std::mem::take(&mut self.notes)
    }
}

impl DeliverySink for OrderManager {
    fn deliver(&mut self, catalog: &Catalog, item: &KitchenItem, _now: Ticks) -> CompletionOutcome {
        match item.food {
            Some(food) => self.complete_order(catalog, food, &item.toppings, item.plate),
            None => CompletionOutcome::NoMatch,
        }
    }
}
