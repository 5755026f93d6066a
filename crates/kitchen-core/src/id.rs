use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a countertop station in the kitchen.
    pub struct StationId;

    /// Identifies a conveyor belt.
    pub struct BeltId;

    /// Identifies an order in the order book.
    pub struct OrderId;

    /// Identifies a scheduled timer task.
    pub struct TaskId;

    /// Identifies an event subscription.
    pub struct SubscriptionId;
}

/// Identifies a food definition in the catalog. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FoodId(pub u32);
