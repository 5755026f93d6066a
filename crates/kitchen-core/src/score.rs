use crate::event::Event;
use crate::order::ExpireReason;
use serde::{Deserialize, Serialize};

/// Running totals for a shift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub score: u64,
    pub orders_completed: u32,
    /// Orders that timed out. Orders dropped at shift end do not count.
    pub orders_missed: u32,
    pub food_burnt: u32,
}

impl Scoreboard {
    pub fn record(&mut self, event: &Event) {
        match event {
            Event::OrderCompleted { score, .. } => {
                self.score += u64::from(*score);
                self.orders_completed += 1;
            }
            Event::OrderExpired {
                reason: ExpireReason::Timeout,
                ..
            } => self.orders_missed += 1,
            Event::FoodBurnt { .. } => self.food_burnt += 1,
            _ => {}
        }
    }
}

impl std::fmt::Display for Scoreboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "score {} | completed {} | missed {} | burnt {}",
            self.score, self.orders_completed, self.orders_missed, self.food_burnt
        )
    }
}
