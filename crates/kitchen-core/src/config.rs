//! Kitchen configuration.
//!
//! Durations are given in seconds and converted to ticks once, at kitchen
//! construction. Everything inside the tick loop works in whole ticks.

use crate::fixed::{seconds_to_ticks, Ticks};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KitchenConfig {
    pub ticks_per_second: u32,
    pub seed: u64,
    /// Shift length. `None` runs until [`crate::kitchen::Kitchen::end_shift`].
    pub shift_seconds: Option<f64>,
    pub orders: OrderConfig,
    pub conveyor: ConveyorConfig,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: 50,
            seed: 0,
            shift_seconds: None,
            orders: OrderConfig::default(),
            conveyor: ConveyorConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderConfig {
    /// Food identifiers customers may order.
    pub menu: Vec<String>,
    /// Spawn interval is drawn from `[50 / rate, 70 / rate)` seconds.
    pub order_rate: f64,
    /// Max wait is drawn from `[timeout, 2 * timeout)` seconds.
    pub order_timeout: f64,
    pub score_min: u32,
    pub score_max: u32,
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            menu: Vec::new(),
            order_rate: 1.0,
            order_timeout: 60.0,
            score_min: 10,
            score_max: 30,
        }
    }
}

/// Order timing resolved to ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTiming {
    pub spawn_min: Ticks,
    pub spawn_max: Ticks,
    pub wait_min: Ticks,
    pub wait_max: Ticks,
    pub score_min: u32,
    pub score_max: u32,
}

impl OrderConfig {
    pub fn timing(&self, ticks_per_second: u32) -> OrderTiming {
        OrderTiming {
            spawn_min: seconds_to_ticks(50.0 / self.order_rate, ticks_per_second),
            spawn_max: seconds_to_ticks(70.0 / self.order_rate, ticks_per_second),
            wait_min: seconds_to_ticks(self.order_timeout, ticks_per_second),
            wait_max: seconds_to_ticks(self.order_timeout * 2.0, ticks_per_second),
            score_min: self.score_min,
            score_max: self.score_max,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConveyorConfig {
    /// Time a send-off belt takes to carry its item to the far end.
    pub travel_seconds: f64,
    pub return_delay_seconds: f64,
    pub retry_seconds: f64,
    pub return_plates: bool,
    pub return_dirty_plates: bool,
}

impl Default for ConveyorConfig {
    fn default() -> Self {
        Self {
            travel_seconds: 1.5,
            return_delay_seconds: 5.0,
            retry_seconds: 1.0,
            return_plates: true,
            return_dirty_plates: false,
        }
    }
}

/// Conveyor timing resolved to ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConveyorTiming {
    pub travel: Ticks,
    pub return_delay: Ticks,
    /// Never zero, so a retry always lands on a later tick.
    pub retry: Ticks,
    pub return_plates: bool,
    pub return_dirty_plates: bool,
}

impl ConveyorConfig {
    pub fn timing(&self, ticks_per_second: u32) -> ConveyorTiming {
        ConveyorTiming {
            travel: seconds_to_ticks(self.travel_seconds, ticks_per_second),
            return_delay: seconds_to_ticks(self.return_delay_seconds, ticks_per_second),
            retry: seconds_to_ticks(self.retry_seconds, ticks_per_second).max(1),
            return_plates: self.return_plates,
            return_dirty_plates: self.return_dirty_plates,
        }
    }
}

impl KitchenConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ticks_per_second == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        let positive = [
            ("orders.order_rate", self.orders.order_rate),
            ("orders.order_timeout", self.orders.order_timeout),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { name, value });
            }
        }
        let non_negative = [
            ("conveyor.travel_seconds", self.conveyor.travel_seconds),
            ("conveyor.return_delay_seconds", self.conveyor.return_delay_seconds),
            ("conveyor.retry_seconds", self.conveyor.retry_seconds),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Negative { name, value });
            }
        }
        if let Some(value) = self.shift_seconds
            && !(value.is_finite() && value > 0.0)
        {
            return Err(ConfigError::NotPositive {
                name: "shift_seconds",
                value,
            });
        }
        if self.orders.score_min > self.orders.score_max {
            return Err(ConfigError::InvertedScoreRange {
                min: self.orders.score_min,
                max: self.orders.score_max,
            });
        }
        Ok(())
    }

    pub fn ticks(&self, seconds: f64) -> Ticks {
        seconds_to_ticks(seconds, self.ticks_per_second)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("ticks_per_second must be non-zero")]
    ZeroTickRate,
    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f64 },
    #[error("score range is inverted: {min} > {max}")]
    InvertedScoreRange { min: u32, max: u32 },
    #[error("station preparation rate must be positive")]
    ZeroPrepRate,
    #[error("menu food not in catalog: {0}")]
    UnknownMenuFood(String),
}
