use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
pub type Fixed64 = I32F32;

/// Ticks are the atomic unit of kitchen time.
pub type Ticks = u64;

/// Convert an f64 to Fixed64. Use only for initialization, never in the tick loop.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Convert Fixed64 to f64. Use only for display.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// Convert a duration in seconds to whole ticks, rounding up. Negative and
/// non-finite durations clamp to zero.
pub fn seconds_to_ticks(seconds: f64, ticks_per_second: u32) -> Ticks {
    let ticks = seconds * f64::from(ticks_per_second);
    if !ticks.is_finite() || ticks <= 0.0 {
        return 0;
    }
    ticks.ceil() as Ticks
}
