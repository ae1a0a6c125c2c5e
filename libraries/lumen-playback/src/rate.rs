//! Playback rate bounds and the rate toggle ladder

/// Slowest accepted playback rate
pub const MIN_RATE: f32 = 0.5;

/// Fastest accepted playback rate
pub const MAX_RATE: f32 = 2.0;

/// Rates visited, in order, by the rate toggle
pub const RATE_LADDER: [f32; 3] = [0.8, 1.0, 1.5];

/// Tolerance used when comparing rates
const RATE_EPSILON: f32 = 1e-4;

/// Whether `rate` is inside `[MIN_RATE, MAX_RATE]`
///
/// NaN is never valid.
pub fn is_valid_rate(rate: f32) -> bool {
    (MIN_RATE..=MAX_RATE).contains(&rate)
}

/// Whether two rates are equal within tolerance
pub fn same_rate(a: f32, b: f32) -> bool {
    (a - b).abs() <= RATE_EPSILON
}

/// Next rate on the ladder after `current`
///
/// Rates on the ladder advance cyclically (0.8 -> 1.0 -> 1.5 -> 0.8).
/// A rate between rungs moves to the next rung above it, wrapping to the
/// first rung past the top.
pub fn next_rate(current: f32) -> f32 {
    if let Some(pos) = RATE_LADDER.iter().position(|r| same_rate(*r, current)) {
        return RATE_LADDER[(pos + 1) % RATE_LADDER.len()];
    }

    RATE_LADDER
        .iter()
        .copied()
        .find(|r| *r > current)
        .unwrap_or(RATE_LADDER[0])
}

/// Label shown on the rate button, e.g. `x1.5`
pub fn format_rate_label(rate: f32) -> String {
    format!("x{:.1}", rate)
}
