//! Frame cadence computation.

use std::time::Duration;

/// Default inter-frame interval (~60 Hz), applied when the configured rate
/// is degenerate.
pub const DEFAULT_FRAME_INTERVAL_US: i64 = 16_667;

/// Convert a frame-rate fraction into a fixed inter-frame interval.
///
/// The interval is `denominator / numerator` seconds, truncated to whole
/// microseconds. A non-positive component, or an interval that truncates to
/// zero, normalizes to [`DEFAULT_FRAME_INTERVAL_US`] rather than producing a
/// zero-duration busy loop.
pub fn frame_interval(numerator: i32, denominator: i32) -> Duration {
    if numerator <= 0 || denominator <= 0 {
        return Duration::from_micros(DEFAULT_FRAME_INTERVAL_US as u64);
    }

    let period_seconds = denominator as f64 / numerator as f64;
    let mut micros = (period_seconds * 1_000_000.0) as i64;
    if micros <= 0 {
        micros = DEFAULT_FRAME_INTERVAL_US;
    }

    Duration::from_micros(micros as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_from_rate_fraction() {
        assert_eq!(frame_interval(30, 1), Duration::from_micros(33_333));
        assert_eq!(frame_interval(60, 1), Duration::from_micros(16_666));
        assert_eq!(frame_interval(30_000, 1_001), Duration::from_micros(33_366));
        assert_eq!(frame_interval(1, 2), Duration::from_micros(2_000_000));
    }

    #[test]
    fn test_non_positive_components_use_default() {
        assert_eq!(frame_interval(0, 1), Duration::from_micros(16_667));
        assert_eq!(frame_interval(0, 1_000), Duration::from_micros(16_667));
        assert_eq!(frame_interval(30, 0), Duration::from_micros(16_667));
        assert_eq!(frame_interval(-30, 1), Duration::from_micros(16_667));
        assert_eq!(frame_interval(30, -1), Duration::from_micros(16_667));
    }

    #[test]
    fn test_interval_truncating_to_zero_uses_default() {
        assert_eq!(frame_interval(10_000_000, 1), Duration::from_micros(16_667));
    }
}
