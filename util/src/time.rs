//! General time utility functions

use chrono;

/// Number of nanoseconds in a second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Convert a duration into a number of seconds, or `None` if overflow
pub fn duration_to_seconds(duration: chrono::Duration) -> Option<f64> {
    duration
        .num_nanoseconds()
        .map(|ns| ns as f64 / NANOS_PER_SECOND as f64)
}

/// Convert a number of seconds into a duration, or `None` if it is negative or cannot be represented
pub fn seconds_to_duration(seconds: f64) -> Option<std::time::Duration> {
    if seconds.is_finite() && seconds >= 0.0 && seconds < u64::MAX as f64 {
        Some(std::time::Duration::from_secs_f64(seconds))
    } else {
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_duration_to_seconds() {
        assert_eq!(
            duration_to_seconds(chrono::Duration::milliseconds(1500)),
            Some(1.5)
        );
        assert_eq!(duration_to_seconds(chrono::Duration::max_value()), None);
    }

    #[test]
    fn test_seconds_to_duration() {
        assert_eq!(
            seconds_to_duration(0.25),
            Some(std::time::Duration::from_millis(250))
        );
        assert_eq!(seconds_to_duration(0.0), Some(std::time::Duration::from_secs(0)));
        assert_eq!(seconds_to_duration(-1.0), None);
        assert_eq!(seconds_to_duration(std::f64::INFINITY), None);
        assert_eq!(seconds_to_duration(std::f64::NAN), None);
        assert_eq!(seconds_to_duration(1e30), None);
    }
}
