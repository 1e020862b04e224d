//! # Session Clock
//!
//! The telemetry send timestamp, as the exchange protocol defines it:
//! microseconds elapsed within the current wall-clock hour
//! (minutes x 6e7 + seconds x 1e6 + microseconds).
//!
//! ## Known limitation
//!
//! The value wraps to zero at every hour boundary. A latency computed from
//! a packet sent just before the wrap and received just after it comes out
//! negative. We do not try to unwrap: such samples are discarded and
//! counted instead of silently producing wrong latency numbers. The same
//! applies when two machines' wall clocks disagree.

use std::time::{SystemTime, UNIX_EPOCH};

/// Microseconds per wall-clock hour; the wrap period of the timestamp.
pub const WRAP_PERIOD_MICROS: f64 = 3_600.0 * 1e6;

/// Returns the current send timestamp: microseconds within the hour.
///
/// Clamps to zero if the system clock reads before the Unix epoch.
#[must_use]
pub fn hour_micros_now() -> f64 {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let seconds_in_hour = elapsed.as_secs() % 3_600;
    #[allow(clippy::cast_precision_loss)]
    let micros = seconds_in_hour as f64 * 1e6 + f64::from(elapsed.subsec_micros());
    micros
}

/// One-way latency estimate from a received timestamp, in microseconds.
///
/// Returns `None` when the difference is negative (hour wrap or clock
/// disagreement) - the sample is unusable, not zero.
#[must_use]
pub fn latency_micros(sent_micros: f64, received_micros: f64) -> Option<f64> {
    let delta = received_micros - sent_micros;
    if delta >= 0.0 {
        Some(delta)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_stays_within_wrap_period() {
        let now = hour_micros_now();
        assert!(now >= 0.0);
        assert!(now < WRAP_PERIOD_MICROS);
    }

    #[test]
    fn test_timestamp_advances() {
        let a = hour_micros_now();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = hour_micros_now();
        // Unless this exact test straddles an hour boundary, b > a.
        if b >= a {
            assert!(b - a >= 1_000.0);
        }
    }

    #[test]
    fn test_latency_normal() {
        assert_eq!(latency_micros(100.0, 350.0), Some(250.0));
        assert_eq!(latency_micros(100.0, 100.0), Some(0.0));
    }

    #[test]
    fn test_latency_across_wrap_is_discarded() {
        // Sent at 59:59.999999, received at 00:00.000050 after the wrap.
        let sent = WRAP_PERIOD_MICROS - 1.0;
        let received = 50.0;
        assert_eq!(latency_micros(sent, received), None);
    }
}
