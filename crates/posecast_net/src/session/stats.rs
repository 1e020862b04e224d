//! # Session Counters
//!
//! Shared counters updated by the workers and read by diagnostics/tests.
//! Relaxed atomics throughout - these are monitoring values, not
//! synchronization points.

use std::sync::atomic::{AtomicU64, Ordering};

/// Sentinel meaning "no latency sample recorded yet".
const NO_SAMPLE: u64 = u64::MAX;

/// Counters for one exchange session.
#[derive(Debug)]
pub struct SessionStats {
    motion_sent: AtomicU64,
    telemetry_sent: AtomicU64,
    telemetry_received: AtomicU64,
    malformed_dropped: AtomicU64,
    self_packets: AtomicU64,
    registry_rejected: AtomicU64,
    fallback_spawns: AtomicU64,
    latency_samples: AtomicU64,
    wrap_discards: AtomicU64,
    last_latency_micros: AtomicU64,
}

impl Default for SessionStats {
    fn default() -> Self {
        Self {
            motion_sent: AtomicU64::new(0),
            telemetry_sent: AtomicU64::new(0),
            telemetry_received: AtomicU64::new(0),
            malformed_dropped: AtomicU64::new(0),
            self_packets: AtomicU64::new(0),
            registry_rejected: AtomicU64::new(0),
            fallback_spawns: AtomicU64::new(0),
            latency_samples: AtomicU64::new(0),
            wrap_discards: AtomicU64::new(0),
            last_latency_micros: AtomicU64::new(NO_SAMPLE),
        }
    }
}

impl SessionStats {
    /// Records one motion datagram sent.
    pub fn record_motion_sent(&self) {
        self.motion_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one telemetry datagram sent.
    pub fn record_telemetry_sent(&self) {
        self.telemetry_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one telemetry datagram received (any validity).
    pub fn record_telemetry_received(&self) {
        self.telemetry_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a wrong-length datagram dropped by the decode step.
    pub fn record_malformed_dropped(&self) {
        self.malformed_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a packet filtered out as self-originated.
    pub fn record_self_packet(&self) {
        self.self_packets.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a packet dropped because the registry was full.
    pub fn record_registry_rejected(&self) {
        self.registry_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a spawn that used the default class fallback.
    pub fn record_fallback_spawn(&self) {
        self.fallback_spawns.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a usable self-latency sample, microseconds.
    pub fn record_latency_micros(&self, micros: u64) {
        // Keep the sentinel free for "no sample yet".
        let stored = micros.min(NO_SAMPLE - 1);
        self.last_latency_micros.store(stored, Ordering::Relaxed);
        self.latency_samples.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a latency sample discarded because the hour-relative
    /// timestamp wrapped (or the clocks disagree).
    pub fn record_wrap_discard(&self) {
        self.wrap_discards.fetch_add(1, Ordering::Relaxed);
    }

    /// Motion datagrams sent.
    #[must_use]
    pub fn motion_sent(&self) -> u64 {
        self.motion_sent.load(Ordering::Relaxed)
    }

    /// Telemetry datagrams sent.
    #[must_use]
    pub fn telemetry_sent(&self) -> u64 {
        self.telemetry_sent.load(Ordering::Relaxed)
    }

    /// Telemetry datagrams received.
    #[must_use]
    pub fn telemetry_received(&self) -> u64 {
        self.telemetry_received.load(Ordering::Relaxed)
    }

    /// Wrong-length datagrams dropped.
    #[must_use]
    pub fn malformed_dropped(&self) -> u64 {
        self.malformed_dropped.load(Ordering::Relaxed)
    }

    /// Self-originated packets filtered.
    #[must_use]
    pub fn self_packets(&self) -> u64 {
        self.self_packets.load(Ordering::Relaxed)
    }

    /// Packets dropped against a full registry.
    #[must_use]
    pub fn registry_rejected(&self) -> u64 {
        self.registry_rejected.load(Ordering::Relaxed)
    }

    /// Spawns that fell back to the default class.
    #[must_use]
    pub fn fallback_spawns(&self) -> u64 {
        self.fallback_spawns.load(Ordering::Relaxed)
    }

    /// Usable self-latency samples recorded.
    #[must_use]
    pub fn latency_samples(&self) -> u64 {
        self.latency_samples.load(Ordering::Relaxed)
    }

    /// Latency samples discarded due to the hour wrap.
    #[must_use]
    pub fn wrap_discards(&self) -> u64 {
        self.wrap_discards.load(Ordering::Relaxed)
    }

    /// Most recent self-latency sample, if any.
    #[must_use]
    pub fn last_latency_micros(&self) -> Option<u64> {
        match self.last_latency_micros.load(Ordering::Relaxed) {
            NO_SAMPLE => None,
            micros => Some(micros),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let stats = SessionStats::default();
        assert_eq!(stats.motion_sent(), 0);
        assert_eq!(stats.malformed_dropped(), 0);
        assert_eq!(stats.last_latency_micros(), None);
    }

    #[test]
    fn test_latency_sample_recording() {
        let stats = SessionStats::default();
        stats.record_latency_micros(250);
        stats.record_latency_micros(300);
        stats.record_wrap_discard();

        assert_eq!(stats.latency_samples(), 2);
        assert_eq!(stats.wrap_discards(), 1);
        assert_eq!(stats.last_latency_micros(), Some(300));
    }
}
