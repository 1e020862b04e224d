//! # Session Workers
//!
//! The three loop bodies and the receiver's per-datagram state machine.
//! The state machine lives in [`ReceiverCore`] so it can be driven with
//! raw bytes in tests, without sockets.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use posecast_core::Mailbox;

use crate::clock;
use crate::error::{ExchangeError, ExchangeResult};
use crate::protocol::{
    decode_telemetry, encode_motion, encode_telemetry, MotionRecord, TelemetryRecord,
};
use crate::registry::{ParticipantId, PeerRegistry};
use crate::session::stats::SessionStats;
use crate::spawn::{ActorSpawner, ClassMap};
use crate::transport::{MotionSender, TelemetryReceiver, TelemetrySender};

/// Receive buffer size.
///
/// Deliberately larger than any valid record: `recv_from` truncates
/// oversized datagrams to the buffer length, so an exact-size buffer would
/// make a too-long packet indistinguishable from a valid one.
const RECV_BUFFER_SIZE: usize = 256;

/// Builds consecutive telemetry records for one session.
///
/// Owns the monotonic sequence counter: starts at 0, +1 per frame, never
/// reset for the life of the session.
pub struct TelemetryFrameBuilder {
    local_id: f64,
    sequence: u64,
}

impl TelemetryFrameBuilder {
    /// Creates a builder for the given local participant.
    #[must_use]
    pub const fn new(local_id: f64) -> Self {
        Self {
            local_id,
            sequence: 0,
        }
    }

    /// Builds the next frame from the current motion snapshot, stamping it
    /// with the hour-relative send timestamp.
    pub fn next_frame(&mut self, motion: &MotionRecord) -> TelemetryRecord {
        let record = TelemetryRecord::new(
            self.local_id,
            self.sequence,
            clock::hour_micros_now(),
            motion.pose(),
        );
        self.sequence += 1;
        record
    }

    /// The sequence number the next frame will carry.
    #[must_use]
    pub const fn next_sequence(&self) -> u64 {
        self.sequence
    }
}

/// Motion publisher loop: snapshot, encode, loopback send, sleep.
///
/// Returns when shutdown is requested; any socket error is fatal to this
/// worker and propagates to the session.
pub fn run_motion_publisher(
    sender: &MotionSender,
    mailbox: &Mailbox<MotionRecord>,
    shutdown: &AtomicBool,
    stats: &SessionStats,
    interval: Duration,
) -> ExchangeResult<()> {
    while !shutdown.load(Ordering::Acquire) {
        let record = mailbox.snapshot();
        sender.send(&encode_motion(&record))?;
        stats.record_motion_sent();
        std::thread::sleep(interval);
    }
    tracing::debug!("motion publisher stopped");
    Ok(())
}

/// Telemetry publisher loop: build frame, encode, multicast send, sleep.
pub fn run_telemetry_publisher(
    sender: &TelemetrySender,
    mailbox: &Mailbox<MotionRecord>,
    local_id: f64,
    shutdown: &AtomicBool,
    stats: &SessionStats,
    interval: Duration,
) -> ExchangeResult<()> {
    let mut frames = TelemetryFrameBuilder::new(local_id);
    while !shutdown.load(Ordering::Acquire) {
        let motion = mailbox.snapshot();
        let record = frames.next_frame(&motion);
        sender.send(&encode_telemetry(&record))?;
        stats.record_telemetry_sent();
        std::thread::sleep(interval);
    }
    tracing::debug!(sent = frames.next_sequence(), "telemetry publisher stopped");
    Ok(())
}

/// Receiver loop: bounded read, then hand each datagram to the core.
///
/// A timed-out read is a normal iteration; any other socket error ends the
/// loop and surfaces to the session as fatal.
pub fn run_receiver<S: ActorSpawner>(
    receiver: &TelemetryReceiver,
    mut core: ReceiverCore<S>,
    shutdown: &AtomicBool,
) -> ExchangeResult<()> {
    let mut buffer = [0u8; RECV_BUFFER_SIZE];
    while !shutdown.load(Ordering::Acquire) {
        match receiver.recv(&mut buffer)? {
            Some((len, _addr)) => core.process_datagram(&buffer[..len]),
            None => {
                // No data within the timeout: loop again (and observe the
                // shutdown flag).
            }
        }
    }
    tracing::debug!("telemetry receiver stopped");
    Ok(())
}

/// The receiver's per-datagram state machine: decode, self-filter,
/// resolve, spawn-on-first-sight, apply update.
///
/// Socket-free so tests can feed it encoded frames directly.
pub struct ReceiverCore<S: ActorSpawner> {
    local_id: ParticipantId,
    registry: Arc<PeerRegistry>,
    class_map: ClassMap,
    spawner: S,
    stats: Arc<SessionStats>,
}

impl<S: ActorSpawner> ReceiverCore<S> {
    /// Creates the state machine for one session.
    #[must_use]
    pub fn new(
        local_id: ParticipantId,
        registry: Arc<PeerRegistry>,
        class_map: ClassMap,
        spawner: S,
        stats: Arc<SessionStats>,
    ) -> Self {
        Self {
            local_id,
            registry,
            class_map,
            spawner,
            stats,
        }
    }

    /// Processes one datagram, timestamped with the current clock.
    pub fn process_datagram(&mut self, bytes: &[u8]) {
        self.process_datagram_at(bytes, clock::hour_micros_now());
    }

    /// Processes one datagram with an explicit receive timestamp.
    ///
    /// Malformed packets and registry overflow are dropped and counted
    /// here; nothing on this path can take the receive loop down.
    pub fn process_datagram_at(&mut self, bytes: &[u8], now_micros: f64) {
        self.stats.record_telemetry_received();

        // Decode: exact length or nothing.
        let record = match decode_telemetry(bytes) {
            Ok(record) => record,
            Err(_) => {
                self.stats.record_malformed_dropped();
                tracing::debug!(len = bytes.len(), "dropping wrong-length datagram");
                return;
            }
        };

        // Self-filter: our own multicast comes back to us; use it only as
        // a latency diagnostic.
        let peer_id = ParticipantId(record.participant_id);
        if peer_id.same_as(self.local_id) {
            self.stats.record_self_packet();
            match clock::latency_micros(record.timestamp_micros, now_micros) {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                Some(micros) => self.stats.record_latency_micros(micros as u64),
                None => self.stats.record_wrap_discard(),
            }
            return;
        }

        // Resolve: existing slot or first-come-first-served allocation.
        let (slot, is_new) = match self.registry.resolve(peer_id) {
            Ok(resolved) => resolved,
            Err(ExchangeError::RegistryFull { capacity }) => {
                self.stats.record_registry_rejected();
                tracing::warn!(
                    participant_id = peer_id.value(),
                    capacity,
                    "registry full, dropping telemetry from unregistered peer"
                );
                return;
            }
            Err(error) => {
                // resolve only fails with RegistryFull today; treat anything
                // else as a drop too.
                self.stats.record_registry_rejected();
                tracing::warn!(%error, "unexpected registry error, dropping packet");
                return;
            }
        };

        let pose = record.pose();

        // Spawn on first sight.
        if is_new {
            let (class, is_fallback) = self.class_map.class_for(peer_id);
            if is_fallback {
                self.stats.record_fallback_spawn();
                tracing::warn!(
                    participant_id = peer_id.value(),
                    class,
                    "unknown participant class, using default"
                );
            }
            tracing::info!(
                participant_id = peer_id.value(),
                slot = slot.0,
                class,
                "registered new peer"
            );
            match self.spawner.spawn_proxy(peer_id, class, pose) {
                Ok(proxy) => self.registry.set_proxy(slot, proxy),
                Err(error) => {
                    tracing::warn!(
                        participant_id = peer_id.value(),
                        %error,
                        "proxy spawn failed, peer stays registered without a proxy"
                    );
                }
            }
        }

        // Apply the update to the registry and the proxy.
        self.registry.update_transform(slot, pose);
        if let Some(peer) = self.registry.get(slot) {
            if let Some(proxy) = peer.proxy {
                self.spawner.move_proxy(proxy, pose);
            }
        }
    }

    /// The spawner, for teardown at session end.
    pub fn spawner_mut(&mut self) -> &mut S {
        &mut self.spawner
    }
}
