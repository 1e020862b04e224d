//! # Peer Registry
//!
//! Maps a participant identifier to a stable slot, the spawned proxy
//! handle and the last known transform.
//!
//! ## Design
//!
//! - Fixed-size slot table, pre-allocated (no growth, no reallocation)
//! - First-come first-served: an identifier keeps the slot it got for the
//!   life of the process; peers are never removed
//! - Allocation is serialized behind a mutex so two concurrent resolves of
//!   the same new identifier cannot create two slots
//! - Capacity exhaustion is an explicit, typed error, never an unchecked
//!   write past the table

use parking_lot::Mutex;
use posecast_core::Pose;

use crate::error::{ExchangeError, ExchangeResult};
use crate::spawn::ProxyId;

/// Participant identifier as carried on the wire.
///
/// The exchange protocol transmits identifiers as `f64`, so equality is
/// defined over the bit pattern - `1.0` and `1.0` match, `NaN` never
/// matches anything it didn't come from.
#[derive(Clone, Copy, Debug)]
pub struct ParticipantId(pub f64);

impl ParticipantId {
    /// Raw wire value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Bit-pattern equality, usable as a map key discipline.
    #[inline]
    #[must_use]
    pub fn same_as(self, other: Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl PartialEq for ParticipantId {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(*other)
    }
}

impl Eq for ParticipantId {}

impl From<f64> for ParticipantId {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

/// Index of a peer's slot in the registry table.
///
/// Stable once assigned, for the lifetime of the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlotIndex(pub usize);

/// One registered peer.
#[derive(Clone, Copy, Debug)]
pub struct PeerSlot {
    /// The peer's wire identifier.
    pub identifier: ParticipantId,
    /// This slot's stable index.
    pub slot_index: SlotIndex,
    /// Handle of the spawned visual proxy, if one has been requested.
    ///
    /// The proxy itself is owned by the actor spawner; this is a weak
    /// reference by identity only.
    pub proxy: Option<ProxyId>,
    /// Last transform received from this peer.
    pub last_transform: Pose,
    /// Number of telemetry updates applied to this slot.
    pub updates: u64,
}

/// Grow-only peer table with a fixed capacity.
pub struct PeerRegistry {
    inner: Mutex<RegistryInner>,
    capacity: usize,
}

struct RegistryInner {
    slots: Vec<PeerSlot>,
}

impl PeerRegistry {
    /// Creates a registry with room for `capacity` distinct participants.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(RegistryInner {
                slots: Vec::with_capacity(capacity),
            }),
            capacity,
        }
    }

    /// Returns the fixed slot capacity.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of registered peers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().slots.len()
    }

    /// Returns true if no peer has been registered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the existing slot for `identifier`, or allocates the next
    /// free one. The flag is `true` exactly when the slot was allocated by
    /// this call.
    ///
    /// identifier -> slot_index is a bijection for the registry lifetime:
    /// the whole lookup-or-allocate step runs under one lock.
    ///
    /// # Errors
    ///
    /// Returns [`ExchangeError::RegistryFull`] when a new identifier
    /// arrives after every slot has been handed out. Existing peers keep
    /// resolving normally.
    pub fn resolve(&self, identifier: ParticipantId) -> ExchangeResult<(SlotIndex, bool)> {
        let mut inner = self.inner.lock();

        if let Some(slot) = inner.slots.iter().find(|s| s.identifier.same_as(identifier)) {
            return Ok((slot.slot_index, false));
        }

        if inner.slots.len() >= self.capacity {
            return Err(ExchangeError::RegistryFull {
                capacity: self.capacity,
            });
        }

        let slot_index = SlotIndex(inner.slots.len());
        inner.slots.push(PeerSlot {
            identifier,
            slot_index,
            proxy: None,
            last_transform: Pose::IDENTITY,
            updates: 0,
        });
        Ok((slot_index, true))
    }

    /// Overwrites a slot's last known transform. No history is retained.
    ///
    /// Unknown indices are ignored; the registry never hands one out.
    pub fn update_transform(&self, slot: SlotIndex, pose: Pose) {
        let mut inner = self.inner.lock();
        if let Some(entry) = inner.slots.get_mut(slot.0) {
            entry.last_transform = pose;
            entry.updates += 1;
        }
    }

    /// Records the proxy handle spawned for a slot.
    pub fn set_proxy(&self, slot: SlotIndex, proxy: ProxyId) {
        let mut inner = self.inner.lock();
        if let Some(entry) = inner.slots.get_mut(slot.0) {
            entry.proxy = Some(proxy);
        }
    }

    /// Returns a copy of a slot's current state.
    #[must_use]
    pub fn get(&self, slot: SlotIndex) -> Option<PeerSlot> {
        self.inner.lock().slots.get(slot.0).copied()
    }

    /// Returns a copy of the slot registered for `identifier`, if any.
    #[must_use]
    pub fn find(&self, identifier: ParticipantId) -> Option<PeerSlot> {
        self.inner
            .lock()
            .slots
            .iter()
            .find(|s| s.identifier.same_as(identifier))
            .copied()
    }

    /// Returns a copy of every registered slot, in allocation order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<PeerSlot> {
        self.inner.lock().slots.clone()
    }
}
