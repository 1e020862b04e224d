//! # Actor Spawning
//!
//! The exchange does not render anything itself. When the receiver sees a
//! participant for the first time it asks an [`ActorSpawner`] for a visual
//! proxy; afterwards it only pushes pose updates to that proxy.
//!
//! ## Thread confinement
//!
//! Most actor/scene APIs are not safe to call from arbitrary threads. The
//! provided [`ChannelSpawner`] therefore implements the trait by forwarding
//! commands over a bounded channel to whichever thread owns the real actor
//! system, which drains [`ProxyCommand`]s at its own pace.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use posecast_core::Pose;
use thiserror::Error;

use crate::registry::ParticipantId;

/// Handle identifying a spawned proxy.
///
/// The proxy itself is owned by the spawner; the registry only keeps this
/// identity as a weak reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProxyId(pub u64);

/// Errors a spawner can surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpawnError {
    /// The thread draining spawn commands has gone away.
    #[error("spawn channel disconnected")]
    ChannelClosed,
    /// The spawner rejected the request.
    #[error("spawn rejected: {0}")]
    Rejected(String),
}

/// Creates and moves visual proxies for remote participants.
///
/// Implementations must be `Send`: the receiver worker owns its spawner.
/// `spawn_proxy` is called once per participant, on first sight;
/// `move_proxy` on every subsequent telemetry packet.
pub trait ActorSpawner: Send {
    /// Creates a proxy of the given class at the given pose.
    ///
    /// # Errors
    ///
    /// Returns [`SpawnError`] when the proxy cannot be created; the peer
    /// stays registered and the spawn is not retried until the process
    /// restarts (matching the exchange's register-once lifecycle).
    fn spawn_proxy(
        &mut self,
        participant: ParticipantId,
        class: &str,
        pose: Pose,
    ) -> Result<ProxyId, SpawnError>;

    /// Moves an existing proxy to a new pose.
    ///
    /// Best-effort: a dropped move only leaves the proxy one packet stale.
    fn move_proxy(&mut self, proxy: ProxyId, pose: Pose);

    /// Destroys a proxy.
    ///
    /// The exchange core never calls this - peers are never removed - but
    /// embedding applications use it to tear proxies down at session end.
    fn destroy_proxy(&mut self, proxy: ProxyId);
}

/// Static participant -> spawn-class mapping with a default fallback.
///
/// The mapping is explicit configuration, never an index into a hardcoded
/// table: an unknown identifier falls back to the default class and the
/// caller logs the fallback.
#[derive(Clone, Debug)]
pub struct ClassMap {
    entries: Vec<(ParticipantId, String)>,
    default_class: String,
}

impl ClassMap {
    /// Builds a map from explicit entries plus the fallback class.
    #[must_use]
    pub fn new(entries: Vec<(ParticipantId, String)>, default_class: String) -> Self {
        Self {
            entries,
            default_class,
        }
    }

    /// Returns the spawn class for `id` and whether the fallback was used.
    #[must_use]
    pub fn class_for(&self, id: ParticipantId) -> (&str, bool) {
        self.entries
            .iter()
            .find(|(entry_id, _)| entry_id.same_as(id))
            .map_or((self.default_class.as_str(), true), |(_, class)| {
                (class.as_str(), false)
            })
    }

    /// The fallback class.
    #[must_use]
    pub fn default_class(&self) -> &str {
        &self.default_class
    }
}

/// Command forwarded to the thread that owns the real actor system.
#[derive(Clone, Debug)]
pub enum ProxyCommand {
    /// Create a proxy for a newly seen participant.
    Spawn {
        /// Handle pre-allocated by the [`ChannelSpawner`].
        proxy: ProxyId,
        /// The participant this proxy represents.
        participant: ParticipantId,
        /// Spawn class tag resolved from the class map.
        class: String,
        /// Initial pose.
        pose: Pose,
    },
    /// Move an existing proxy.
    Move {
        /// The proxy to move.
        proxy: ProxyId,
        /// The new pose.
        pose: Pose,
    },
    /// Destroy a proxy.
    Destroy {
        /// The proxy to destroy.
        proxy: ProxyId,
    },
}

/// [`ActorSpawner`] that forwards commands over a bounded channel.
///
/// Handles are allocated locally from a monotonic counter, so `spawn_proxy`
/// can return immediately without waiting for the actor thread.
pub struct ChannelSpawner {
    commands: Sender<ProxyCommand>,
    next_proxy: u64,
}

impl ChannelSpawner {
    /// Creates a spawner and the receiving end for the actor-owning thread.
    #[must_use]
    pub fn pair(channel_capacity: usize) -> (Self, Receiver<ProxyCommand>) {
        let (tx, rx) = bounded(channel_capacity);
        (
            Self {
                commands: tx,
                next_proxy: 0,
            },
            rx,
        )
    }

    fn allocate(&mut self) -> ProxyId {
        let id = ProxyId(self.next_proxy);
        self.next_proxy += 1;
        id
    }
}

impl ActorSpawner for ChannelSpawner {
    fn spawn_proxy(
        &mut self,
        participant: ParticipantId,
        class: &str,
        pose: Pose,
    ) -> Result<ProxyId, SpawnError> {
        let proxy = self.allocate();
        // Spawns are rare (once per peer, ever); block until there is room
        // rather than lose one.
        self.commands
            .send(ProxyCommand::Spawn {
                proxy,
                participant,
                class: class.to_owned(),
                pose,
            })
            .map_err(|_| SpawnError::ChannelClosed)?;
        Ok(proxy)
    }

    fn move_proxy(&mut self, proxy: ProxyId, pose: Pose) {
        // Moves are per-packet and lossy by contract: if the actor thread
        // is behind, dropping this one only leaves the proxy a packet stale.
        match self.commands.try_send(ProxyCommand::Move { proxy, pose }) {
            Ok(()) | Err(TrySendError::Full(_)) => {}
            Err(TrySendError::Disconnected(_)) => {
                tracing::debug!("proxy command channel disconnected, dropping move");
            }
        }
    }

    fn destroy_proxy(&mut self, proxy: ProxyId) {
        let _ = self.commands.send(ProxyCommand::Destroy { proxy });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use posecast_core::DVec3;

    #[test]
    fn test_class_map_lookup_and_fallback() {
        let map = ClassMap::new(
            vec![
                (ParticipantId(1.0), "walker.pedestrian.0001".to_owned()),
                (ParticipantId(2.0), "vehicle.sedan.0002".to_owned()),
            ],
            "walker.pedestrian.0000".to_owned(),
        );

        assert_eq!(
            map.class_for(ParticipantId(1.0)),
            ("walker.pedestrian.0001", false)
        );
        assert_eq!(
            map.class_for(ParticipantId(2.0)),
            ("vehicle.sedan.0002", false)
        );
        assert_eq!(
            map.class_for(ParticipantId(99.0)),
            ("walker.pedestrian.0000", true)
        );
    }

    #[test]
    fn test_channel_spawner_forwards_commands() {
        let (mut spawner, commands) = ChannelSpawner::pair(16);
        let pose = Pose::new(DVec3::new(1.0, 2.0, 3.0), DVec3::ZERO);

        let proxy = spawner
            .spawn_proxy(ParticipantId(5.0), "vehicle.sedan.0002", pose)
            .unwrap();
        spawner.move_proxy(proxy, pose);
        spawner.destroy_proxy(proxy);

        match commands.recv().unwrap() {
            ProxyCommand::Spawn {
                proxy: p,
                participant,
                class,
                pose: spawn_pose,
            } => {
                assert_eq!(p, proxy);
                assert!(participant.same_as(ParticipantId(5.0)));
                assert_eq!(class, "vehicle.sedan.0002");
                assert_eq!(spawn_pose, pose);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(matches!(
            commands.recv().unwrap(),
            ProxyCommand::Move { .. }
        ));
        assert!(matches!(
            commands.recv().unwrap(),
            ProxyCommand::Destroy { .. }
        ));
    }

    #[test]
    fn test_proxy_ids_are_unique() {
        let (mut spawner, _commands) = ChannelSpawner::pair(16);
        let a = spawner
            .spawn_proxy(ParticipantId(1.0), "c", Pose::IDENTITY)
            .unwrap();
        let b = spawner
            .spawn_proxy(ParticipantId(2.0), "c", Pose::IDENTITY)
            .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_spawn_after_receiver_dropped_is_an_error() {
        let (mut spawner, commands) = ChannelSpawner::pair(4);
        drop(commands);
        let err = spawner
            .spawn_proxy(ParticipantId(1.0), "c", Pose::IDENTITY)
            .unwrap_err();
        assert_eq!(err, SpawnError::ChannelClosed);
    }

    #[test]
    fn test_full_channel_drops_moves_but_not_spawns() {
        // Capacity 1: the spawn fills the channel, the move must be dropped
        // without blocking.
        let (mut spawner, commands) = ChannelSpawner::pair(1);
        let proxy = spawner
            .spawn_proxy(ParticipantId(1.0), "c", Pose::IDENTITY)
            .unwrap();
        spawner.move_proxy(proxy, Pose::IDENTITY);

        assert!(matches!(
            commands.try_recv().unwrap(),
            ProxyCommand::Spawn { .. }
        ));
        // The move was dropped, not queued.
        assert!(commands.try_recv().is_err());
    }
}
