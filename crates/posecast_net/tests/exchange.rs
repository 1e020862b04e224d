//! End-to-end exchange between two participants, driven through the
//! receiver state machine with real encoded frames. No multicast sockets:
//! the datagrams take the same byte path they would on the wire, minus the
//! network, so the test is deterministic on any host.

use std::sync::Arc;

use posecast_core::{DVec3, Mailbox, Pose, Vec3};
use posecast_net::protocol::{encode_motion, encode_telemetry, MOTION_PACKET_SIZE};
use posecast_net::session::{ReceiverCore, SessionStats, TelemetryFrameBuilder};
use posecast_net::spawn::{ChannelSpawner, ClassMap, ProxyCommand};
use posecast_net::{MotionRecord, ParticipantId, PeerRegistry};

/// One participant's receive side, wired the way a session wires it.
struct Endpoint {
    id: f64,
    registry: Arc<PeerRegistry>,
    stats: Arc<SessionStats>,
    core: ReceiverCore<ChannelSpawner>,
    commands: crossbeam_channel::Receiver<ProxyCommand>,
}

impl Endpoint {
    fn new(id: f64) -> Self {
        let registry = Arc::new(PeerRegistry::new(8));
        let stats = Arc::new(SessionStats::default());
        let (spawner, commands) = ChannelSpawner::pair(64);
        let core = ReceiverCore::new(
            ParticipantId(id),
            Arc::clone(&registry),
            ClassMap::new(Vec::new(), "walker.pedestrian.0001".to_owned()),
            spawner,
            Arc::clone(&stats),
        );
        Self {
            id,
            registry,
            stats,
            core,
            commands,
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn motion_at(x: f64, yaw: f64) -> MotionRecord {
    MotionRecord {
        position: Vec3::new(x as f32, 0.0, 0.5),
        orientation: Vec3::new(0.0, 0.0, yaw as f32),
        ..MotionRecord::default()
    }
}

#[test]
fn test_two_participants_register_each_other() {
    let mut alpha = Endpoint::new(1.0);
    let mut beta = Endpoint::new(2.0);

    // Each side publishes into its mailbox and frames from the snapshot,
    // exactly as the telemetry publisher worker does.
    let alpha_mailbox = Mailbox::new(MotionRecord::default());
    let beta_mailbox = Mailbox::new(MotionRecord::default());
    let mut alpha_frames = TelemetryFrameBuilder::new(alpha.id);
    let mut beta_frames = TelemetryFrameBuilder::new(beta.id);

    for step in 0..50u32 {
        let t = f64::from(step);
        alpha_mailbox.publish(motion_at(t * 0.1, 0.0));
        beta_mailbox.publish(motion_at(100.0 - t * 0.1, 1.5));

        let from_alpha = encode_telemetry(&alpha_frames.next_frame(&alpha_mailbox.snapshot()));
        let from_beta = encode_telemetry(&beta_frames.next_frame(&beta_mailbox.snapshot()));

        // Multicast reflects everything to everyone, sender included.
        alpha.core.process_datagram(&from_alpha);
        alpha.core.process_datagram(&from_beta);
        beta.core.process_datagram(&from_alpha);
        beta.core.process_datagram(&from_beta);
    }

    // Each registry holds exactly the one foreign peer.
    assert_eq!(alpha.registry.len(), 1);
    assert_eq!(beta.registry.len(), 1);

    let beta_as_seen = alpha.registry.find(ParticipantId(2.0)).unwrap();
    let alpha_as_seen = beta.registry.find(ParticipantId(1.0)).unwrap();
    assert_eq!(beta_as_seen.updates, 50);
    assert_eq!(alpha_as_seen.updates, 50);

    // Last transforms match the final published motion, within the f32
    // widening tolerance of the motion record.
    let expected_alpha = Pose::new(DVec3::new(4.9, 0.0, 0.5), DVec3::ZERO);
    assert!(alpha_as_seen.last_transform.approx_eq(expected_alpha, 1e-5));
    let expected_beta = Pose::new(DVec3::new(95.1, 0.0, 0.5), DVec3::new(0.0, 0.0, 1.5));
    assert!(beta_as_seen.last_transform.approx_eq(expected_beta, 1e-4));

    // Own packets were filtered, not registered.
    assert_eq!(alpha.stats.self_packets(), 50);
    assert_eq!(beta.stats.self_packets(), 50);
    assert!(alpha.registry.find(ParticipantId(1.0)).is_none());

    // Exactly one spawn per foreign peer, followed by the moves.
    let alpha_commands: Vec<_> = alpha.commands.try_iter().collect();
    let spawns = alpha_commands
        .iter()
        .filter(|c| matches!(c, ProxyCommand::Spawn { .. }))
        .count();
    assert_eq!(spawns, 1);
    match &alpha_commands[0] {
        ProxyCommand::Spawn {
            participant, class, ..
        } => {
            assert!(participant.same_as(ParticipantId(2.0)));
            assert_eq!(class, "walker.pedestrian.0001");
        }
        other => panic!("first command should be the spawn, got {other:?}"),
    }
}

#[test]
fn test_exchange_survives_garbage_between_valid_frames() {
    let mut endpoint = Endpoint::new(1.0);
    let mut frames = TelemetryFrameBuilder::new(2.0);
    let pose_source = motion_at(3.0, 0.25);

    endpoint
        .core
        .process_datagram(&encode_telemetry(&frames.next_frame(&pose_source)));
    // A motion record leaking onto the telemetry port is the classic
    // cross-feed mistake: wrong length, must be dropped.
    endpoint
        .core
        .process_datagram(&encode_motion(&pose_source));
    endpoint.core.process_datagram(&[0xFF; 13]);
    endpoint
        .core
        .process_datagram(&encode_telemetry(&frames.next_frame(&pose_source)));

    assert_eq!(endpoint.stats.telemetry_received(), 4);
    assert_eq!(endpoint.stats.malformed_dropped(), 2);
    assert_eq!(endpoint.registry.len(), 1);
    assert_eq!(
        endpoint
            .registry
            .find(ParticipantId(2.0))
            .unwrap()
            .updates,
        2
    );
}

#[test]
fn test_motion_encoding_is_loopback_sized() {
    // The motion publisher sends exactly this array over loopback.
    let encoded = encode_motion(&motion_at(1.0, 0.0));
    assert_eq!(encoded.len(), MOTION_PACKET_SIZE);
}
