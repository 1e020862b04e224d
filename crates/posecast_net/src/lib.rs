//! # POSECAST Net - Peer Telemetry Exchange
//!
//! Serverless pose sharing between independent simulation participants on a
//! local network segment. Each participant runs the same session; there is
//! no central authority.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        EXCHANGE SESSION                          │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐   ┌────────────────┐   ┌───────────────────┐  │
//! │  │ Motion       │   │ Telemetry      │   │ Telemetry         │  │
//! │  │ Publisher    │   │ Publisher      │   │ Receiver          │  │
//! │  │ (loopback)   │   │ (multicast)    │   │ (multicast)       │  │
//! │  └──────┬───────┘   └───────┬────────┘   └────────┬──────────┘  │
//! │         │    read           │    read             │  resolve    │
//! │  ┌──────▼───────────────────▼──────┐   ┌──────────▼──────────┐  │
//! │  │ Mailbox<MotionRecord>           │   │ Peer Registry       │  │
//! │  │ (written by the tick source)    │   │ (grow-only slots)   │  │
//! │  └─────────────────────────────────┘   └──────────┬──────────┘  │
//! │                                                   │ spawn/move  │
//! │                                        ┌──────────▼──────────┐  │
//! │                                        │ Actor Spawner       │  │
//! │                                        │ (channel-proxied)   │  │
//! │                                        └─────────────────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Protocol Guarantees
//!
//! Deliberately none: best-effort UDP, no ordering, no retransmission, no
//! encryption. A lost or reordered datagram only means a peer's
//! `last_transform` stays stale until the next packet lands. Peers are
//! registered on first sight and never removed.
//!
//! ## Example
//!
//! ```rust,ignore
//! use posecast_net::{ExchangeSession, SessionConfig, spawn::ChannelSpawner};
//!
//! let config = SessionConfig { participant_id: 1.0, ..SessionConfig::default() };
//! let (spawner, commands) = ChannelSpawner::pair(256);
//! let session = ExchangeSession::new(config)?;
//! let handle = session.start(spawner)?;
//! // tick loop: handle.mailbox().publish(motion_record);
//! // main thread: drain `commands` and drive the real actor system
//! handle.shutdown();
//! handle.join()?;
//! # Ok::<(), posecast_net::ExchangeError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod clock;
pub mod config;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod session;
pub mod spawn;
pub mod transport;

// Re-exports for convenience
pub use posecast_core::{DVec3, Mailbox, Pose, Vec3};

pub use config::{ClassMapping, SessionConfig};
pub use error::{ExchangeError, ExchangeResult};
pub use protocol::{
    MotionRecord, TelemetryRecord, MOTION_PACKET_SIZE, TELEMETRY_PACKET_SIZE,
};
pub use registry::{ParticipantId, PeerRegistry, PeerSlot, SlotIndex};
pub use session::{ExchangeSession, SessionHandle, SessionStats};
pub use spawn::{ActorSpawner, ChannelSpawner, ClassMap, ProxyCommand, ProxyId};

/// Default loopback address for the local motion feed.
pub const DEFAULT_MOTION_ADDR: std::net::SocketAddr = std::net::SocketAddr::V4(
    std::net::SocketAddrV4::new(std::net::Ipv4Addr::LOCALHOST, 5005),
);

/// Default multicast group for the telemetry exchange.
pub const DEFAULT_MULTICAST_GROUP: std::net::Ipv4Addr = std::net::Ipv4Addr::new(224, 1, 1, 1);

/// Default multicast port for the telemetry exchange.
pub const DEFAULT_MULTICAST_PORT: u16 = 5007;

/// Default multicast TTL.
///
/// Small on purpose: telemetry must not leave the local network segment.
pub const DEFAULT_MULTICAST_TTL: u32 = 4;

/// Default sleep between successive sends of a feed (1 kHz target).
pub const DEFAULT_PUBLISH_INTERVAL_MICROS: u64 = 1_000;

/// Default bound on the receiver's blocking read.
///
/// Also bounds how quickly the receiver observes a shutdown request.
pub const DEFAULT_RECEIVE_TIMEOUT_MILLIS: u64 = 100;

/// Default peer registry capacity (distinct participants per session).
pub const DEFAULT_REGISTRY_CAPACITY: usize = 32;
