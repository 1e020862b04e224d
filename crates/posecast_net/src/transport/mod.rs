//! # Transport Layer
//!
//! Thin wrappers around std UDP sockets, one per feed.
//!
//! ## Design
//!
//! - Raw UDP, fire-and-forget - no reliability layer, by contract
//! - The receiver uses a timeout-bounded blocking read; a timeout is a
//!   normal loop outcome, not an exception path
//! - Sockets are scoped resources: opened at session start, closed on
//!   every exit path when the owning worker returns (RAII)

use std::io;
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::time::Duration;

use crate::error::ExchangeResult;

/// Returns true for the error kinds a bounded read produces when no
/// datagram arrived in time.
///
/// Linux reports a timed-out `recvfrom` as `WouldBlock`, other platforms
/// as `TimedOut`; both mean "loop again".
#[must_use]
pub fn is_transient_recv_error(kind: io::ErrorKind) -> bool {
    matches!(kind, io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}

/// Unicast sender for the loopback motion feed.
pub struct MotionSender {
    socket: UdpSocket,
}

impl MotionSender {
    /// Opens a loopback socket aimed at the motion consumer.
    ///
    /// # Errors
    ///
    /// Fails if the socket cannot be bound or connected.
    pub fn connect(target: SocketAddr) -> ExchangeResult<Self> {
        let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0))?;
        socket.connect(target)?;
        Ok(Self { socket })
    }

    /// Sends one encoded motion datagram.
    ///
    /// # Errors
    ///
    /// Any socket error here is fatal to the motion publisher.
    pub fn send(&self, payload: &[u8]) -> ExchangeResult<usize> {
        Ok(self.socket.send(payload)?)
    }
}

/// Multicast sender for the telemetry feed.
pub struct TelemetrySender {
    socket: UdpSocket,
    group: SocketAddr,
}

impl TelemetrySender {
    /// Opens a sender for the given multicast group with a bounded TTL.
    ///
    /// The TTL is the scope limit that keeps telemetry on the local
    /// network segment.
    ///
    /// # Errors
    ///
    /// Fails if the socket cannot be bound or the TTL cannot be set.
    pub fn open(group: SocketAddr, ttl: u32) -> ExchangeResult<Self> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
        socket.set_multicast_ttl_v4(ttl)?;
        Ok(Self { socket, group })
    }

    /// Sends one encoded telemetry datagram to the group.
    ///
    /// # Errors
    ///
    /// Any socket error here is fatal to the telemetry publisher.
    pub fn send(&self, payload: &[u8]) -> ExchangeResult<usize> {
        Ok(self.socket.send_to(payload, self.group)?)
    }

    /// The group address this sender publishes to.
    #[must_use]
    pub const fn group(&self) -> SocketAddr {
        self.group
    }
}

/// Multicast receiver for the telemetry feed.
pub struct TelemetryReceiver {
    socket: UdpSocket,
}

impl TelemetryReceiver {
    /// Binds the telemetry port, joins the multicast group and bounds the
    /// blocking read with `timeout`.
    ///
    /// The timeout doubles as the shutdown reaction bound: the receive
    /// loop re-checks the shutdown flag at least this often.
    ///
    /// # Errors
    ///
    /// Fails if binding, group membership or the timeout cannot be set up.
    pub fn join(group: Ipv4Addr, port: u16, timeout: Duration) -> ExchangeResult<Self> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, port))?;
        socket.join_multicast_v4(&group, &Ipv4Addr::UNSPECIFIED)?;
        socket.set_read_timeout(Some(timeout))?;
        Ok(Self { socket })
    }

    /// Attempts to receive one datagram.
    ///
    /// Returns `Ok(None)` when nothing arrived within the timeout - a
    /// normal loop iteration outcome.
    ///
    /// # Errors
    ///
    /// Any other socket error is fatal to the receive loop.
    pub fn recv(&self, buffer: &mut [u8]) -> ExchangeResult<Option<(usize, SocketAddr)>> {
        match self.socket.recv_from(buffer) {
            Ok((len, addr)) => Ok(Some((len, addr))),
            Err(e) if is_transient_recv_error(e.kind()) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
