//! # Exchange Error Types
//!
//! All errors that can occur in the telemetry exchange.
//!
//! The taxonomy matters more than the variants: transient receive outcomes
//! (no data, timeout) are *not* errors and never appear here - the
//! receive loop treats them as normal iterations. Malformed packets are
//! dropped and counted by the session, so [`ExchangeError::MalformedPacket`]
//! is only ever observed by direct codec callers.

use thiserror::Error;

/// Errors that can occur in the telemetry exchange.
#[derive(Error, Debug)]
pub enum ExchangeError {
    /// A datagram's length did not match the fixed record layout.
    ///
    /// The codec never attempts a partial decode.
    #[error("malformed packet: expected {expected} bytes, got {actual}")]
    MalformedPacket {
        /// The exact byte length the record layout requires.
        expected: usize,
        /// The length actually received.
        actual: usize,
    },

    /// The peer registry has no free slot for a new participant.
    ///
    /// Policy is reject-not-grow: the packet that would have registered the
    /// peer is dropped and counted, existing peers are unaffected.
    #[error("peer registry full: capacity {capacity} slots exhausted")]
    RegistryFull {
        /// The fixed slot capacity of the registry.
        capacity: usize,
    },

    /// A socket-level failure other than would-block/timeout.
    ///
    /// Fatal to the owning worker; the session shuts down all workers when
    /// any one of them surfaces this.
    #[error("socket error: {0}")]
    Socket(#[from] std::io::Error),

    /// The session configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A worker thread panicked or its result was lost.
    #[error("worker '{0}' terminated abnormally")]
    WorkerLost(&'static str),
}

/// Result type for exchange operations.
pub type ExchangeResult<T> = Result<T, ExchangeError>;
