//! # POSECAST Core
//!
//! Shared types for the peer pose-telemetry exchange:
//!
//! - Plain-old-data math types (`Vec3`, `DVec3`, `Pose`) used both by the
//!   simulation side and by the wire records
//! - A single-slot [`Mailbox`] that decouples the simulation tick loop
//!   (single writer) from the publisher workers (multiple readers)
//!
//! ## Architecture Rules
//!
//! 1. **Copy types only** - everything crossing a thread boundary is `Copy`
//! 2. **Latest-value semantics** - the mailbox never queues; a reader always
//!    sees the most recent tick, staleness between ticks is acceptable
//! 3. **No blocking on the tick path** - publishing a sample is a short
//!    write-lock of a 76-byte value

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod math;
pub mod sync;

pub use math::{DVec3, Pose, Vec3};
pub use sync::Mailbox;
