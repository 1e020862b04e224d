//! # Single-Slot Mailbox
//!
//! Latest-value handoff between one writer and many readers.
//!
//! ## Design
//!
//! - One slot, overwritten on every publish - no buffering contract
//! - Readers take a copy under a short read lock (copy-on-read)
//! - A generation counter lets callers detect whether anything was
//!   published since they last looked

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

/// Single-slot mailbox holding the most recently published value.
///
/// The intended topology is single-writer (the simulation tick loop),
/// multi-reader (the motion and telemetry publishers). Nothing enforces a
/// single writer; last write wins.
///
/// ## Usage
///
/// ```rust
/// use posecast_core::Mailbox;
///
/// let mailbox: Mailbox<[f32; 3]> = Mailbox::new([0.0; 3]);
/// mailbox.publish([1.0, 2.0, 3.0]);
/// assert_eq!(mailbox.snapshot(), [1.0, 2.0, 3.0]);
/// assert_eq!(mailbox.generation(), 1);
/// ```
#[derive(Debug)]
pub struct Mailbox<T: Copy> {
    /// The latest value.
    slot: RwLock<T>,
    /// Number of publishes since creation.
    generation: AtomicU64,
}

impl<T: Copy> Mailbox<T> {
    /// Creates a mailbox seeded with an initial value.
    ///
    /// The seed counts as generation 0; readers that need "at least one
    /// real tick" can wait for a non-zero generation.
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            slot: RwLock::new(initial),
            generation: AtomicU64::new(0),
        }
    }

    /// Overwrites the slot with a fresh value.
    pub fn publish(&self, value: T) {
        *self.slot.write() = value;
        self.generation.fetch_add(1, Ordering::Release);
    }

    /// Returns a copy of the latest value.
    #[must_use]
    pub fn snapshot(&self) -> T {
        *self.slot.read()
    }

    /// Returns the number of publishes observed so far.
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

impl<T: Copy + Default> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_publish_snapshot() {
        let mailbox = Mailbox::new(0u32);
        assert_eq!(mailbox.snapshot(), 0);
        assert_eq!(mailbox.generation(), 0);

        mailbox.publish(7);
        assert_eq!(mailbox.snapshot(), 7);
        assert_eq!(mailbox.generation(), 1);

        mailbox.publish(9);
        assert_eq!(mailbox.snapshot(), 9);
        assert_eq!(mailbox.generation(), 2);
    }

    #[test]
    fn test_latest_value_wins_across_threads() {
        let mailbox = Arc::new(Mailbox::new(0u64));

        let writer = {
            let mailbox = Arc::clone(&mailbox);
            std::thread::spawn(move || {
                for i in 1..=1000u64 {
                    mailbox.publish(i);
                }
            })
        };

        writer.join().expect("writer thread");

        // After the writer finishes the reader must see the final value.
        assert_eq!(mailbox.snapshot(), 1000);
        assert_eq!(mailbox.generation(), 1000);
    }
}
