//! # Tick/Publisher Synchronization
//!
//! The simulation tick loop and the publisher workers never wait on each
//! other. They share exactly one value: the latest local motion state,
//! held in a single-slot [`Mailbox`].

mod mailbox;

pub use mailbox::Mailbox;
