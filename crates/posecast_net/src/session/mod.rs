//! # Exchange Session
//!
//! One session object owns everything the exchange shares: the mailbox,
//! the peer registry, the counters and the shutdown flag. It runs the
//! three workers; nothing lives in module-level globals.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      EXCHANGE SESSION                          │
//! ├────────────────────────────────────────────────────────────────┤
//! │  tick source ──publish──> Mailbox<MotionRecord>                │
//! │                             │            │                     │
//! │                     snapshot│    snapshot│                     │
//! │  ┌──────────────────────────▼──┐  ┌──────▼──────────────────┐  │
//! │  │ motion publisher (1 kHz)    │  │ telemetry publisher     │  │
//! │  │ loopback 127.0.0.1:5005     │  │ multicast 224.1.1.1:5007│  │
//! │  └─────────────────────────────┘  └─────────────────────────┘  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │ receiver: decode -> self-filter -> resolve -> spawn/move│   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No worker ever waits on another. The publishers sleep their fixed
//! interval; the receiver blocks at most its read timeout. A process-wide
//! shutdown flag stops all three within one interval/timeout, and any
//! worker's fatal error flips the same flag so the session winds down as a
//! unit, closing every socket on the way out.

mod stats;
mod workers;

pub use stats::SessionStats;
pub use workers::{ReceiverCore, TelemetryFrameBuilder};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use posecast_core::Mailbox;

use crate::config::SessionConfig;
use crate::error::{ExchangeError, ExchangeResult};
use crate::protocol::MotionRecord;
use crate::registry::PeerRegistry;
use crate::spawn::ActorSpawner;
use crate::transport::{MotionSender, TelemetryReceiver, TelemetrySender};

/// One participant's telemetry exchange session.
///
/// Construct, then [`start`](Self::start) to launch the workers. The
/// session's mailbox is where the simulation tick source publishes the
/// local motion state.
pub struct ExchangeSession {
    config: SessionConfig,
    mailbox: Arc<Mailbox<MotionRecord>>,
    registry: Arc<PeerRegistry>,
    stats: Arc<SessionStats>,
}

impl ExchangeSession {
    /// Creates a session from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ExchangeError::InvalidConfig`] if the configuration
    /// fails validation.
    pub fn new(config: SessionConfig) -> ExchangeResult<Self> {
        config.validate()?;
        let registry = Arc::new(PeerRegistry::new(config.registry_capacity));
        Ok(Self {
            config,
            mailbox: Arc::new(Mailbox::new(MotionRecord::default())),
            registry,
            stats: Arc::new(SessionStats::default()),
        })
    }

    /// The mailbox the simulation tick source publishes into.
    #[must_use]
    pub fn mailbox(&self) -> Arc<Mailbox<MotionRecord>> {
        Arc::clone(&self.mailbox)
    }

    /// The peer registry.
    #[must_use]
    pub fn registry(&self) -> Arc<PeerRegistry> {
        Arc::clone(&self.registry)
    }

    /// The session counters.
    #[must_use]
    pub fn stats(&self) -> Arc<SessionStats> {
        Arc::clone(&self.stats)
    }

    /// Opens the three sockets and launches the three workers.
    ///
    /// Socket setup happens before any thread is spawned so that setup
    /// failures surface here rather than inside a worker.
    ///
    /// # Errors
    ///
    /// Returns [`ExchangeError::Socket`] if any socket cannot be opened or
    /// a worker thread cannot be spawned.
    pub fn start<S: ActorSpawner + 'static>(self, spawner: S) -> ExchangeResult<SessionHandle> {
        let interval = Duration::from_micros(self.config.publish_interval_micros);
        let timeout = Duration::from_millis(self.config.receive_timeout_millis);

        let motion_sender = MotionSender::connect(self.config.motion_addr)?;
        let telemetry_sender =
            TelemetrySender::open(self.config.multicast_addr(), self.config.multicast_ttl)?;
        let telemetry_receiver = TelemetryReceiver::join(
            self.config.multicast_group,
            self.config.multicast_port,
            timeout,
        )?;

        tracing::info!(
            participant_id = self.config.participant_id,
            group = %self.config.multicast_addr(),
            ttl = self.config.multicast_ttl,
            "exchange session starting"
        );

        let shutdown = Arc::new(AtomicBool::new(false));
        let mut workers = Vec::with_capacity(3);

        {
            let mailbox = Arc::clone(&self.mailbox);
            let stats = Arc::clone(&self.stats);
            let shutdown = Arc::clone(&shutdown);
            workers.push((
                "motion-publisher",
                spawn_worker("motion-publisher", Arc::clone(&shutdown), move || {
                    workers::run_motion_publisher(
                        &motion_sender,
                        &mailbox,
                        &shutdown,
                        &stats,
                        interval,
                    )
                })?,
            ));
        }

        {
            let mailbox = Arc::clone(&self.mailbox);
            let stats = Arc::clone(&self.stats);
            let shutdown = Arc::clone(&shutdown);
            let local_id = self.config.participant_id;
            workers.push((
                "telemetry-publisher",
                spawn_worker("telemetry-publisher", Arc::clone(&shutdown), move || {
                    workers::run_telemetry_publisher(
                        &telemetry_sender,
                        &mailbox,
                        local_id,
                        &shutdown,
                        &stats,
                        interval,
                    )
                })?,
            ));
        }

        {
            let core = ReceiverCore::new(
                self.config.local_id(),
                Arc::clone(&self.registry),
                self.config.build_class_map(),
                spawner,
                Arc::clone(&self.stats),
            );
            let shutdown = Arc::clone(&shutdown);
            workers.push((
                "telemetry-receiver",
                spawn_worker("telemetry-receiver", Arc::clone(&shutdown), move || {
                    workers::run_receiver(&telemetry_receiver, core, &shutdown)
                })?,
            ));
        }

        Ok(SessionHandle {
            shutdown,
            workers,
            mailbox: self.mailbox,
            registry: self.registry,
            stats: self.stats,
        })
    }
}

/// Spawns a named worker thread that flips the shared shutdown flag on any
/// fatal error, so one worker's failure winds down the whole session.
fn spawn_worker<F>(
    name: &'static str,
    shutdown: Arc<AtomicBool>,
    body: F,
) -> ExchangeResult<JoinHandle<ExchangeResult<()>>>
where
    F: FnOnce() -> ExchangeResult<()> + Send + 'static,
{
    let handle = std::thread::Builder::new()
        .name(name.to_owned())
        .spawn(move || {
            let result = body();
            if let Err(error) = &result {
                tracing::error!(worker = name, %error, "worker failed, shutting session down");
                shutdown.store(true, Ordering::Release);
            }
            result
        })?;
    Ok(handle)
}

/// Handle to a running session's workers and shared state.
pub struct SessionHandle {
    shutdown: Arc<AtomicBool>,
    workers: Vec<(&'static str, JoinHandle<ExchangeResult<()>>)>,
    mailbox: Arc<Mailbox<MotionRecord>>,
    registry: Arc<PeerRegistry>,
    stats: Arc<SessionStats>,
}

impl SessionHandle {
    /// Requests shutdown; all workers exit within one publish interval /
    /// receive timeout.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    /// Returns true once shutdown has been requested (by the caller or by
    /// a failing worker).
    #[must_use]
    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// The mailbox the simulation tick source publishes into.
    #[must_use]
    pub fn mailbox(&self) -> Arc<Mailbox<MotionRecord>> {
        Arc::clone(&self.mailbox)
    }

    /// The peer registry.
    #[must_use]
    pub fn registry(&self) -> Arc<PeerRegistry> {
        Arc::clone(&self.registry)
    }

    /// The session counters.
    #[must_use]
    pub fn stats(&self) -> Arc<SessionStats> {
        Arc::clone(&self.stats)
    }

    /// Waits for all workers to exit and surfaces the first fatal error.
    ///
    /// Call [`shutdown`](Self::shutdown) first for an orderly stop; joining
    /// without it blocks until a worker fails.
    ///
    /// # Errors
    ///
    /// Returns the first worker's [`ExchangeError`], or
    /// [`ExchangeError::WorkerLost`] if a worker panicked.
    pub fn join(self) -> ExchangeResult<()> {
        let mut first_error = None;
        for (name, handle) in self.workers {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    if first_error.is_none() {
                        first_error = Some(error);
                    }
                }
                Err(_) => {
                    if first_error.is_none() {
                        first_error = Some(ExchangeError::WorkerLost(name));
                    }
                }
            }
        }
        match first_error {
            None => Ok(()),
            Some(error) => Err(error),
        }
    }
}
