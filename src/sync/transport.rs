//! Live subscription to a game's snapshot channel.
//!
//! [`SnapshotSyncTransport`] owns one logical channel per game. A background
//! driver task opens the channel, forwards parsed snapshots to the single
//! registered consumer, and reconnects with exponential backoff when the
//! channel drops. Once the attempt budget is exhausted the transport settles
//! in [`ConnectionState::Fallback`] and stays there: the application keeps
//! working through direct request/response calls until someone explicitly
//! disconnects and reconnects.

use std::error::Error;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::StreamExt;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, trace, warn};

use crate::dto::envelope::{RealtimeEvent, parse_event};
use crate::dto::snapshot::GameSnapshotDto;
use crate::sync::connector::{ChannelConnector, EventChannel};
use crate::sync::registry::{ChannelClaim, ChannelRegistry};

/// Default first reconnect delay.
const BASE_RECONNECT_DELAY: Duration = Duration::from_millis(1_000);
/// Default reconnect budget before giving up on the channel.
const MAX_RECONNECT_ATTEMPTS: u32 = 5;
/// Snapshots buffered between the driver and a slow consumer.
const SNAPSHOT_BUFFER: usize = 16;

/// State of the realtime channel. Describes the transport, never the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No channel and none wanted.
    Disconnected,
    /// A connection attempt is in flight.
    Connecting,
    /// The channel is open and delivering events.
    Connected,
    /// The channel dropped; a reconnect is pending.
    Error,
    /// Reconnecting was abandoned; the caller must poll the backend instead.
    Fallback,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Error => "error",
            ConnectionState::Fallback => "fallback",
        };
        f.write_str(label)
    }
}

/// Failures raised by the realtime channel.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The channel could not be established.
    #[error("failed to open realtime channel `{url}`")]
    Open {
        /// Address the connection was attempted against.
        url: String,
        /// Underlying connector failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// Reading from an open channel failed.
    #[error("realtime channel read failed")]
    Read {
        /// Underlying connector failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The peer closed the channel.
    #[error("realtime channel closed by peer")]
    Closed,
    /// Another transport of this client already owns the game's channel.
    #[error("realtime channel for game `{game_id}` is already claimed")]
    ChannelBusy {
        /// Game whose channel was contested.
        game_id: String,
    },
}

/// Reconnect behavior knobs.
#[derive(Debug, Clone)]
pub struct SyncTuning {
    /// Delay before the first reconnect attempt; later attempts double it.
    pub base_delay: Duration,
    /// Reconnect attempts allowed before settling in fallback.
    pub max_reconnect_attempts: u32,
}

impl Default for SyncTuning {
    fn default() -> Self {
        Self {
            base_delay: BASE_RECONNECT_DELAY,
            max_reconnect_attempts: MAX_RECONNECT_ATTEMPTS,
        }
    }
}

impl SyncTuning {
    /// Backoff delay before reconnect `attempt` (1-based): `base * 2^(n-1)`.
    fn reconnect_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32
            .checked_pow(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

/// Stream of authoritative snapshots handed to the one registered consumer.
pub type SnapshotStream = ReceiverStream<GameSnapshotDto>;

/// Mutable connection bookkeeping behind the transport handle.
struct TransportInner {
    claim: Option<ChannelClaim>,
    shutdown: Option<watch::Sender<bool>>,
    driver: Option<JoinHandle<()>>,
}

/// Maintains the single realtime subscription for one game.
pub struct SnapshotSyncTransport {
    game_id: Arc<str>,
    connector: Arc<dyn ChannelConnector>,
    registry: ChannelRegistry,
    tuning: SyncTuning,
    state: Arc<watch::Sender<ConnectionState>>,
    snapshots: mpsc::Sender<GameSnapshotDto>,
    inner: Mutex<TransportInner>,
}

impl SnapshotSyncTransport {
    /// Build a transport for `game_id` together with its snapshot stream.
    /// Nothing connects until [`connect`](Self::connect) is called.
    pub fn new(
        game_id: impl Into<String>,
        connector: Arc<dyn ChannelConnector>,
        registry: ChannelRegistry,
        tuning: SyncTuning,
    ) -> (Self, SnapshotStream) {
        let (snapshots_tx, snapshots_rx) = mpsc::channel(SNAPSHOT_BUFFER);
        let (state_tx, _state_rx) = watch::channel(ConnectionState::Disconnected);

        let transport = Self {
            game_id: Arc::from(game_id.into()),
            connector,
            registry,
            tuning,
            state: Arc::new(state_tx),
            snapshots: snapshots_tx,
            inner: Mutex::new(TransportInner {
                claim: None,
                shutdown: None,
                driver: None,
            }),
        };

        (transport, ReceiverStream::new(snapshots_rx))
    }

    /// Current channel state.
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Watch channel state changes.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Game this transport is subscribed to.
    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    /// Start (or restart, after fallback) the connection driver.
    ///
    /// A no-op while a driver is already connecting or connected. Fails with
    /// [`TransportError::ChannelBusy`] when another transport of this client
    /// holds the game's channel.
    pub fn connect(&self) -> Result<(), TransportError> {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if inner.driver.as_ref().is_some_and(|task| !task.is_finished()) {
            return Ok(());
        }

        if inner.claim.is_none() {
            inner.claim = Some(self.registry.claim(&self.game_id)?);
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        self.set_state(ConnectionState::Connecting);

        let driver = ChannelDriver {
            game_id: Arc::clone(&self.game_id),
            connector: Arc::clone(&self.connector),
            tuning: self.tuning.clone(),
            state: Arc::clone(&self.state),
            snapshots: self.snapshots.clone(),
        };

        inner.shutdown = Some(shutdown_tx);
        inner.driver = Some(tokio::spawn(driver.run(shutdown_rx)));
        Ok(())
    }

    /// Tear down the channel, cancel any pending reconnect, and release the
    /// channel claim. Always leaves the transport disconnected.
    pub async fn disconnect(&self) {
        let (shutdown, driver, claim) = {
            let mut inner = self
                .inner
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            (inner.shutdown.take(), inner.driver.take(), inner.claim.take())
        };

        if let Some(shutdown) = shutdown {
            let _ = shutdown.send(true);
        }
        if let Some(driver) = driver {
            let _ = driver.await;
        }
        drop(claim);

        self.set_state(ConnectionState::Disconnected);
    }

    fn set_state(&self, next: ConnectionState) {
        if *self.state.borrow() != next {
            let _ = self.state.send(next);
        }
    }
}

/// Why the read loop returned control to the driver.
enum ReadEnd {
    /// Disconnect was requested.
    Shutdown,
    /// The snapshot consumer dropped its stream; nothing left to deliver to.
    ConsumerGone,
    /// The channel errored or was closed by the peer.
    Failed,
}

/// Background task owning the connect/read/reconnect cycle.
struct ChannelDriver {
    game_id: Arc<str>,
    connector: Arc<dyn ChannelConnector>,
    tuning: SyncTuning,
    state: Arc<watch::Sender<ConnectionState>>,
    snapshots: mpsc::Sender<GameSnapshotDto>,
}

impl ChannelDriver {
    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut attempt: u32 = 0;

        loop {
            self.set_state(ConnectionState::Connecting);
            let opened = tokio::select! {
                _ = shutdown.changed() => return,
                opened = self.connector.open(&self.game_id) => opened,
            };

            match opened {
                Ok(channel) => {
                    info!(game_id = %self.game_id, "realtime channel connected");
                    attempt = 0;
                    self.set_state(ConnectionState::Connected);

                    match self.pump(channel, &mut shutdown).await {
                        ReadEnd::Shutdown => return,
                        ReadEnd::ConsumerGone => {
                            self.set_state(ConnectionState::Disconnected);
                            return;
                        }
                        ReadEnd::Failed => self.set_state(ConnectionState::Error),
                    }
                }
                Err(error) => {
                    warn!(game_id = %self.game_id, %error, "failed to open realtime channel");
                    self.set_state(ConnectionState::Error);
                }
            }

            attempt += 1;
            if attempt > self.tuning.max_reconnect_attempts {
                warn!(
                    game_id = %self.game_id,
                    attempts = attempt - 1,
                    "exhausted reconnect attempts; relying on direct backend calls"
                );
                self.set_state(ConnectionState::Fallback);
                return;
            }

            let delay = self.tuning.reconnect_delay(attempt);
            debug!(
                game_id = %self.game_id,
                attempt,
                max = self.tuning.max_reconnect_attempts,
                ?delay,
                "scheduling reconnect"
            );
            tokio::select! {
                _ = shutdown.changed() => return,
                _ = sleep(delay) => {}
            }
        }
    }

    /// Forward snapshots from an open channel until it ends or we are told
    /// to stop.
    async fn pump(
        &self,
        mut channel: EventChannel,
        shutdown: &mut watch::Receiver<bool>,
    ) -> ReadEnd {
        loop {
            let message = tokio::select! {
                _ = shutdown.changed() => return ReadEnd::Shutdown,
                message = channel.next() => message,
            };

            match message {
                None => {
                    info!(game_id = %self.game_id, "realtime channel ended");
                    return ReadEnd::Failed;
                }
                Some(Err(error)) => {
                    warn!(game_id = %self.game_id, %error, "realtime channel failed");
                    return ReadEnd::Failed;
                }
                Some(Ok(raw)) => match parse_event(&raw) {
                    Some(RealtimeEvent::GameSnapshot(snapshot)) => {
                        if self.snapshots.send(snapshot).await.is_err() {
                            debug!(game_id = %self.game_id, "snapshot consumer dropped");
                            return ReadEnd::ConsumerGone;
                        }
                    }
                    Some(_) => {
                        // Snapshots carry complete state; the lightweight
                        // turn events add nothing for this client.
                        trace!(game_id = %self.game_id, "ignoring non-snapshot event");
                    }
                    None => {}
                },
            }
        }
    }

    fn set_state(&self, next: ConnectionState) {
        if *self.state.borrow() != next {
            let _ = self.state.send(next);
        }
    }
}
