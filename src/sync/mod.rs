//! Realtime snapshot synchronization between the scoring device and its
//! read-only followers.

pub mod connector;
pub mod registry;
pub mod transport;

#[cfg(feature = "ws-transport")]
pub use connector::WsConnector;
pub use connector::{ChannelConnector, EventChannel};
pub use registry::{ChannelClaim, ChannelRegistry};
pub use transport::{
    ConnectionState, SnapshotStream, SnapshotSyncTransport, SyncTuning, TransportError,
};
