//! Envelope wrapping every message on a game's realtime channel.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dto::snapshot::GameSnapshotDto;

/// Messages accepted from the realtime channel.
///
/// Only [`RealtimeEvent::GameSnapshot`] has to be interpreted: a snapshot
/// carries complete state, so the lightweight turn events are informational
/// and may be ignored by consumers.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum RealtimeEvent {
    /// Full authoritative game state.
    #[serde(rename = "GAME_SNAPSHOT")]
    GameSnapshot(GameSnapshotDto),
    /// A turn was appended. Redundant with the next snapshot.
    #[serde(rename = "TURN_ADDED")]
    TurnAdded(serde_json::Value),
    /// The most recent turn was removed. Redundant with the next snapshot.
    #[serde(rename = "TURN_UNDONE")]
    TurnUndone(serde_json::Value),
    /// The most recent turn was replaced. Redundant with the next snapshot.
    #[serde(rename = "TURN_EDITED")]
    TurnEdited(serde_json::Value),
    /// Forward-compatibility catch-all for event types this client does not
    /// know about.
    #[serde(other)]
    Unknown,
}

/// Parse one raw channel message into an event.
///
/// Malformed messages yield `None` and must never disturb the subscription;
/// they are logged at debug level and dropped.
pub fn parse_event(raw: &str) -> Option<RealtimeEvent> {
    match serde_json::from_str::<RealtimeEvent>(raw) {
        Ok(event) => Some(event),
        Err(error) => {
            debug!(%error, "discarding malformed realtime message");
            None
        }
    }
}
