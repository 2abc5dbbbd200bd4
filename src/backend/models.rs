//! Request and response payloads of the game backend's REST surface.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::engine::Dart;

/// A scoring room as the backend stores it.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomRecord {
    /// Backend-assigned room id.
    pub id: String,
    /// Human-friendly join code.
    pub code: String,
    /// Owner account id, when the room was created by a signed-in user.
    pub owner_user_id: Option<String>,
}

/// A game as the backend stores it.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Backend-assigned game id.
    pub id: String,
    /// Room the game belongs to.
    pub room_id: String,
    /// Starting score, 301 or 501.
    pub mode: u16,
    /// Whether the leg is played double-out.
    pub double_out: bool,
    /// Lifecycle status on the wire.
    pub status: crate::dto::GameStatus,
    /// Winner id once completed.
    pub winner_player_id: Option<String>,
}

/// A seated player as the backend stores it.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Backend-assigned player id.
    pub id: String,
    /// Game the player is seated in.
    pub game_id: String,
    /// Name entered at the scorer.
    pub name: String,
    /// Linked account id, if any.
    pub user_id: Option<String>,
    /// Current countdown score.
    pub remaining: u16,
    /// Position in throwing order, 0-based.
    pub seat_order: u32,
}

/// A recorded turn as the backend stores it.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    /// Backend-assigned turn id.
    pub id: String,
    /// Game the turn belongs to.
    pub game_id: String,
    /// Player who threw.
    pub player_id: String,
    /// 1-based position in the game's history.
    pub turn_index: u32,
    /// Points actually deducted; zero on a bust.
    pub scored_total: u16,
    /// Sum of every submitted dart.
    pub turn_total: u16,
    /// Whether the turn forfeited its score.
    pub is_bust: bool,
    /// Whether the turn won the leg.
    pub is_win: bool,
    /// Countdown score before the turn.
    pub remaining_before: u16,
    /// Countdown score after the turn.
    pub remaining_after: u16,
    /// Individual darts, when entered dart by dart.
    pub darts: Option<Vec<Dart>>,
    /// Board notation of the winning dart, when known.
    pub finish_dart: Option<String>,
}

/// Payload creating a new room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRoom {
    /// Join code generated on the scorer device.
    pub code: String,
    /// Scorer token hashed and stored by the backend.
    pub admin_token: String,
}

/// Payload creating a new game inside a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGame {
    /// Starting score, 301 or 501.
    pub mode: u16,
    /// Whether the leg is played double-out.
    pub double_out: bool,
}

/// Payload seating a player in a game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPlayer {
    /// Name entered at the scorer.
    pub name: String,
    /// Position in throwing order, 0-based.
    pub seat_order: u32,
}

/// Payload recording a turn.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTurn {
    /// Player who threw.
    pub player_id: String,
    /// 1-based position in the game's history.
    pub turn_index: u32,
    /// Points actually deducted; zero on a bust.
    pub scored_total: u16,
    /// Sum of every submitted dart.
    pub turn_total: u16,
    /// Whether the turn forfeited its score.
    pub is_bust: bool,
    /// Whether the turn won the leg.
    pub is_win: bool,
    /// Countdown score before the turn.
    pub remaining_before: u16,
    /// Countdown score after the turn.
    pub remaining_after: u16,
    /// Individual darts, when entered dart by dart.
    pub darts: Option<Vec<Dart>>,
    /// Board notation of the winning dart, when known.
    pub finish_dart: Option<String>,
}

/// Payload rewriting a player's countdown score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemainingUpdate {
    /// New countdown score.
    pub remaining: u16,
}

/// Payload declaring a game's winner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WinnerUpdate {
    /// Winning player id.
    pub player_id: String,
}

/// Payload moving a game to another lifecycle status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    /// Target status.
    pub status: crate::dto::GameStatus,
}
