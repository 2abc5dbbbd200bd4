//! Canonical game snapshot carried by the backend and the realtime channel.
//!
//! The snapshot is a reconciliation target, not the local [`Game`] value: it
//! additionally carries backend-assigned identifiers and only a window of
//! recent turns. A newly received snapshot always replaces local state in
//! full; nothing is merged field by field.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;

use crate::engine::{Dart, Game, GameMode, GamePhase, GameSettings, Player, Turn, Winner};

/// Problems turning a wire snapshot into a local game value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// The snapshot's mode is neither 301 nor 501.
    #[error("snapshot carries unsupported game mode `{0}`")]
    UnknownMode(u16),
    /// An active snapshot names a current player that is not in its roster.
    #[error("snapshot current player `{0}` is not part of the game")]
    UnknownCurrentPlayer(String),
    /// A turn references a player id that is not in the roster.
    #[error("snapshot turn references unknown player `{0}`")]
    UnknownTurnPlayer(String),
}

/// Backend lifecycle status of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    /// Created but not yet started.
    Pending,
    /// Being scored.
    Active,
    /// Finished with a winner.
    Completed,
}

/// Game header of the snapshot.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameHeaderDto {
    /// Backend-assigned game id.
    pub id: String,
    /// Starting score, 301 or 501 on the wire.
    pub mode: u16,
    /// Whether the leg is played double-out.
    pub double_out: bool,
    /// Lifecycle status.
    pub status: GameStatus,
    /// Id of the player due to throw.
    pub current_player_id: String,
    /// Room the game belongs to, when it was started from one.
    pub room_id: Option<String>,
    /// Start timestamp, epoch milliseconds.
    pub started_at: Option<i64>,
    /// Finish timestamp, epoch milliseconds.
    pub finished_at: Option<i64>,
    /// Winner id once the game completed.
    pub winner_player_id: Option<String>,
}

/// One player as the backend projects it.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerDto {
    /// Backend-assigned player id.
    pub id: String,
    /// Name entered at the scorer.
    pub name: String,
    /// Preferred display name, when the player linked an account.
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    /// Linked account id, if any.
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    /// Current countdown score.
    pub remaining: u16,
    /// Position in throwing order, 0-based.
    pub seat_order: u32,
    /// Optional backend-computed stat block; carried opaquely, local stats
    /// are always recomputed from history.
    pub stats: Option<serde_json::Value>,
}

impl PlayerDto {
    /// Name to show on scoreboards: the account display name when present,
    /// otherwise the name entered at the scorer.
    pub fn scoreboard_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

/// One recorded turn of the snapshot's recent-turns window.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnDto {
    /// Backend-assigned turn id.
    pub id: String,
    /// 1-based position in the game's history.
    pub turn_index: u32,
    /// Player who threw the turn.
    pub player_id: String,
    /// Points actually deducted; zero on a bust.
    pub scored_total: u16,
    /// Sum of every submitted dart, busts included.
    pub turn_total: u16,
    /// Whether the turn forfeited its score.
    pub is_bust: bool,
    /// Whether the turn won the leg.
    pub is_win: bool,
    /// Countdown score before the turn.
    pub remaining_before: u16,
    /// Countdown score after the turn.
    pub remaining_after: u16,
    /// Individual darts, when the turn was entered dart by dart.
    pub darts: Option<Vec<Dart>>,
    /// Board notation of the winning dart, when known.
    pub finish_dart: Option<String>,
}

/// The authoritative cross-device projection of a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshotDto {
    /// Game header.
    pub game: GameHeaderDto,
    /// Roster; array order is not significant, `seat_order` is.
    pub players: Vec<PlayerDto>,
    /// Window of the most recent turns, oldest first.
    #[serde(default)]
    pub last_turns: Vec<TurnDto>,
}

impl GameSnapshotDto {
    /// Players in throwing order, keyed by backend id. Duplicate ids keep
    /// the first occurrence.
    pub fn seated_players(&self) -> IndexMap<&str, &PlayerDto> {
        let mut seated: Vec<&PlayerDto> = self.players.iter().collect();
        seated.sort_by_key(|player| player.seat_order);

        let mut by_id = IndexMap::with_capacity(seated.len());
        for player in seated {
            by_id.entry(player.id.as_str()).or_insert(player);
        }
        by_id
    }

    /// Rebuild a local [`Game`] value from this snapshot.
    ///
    /// The result carries only the snapshot's recent-turns window as history,
    /// which is enough for display and for undoing the most recent turn.
    pub fn to_game(&self) -> Result<Game, SnapshotError> {
        let mode = GameMode::try_from(self.game.mode)
            .map_err(|_| SnapshotError::UnknownMode(self.game.mode))?;

        let seated = self.seated_players();
        let players: Vec<Player> = seated
            .values()
            .map(|dto| Player {
                name: dto.scoreboard_name().to_string(),
                remaining: dto.remaining,
            })
            .collect();

        let settings = GameSettings {
            mode,
            double_out: self.game.double_out,
            players: players.iter().map(|player| player.name.clone()).collect(),
        };

        let phase = match self.game.status {
            GameStatus::Completed => GamePhase::GameOver,
            GameStatus::Pending | GameStatus::Active => GamePhase::InProgress,
        };

        let current_player_index = match seated.get_index_of(self.game.current_player_id.as_str())
        {
            Some(index) => index,
            None if phase == GamePhase::GameOver => 0,
            None => {
                return Err(SnapshotError::UnknownCurrentPlayer(
                    self.game.current_player_id.clone(),
                ));
            }
        };

        let turn_history = self
            .last_turns
            .iter()
            .map(|turn| {
                let player_index = seated
                    .get_index_of(turn.player_id.as_str())
                    .ok_or_else(|| SnapshotError::UnknownTurnPlayer(turn.player_id.clone()))?;
                Ok(Turn {
                    number: turn.turn_index,
                    player_index,
                    darts: turn.darts.clone().unwrap_or_default(),
                    scored_points: turn.scored_total,
                    turn_total: turn.turn_total,
                    remaining_after: turn.remaining_after,
                    is_bust: turn.is_bust,
                    is_confirmed_win: turn.is_win,
                    finish_dart: turn.finish_dart.clone(),
                    previous_remaining: turn.remaining_before,
                    // The thrower was necessarily the current player.
                    previous_player_index: player_index,
                })
            })
            .collect::<Result<Vec<Turn>, SnapshotError>>()?;

        let winner = match (phase, self.game.winner_player_id.as_deref()) {
            (GamePhase::GameOver, Some(winner_id)) => {
                seated.get_index_of(winner_id).map(|index| Winner {
                    player_index: index,
                    player_name: players[index].name.clone(),
                    turns: turn_history.last().map(|turn| turn.number).unwrap_or(0),
                })
            }
            _ => None,
        };

        Ok(Game {
            settings,
            players,
            current_player_index,
            turn_history,
            phase,
            winner,
        })
    }
}
