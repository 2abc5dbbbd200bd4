//! Contract of the external game backend.

use futures::future::BoxFuture;

use super::error::BackendResult;
use super::models::{GameRecord, NewRoom, NewTurn, PlayerRecord, RoomRecord, TurnRecord};
use crate::dto::{GameSnapshotDto, GameStatus};
use crate::engine::GameSettings;

/// Credential authorizing mutations on a room's games.
///
/// Read calls never need one; every mutating call needs exactly one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomAuth {
    /// Room-scoped scorer token handed out at room creation.
    AdminToken(String),
    /// Session of the signed-in room owner.
    OwnerSession(String),
}

/// Abstraction over the remote service that stores rooms, games, players,
/// and turns, and projects authoritative snapshots.
///
/// Only the application-level contract lives here; transports and storage
/// are the implementation's business.
pub trait GameBackend: Send + Sync {
    /// Create a room with a pre-generated join code and scorer token.
    fn create_room(&self, room: NewRoom) -> BoxFuture<'static, BackendResult<RoomRecord>>;

    /// Look up a room by join code. Read-only, no credential.
    fn room_by_code(&self, code: &str) -> BoxFuture<'static, BackendResult<Option<RoomRecord>>>;

    /// Create a game inside a room.
    fn create_game(
        &self,
        room_id: &str,
        settings: &GameSettings,
        auth: &RoomAuth,
    ) -> BoxFuture<'static, BackendResult<GameRecord>>;

    /// Fetch a game by id.
    fn game_by_id(&self, game_id: &str) -> BoxFuture<'static, BackendResult<Option<GameRecord>>>;

    /// Fetch the games of a room, oldest first.
    fn games_by_room(&self, room_id: &str) -> BoxFuture<'static, BackendResult<Vec<GameRecord>>>;

    /// Seat a player in a game.
    fn add_player(
        &self,
        game_id: &str,
        name: &str,
        seat_order: u32,
        auth: &RoomAuth,
    ) -> BoxFuture<'static, BackendResult<PlayerRecord>>;

    /// Fetch the players of a game in seating order.
    fn players_by_game(
        &self,
        game_id: &str,
    ) -> BoxFuture<'static, BackendResult<Vec<PlayerRecord>>>;

    /// Record a turn.
    fn create_turn(
        &self,
        game_id: &str,
        turn: NewTurn,
        auth: &RoomAuth,
    ) -> BoxFuture<'static, BackendResult<TurnRecord>>;

    /// Fetch a page of a game's turns, oldest first.
    fn turns_by_game(
        &self,
        game_id: &str,
        limit: u32,
        offset: u32,
    ) -> BoxFuture<'static, BackendResult<Vec<TurnRecord>>>;

    /// Rewrite a player's countdown score.
    fn update_player_remaining(
        &self,
        player_id: &str,
        remaining: u16,
        auth: &RoomAuth,
    ) -> BoxFuture<'static, BackendResult<()>>;

    /// Declare a game's winner.
    fn set_game_winner(
        &self,
        game_id: &str,
        player_id: &str,
        auth: &RoomAuth,
    ) -> BoxFuture<'static, BackendResult<()>>;

    /// Move a game to another lifecycle status.
    fn update_game_status(
        &self,
        game_id: &str,
        status: GameStatus,
        auth: &RoomAuth,
    ) -> BoxFuture<'static, BackendResult<()>>;

    /// Fetch the current authoritative snapshot of a game.
    fn fetch_snapshot(
        &self,
        game_id: &str,
    ) -> BoxFuture<'static, BackendResult<GameSnapshotDto>>;
}
