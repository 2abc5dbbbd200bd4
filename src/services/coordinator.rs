//! Glue between the pure scoring engine and the external game backend.
//!
//! The coordinator keeps a local [`Game`] value, pushes every mutation to the
//! backend, and treats its own post-state as a provisional forecast only: the
//! next authoritative snapshot (fetched here or pushed over the realtime
//! channel) replaces local state in full. There is no field-level merge.

use std::sync::Arc;

use rand::Rng;
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::backend::models::{NewRoom, NewTurn, RoomRecord};
use crate::backend::{GameBackend, RoomAuth};
use crate::dto::{GameSnapshotDto, GameStatus};
use crate::engine::{self, Dart, Game, GameSettings, PlayerStats, compute_stats};
use crate::error::ServiceError;

/// Join-code alphabet; glyphs that read alike are excluded.
const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
/// Length of a join code.
const ROOM_CODE_LEN: usize = 6;

/// A freshly created room together with its scorer credential. The token is
/// only ever available here; the backend stores a hash.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    /// The created room.
    pub room: RoomRecord,
    /// Room-scoped scorer token authorizing mutations.
    pub admin_token: String,
}

/// Generate a human-friendly room join code.
pub fn generate_room_code() -> String {
    let mut rng = rand::rng();
    (0..ROOM_CODE_LEN)
        .map(|_| {
            let index = rng.random_range(0..ROOM_CODE_ALPHABET.len());
            ROOM_CODE_ALPHABET[index] as char
        })
        .collect()
}

/// Create a room with a generated join code and scorer token.
pub async fn create_room(backend: &dyn GameBackend) -> Result<RoomHandle, ServiceError> {
    let code = generate_room_code();
    let admin_token = Uuid::new_v4().simple().to_string();

    let room = backend
        .create_room(NewRoom {
            code,
            admin_token: admin_token.clone(),
        })
        .await?;

    info!(room_id = %room.id, code = %room.code, "room created");
    Ok(RoomHandle { room, admin_token })
}

/// Look up a room by join code. Read-only, no credential.
pub async fn find_room(backend: &dyn GameBackend, code: &str) -> Result<RoomRecord, ServiceError> {
    backend
        .room_by_code(code)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Room not found. Please check the code.".into()))
}

/// Drives one game against the backend on behalf of a device.
///
/// Scorer devices construct it with [`start_game`](Self::start_game) and a
/// credential; display devices [`attach`](Self::attach) without one and can
/// only observe.
pub struct GameCoordinator {
    backend: Arc<dyn GameBackend>,
    auth: Option<RoomAuth>,
    game_id: String,
    /// Backend player ids aligned with the engine's seating order.
    player_ids: Vec<String>,
    game: Game,
}

impl GameCoordinator {
    /// Create a game in a room, seat its players, and return a scoring
    /// coordinator holding the fresh local game value.
    pub async fn start_game(
        backend: Arc<dyn GameBackend>,
        room_id: &str,
        settings: GameSettings,
        auth: RoomAuth,
    ) -> Result<Self, ServiceError> {
        settings.validate()?;

        let record = backend.create_game(room_id, &settings, &auth).await?;
        let mut player_ids = Vec::with_capacity(settings.players.len());
        for (seat, name) in settings.players.iter().enumerate() {
            let player = backend
                .add_player(&record.id, name, seat as u32, &auth)
                .await?;
            player_ids.push(player.id);
        }

        info!(game_id = %record.id, players = player_ids.len(), "game started");
        Ok(Self {
            backend,
            auth: Some(auth),
            game_id: record.id,
            player_ids,
            game: engine::start_game(settings),
        })
    }

    /// Attach to an existing game from its authoritative snapshot, without a
    /// credential. Every mutating call on the result fails with an
    /// authorization error; snapshots keep it current.
    pub async fn attach(
        backend: Arc<dyn GameBackend>,
        game_id: &str,
    ) -> Result<Self, ServiceError> {
        let snapshot = backend.fetch_snapshot(game_id).await?;
        let game = snapshot.to_game()?;
        let player_ids = snapshot
            .seated_players()
            .keys()
            .map(|id| id.to_string())
            .collect();

        Ok(Self {
            backend,
            auth: None,
            game_id: game_id.to_string(),
            player_ids,
            game,
        })
    }

    /// The current local game value.
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Backend id of the coordinated game.
    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    /// Per-player metrics of the current local game value.
    pub fn stats(&self) -> Vec<PlayerStats> {
        compute_stats(&self.game)
    }

    /// Score the current player's turn from an aggregate total, persist it,
    /// and reconcile with the backend's snapshot.
    pub async fn submit_total_turn(&mut self, score: u16) -> Result<&Game, ServiceError> {
        let auth = self.require_auth()?.clone();
        let next = self.game.apply_total_turn(score)?;
        self.persist_turn(&next, &auth).await?;
        self.game = next;
        self.resync().await;
        Ok(&self.game)
    }

    /// Score the current player's turn dart by dart, persist it, and
    /// reconcile with the backend's snapshot.
    pub async fn submit_dart_turn(&mut self, darts: &[Dart]) -> Result<&Game, ServiceError> {
        let auth = self.require_auth()?.clone();
        let next = self.game.apply_dart_turn(darts)?;
        self.persist_turn(&next, &auth).await?;
        self.game = next;
        self.resync().await;
        Ok(&self.game)
    }

    /// Reverse the most recent turn and push the restored score.
    pub async fn undo_last_turn(&mut self) -> Result<&Game, ServiceError> {
        let auth = self.require_auth()?.clone();
        self.undo_inner(&auth).await?;
        self.resync().await;
        Ok(&self.game)
    }

    /// Replace the most recent turn's score: undo it, then resubmit the new
    /// total as one operation with a single reconciliation at the end.
    pub async fn edit_last_turn(&mut self, new_score: u16) -> Result<&Game, ServiceError> {
        let auth = self.require_auth()?.clone();
        self.undo_inner(&auth).await?;

        let next = self.game.apply_total_turn(new_score)?;
        self.persist_turn(&next, &auth).await?;
        self.game = next;
        self.resync().await;
        Ok(&self.game)
    }

    /// Replace local state with an authoritative snapshot (last write wins).
    pub fn apply_snapshot(&mut self, snapshot: &GameSnapshotDto) -> Result<(), ServiceError> {
        let game = snapshot.to_game()?;
        self.player_ids = snapshot
            .seated_players()
            .keys()
            .map(|id| id.to_string())
            .collect();
        debug!(
            game_id = %self.game_id,
            turns = game.turn_history.len(),
            "applied authoritative snapshot"
        );
        self.game = game;
        Ok(())
    }

    /// Fetch the authoritative snapshot and replace local state. This is the
    /// polling path used while the realtime channel is in fallback mode.
    pub async fn refresh(&mut self) -> Result<&Game, ServiceError> {
        let snapshot = self.backend.fetch_snapshot(&self.game_id).await?;
        self.apply_snapshot(&snapshot)?;
        Ok(&self.game)
    }

    fn require_auth(&self) -> Result<&RoomAuth, ServiceError> {
        self.auth.as_ref().ok_or_else(|| {
            ServiceError::Unauthorized(
                "Admin token required. Please enter your scorer token.".into(),
            )
        })
    }

    fn backend_player_id(&self, seat: usize) -> Result<&str, ServiceError> {
        self.player_ids
            .get(seat)
            .map(String::as_str)
            .ok_or_else(|| ServiceError::NotFound(format!("seat {seat} has no backend player")))
    }

    /// Push the newest turn of `next` to the backend, including the winner
    /// declaration when the turn ended the leg.
    async fn persist_turn(&self, next: &Game, auth: &RoomAuth) -> Result<(), ServiceError> {
        let Some(turn) = next.turn_history.last() else {
            return Ok(());
        };
        let player_id = self.backend_player_id(turn.player_index)?.to_string();

        let record = NewTurn {
            player_id: player_id.clone(),
            turn_index: turn.number,
            scored_total: turn.scored_points,
            turn_total: turn.turn_total,
            is_bust: turn.is_bust,
            is_win: turn.is_confirmed_win,
            remaining_before: turn.previous_remaining,
            remaining_after: turn.remaining_after,
            darts: (!turn.darts.is_empty()).then(|| turn.darts.clone()),
            finish_dart: turn.finish_dart.clone(),
        };

        self.backend
            .create_turn(&self.game_id, record, auth)
            .await?;
        self.backend
            .update_player_remaining(&player_id, turn.remaining_after, auth)
            .await?;

        if next.is_over() {
            self.backend
                .set_game_winner(&self.game_id, &player_id, auth)
                .await?;
            self.backend
                .update_game_status(&self.game_id, GameStatus::Completed, auth)
                .await?;
        }

        Ok(())
    }

    /// Undo locally and push the restored score, without reconciling yet.
    async fn undo_inner(&mut self, auth: &RoomAuth) -> Result<(), ServiceError> {
        let Some(last) = self.game.turn_history.last().cloned() else {
            return Err(ServiceError::NothingToUndo);
        };
        let was_over = self.game.is_over();
        let player_id = self.backend_player_id(last.player_index)?.to_string();

        self.backend
            .update_player_remaining(&player_id, last.previous_remaining, auth)
            .await?;
        if was_over {
            self.backend
                .update_game_status(&self.game_id, GameStatus::Active, auth)
                .await?;
        }

        self.game = self.game.undo_last_turn();
        Ok(())
    }

    /// Refetch the authoritative snapshot after a mutation. Failures keep the
    /// optimistic local value; a later push or poll supersedes it anyway.
    async fn resync(&mut self) {
        match self.backend.fetch_snapshot(&self.game_id).await {
            Ok(snapshot) => {
                if let Err(error) = self.apply_snapshot(&snapshot) {
                    warn!(game_id = %self.game_id, %error, "ignoring unusable snapshot");
                }
            }
            Err(error) => {
                warn!(
                    game_id = %self.game_id,
                    %error,
                    "snapshot refetch failed; keeping optimistic state"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use futures::FutureExt;
    use futures::future::BoxFuture;
    use serde_json::json;

    use super::*;
    use crate::backend::BackendResult;
    use crate::backend::error::BackendError;
    use crate::backend::models::{GameRecord, PlayerRecord, TurnRecord};
    use crate::engine::{GameMode, GamePhase};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        CreateRoom(String),
        RoomByCode(String),
        CreateGame,
        AddPlayer(String, u32),
        CreateTurn(NewTurn),
        UpdateRemaining(String, u16),
        SetWinner(String),
        UpdateStatus(GameStatus),
        FetchSnapshot,
    }

    #[derive(Default)]
    struct MockState {
        calls: Vec<Call>,
        room: Option<RoomRecord>,
        snapshot: Option<GameSnapshotDto>,
    }

    #[derive(Clone, Default)]
    struct MockBackend {
        state: Arc<StdMutex<MockState>>,
    }

    impl MockBackend {
        fn calls(&self) -> Vec<Call> {
            self.state.lock().unwrap().calls.clone()
        }

        fn set_snapshot(&self, snapshot: GameSnapshotDto) {
            self.state.lock().unwrap().snapshot = Some(snapshot);
        }

        fn set_room(&self, room: RoomRecord) {
            self.state.lock().unwrap().room = Some(room);
        }
    }

    impl GameBackend for MockBackend {
        fn create_room(&self, room: NewRoom) -> BoxFuture<'static, BackendResult<RoomRecord>> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call::CreateRoom(room.code.clone()));
            futures::future::ready(Ok(RoomRecord {
                id: "r-1".into(),
                code: room.code,
                owner_user_id: None,
            }))
            .boxed()
        }

        fn room_by_code(
            &self,
            code: &str,
        ) -> BoxFuture<'static, BackendResult<Option<RoomRecord>>> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call::RoomByCode(code.to_string()));
            futures::future::ready(Ok(state.room.clone())).boxed()
        }

        fn create_game(
            &self,
            room_id: &str,
            settings: &GameSettings,
            _auth: &RoomAuth,
        ) -> BoxFuture<'static, BackendResult<GameRecord>> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call::CreateGame);
            futures::future::ready(Ok(GameRecord {
                id: "g-1".into(),
                room_id: room_id.to_string(),
                mode: settings.mode.starting_score(),
                double_out: settings.double_out,
                status: GameStatus::Active,
                winner_player_id: None,
            }))
            .boxed()
        }

        fn game_by_id(
            &self,
            _game_id: &str,
        ) -> BoxFuture<'static, BackendResult<Option<GameRecord>>> {
            futures::future::ready(Ok(None)).boxed()
        }

        fn games_by_room(
            &self,
            _room_id: &str,
        ) -> BoxFuture<'static, BackendResult<Vec<GameRecord>>> {
            futures::future::ready(Ok(Vec::new())).boxed()
        }

        fn add_player(
            &self,
            game_id: &str,
            name: &str,
            seat_order: u32,
            _auth: &RoomAuth,
        ) -> BoxFuture<'static, BackendResult<PlayerRecord>> {
            let mut state = self.state.lock().unwrap();
            state
                .calls
                .push(Call::AddPlayer(name.to_string(), seat_order));
            futures::future::ready(Ok(PlayerRecord {
                id: format!("p-{seat_order}"),
                game_id: game_id.to_string(),
                name: name.to_string(),
                user_id: None,
                remaining: 501,
                seat_order,
            }))
            .boxed()
        }

        fn players_by_game(
            &self,
            _game_id: &str,
        ) -> BoxFuture<'static, BackendResult<Vec<PlayerRecord>>> {
            futures::future::ready(Ok(Vec::new())).boxed()
        }

        fn create_turn(
            &self,
            game_id: &str,
            turn: NewTurn,
            _auth: &RoomAuth,
        ) -> BoxFuture<'static, BackendResult<TurnRecord>> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call::CreateTurn(turn.clone()));
            futures::future::ready(Ok(TurnRecord {
                id: format!("t-{}", turn.turn_index),
                game_id: game_id.to_string(),
                player_id: turn.player_id,
                turn_index: turn.turn_index,
                scored_total: turn.scored_total,
                turn_total: turn.turn_total,
                is_bust: turn.is_bust,
                is_win: turn.is_win,
                remaining_before: turn.remaining_before,
                remaining_after: turn.remaining_after,
                darts: turn.darts,
                finish_dart: turn.finish_dart,
            }))
            .boxed()
        }

        fn turns_by_game(
            &self,
            _game_id: &str,
            _limit: u32,
            _offset: u32,
        ) -> BoxFuture<'static, BackendResult<Vec<TurnRecord>>> {
            futures::future::ready(Ok(Vec::new())).boxed()
        }

        fn update_player_remaining(
            &self,
            player_id: &str,
            remaining: u16,
            _auth: &RoomAuth,
        ) -> BoxFuture<'static, BackendResult<()>> {
            let mut state = self.state.lock().unwrap();
            state
                .calls
                .push(Call::UpdateRemaining(player_id.to_string(), remaining));
            futures::future::ready(Ok(())).boxed()
        }

        fn set_game_winner(
            &self,
            _game_id: &str,
            player_id: &str,
            _auth: &RoomAuth,
        ) -> BoxFuture<'static, BackendResult<()>> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call::SetWinner(player_id.to_string()));
            futures::future::ready(Ok(())).boxed()
        }

        fn update_game_status(
            &self,
            _game_id: &str,
            status: GameStatus,
            _auth: &RoomAuth,
        ) -> BoxFuture<'static, BackendResult<()>> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call::UpdateStatus(status));
            futures::future::ready(Ok(())).boxed()
        }

        fn fetch_snapshot(
            &self,
            game_id: &str,
        ) -> BoxFuture<'static, BackendResult<GameSnapshotDto>> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call::FetchSnapshot);
            let result = state.snapshot.clone().ok_or_else(|| BackendError::NotFound {
                message: format!("game `{game_id}` has no snapshot"),
            });
            futures::future::ready(result).boxed()
        }
    }

    fn settings(players: &[&str]) -> GameSettings {
        GameSettings {
            mode: GameMode::FiveOhOne,
            double_out: false,
            players: players.iter().map(|name| name.to_string()).collect(),
        }
    }

    fn admin() -> RoomAuth {
        RoomAuth::AdminToken("token".into())
    }

    fn snapshot_with_remaining(remaining: u16) -> GameSnapshotDto {
        serde_json::from_value(json!({
            "game": {
                "id": "g-1",
                "mode": 501,
                "double_out": false,
                "status": "active",
                "current_player_id": "p-0"
            },
            "players": [
                {"id": "p-0", "name": "Ada", "remaining": remaining, "seat_order": 0},
                {"id": "p-1", "name": "Grace", "remaining": 501, "seat_order": 1}
            ],
            "last_turns": []
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn create_room_generates_code_and_token() {
        let backend = MockBackend::default();
        let handle = create_room(&backend).await.unwrap();

        assert_eq!(handle.room.id, "r-1");
        assert_eq!(handle.room.code.len(), ROOM_CODE_LEN);
        assert!(
            handle
                .room
                .code
                .bytes()
                .all(|byte| ROOM_CODE_ALPHABET.contains(&byte))
        );
        assert_eq!(handle.admin_token.len(), 32);
        assert_eq!(backend.calls(), vec![Call::CreateRoom(handle.room.code)]);
    }

    #[tokio::test]
    async fn find_room_reports_a_friendly_not_found() {
        let backend = MockBackend::default();
        let error = find_room(&backend, "XYZ234").await.unwrap_err();
        assert_eq!(
            error.user_message(),
            "not found: Room not found. Please check the code."
        );

        backend.set_room(RoomRecord {
            id: "r-1".into(),
            code: "XYZ234".into(),
            owner_user_id: None,
        });
        let room = find_room(&backend, "XYZ234").await.unwrap();
        assert_eq!(room.id, "r-1");
    }

    #[tokio::test]
    async fn start_game_seats_players_in_order() {
        let backend = Arc::new(MockBackend::default());
        let coordinator = GameCoordinator::start_game(
            backend.clone(),
            "r-1",
            settings(&["Ada", "Grace"]),
            admin(),
        )
        .await
        .unwrap();

        assert_eq!(coordinator.game_id(), "g-1");
        assert_eq!(coordinator.player_ids, vec!["p-0", "p-1"]);
        assert_eq!(coordinator.game().players.len(), 2);
        assert_eq!(
            backend.calls(),
            vec![
                Call::CreateGame,
                Call::AddPlayer("Ada".into(), 0),
                Call::AddPlayer("Grace".into(), 1),
            ]
        );
    }

    #[tokio::test]
    async fn invalid_settings_never_reach_the_backend() {
        let backend = Arc::new(MockBackend::default());
        let error = GameCoordinator::start_game(backend.clone(), "r-1", settings(&[]), admin())
            .await
            .err()
            .expect("empty player list must be rejected");

        assert!(matches!(error, ServiceError::InvalidSettings(_)));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn submitting_a_turn_persists_and_advances() {
        let backend = Arc::new(MockBackend::default());
        let mut coordinator = GameCoordinator::start_game(
            backend.clone(),
            "r-1",
            settings(&["Ada", "Grace"]),
            admin(),
        )
        .await
        .unwrap();

        coordinator.submit_total_turn(60).await.unwrap();

        assert_eq!(coordinator.game().players[0].remaining, 441);
        assert_eq!(coordinator.game().current_player_index, 1);

        let calls = backend.calls();
        let turn = calls
            .iter()
            .find_map(|call| match call {
                Call::CreateTurn(turn) => Some(turn.clone()),
                _ => None,
            })
            .expect("turn was persisted");
        assert_eq!(turn.player_id, "p-0");
        assert_eq!(turn.turn_index, 1);
        assert_eq!(turn.scored_total, 60);
        assert!(calls.contains(&Call::UpdateRemaining("p-0".into(), 441)));
        assert!(calls.contains(&Call::FetchSnapshot));
    }

    #[tokio::test]
    async fn an_invalid_turn_touches_nothing() {
        let backend = Arc::new(MockBackend::default());
        let mut coordinator =
            GameCoordinator::start_game(backend.clone(), "r-1", settings(&["Ada"]), admin())
                .await
                .unwrap();
        let calls_before = backend.calls().len();

        let error = coordinator.submit_total_turn(181).await.unwrap_err();
        assert!(matches!(error, ServiceError::InvalidTurn(_)));
        assert_eq!(backend.calls().len(), calls_before);
        assert!(coordinator.game().turn_history.is_empty());
    }

    #[tokio::test]
    async fn the_authoritative_snapshot_supersedes_the_local_forecast() {
        let backend = Arc::new(MockBackend::default());
        let mut coordinator = GameCoordinator::start_game(
            backend.clone(),
            "r-1",
            settings(&["Ada", "Grace"]),
            admin(),
        )
        .await
        .unwrap();

        // Another device edited the turn: the backend says 430, not 441.
        backend.set_snapshot(snapshot_with_remaining(430));
        coordinator.submit_total_turn(60).await.unwrap();

        assert_eq!(coordinator.game().players[0].remaining, 430);
    }

    #[tokio::test]
    async fn a_winning_turn_completes_the_game() {
        let backend = Arc::new(MockBackend::default());
        let mut coordinator =
            GameCoordinator::start_game(backend.clone(), "r-1", settings(&["Ada"]), admin())
                .await
                .unwrap();

        coordinator.submit_total_turn(180).await.unwrap();
        coordinator.submit_total_turn(180).await.unwrap();
        coordinator.submit_total_turn(141).await.unwrap();

        assert_eq!(coordinator.game().phase, GamePhase::GameOver);
        let calls = backend.calls();
        assert!(calls.contains(&Call::SetWinner("p-0".into())));
        assert!(calls.contains(&Call::UpdateStatus(GameStatus::Completed)));
    }

    #[tokio::test]
    async fn undo_without_history_is_rejected() {
        let backend = Arc::new(MockBackend::default());
        let mut coordinator =
            GameCoordinator::start_game(backend.clone(), "r-1", settings(&["Ada"]), admin())
                .await
                .unwrap();
        let calls_before = backend.calls().len();

        let error = coordinator.undo_last_turn().await.unwrap_err();
        assert!(matches!(error, ServiceError::NothingToUndo));
        assert_eq!(backend.calls().len(), calls_before);
    }

    #[tokio::test]
    async fn undo_restores_the_score_and_reopens_the_game() {
        let backend = Arc::new(MockBackend::default());
        let mut coordinator =
            GameCoordinator::start_game(backend.clone(), "r-1", settings(&["Ada"]), admin())
                .await
                .unwrap();

        coordinator.submit_total_turn(180).await.unwrap();
        coordinator.submit_total_turn(180).await.unwrap();
        coordinator.submit_total_turn(141).await.unwrap();
        assert!(coordinator.game().is_over());

        coordinator.undo_last_turn().await.unwrap();

        assert_eq!(coordinator.game().phase, GamePhase::InProgress);
        assert!(coordinator.game().winner.is_none());
        assert_eq!(coordinator.game().players[0].remaining, 141);

        let calls = backend.calls();
        assert!(calls.contains(&Call::UpdateRemaining("p-0".into(), 141)));
        assert!(calls.contains(&Call::UpdateStatus(GameStatus::Active)));
    }

    #[tokio::test]
    async fn editing_the_last_turn_replaces_its_score() {
        let backend = Arc::new(MockBackend::default());
        let mut coordinator =
            GameCoordinator::start_game(backend.clone(), "r-1", settings(&["Ada"]), admin())
                .await
                .unwrap();

        coordinator.submit_total_turn(60).await.unwrap();
        coordinator.edit_last_turn(100).await.unwrap();

        assert_eq!(coordinator.game().turn_history.len(), 1);
        let turn = coordinator.game().turn_history.last().unwrap();
        assert_eq!(turn.scored_points, 100);
        assert_eq!(turn.number, 1);
        assert_eq!(coordinator.game().players[0].remaining, 401);

        let calls = backend.calls();
        // The undo pushed the restored score before the resubmission.
        assert!(calls.contains(&Call::UpdateRemaining("p-0".into(), 501)));
        assert!(calls.contains(&Call::UpdateRemaining("p-0".into(), 401)));
    }

    #[tokio::test]
    async fn an_attached_display_cannot_mutate() {
        let backend = Arc::new(MockBackend::default());
        backend.set_snapshot(snapshot_with_remaining(441));

        let mut coordinator = GameCoordinator::attach(backend.clone(), "g-1").await.unwrap();
        assert_eq!(coordinator.game().players[0].remaining, 441);
        assert_eq!(coordinator.player_ids, vec!["p-0", "p-1"]);
        let calls_before = backend.calls().len();

        let error = coordinator.submit_total_turn(60).await.unwrap_err();
        assert_eq!(
            error.user_message(),
            "Admin token required. Please enter your scorer token."
        );
        assert!(matches!(
            coordinator.undo_last_turn().await.unwrap_err(),
            ServiceError::Unauthorized(_)
        ));
        assert_eq!(backend.calls().len(), calls_before);
    }

    #[tokio::test]
    async fn refresh_polls_the_authoritative_snapshot() {
        let backend = Arc::new(MockBackend::default());
        backend.set_snapshot(snapshot_with_remaining(441));
        let mut coordinator = GameCoordinator::attach(backend.clone(), "g-1").await.unwrap();

        backend.set_snapshot(snapshot_with_remaining(301));
        coordinator.refresh().await.unwrap();

        assert_eq!(coordinator.game().players[0].remaining, 301);
    }
}
