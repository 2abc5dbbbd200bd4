//! Parking a game between sessions.
//!
//! Persistence is a collaborator, not a core concern: callers invoke the
//! store after a successful operation, the engine never does. The crate only
//! ships an in-memory implementation; durable stores live with the host
//! application.

use std::sync::Mutex;

use thiserror::Error;

use crate::engine::Game;

/// Failures while saving or restoring a parked game.
#[derive(Debug, Error)]
pub enum SavedGameError {
    /// The game value could not be serialized or deserialized.
    #[error("saved game is unreadable")]
    Codec {
        /// Underlying serde failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Stash for at most one in-flight game per device.
pub trait SavedGameStore: Send + Sync {
    /// Persist the game, replacing any previously saved one.
    fn save(&self, game: &Game) -> Result<(), SavedGameError>;
    /// Restore the saved game, if any.
    fn load(&self) -> Result<Option<Game>, SavedGameError>;
    /// Drop the saved game.
    fn clear(&self);
}

/// In-memory store holding the game as serialized JSON, the same shape a
/// durable implementation would persist.
#[derive(Default)]
pub struct MemorySavedGameStore {
    slot: Mutex<Option<String>>,
}

impl MemorySavedGameStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SavedGameStore for MemorySavedGameStore {
    fn save(&self, game: &Game) -> Result<(), SavedGameError> {
        let encoded =
            serde_json::to_string(game).map_err(|source| SavedGameError::Codec { source })?;
        let mut slot = self.slot.lock().unwrap_or_else(|poison| poison.into_inner());
        *slot = Some(encoded);
        Ok(())
    }

    fn load(&self) -> Result<Option<Game>, SavedGameError> {
        let slot = self.slot.lock().unwrap_or_else(|poison| poison.into_inner());
        slot.as_deref()
            .map(|encoded| {
                serde_json::from_str(encoded).map_err(|source| SavedGameError::Codec { source })
            })
            .transpose()
    }

    fn clear(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(|poison| poison.into_inner());
        slot.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{GameMode, GameSettings, start_game};

    fn sample_game() -> Game {
        let game = start_game(GameSettings {
            mode: GameMode::FiveOhOne,
            double_out: true,
            players: vec!["Ada".into(), "Grace".into()],
        });
        game.apply_total_turn(60).unwrap()
    }

    #[test]
    fn a_saved_game_round_trips() {
        let store = MemorySavedGameStore::new();
        assert!(store.load().unwrap().is_none());

        let game = sample_game();
        store.save(&game).unwrap();
        assert_eq!(store.load().unwrap(), Some(game));
    }

    #[test]
    fn saving_again_replaces_the_previous_game() {
        let store = MemorySavedGameStore::new();
        let first = sample_game();
        store.save(&first).unwrap();

        let second = first.apply_total_turn(45).unwrap();
        store.save(&second).unwrap();
        assert_eq!(store.load().unwrap(), Some(second));
    }

    #[test]
    fn clear_empties_the_slot() {
        let store = MemorySavedGameStore::new();
        store.save(&sample_game()).unwrap();
        store.clear();
        assert!(store.load().unwrap().is_none());
    }
}
