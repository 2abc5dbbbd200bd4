/// Game coordination against the external backend.
pub mod coordinator;
/// Collaborator seam for parking games between sessions.
pub mod saved_game;

pub use coordinator::{GameCoordinator, RoomHandle, create_room, find_room, generate_room_code};
pub use saved_game::{MemorySavedGameStore, SavedGameError, SavedGameStore};
