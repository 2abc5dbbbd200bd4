//! Pure turn-scoring core: no I/O, no clocks, value-in value-out.

pub mod game;
pub mod scoring;
pub mod stats;

pub use game::{
    Dart, DartMultiplier, Game, GameMode, GamePhase, GameSettings, Player, Turn, Winner,
};
pub use scoring::{ScoreError, start_game};
pub use stats::{PlayerStats, compute_stats};
