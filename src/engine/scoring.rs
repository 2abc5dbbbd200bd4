//! Turn application, bust/finish rules, and undo for a leg.
//!
//! Two entry modes exist. Total mode takes one aggregate score per turn and
//! cannot see individual darts, so under double-out an exact finish cannot be
//! verified and is conservatively scored as a bust. Dart mode applies up to
//! three darts sequentially and can verify the finishing dart.

use thiserror::Error;

use crate::engine::game::{Dart, Game, GamePhase, GameSettings, Player, Turn, Winner};

/// Highest total three darts can score.
pub const MAX_TURN_SCORE: u16 = 180;
/// Most darts a turn may contain.
pub const MAX_DARTS_PER_TURN: usize = 3;

/// Rejections raised while applying or reversing a turn. The input game is
/// never modified when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    /// Submitted total is outside what three darts can score.
    #[error("score must be between 0 and {MAX_TURN_SCORE}, got {0}")]
    InvalidScore(u16),
    /// A turn needs at least one dart.
    #[error("a turn must contain at least one dart")]
    EmptyTurn,
    /// A turn holds at most three darts.
    #[error("a turn may contain at most {MAX_DARTS_PER_TURN} darts, got {0}")]
    TooManyDarts(usize),
    /// The leg already has a winner; only undo can reopen it.
    #[error("the game is already over")]
    GameOver,
}

/// How a turn settled, before it is folded into a new [`Game`] value.
struct TurnOutcome {
    darts: Vec<Dart>,
    scored_points: u16,
    turn_total: u16,
    remaining_after: u16,
    is_bust: bool,
    is_win: bool,
    finish_dart: Option<String>,
}

/// Initialize a fresh leg from its settings: every player starts at the mode's
/// score, history is empty, and the first listed player throws first.
pub fn start_game(settings: GameSettings) -> Game {
    let starting = settings.mode.starting_score();
    let players = settings
        .players
        .iter()
        .map(|name| Player {
            name: name.clone(),
            remaining: starting,
        })
        .collect();

    Game {
        settings,
        players,
        current_player_index: 0,
        turn_history: Vec::new(),
        phase: GamePhase::InProgress,
        winner: None,
    }
}

impl Game {
    /// Apply one aggregate score for the current player's turn.
    ///
    /// Because the individual darts are unknown, double-out legs treat an
    /// exact finish as a bust: the finishing dart cannot be verified to be a
    /// double. Reaching 1 under double-out also busts, since no double can
    /// take a score of 1 to zero.
    pub fn apply_total_turn(&self, scored_points: u16) -> Result<Game, ScoreError> {
        if self.phase == GamePhase::GameOver {
            return Err(ScoreError::GameOver);
        }
        if scored_points > MAX_TURN_SCORE {
            return Err(ScoreError::InvalidScore(scored_points));
        }

        let remaining = self.current_player().remaining;
        let new_remaining = i32::from(remaining) - i32::from(scored_points);
        let double_out = self.settings.double_out;

        let outcome = if new_remaining < 0
            || (double_out && new_remaining == 1)
            || (double_out && new_remaining == 0)
        {
            TurnOutcome {
                darts: Vec::new(),
                scored_points: 0,
                turn_total: scored_points,
                remaining_after: remaining,
                is_bust: true,
                is_win: false,
                finish_dart: None,
            }
        } else if new_remaining == 0 {
            TurnOutcome {
                darts: Vec::new(),
                scored_points,
                turn_total: scored_points,
                remaining_after: 0,
                is_bust: false,
                is_win: true,
                finish_dart: None,
            }
        } else {
            TurnOutcome {
                darts: Vec::new(),
                scored_points,
                turn_total: scored_points,
                remaining_after: new_remaining as u16,
                is_bust: false,
                is_win: false,
                finish_dart: None,
            }
        };

        Ok(self.record_turn(outcome))
    }

    /// Apply up to three darts sequentially for the current player's turn.
    ///
    /// Darts are evaluated in throw order and processing stops at the first
    /// bust or winning dart; darts submitted after that point are dropped
    /// from the stored turn but still count toward its `turn_total`. Under
    /// double-out the winning dart must be a double or the bull, otherwise
    /// the turn busts even though the arithmetic reached zero.
    pub fn apply_dart_turn(&self, darts: &[Dart]) -> Result<Game, ScoreError> {
        if self.phase == GamePhase::GameOver {
            return Err(ScoreError::GameOver);
        }
        if darts.is_empty() {
            return Err(ScoreError::EmptyTurn);
        }
        if darts.len() > MAX_DARTS_PER_TURN {
            return Err(ScoreError::TooManyDarts(darts.len()));
        }

        let start_remaining = self.current_player().remaining;
        let turn_total: u16 = darts.iter().map(Dart::points).sum();
        let double_out = self.settings.double_out;

        let mut applied = Vec::with_capacity(darts.len());
        let mut remaining = start_remaining;
        let mut scored: u16 = 0;
        let mut is_bust = false;
        let mut is_win = false;
        let mut finish_dart = None;

        for dart in darts {
            let points = dart.points();
            let new_remaining = i32::from(remaining) - i32::from(points);
            applied.push(*dart);

            if new_remaining < 0 || (double_out && new_remaining == 1) {
                is_bust = true;
                break;
            }
            if new_remaining == 0 {
                if double_out && !dart.finishes_double_out() {
                    is_bust = true;
                } else {
                    is_win = true;
                    finish_dart = Some(dart.label());
                    scored += points;
                    remaining = 0;
                }
                break;
            }

            scored += points;
            remaining = new_remaining as u16;
        }

        let outcome = TurnOutcome {
            darts: applied,
            scored_points: if is_bust { 0 } else { scored },
            turn_total,
            remaining_after: if is_bust { start_remaining } else { remaining },
            is_bust,
            is_win,
            finish_dart,
        };

        Ok(self.record_turn(outcome))
    }

    /// Reverse the most recent turn.
    ///
    /// Restores the affected player's score and the current-player index from
    /// the turn's pre-turn snapshot, drops the turn from history, and reopens
    /// the leg even when the undone turn was the winning one. With an empty
    /// history this is a no-op. Repeated calls walk backward one turn at a
    /// time.
    pub fn undo_last_turn(&self) -> Game {
        let Some(last) = self.turn_history.last() else {
            return self.clone();
        };

        let mut players = self.players.clone();
        players[last.player_index].remaining = last.previous_remaining;

        let mut history = self.turn_history.clone();
        let restored_index = last.previous_player_index;
        history.pop();

        Game {
            settings: self.settings.clone(),
            players,
            current_player_index: restored_index,
            turn_history: history,
            phase: GamePhase::InProgress,
            winner: None,
        }
    }

    /// Fold a settled turn into a fresh game value: update the thrower's
    /// score, append the turn record, advance the current player unless the
    /// leg ended, and promote the winner.
    fn record_turn(&self, outcome: TurnOutcome) -> Game {
        let thrower = self.current_player_index;

        let mut players = self.players.clone();
        players[thrower].remaining = outcome.remaining_after;

        let next_index = if outcome.is_win {
            thrower
        } else {
            (thrower + 1) % self.players.len()
        };

        let turn = Turn {
            number: self.turn_history.len() as u32 + 1,
            player_index: thrower,
            darts: outcome.darts,
            scored_points: outcome.scored_points,
            turn_total: outcome.turn_total,
            remaining_after: outcome.remaining_after,
            is_bust: outcome.is_bust,
            is_confirmed_win: outcome.is_win,
            finish_dart: outcome.finish_dart,
            previous_remaining: self.players[thrower].remaining,
            previous_player_index: thrower,
        };

        let winner = outcome.is_win.then(|| Winner {
            player_index: thrower,
            player_name: self.players[thrower].name.clone(),
            turns: turn.number,
        });

        let mut history = self.turn_history.clone();
        history.push(turn);

        Game {
            settings: self.settings.clone(),
            players,
            current_player_index: next_index,
            turn_history: history,
            phase: if outcome.is_win {
                GamePhase::GameOver
            } else {
                GamePhase::InProgress
            },
            winner,
        }
    }
}
