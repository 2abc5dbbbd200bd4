use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

/// Most players a single leg supports.
pub const MAX_PLAYERS: usize = 4;

/// Starting-score variant for a leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum GameMode {
    /// Countdown from 301.
    ThreeOhOne,
    /// Countdown from 501.
    FiveOhOne,
}

impl GameMode {
    /// Score every player starts the leg with.
    pub fn starting_score(self) -> u16 {
        match self {
            GameMode::ThreeOhOne => 301,
            GameMode::FiveOhOne => 501,
        }
    }
}

impl From<GameMode> for u16 {
    fn from(value: GameMode) -> Self {
        value.starting_score()
    }
}

impl TryFrom<u16> for GameMode {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            301 => Ok(GameMode::ThreeOhOne),
            501 => Ok(GameMode::FiveOhOne),
            other => Err(format!("unsupported game mode `{other}`")),
        }
    }
}

/// Immutable configuration a leg is created from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    /// Starting score (301 or 501).
    pub mode: GameMode,
    /// Whether the winning dart must be a double or bull.
    pub double_out: bool,
    /// Player names in throwing order.
    pub players: Vec<String>,
}

impl Validate for GameSettings {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.players.is_empty() || self.players.len() > MAX_PLAYERS {
            let mut err = ValidationError::new("player_count");
            err.message = Some(
                format!(
                    "a game needs between 1 and {MAX_PLAYERS} players (got {})",
                    self.players.len()
                )
                .into(),
            );
            errors.add("players", err);
        }

        if self.players.iter().any(|name| name.trim().is_empty()) {
            let mut err = ValidationError::new("player_name");
            err.message = Some("player names must not be blank".into());
            errors.add("players", err);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Segment multiplier of a single dart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DartMultiplier {
    /// Plain segment, face value.
    #[serde(rename = "S")]
    Single,
    /// Double ring, twice the face value.
    #[serde(rename = "D")]
    Double,
    /// Treble ring, three times the face value.
    #[serde(rename = "T")]
    Triple,
    /// Outer bull, fixed 25 points.
    #[serde(rename = "OB")]
    OuterBull,
    /// Inner bull, fixed 50 points. Counts as a double for finishing.
    #[serde(rename = "B")]
    Bull,
}

/// One thrown dart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dart {
    /// Ring the dart landed in.
    pub mult: DartMultiplier,
    /// Face value (1–20 for numbered segments, 25/50 for the bulls).
    pub value: u8,
}

impl Dart {
    /// Dart in a plain segment.
    pub fn single(value: u8) -> Self {
        Self {
            mult: DartMultiplier::Single,
            value,
        }
    }

    /// Dart in the double ring.
    pub fn double(value: u8) -> Self {
        Self {
            mult: DartMultiplier::Double,
            value,
        }
    }

    /// Dart in the treble ring.
    pub fn triple(value: u8) -> Self {
        Self {
            mult: DartMultiplier::Triple,
            value,
        }
    }

    /// Dart in the outer bull.
    pub fn outer_bull() -> Self {
        Self {
            mult: DartMultiplier::OuterBull,
            value: 25,
        }
    }

    /// Dart in the inner bull.
    pub fn bull() -> Self {
        Self {
            mult: DartMultiplier::Bull,
            value: 50,
        }
    }

    /// Points this dart scores. Bull variants are fixed regardless of the
    /// stored face value.
    pub fn points(&self) -> u16 {
        match self.mult {
            DartMultiplier::Single => u16::from(self.value),
            DartMultiplier::Double => 2 * u16::from(self.value),
            DartMultiplier::Triple => 3 * u16::from(self.value),
            DartMultiplier::OuterBull => 25,
            DartMultiplier::Bull => 50,
        }
    }

    /// Whether this dart may legally end a double-out leg.
    pub fn finishes_double_out(&self) -> bool {
        matches!(self.mult, DartMultiplier::Double | DartMultiplier::Bull)
    }

    /// Short board notation: `S20`, `D16`, `T19`, `OB`, `Bull`.
    pub fn label(&self) -> String {
        match self.mult {
            DartMultiplier::Single => format!("S{}", self.value),
            DartMultiplier::Double => format!("D{}", self.value),
            DartMultiplier::Triple => format!("T{}", self.value),
            DartMultiplier::OuterBull => "OB".to_string(),
            DartMultiplier::Bull => "Bull".to_string(),
        }
    }
}

/// A participant and their countdown score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Display name.
    pub name: String,
    /// Current countdown score, always within `0..=starting_score`.
    pub remaining: u16,
}

/// Immutable record of one completed turn.
///
/// Carries a snapshot of the state *before* the turn so the most recent turn
/// can always be reversed without replaying the whole history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// 1-based, strictly increasing position in the leg's history.
    pub number: u32,
    /// Index of the player who threw.
    pub player_index: usize,
    /// Darts actually applied, in throw order. Empty for total-mode turns.
    /// Ends with the bust or finishing dart when the turn ended early.
    pub darts: Vec<Dart>,
    /// Points deducted from the player's score. Zero on a bust.
    pub scored_points: u16,
    /// Sum of every submitted dart, busts included. Equals the submitted
    /// score for total-mode turns.
    pub turn_total: u16,
    /// Player's countdown score once the turn settled.
    pub remaining_after: u16,
    /// Whether the turn forfeited its score.
    pub is_bust: bool,
    /// Whether the turn finished the leg.
    pub is_confirmed_win: bool,
    /// Board notation of the winning dart, when known.
    pub finish_dart: Option<String>,
    /// Countdown score before the turn (undo target).
    pub previous_remaining: u16,
    /// Current-player index before the turn (undo target).
    pub previous_player_index: usize,
}

/// Lifecycle phase of a leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GamePhase {
    /// Turns are being scored.
    InProgress,
    /// A player checked out; only undo can leave this phase.
    GameOver,
}

/// Who won a finished leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winner {
    /// Index of the winning player.
    pub player_index: usize,
    /// Name of the winning player.
    pub player_name: String,
    /// Total turns the leg ran for, across all players.
    pub turns: u32,
}

/// Full state of one leg.
///
/// Treated as an immutable value: every scoring operation returns a fresh
/// `Game` and leaves its input untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    /// Settings the leg was created from.
    pub settings: GameSettings,
    /// Players in throwing order.
    pub players: Vec<Player>,
    /// Index of the player due to throw. Meaningless once the leg is over.
    pub current_player_index: usize,
    /// Completed turns, oldest first.
    pub turn_history: Vec<Turn>,
    /// Lifecycle phase.
    pub phase: GamePhase,
    /// Set exactly when `phase` is [`GamePhase::GameOver`].
    pub winner: Option<Winner>,
}

impl Game {
    /// The player due to throw.
    pub fn current_player(&self) -> &Player {
        &self.players[self.current_player_index]
    }

    /// Whether the leg has finished.
    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }
}
