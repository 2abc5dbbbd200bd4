//! Per-player aggregate metrics derived from a leg's turn history.

use crate::engine::game::{Game, Turn};
use crate::engine::scoring::MAX_TURN_SCORE;

/// Turns that make up the "first nine darts" window.
const FIRST_NINE_TURNS: usize = 3;
/// Highest score a checkout can realistically start from.
const CHECKOUT_CEILING: u16 = 170;

/// Display metrics for one player, computed over their recorded turns.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStats {
    /// Index of the player in the game's seating order.
    pub player_index: usize,
    /// Display name of the player.
    pub player_name: String,
    /// Mean points per turn; bust turns contribute zero but still count.
    pub avg_per_turn: f64,
    /// Mean points over the player's first three turns, `None` with no turns.
    pub first_nine_avg: Option<f64>,
    /// Turns that scored the 180 maximum.
    pub count_180s: u32,
    /// Share of checkout attempts that finished the leg, as a percentage.
    /// `None` when the leg is not played double-out.
    pub checkout_percent: Option<f64>,
    /// Turns forfeited to a bust.
    pub busts: u32,
}

/// Compute stats for every player from the game's turn history. Pure: the
/// same game always yields the same stats, wherever this is called from.
pub fn compute_stats(game: &Game) -> Vec<PlayerStats> {
    game.players
        .iter()
        .enumerate()
        .map(|(index, player)| {
            let turns: Vec<&Turn> = game
                .turn_history
                .iter()
                .filter(|turn| turn.player_index == index)
                .collect();
            player_stats(index, &player.name, &turns, game.settings.double_out)
        })
        .collect()
}

fn player_stats(
    player_index: usize,
    player_name: &str,
    turns: &[&Turn],
    double_out: bool,
) -> PlayerStats {
    let total_points: u32 = turns.iter().map(|turn| u32::from(turn.scored_points)).sum();
    let avg_per_turn = if turns.is_empty() {
        0.0
    } else {
        f64::from(total_points) / turns.len() as f64
    };

    let first_nine_avg = (!turns.is_empty()).then(|| {
        let window = &turns[..turns.len().min(FIRST_NINE_TURNS)];
        let points: u32 = window.iter().map(|turn| u32::from(turn.scored_points)).sum();
        f64::from(points) / window.len() as f64
    });

    let count_180s = turns
        .iter()
        .filter(|turn| turn.turn_total == MAX_TURN_SCORE && !turn.is_bust)
        .count() as u32;

    let busts = turns.iter().filter(|turn| turn.is_bust).count() as u32;

    // Checkout attempts are heuristic: any turn thrown from a finishable
    // score that failed to finish counts, plus every confirmed win.
    let checkout_percent = double_out.then(|| {
        let attempts = turns
            .iter()
            .filter(|turn| {
                let finishable = turn.previous_remaining > 1
                    && turn.previous_remaining <= CHECKOUT_CEILING;
                let missed = i32::from(turn.previous_remaining)
                    - i32::from(turn.scored_points)
                    != 0;
                turn.is_confirmed_win || (finishable && missed)
            })
            .count();
        let successes = turns.iter().filter(|turn| turn.is_confirmed_win).count();

        if attempts == 0 {
            0.0
        } else {
            successes as f64 / attempts as f64 * 100.0
        }
    });

    PlayerStats {
        player_index,
        player_name: player_name.to_string(),
        avg_per_turn,
        first_nine_avg,
        count_180s,
        checkout_percent,
        busts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::game::{GameMode, GameSettings};
    use crate::engine::scoring::start_game;

    fn game(double_out: bool, players: &[&str]) -> Game {
        start_game(GameSettings {
            mode: GameMode::FiveOhOne,
            double_out,
            players: players.iter().map(|name| name.to_string()).collect(),
        })
    }

    #[test]
    fn fresh_game_yields_zeroed_stats() {
        let stats = compute_stats(&game(false, &["Ada", "Grace"]));
        assert_eq!(stats.len(), 2);
        for (index, entry) in stats.iter().enumerate() {
            assert_eq!(entry.player_index, index);
            assert_eq!(entry.avg_per_turn, 0.0);
            assert_eq!(entry.first_nine_avg, None);
            assert_eq!(entry.count_180s, 0);
            assert_eq!(entry.busts, 0);
            assert_eq!(entry.checkout_percent, None);
        }
    }

    #[test]
    fn averages_count_bust_turns_in_the_denominator() {
        let mut g = game(false, &["Ada"]);
        for score in [100, 60] {
            g = g.apply_total_turn(score).unwrap();
        }
        // Drive the player low, then bust them.
        for score in [180, 140] {
            g = g.apply_total_turn(score).unwrap();
        }
        assert_eq!(g.players[0].remaining, 21);
        g = g.apply_total_turn(60).unwrap();
        assert!(g.turn_history.last().unwrap().is_bust);

        let stats = compute_stats(&g);
        // 100 + 60 + 180 + 140 + 0 over five turns.
        assert_eq!(stats[0].avg_per_turn, 96.0);
        assert_eq!(stats[0].busts, 1);
    }

    #[test]
    fn first_nine_window_covers_at_most_three_turns() {
        let mut g = game(false, &["Ada"]);
        g = g.apply_total_turn(60).unwrap();
        let stats = compute_stats(&g);
        assert_eq!(stats[0].first_nine_avg, Some(60.0));

        for score in [100, 140, 26] {
            g = g.apply_total_turn(score).unwrap();
        }
        let stats = compute_stats(&g);
        // Only the first three turns count: (60 + 100 + 140) / 3.
        assert_eq!(stats[0].first_nine_avg, Some(100.0));
        assert_eq!(stats[0].avg_per_turn, 81.5);
    }

    #[test]
    fn maximums_are_counted_from_turn_totals() {
        let mut g = game(false, &["Ada", "Grace"]);
        g = g.apply_total_turn(180).unwrap(); // Ada
        g = g.apply_total_turn(45).unwrap(); // Grace
        g = g.apply_total_turn(180).unwrap(); // Ada
        g = g.apply_total_turn(60).unwrap(); // Grace

        let stats = compute_stats(&g);
        assert_eq!(stats[0].count_180s, 2);
        assert_eq!(stats[1].count_180s, 0);
    }

    #[test]
    fn a_busted_maximum_does_not_count() {
        let mut g = game(false, &["Ada"]);
        for score in [180, 180] {
            g = g.apply_total_turn(score).unwrap();
        }
        assert_eq!(g.players[0].remaining, 141);
        g = g.apply_total_turn(180).unwrap();
        assert!(g.turn_history.last().unwrap().is_bust);

        let stats = compute_stats(&g);
        assert_eq!(stats[0].count_180s, 2);
    }

    #[test]
    fn checkout_percent_is_none_without_double_out() {
        let mut g = game(false, &["Ada"]);
        g = g.apply_total_turn(60).unwrap();
        let stats = compute_stats(&g);
        assert_eq!(stats[0].checkout_percent, None);
    }

    #[test]
    fn turns_from_unfinishable_scores_are_not_attempts() {
        let mut g = game(true, &["Ada"]);
        // 501 and 321 both sit above the 170 checkout ceiling.
        g = g.apply_total_turn(180).unwrap();
        g = g.apply_total_turn(100).unwrap();
        let stats = compute_stats(&g);
        assert_eq!(stats[0].checkout_percent, Some(0.0));
    }

    #[test]
    fn missed_finishable_turns_count_as_attempts() {
        let mut g = game(true, &["Ada"]);
        for score in [180, 180] {
            g = g.apply_total_turn(score).unwrap();
        }
        assert_eq!(g.players[0].remaining, 141);
        // Thrown from 141 (finishable) without reaching zero: one attempt.
        g = g.apply_total_turn(41).unwrap();
        // Thrown from 100 (finishable), busts: second attempt.
        g = g.apply_total_turn(120).unwrap();

        let stats = compute_stats(&g);
        assert_eq!(stats[0].checkout_percent, Some(0.0));
        assert_eq!(stats[0].busts, 1);
    }

    #[test]
    fn a_confirmed_win_counts_as_a_successful_attempt() {
        let mut g = game(true, &["Ada"]);
        for score in [180, 180] {
            g = g.apply_total_turn(score).unwrap();
        }
        assert_eq!(g.players[0].remaining, 141);
        g = g.apply_total_turn(101).unwrap();
        assert_eq!(g.players[0].remaining, 40);
        g = g.apply_dart_turn(&[crate::engine::game::Dart::double(20)]).unwrap();
        assert!(g.is_over());

        let stats = compute_stats(&g);
        // Two attempts (the missed 141 turn and the win), one success.
        assert_eq!(stats[0].checkout_percent, Some(50.0));
    }

    #[test]
    fn stats_are_split_per_player() {
        let mut g = game(false, &["Ada", "Grace"]);
        g = g.apply_total_turn(100).unwrap(); // Ada
        g = g.apply_total_turn(40).unwrap(); // Grace
        g = g.apply_total_turn(60).unwrap(); // Ada

        let stats = compute_stats(&g);
        assert_eq!(stats[0].avg_per_turn, 80.0);
        assert_eq!(stats[1].avg_per_turn, 40.0);
        assert_eq!(stats[0].player_name, "Ada");
        assert_eq!(stats[1].player_name, "Grace");
    }
}
