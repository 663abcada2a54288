//! Play command - seeded random self-play
//!
//! Every game gets its own generator derived from the base seed, so a run is
//! reproducible regardless of how rayon schedules the games.

use anyhow::Result;
use clap::Args;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use halma_core::{Color, Game, GameId, PlayerId, MAX_PLAYERS};

// ============================================================================
// COMMAND ARGUMENTS
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// Number of seated players (1-3)
    #[arg(long, default_value = "2")]
    pub players: usize,

    /// Number of games to play
    #[arg(long, default_value = "10")]
    pub games: usize,

    /// Moves after which a game is abandoned
    #[arg(long, default_value = "2000")]
    pub max_moves: usize,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of a single game
#[derive(Clone, Debug, PartialEq, Eq)]
struct GameRecord {
    game_number: usize,
    first: Color,
    winner: Option<Color>,
    moves: usize,
}

/// Aggregated results
#[derive(Clone, Debug)]
struct PlayResults {
    games: Vec<GameRecord>,
    wins: Vec<(Color, usize)>,
    unfinished: usize,
    avg_moves: f32,
}

// ============================================================================
// ORCHESTRATION
// ============================================================================

/// Run play command
pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    validate_args(&args)?;

    tracing::info!(
        "Playing {} games with {} players (max {} moves)",
        args.games,
        args.players,
        args.max_moves
    );

    let results = play_games(&args, seed)?;

    report_results(&results, &args);

    Ok(())
}

// ============================================================================
// PHASES
// ============================================================================

fn validate_args(args: &PlayArgs) -> Result<()> {
    if args.players == 0 || args.players > MAX_PLAYERS {
        anyhow::bail!("--players must be between 1 and {}", MAX_PLAYERS);
    }
    Ok(())
}

/// Play all games in parallel, one generator per game
fn play_games(args: &PlayArgs, seed: Option<u64>) -> Result<PlayResults> {
    let base_seed = seed.unwrap_or(42);

    let games = (0..args.games)
        .into_par_iter()
        .map(|index| {
            let seed = base_seed.wrapping_add(index as u64);
            play_single_game(args.players, args.max_moves, index + 1, seed)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(compute_statistics(games, args.players))
}

/// Report results
fn report_results(results: &PlayResults, args: &PlayArgs) {
    if args.json {
        print_json_results(results);
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// GAMES
// ============================================================================

/// Play one game where every color picks a uniformly random legal move
fn play_single_game(
    players: usize,
    max_moves: usize,
    game_number: usize,
    seed: u64,
) -> Result<GameRecord> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut game = Game::new(game_number as GameId);
    for id in 0..players {
        game.join(PlayerId(id as u64));
    }
    let first = game.start(&mut rng)?;

    let mut moves = 0;
    let mut winner = None;
    while moves < max_moves {
        let Some(color) = game.current_turn() else {
            break;
        };
        let legal = game.legal_moves(color);
        // A color without moves stalls the game
        let Some(&(from, to)) = legal.choose(&mut rng) else {
            break;
        };

        moves += 1;
        if game.move_piece(color, from, to)?.is_none() {
            winner = Some(color);
        }
    }

    tracing::info!(
        "Game {}: {} after {} moves",
        game_number,
        winner.map_or("unfinished".to_string(), |color| format!("{} wins", color)),
        moves
    );

    Ok(GameRecord {
        game_number,
        first,
        winner,
        moves,
    })
}

/// Compute aggregate statistics from game records
fn compute_statistics(games: Vec<GameRecord>, players: usize) -> PlayResults {
    let wins = Color::ALL
        .iter()
        .take(players)
        .map(|&color| {
            let count = games.iter().filter(|g| g.winner == Some(color)).count();
            (color, count)
        })
        .collect();
    let unfinished = games.iter().filter(|g| g.winner.is_none()).count();

    let total_moves: usize = games.iter().map(|g| g.moves).sum();
    let avg_moves = if games.is_empty() {
        0.0
    } else {
        total_moves as f32 / games.len() as f32
    };

    PlayResults {
        games,
        wins,
        unfinished,
        avg_moves,
    }
}

// ============================================================================
// OUTPUT
// ============================================================================

fn percent(count: usize, total: usize) -> f32 {
    if total > 0 {
        count as f32 / total as f32 * 100.0
    } else {
        0.0
    }
}

/// Print results as JSON
fn print_json_results(results: &PlayResults) {
    #[derive(serde::Serialize)]
    struct JsonGame {
        game_number: usize,
        first: Color,
        winner: Option<Color>,
        moves: usize,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        total_games: usize,
        wins: Vec<(Color, usize)>,
        unfinished: usize,
        avg_moves: f32,
        games: Vec<JsonGame>,
    }

    let output = JsonOutput {
        total_games: results.games.len(),
        wins: results.wins.clone(),
        unfinished: results.unfinished,
        avg_moves: results.avg_moves,
        games: results
            .games
            .iter()
            .map(|g| JsonGame {
                game_number: g.game_number,
                first: g.first,
                winner: g.winner,
                moves: g.moves,
            })
            .collect(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

/// Print results as text
fn print_text_results(results: &PlayResults) {
    let total = results.games.len();

    println!("\n=== Self-Play Results ===");
    println!("Total games: {}", total);
    for (color, count) in &results.wins {
        println!(
            "{:<6} wins: {} ({:.1}%)",
            color,
            count,
            percent(*count, total)
        );
    }
    println!(
        "Unfinished:  {} ({:.1}%)",
        results.unfinished,
        percent(results.unfinished, total)
    );
    println!("Avg moves:   {:.1}", results.avg_moves);

    println!("\nGame details:");
    for game in &results.games {
        match game.winner {
            Some(color) => println!(
                "  Game {}: {} opened, {} won in {} moves",
                game.game_number, game.first, color, game.moves
            ),
            None => println!(
                "  Game {}: {} opened, unfinished after {} moves",
                game.game_number, game.first, game.moves
            ),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn args(players: usize) -> PlayArgs {
        PlayArgs {
            players,
            games: 4,
            max_moves: 60,
            json: false,
        }
    }

    #[test]
    fn test_validate_player_count() {
        assert!(validate_args(&args(0)).is_err());
        assert!(validate_args(&args(1)).is_ok());
        assert!(validate_args(&args(3)).is_ok());
        assert!(validate_args(&args(4)).is_err());
    }

    #[test]
    fn test_single_game_is_deterministic() {
        let a = play_single_game(3, 100, 1, 11).unwrap();
        let b = play_single_game(3, 100, 1, 11).unwrap();
        assert_eq!(a, b);
        assert!(a.moves <= 100);
    }

    #[test]
    fn test_move_cap_respected() {
        let record = play_single_game(2, 25, 1, 5).unwrap();
        assert_eq!(record.moves, 25);
        assert_eq!(record.winner, None);
    }

    #[test]
    fn test_play_games_counts_every_game() {
        let results = play_games(&args(2), Some(3)).unwrap();
        assert_eq!(results.games.len(), 4);
        assert_eq!(results.wins.len(), 2);
        let won: usize = results.wins.iter().map(|(_, n)| n).sum();
        assert_eq!(won + results.unfinished, 4);
    }

    #[test]
    fn test_compute_statistics_empty() {
        let results = compute_statistics(vec![], 2);
        assert_eq!(results.unfinished, 0);
        assert_eq!(results.avg_moves, 0.0);
        assert_eq!(results.wins, vec![(Color::Red, 0), (Color::Green, 0)]);
    }

    #[test]
    fn test_compute_statistics() {
        let record = |game_number, winner, moves| GameRecord {
            game_number,
            first: Color::Red,
            winner,
            moves,
        };
        let games = vec![
            record(1, Some(Color::Green), 100),
            record(2, None, 200),
            record(3, Some(Color::Green), 300),
        ];

        let results = compute_statistics(games, 2);
        assert_eq!(results.wins, vec![(Color::Red, 0), (Color::Green, 2)]);
        assert_eq!(results.unfinished, 1);
        assert_eq!(results.avg_moves, 200.0);
    }
}
