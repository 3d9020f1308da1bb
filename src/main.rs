//! Console game: a human (or nobody) against a random mover.
//!
//! Usage: cargo run --release -- --human white --seed 7
//!        cargo run --release -- --setup

use std::io::{self, BufRead, Write};

use clap::{Parser, ValueEnum};
use color_eyre::eyre::{bail, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chess_rules::board::Board;
use chess_rules::game::Game;
use chess_rules::types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum HumanSide {
    White,
    Black,
    None,
}

impl HumanSide {
    fn plays(&self, color: Color) -> bool {
        matches!(
            (self, color),
            (HumanSide::White, Color::White) | (HumanSide::Black, Color::Black)
        )
    }
}

#[derive(Parser, Debug)]
#[command(name = "chess_rules")]
#[command(about = "Play chess with full move validation against a random mover")]
struct Args {
    /// Side whose moves are read from stdin
    #[arg(long, value_enum, default_value_t = HumanSide::White)]
    human: HumanSide,

    /// Seed for the random mover, entropy if absent
    #[arg(long)]
    seed: Option<u64>,

    /// Build the starting position by hand before playing
    #[arg(long)]
    setup: bool,

    /// Stop the game after this many plies
    #[arg(long, default_value_t = 500)]
    max_plies: usize,
}

type Lines<'a> = io::Lines<io::StdinLock<'a>>;

/// Print `prompt` and read one trimmed line, `None` once stdin is closed
fn read_command(lines: &mut Lines, prompt: &str) -> Result<Option<String>> {
    print!("{}", prompt);
    io::stdout().flush()?;
    match lines.next() {
        Some(line) => Ok(Some(line?.trim().to_string())),
        None => Ok(None),
    }
}

/// Manual setup. Returns `None` if stdin closes before `done`.
fn run_setup(lines: &mut Lines) -> Result<Option<Board>> {
    let mut board = Board::new();
    board.reset_to_empty();
    println!("Setup: place pieces like 'Ke1' (white) or 'ke8' (black).");
    println!("Other commands: 'clear', 'turn white', 'turn black', 'done'.");

    loop {
        let Some(command) = read_command(lines, "setup> ")? else {
            return Ok(None);
        };
        match command.as_str() {
            "" => continue,
            "clear" => board.reset_to_empty(),
            "turn white" => board.set_side_to_move(Color::White),
            "turn black" => board.set_side_to_move(Color::Black),
            "done" => match board.validate_kings() {
                Ok(()) => return Ok(Some(board)),
                Err(e) => {
                    println!("{}", e);
                    continue;
                }
            },
            placement => {
                if let Err(e) = board.place_piece(placement) {
                    println!("{}", e);
                    continue;
                }
            }
        }
        board.draw_to_terminal();
    }
}

/// Ask for the promotion piece until a valid letter arrives. A closed stdin promotes to a queen.
fn read_promotion(lines: &mut Lines) -> Result<PieceType> {
    loop {
        let Some(answer) = read_command(lines, "Promote to (Q, R, B, N): ")? else {
            return Ok(PieceType::Queen);
        };
        let mut chars = answer.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if let Some(piece_type) =
                PieceType::from_char(c).filter(|t| PIECES_CAN_PROMOTE_TO.contains(t))
            {
                return Ok(piece_type);
            }
        }
        println!("Please answer with one of Q, R, B or N");
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    info!(?args, "starting");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    let board = if args.setup {
        match run_setup(&mut lines)? {
            Some(board) => board,
            None => return Ok(()),
        }
    } else {
        Board::new()
    };
    let mut game = Game::from_board(board);
    game.board().draw_to_terminal();

    let mut plies = 0;
    loop {
        match game.status() {
            Status::Ongoing => {}
            Status::Checkmate(winner) => {
                println!("Checkmate! {} wins", winner);
                break;
            }
            Status::Stalemate => {
                println!("Stalemate!");
                break;
            }
        }
        if plies >= args.max_plies {
            println!("Stopping after {} plies", plies);
            break;
        }

        let color = game.board().get_active_color();
        if game.board().is_in_check(color) {
            println!("{} is in check", color);
        }

        let notation = if args.human.plays(color) {
            let Some(input) = read_command(&mut lines, &format!("{} to move: ", color))? else {
                break;
            };
            if input == "quit" || input == "exit" {
                break;
            }
            if let Err(e) = game.board_mut().parse_move(&input) {
                println!("Invalid move: {}", e);
                continue;
            }
            input
        } else {
            let Some(notation) = game.board_mut().legal_move_sample(&mut rng) else {
                break;
            };
            notation
        };

        match game.attempt_move(&notation) {
            MoveResult::Valid => {}
            MoveResult::PromotionPending => {
                let piece_type = if args.human.plays(color) {
                    read_promotion(&mut lines)?
                } else {
                    PIECES_CAN_PROMOTE_TO
                        .choose(&mut rng)
                        .copied()
                        .unwrap_or(PieceType::Queen)
                };
                let Some(square) = game.board().pending_promotion() else {
                    bail!("promotion pending without a square");
                };
                game.finalize_promotion(square, piece_type)?;
            }
            MoveResult::Invalid if args.human.plays(color) => {
                println!("Illegal move: {}", notation);
                continue;
            }
            MoveResult::Invalid => bail!("generated move {} was rejected", notation),
        }

        plies += 1;
        let last = game.moves().last().map_or("", String::as_str);
        println!("{} plays {}", color, last);
        game.board().draw_to_terminal();
    }

    println!("Moves: {}", game.to_move_list());
    Ok(())
}
