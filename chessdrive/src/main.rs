//! chessdrive - drive a UCI chess engine from the command line.
//!
//! Subcommands:
//! - `selfplay`: the engine plays both sides until it has no move, the draw
//!   threshold is reached or the optional move limit runs out.
//! - `play`: read moves for one side from stdin; the engine answers.
//! - `fen`: normalise a FEN string offline, without an engine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use chess::{BoardState, PieceColor};
use clap::{Parser, Subcommand, ValueEnum};
use controller::{ControllerConfig, GameController};
use engine::{EngineSession, SessionConfig};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod play;

use play::Output;

#[derive(Parser)]
#[command(name = "chessdrive", about = "Drive a UCI chess engine from the command line")]
struct Cli {
    /// Engine executable. Defaults to $CHESSDRIVE_ENGINE_PATH, then a search
    /// of common install locations and PATH.
    #[arg(long, global = true)]
    engine: Option<PathBuf>,

    /// Thinking time per engine move, in milliseconds.
    #[arg(long, global = true)]
    movetime: Option<u64>,

    /// Write logs to this file instead of stderr.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Print boards and results as JSON lines.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Let the engine play against itself.
    #[command(name = "selfplay")]
    SelfPlay {
        /// Start from this position instead of the standard one.
        #[arg(long)]
        fen: Option<String>,
        /// Stop after this many full moves.
        #[arg(long)]
        max_moves: Option<u32>,
        /// Half-move clock value that ends the game as a draw.
        #[arg(long)]
        draw_threshold: Option<u32>,
    },
    /// Play against the engine, reading moves from stdin.
    Play {
        #[arg(long)]
        fen: Option<String>,
        /// The side you play.
        #[arg(long, value_enum, default_value_t = Side::White)]
        color: Side,
    },
    /// Parse a FEN string and print it re-encoded.
    Fen {
        fen: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Side {
    White,
    Black,
}

impl From<Side> for PieceColor {
    fn from(side: Side) -> Self {
        match side {
            Side::White => PieceColor::White,
            Side::Black => PieceColor::Black,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_file.as_deref())?;
    let output = if cli.json { Output::Json } else { Output::Text };

    match &cli.command {
        Commands::Fen { fen } => {
            let board = BoardState::from_fen(fen).context("invalid FEN")?;
            match output {
                Output::Json => println!("{}", serde_json::to_string_pretty(&board.snapshot())?),
                Output::Text => println!("{}", board.to_fen()),
            }
        }
        Commands::SelfPlay {
            fen,
            max_moves,
            draw_threshold,
        } => {
            let board = initial_board(fen.as_deref())?;
            let config = ControllerConfig {
                movetime_ms: cli.movetime.unwrap_or_else(config::get_movetime_ms),
                draw_threshold: draw_threshold.unwrap_or_else(config::get_draw_threshold),
                max_full_moves: *max_moves,
            };
            let controller = start_controller(&cli, board, config).await?;
            let result = play::run_self_play(&controller, output).await;
            controller.shutdown().await;
            result?;
        }
        Commands::Play { fen, color } => {
            let board = initial_board(fen.as_deref())?;
            let config = ControllerConfig {
                movetime_ms: cli.movetime.unwrap_or_else(config::get_movetime_ms),
                draw_threshold: config::get_draw_threshold(),
                max_full_moves: None,
            };
            let controller = start_controller(&cli, board, config).await?;
            let result = play::run_interactive(&controller, (*color).into(), output).await;
            controller.shutdown().await;
            result?;
        }
    }

    Ok(())
}

/// Log to stderr, or to `log_file` through a non-blocking writer. The
/// returned guard must live until exit so buffered lines are flushed.
fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let Some(path) = log_file else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(filter)
            .init();
        return Ok(None);
    };

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .with_context(|| format!("log file path has no file name: {}", path.display()))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(filter)
        .init();
    Ok(Some(guard))
}

fn initial_board(fen: Option<&str>) -> anyhow::Result<BoardState> {
    match fen {
        Some(fen) => BoardState::from_fen(fen).context("invalid FEN"),
        None => Ok(BoardState::new()),
    }
}

async fn start_controller(
    cli: &Cli,
    board: BoardState,
    config: ControllerConfig,
) -> anyhow::Result<GameController> {
    let engine_path = cli
        .engine
        .clone()
        .or_else(config::get_engine_path)
        .context("no engine found; pass --engine or set CHESSDRIVE_ENGINE_PATH")?;
    let session_config = SessionConfig::new(engine_path).with_handshake_timeout(
        Duration::from_secs(config::get_handshake_timeout_secs()),
    );

    let session = EngineSession::start(session_config).await?;
    tracing::info!(
        "Connected to {}",
        session.engine_name().unwrap_or("unnamed engine")
    );
    Ok(GameController::spawn(session, board, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_selfplay() {
        let cli = Cli::try_parse_from([
            "chessdrive",
            "--movetime",
            "250",
            "selfplay",
            "--max-moves",
            "40",
            "--draw-threshold",
            "50",
        ])
        .unwrap();
        assert_eq!(cli.movetime, Some(250));
        assert!(!cli.json);
        match cli.command {
            Commands::SelfPlay {
                fen,
                max_moves,
                draw_threshold,
            } => {
                assert_eq!(fen, None);
                assert_eq!(max_moves, Some(40));
                assert_eq!(draw_threshold, Some(50));
            }
            _ => panic!("Wrong subcommand"),
        }
    }

    #[test]
    fn test_cli_parses_play_and_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["chessdrive", "play", "--color", "black", "--json"]).unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Play { color, .. } => assert_eq!(PieceColor::from(color), PieceColor::Black),
            _ => panic!("Wrong subcommand"),
        }
    }

    #[test]
    fn test_initial_board() {
        assert_eq!(initial_board(None).unwrap().to_fen(), chess::STARTING_FEN);
        assert!(initial_board(Some("8/8/8/8/8/8/8/8 w - - 0")).is_err());
    }
}
