//! Self-play and interactive play loops on top of the game controller.

use anyhow::Context;
use chess::{BoardSnapshot, PieceColor, UciMove};
use controller::{GameController, GameEvent, GameOver};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Text,
    Json,
}

impl Output {
    fn board(self, snapshot: &BoardSnapshot) -> anyhow::Result<()> {
        match self {
            Output::Json => println!("{}", serde_json::to_string(snapshot)?),
            Output::Text => {
                if let Some(ply) = format_ply(snapshot) {
                    println!("{ply}");
                }
            }
        }
        Ok(())
    }

    fn game_over(self, over: &GameOver) -> anyhow::Result<()> {
        match self {
            Output::Json => println!("{}", serde_json::to_string(over)?),
            Output::Text => {
                println!("Game over: {}", over.reason);
                println!("{}", over.snapshot.fen);
            }
        }
        Ok(())
    }
}

/// `1. e2e4` for a White move, `1... e7e5` for a Black one.
pub fn format_ply(snapshot: &BoardSnapshot) -> Option<String> {
    let last = snapshot.last_move()?;
    let text = match snapshot.active_player {
        // White just moved
        PieceColor::Black => format!("{}. {}", snapshot.fullmove_number, last),
        PieceColor::White => format!(
            "{}... {}",
            snapshot.fullmove_number.saturating_sub(1),
            last
        ),
    };
    Some(text)
}

/// Let the engine play both sides until the game ends or Ctrl-C.
pub async fn run_self_play(controller: &GameController, output: Output) -> anyhow::Result<()> {
    let (initial, mut events) = controller.subscribe().await?;
    if output == Output::Text {
        println!("{}", initial.fen);
    }
    controller.set_self_play(true).await?;

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(GameEvent::BoardChanged(snapshot)) => output.board(&snapshot)?,
                Ok(GameEvent::GameOver(over)) => {
                    output.game_over(&over)?;
                    break;
                }
                Ok(GameEvent::Error(message)) => anyhow::bail!(message),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Output fell behind by {} events", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, stopping self-play");
                controller.set_self_play(false).await?;
                break;
            }
        }
    }
    Ok(())
}

/// Read moves for `human` from stdin; the engine answers each one.
pub async fn run_interactive(
    controller: &GameController,
    human: PieceColor,
    output: Output,
) -> anyhow::Result<()> {
    let (initial, mut events) = controller.subscribe().await?;
    if output == Output::Text {
        println!("{}", initial.fen);
        println!("Enter moves like e2e4 (promotion e7e8q), `fen` or `quit`.");
    }
    if initial.active_player != human {
        controller.request_best_move().await?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break;
                };
                match line.trim() {
                    "" => {}
                    "quit" | "exit" => break,
                    "fen" => println!("{}", controller.snapshot().await?.fen),
                    text => match text.parse::<UciMove>() {
                        Ok(mv) => {
                            if let Err(e) = controller.submit_move(mv).await {
                                eprintln!("{e}");
                            }
                        }
                        Err(e) => eprintln!("{e}"),
                    },
                }
            }
            event = events.recv() => match event {
                Ok(GameEvent::BoardChanged(snapshot)) => output.board(&snapshot)?,
                Ok(GameEvent::GameOver(over)) => {
                    output.game_over(&over)?;
                    break;
                }
                Ok(GameEvent::Error(message)) => eprintln!("{message}"),
                Ok(_) => {}
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            },
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::BoardState;

    #[test]
    fn test_format_ply() {
        let mut board = BoardState::new();
        assert_eq!(format_ply(&board.snapshot()), None);

        board.apply_uci(&"e2e4".parse().unwrap()).unwrap();
        assert_eq!(format_ply(&board.snapshot()).unwrap(), "1. e2e4");

        board.apply_uci(&"e7e5".parse().unwrap()).unwrap();
        assert_eq!(format_ply(&board.snapshot()).unwrap(), "1... e7e5");
    }
}
