use chess::UciMove;
use engine::{parse_uci_message, EngineError, EngineEvent, UciMessage};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc};
use tracing::Instrument;

use crate::commands::{ControllerCommand, ControllerError};
use crate::events::{GameEvent, GameOver, GameOverReason};
use crate::state::{ControllerState, EnginePhase};

/// The controller actor loop.
/// Owns the board. Processes commands, engine output and engine replies
/// sequentially.
pub(crate) async fn run_controller_actor(
    state: ControllerState,
    cmd_rx: mpsc::Receiver<ControllerCommand>,
    engine_events: broadcast::Receiver<EngineEvent>,
    event_tx: broadcast::Sender<GameEvent>,
) {
    let session_id = state.session.id();
    run_controller_actor_inner(state, cmd_rx, engine_events, event_tx)
        .instrument(tracing::info_span!("controller", session = %session_id))
        .await;
}

async fn run_controller_actor_inner(
    mut state: ControllerState,
    mut cmd_rx: mpsc::Receiver<ControllerCommand>,
    mut engine_events: broadcast::Receiver<EngineEvent>,
    event_tx: broadcast::Sender<GameEvent>,
) {
    tracing::info!("Controller actor started");
    let mut engine_events_open = true;

    loop {
        tokio::select! {
            // output lines are broadcast before the reply they precede
            biased;

            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(ControllerCommand::Shutdown) | None => {
                        tracing::info!("Controller actor shutting down");
                        state.session.shutdown().await;
                        break;
                    }
                    Some(cmd) => handle_command(&mut state, cmd, &event_tx),
                }
            }

            event = engine_events.recv(), if engine_events_open => {
                match event {
                    Ok(event) => handle_engine_event(event, &event_tx),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!("Skipped {} engine events", skipped);
                    }
                    Err(RecvError::Closed) => engine_events_open = false,
                }
            }

            reply = state.next_engine_reply() => {
                handle_engine_reply(&mut state, reply, &event_tx);
            }
        }
    }

    tracing::info!("Controller actor exited");
}

fn handle_command(
    state: &mut ControllerState,
    cmd: ControllerCommand,
    event_tx: &broadcast::Sender<GameEvent>,
) {
    match cmd {
        ControllerCommand::SubmitMove { mv, reply } => {
            let _ = reply.send(submit_move(state, mv, event_tx));
        }
        ControllerCommand::RequestBestMove { reply } => {
            let result = state.ensure_playable().map(|()| state.start_cycle());
            let _ = reply.send(result);
        }
        ControllerCommand::NewGame { reply } => {
            let result = state.ensure_idle().map(|()| {
                state.board.new_game();
                reset(state, event_tx)
            });
            let _ = reply.send(result);
        }
        ControllerCommand::NewPosition { fen, reply } => {
            let result = state.ensure_idle().and_then(|()| {
                state
                    .board
                    .new_position(&fen)
                    .map_err(|e| ControllerError::InvalidPosition(e.to_string()))?;
                Ok(reset(state, event_tx))
            });
            let _ = reply.send(result);
        }
        ControllerCommand::SetSelfPlay { enabled, reply } => {
            tracing::info!("Self-play {}", if enabled { "on" } else { "off" });
            state.self_play = enabled;
            if enabled && state.game_over.is_none() && state.phase.is_idle() {
                state.start_cycle();
            }
            let _ = reply.send(());
        }
        ControllerCommand::GetSnapshot { reply } => {
            let _ = reply.send(state.snapshot());
        }
        ControllerCommand::GetStatus { reply } => {
            let _ = reply.send(state.status());
        }
        ControllerCommand::Subscribe { reply } => {
            let _ = reply.send((state.snapshot(), event_tx.subscribe()));
        }
        ControllerCommand::Shutdown => unreachable!(),
    }
}

fn submit_move(
    state: &mut ControllerState,
    mv: UciMove,
    event_tx: &broadcast::Sender<GameEvent>,
) -> Result<chess::BoardSnapshot, ControllerError> {
    state.ensure_playable()?;
    state
        .board
        .apply_uci(&mv)
        .map_err(|e| ControllerError::InvalidMove(e.to_string()))?;
    tracing::info!("Move submitted: {}", mv);

    state.synced = false;
    let snapshot = state.snapshot();
    let _ = event_tx.send(GameEvent::BoardChanged(snapshot.clone()));
    state.start_sync();
    Ok(snapshot)
}

/// Common tail of new game / new position once the board is replaced.
fn reset(
    state: &mut ControllerState,
    event_tx: &broadcast::Sender<GameEvent>,
) -> chess::BoardSnapshot {
    state.game_over = None;
    state.synced = false;
    let snapshot = state.snapshot();
    tracing::info!("Board reset: {}", snapshot.fen);
    let _ = event_tx.send(GameEvent::BoardChanged(snapshot.clone()));
    state.start_reset();
    snapshot
}

fn handle_engine_event(event: EngineEvent, event_tx: &broadcast::Sender<GameEvent>) {
    if let EngineEvent::VerboseLine(line) = event {
        if let Ok(UciMessage::Info(info)) = parse_uci_message(&line) {
            tracing::trace!("Received info: {:?}", info);
            let _ = event_tx.send(GameEvent::Thinking(info));
        }
    }
}

fn handle_engine_reply(
    state: &mut ControllerState,
    reply: Result<String, EngineError>,
    event_tx: &broadcast::Sender<GameEvent>,
) {
    let phase = std::mem::replace(&mut state.phase, EnginePhase::Idle);
    match (phase, reply) {
        (EnginePhase::Diagnosing { reason, .. }, result) => {
            if let Err(e) = result {
                tracing::warn!("Diagnostic dump failed: {}", e);
            }
            finish_game(state, reason, event_tx);
        }
        (_, Err(e)) => {
            tracing::error!("Engine command failed: {}", e);
            state.self_play = false;
            let _ = event_tx.send(GameEvent::Error(ControllerError::Engine(e.to_string()).to_string()));
        }
        (EnginePhase::Resetting(_), Ok(_)) => {
            if state.self_play {
                state.start_cycle();
            }
        }
        (EnginePhase::Syncing(_), Ok(_)) => {
            state.synced = true;
            state.start_search();
        }
        (EnginePhase::Searching(_), Ok(line)) => handle_best_move(state, line, event_tx),
        (EnginePhase::Idle, Ok(line)) => {
            tracing::debug!("Ignoring reply while idle: {}", line);
        }
    }
}

fn handle_best_move(
    state: &mut ControllerState,
    line: String,
    event_tx: &broadcast::Sender<GameEvent>,
) {
    tracing::info!("Received {}", line);
    let parsed = state.session.tokens().parse_best_move(&line);
    let _ = event_tx.send(GameEvent::BestMove(line));

    let mv = match parsed {
        Ok(Some(mv)) => mv,
        Ok(None) => return state.begin_game_over(GameOverReason::NoLegalMove),
        Err(e) => {
            return state.begin_game_over(GameOverReason::Desync {
                detail: e.to_string(),
            })
        }
    };

    if let Some(reason) = state.stop_condition() {
        return state.begin_game_over(reason);
    }

    match state.board.apply_uci(&mv) {
        Ok(applied) => {
            tracing::debug!("Applied engine move {}", applied.notation);
            state.synced = false;
            let _ = event_tx.send(GameEvent::BoardChanged(state.snapshot()));
            if state.self_play {
                state.start_cycle();
            }
        }
        Err(e) => {
            tracing::error!("Engine move {} does not fit the board: {}", mv, e);
            state.begin_game_over(GameOverReason::Desync {
                detail: e.to_string(),
            });
        }
    }
}

fn finish_game(
    state: &mut ControllerState,
    reason: GameOverReason,
    event_tx: &broadcast::Sender<GameEvent>,
) {
    tracing::info!("Game over: {}", reason);
    let over = GameOver {
        reason,
        snapshot: state.snapshot(),
    };
    state.game_over = Some(over.clone());
    let _ = event_tx.send(GameEvent::GameOver(over));
}
