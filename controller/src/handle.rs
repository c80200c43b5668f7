use chess::{BoardSnapshot, BoardState, UciMove};
use engine::EngineSession;
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::actor::run_controller_actor;
use crate::commands::{ControllerCommand, ControllerError, ControllerStatus};
use crate::config::ControllerConfig;
use crate::events::GameEvent;
use crate::state::ControllerState;

const COMMAND_BUFFER: usize = 32;
const EVENT_BUFFER: usize = 256;

/// Cheap, cloneable handle to a controller actor.
#[derive(Clone)]
pub struct GameController {
    cmd_tx: mpsc::Sender<ControllerCommand>,
}

impl GameController {
    /// Spawn the actor. It takes over `session` and `board` until shutdown.
    pub fn spawn(session: EngineSession, board: BoardState, config: ControllerConfig) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER);
        let (event_tx, _) = broadcast::channel(EVENT_BUFFER);
        let engine_events = session.subscribe();

        let state = ControllerState::new(session, board, config);
        tokio::spawn(run_controller_actor(state, cmd_rx, engine_events, event_tx));

        Self { cmd_tx }
    }

    /// Apply a move for the side to play, then let the engine answer it.
    pub async fn submit_move(&self, mv: UciMove) -> Result<BoardSnapshot, ControllerError> {
        let (tx, rx) = oneshot::channel();
        self.send(ControllerCommand::SubmitMove { mv, reply: tx })
            .await?;
        rx.await
            .map_err(|_| ControllerError::Internal("Reply dropped".into()))?
    }

    /// Ask the engine to move in the current position. The move arrives as
    /// events.
    pub async fn request_best_move(&self) -> Result<(), ControllerError> {
        let (tx, rx) = oneshot::channel();
        self.send(ControllerCommand::RequestBestMove { reply: tx })
            .await?;
        rx.await
            .map_err(|_| ControllerError::Internal("Reply dropped".into()))?
    }

    pub async fn new_game(&self) -> Result<BoardSnapshot, ControllerError> {
        let (tx, rx) = oneshot::channel();
        self.send(ControllerCommand::NewGame { reply: tx }).await?;
        rx.await
            .map_err(|_| ControllerError::Internal("Reply dropped".into()))?
    }

    pub async fn new_position(&self, fen: &str) -> Result<BoardSnapshot, ControllerError> {
        let (tx, rx) = oneshot::channel();
        self.send(ControllerCommand::NewPosition {
            fen: fen.to_string(),
            reply: tx,
        })
        .await?;
        rx.await
            .map_err(|_| ControllerError::Internal("Reply dropped".into()))?
    }

    pub async fn set_self_play(&self, enabled: bool) -> Result<(), ControllerError> {
        let (tx, rx) = oneshot::channel();
        self.send(ControllerCommand::SetSelfPlay { enabled, reply: tx })
            .await?;
        rx.await
            .map_err(|_| ControllerError::Internal("Reply dropped".into()))
    }

    pub async fn snapshot(&self) -> Result<BoardSnapshot, ControllerError> {
        let (tx, rx) = oneshot::channel();
        self.send(ControllerCommand::GetSnapshot { reply: tx }).await?;
        rx.await
            .map_err(|_| ControllerError::Internal("Reply dropped".into()))
    }

    pub async fn status(&self) -> Result<ControllerStatus, ControllerError> {
        let (tx, rx) = oneshot::channel();
        self.send(ControllerCommand::GetStatus { reply: tx }).await?;
        rx.await
            .map_err(|_| ControllerError::Internal("Reply dropped".into()))
    }

    pub async fn subscribe(
        &self,
    ) -> Result<(BoardSnapshot, broadcast::Receiver<GameEvent>), ControllerError> {
        let (tx, rx) = oneshot::channel();
        self.send(ControllerCommand::Subscribe { reply: tx }).await?;
        rx.await
            .map_err(|_| ControllerError::Internal("Reply dropped".into()))
    }

    /// Stop the actor and shut the engine session down.
    pub async fn shutdown(&self) {
        let _ = self.cmd_tx.send(ControllerCommand::Shutdown).await;
        self.cmd_tx.closed().await;
    }

    async fn send(&self, cmd: ControllerCommand) -> Result<(), ControllerError> {
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|_| ControllerError::Internal("Controller actor closed".into()))
    }
}
