use chess::{BoardSnapshot, UciMove};
use tokio::sync::{broadcast, oneshot};

use crate::events::{GameEvent, GameOverReason};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    #[error("Invalid move: {0}")]
    InvalidMove(String),
    #[error("Invalid position: {0}")]
    InvalidPosition(String),
    #[error("Engine is busy")]
    EngineBusy,
    #[error("Game is over")]
    GameOver,
    #[error("Engine error: {0}")]
    Engine(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// What the controller is doing right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerStatus {
    pub self_play: bool,
    pub engine_busy: bool,
    pub game_over: Option<GameOverReason>,
}

/// Commands sent to the controller actor. Each embeds a oneshot for the reply.
pub(crate) enum ControllerCommand {
    SubmitMove {
        mv: UciMove,
        reply: oneshot::Sender<Result<BoardSnapshot, ControllerError>>,
    },
    RequestBestMove {
        reply: oneshot::Sender<Result<(), ControllerError>>,
    },
    NewGame {
        reply: oneshot::Sender<Result<BoardSnapshot, ControllerError>>,
    },
    NewPosition {
        fen: String,
        reply: oneshot::Sender<Result<BoardSnapshot, ControllerError>>,
    },
    SetSelfPlay {
        enabled: bool,
        reply: oneshot::Sender<()>,
    },
    GetSnapshot {
        reply: oneshot::Sender<BoardSnapshot>,
    },
    GetStatus {
        reply: oneshot::Sender<ControllerStatus>,
    },
    Subscribe {
        reply: oneshot::Sender<(BoardSnapshot, broadcast::Receiver<GameEvent>)>,
    },
    Shutdown,
}
