use chess::{BoardSnapshot, BoardState};
use engine::{EngineError, EngineSession, PendingCommand};

use crate::commands::{ControllerError, ControllerStatus};
use crate::config::ControllerConfig;
use crate::events::{GameOver, GameOverReason};

/// The engine command the controller is waiting on, if any.
#[derive(Debug)]
pub(crate) enum EnginePhase {
    Idle,
    Resetting(PendingCommand),
    Syncing(PendingCommand),
    Searching(PendingCommand),
    Diagnosing {
        pending: PendingCommand,
        reason: GameOverReason,
    },
}

impl EnginePhase {
    pub fn is_idle(&self) -> bool {
        matches!(self, EnginePhase::Idle)
    }

    fn pending_mut(&mut self) -> Option<&mut PendingCommand> {
        match self {
            EnginePhase::Idle => None,
            EnginePhase::Resetting(pending)
            | EnginePhase::Syncing(pending)
            | EnginePhase::Searching(pending)
            | EnginePhase::Diagnosing { pending, .. } => Some(pending),
        }
    }
}

/// All mutable state of one game, owned by the actor task.
pub(crate) struct ControllerState {
    pub board: BoardState,
    pub session: EngineSession,
    pub config: ControllerConfig,
    pub phase: EnginePhase,
    pub self_play: bool,
    /// The engine has been sent the current position.
    pub synced: bool,
    pub game_over: Option<GameOver>,
}

impl ControllerState {
    pub fn new(session: EngineSession, board: BoardState, config: ControllerConfig) -> Self {
        Self {
            board,
            session,
            config,
            phase: EnginePhase::Idle,
            self_play: false,
            synced: false,
            game_over: None,
        }
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        self.board.snapshot()
    }

    pub fn status(&self) -> ControllerStatus {
        ControllerStatus {
            self_play: self.self_play,
            engine_busy: !self.phase.is_idle(),
            game_over: self.game_over.as_ref().map(|over| over.reason.clone()),
        }
    }

    /// Resolves when the outstanding engine command answers; never while idle.
    pub async fn next_engine_reply(&mut self) -> Result<String, EngineError> {
        match self.phase.pending_mut() {
            Some(pending) => pending.await,
            None => std::future::pending().await,
        }
    }

    pub fn ensure_playable(&self) -> Result<(), ControllerError> {
        if self.game_over.is_some() {
            return Err(ControllerError::GameOver);
        }
        self.ensure_idle()
    }

    pub fn ensure_idle(&self) -> Result<(), ControllerError> {
        if self.phase.is_idle() {
            Ok(())
        } else {
            Err(ControllerError::EngineBusy)
        }
    }

    /// Why the game must end before the engine's next move is applied.
    pub fn stop_condition(&self) -> Option<GameOverReason> {
        let halfmove_clock = self.board.halfmove_clock();
        if halfmove_clock >= self.config.draw_threshold {
            return Some(GameOverReason::DrawThreshold { halfmove_clock });
        }
        let fullmove_number = self.board.fullmove_number();
        match self.config.max_full_moves {
            Some(limit) if fullmove_number > limit => {
                Some(GameOverReason::MoveLimit { fullmove_number })
            }
            _ => None,
        }
    }

    pub fn start_reset(&mut self) {
        let command = self.session.tokens().new_game_command();
        self.phase = EnginePhase::Resetting(self.session.send_command_async(command));
    }

    pub fn start_sync(&mut self) {
        let command = self
            .session
            .tokens()
            .position_command(self.board.start_position(), self.board.history());
        tracing::debug!("Syncing position: {}", command.text);
        self.phase = EnginePhase::Syncing(self.session.send_command_async(command));
    }

    pub fn start_search(&mut self) {
        let command = self.session.tokens().search_command(self.config.movetime_ms);
        tracing::debug!(
            "Starting engine calculation with movetime={}ms",
            self.config.movetime_ms
        );
        self.phase = EnginePhase::Searching(self.session.send_command_async(command));
    }

    /// Search from the current board, syncing it first if needed.
    pub fn start_cycle(&mut self) {
        if self.synced {
            self.start_search();
        } else {
            self.start_sync();
        }
    }

    /// Stop self-play and ask the engine for its diagnostic dump; the game
    /// ends once the dump completes.
    pub fn begin_game_over(&mut self, reason: GameOverReason) {
        tracing::info!("Ending game: {}", reason);
        self.self_play = false;
        let command = self.session.tokens().diagnostic_command();
        self.phase = EnginePhase::Diagnosing {
            pending: self.session.send_command_async(command),
            reason,
        };
    }
}
