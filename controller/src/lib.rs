//! Game controller bridging the local board and an engine session.
//!
//! [`GameController`] is a handle to an actor task that owns the
//! [`chess::BoardState`]; all mutation happens on that task and views read
//! [`chess::BoardSnapshot`]s delivered through [`GameEvent`]s.

mod actor;
pub mod commands;
pub mod config;
pub mod events;
mod handle;
mod state;

pub use commands::{ControllerError, ControllerStatus};
pub use config::{ControllerConfig, DEFAULT_DRAW_THRESHOLD, DEFAULT_MOVETIME_MS};
pub use events::{GameEvent, GameOver, GameOverReason};
pub use handle::GameController;
