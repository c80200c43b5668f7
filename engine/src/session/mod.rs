//! Single-in-flight command session over an engine process.
//!
//! A session runs three tasks: a reader pumping stdout lines, a router that
//! matches lines against the in-flight command, and a dispatcher admitting
//! queued commands one at a time through a one-permit semaphore.

mod config;
mod dispatch;
mod events;
mod handle;
mod router;
mod state;

pub use config::{SessionConfig, DEFAULT_EVENT_CAPACITY, DEFAULT_HANDSHAKE_TIMEOUT};
pub use events::EngineEvent;
pub use handle::{EngineSession, PendingCommand, SHUTDOWN_GRACE};
pub use state::SessionState;
