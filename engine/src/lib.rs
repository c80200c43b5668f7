//! Engine process ownership and the UCI command session.

pub mod error;
pub mod locate;
#[cfg(feature = "mock")]
pub mod mock;
pub mod process;
pub mod protocol;
pub mod session;
pub mod uci;

pub use error::EngineError;
pub use locate::find_engine_path;
pub use process::{EngineLines, EngineProcess};
pub use protocol::{EngineCommand, ProtocolTokens};
pub use session::{EngineEvent, EngineSession, PendingCommand, SessionConfig, SessionState};
pub use uci::{parse_uci_message, EngineInfo, Score, UciError, UciMessage};
