use std::path::PathBuf;

/// Errors raised while driving an engine process.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The process could not be created (bad path, permissions).
    #[error("failed to launch engine {path:?}: {source}")]
    LaunchFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The engine never produced a handshake token.
    #[error("engine handshake failed: {0}")]
    HandshakeFailed(String),
    /// The process exited or the session was quit.
    #[error("engine channel closed")]
    ChannelClosed,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
