use std::path::PathBuf;
use std::time::Duration;

use crate::protocol::ProtocolTokens;

pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// How to launch and talk to an engine.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub engine_path: PathBuf,
    pub engine_args: Vec<String>,
    pub tokens: ProtocolTokens,
    pub handshake_timeout: Duration,
    /// `setoption` pairs applied once the handshake succeeds.
    pub options: Vec<(String, String)>,
    /// Events buffered per subscriber before it starts lagging.
    pub event_capacity: usize,
}

impl SessionConfig {
    pub fn new(engine_path: impl Into<PathBuf>) -> Self {
        Self {
            engine_path: engine_path.into(),
            ..Default::default()
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.engine_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tokens(mut self, tokens: ProtocolTokens) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push((name.into(), value.into()));
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            engine_path: PathBuf::from("stockfish"),
            engine_args: Vec::new(),
            tokens: ProtocolTokens::uci(),
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            options: Vec::new(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}
