/// Thinking time per best-move request, in milliseconds.
pub const DEFAULT_MOVETIME_MS: u64 = 1000;

/// Half-move clock value at which the game is declared drawn.
pub const DEFAULT_DRAW_THRESHOLD: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    pub movetime_ms: u64,
    pub draw_threshold: u32,
    /// Stop once this many full moves have been completed.
    pub max_full_moves: Option<u32>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            movetime_ms: DEFAULT_MOVETIME_MS,
            draw_threshold: DEFAULT_DRAW_THRESHOLD,
            max_full_moves: None,
        }
    }
}
