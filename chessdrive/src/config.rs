//! Runtime tunables for the CLI.
//!
//! Every value has a compile-time default and can be overridden via a
//! dedicated environment variable; command-line flags take precedence over
//! both.

use std::path::PathBuf;

/// Default thinking time per engine move (in milliseconds).
const DEFAULT_MOVETIME_MS: u64 = controller::DEFAULT_MOVETIME_MS;

/// Default half-move clock value that ends self-play as a draw.
const DEFAULT_DRAW_THRESHOLD: u32 = controller::DEFAULT_DRAW_THRESHOLD;

/// Default time allowed for the engine handshake (in seconds).
const DEFAULT_HANDSHAKE_TIMEOUT_SECS: u64 = 10;

/// Get the engine executable path.
///
/// Priority:
/// 1. `CHESSDRIVE_ENGINE_PATH` env variable if set
/// 2. A search of common install locations and `PATH`
pub fn get_engine_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("CHESSDRIVE_ENGINE_PATH") {
        return Some(PathBuf::from(path));
    }

    engine::find_engine_path()
}

/// Get the engine thinking time in milliseconds.
///
/// Priority:
/// 1. `CHESSDRIVE_MOVETIME_MS` env variable if set (falls back to default if
///    the value cannot be parsed as a `u64`)
/// 2. `1000` as fallback
pub fn get_movetime_ms() -> u64 {
    parse_or(std::env::var("CHESSDRIVE_MOVETIME_MS").ok(), DEFAULT_MOVETIME_MS)
}

/// Get the draw threshold in half-moves.
///
/// Priority:
/// 1. `CHESSDRIVE_DRAW_THRESHOLD` env variable if set
/// 2. `100` as fallback
pub fn get_draw_threshold() -> u32 {
    parse_or(
        std::env::var("CHESSDRIVE_DRAW_THRESHOLD").ok(),
        DEFAULT_DRAW_THRESHOLD,
    )
}

/// Get the engine handshake timeout in seconds.
///
/// Priority:
/// 1. `CHESSDRIVE_HANDSHAKE_TIMEOUT_SECS` env variable if set
/// 2. `10` seconds as fallback
pub fn get_handshake_timeout_secs() -> u64 {
    parse_or(
        std::env::var("CHESSDRIVE_HANDSHAKE_TIMEOUT_SECS").ok(),
        DEFAULT_HANDSHAKE_TIMEOUT_SECS,
    )
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or() {
        assert_eq!(parse_or(Some("250".into()), DEFAULT_MOVETIME_MS), 250);
        assert_eq!(parse_or(Some(" 40 ".into()), DEFAULT_DRAW_THRESHOLD), 40);
        assert_eq!(parse_or(Some("fast".into()), DEFAULT_MOVETIME_MS), 1000);
        assert_eq!(parse_or(None, DEFAULT_HANDSHAKE_TIMEOUT_SECS), 10);
    }

    // Note: the env-reading getters are not tested directly to avoid
    // pollution between tests running in parallel.
}
