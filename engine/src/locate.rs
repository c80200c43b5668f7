use std::env;
use std::path::{Path, PathBuf};

const ENGINE_BINARY: &str = "stockfish";

// Common install locations, checked before PATH
const KNOWN_PATHS: &[&str] = &[
    "/usr/local/bin/stockfish",
    "/usr/bin/stockfish",
    "/opt/homebrew/bin/stockfish",
    "/usr/games/stockfish",
];

/// Find a Stockfish executable in common locations or on `PATH`.
pub fn find_engine_path() -> Option<PathBuf> {
    let known = KNOWN_PATHS.iter().map(PathBuf::from);
    let on_path = env::var_os("PATH")
        .map(|paths| {
            env::split_paths(&paths)
                .map(|dir| dir.join(ENGINE_BINARY))
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let found = known.chain(on_path).find(|path| is_executable(path));
    match &found {
        Some(path) => tracing::info!("Found engine at: {:?}", path),
        None => tracing::warn!("No engine found in known locations or PATH"),
    }
    found
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
