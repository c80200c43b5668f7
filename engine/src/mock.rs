//! Scripted fake engine for tests.
//!
//! The engine is a small POSIX shell script written into a temporary
//! directory and run through `/bin/sh`. It answers the handshake, plays a
//! fixed list of moves indexed by how many moves the last `position` command
//! carried, and logs every line it receives.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::session::SessionConfig;

const SHELL: &str = "/bin/sh";

/// A fake engine on disk. Keep it alive for as long as sessions use it.
#[derive(Debug)]
pub struct MockEngine {
    _dir: TempDir,
    script: PathBuf,
    log: PathBuf,
}

#[derive(Debug, Clone)]
pub struct MockEngineBuilder {
    name: String,
    moves: Vec<String>,
    think_ms: u64,
    handshake: bool,
}

impl Default for MockEngineBuilder {
    fn default() -> Self {
        Self {
            name: "MockFish 1.0".to_string(),
            moves: Vec::new(),
            think_ms: 0,
            handshake: true,
        }
    }
}

impl MockEngineBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Moves played in order; once exhausted the engine answers `(none)`.
    pub fn moves<I, S>(mut self, moves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.moves = moves.into_iter().map(Into::into).collect();
        self
    }

    /// Delay before each best move.
    pub fn think_ms(mut self, ms: u64) -> Self {
        self.think_ms = ms;
        self
    }

    /// An engine that reads its input but never answers anything.
    pub fn silent(mut self) -> Self {
        self.handshake = false;
        self
    }

    pub fn build(self) -> io::Result<MockEngine> {
        let dir = tempfile::tempdir()?;
        let script = dir.path().join("mock-engine.sh");
        let log = dir.path().join("received.log");
        fs::write(&script, self.render(&log))?;
        Ok(MockEngine {
            _dir: dir,
            script,
            log,
        })
    }

    fn render(&self, log: &Path) -> String {
        let log = quote(&log.to_string_lossy());
        if !self.handshake {
            return format!("while IFS= read -r line; do\n  echo \"$line\" >> {log}\ndone\n");
        }

        let think = if self.think_ms > 0 {
            format!("sleep {}.{:03}", self.think_ms / 1000, self.think_ms % 1000)
        } else {
            ":".to_string()
        };

        format!(
            r#"set -f
plies={plies}
count=0
while IFS= read -r line; do
  echo "$line" >> {log}
  case "$line" in
    uci)
      echo "id name "{name}
      echo "id author chessdrive"
      echo "option name Hash type spin default 16 min 1 max 1024"
      echo "uciok"
      ;;
    isready)
      echo "readyok"
      ;;
    "position "*)
      case "$line" in
        *" moves "*)
          set -- ${{line#* moves }}
          count=$#
          ;;
        *)
          count=0
          ;;
      esac
      ;;
    "go "*|go)
      {think}
      set -- $plies
      if [ "$count" -lt "$#" ]; then
        shift "$count"
        echo "info depth 1 seldepth 1 score cp 20 nodes 100 nps 1000 time 1 pv $1"
        echo "bestmove $1"
      else
        echo "info depth 0 score mate 0"
        echo "bestmove (none)"
      fi
      ;;
    "ping "*)
      echo "pong ${{line#ping }}"
      ;;
    d)
      echo " +---+---+---+---+---+---+---+---+"
      echo "Fen: mock"
      echo "Checkers:"
      ;;
    quit)
      exit 0
      ;;
  esac
done
"#,
            plies = quote(&self.moves.join(" ")),
            name = quote(&self.name),
        )
    }
}

impl MockEngine {
    pub fn builder() -> MockEngineBuilder {
        MockEngineBuilder::default()
    }

    /// A well-behaved engine that plays `moves` in order.
    pub fn with_moves<I, S>(moves: I) -> io::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::builder().moves(moves).build()
    }

    pub fn script_path(&self) -> &Path {
        &self.script
    }

    /// Session configuration that launches this engine.
    pub fn config(&self) -> SessionConfig {
        SessionConfig::new(SHELL).with_args([self.script.to_string_lossy().into_owned()])
    }

    /// Every line the engine has read so far, across all runs.
    pub fn received(&self) -> io::Result<Vec<String>> {
        match fs::read_to_string(&self.log) {
            Ok(text) => Ok(text.lines().map(str::to_string).collect()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }
}

/// Single-quote `text` for the shell.
fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote() {
        assert_eq!(quote("e2e4 e7e5"), "'e2e4 e7e5'");
        assert_eq!(quote("it's"), r"'it'\''s'");
    }

    #[test]
    fn test_script_written() {
        let engine = MockEngine::with_moves(["e2e4"]).unwrap();
        let script = fs::read_to_string(engine.script_path()).unwrap();
        assert!(script.contains("plies='e2e4'"));
        assert!(script.contains("echo \"id name \"'MockFish 1.0'"));
        assert!(engine.received().unwrap().is_empty());

        let config = engine.config();
        assert_eq!(config.engine_path, PathBuf::from(SHELL));
        assert_eq!(config.engine_args.len(), 1);
    }
}
