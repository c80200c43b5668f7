//! Ownership of the engine child process and its pipes.
//!
//! No protocol knowledge lives here: the process can be written a line at a
//! time, and its output is handed out once as a stream of lines.

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio_stream::wrappers::LinesStream;

use crate::error::EngineError;

/// Lines read from the engine's stdout. Ends when the process exits.
pub type EngineLines = LinesStream<BufReader<ChildStdout>>;

pub struct EngineProcess {
    path: PathBuf,
    child: Child,
    stdin: Option<BufWriter<ChildStdin>>,
    stdout: Option<ChildStdout>,
}

impl EngineProcess {
    pub fn start(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        Self::start_with_args(path, std::iter::empty::<&str>())
    }

    /// Spawn the engine with piped stdin/stdout. The child is killed if this
    /// value is dropped while it is still running.
    pub fn start_with_args<I, S>(path: impl AsRef<Path>, args: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let path = path.as_ref().to_path_buf();
        tracing::debug!("Spawning engine process {:?}", path);

        let mut child = Command::new(&path)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| {
                tracing::error!("Failed to spawn engine {:?}: {}", path, source);
                EngineError::LaunchFailed {
                    path: path.clone(),
                    source,
                }
            })?;

        let stdin = child.stdin.take().map(BufWriter::new);
        let stdout = child.stdout.take();
        tracing::info!(pid = ?child.id(), "Engine process started: {:?}", path);

        Ok(Self {
            path,
            child,
            stdin,
            stdout,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// OS process id, `None` once the child has been reaped.
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    pub fn is_closed(&self) -> bool {
        self.stdin.is_none()
    }

    /// Write one line (a newline is appended) and flush it.
    pub async fn write_line(&mut self, text: &str) -> Result<(), EngineError> {
        let stdin = self.stdin.as_mut().ok_or(EngineError::ChannelClosed)?;
        tracing::trace!("UCI >> {}", text);

        let result = async {
            stdin.write_all(text.as_bytes()).await?;
            stdin.write_all(b"\n").await?;
            stdin.flush().await
        }
        .await;

        match result {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                tracing::warn!("Engine stdin closed: {}", e);
                self.stdin = None;
                Err(EngineError::ChannelClosed)
            }
            Err(e) => {
                tracing::error!("Failed to write to engine stdin: {}", e);
                Err(EngineError::Io(e))
            }
        }
    }

    /// Take the output stream. Only the first call returns `Some`.
    pub fn lines(&mut self) -> Option<EngineLines> {
        self.stdout
            .take()
            .map(|stdout| LinesStream::new(BufReader::new(stdout).lines()))
    }

    /// Send the termination line and close stdin. Does not wait for the
    /// process to exit.
    pub async fn quit(&mut self, command: &str) {
        if self.stdin.is_none() {
            return;
        }
        tracing::info!("Sending {:?} to engine", command);
        if let Err(e) = self.write_line(command).await {
            tracing::debug!("Engine already gone while quitting: {}", e);
        }
        if let Some(mut stdin) = self.stdin.take() {
            let _ = stdin.shutdown().await;
        }
    }

    /// Wait up to `grace` for the process to exit on its own, then kill it.
    pub async fn terminate(&mut self, grace: Duration) -> io::Result<ExitStatus> {
        match tokio::time::timeout(grace, self.child.wait()).await {
            Ok(status) => status,
            Err(_) => {
                tracing::warn!("Engine did not exit within {:?}, killing it", grace);
                self.child.kill().await?;
                self.child.wait().await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    #[tokio::test]
    async fn test_launch_failure() {
        let result = EngineProcess::start("/nonexistent/engine-binary");
        assert!(matches!(result, Err(EngineError::LaunchFailed { .. })));
    }

    #[tokio::test]
    async fn test_write_and_read_lines() {
        let mut process = EngineProcess::start("cat").unwrap();
        let mut lines = process.lines().unwrap();
        assert!(process.lines().is_none());

        process.write_line("isready").await.unwrap();
        process.write_line("go movetime 10").await.unwrap();
        assert_eq!(lines.next().await.unwrap().unwrap(), "isready");
        assert_eq!(lines.next().await.unwrap().unwrap(), "go movetime 10");

        process.quit("quit").await;
        assert!(process.is_closed());
        // cat echoes the quit line, then stdin EOF ends it
        assert_eq!(lines.next().await.unwrap().unwrap(), "quit");
        assert!(lines.next().await.is_none());

        assert!(matches!(
            process.write_line("isready").await,
            Err(EngineError::ChannelClosed)
        ));
        let status = process.terminate(Duration::from_secs(5)).await.unwrap();
        assert!(status.success());
    }
}
