use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, OnceLock};
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::{broadcast, mpsc, oneshot, watch, Mutex, Semaphore};
use uuid::Uuid;

use super::config::SessionConfig;
use super::dispatch::{self, DispatchContext, Request};
use super::events::EngineEvent;
use super::router::{self, RouterMsg};
use super::state::SessionState;
use crate::error::EngineError;
use crate::process::EngineProcess;
use crate::protocol::{EngineCommand, ProtocolTokens};

/// Lines buffered between the reader and the router.
const LINE_BUFFER: usize = 256;

/// How long `shutdown` waits for the engine to exit after `quit`.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Cloneable handle to a running engine session.
///
/// Commands are admitted in submission order and at most one is in flight at
/// a time. Dropping the last handle tears down the tasks and kills the child.
#[derive(Clone)]
pub struct EngineSession {
    inner: Arc<Inner>,
}

struct Inner {
    id: Uuid,
    queue: mpsc::UnboundedSender<Request>,
    events: broadcast::Sender<EngineEvent>,
    state: Arc<watch::Sender<SessionState>>,
    gate: Arc<Semaphore>,
    process: Arc<Mutex<EngineProcess>>,
    router: mpsc::UnboundedSender<RouterMsg>,
    tokens: Arc<ProtocolTokens>,
    engine_name: OnceLock<String>,
}

impl EngineSession {
    /// Launch the engine and run the handshake. On failure the process is
    /// told to quit before the error is returned.
    #[tracing::instrument(level = "info", skip_all, fields(engine = %config.engine_path.display()))]
    pub async fn start(config: SessionConfig) -> Result<Self, EngineError> {
        let mut process = EngineProcess::start_with_args(&config.engine_path, &config.engine_args)?;
        let lines = process.lines().ok_or(EngineError::ChannelClosed)?;

        let (state_tx, state_rx) = watch::channel(SessionState::Uninitialized);
        let state = Arc::new(state_tx);
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        let (line_tx, line_rx) = mpsc::channel(LINE_BUFFER);
        let (router_tx, router_rx) = mpsc::unbounded_channel();
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        let gate = Arc::new(Semaphore::new(1));
        let process = Arc::new(Mutex::new(process));
        let tokens = Arc::new(config.tokens.clone());

        tokio::spawn(router::pump_lines(lines, line_tx, state_rx));
        tokio::spawn(router::run_router(router_rx, line_rx, events.clone()));
        tokio::spawn(dispatch::run_dispatcher(
            queue_rx,
            DispatchContext {
                gate: gate.clone(),
                state: state.clone(),
                process: process.clone(),
                router: router_tx.clone(),
                events: events.clone(),
                tokens: tokens.clone(),
            },
        ));

        let session = Self {
            inner: Arc::new(Inner {
                id: Uuid::new_v4(),
                queue: queue_tx,
                events,
                state,
                gate,
                process,
                router: router_tx,
                tokens,
                engine_name: OnceLock::new(),
            }),
        };
        tracing::info!(session_id = %session.id(), "Engine session starting");

        session.inner.state.send_replace(SessionState::Handshaking);
        let outcome = tokio::time::timeout(config.handshake_timeout, session.handshake(&config)).await;
        let failure = match outcome {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(e.to_string()),
            Err(_) => Some(format!(
                "no response within {:?}",
                config.handshake_timeout
            )),
        };
        if let Some(reason) = failure {
            tracing::error!("Engine handshake failed: {}", reason);
            session.quit().await;
            return Err(EngineError::HandshakeFailed(reason));
        }

        session.inner.state.send_replace(SessionState::Idle);
        tracing::info!(
            session_id = %session.id(),
            "Engine ready: {}",
            session.engine_name().unwrap_or("unknown")
        );
        Ok(session)
    }

    /// Run `body` with a fresh session, shutting it down afterwards however
    /// `body` finishes. A panic drops the handles, which kills the child.
    pub async fn scoped<F, Fut, T>(config: SessionConfig, body: F) -> Result<T, EngineError>
    where
        F: FnOnce(EngineSession) -> Fut,
        Fut: Future<Output = T>,
    {
        let session = Self::start(config).await?;
        let guard = session.clone();
        let output = body(session).await;
        guard.shutdown().await;
        Ok(output)
    }

    async fn handshake(&self, config: &SessionConfig) -> Result<(), EngineError> {
        let tokens = &self.inner.tokens;
        self.send_command(EngineCommand::new(&tokens.ready_probe, &tokens.ready_ok))
            .await?;

        let mut events = self.subscribe();
        self.send_command(EngineCommand::new(&tokens.identify, &tokens.identify_ok))
            .await?;
        // completion is broadcast before the reply, so the identification
        // output is already buffered here
        loop {
            match events.try_recv() {
                Ok(EngineEvent::VerboseLine(line)) => {
                    if let Some(name) = line.strip_prefix(tokens.id_name.as_str()) {
                        let _ = self.inner.engine_name.set(name.trim().to_string());
                    }
                }
                Ok(_) => {}
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::debug!("Skipped {} handshake lines", skipped);
                }
                Err(_) => break,
            }
        }

        for (name, value) in &config.options {
            tracing::info!("Setting option {} = {}", name, value);
            self.send_command(tokens.set_option_command(name, value))
                .await?;
        }
        Ok(())
    }

    /// Queue `command` and wait for the line that answers it.
    pub async fn send_command(&self, command: EngineCommand) -> Result<String, EngineError> {
        self.send_command_async(command).await
    }

    /// Queue `command` now; the returned future resolves with its response.
    pub fn send_command_async(&self, command: EngineCommand) -> PendingCommand {
        let (reply, rx) = oneshot::channel();
        if self.state().is_closed() {
            let _ = reply.send(Err(EngineError::ChannelClosed));
        } else {
            tracing::debug!("Queueing command: {:?}", command.text);
            // on failure the reply is dropped with the request
            let _ = self.inner.queue.send(Request { command, reply });
        }
        PendingCommand { rx }
    }

    /// Like [`send_command`](Self::send_command) for callers outside the
    /// runtime. Panics if called from within an async context.
    pub fn send_command_blocking(&self, command: EngineCommand) -> Result<String, EngineError> {
        self.send_command_async(command).wait_blocking()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.inner.events.subscribe()
    }

    pub fn state(&self) -> SessionState {
        *self.inner.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    pub fn is_busy(&self) -> bool {
        self.state() == SessionState::AwaitingResponse || self.inner.gate.available_permits() == 0
    }

    /// The engine's self-reported name, if it sent one during the handshake.
    pub fn engine_name(&self) -> Option<&str> {
        self.inner.engine_name.get().map(String::as_str)
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn tokens(&self) -> &ProtocolTokens {
        &self.inner.tokens
    }

    /// Close the session, then write the quit line. Pending and later
    /// commands fail with [`EngineError::ChannelClosed`]. Does not wait for
    /// the process to exit.
    pub async fn quit(&self) {
        let closing = self.inner.state.send_if_modified(|state| {
            if state.is_closed() {
                false
            } else {
                *state = SessionState::Closed;
                true
            }
        });
        if !closing {
            return;
        }

        tracing::info!(session_id = %self.id(), "Closing engine session");
        self.inner.gate.close();
        let _ = self.inner.router.send(RouterMsg::Detach);
        let mut process = self.inner.process.lock().await;
        process.quit(&self.inner.tokens.quit).await;
    }

    /// Quit, then wait briefly for the process to exit and kill it if needed.
    pub async fn shutdown(&self) {
        self.quit().await;
        let mut process = self.inner.process.lock().await;
        if let Err(e) = process.terminate(SHUTDOWN_GRACE).await {
            tracing::warn!("Failed to reap engine process: {}", e);
        }
    }
}

impl std::fmt::Debug for EngineSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineSession")
            .field("id", &self.inner.id)
            .field("state", &self.state())
            .field("engine_name", &self.engine_name())
            .finish()
    }
}

/// Response of a queued command.
#[must_use = "the command is queued either way; await this to get its response"]
#[derive(Debug)]
pub struct PendingCommand {
    rx: oneshot::Receiver<Result<String, EngineError>>,
}

impl PendingCommand {
    fn wait_blocking(self) -> Result<String, EngineError> {
        self.rx
            .blocking_recv()
            .unwrap_or_else(|_| Err(EngineError::ChannelClosed))
    }
}

impl Future for PendingCommand {
    type Output = Result<String, EngineError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or_else(|_| Err(EngineError::ChannelClosed)))
    }
}
