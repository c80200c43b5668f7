//! Reader and router tasks.
//!
//! The reader pumps engine stdout into a bounded channel. The router owns the
//! expectation of the in-flight command and decides, line by line, whether a
//! line answers it or is verbose output.

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio_stream::StreamExt;

use super::events::EngineEvent;
use super::state::SessionState;
use crate::error::EngineError;
use crate::process::EngineLines;
use crate::protocol::EngineCommand;

pub(crate) type Reply = oneshot::Sender<Result<String, EngineError>>;

/// The prefix the in-flight command waits for.
#[derive(Debug)]
pub(crate) struct Expectation {
    pub command: EngineCommand,
    pub prefix: String,
    pub reply: Reply,
}

#[derive(Debug)]
pub(crate) enum RouterMsg {
    Expect(Expectation),
    Detach,
}

pub(crate) async fn pump_lines(
    mut lines: EngineLines,
    tx: mpsc::Sender<String>,
    mut state: watch::Receiver<SessionState>,
) {
    loop {
        tokio::select! {
            // the watch guard must not outlive this arm
            _ = async { let _ = state.wait_for(SessionState::is_closed).await; } => {
                tracing::debug!("Session closed, reader stopping");
                break;
            }
            line = lines.next() => match line {
                Some(Ok(line)) => {
                    let line = line.trim_end().to_string();
                    tracing::trace!("UCI << {}", line);
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
                Some(Err(e)) => {
                    tracing::error!("Error reading from engine stdout: {}", e);
                    break;
                }
                None => {
                    tracing::warn!("Engine stdout EOF - engine closed");
                    break;
                }
            }
        }
    }
    tracing::debug!("Output reader task exiting");
}

pub(crate) async fn run_router(
    mut control: mpsc::UnboundedReceiver<RouterMsg>,
    mut lines: mpsc::Receiver<String>,
    events: broadcast::Sender<EngineEvent>,
) {
    let mut pending: Option<Expectation> = None;

    loop {
        tokio::select! {
            // registrations are always installed before the lines they wait for
            biased;

            msg = control.recv() => match msg {
                Some(RouterMsg::Expect(expectation)) => {
                    tracing::debug!(
                        "Awaiting {:?} for {:?}",
                        expectation.prefix,
                        expectation.command.text
                    );
                    if let Some(stale) = pending.replace(expectation) {
                        let _ = stale.reply.send(Err(EngineError::ChannelClosed));
                    }
                }
                Some(RouterMsg::Detach) | None => break,
            },
            line = lines.recv() => match line {
                Some(line) => route_line(&mut pending, line, &events),
                None => break,
            },
        }
    }

    if let Some(expectation) = pending.take() {
        tracing::debug!("Router detached with {:?} in flight", expectation.command.text);
        let _ = expectation.reply.send(Err(EngineError::ChannelClosed));
    }
    tracing::debug!("Router task exiting");
}

fn route_line(
    pending: &mut Option<Expectation>,
    line: String,
    events: &broadcast::Sender<EngineEvent>,
) {
    match pending.take() {
        Some(expectation) if line.starts_with(&expectation.prefix) => {
            let _ = events.send(EngineEvent::CommandCompleted {
                command: expectation.command,
                response: line.clone(),
            });
            let _ = expectation.reply.send(Ok(line));
        }
        other => {
            *pending = other;
            let _ = events.send(EngineEvent::VerboseLine(line));
        }
    }
}
