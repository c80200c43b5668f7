//! FIFO admission of commands through the single-slot gate.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot, watch, Mutex, OwnedSemaphorePermit, Semaphore};

use super::events::EngineEvent;
use super::router::{Expectation, Reply, RouterMsg};
use super::state::SessionState;
use crate::error::EngineError;
use crate::process::EngineProcess;
use crate::protocol::{EngineCommand, ProtocolTokens};

#[derive(Debug)]
pub(crate) struct Request {
    pub command: EngineCommand,
    pub reply: Reply,
}

/// Shared handles a command writer needs.
#[derive(Clone)]
pub(crate) struct DispatchContext {
    pub gate: Arc<Semaphore>,
    pub state: Arc<watch::Sender<SessionState>>,
    pub process: Arc<Mutex<EngineProcess>>,
    pub router: mpsc::UnboundedSender<RouterMsg>,
    pub events: broadcast::Sender<EngineEvent>,
    pub tokens: Arc<ProtocolTokens>,
}

pub(crate) async fn run_dispatcher(
    mut queue: mpsc::UnboundedReceiver<Request>,
    ctx: DispatchContext,
) {
    while let Some(request) = queue.recv().await {
        let permit = match ctx.gate.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => {
                // gate closed by quit
                let _ = request.reply.send(Err(EngineError::ChannelClosed));
                continue;
            }
        };
        tokio::spawn(run_command(ctx.clone(), request, permit));
    }
    tracing::debug!("Dispatcher task exiting");
}

async fn run_command(ctx: DispatchContext, request: Request, permit: OwnedSemaphorePermit) {
    let Request { command, reply } = request;
    tracing::debug!("Dispatching engine command: {:?}", command.text);

    let result = execute(&ctx, command).await;

    ctx.state.send_if_modified(|state| {
        if *state == SessionState::AwaitingResponse {
            *state = SessionState::Idle;
            true
        } else {
            false
        }
    });
    drop(permit);
    let _ = reply.send(result);
}

async fn execute(ctx: &DispatchContext, command: EngineCommand) -> Result<String, EngineError> {
    let sync_only = command.is_sync_only();
    let prefix = if sync_only {
        ctx.tokens.ready_ok.clone()
    } else {
        command.expected_prefix.clone()
    };
    let text = command.text.clone();

    let (tx, rx) = oneshot::channel();
    ctx.router
        .send(RouterMsg::Expect(Expectation {
            command,
            prefix,
            reply: tx,
        }))
        .map_err(|_| EngineError::ChannelClosed)?;

    ctx.state.send_if_modified(|state| {
        if *state == SessionState::Idle {
            *state = SessionState::AwaitingResponse;
            true
        } else {
            false
        }
    });

    {
        let mut process = ctx.process.lock().await;
        send_line(ctx, &mut process, &text).await?;
        if sync_only {
            send_line(ctx, &mut process, &ctx.tokens.ready_probe).await?;
        }
    }

    rx.await.map_err(|_| EngineError::ChannelClosed)?
}

async fn send_line(
    ctx: &DispatchContext,
    process: &mut EngineProcess,
    text: &str,
) -> Result<(), EngineError> {
    // announced first so it always precedes the reply's events
    let _ = ctx.events.send(EngineEvent::CommandSent(text.to_string()));
    process.write_line(text).await
}
