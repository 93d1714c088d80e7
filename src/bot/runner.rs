//! Main bot loop — reads every channel and serializes work per conversation.
//!
//! Each conversation gets its own lane: a spawned task that handles that
//! conversation's messages one at a time, in arrival order. Lanes run
//! concurrently, so a slow `/faq` call for one user never holds up another
//! user's dialog.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::bot::command::CommandParser;
use crate::bot::orchestrator::Orchestrator;
use crate::bot::sessions::ConversationKey;
use crate::channels::{ChannelManager, IncomingMessage, OutgoingResponse, StatusUpdate};
use crate::config::BotConfig;
use crate::error::Error;

/// A conversation's queue and the task draining it.
struct Lane {
    tx: mpsc::UnboundedSender<IncomingMessage>,
    task: JoinHandle<()>,
}

/// Open lanes by conversation, plus closed lanes still finishing their queue.
#[derive(Default)]
struct Lanes {
    open: HashMap<ConversationKey, Lane>,
    closing: Vec<JoinHandle<()>>,
}

impl Lanes {
    /// Move idle-closed lanes out of `open` so their keys can be reopened.
    fn reap_closed(&mut self) {
        let closed: Vec<ConversationKey> = self
            .open
            .iter()
            .filter(|(_, lane)| lane.tx.is_closed())
            .map(|(key, _)| key.clone())
            .collect();
        for key in closed {
            if let Some(lane) = self.open.remove(&key) {
                self.closing.push(lane.task);
            }
        }
        self.closing.retain(|task| !task.is_finished());
    }

    /// Close every lane and wait until each has handled its queued messages.
    async fn drain(self) {
        let mut tasks: Vec<JoinHandle<()>> =
            self.open.into_values().map(|lane| lane.task).collect();
        tasks.extend(self.closing);
        tracing::debug!(lanes = tasks.len(), "Waiting for lanes to finish");

        for result in futures::future::join_all(tasks).await {
            if let Err(e) = result {
                tracing::warn!("Lane task failed: {}", e);
            }
        }
    }
}

/// The running bot: channels in, orchestrated replies out.
pub struct Bot {
    config: BotConfig,
    orchestrator: Arc<Orchestrator>,
    channels: Arc<ChannelManager>,
}

impl Bot {
    pub fn new(config: BotConfig, orchestrator: Orchestrator, channels: ChannelManager) -> Self {
        Self {
            config,
            orchestrator: Arc::new(orchestrator),
            channels: Arc::new(channels),
        }
    }

    /// Run until Ctrl+C or until every channel stream ends.
    ///
    /// When the streams end, replies to every message already received are
    /// sent before this returns. Ctrl+C stops without waiting.
    pub async fn run(self) -> Result<(), Error> {
        let mut message_stream = self.channels.start_all().await?;

        // Spawn idle-dialog pruning task
        let sessions = self.orchestrator.sessions().clone();
        let idle_timeout = self.config.session_idle_timeout;
        let prune_every = self.config.prune_interval;
        let pruning_handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(prune_every);
            interval.tick().await; // Skip immediate first tick
            loop {
                interval.tick().await;
                let pruned = sessions.prune_idle(idle_timeout).await;
                if pruned > 0 {
                    tracing::info!(pruned, "Pruned idle dialogs");
                }
            }
        });

        tracing::info!("Bot {} ready and listening", self.config.name);

        let mut lanes = Lanes::default();

        let interrupted = loop {
            let message = tokio::select! {
                biased;
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received, shutting down...");
                    break true;
                }
                msg = message_stream.next() => {
                    match msg {
                        Some(m) => m,
                        None => {
                            tracing::info!("All channel streams ended, shutting down...");
                            break false;
                        }
                    }
                }
            };

            self.dispatch(&mut lanes, message);
        };

        // Cleanup
        tracing::info!("Bot shutting down...");
        pruning_handle.abort();
        if !interrupted {
            // Finish every message already queued
            lanes.drain().await;
        }
        self.channels.shutdown_all().await?;

        Ok(())
    }

    /// Queue `message` on its conversation's lane, opening one if needed.
    fn dispatch(&self, lanes: &mut Lanes, message: IncomingMessage) {
        let key = ConversationKey::from_message(&message);

        let message = match lanes.open.get(&key) {
            Some(lane) => match lane.tx.send(message) {
                Ok(()) => return,
                // Lane closed after going idle; reopen below
                Err(mpsc::error::SendError(message)) => message,
            },
            None => message,
        };

        lanes.reap_closed();
        let lane = spawn_lane(
            key.clone(),
            Arc::clone(&self.orchestrator),
            Arc::clone(&self.channels),
            self.config.session_idle_timeout,
        );
        // The receiver was just created, so this cannot fail
        let _ = lane.tx.send(message);
        lanes.open.insert(key, lane);
    }
}

/// Spawn a lane task for `key`. The lane exits after `idle` without messages.
fn spawn_lane(
    key: ConversationKey,
    orchestrator: Arc<Orchestrator>,
    channels: Arc<ChannelManager>,
    idle: Duration,
) -> Lane {
    let (tx, mut rx) = mpsc::unbounded_channel::<IncomingMessage>();

    let task = tokio::spawn(async move {
        tracing::debug!(conversation = %key, "Lane opened");
        loop {
            match tokio::time::timeout(idle, rx.recv()).await {
                Ok(Some(message)) => process_message(&orchestrator, &channels, &key, message).await,
                Ok(None) => break,
                Err(_) => {
                    // Stop accepting, then finish anything that raced in
                    rx.close();
                    while let Ok(message) = rx.try_recv() {
                        process_message(&orchestrator, &channels, &key, message).await;
                    }
                    break;
                }
            }
        }
        tracing::debug!(conversation = %key, "Lane closed");
    });

    Lane { tx, task }
}

/// Handle one message to completion and send its reply.
pub async fn process_message(
    orchestrator: &Orchestrator,
    channels: &ChannelManager,
    key: &ConversationKey,
    message: IncomingMessage,
) {
    let command = CommandParser::parse(&message.content);

    tracing::debug!(
        conversation = %key,
        user = message.user_name.as_deref().unwrap_or("-"),
        queued_ms = (Utc::now() - message.received_at).num_milliseconds(),
        chars = message.content.len(),
        ?command,
        "Received message"
    );

    if command.calls_collaborator() {
        let _ = channels
            .send_status(
                &message.channel,
                StatusUpdate::Thinking("Working on it...".into()),
                &message.metadata,
            )
            .await;
    }

    let reply = match orchestrator.handle(key, command).await {
        Ok(Some(reply)) if !reply.is_empty() => reply,
        Ok(_) => return,
        Err(e) => {
            tracing::error!(conversation = %key, "Error handling message: {}", e);
            format!("Error: {}", e)
        }
    };

    if let Err(e) = channels.respond(&message, OutgoingResponse::text(reply)).await {
        tracing::warn!(conversation = %key, "Failed to send reply: {}", e);
    }
}
