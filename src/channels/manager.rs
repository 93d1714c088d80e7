//! ChannelManager — owns the active channels and routes replies.

use futures::stream;

use crate::channels::{Channel, IncomingMessage, MessageStream, OutgoingResponse, StatusUpdate};
use crate::error::ChannelError;

/// Holds every registered channel and merges their message streams.
#[derive(Default)]
pub struct ChannelManager {
    channels: Vec<Box<dyn Channel>>,
}

impl ChannelManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, channel: Box<dyn Channel>) {
        tracing::debug!(channel = channel.name(), "Registered channel");
        self.channels.push(channel);
    }

    pub fn names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    fn get(&self, name: &str) -> Result<&dyn Channel, ChannelError> {
        self.channels
            .iter()
            .find(|c| c.name() == name)
            .map(|c| &**c)
            .ok_or_else(|| ChannelError::NotFound {
                name: name.to_string(),
            })
    }

    /// Health-check and start every channel, merging their streams.
    pub async fn start_all(&self) -> Result<MessageStream, ChannelError> {
        if self.channels.is_empty() {
            return Err(ChannelError::StartupFailed {
                name: "manager".into(),
                reason: "no channels registered".into(),
            });
        }

        let mut streams = Vec::with_capacity(self.channels.len());
        for channel in &self.channels {
            channel.health_check().await?;
            streams.push(channel.start().await?);
            tracing::info!(channel = channel.name(), "Channel started");
        }

        Ok(Box::pin(stream::select_all(streams)))
    }

    /// Send a reply on the channel the message arrived on.
    pub async fn respond(
        &self,
        msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError> {
        self.get(&msg.channel)?.respond(msg, response).await
    }

    pub async fn send_status(
        &self,
        channel: &str,
        status: StatusUpdate,
        metadata: &serde_json::Value,
    ) -> Result<(), ChannelError> {
        self.get(channel)?.send_status(status, metadata).await
    }

    pub async fn shutdown_all(&self) -> Result<(), ChannelError> {
        for channel in &self.channels {
            if let Err(e) = channel.shutdown().await {
                tracing::warn!(channel = channel.name(), "Channel shutdown failed: {}", e);
            }
        }
        Ok(())
    }
}
