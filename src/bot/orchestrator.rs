//! Orchestrator — maps commands onto the dialog and the two collaborators.

use std::sync::Arc;

use crate::bot::command::Command;
use crate::bot::sessions::{ConversationKey, SessionRegistry};
use crate::error::Error;
use crate::faq::MarketingAdvisor;
use crate::trends::{TrendSource, format_trends};

/// Reply to a bare `/faq` with no question.
pub const FAQ_USAGE: &str = "Please add your question after the command, e.g. /faq How can I lower my CPC?";

/// Handles one command for one conversation at a time.
pub struct Orchestrator {
    sessions: Arc<SessionRegistry>,
    trends: Arc<dyn TrendSource>,
    advisor: MarketingAdvisor,
}

impl Orchestrator {
    pub fn new(
        sessions: Arc<SessionRegistry>,
        trends: Arc<dyn TrendSource>,
        advisor: MarketingAdvisor,
    ) -> Self {
        Self {
            sessions,
            trends,
            advisor,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    /// Handle `command` for `key`, returning the reply text.
    ///
    /// `Ok(None)` means the event has no handler (no active dialog) and
    /// nothing should be sent. Collaborator failures come back as `Err`.
    pub async fn handle(
        &self,
        key: &ConversationKey,
        command: Command,
    ) -> Result<Option<String>, Error> {
        match command {
            Command::Start => Ok(self.sessions.start(key).await.map(String::from)),
            Command::Cancel => {
                let goodbye = self.sessions.cancel(key).await;
                if goodbye.is_none() {
                    tracing::debug!(conversation = %key, "Cancel without an active dialog");
                }
                Ok(goodbye.map(String::from))
            }
            Command::Answer(text) => match self.sessions.answer(key, &text).await {
                Some(transition) => Ok(Some(transition.reply().to_string())),
                None => {
                    tracing::debug!(conversation = %key, "Message outside a dialog ignored");
                    Ok(None)
                }
            },
            Command::Unknown(word) => {
                tracing::debug!(conversation = %key, command = %word, "Unknown command ignored");
                Ok(None)
            }
            Command::Trends => {
                let text = self.trends.fetch_trends().await?;
                Ok(Some(format_trends(&text)))
            }
            Command::Faq { question } if question.is_empty() => Ok(Some(FAQ_USAGE.to_string())),
            Command::Faq { question } => {
                let answer = self.advisor.ask(&question).await?;
                Ok(Some(answer))
            }
        }
    }
}
