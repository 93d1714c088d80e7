//! Session registry — one owned dialog per conversation.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::channels::IncomingMessage;
use crate::dialog::{Dialog, DialogStep, Transition};

/// Identifies a conversation: the same user in two chats has two dialogs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversationKey {
    pub channel: String,
    pub chat_id: Option<String>,
    pub user_id: String,
}

impl ConversationKey {
    pub fn new(channel: impl Into<String>, chat_id: Option<String>, user_id: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            chat_id,
            user_id: user_id.into(),
        }
    }

    pub fn from_message(msg: &IncomingMessage) -> Self {
        Self::new(&msg.channel, msg.chat_id().map(String::from), &msg.user_id)
    }
}

impl std::fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.chat_id {
            Some(chat) => write!(f, "{}:{}:{}", self.channel, chat, self.user_id),
            None => write!(f, "{}:{}", self.channel, self.user_id),
        }
    }
}

struct Session {
    dialog: Dialog,
    started_at: DateTime<Utc>,
    last_active: DateTime<Utc>,
}

/// Active dialogs keyed by conversation.
///
/// A session exists only while its dialog is in a non-terminal step: it is
/// inserted on start and removed on completion or cancellation.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<ConversationKey, Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh dialog and return the opening prompt.
    ///
    /// Returns `None` and leaves the dialog untouched when one is already in
    /// progress for `key`.
    pub async fn start(&self, key: &ConversationKey) -> Option<&'static str> {
        let mut sessions = self.sessions.lock().await;
        if let Some(active) = sessions.get(key) {
            tracing::debug!(
                conversation = %key,
                step = %active.dialog.step(),
                "Start ignored, dialog in progress"
            );
            return None;
        }

        let (dialog, prompt) = Dialog::start();
        let now = Utc::now();
        sessions.insert(
            key.clone(),
            Session {
                dialog,
                started_at: now,
                last_active: now,
            },
        );
        tracing::info!(conversation = %key, "Dialog started");
        Some(prompt)
    }

    /// Feed an answer into the conversation's dialog.
    ///
    /// Returns `None` when no dialog is active. The session is dropped once
    /// the dialog completes.
    pub async fn answer(&self, key: &ConversationKey, text: &str) -> Option<Transition> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get_mut(key)?;
        let transition = session.dialog.answer(text)?;
        session.last_active = Utc::now();

        if session.dialog.is_finished() {
            if let Some(done) = sessions.remove(key) {
                let elapsed = Utc::now() - done.started_at;
                tracing::info!(
                    conversation = %key,
                    seconds = elapsed.num_seconds(),
                    "Dialog completed"
                );
            }
        }
        Some(transition)
    }

    /// Cancel the conversation's dialog. Returns the goodbye text, or `None`
    /// when no dialog is active.
    pub async fn cancel(&self, key: &ConversationKey) -> Option<&'static str> {
        let mut session = self.sessions.lock().await.remove(key)?;
        session.dialog.cancel()
    }

    /// Step the conversation is waiting on, if a dialog is active.
    pub async fn current_step(&self, key: &ConversationKey) -> Option<DialogStep> {
        self.sessions.lock().await.get(key).map(|s| s.dialog.step())
    }

    pub async fn active_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Drop dialogs with no activity for longer than `max_idle`.
    /// Returns how many were removed.
    pub async fn prune_idle(&self, max_idle: Duration) -> usize {
        let Some(cutoff) = chrono::Duration::from_std(max_idle)
            .ok()
            .and_then(|idle| Utc::now().checked_sub_signed(idle))
        else {
            return 0;
        };
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|key, session| {
            let keep = session.last_active > cutoff;
            if !keep {
                tracing::info!(conversation = %key, step = %session.dialog.step(), "Pruned idle dialog");
            }
            keep
        });
        before - sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::prompts::{GOODBYE, INDUSTRY_PROMPT};

    fn key(user: &str) -> ConversationKey {
        ConversationKey::new("test", Some("chat".into()), user)
    }

    #[test]
    fn key_from_message_uses_chat_id() {
        let msg = IncomingMessage::new("telegram", "42", "hi")
            .with_metadata(serde_json::json!({"chat_id": "-100"}));
        let key = ConversationKey::from_message(&msg);
        assert_eq!(key, ConversationKey::new("telegram", Some("-100".into()), "42"));
        assert_eq!(key.to_string(), "telegram:-100:42");

        let cli = ConversationKey::from_message(&IncomingMessage::new("cli", "me", "hi"));
        assert_eq!(cli.to_string(), "cli:me");
    }

    #[tokio::test]
    async fn answer_without_dialog_is_none() {
        let registry = SessionRegistry::new();
        assert!(registry.answer(&key("a"), "retail").await.is_none());
        assert!(registry.cancel(&key("a")).await.is_none());
    }

    #[tokio::test]
    async fn start_then_answer_advances() {
        let registry = SessionRegistry::new();
        assert_eq!(registry.start(&key("a")).await, Some(INDUSTRY_PROMPT));
        assert_eq!(registry.current_step(&key("a")).await, Some(DialogStep::Industry));

        let t = registry.answer(&key("a"), "retail").await.unwrap();
        assert_eq!(t.step(), DialogStep::Objective);
        assert_eq!(registry.current_step(&key("a")).await, Some(DialogStep::Objective));
    }

    #[tokio::test]
    async fn completion_removes_session() {
        let registry = SessionRegistry::new();
        registry.start(&key("a")).await;
        let mut last = None;
        for answer in ["a", "b", "", "", "no", "f", "g"] {
            last = registry.answer(&key("a"), answer).await;
        }
        assert!(matches!(last, Some(Transition::Completed { .. })));
        assert_eq!(registry.active_count().await, 0);
        assert!(registry.answer(&key("a"), "more").await.is_none());
    }

    #[tokio::test]
    async fn cancel_removes_session() {
        let registry = SessionRegistry::new();
        registry.start(&key("a")).await;
        registry.answer(&key("a"), "retail").await;
        assert_eq!(registry.cancel(&key("a")).await, Some(GOODBYE));
        assert_eq!(registry.active_count().await, 0);
        assert_eq!(registry.current_step(&key("a")).await, None);
    }

    #[tokio::test]
    async fn start_during_dialog_keeps_progress() {
        let registry = SessionRegistry::new();
        registry.start(&key("a")).await;
        registry.answer(&key("a"), "retail").await;
        registry.answer(&key("a"), "sales").await;

        assert_eq!(registry.start(&key("a")).await, None);
        assert_eq!(registry.current_step(&key("a")).await, Some(DialogStep::Website));
        assert_eq!(registry.active_count().await, 1);
    }

    #[tokio::test]
    async fn start_after_cancel_opens_new_dialog() {
        let registry = SessionRegistry::new();
        registry.start(&key("a")).await;
        registry.answer(&key("a"), "retail").await;
        registry.cancel(&key("a")).await;

        assert_eq!(registry.start(&key("a")).await, Some(INDUSTRY_PROMPT));
        assert_eq!(registry.current_step(&key("a")).await, Some(DialogStep::Industry));
    }

    #[tokio::test]
    async fn conversations_are_independent() {
        let registry = SessionRegistry::new();
        registry.start(&key("a")).await;
        registry.start(&key("b")).await;
        registry.answer(&key("a"), "retail").await;

        assert_eq!(registry.current_step(&key("a")).await, Some(DialogStep::Objective));
        assert_eq!(registry.current_step(&key("b")).await, Some(DialogStep::Industry));

        registry.cancel(&key("a")).await;
        assert_eq!(registry.current_step(&key("b")).await, Some(DialogStep::Industry));
    }

    #[tokio::test]
    async fn same_user_in_two_chats_has_two_dialogs() {
        let registry = SessionRegistry::new();
        let private = ConversationKey::new("telegram", Some("1".into()), "42");
        let group = ConversationKey::new("telegram", Some("2".into()), "42");
        registry.start(&private).await;
        assert!(registry.answer(&group, "retail").await.is_none());
    }

    #[tokio::test]
    async fn prune_idle_drops_only_stale_sessions() {
        let registry = SessionRegistry::new();
        registry.start(&key("a")).await;
        assert_eq!(registry.prune_idle(Duration::from_secs(3600)).await, 0);
        assert_eq!(registry.prune_idle(Duration::ZERO).await, 1);
        assert_eq!(registry.active_count().await, 0);
    }
}
