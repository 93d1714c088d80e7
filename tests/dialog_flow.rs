//! End-to-end tests for the bot: orchestrator, lanes and channel replies.
//!
//! The LLM and trend page are replaced with stubs, and messages flow through
//! an in-memory channel, so no network access is needed.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio::time::timeout;

use marketing_assist::bot::{
    Bot, Command, CommandParser, ConversationKey, Orchestrator, SessionRegistry,
};
use marketing_assist::channels::{
    Channel, ChannelManager, IncomingMessage, MessageStream, OutgoingResponse,
};
use marketing_assist::config::BotConfig;
use marketing_assist::dialog::DialogStep;
use marketing_assist::dialog::prompts::{
    AUDIENCE_PROMPT, GOODBYE, INDUSTRY_PROMPT, LOCATION_PROMPT, OBJECTIVE_PROMPT,
    PPC_PLATFORM_PROMPT,
};
use marketing_assist::error::{ChannelError, LlmError, TrendsError};
use marketing_assist::faq::MarketingAdvisor;
use marketing_assist::llm::{CompletionRequest, CompletionResponse, LlmProvider};
use marketing_assist::trends::TrendSource;

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Stub LLM provider (no real API calls). Optionally waits on a gate.
struct StubLlm {
    gate: Option<Arc<Notify>>,
}

#[async_trait]
impl LlmProvider for StubLlm {
    fn model_name(&self) -> &str {
        "stub"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let system = request.system_prompt().unwrap_or_default();
        let question = request
            .messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        Ok(CompletionResponse {
            content: format!("[{system}] {question}"),
        })
    }
}

struct StubTrends;

#[async_trait]
impl TrendSource for StubTrends {
    async fn fetch_trends(&self) -> Result<String, TrendsError> {
        Ok("CPC is up\nCTR is flat".to_string())
    }
}

fn orchestrator(llm: StubLlm) -> Orchestrator {
    Orchestrator::new(
        Arc::new(SessionRegistry::new()),
        Arc::new(StubTrends),
        MarketingAdvisor::new(Arc::new(llm)),
    )
}

async fn send(orch: &Orchestrator, key: &ConversationKey, text: &str) -> Option<String> {
    orch.handle(key, CommandParser::parse(text)).await.unwrap()
}

async fn run_dialog(answers: [&str; 7]) -> (Vec<Option<String>>, Orchestrator, ConversationKey) {
    let orch = orchestrator(StubLlm { gate: None });
    let key = ConversationKey::new("test", None, "owner");
    assert_eq!(send(&orch, &key, "/start").await.as_deref(), Some(INDUSTRY_PROMPT));
    let mut replies = Vec::new();
    for answer in answers {
        replies.push(send(&orch, &key, answer).await);
    }
    (replies, orch, key)
}

// ── Dialog scenarios ────────────────────────────────────────────────

#[tokio::test]
async fn ppc_user_with_no_links() {
    let (replies, orch, key) = run_dialog([
        "marketing",
        "lead generation",
        "",
        "no",
        "yes",
        "young adults",
        "usa",
    ])
    .await;

    assert_eq!(replies[4].as_deref(), Some(PPC_PLATFORM_PROMPT));
    assert_eq!(replies[5].as_deref(), Some(LOCATION_PROMPT));
    assert_eq!(
        replies[6].as_deref(),
        Some(
            "Here are some suggested keywords for your business:\n\
             - Marketing strategies for lead generation\n\
             - How to target Young adults in Usa\n\
             - Best PPC campaigns for marketing\n\
             - Improving website traffic for marketing"
        )
    );
    assert_eq!(orch.sessions().current_step(&key).await, None);
}

#[tokio::test]
async fn non_ppc_user_skips_ppc_line() {
    let (replies, _, _) = run_dialog([
        "bakery",
        "Sales",
        "no",
        "",
        "No",
        "families",
        "india",
    ])
    .await;

    assert_eq!(replies[4].as_deref(), Some(AUDIENCE_PROMPT));
    let summary = replies[6].as_deref().unwrap();
    assert!(!summary.contains("Best PPC campaigns"));
    assert!(summary.contains("- Bakery strategies for sales"));
    assert!(summary.contains("- How to target Families in India"));
    assert!(summary.ends_with("- Improving website traffic for bakery"));
}

#[tokio::test]
async fn links_appear_in_keywords() {
    let (replies, _, _) = run_dialog([
        "fitness",
        "brand awareness",
        "https://example.com",
        "https://instagram.com/x",
        "no",
        "professionals",
        "uk",
    ])
    .await;

    let summary = replies[6].as_deref().unwrap();
    assert!(summary.contains("- Improving website traffic for fitness: https://example.com"));
    assert!(summary.contains("- Social media tips for Professionals: https://instagram.com/x"));
}

#[tokio::test]
async fn blank_industry_and_audience_stay_blank() {
    let (replies, _, _) = run_dialog([
        "   ",
        "sales",
        "https://x.io",
        "https://ig.com/x",
        "no",
        "   ",
        "usa",
    ])
    .await;

    assert_eq!(
        replies[6].as_deref(),
        Some(
            "Here are some suggested keywords for your business:\n\
             - Improving website traffic for : https://x.io\n\
             - Social media tips for : https://ig.com/x"
        )
    );
}

#[tokio::test]
async fn start_mid_dialog_keeps_answers() {
    let orch = orchestrator(StubLlm { gate: None });
    let key = ConversationKey::new("test", None, "owner");
    send(&orch, &key, "/start").await;
    send(&orch, &key, "retail").await;
    send(&orch, &key, "sales").await;

    assert_eq!(send(&orch, &key, "/start").await, None);
    assert_eq!(send(&orch, &key, "/help").await, None);
    assert_eq!(
        orch.sessions().current_step(&key).await,
        Some(DialogStep::Website)
    );
}

#[tokio::test]
async fn platform_answer_is_taken_as_audience() {
    let (replies, _, _) = run_dialog([
        "travel",
        "bookings",
        "",
        "",
        "yes",
        "google ads",
        "spain",
    ])
    .await;

    assert!(
        replies[6]
            .as_deref()
            .unwrap()
            .contains("- How to target Google ads in Spain")
    );
}

#[tokio::test]
async fn cancel_from_each_step() {
    for (index, step) in DialogStep::ACTIVE.into_iter().enumerate() {
        let orch = orchestrator(StubLlm { gate: None });
        let key = ConversationKey::new("test", None, "owner");
        send(&orch, &key, "/start").await;
        for _ in 0..index {
            send(&orch, &key, "x").await;
        }
        assert_eq!(orch.sessions().current_step(&key).await, Some(step));

        let reply = send(&orch, &key, "/cancel").await;
        assert_eq!(reply.as_deref(), Some(GOODBYE), "cancel at {step}");
        assert_eq!(orch.sessions().current_step(&key).await, None);
        assert_eq!(send(&orch, &key, "late answer").await, None);
    }
}

#[tokio::test]
async fn commands_mid_dialog_leave_state_alone() {
    let orch = orchestrator(StubLlm { gate: None });
    let key = ConversationKey::new("test", None, "owner");
    send(&orch, &key, "/start").await;
    send(&orch, &key, "retail").await;

    let trends = send(&orch, &key, "/trends").await.unwrap();
    assert_eq!(trends, "Here are the latest industry trends:\nCPC is up\nCTR is flat");

    let faq = send(&orch, &key, "/faq what is ROAS?").await.unwrap();
    assert_eq!(faq, "[You are an expert in digital marketing.] what is ROAS?");

    assert_eq!(
        orch.sessions().current_step(&key).await,
        Some(DialogStep::Objective)
    );
}

#[test]
fn answers_keep_leading_whitespace() {
    assert_eq!(
        CommandParser::parse(" grow sales "),
        Command::Answer(" grow sales ".into())
    );
}

// ── Full bot loop over an in-memory channel ─────────────────────────

struct MemoryChannel {
    inbox: Mutex<Option<Vec<IncomingMessage>>>,
    sent: Arc<Mutex<Vec<(String, String)>>>,
}

#[async_trait]
impl Channel for MemoryChannel {
    fn name(&self) -> &str {
        "memory"
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        let msgs = self.inbox.lock().unwrap().take().unwrap_or_default();
        Ok(Box::pin(futures::stream::iter(msgs)))
    }

    async fn respond(
        &self,
        msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError> {
        self.sent
            .lock()
            .unwrap()
            .push((msg.user_id.clone(), response.content));
        Ok(())
    }
}

fn message(user: &str, text: &str) -> IncomingMessage {
    IncomingMessage::new("memory", user, text)
        .with_metadata(serde_json::json!({"chat_id": format!("chat-{user}")}))
}

async fn wait_for<F>(sent: &Arc<Mutex<Vec<(String, String)>>>, done: F)
where
    F: Fn(&[(String, String)]) -> bool,
{
    timeout(TEST_TIMEOUT, async {
        loop {
            if done(&sent.lock().unwrap()) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("timed out waiting for replies");
}

fn test_config() -> BotConfig {
    BotConfig::from_lookup(
        |key| (key == "OPENAI_API_KEY").then(|| "sk-test".to_string()),
        false,
    )
    .unwrap()
}

fn memory_bot(inbox: Vec<IncomingMessage>, llm: StubLlm) -> (Bot, Arc<Mutex<Vec<(String, String)>>>) {
    let sent = Arc::new(Mutex::new(Vec::new()));
    let mut channels = ChannelManager::new();
    channels.add(Box::new(MemoryChannel {
        inbox: Mutex::new(Some(inbox)),
        sent: sent.clone(),
    }));
    (Bot::new(test_config(), orchestrator(llm), channels), sent)
}

fn replies_for<'a>(sent: &'a [(String, String)], user: &str) -> Vec<&'a str> {
    sent.iter()
        .filter(|(u, _)| u == user)
        .map(|(_, r)| r.as_str())
        .collect()
}

#[tokio::test]
async fn run_returns_after_every_reply_is_sent() {
    let (bot, sent) = memory_bot(
        vec![
            message("alice", "/start"),
            message("alice", "marketing"),
            message("alice", "/trends"),
        ],
        StubLlm { gate: None },
    );

    timeout(TEST_TIMEOUT, bot.run())
        .await
        .expect("bot loop hung")
        .unwrap();

    // No waiting: the replies must already be out
    let sent = sent.lock().unwrap();
    assert_eq!(
        replies_for(&sent, "alice"),
        vec![
            INDUSTRY_PROMPT,
            OBJECTIVE_PROMPT,
            "Here are the latest industry trends:\nCPC is up\nCTR is flat",
        ]
    );
}

#[tokio::test]
async fn slow_faq_does_not_block_other_users() {
    let gate = Arc::new(Notify::new());
    let (bot, sent) = memory_bot(
        vec![
            message("alice", "/faq best bidding strategy?"),
            message("alice", "/start"),
            message("bob", "/start"),
            message("bob", "plumbing"),
        ],
        StubLlm {
            gate: Some(gate.clone()),
        },
    );
    let running = tokio::spawn(bot.run());

    // Bob's dialog proceeds while Alice waits on the model
    wait_for(&sent, |s| s.iter().filter(|(u, _)| u == "bob").count() == 2).await;
    assert!(sent.lock().unwrap().iter().all(|(u, _)| u == "bob"));
    assert!(!running.is_finished());

    gate.notify_one();
    timeout(TEST_TIMEOUT, running)
        .await
        .expect("bot loop hung")
        .unwrap()
        .unwrap();

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 4);
    // Alice's replies stay in her own order
    assert_eq!(
        replies_for(&sent, "alice"),
        vec![
            "[You are an expert in digital marketing.] best bidding strategy?",
            INDUSTRY_PROMPT,
        ]
    );
    assert_eq!(replies_for(&sent, "bob"), vec![INDUSTRY_PROMPT, OBJECTIVE_PROMPT]);
}
