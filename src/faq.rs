//! `/faq` answers — forwards a question to the completion service.

use std::sync::Arc;

use crate::error::LlmError;
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};

/// Fixed instruction framing every `/faq` question.
pub const ADVISOR_SYSTEM_PROMPT: &str = "You are an expert in digital marketing.";

/// Answers free-text marketing questions through an `LlmProvider`.
#[derive(Clone)]
pub struct MarketingAdvisor {
    llm: Arc<dyn LlmProvider>,
}

impl MarketingAdvisor {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Ask one question; the answer is returned verbatim.
    pub async fn ask(&self, question: &str) -> Result<String, LlmError> {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(ADVISOR_SYSTEM_PROMPT),
            ChatMessage::user(question),
        ]);

        tracing::info!(model = self.llm.model_name(), "Forwarding FAQ question");
        let response = self.llm.complete(request).await?;
        Ok(response.content)
    }
}
