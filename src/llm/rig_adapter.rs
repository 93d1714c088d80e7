//! Bridges a rig-core OpenAI client to our `LlmProvider` trait.

use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::openai;

use crate::error::LlmError;
use crate::llm::provider::{CompletionRequest, CompletionResponse, LlmProvider, Role};

const PROVIDER: &str = "openai";

/// `LlmProvider` backed by a rig-core agent built per request.
///
/// The request's system messages become the agent preamble and its single
/// user message the prompt.
pub struct RigAdapter {
    client: rig::client::Client<openai::client::OpenAIResponsesExt>,
    model: String,
}

impl RigAdapter {
    pub(crate) fn new(
        client: rig::client::Client<openai::client::OpenAIResponsesExt>,
        model: &str,
    ) -> Self {
        Self {
            client,
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl LlmProvider for RigAdapter {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let prompt = single_user_prompt(&request).map_err(|reason| LlmError::RequestFailed {
            provider: PROVIDER.to_string(),
            reason,
        })?;
        let preamble = request.system_prompt().unwrap_or_default();

        tracing::debug!(model = %self.model, chars = prompt.len(), "Sending completion");

        let content = self
            .client
            .agent(&self.model)
            .preamble(&preamble)
            .build()
            .prompt(prompt)
            .await
            .map_err(|e| LlmError::RequestFailed {
                provider: PROVIDER.to_string(),
                reason: e.to_string(),
            })?;

        if content.trim().is_empty() {
            return Err(LlmError::InvalidResponse {
                provider: PROVIDER.to_string(),
                reason: "empty completion".to_string(),
            });
        }

        Ok(CompletionResponse { content })
    }
}

/// The request must carry exactly one user message besides the system ones.
fn single_user_prompt(request: &CompletionRequest) -> Result<String, String> {
    let mut turns = request.messages.iter().filter(|m| m.role == Role::User);
    match (turns.next(), turns.next()) {
        (Some(m), None) => Ok(m.content.clone()),
        (None, _) => Err("request has no user message".to_string()),
        (Some(_), Some(_)) => Err("multi-turn history is not supported".to_string()),
    }
}
