//! services/api/src/adapters/chat_llm.rs
//!
//! This module contains the adapter for the AI tutor chatbot.
//! It implements the `ChatService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use learnhub_core::ports::{ChatService, PortError, PortResult};

const SYSTEM_INSTRUCTIONS: &str = "You are the LearnHub tutor, a friendly assistant embedded in \
an e-learning platform. Help learners with questions about programming, the platform's courses, \
recorded classes, and live sessions. Keep answers conversational and concise; prefer a short \
worked example over a long explanation. If a question is entirely unrelated to learning or \
technology, gently steer the conversation back to the platform.";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ChatService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiChatAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiChatAdapter {
    /// Creates a new `OpenAiChatAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `ChatService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ChatService for OpenAiChatAdapter {
    /// Forwards the learner's message (plus their display name, so replies can
    /// address them) and relays the completion text back verbatim.
    async fn tutor_reply(&self, display_name: Option<&str>, message: &str) -> PortResult<String> {
        let user_content = match display_name {
            Some(name) => format!("Learner name: {name}\n\n{message}"),
            None => message.to_string(),
        };

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(SYSTEM_INSTRUCTIONS)
                    .build()
                    .map_err(|e| PortError::Transient(e.to_string()))?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(user_content)
                    .build()
                    .map_err(|e| PortError::Transient(e.to_string()))?
                    .into(),
            ])
            .max_completion_tokens(800u32)
            .build()
            .map_err(|e| PortError::Transient(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Transient(e.to_string()))?;

        let reply = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();
        Ok(reply)
    }
}
