//! Chat session adapter — the boundary to the generative chat backend.
//!
//! `initialize` is called once, at hand-off, and frames the session with the
//! selections the intake collected. The provider API is stateless, so the
//! session keeps the framing and the turn history and replays them on every
//! request.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::info;
use uuid::Uuid;

use crate::error::LlmError;
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};

use super::model::Selections;
use super::prompts::{Persona, system_instruction};

/// Conversation context for one visitor.
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub id: Uuid,
    pub system_instruction: String,
    history: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
}

impl ChatSession {
    fn new(system_instruction: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            system_instruction,
            history: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Full message list for a new `utterance`.
    pub fn messages_for(&self, utterance: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(ChatMessage::system(&self.system_instruction));
        messages.extend(self.history.iter().cloned());
        messages.push(ChatMessage::user(utterance));
        messages
    }

    /// Remember a completed exchange. Failed turns are never recorded.
    pub fn record_turn(&mut self, utterance: &str, reply: &str) {
        self.history.push(ChatMessage::user(utterance));
        self.history.push(ChatMessage::assistant(reply));
    }

    pub fn turn_count(&self) -> usize {
        self.history.len() / 2
    }
}

pub struct ChatSessionAdapter {
    llm: Arc<dyn LlmProvider>,
    persona: Persona,
    max_tokens: Option<u64>,
}

impl ChatSessionAdapter {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self {
            llm,
            persona: Persona::default(),
            max_tokens: None,
        }
    }

    pub fn with_persona(mut self, persona: Persona) -> Self {
        self.persona = persona;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u64>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    /// Open a session framed by the collected selections.
    pub fn initialize(&self, selections: &Selections) -> ChatSession {
        let session = ChatSession::new(system_instruction(&self.persona, selections));
        info!(
            session_id = %session.id,
            model = %self.llm.model_name(),
            party = %selections.party_label(),
            complete = selections.is_complete(),
            "Chat session initialized"
        );
        session
    }

    /// Start a turn without borrowing the session.
    ///
    /// The returned future owns everything it needs, so the caller can keep
    /// handling events while the reply is outstanding. An empty reply is
    /// reported as [`LlmError::EmptyReply`].
    pub fn dispatch(
        &self,
        session: &ChatSession,
        utterance: &str,
    ) -> BoxFuture<'static, Result<String, LlmError>> {
        let llm = Arc::clone(&self.llm);
        let mut request = CompletionRequest::new(session.messages_for(utterance));
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        async move {
            let response = llm.complete(request).await?;
            let text = response.content.trim();
            if text.is_empty() {
                return Err(LlmError::EmptyReply {
                    provider: llm.model_name().to_string(),
                });
            }
            Ok(text.to_string())
        }
        .boxed()
    }

    /// Send one utterance and record the exchange on success.
    pub async fn send(&self, session: &mut ChatSession, utterance: &str) -> Result<String, LlmError> {
        let reply = self.dispatch(session, utterance).await?;
        session.record_turn(utterance, &reply);
        Ok(reply)
    }
}
