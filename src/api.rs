use serde::{Deserialize, Serialize};

use crate::types::TestQuery;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: text.into(),
        }
    }
}

/// Conversation handed to the generator. The harness only ever simulates one user turn.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GenerationContext {
    pub messages: Vec<Message>,
}

impl GenerationContext {
    pub fn single_turn(query: &TestQuery) -> Self {
        Self {
            messages: vec![Message::user(query.as_str())],
        }
    }

    /// Concatenated user turns, the topic the generator should research.
    pub fn research_topic(&self) -> String {
        self.messages
            .iter()
            .filter(|m| m.role == "user")
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub query: TestQuery,
    pub count: u32,
    pub context: GenerationContext,
}

impl GenerationRequest {
    pub fn new(query: TestQuery, count: u32) -> Self {
        let context = GenerationContext::single_turn(&query);
        Self {
            query,
            count,
            context,
        }
    }
}
