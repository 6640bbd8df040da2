//! Per-session conversation state.
//!
//! Message history and accumulated topics live here, owned by whoever holds
//! the session handle and passed into the orchestration that needs them.
//! Nothing is process-global and nothing outlives the session.

use uuid::Uuid;

use crate::schemas::{KeigoAnalysis, Message, Topic};

#[derive(Debug, Default)]
pub struct SessionState {
    messages: Vec<Message>,
    topics: Vec<Topic>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user message; returns its id.
    pub fn record_user(&mut self, content: impl Into<String>) -> Uuid {
        let message = Message::user(content);
        let id = message.id;
        self.messages.push(message);
        id
    }

    /// Append an assistant message carrying an analysis result.
    pub fn record_analysis(&mut self, content: impl Into<String>, analysis: KeigoAnalysis) -> Uuid {
        let message = Message::assistant(content).with_analysis(analysis);
        let id = message.id;
        self.messages.push(message);
        id
    }

    /// Append an assistant message carrying a generated topic, and remember
    /// the topic for duplicate avoidance in later generations.
    pub fn record_topic(&mut self, topic: Topic) -> Uuid {
        let message = Message::assistant(topic.question.clone()).with_topic(topic.clone());
        let id = message.id;
        self.messages.push(message);
        self.topics.push(topic);
        id
    }

    /// Names of every topic seen this session, oldest first.
    pub fn topic_names(&self) -> Vec<String> {
        self.topics.iter().map(|t| t.topic.clone()).collect()
    }

    pub fn last_topic(&self) -> Option<&Topic> {
        self.topics.last()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}
