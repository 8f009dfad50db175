use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Shared models for the agenthub server and its API consumers

/// Minimum length (in characters) for an agent's instructions and seed
/// conversation, enforced at the API boundary before persistence.
pub const MIN_PROMPT_LEN: usize = 200;

/// Reference data describing an agent category. Seeded at deployment time
/// and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentCategory {
    pub id: String,
    pub name: String,
}

impl AgentCategory {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
        }
    }
}

/// A user-authored agent persona that can be conversed with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    /// Identity that created the agent; immutable once set.
    pub owner_id: String,
    /// Display name of the owner, captured at creation time.
    pub owner_name: String,
    pub name: String,
    pub description: String,
    /// System prompt steering the agent's behavior.
    pub instructions: String,
    /// Example transcript bundled with the definition; not itself a message.
    pub seed: String,
    /// Opaque reference into the asset store for the avatar image.
    pub avatar_ref: String,
    pub category_id: String,
    pub created_at: i64,
}

impl Agent {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        owner_id: String,
        owner_name: String,
        name: String,
        description: String,
        instructions: String,
        seed: String,
        avatar_ref: String,
        category_id: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id,
            owner_name,
            name,
            description,
            instructions,
            seed,
            avatar_ref,
            category_id,
            created_at: Utc::now().timestamp(),
        }
    }

    /// Synthesized introductory line shown first in every session. Never
    /// written to the message store.
    pub fn greeting(&self) -> String {
        format!("Hello, I am {}, {}", self.name, self.description)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    System,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::System => "system",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(MessageRole::User),
            "system" => Some(MessageRole::System),
            _ => None,
        }
    }
}

/// A single stored chat turn. Append-only; retrieval is always partitioned
/// by `(agent_id, author_id)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentMessage {
    pub id: i64,
    pub agent_id: String,
    pub author_id: String,
    pub role: MessageRole,
    pub content: String,
    pub avatar_ref: Option<String>,
    /// Assigned by the store, monotonically increasing per conversation.
    pub created_at: i64,
}

/// Directory listing entry with its total message count across all authors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSummary {
    pub id: String,
    pub owner_name: String,
    pub name: String,
    pub description: String,
    pub avatar_ref: String,
    pub category_id: String,
    pub created_at: i64,
    pub message_count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateAgentRequest {
    pub name: String,
    pub description: String,
    pub instructions: String,
    pub seed: String,
    pub avatar_ref: String,
    pub category_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateAgentRequest {
    pub name: String,
    pub description: String,
    pub instructions: String,
    pub seed: String,
    pub avatar_ref: String,
    pub category_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AgentResponse {
    pub agent: Agent,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AgentListResponse {
    pub agents: Vec<AgentSummary>,
}

#[derive(Debug, Deserialize)]
pub struct AgentListQuery {
    pub category_id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryListResponse {
    pub categories: Vec<AgentCategory>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AppendMessageRequest {
    pub content: String,
    /// Defaults to `user`; the responding pipeline writes `system` turns
    /// through the same operation.
    pub role: Option<MessageRole>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: AgentMessage,
}

/// Agent metadata plus the caller's own transcript, oldest first. The
/// greeting is reconstructed on every fetch.
#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationResponse {
    pub agent: Agent,
    pub greeting: String,
    pub messages: Vec<AgentMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServerStatus {
    pub status: String,
    pub version: String,
    pub uptime: u64,
}
