use crate::error::{AppError, AppResult};
use agenthub_models::{
    Agent, AgentCategory, AgentMessage, AgentSummary, MessageRole, UpdateAgentRequest,
};
use chrono::Utc;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

pub type DbConnection = Arc<Mutex<Connection>>;

/// Category names installed by the deployment seeding step.
pub const DEFAULT_CATEGORIES: &[&str] = &["Default", "Ai", "Custom"];

pub struct Database {
    connection: DbConnection,
}

impl Database {
    pub fn new(db_path: &PathBuf) -> AppResult<Self> {
        // Ensure the database directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;

        // Enable foreign key constraints (SQLite3 has them disabled by default)
        conn.execute("PRAGMA foreign_keys = ON", [])?;

        let database = Database {
            connection: Arc::new(Mutex::new(conn)),
        };

        database.run_migrations()?;

        Ok(database)
    }

    #[allow(dead_code)]
    pub fn connection(&self) -> DbConnection {
        Arc::clone(&self.connection)
    }

    fn run_migrations(&self) -> AppResult<()> {
        let conn = self
            .connection
            .lock()
            .map_err(|e| AppError::Internal(format!("Failed to acquire database lock: {e}")))?;

        // Immutable reference data, written only by the seeding step
        conn.execute(
            "CREATE TABLE IF NOT EXISTS agent_categories (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS agents (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                owner_name TEXT NOT NULL,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                instructions TEXT NOT NULL,
                seed TEXT NOT NULL,
                avatar_ref TEXT NOT NULL,
                category_id TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                FOREIGN KEY (category_id) REFERENCES agent_categories (id)
            )",
            [],
        )?;

        // Indexes for the directory's owner predicate and list filters
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_agents_owner_id ON agents(owner_id)",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_agents_category_id ON agents(category_id)",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_agents_created_at ON agents(created_at)",
            [],
        )?;

        // Append-only chat transcripts, partitioned by (agent_id, author_id)
        conn.execute(
            "CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                agent_id TEXT NOT NULL,
                author_id TEXT NOT NULL,
                role TEXT NOT NULL CHECK (role IN ('user', 'system')),
                content TEXT NOT NULL,
                avatar_ref TEXT,
                created_at INTEGER NOT NULL,
                FOREIGN KEY (agent_id) REFERENCES agents (id) ON DELETE CASCADE
            )",
            [],
        )?;

        // Index for efficient transcript retrieval per conversation partition
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_messages_partition_created ON messages(agent_id, author_id, created_at)",
            [],
        )?;

        tracing::info!("Database migrations completed");
        Ok(())
    }

    /// Idempotently installs the category reference data. Existing names are
    /// left untouched, so re-running at startup never mutates them.
    pub fn seed_categories(&self, names: &[&str]) -> AppResult<()> {
        let conn = self
            .connection
            .lock()
            .map_err(|e| AppError::Internal(format!("Failed to acquire database lock: {e}")))?;

        for name in names {
            let category = AgentCategory::new(name.to_string());
            conn.execute(
                "INSERT OR IGNORE INTO agent_categories (id, name) VALUES (?, ?)",
                params![category.id, category.name],
            )?;
        }

        tracing::info!("Seeded {} agent categories", names.len());
        Ok(())
    }

    pub fn get_all_categories(&self) -> AppResult<Vec<AgentCategory>> {
        let conn = self
            .connection
            .lock()
            .map_err(|e| AppError::Internal(format!("Failed to acquire database lock: {e}")))?;

        let mut stmt =
            conn.prepare("SELECT id, name FROM agent_categories ORDER BY name ASC")?;

        let category_iter = stmt.query_map([], |row| {
            Ok(AgentCategory {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;

        let mut categories = Vec::new();
        for category in category_iter {
            categories.push(category?);
        }

        Ok(categories)
    }

    pub fn category_exists(&self, id: &str) -> AppResult<bool> {
        let conn = self
            .connection
            .lock()
            .map_err(|e| AppError::Internal(format!("Failed to acquire database lock: {e}")))?;

        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM agent_categories WHERE id = ?",
                [id],
                |row| row.get(0),
            )
            .optional()?;

        Ok(found.is_some())
    }

    pub fn create_agent(&self, agent: &Agent) -> AppResult<()> {
        let conn = self
            .connection
            .lock()
            .map_err(|e| AppError::Internal(format!("Failed to acquire database lock: {e}")))?;

        conn.execute(
            "INSERT INTO agents (id, owner_id, owner_name, name, description, instructions, seed, avatar_ref, category_id, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                agent.id,
                agent.owner_id,
                agent.owner_name,
                agent.name,
                agent.description,
                agent.instructions,
                agent.seed,
                agent.avatar_ref,
                agent.category_id,
                agent.created_at,
            ],
        )?;

        tracing::info!("Created agent: {} ({})", agent.name, agent.id);
        Ok(())
    }

    /// Plain read; existence is not hidden here, unlike mutation.
    pub fn get_agent_by_id(&self, id: &str) -> AppResult<Agent> {
        let conn = self
            .connection
            .lock()
            .map_err(|e| AppError::Internal(format!("Failed to acquire database lock: {e}")))?;

        let mut stmt = conn.prepare(
            "SELECT id, owner_id, owner_name, name, description, instructions, seed, avatar_ref, category_id, created_at
             FROM agents WHERE id = ?",
        )?;

        let agent = stmt.query_row([id], map_agent_row).map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => AppError::NotFound(format!("Agent {id}")),
            _ => AppError::Database(e),
        })?;

        Ok(agent)
    }

    /// Applies the update only to the row matching both id and owner. A zero
    /// row count is the single failure signal; whether the agent is missing
    /// or owned by someone else is deliberately not distinguished.
    pub fn update_agent(
        &self,
        agent_id: &str,
        owner_id: &str,
        fields: &UpdateAgentRequest,
    ) -> AppResult<Agent> {
        let conn = self
            .connection
            .lock()
            .map_err(|e| AppError::Internal(format!("Failed to acquire database lock: {e}")))?;

        // owner_id is never part of the SET list; it is immutable once set.
        let rows_affected = conn.execute(
            "UPDATE agents SET name = ?, description = ?, instructions = ?, seed = ?,
             avatar_ref = ?, category_id = ? WHERE id = ? AND owner_id = ?",
            params![
                fields.name,
                fields.description,
                fields.instructions,
                fields.seed,
                fields.avatar_ref,
                fields.category_id,
                agent_id,
                owner_id,
            ],
        )?;

        if rows_affected == 0 {
            return Err(AppError::NotFoundOrForbidden);
        }

        let agent = conn.query_row(
            "SELECT id, owner_id, owner_name, name, description, instructions, seed, avatar_ref, category_id, created_at
             FROM agents WHERE id = ?",
            [agent_id],
            map_agent_row,
        )?;

        tracing::info!("Updated agent: {} ({})", agent.name, agent.id);
        Ok(agent)
    }

    /// Deletes under the same (id, owner_id) predicate as update and returns
    /// the removed record. Transcripts go with it via ON DELETE CASCADE.
    pub fn delete_agent(&self, agent_id: &str, owner_id: &str) -> AppResult<Agent> {
        let conn = self
            .connection
            .lock()
            .map_err(|e| AppError::Internal(format!("Failed to acquire database lock: {e}")))?;

        let agent = conn
            .query_row(
                "SELECT id, owner_id, owner_name, name, description, instructions, seed, avatar_ref, category_id, created_at
                 FROM agents WHERE id = ? AND owner_id = ?",
                params![agent_id, owner_id],
                map_agent_row,
            )
            .optional()?
            .ok_or(AppError::NotFoundOrForbidden)?;

        conn.execute(
            "DELETE FROM agents WHERE id = ? AND owner_id = ?",
            params![agent_id, owner_id],
        )?;

        tracing::info!("Deleted agent: {} ({})", agent.name, agent.id);
        Ok(agent)
    }

    /// Public directory listing. Filters combine with AND semantics; the
    /// name filter is a case-insensitive substring match. Each entry carries
    /// its total message count across all authors.
    pub fn list_agents(
        &self,
        category_id: Option<&str>,
        name_search: Option<&str>,
    ) -> AppResult<Vec<AgentSummary>> {
        let conn = self
            .connection
            .lock()
            .map_err(|e| AppError::Internal(format!("Failed to acquire database lock: {e}")))?;

        let mut sql = String::from(
            "SELECT a.id, a.owner_name, a.name, a.description, a.avatar_ref, a.category_id, a.created_at, COUNT(m.id)
             FROM agents a LEFT JOIN messages m ON m.agent_id = a.id",
        );

        let mut clauses: Vec<&str> = Vec::new();
        let mut bindings: Vec<String> = Vec::new();

        if let Some(category_id) = category_id {
            clauses.push("a.category_id = ?");
            bindings.push(category_id.to_string());
        }

        if let Some(name_search) = name_search {
            // Plain substring match: LIKE metacharacters in the filter are
            // escaped so they match literally.
            clauses.push("LOWER(a.name) LIKE '%' || LOWER(?) || '%' ESCAPE '\\'");
            bindings.push(escape_like_pattern(name_search));
        }

        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        // created_at has second granularity; the rowid tiebreak keeps agents
        // created within the same second in reverse insertion order.
        sql.push_str(" GROUP BY a.id ORDER BY a.created_at DESC, a.rowid DESC");

        let mut stmt = conn.prepare(&sql)?;
        let agent_iter = stmt.query_map(params_from_iter(bindings.iter()), |row| {
            Ok(AgentSummary {
                id: row.get(0)?,
                owner_name: row.get(1)?,
                name: row.get(2)?,
                description: row.get(3)?,
                avatar_ref: row.get(4)?,
                category_id: row.get(5)?,
                created_at: row.get(6)?,
                message_count: row.get(7)?,
            })
        })?;

        let mut agents = Vec::new();
        for agent in agent_iter {
            agents.push(agent?);
        }

        Ok(agents)
    }

    /// Ordered transcript for one conversation partition. Never returns a
    /// message belonging to a different author, even for the same agent.
    pub fn get_messages(&self, agent_id: &str, author_id: &str) -> AppResult<Vec<AgentMessage>> {
        let conn = self
            .connection
            .lock()
            .map_err(|e| AppError::Internal(format!("Failed to acquire database lock: {e}")))?;

        let mut stmt = conn.prepare(
            "SELECT id, agent_id, author_id, role, content, avatar_ref, created_at
             FROM messages
             WHERE agent_id = ? AND author_id = ?
             ORDER BY created_at ASC, id ASC",
        )?;

        let message_iter = stmt.query_map(params![agent_id, author_id], map_message_row)?;

        let mut messages = Vec::new();
        for message in message_iter {
            messages.push(message?);
        }

        Ok(messages)
    }

    /// Appends one turn to a conversation partition. The store assigns
    /// created_at and keeps it strictly increasing within the partition, so
    /// same-millisecond appends still retain insertion order.
    pub fn append_message(
        &self,
        agent_id: &str,
        author_id: &str,
        role: MessageRole,
        content: &str,
    ) -> AppResult<AgentMessage> {
        let conn = self
            .connection
            .lock()
            .map_err(|e| AppError::Internal(format!("Failed to acquire database lock: {e}")))?;

        let agent_avatar: Option<String> = conn
            .query_row(
                "SELECT avatar_ref FROM agents WHERE id = ?",
                [agent_id],
                |row| row.get(0),
            )
            .optional()?;

        let Some(agent_avatar) = agent_avatar else {
            return Err(AppError::NotFound(format!("Agent {agent_id}")));
        };

        // Agent turns carry the agent's avatar; the caller's avatar is
        // resolved client-side from their identity.
        let avatar_ref = match role {
            MessageRole::System => Some(agent_avatar),
            MessageRole::User => None,
        };

        let last_created_at: i64 = conn.query_row(
            "SELECT COALESCE(MAX(created_at), 0) FROM messages WHERE agent_id = ? AND author_id = ?",
            params![agent_id, author_id],
            |row| row.get(0),
        )?;

        let created_at = Utc::now().timestamp_millis().max(last_created_at + 1);

        conn.execute(
            "INSERT INTO messages (agent_id, author_id, role, content, avatar_ref, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![agent_id, author_id, role.as_str(), content, avatar_ref, created_at],
        )?;

        let id = conn.last_insert_rowid();

        Ok(AgentMessage {
            id,
            agent_id: agent_id.to_string(),
            author_id: author_id.to_string(),
            role,
            content: content.to_string(),
            avatar_ref,
            created_at,
        })
    }
}

fn escape_like_pattern(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn map_agent_row(row: &Row) -> rusqlite::Result<Agent> {
    Ok(Agent {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        owner_name: row.get(2)?,
        name: row.get(3)?,
        description: row.get(4)?,
        instructions: row.get(5)?,
        seed: row.get(6)?,
        avatar_ref: row.get(7)?,
        category_id: row.get(8)?,
        created_at: row.get(9)?,
    })
}

fn map_message_row(row: &Row) -> rusqlite::Result<AgentMessage> {
    let role_str: String = row.get(3)?;
    let role = MessageRole::parse(&role_str).unwrap_or(MessageRole::User);

    Ok(AgentMessage {
        id: row.get(0)?,
        agent_id: row.get(1)?,
        author_id: row.get(2)?,
        role,
        content: row.get(4)?,
        avatar_ref: row.get(5)?,
        created_at: row.get(6)?,
    })
}
