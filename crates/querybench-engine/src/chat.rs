//! Conversation threads and the assistant subprocess.
//!
//! A [`Thread`] is the unit of conversation; [`invoke_assistant`] turns the
//! thread's prompt into a reply by running the configured CLI with the
//! prompt on stdin.

use crate::config::AssistantConfig;
use crate::sql::extract_sql;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use uuid::Uuid;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Name of the assistant that replied (assistant messages only).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub assistant: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn stamped(role: Role, content: String, assistant: Option<String>) -> Self {
        Self {
            role,
            content,
            assistant,
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::stamped(Role::User, content.into(), None)
    }

    pub fn assistant(content: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self::stamped(Role::Assistant, content.into(), Some(assistant.into()))
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::stamped(Role::System, content.into(), None)
    }
}

/// Maximum length of a thread title derived from the first message.
const TITLE_LEN: usize = 50;

/// A conversation thread.
#[derive(Debug, Clone)]
pub struct Thread {
    /// Unique thread ID.
    pub id: String,
    /// Title, derived from the first user message.
    pub title: String,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Thread {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: "New conversation".into(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message, deriving the title from the first user message.
    pub fn add_message(&mut self, message: ChatMessage) {
        if self.messages.is_empty() && message.role == Role::User {
            self.title = message.content.chars().take(TITLE_LEN).collect();
            if message.content.chars().count() > TITLE_LEN {
                self.title.push_str("...");
            }
        }
        self.messages.push(message);
        self.updated_at = Utc::now();
    }

    /// Assemble the prompt for the next assistant turn: system instruction,
    /// schema (when configured), the conversation so far, and the ask.
    pub fn build_prompt(&self, schema: Option<&str>) -> String {
        use std::fmt::Write;

        let mut prompt = String::from(SQL_SYSTEM_PROMPT);
        prompt.push_str("\n\n");

        if let Some(schema) = schema {
            let _ = write!(prompt, "Database schema:\n---\n{schema}\n---\n\n");
        }

        prompt.push_str("Conversation:\n");
        for msg in &self.messages {
            let speaker = match msg.role {
                Role::System => "[System]".to_string(),
                Role::User => "User".to_string(),
                Role::Assistant => msg.assistant.clone().unwrap_or_else(|| "assistant".into()),
            };
            let _ = write!(prompt, "{speaker}: {}\n\n", msg.content);
        }

        prompt.push_str(
            "\nAnswer the user's last message with a single SQL statement in a ```sql code block.\n",
        );
        prompt
    }
}

impl Default for Thread {
    fn default() -> Self {
        Self::new()
    }
}

/// System prompt for assistant conversations.
const SQL_SYSTEM_PROMPT: &str = r"You are a SQL assistant that translates natural-language questions into SQL.

## Your role
Answer the user's question with one SQL statement that can run against their
database. Use only tables and columns from the provided schema; do not invent
names.

## Response format
Reply with the statement in a ```sql code block, then at most two sentences of
explanation. If the question cannot be answered with the schema, say so and
ask for the missing detail instead of guessing.

## Guidelines
- One statement per reply
- Prefer explicit column lists over SELECT *
- Keep identifiers unquoted unless quoting is required";

/// A completed assistant invocation.
#[derive(Debug, Clone)]
pub struct AssistantReply {
    /// Assistant that produced the reply.
    pub assistant: String,
    /// Full reply content.
    pub content: String,
    /// SQL statement extracted from the reply, if any.
    pub sql: Option<String>,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// Run the configured assistant CLI with the prompt on stdin.
///
/// Output is taken from stdout, falling back to stderr for CLIs that print
/// their answer there. The invocation is bounded by the configured timeout;
/// `kill_on_drop` reaps the child if the caller goes away first.
pub async fn invoke_assistant(
    assistant: &AssistantConfig,
    prompt: &str,
) -> Result<AssistantReply, ChatError> {
    let [program, args @ ..] = assistant.command_argv.as_slice() else {
        return Err(ChatError::EmptyCommand(assistant.name.clone()));
    };

    let started = std::time::Instant::now();

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(ChatError::Spawn)?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(prompt.as_bytes())
            .await
            .map_err(ChatError::Io)?;
        // Closing stdin signals EOF to the child
        drop(stdin);
    }

    let budget = Duration::from_secs(assistant.timeout_seconds);
    let outcome = timeout(budget, child.wait_with_output()).await;

    #[allow(clippy::cast_possible_truncation)]
    let duration_ms = started.elapsed().as_millis() as u64;

    match outcome {
        Ok(Ok(output)) => {
            let stdout = String::from_utf8_lossy(&output.stdout).to_string();
            let content = if stdout.trim().is_empty() {
                String::from_utf8_lossy(&output.stderr).to_string()
            } else {
                stdout
            };
            let sql = extract_sql(&content);

            Ok(AssistantReply {
                assistant: assistant.name.clone(),
                content,
                sql,
                duration_ms,
            })
        }
        Ok(Err(e)) => Err(ChatError::Io(e)),
        Err(_) => Err(ChatError::Timeout(assistant.name.clone())),
    }
}

/// Errors that can occur in chat operations.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to spawn assistant: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("assistant timed out: {0}")]
    Timeout(String),

    #[error("assistant {0} has an empty command")]
    EmptyCommand(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_message_creation() {
        let user_msg = ChatMessage::user("Show me the top customers");
        assert_eq!(user_msg.role, Role::User);
        assert!(user_msg.assistant.is_none());

        let reply = ChatMessage::assistant("```sql\nSELECT 1\n```", "claude");
        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.assistant, Some("claude".into()));
    }

    #[test]
    fn test_thread_title_from_first_message() {
        let mut thread = Thread::new();
        thread.add_message(ChatMessage::user("How many orders shipped last week?"));
        assert!(thread.title.starts_with("How many orders"));

        let mut long = Thread::new();
        long.add_message(ChatMessage::user("x".repeat(80)));
        assert!(long.title.ends_with("..."));
    }

    #[test]
    fn test_build_prompt_sections() {
        let mut thread = Thread::new();
        thread.add_message(ChatMessage::user("List all active users"));

        let prompt = thread.build_prompt(Some("CREATE TABLE users (id INT, active INT);"));
        assert!(prompt.contains("Database schema:"));
        assert!(prompt.contains("CREATE TABLE users"));
        assert!(prompt.contains("User: List all active users"));

        let without_schema = thread.build_prompt(None);
        assert!(!without_schema.contains("Database schema:"));
    }

    #[tokio::test]
    async fn test_invoke_assistant_cat() {
        // `cat` echoes the prompt back, standing in for a real assistant CLI.
        let assistant = AssistantConfig {
            name: "cat".into(),
            command_argv: vec!["cat".into()],
            timeout_seconds: 10,
        };

        let reply = invoke_assistant(&assistant, "SELECT 1\n").await.unwrap();
        assert_eq!(reply.assistant, "cat");
        assert!(reply.content.contains("SELECT 1"));
        assert_eq!(reply.sql.as_deref(), Some("SELECT 1"));
    }

    #[test]
    fn test_empty_command_rejected() {
        let assistant = AssistantConfig {
            name: "broken".into(),
            command_argv: vec![],
            timeout_seconds: 10,
        };

        let rt = tokio::runtime::Runtime::new().unwrap();
        let err = rt.block_on(invoke_assistant(&assistant, "prompt")).unwrap_err();
        assert!(matches!(err, ChatError::EmptyCommand(_)));
    }
}
