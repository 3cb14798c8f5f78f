//! Thread history persistence.
//!
//! Threads are stored one file per thread under the history directory as
//! JSONL: a metadata line followed by one message per line. Summaries for
//! the history panel are read from the metadata line alone.

use crate::chat::{ChatMessage, Thread};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;
use tracing::warn;

/// Thread metadata (stored as the first line of the JSONL file).
#[derive(Debug, Serialize, Deserialize)]
struct ThreadMetadata {
    id: String,
    title: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Summary info for listing threads without loading full contents.
#[derive(Debug, Clone, Serialize)]
pub struct ThreadSummary {
    pub id: String,
    pub title: String,
    pub messages: usize,
    pub updated_at: DateTime<Utc>,
}

/// Manages thread persistence under a history directory.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    dir: PathBuf,
}

impl HistoryStore {
    /// Create a store, creating the history directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, HistoryError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Save a thread to its JSONL file.
    pub fn save(&self, thread: &Thread) -> Result<(), HistoryError> {
        Self::validate_id(&thread.id)?;

        let path = self.dir.join(format!("{}.jsonl", thread.id));
        let mut file = std::fs::File::create(&path)?;

        let metadata = ThreadMetadata {
            id: thread.id.clone(),
            title: thread.title.clone(),
            created_at: thread.created_at,
            updated_at: thread.updated_at,
        };
        let meta_json = serde_json::to_string(&metadata).map_err(HistoryError::Serialize)?;
        writeln!(file, "{meta_json}")?;

        for msg in &thread.messages {
            let json = serde_json::to_string(msg).map_err(HistoryError::Serialize)?;
            writeln!(file, "{json}")?;
        }

        Ok(())
    }

    /// Load a thread by ID.
    pub fn load(&self, thread_id: &str) -> Result<Thread, HistoryError> {
        Self::validate_id(thread_id)?;

        let path = self.dir.join(format!("{thread_id}.jsonl"));
        if !path.exists() {
            return Err(HistoryError::NotFound(thread_id.to_string()));
        }
        let content = std::fs::read_to_string(&path)?;

        let mut lines = content.lines();
        let meta_line = lines.next().ok_or(HistoryError::EmptyThread)?;
        let metadata: ThreadMetadata =
            serde_json::from_str(meta_line).map_err(HistoryError::Parse)?;

        let mut messages = Vec::new();
        for line in lines {
            if !line.trim().is_empty() {
                let msg: ChatMessage = serde_json::from_str(line).map_err(HistoryError::Parse)?;
                messages.push(msg);
            }
        }

        Ok(Thread {
            id: metadata.id,
            title: metadata.title,
            messages,
            created_at: metadata.created_at,
            updated_at: metadata.updated_at,
        })
    }

    /// List summaries of all stored threads, newest first.
    ///
    /// Unreadable or malformed files are skipped with a warning rather than
    /// failing the whole listing.
    pub fn list(&self) -> Result<Vec<ThreadSummary>, HistoryError> {
        let mut summaries = Vec::new();

        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.extension().is_some_and(|ext| ext == "jsonl") {
                continue;
            }

            let content = match std::fs::read_to_string(&path) {
                Ok(c) => c,
                Err(e) => {
                    warn!("skipping unreadable thread file {}: {e}", path.display());
                    continue;
                }
            };

            let mut lines = content.lines();
            let Some(meta_line) = lines.next() else {
                continue;
            };
            match serde_json::from_str::<ThreadMetadata>(meta_line) {
                Ok(metadata) => summaries.push(ThreadSummary {
                    id: metadata.id,
                    title: metadata.title,
                    messages: lines.filter(|l| !l.trim().is_empty()).count(),
                    updated_at: metadata.updated_at,
                }),
                Err(e) => {
                    warn!("skipping malformed thread file {}: {e}", path.display());
                }
            }
        }

        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }

    /// Delete a thread file.
    pub fn delete(&self, thread_id: &str) -> Result<(), HistoryError> {
        Self::validate_id(thread_id)?;

        let path = self.dir.join(format!("{thread_id}.jsonl"));
        if !path.exists() {
            return Err(HistoryError::NotFound(thread_id.to_string()));
        }
        std::fs::remove_file(path)?;
        Ok(())
    }

    /// Reject IDs that could escape the history directory.
    fn validate_id(id: &str) -> Result<(), HistoryError> {
        if id.is_empty()
            || id
                .chars()
                .any(|c| !c.is_ascii_alphanumeric() && c != '-' && c != '_')
        {
            return Err(HistoryError::InvalidId(id.to_string()));
        }
        Ok(())
    }
}

/// Errors that can occur in history operations.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialize(#[source] serde_json::Error),

    /// JSON parse error.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Thread file is empty.
    #[error("Thread file is empty")]
    EmptyThread,

    /// Thread not found.
    #[error("Thread not found: {0}")]
    NotFound(String),

    /// Invalid thread ID.
    #[error("Invalid thread ID: {0}")]
    InvalidId(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatMessage;

    fn store() -> (tempfile::TempDir, HistoryStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("history")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_save_load_roundtrip() {
        let (_dir, store) = store();

        let mut thread = Thread::new();
        thread.add_message(ChatMessage::user("Which products sold best?"));
        thread.add_message(ChatMessage::assistant("```sql\nSELECT 1\n```", "claude"));
        store.save(&thread).unwrap();

        let loaded = store.load(&thread.id).unwrap();
        assert_eq!(loaded.id, thread.id);
        assert_eq!(loaded.title, thread.title);
        assert_eq!(loaded.messages.len(), 2);
        assert_eq!(loaded.messages[1].assistant, Some("claude".into()));
    }

    #[test]
    fn test_list_newest_first() {
        let (_dir, store) = store();

        let mut first = Thread::new();
        first.add_message(ChatMessage::user("first question"));
        store.save(&first).unwrap();

        let mut second = Thread::new();
        second.add_message(ChatMessage::user("second question"));
        second.updated_at = first.updated_at + chrono::Duration::seconds(5);
        store.save(&second).unwrap();

        let summaries = store.list().unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].id, second.id);
        assert_eq!(summaries[0].messages, 1);
    }

    #[test]
    fn test_load_missing_thread() {
        let (_dir, store) = store();
        assert!(matches!(
            store.load("no-such-thread"),
            Err(HistoryError::NotFound(_))
        ));
    }

    #[test]
    fn test_invalid_id_rejected() {
        let (_dir, store) = store();
        assert!(matches!(
            store.load("../escape"),
            Err(HistoryError::InvalidId(_))
        ));
    }

    #[test]
    fn test_delete_thread() {
        let (_dir, store) = store();

        let mut thread = Thread::new();
        thread.add_message(ChatMessage::user("temp"));
        store.save(&thread).unwrap();
        store.delete(&thread.id).unwrap();

        assert!(matches!(
            store.load(&thread.id),
            Err(HistoryError::NotFound(_))
        ));
        assert!(store.list().unwrap().is_empty());
    }
}
