//! querybench-engine: Headless core for the querybench SQL assistant workbench
//!
//! This crate provides the non-UI logic for querybench, including:
//! - Configuration management
//! - Chat threads and assistant subprocess invocation
//! - Thread history persistence
//! - SQL extraction and similarity scoring
//! - The evaluation loop with event emission

pub mod chat;
pub mod config;
pub mod eval;
pub mod history;
pub mod sql;

// Re-export commonly used types
pub use chat::{invoke_assistant, AssistantReply, ChatError, ChatMessage, Role, Thread};
pub use config::{AssistantConfig, Config, ConfigError, EvalConfig};
pub use eval::{
    evaluate, load_ground_truth, start_evaluation, CaseResult, EvalCase, EvalError, EvalHandle,
    EvalOptions, EvalReport, UpdateEvent,
};
pub use history::{HistoryError, HistoryStore, ThreadSummary};
pub use sql::{cosine_similarity, extract_sql};

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_version() {
        let version = engine_version();
        assert!(!version.is_empty());
        assert!(version.starts_with("0."));
    }
}
