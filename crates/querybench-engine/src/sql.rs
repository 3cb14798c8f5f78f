//! SQL extraction and similarity scoring.
//!
//! Assistant replies are prose with SQL somewhere inside. Extraction pulls
//! the first statement out of a reply; scoring compares an extracted
//! statement against a reference statement using cosine similarity over
//! TF-IDF weighted tokens.

use regex::Regex;
use std::collections::HashMap;

/// Leading keywords that mark a line as a SQL statement.
const STATEMENT_KEYWORDS: [&str; 5] = ["select", "insert", "update", "delete", "with"];

/// Extract the first SQL statement from an assistant reply.
///
/// Tries, in order:
/// 1. the contents of a ```sql fenced block (keeps multi-line statements
///    intact),
/// 2. a line whose trimmed form starts with a statement keyword,
/// 3. the contents of the first generic fenced block.
///
/// Returns `None` when the reply contains nothing that looks like SQL.
pub fn extract_sql(response: &str) -> Option<String> {
    if let Some(block) = fenced_block(response, true) {
        return Some(block);
    }

    for line in response.lines() {
        let trimmed = line.trim();
        let lower = trimmed.to_lowercase();
        if STATEMENT_KEYWORDS.iter().any(|kw| lower.starts_with(kw)) {
            return Some(trimmed.to_string());
        }
    }

    fenced_block(response, false)
}

/// Extract the contents of a fenced code block.
fn fenced_block(response: &str, sql_tagged: bool) -> Option<String> {
    let pattern = if sql_tagged {
        r"(?is)```sql\s+(.*?)```"
    } else {
        r"(?s)```\s*(.*?)```"
    };
    let re = Regex::new(pattern).ok()?;
    let block = re.captures(response)?.get(1)?.as_str().trim();
    if block.is_empty() {
        None
    } else {
        Some(block.to_string())
    }
}

/// Cosine similarity between the TF-IDF vectors of two statements.
///
/// Tokens are lowercased alphanumeric runs; term weights use the smoothed
/// IDF `ln((1 + n) / (1 + df)) + 1` over the two-statement corpus, so
/// identical statements score exactly 1.0 and statements with no shared
/// tokens score 0.0.
pub fn cosine_similarity(a: &str, b: &str) -> f64 {
    let counts_a = term_counts(a);
    let counts_b = term_counts(b);
    if counts_a.is_empty() || counts_b.is_empty() {
        return 0.0;
    }

    let mut vocabulary: Vec<&String> = counts_a.keys().chain(counts_b.keys()).collect();
    vocabulary.sort();
    vocabulary.dedup();

    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;

    for term in vocabulary {
        let tf_a = counts_a.get(term).copied().unwrap_or(0);
        let tf_b = counts_b.get(term).copied().unwrap_or(0);
        let df = usize::from(tf_a > 0) + usize::from(tf_b > 0);

        #[allow(clippy::cast_precision_loss)]
        let idf = (3.0 / (1.0 + df as f64)).ln() + 1.0;
        #[allow(clippy::cast_precision_loss)]
        let wa = tf_a as f64 * idf;
        #[allow(clippy::cast_precision_loss)]
        let wb = tf_b as f64 * idf;

        dot += wa * wb;
        norm_a += wa * wa;
        norm_b += wb * wb;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a.sqrt() * norm_b.sqrt())
    }
}

/// Count lowercased alphanumeric tokens in a statement.
fn term_counts(text: &str) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for token in text
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|t| !t.is_empty())
    {
        *counts.entry(token.to_lowercase()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_statement_line() {
        let response = "Here is the query you asked for:\n\nSELECT name FROM users WHERE active = 1\n\nThis filters on the active flag.";
        assert_eq!(
            extract_sql(response).as_deref(),
            Some("SELECT name FROM users WHERE active = 1")
        );
    }

    #[test]
    fn test_extract_keyword_case_insensitive() {
        let response = "with recent as (select * from orders) select count(*) from recent";
        assert!(extract_sql(response).is_some());
    }

    #[test]
    fn test_extract_sql_fence() {
        let response = "The statement:\n\n```sql\nSELECT id\nFROM orders\n```\n\nDone.";
        assert_eq!(extract_sql(response).as_deref(), Some("SELECT id\nFROM orders"));
    }

    #[test]
    fn test_extract_generic_fence() {
        // No keyword line and no sql tag, but a generic fence is present.
        let response = "Try this:\n```\nEXPLAIN ANALYZE foo\n```";
        assert_eq!(extract_sql(response).as_deref(), Some("EXPLAIN ANALYZE foo"));
    }

    #[test]
    fn test_extract_none_for_prose() {
        assert!(extract_sql("I could not find a matching table for that question.").is_none());
        assert!(extract_sql("").is_none());
    }

    #[test]
    fn test_similarity_identical() {
        let sql = "SELECT name FROM users WHERE active = 1";
        assert!((cosine_similarity(sql, sql) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_similarity_case_insensitive() {
        let sim = cosine_similarity("SELECT NAME FROM USERS", "select name from users");
        assert!((sim - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_similarity_disjoint() {
        let sim = cosine_similarity("SELECT a FROM b", "DROP TABLE x");
        assert!(sim.abs() < 1e-9);
    }

    #[test]
    fn test_similarity_ranks_closer_statements_higher() {
        let reference = "SELECT name FROM users";
        let close = cosine_similarity(reference, "SELECT name FROM customers");
        let far = cosine_similarity(reference, "DELETE FROM orders");
        assert!(close > far);
        assert!(close > 0.0 && close < 1.0);
    }

    #[test]
    fn test_similarity_empty_inputs() {
        assert!(cosine_similarity("", "SELECT 1").abs() < f64::EPSILON);
        assert!(cosine_similarity("SELECT 1", "").abs() < f64::EPSILON);
    }
}
