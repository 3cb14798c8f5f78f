//! Evaluation of the assistant against a ground-truth corpus.
//!
//! This module loads (input, expected SQL) pairs, runs each input through
//! the assistant, scores the extracted SQL against the expected statement,
//! and aggregates the results into a report. Progress is emitted as
//! [`UpdateEvent`]s so the UI can observe a run without polling.

use crate::chat::{invoke_assistant, ChatMessage, Thread};
use crate::config::Config;
use crate::sql::cosine_similarity;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// One ground-truth case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalCase {
    /// Natural-language input.
    pub input: String,
    /// Expected SQL statement.
    pub expected_sql: String,
}

/// Load the ground-truth corpus.
///
/// The file has a header line followed by one case per line. Fields are
/// separated by `|` when present; otherwise the line is split at its last
/// comma (inputs may themselves contain commas). Surrounding quotes on the
/// SQL are stripped. Lines with a missing field are skipped with a warning.
pub fn load_ground_truth(path: &Path) -> Result<Vec<EvalCase>, EvalError> {
    if !path.exists() {
        return Err(EvalError::GroundTruthNotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;

    let mut cases = Vec::new();
    for (number, line) in content.lines().enumerate().skip(1) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let split = if line.contains('|') {
            line.split_once('|')
        } else {
            line.rsplit_once(',')
        };

        let Some((input, sql)) = split else {
            warn!("ground truth line {} has no separator, skipping", number + 1);
            continue;
        };

        let input = input.trim().to_string();
        let sql = strip_quotes(sql.trim()).to_string();
        if input.is_empty() || sql.is_empty() {
            warn!("ground truth line {} has an empty field, skipping", number + 1);
            continue;
        }

        cases.push(EvalCase {
            input,
            expected_sql: sql,
        });
    }

    if cases.is_empty() {
        return Err(EvalError::NoCases(path.to_path_buf()));
    }
    Ok(cases)
}

/// Strip one pair of surrounding double quotes.
fn strip_quotes(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(s)
}

/// Result of evaluating one case.
#[derive(Debug, Clone, Serialize)]
pub struct CaseResult {
    /// Case index (0-based).
    pub index: usize,
    /// Natural-language input.
    pub input: String,
    /// Expected SQL statement.
    pub expected_sql: String,
    /// SQL extracted from the assistant reply, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assistant_sql: Option<String>,
    /// Similarity against the expected SQL, when SQL was extracted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
    /// Whether the case met the similarity threshold.
    pub passed: bool,
    /// Failure reason (no SQL found, invocation error).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregated evaluation metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EvalReport {
    /// Number of evaluated cases.
    pub total: usize,
    /// Cases at or above the similarity threshold.
    pub successful: usize,
    /// Cases below the threshold or with errors.
    pub failed: usize,
    /// Mean similarity over scored cases.
    pub average_similarity: f64,
    /// Median similarity over scored cases.
    pub median_similarity: f64,
    /// Minimum similarity over scored cases.
    pub min_similarity: f64,
    /// Maximum similarity over scored cases.
    pub max_similarity: f64,
    /// Successful cases as a percentage of the total.
    pub success_rate: f64,
    /// Whether the run was cancelled before finishing.
    pub cancelled: bool,
    /// Wall-clock duration of the run in milliseconds.
    pub duration_ms: u64,
    /// Per-case results.
    pub results: Vec<CaseResult>,
}

impl EvalReport {
    /// Build a report from per-case results.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_results(results: Vec<CaseResult>, cancelled: bool, duration_ms: u64) -> Self {
        let total = results.len();
        let successful = results.iter().filter(|r| r.passed).count();
        let failed = total - successful;

        let mut similarities: Vec<f64> = results.iter().filter_map(|r| r.similarity).collect();
        similarities.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let (average, median, min, max) = if similarities.is_empty() {
            (0.0, 0.0, 0.0, 0.0)
        } else {
            let sum: f64 = similarities.iter().sum();
            let mid = similarities.len() / 2;
            let median = if similarities.len() % 2 == 0 {
                (similarities[mid - 1] + similarities[mid]) / 2.0
            } else {
                similarities[mid]
            };
            (
                sum / similarities.len() as f64,
                median,
                similarities[0],
                similarities[similarities.len() - 1],
            )
        };

        let success_rate = if total == 0 {
            0.0
        } else {
            successful as f64 / total as f64 * 100.0
        };

        Self {
            total,
            successful,
            failed,
            average_similarity: average,
            median_similarity: median,
            min_similarity: min,
            max_similarity: max,
            success_rate,
            cancelled,
            duration_ms,
            results,
        }
    }

    /// Failed cases, in evaluation order.
    pub fn failed_cases(&self) -> impl Iterator<Item = &CaseResult> {
        self.results.iter().filter(|r| !r.passed)
    }
}

/// Events emitted during an evaluation run for UI observation.
#[derive(Debug, Clone)]
pub enum UpdateEvent {
    /// Evaluation started.
    EvalStarted { total: usize },
    /// One case finished.
    CaseEvaluated { result: CaseResult },
    /// Run finished; the report covers all evaluated cases.
    EvalCompleted { report: EvalReport },
    /// Run was cancelled; the report covers the cases finished so far.
    EvalCancelled { report: EvalReport },
    /// Run failed before producing a report.
    EvalFailed { error: String },
    /// Free-form status message.
    Status { message: String },
}

/// Options for one evaluation run.
#[derive(Debug, Clone, Default)]
pub struct EvalOptions {
    /// Cap on evaluated cases; falls back to the configured limit.
    pub limit: Option<usize>,
}

/// Handle for cancelling a running evaluation.
#[derive(Debug)]
pub struct EvalHandle {
    cancel_tx: mpsc::Sender<()>,
}

impl EvalHandle {
    /// Request cancellation (non-blocking).
    ///
    /// Returns true if the signal was sent.
    pub fn try_cancel(&self) -> bool {
        self.cancel_tx.try_send(()).is_ok()
    }
}

/// Start an evaluation as a background task.
///
/// Events arrive on `event_tx`; the returned handle cancels the run.
pub fn start_evaluation(
    config: Config,
    options: EvalOptions,
    event_tx: mpsc::UnboundedSender<UpdateEvent>,
) -> EvalHandle {
    let (cancel_tx, mut cancel_rx) = mpsc::channel(1);

    tokio::spawn(async move {
        if let Err(e) = evaluate(&config, &options, &event_tx, &mut cancel_rx).await {
            let _ = event_tx.send(UpdateEvent::EvalFailed {
                error: e.to_string(),
            });
        }
    });

    EvalHandle { cancel_tx }
}

/// Run the evaluation loop.
///
/// # Event channel
/// All event sends use `let _ = event_tx.send(...)`: if the receiver is
/// dropped the run keeps going and simply stops reporting.
pub async fn evaluate(
    config: &Config,
    options: &EvalOptions,
    event_tx: &mpsc::UnboundedSender<UpdateEvent>,
    cancel_rx: &mut mpsc::Receiver<()>,
) -> Result<EvalReport, EvalError> {
    let cases = load_ground_truth(&config.evaluation.ground_truth_path)?;
    let limit = options
        .limit
        .or(config.evaluation.case_limit)
        .unwrap_or(cases.len());
    let cases = &cases[..limit.min(cases.len())];
    let threshold = config.evaluation.similarity_threshold;
    let schema = config.read_schema();

    let _ = event_tx.send(UpdateEvent::EvalStarted { total: cases.len() });

    let start = Instant::now();
    let mut results = Vec::with_capacity(cases.len());
    let mut cancelled = false;

    for (index, case) in cases.iter().enumerate() {
        if cancel_rx.try_recv().is_ok() {
            cancelled = true;
            break;
        }

        // Each case gets a fresh one-turn conversation
        let mut thread = Thread::new();
        thread.add_message(ChatMessage::user(case.input.clone()));
        let prompt = thread.build_prompt(schema.as_deref());

        let reply = tokio::select! {
            _ = cancel_rx.recv() => {
                cancelled = true;
                break;
            }
            reply = invoke_assistant(&config.assistant, &prompt) => reply
        };

        let result = match reply {
            Ok(reply) => match reply.sql {
                Some(sql) => {
                    let similarity = cosine_similarity(&sql, &case.expected_sql);
                    debug!("case {index}: similarity {similarity:.3}");
                    CaseResult {
                        index,
                        input: case.input.clone(),
                        expected_sql: case.expected_sql.clone(),
                        assistant_sql: Some(sql),
                        similarity: Some(similarity),
                        passed: similarity >= threshold,
                        error: None,
                    }
                }
                None => CaseResult {
                    index,
                    input: case.input.clone(),
                    expected_sql: case.expected_sql.clone(),
                    assistant_sql: None,
                    similarity: None,
                    passed: false,
                    error: Some("no SQL statement found in reply".into()),
                },
            },
            Err(e) => CaseResult {
                index,
                input: case.input.clone(),
                expected_sql: case.expected_sql.clone(),
                assistant_sql: None,
                similarity: None,
                passed: false,
                error: Some(e.to_string()),
            },
        };

        let _ = event_tx.send(UpdateEvent::CaseEvaluated {
            result: result.clone(),
        });
        results.push(result);
    }

    #[allow(clippy::cast_possible_truncation)]
    let duration_ms = start.elapsed().as_millis() as u64;
    let report = EvalReport::from_results(results, cancelled, duration_ms);

    if cancelled {
        let _ = event_tx.send(UpdateEvent::EvalCancelled {
            report: report.clone(),
        });
    } else {
        let _ = event_tx.send(UpdateEvent::EvalCompleted {
            report: report.clone(),
        });
    }

    Ok(report)
}

/// Errors that can occur during evaluation.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Ground-truth file does not exist.
    #[error("Ground truth file not found: {0}")]
    GroundTruthNotFound(PathBuf),

    /// Ground-truth file contained no usable cases.
    #[error("Ground truth file has no usable cases: {0}")]
    NoCases(PathBuf),
}
