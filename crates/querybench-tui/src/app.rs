//! Application state and update logic for the querybench TUI.

use crate::event::Action;
use crate::ui::widgets::TextInputState;
use chrono::{DateTime, Local};
use querybench_engine::{
    start_evaluation, AssistantConfig, AssistantReply, ChatMessage, Config, EvalHandle,
    EvalOptions, HistoryStore, Thread, ThreadSummary, UpdateEvent,
};
use std::collections::VecDeque;
use std::path::PathBuf;
use tokio::sync::mpsc;

/// Maximum number of entries kept in the updates feed.
const MAX_UPDATES: usize = 100;

/// Directory under the workspace that holds querybench data.
pub const DATA_DIR: &str = ".querybench";

/// Which main panel is shown in the center column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// The chat interface.
    #[default]
    Chat,
    /// The config editor.
    Config,
}

/// Which pane has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusedPane {
    /// The center (main) panel has focus.
    #[default]
    Main,
    /// The history panel has focus.
    History,
}

impl FocusedPane {
    /// Toggle focus to the other pane.
    #[must_use]
    pub fn toggle(self) -> Self {
        match self {
            Self::Main => Self::History,
            Self::History => Self::Main,
        }
    }
}

/// Severity of an updates-feed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    Info,
    Success,
    Error,
}

/// One entry in the backend-updates feed.
#[derive(Debug, Clone)]
pub struct UpdateEntry {
    pub timestamp: DateTime<Local>,
    pub kind: UpdateKind,
    pub message: String,
}

/// Editable config fields, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigField {
    AssistantCommand,
    TimeoutSeconds,
    GroundTruthPath,
    SimilarityThreshold,
    SchemaPath,
}

impl ConfigField {
    pub const ALL: [Self; 5] = [
        Self::AssistantCommand,
        Self::TimeoutSeconds,
        Self::GroundTruthPath,
        Self::SimilarityThreshold,
        Self::SchemaPath,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::AssistantCommand => "Assistant command",
            Self::TimeoutSeconds => "Timeout (seconds)",
            Self::GroundTruthPath => "Ground truth path",
            Self::SimilarityThreshold => "Similarity threshold",
            Self::SchemaPath => "Schema path",
        }
    }
}

/// State of the config editor form.
#[derive(Debug, Clone, Default)]
pub struct ConfigForm {
    /// One string value per field in `ConfigField::ALL` order.
    pub values: Vec<String>,
    /// Selected field index.
    pub selected: usize,
    /// Whether the selected field is being edited.
    pub editing: bool,
    /// Input state while editing.
    pub input: TextInputState,
}

impl ConfigForm {
    /// Build the form from a config.
    pub fn from_config(config: &Config) -> Self {
        let values = vec![
            config.assistant.command_argv.join(" "),
            config.assistant.timeout_seconds.to_string(),
            config.evaluation.ground_truth_path.display().to_string(),
            config.evaluation.similarity_threshold.to_string(),
            config
                .schema_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        ];
        Self {
            values,
            selected: 0,
            editing: false,
            input: TextInputState::new(),
        }
    }

    /// Apply the form values to a config, validating each field.
    pub fn apply(&self, base: &Config) -> Result<Config, String> {
        let mut config = base.clone();

        let command_argv: Vec<String> = self.values[0]
            .split_whitespace()
            .map(String::from)
            .collect();
        let Some(program) = command_argv.first() else {
            return Err("assistant command is empty".into());
        };
        config.assistant.name = std::path::Path::new(program)
            .file_stem()
            .map_or_else(|| program.clone(), |s| s.to_string_lossy().to_string());
        config.assistant.command_argv = command_argv;

        config.assistant.timeout_seconds = self.values[1]
            .trim()
            .parse()
            .map_err(|_| format!("invalid timeout: {}", self.values[1]))?;

        config.evaluation.ground_truth_path = PathBuf::from(self.values[2].trim());

        let threshold: f64 = self.values[3]
            .trim()
            .parse()
            .map_err(|_| format!("invalid threshold: {}", self.values[3]))?;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(format!("threshold must be between 0 and 1: {threshold}"));
        }
        config.evaluation.similarity_threshold = threshold;

        let schema = self.values[4].trim();
        config.schema_path = if schema.is_empty() {
            None
        } else {
            Some(PathBuf::from(schema))
        };

        Ok(config)
    }

    /// Selected field.
    pub fn field(&self) -> ConfigField {
        ConfigField::ALL[self.selected]
    }

    /// Move selection up.
    pub fn select_prev(&mut self) {
        if !self.editing && self.selected > 0 {
            self.selected -= 1;
        }
    }

    /// Move selection down.
    pub fn select_next(&mut self) {
        if !self.editing && self.selected + 1 < ConfigField::ALL.len() {
            self.selected += 1;
        }
    }

    /// Start editing the selected field.
    pub fn begin_edit(&mut self) {
        self.input.set(self.values[self.selected].clone());
        self.editing = true;
    }

    /// Commit the edit into the field value.
    pub fn commit_edit(&mut self) {
        if self.editing {
            self.values[self.selected] = self.input.take();
            self.editing = false;
        }
    }

    /// Discard the edit.
    pub fn cancel_edit(&mut self) {
        if self.editing {
            self.input.clear();
            self.editing = false;
        }
    }
}

/// Application state.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug)]
pub struct App {
    /// Whether the app should quit.
    pub should_quit: bool,

    /// Whether the help overlay is visible.
    pub show_help: bool,

    /// Which main panel the center column shows.
    pub view: View,

    /// Which pane has keyboard focus.
    pub focus: FocusedPane,

    /// Workspace root.
    pub workspace_path: PathBuf,

    /// Current configuration.
    pub config: Config,

    /// Whether a config file exists on disk.
    pub config_exists: bool,

    /// Config editor form state.
    pub config_form: ConfigForm,

    /// Thread persistence (absent when the data directory is unusable).
    pub history: Option<HistoryStore>,

    /// Saved thread summaries, newest first.
    pub threads: Vec<ThreadSummary>,

    /// Selected row in the history panel.
    pub selected_thread: usize,

    /// Current conversation.
    pub thread: Thread,

    /// Chat input state.
    pub input_state: TextInputState,

    /// Whether an assistant request is in flight.
    pub chat_in_progress: bool,

    /// Scroll offset for the transcript.
    pub transcript_scroll: usize,

    /// Backend-updates feed (bounded to `MAX_UPDATES`).
    pub updates: VecDeque<UpdateEntry>,

    /// Notification message shown in the status bar.
    pub notification: Option<String>,

    /// Ticks remaining until the notification is cleared.
    notification_ttl: usize,

    /// Tick counter for animations.
    pub tick: usize,

    /// Whether an evaluation run is active.
    pub eval_running: bool,

    /// Whether a cancel has been requested (prevents spamming).
    pub eval_cancel_requested: bool,

    /// Total cases in the active evaluation.
    pub eval_total: usize,

    /// Cases finished in the active evaluation.
    pub eval_done: usize,

    /// Handle for cancelling the evaluation (if active).
    eval_handle: Option<EvalHandle>,

    /// Channel receiver for engine events.
    update_rx: Option<mpsc::UnboundedReceiver<UpdateEvent>>,
}

impl App {
    /// Create a new app instance rooted at the given workspace.
    pub fn new(workspace_path: PathBuf) -> Self {
        let config_path = workspace_path.join(DATA_DIR).join("config.json");
        let config_exists = config_path.exists();
        let config = Config::load(&config_path).unwrap_or_default();

        let history = HistoryStore::new(workspace_path.join(DATA_DIR).join("history")).ok();
        let threads = history
            .as_ref()
            .and_then(|store| store.list().ok())
            .unwrap_or_default();

        Self {
            should_quit: false,
            show_help: false,
            view: View::default(),
            focus: FocusedPane::default(),
            workspace_path,
            config_form: ConfigForm::from_config(&config),
            config,
            config_exists,
            history,
            threads,
            selected_thread: 0,
            thread: Thread::new(),
            input_state: TextInputState::new(),
            chat_in_progress: false,
            transcript_scroll: 0,
            updates: VecDeque::new(),
            notification: None,
            notification_ttl: 0,
            tick: 0,
            eval_running: false,
            eval_cancel_requested: false,
            eval_total: 0,
            eval_done: 0,
            eval_handle: None,
            update_rx: None,
        }
    }

    /// Handle an action.
    pub fn handle_action(&mut self, action: Action) {
        // Global actions
        match action {
            Action::Quit => {
                self.save_current_thread();
                self.should_quit = true;
                return;
            }
            Action::Help => {
                self.show_help = !self.show_help;
                return;
            }
            _ => {}
        }

        // If help is showing, any key closes it
        if self.show_help {
            self.show_help = false;
            return;
        }

        match action {
            Action::ChatView => self.show_chat_view(),
            Action::ConfigView => self.show_config_view(),
            Action::ToggleFocus => self.focus = self.focus.toggle(),
            Action::NewThread => self.start_new_thread(),
            Action::Evaluate => self.toggle_evaluation(),
            Action::SaveConfig => self.save_config(),
            Action::Select => self.handle_select(),
            Action::Back => self.handle_back(),
            Action::Up => self.handle_up(),
            Action::Down => self.handle_down(),
            Action::Quit | Action::Help | Action::None => {}
        }
    }

    /// Switch the center column to the chat interface.
    fn show_chat_view(&mut self) {
        if self.view != View::Chat {
            self.view = View::Chat;
        }
    }

    /// Switch the center column to the config editor.
    fn show_config_view(&mut self) {
        if self.view != View::Config {
            self.view = View::Config;
            // Re-seed the form so it reflects the config as saved
            self.config_form = ConfigForm::from_config(&self.config);
        }
    }

    fn handle_select(&mut self) {
        if self.focus == FocusedPane::History {
            self.open_selected_thread();
        } else if self.view == View::Config {
            if self.config_form.editing {
                self.config_form.commit_edit();
            } else {
                self.config_form.begin_edit();
            }
        }
    }

    fn handle_back(&mut self) {
        if self.config_form.editing {
            self.config_form.cancel_edit();
        } else {
            self.save_current_thread();
            self.should_quit = true;
        }
    }

    fn handle_up(&mut self) {
        if self.focus == FocusedPane::History {
            self.selected_thread = self.selected_thread.saturating_sub(1);
        } else if self.view == View::Config {
            self.config_form.select_prev();
        } else if self.transcript_scroll > 0 {
            self.transcript_scroll -= 1;
        }
    }

    fn handle_down(&mut self) {
        if self.focus == FocusedPane::History {
            if self.selected_thread + 1 < self.threads.len() {
                self.selected_thread += 1;
            }
        } else if self.view == View::Config {
            self.config_form.select_next();
        } else {
            // Bound scroll so at least one line stays visible
            let max_scroll = self.transcript_line_estimate().saturating_sub(1);
            if self.transcript_scroll < max_scroll {
                self.transcript_scroll += 1;
            }
        }
    }

    /// Rough transcript length, used to bound scrolling.
    fn transcript_line_estimate(&self) -> usize {
        self.thread
            .messages
            .iter()
            .map(|m| m.content.lines().count() + 1)
            .sum()
    }

    // === Threads ===

    /// Add a user message to the current thread.
    pub fn add_user_message(&mut self, content: String) {
        self.thread.add_message(ChatMessage::user(content));
        self.scroll_transcript_to_bottom();
    }

    /// Record a completed assistant reply.
    pub fn add_assistant_reply(&mut self, reply: &AssistantReply) {
        let detail = if reply.sql.is_some() {
            "SQL extracted"
        } else {
            "no SQL in reply"
        };
        self.push_update(
            UpdateKind::Success,
            format!("{} replied ({}ms, {detail})", reply.assistant, reply.duration_ms),
        );
        self.thread
            .add_message(ChatMessage::assistant(reply.content.clone(), reply.assistant.clone()));
        self.save_current_thread();
        self.scroll_transcript_to_bottom();
    }

    /// Record a failed assistant invocation.
    pub fn add_assistant_error(&mut self, error: &str) {
        self.push_update(UpdateKind::Error, format!("assistant error: {error}"));
        self.thread
            .add_message(ChatMessage::assistant(format!("Error: {error}"), "error"));
        self.scroll_transcript_to_bottom();
    }

    fn scroll_transcript_to_bottom(&mut self) {
        self.transcript_scroll = self.transcript_line_estimate().saturating_sub(10);
    }

    /// Persist the current thread and refresh the history listing.
    pub fn save_current_thread(&mut self) {
        if self.thread.messages.is_empty() {
            return;
        }
        let Some(store) = self.history.clone() else {
            return;
        };
        match store.save(&self.thread) {
            Ok(()) => self.refresh_threads(),
            Err(e) => self.set_notification(format!("Failed to save thread: {e}")),
        }
    }

    fn refresh_threads(&mut self) {
        if let Some(store) = &self.history {
            if let Ok(threads) = store.list() {
                self.threads = threads;
            }
        }
        if self.selected_thread >= self.threads.len() {
            self.selected_thread = self.threads.len().saturating_sub(1);
        }
    }

    fn start_new_thread(&mut self) {
        self.save_current_thread();
        self.thread = Thread::new();
        self.transcript_scroll = 0;
        self.view = View::Chat;
        self.focus = FocusedPane::Main;
        self.set_notification("Started a new conversation".into());
    }

    fn open_selected_thread(&mut self) {
        let Some(summary) = self.threads.get(self.selected_thread) else {
            return;
        };
        let id = summary.id.clone();
        if id == self.thread.id {
            self.focus = FocusedPane::Main;
            self.view = View::Chat;
            return;
        }

        let Some(store) = self.history.clone() else {
            return;
        };
        self.save_current_thread();
        match store.load(&id) {
            Ok(thread) => {
                let title = thread.title.clone();
                self.thread = thread;
                self.view = View::Chat;
                self.focus = FocusedPane::Main;
                self.scroll_transcript_to_bottom();
                self.set_notification(format!("Opened: {title}"));
            }
            Err(e) => self.set_notification(format!("Failed to open thread: {e}")),
        }
    }

    // === Config ===

    fn config_path(&self) -> PathBuf {
        self.workspace_path.join(DATA_DIR).join("config.json")
    }

    /// Validate the form and save the configuration.
    ///
    /// Note: this performs blocking file I/O, but config files are small so
    /// the brief block is acceptable.
    pub fn save_config(&mut self) {
        if self.view != View::Config {
            return;
        }
        self.config_form.commit_edit();

        match self.config_form.apply(&self.config) {
            Ok(config) => match config.save(&self.config_path()) {
                Ok(()) => {
                    self.config = config;
                    self.config_exists = true;
                    self.set_notification("Config saved".into());
                    self.push_update(UpdateKind::Success, "Configuration saved".into());
                }
                Err(e) => self.set_notification(format!("Failed to save config: {e}")),
            },
            Err(e) => self.set_notification(format!("Invalid config: {e}")),
        }
    }

    // === Evaluation ===

    /// Start an evaluation run, or request cancellation of the active one.
    pub fn toggle_evaluation(&mut self) {
        if self.eval_running {
            self.request_cancel_evaluation();
            return;
        }

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let handle = start_evaluation(self.config.clone(), EvalOptions::default(), event_tx);

        self.eval_handle = Some(handle);
        self.update_rx = Some(event_rx);
        self.eval_running = true;
        self.eval_cancel_requested = false;
        self.eval_total = 0;
        self.eval_done = 0;
        self.push_update(UpdateKind::Info, "Evaluation starting...".into());
    }

    fn request_cancel_evaluation(&mut self) {
        if self.eval_cancel_requested {
            return;
        }
        let sent = self.eval_handle.as_ref().is_some_and(|h| h.try_cancel());
        if sent {
            self.eval_cancel_requested = true;
            self.push_update(UpdateKind::Info, "Cancel requested...".into());
        }
    }

    /// Process any pending engine events.
    pub fn process_engine_events(&mut self) {
        // Collect first to avoid borrowing self across the handler
        let events: Vec<UpdateEvent> = {
            let Some(rx) = &mut self.update_rx else {
                return;
            };
            let mut events = Vec::new();
            while let Ok(event) = rx.try_recv() {
                events.push(event);
            }
            events
        };

        for event in events {
            self.handle_engine_event(event);
        }
    }

    fn handle_engine_event(&mut self, event: UpdateEvent) {
        match event {
            UpdateEvent::EvalStarted { total } => {
                self.eval_total = total;
                self.eval_done = 0;
                self.push_update(UpdateKind::Info, format!("Evaluation started ({total} cases)"));
            }
            UpdateEvent::CaseEvaluated { result } => {
                self.eval_done += 1;
                let index = result.index + 1;
                let entry = match (result.passed, result.similarity, &result.error) {
                    (true, Some(sim), _) => (
                        UpdateKind::Success,
                        format!("Case {index}: pass (similarity {sim:.2})"),
                    ),
                    (false, Some(sim), _) => (
                        UpdateKind::Error,
                        format!("Case {index}: fail (similarity {sim:.2})"),
                    ),
                    (_, None, Some(error)) => {
                        (UpdateKind::Error, format!("Case {index}: fail ({error})"))
                    }
                    (_, None, None) => (UpdateKind::Error, format!("Case {index}: fail")),
                };
                self.push_update(entry.0, entry.1);
            }
            UpdateEvent::EvalCompleted { report } => {
                self.finish_evaluation();
                self.push_update(
                    UpdateKind::Success,
                    format!(
                        "Evaluation complete: {}/{} passed, avg similarity {:.2}",
                        report.successful, report.total, report.average_similarity
                    ),
                );
            }
            UpdateEvent::EvalCancelled { report } => {
                self.finish_evaluation();
                self.push_update(
                    UpdateKind::Info,
                    format!("Evaluation cancelled after {} cases", report.total),
                );
            }
            UpdateEvent::EvalFailed { error } => {
                self.finish_evaluation();
                self.push_update(UpdateKind::Error, format!("Evaluation failed: {error}"));
            }
            UpdateEvent::Status { message } => {
                self.push_update(UpdateKind::Info, message);
            }
        }
    }

    fn finish_evaluation(&mut self) {
        self.eval_running = false;
        self.eval_cancel_requested = false;
        self.eval_handle = None;
        self.update_rx = None;
    }

    // === Updates feed ===

    /// Push an entry to the updates feed, dropping the oldest at capacity.
    pub fn push_update(&mut self, kind: UpdateKind, message: String) {
        if self.updates.len() >= MAX_UPDATES {
            self.updates.pop_front();
        }
        self.updates.push_back(UpdateEntry {
            timestamp: Local::now(),
            kind,
            message,
        });
    }

    // === Housekeeping ===

    /// Set a temporary notification message.
    pub fn set_notification(&mut self, msg: String) {
        self.notification = Some(msg);
        // ~3 seconds at the 250ms tick rate
        self.notification_ttl = 12;
    }

    /// Increment the tick counter and update time-based state.
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);

        if self.notification_ttl > 0 {
            self.notification_ttl -= 1;
            if self.notification_ttl == 0 {
                self.notification = None;
            }
        }

        self.process_engine_events();
    }

    /// Name of the configured assistant, for the status bar.
    pub fn assistant_name(&self) -> &str {
        &self.config.assistant.name
    }

    /// Create an app for tests without touching the filesystem.
    #[doc(hidden)]
    pub fn new_for_test() -> Self {
        use chrono::Utc;

        let config = Config {
            assistant: AssistantConfig::default_for("claude"),
            ..Config::default()
        };

        let threads = vec![
            ThreadSummary {
                id: "thread-recent".into(),
                title: "Top customers by revenue".into(),
                messages: 4,
                updated_at: Utc::now(),
            },
            ThreadSummary {
                id: "thread-older".into(),
                title: "Orders shipped last week".into(),
                messages: 2,
                updated_at: Utc::now() - chrono::Duration::hours(3),
            },
        ];

        Self {
            should_quit: false,
            show_help: false,
            view: View::default(),
            focus: FocusedPane::default(),
            workspace_path: PathBuf::from("."),
            config_form: ConfigForm::from_config(&config),
            config,
            config_exists: true,
            history: None,
            threads,
            selected_thread: 0,
            thread: Thread::new(),
            input_state: TextInputState::new(),
            chat_in_progress: false,
            transcript_scroll: 0,
            updates: VecDeque::new(),
            notification: None,
            notification_ttl: 0,
            tick: 0,
            eval_running: false,
            eval_cancel_requested: false,
            eval_total: 0,
            eval_done: 0,
            eval_handle: None,
            update_rx: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_view_is_chat() {
        let app = App::new_for_test();
        assert_eq!(app.view, View::Chat);
        assert_eq!(app.focus, FocusedPane::Main);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_view_toggle_roundtrip() {
        let mut app = App::new_for_test();

        app.handle_action(Action::ConfigView);
        assert_eq!(app.view, View::Config);

        app.handle_action(Action::ChatView);
        assert_eq!(app.view, View::Chat);
    }

    #[test]
    fn test_activating_current_view_is_noop() {
        let mut app = App::new_for_test();
        assert_eq!(app.view, View::Chat);

        app.handle_action(Action::ChatView);
        assert_eq!(app.view, View::Chat);

        app.handle_action(Action::ConfigView);
        app.config_form.selected = 2;
        app.handle_action(Action::ConfigView);
        // Re-activating must not reset the form
        assert_eq!(app.config_form.selected, 2);
    }

    #[test]
    fn test_focus_toggle() {
        let mut app = App::new_for_test();
        app.handle_action(Action::ToggleFocus);
        assert_eq!(app.focus, FocusedPane::History);
        app.handle_action(Action::ToggleFocus);
        assert_eq!(app.focus, FocusedPane::Main);
    }

    #[test]
    fn test_history_selection_bounds() {
        let mut app = App::new_for_test();
        app.focus = FocusedPane::History;

        app.handle_action(Action::Up);
        assert_eq!(app.selected_thread, 0);

        app.handle_action(Action::Down);
        assert_eq!(app.selected_thread, 1);

        app.handle_action(Action::Down);
        assert_eq!(app.selected_thread, 1);
    }

    #[test]
    fn test_help_closes_before_other_actions() {
        let mut app = App::new_for_test();
        app.handle_action(Action::Help);
        assert!(app.show_help);

        app.handle_action(Action::ConfigView);
        assert!(!app.show_help);
        // The action only dismissed the overlay
        assert_eq!(app.view, View::Chat);
    }

    #[test]
    fn test_quit_action() {
        let mut app = App::new_for_test();
        app.handle_action(Action::Quit);
        assert!(app.should_quit);
    }

    #[test]
    fn test_config_form_roundtrip() {
        let config = Config::default();
        let form = ConfigForm::from_config(&config);
        let applied = form.apply(&config).unwrap();
        assert_eq!(applied.assistant.command_argv, config.assistant.command_argv);
        assert!(
            (applied.evaluation.similarity_threshold - config.evaluation.similarity_threshold)
                .abs()
                < f64::EPSILON
        );
    }

    #[test]
    fn test_config_form_rejects_bad_values() {
        let config = Config::default();
        let mut form = ConfigForm::from_config(&config);

        form.values[1] = "not a number".into();
        assert!(form.apply(&config).is_err());

        form.values[1] = "300".into();
        form.values[3] = "1.5".into();
        assert!(form.apply(&config).is_err());

        form.values[3] = "0.9".into();
        form.values[0] = "  ".into();
        assert!(form.apply(&config).is_err());
    }

    #[test]
    fn test_config_form_edit_cycle() {
        let mut app = App::new_for_test();
        app.handle_action(Action::ConfigView);

        app.handle_action(Action::Down);
        assert_eq!(app.config_form.field(), ConfigField::TimeoutSeconds);

        app.handle_action(Action::Select);
        assert!(app.config_form.editing);
        assert_eq!(app.config_form.input.content(), "300");

        app.config_form.input.set("120");
        app.handle_action(Action::Select);
        assert!(!app.config_form.editing);
        assert_eq!(app.config_form.values[1], "120");

        // Esc while editing cancels instead of quitting
        app.handle_action(Action::Select);
        app.config_form.input.set("999");
        app.handle_action(Action::Back);
        assert!(!app.config_form.editing);
        assert!(!app.should_quit);
        assert_eq!(app.config_form.values[1], "120");
    }

    #[test]
    fn test_updates_feed_is_bounded() {
        let mut app = App::new_for_test();
        for i in 0..(MAX_UPDATES + 10) {
            app.push_update(UpdateKind::Info, format!("entry {i}"));
        }
        assert_eq!(app.updates.len(), MAX_UPDATES);
        assert_eq!(app.updates.front().unwrap().message, "entry 10");
    }

    #[test]
    fn test_engine_events_update_feed_and_progress() {
        use querybench_engine::{CaseResult, EvalReport};

        let mut app = App::new_for_test();
        app.eval_running = true;

        app.handle_engine_event(UpdateEvent::EvalStarted { total: 2 });
        assert_eq!(app.eval_total, 2);

        app.handle_engine_event(UpdateEvent::CaseEvaluated {
            result: CaseResult {
                index: 0,
                input: "q".into(),
                expected_sql: "SELECT 1".into(),
                assistant_sql: Some("SELECT 1".into()),
                similarity: Some(1.0),
                passed: true,
                error: None,
            },
        });
        assert_eq!(app.eval_done, 1);

        app.handle_engine_event(UpdateEvent::EvalCompleted {
            report: EvalReport::from_results(Vec::new(), false, 0),
        });
        assert!(!app.eval_running);
        assert!(app
            .updates
            .iter()
            .any(|e| e.message.contains("Evaluation complete")));
    }

    #[test]
    fn test_app_new_bootstraps_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let app = App::new(dir.path().to_path_buf());

        assert!(!app.config_exists);
        assert_eq!(app.view, View::Chat);
        assert!(app.history.is_some());
        assert!(dir.path().join(DATA_DIR).join("history").exists());
        assert!(app.threads.is_empty());
    }

    #[test]
    fn test_notification_ttl() {
        let mut app = App::new_for_test();
        app.set_notification("saved".into());
        assert!(app.notification.is_some());

        for _ in 0..12 {
            app.tick();
        }
        assert!(app.notification.is_none());
    }
}
