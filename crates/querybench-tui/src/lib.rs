//! querybench-tui: Terminal UI for the querybench SQL assistant workbench
//!
//! This crate provides the TUI layer for querybench, including:
//! - The three-column view shell (navigation + history | main panel | updates)
//! - Chat interface and config editor panels
//! - Shared widgets and theme

mod app;
mod event;
mod panels;
mod shell;
#[cfg(test)]
pub mod test_utils;
mod ui;

pub use app::{App, FocusedPane, UpdateEntry, UpdateKind, View};
pub use event::{key_to_action, Action, Event, EventHandler};
pub use querybench_engine;
pub use shell::{hit_test, render_shell, shell_layout, MouseTarget, ShellLayout};

use crate::ui::widgets::TextInputState;
use crossterm::{
    cursor::Show as ShowCursor,
    event::{DisableMouseCapture, EnableMouseCapture, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use querybench_engine::{invoke_assistant, AssistantReply, ChatError};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::io::{self, stdout};
use std::path::Path;

/// Tick interval for the event loop (4 Hz).
const TICK_MS: u64 = 250;

type ChatTask = tokio::task::JoinHandle<Result<AssistantReply, ChatError>>;

/// Restores the terminal even when the loop exits by error or panic.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableMouseCapture, LeaveAlternateScreen, ShowCursor);
        let _ = disable_raw_mode();
    }
}

/// Run the TUI application against a workspace directory.
pub async fn run_tui(workspace_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let _guard = TerminalGuard;
    execute!(stdout(), EnterAlternateScreen, EnableMouseCapture)?;

    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    let mut app = App::new(workspace_path.to_path_buf());
    let mut events = EventHandler::new(TICK_MS);

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    terminal.show_cursor()?;
    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut chat_tasks: Vec<ChatTask> = Vec::new();

    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            render_shell(app, area, frame.buffer_mut());
        })?;

        if let Some(event) = events.next().await {
            match event {
                Event::Key(key) => {
                    // Text inputs get first refusal on plain keys; whatever
                    // they decline goes through the action table.
                    let captured = match app.view {
                        View::Chat => {
                            app.focus == FocusedPane::Main
                                && !app.chat_in_progress
                                && handle_chat_key(app, key, &mut chat_tasks)
                        }
                        View::Config => {
                            app.config_form.editing && handle_config_edit_key(app, key)
                        }
                    };
                    if !captured {
                        app.handle_action(event::key_to_action(key));
                    }
                }
                Event::Mouse(mouse) => handle_mouse(app, terminal, mouse),
                Event::Tick => app.tick(),
                Event::Resize(_, _) => {
                    // The next draw picks up the new size
                }
            }
        }

        join_finished_chats(app, &mut chat_tasks).await;

        if app.should_quit {
            for task in chat_tasks {
                task.abort();
            }
            break;
        }
    }

    Ok(())
}

/// Fold completed assistant invocations into the app state.
async fn join_finished_chats(app: &mut App, chat_tasks: &mut Vec<ChatTask>) {
    let mut i = 0;
    while i < chat_tasks.len() {
        if !chat_tasks[i].is_finished() {
            i += 1;
            continue;
        }
        if let Ok(result) = chat_tasks.swap_remove(i).await {
            match result {
                Ok(reply) => app.add_assistant_reply(&reply),
                Err(e) => app.add_assistant_error(&e.to_string()),
            }
            app.chat_in_progress = false;
        }
    }
}

/// Apply a plain editing key to a text input.
///
/// Returns false for keys the input does not understand; those fall through
/// to the action table.
fn apply_edit_key(input: &mut TextInputState, code: KeyCode) -> bool {
    match code {
        KeyCode::Char(c) => input.insert(c),
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        KeyCode::Home => input.move_home(),
        KeyCode::End => input.move_end(),
        _ => return false,
    }
    true
}

/// Key handling for the chat input box.
///
/// Returns true if the key was consumed by the input.
fn handle_chat_key(
    app: &mut App,
    key: crossterm::event::KeyEvent,
    chat_tasks: &mut Vec<ChatTask>,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        // Ctrl+Enter inserts a newline; every other control combo is an
        // action (Ctrl+C, Ctrl+R, ...)
        if key.code == KeyCode::Enter {
            app.input_state.insert('\n');
            return true;
        }
        return false;
    }

    match key.code {
        // These stay actions even while typing
        KeyCode::Esc | KeyCode::Tab | KeyCode::F(_) => false,

        KeyCode::Enter => {
            if !app.input_state.is_empty() {
                let content = app.input_state.submit();
                app.add_user_message(content);
                chat_tasks.push(spawn_chat_turn(app));
            }
            true
        }

        // Recall input history when the box is empty; otherwise let the
        // action table scroll the transcript.
        KeyCode::Up if app.input_state.is_empty() => {
            app.input_state.history_prev();
            true
        }
        KeyCode::Down if app.input_state.is_empty() => {
            app.input_state.history_next();
            true
        }
        KeyCode::Up | KeyCode::Down => false,

        code => apply_edit_key(&mut app.input_state, code),
    }
}

/// Spawn an assistant invocation for the current thread.
fn spawn_chat_turn(app: &mut App) -> ChatTask {
    let assistant = app.config.assistant.clone();
    let schema = app.config.read_schema();
    let prompt = app.thread.build_prompt(schema.as_deref());

    app.chat_in_progress = true;
    tokio::spawn(async move { invoke_assistant(&assistant, &prompt).await })
}

/// Key handling while a config field is being edited.
///
/// Returns true if the key was consumed by the field input.
fn handle_config_edit_key(app: &mut App, key: crossterm::event::KeyEvent) -> bool {
    // Control combos fall through so Ctrl+S can commit-and-save
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return false;
    }

    match key.code {
        // Enter commits, Esc cancels - both via the action handler
        KeyCode::Esc | KeyCode::Enter => false,
        code => apply_edit_key(&mut app.config_form.input, code),
    }
}

/// Translate mouse events into app updates.
fn handle_mouse(
    app: &mut App,
    terminal: &Terminal<CrosstermBackend<io::Stdout>>,
    mouse: crossterm::event::MouseEvent,
) {
    use crossterm::event::{MouseButton, MouseEventKind};

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let Ok(size) = terminal.size() else {
                return;
            };
            let area = Rect::new(0, 0, size.width, size.height);
            match hit_test(area, mouse.column, mouse.row) {
                Some(MouseTarget::NavChat) => app.handle_action(Action::ChatView),
                Some(MouseTarget::NavConfig) => app.handle_action(Action::ConfigView),
                Some(MouseTarget::History) => app.focus = FocusedPane::History,
                Some(MouseTarget::Main) => app.focus = FocusedPane::Main,
                Some(MouseTarget::Updates) | None => {}
            }
        }
        MouseEventKind::ScrollUp => app.handle_action(Action::Up),
        MouseEventKind::ScrollDown => app.handle_action(Action::Down),
        _ => {}
    }
}

/// Get the TUI version.
pub fn tui_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tui_version() {
        let version = tui_version();
        assert!(!version.is_empty());
        assert!(version.starts_with("0."));
    }

    #[test]
    fn test_edit_keys_reach_the_input() {
        let mut input = TextInputState::new();
        assert!(apply_edit_key(&mut input, KeyCode::Char('a')));
        assert!(apply_edit_key(&mut input, KeyCode::Char('b')));
        assert!(apply_edit_key(&mut input, KeyCode::Backspace));
        assert_eq!(input.content(), "a");

        assert!(!apply_edit_key(&mut input, KeyCode::PageUp));
    }
}

/// Rendering tests for the shell composition contract.
#[cfg(test)]
mod render_tests {
    use crate::event::Action;
    use crate::test_utils::{create_test_app, render_shell_to_string, render_shell_to_string_sized};

    #[test]
    fn test_initial_render_shows_chat_view() {
        let app = create_test_app();
        let screen = render_shell_to_string(&app);

        // Chat navigation entry is active, config inactive
        assert!(screen.contains("> Chat Interface"));
        assert!(screen.contains("Config Editor"));
        assert!(!screen.contains("> Config Editor"));

        // Center column shows the chat interface
        assert!(screen.contains(" Chat "));
        assert!(screen.contains(" Input "));
    }

    #[test]
    fn test_side_panels_always_rendered() {
        let mut app = create_test_app();

        let chat_screen = render_shell_to_string(&app);
        assert!(chat_screen.contains(" History "));
        assert!(chat_screen.contains(" Backend Updates "));

        app.handle_action(Action::ConfigView);
        let config_screen = render_shell_to_string(&app);
        assert!(config_screen.contains(" History "));
        assert!(config_screen.contains(" Backend Updates "));
    }

    #[test]
    fn test_config_view_swaps_center_panel() {
        let mut app = create_test_app();
        app.handle_action(Action::ConfigView);
        let screen = render_shell_to_string(&app);

        assert!(screen.contains(" Config Editor "));
        assert!(screen.contains("> Config Editor"));
        assert!(!screen.contains("> Chat Interface"));
        assert!(!screen.contains(" Input "));
    }

    #[test]
    fn test_view_roundtrip_restores_render() {
        let mut app = create_test_app();
        let before = render_shell_to_string(&app);

        app.handle_action(Action::ConfigView);
        app.handle_action(Action::ChatView);
        let after = render_shell_to_string(&app);

        assert_eq!(before, after);
    }

    #[test]
    fn test_reactivating_current_view_changes_nothing() {
        let mut app = create_test_app();
        let before = render_shell_to_string(&app);

        app.handle_action(Action::ChatView);
        let after = render_shell_to_string(&app);

        assert_eq!(before, after);
    }

    #[test]
    fn test_too_small_terminal() {
        let app = create_test_app();
        let screen = render_shell_to_string_sized(&app, 30, 8);
        assert!(screen.contains("Terminal too small"));
    }

    #[test]
    fn test_history_entries_rendered() {
        let app = create_test_app();
        let screen = render_shell_to_string(&app);
        assert!(screen.contains("Top customers"));
    }

    #[test]
    fn test_help_overlay() {
        let mut app = create_test_app();
        app.handle_action(Action::Help);
        let screen = render_shell_to_string(&app);
        assert!(screen.contains(" Help "));
        assert!(screen.contains("Chat interface"));
    }
}

/// Navigation tests for event handling and view transitions.
#[cfg(test)]
mod navigation_tests {
    use crate::app::{FocusedPane, View};
    use crate::event::Action;
    use crate::test_utils::create_test_app;

    #[test]
    fn test_navigation_actions_switch_views() {
        let mut app = create_test_app();
        assert_eq!(app.view, View::Chat);

        app.handle_action(Action::ConfigView);
        assert_eq!(app.view, View::Config);

        app.handle_action(Action::ChatView);
        assert_eq!(app.view, View::Chat);
    }

    #[test]
    fn test_any_click_sequence_leaves_exactly_one_view() {
        let mut app = create_test_app();
        let sequence = [
            Action::ConfigView,
            Action::ConfigView,
            Action::ChatView,
            Action::ConfigView,
            Action::ChatView,
            Action::ChatView,
        ];
        for action in sequence {
            app.handle_action(action);
            assert!(matches!(app.view, View::Chat | View::Config));
        }
        assert_eq!(app.view, View::Chat);
    }

    #[test]
    fn test_focus_toggle_keeps_view() {
        let mut app = create_test_app();
        app.handle_action(Action::ToggleFocus);
        assert_eq!(app.focus, FocusedPane::History);
        assert_eq!(app.view, View::Chat);
    }

    #[test]
    fn test_open_thread_from_history_switches_to_chat() {
        let mut app = create_test_app();
        app.handle_action(Action::ConfigView);
        app.handle_action(Action::ToggleFocus);
        assert_eq!(app.focus, FocusedPane::History);

        // Without a history store the selection cannot load, but focus and
        // view handling must not panic
        app.handle_action(Action::Select);
        assert!(matches!(app.view, View::Chat | View::Config));
    }

    #[test]
    fn test_action_none_does_nothing() {
        let mut app = create_test_app();
        let view = app.view;
        app.handle_action(Action::None);
        assert_eq!(app.view, view);
        assert!(!app.should_quit);
    }
}
