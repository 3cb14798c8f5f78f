//! Terminal event plumbing and the key-to-action table.

use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use std::time::Duration;
use tokio::sync::mpsc;

/// Input and timing events delivered to the main loop.
#[derive(Debug, Clone)]
pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// Fires when no input arrived within the tick interval.
    Tick,
    Resize(u16, u16),
}

/// Forwards crossterm events from a dedicated poll thread.
///
/// Crossterm reads are blocking, so they live on their own thread; the
/// async side only ever awaits the channel.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    /// Spawn the poll thread with the given tick interval.
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        std::thread::spawn(move || forward_events(&tx, Duration::from_millis(tick_rate_ms)));
        Self { rx }
    }

    /// Next event, or `None` once the poll thread has gone away.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

/// Poll-and-forward loop; exits when the receiving side is dropped.
fn forward_events(tx: &mpsc::UnboundedSender<Event>, tick: Duration) {
    loop {
        let sent = if event::poll(tick).unwrap_or(false) {
            match event::read() {
                Ok(CrosstermEvent::Key(key)) => tx.send(Event::Key(key)),
                Ok(CrosstermEvent::Mouse(mouse)) => tx.send(Event::Mouse(mouse)),
                Ok(CrosstermEvent::Resize(w, h)) => tx.send(Event::Resize(w, h)),
                _ => Ok(()),
            }
        } else {
            tx.send(Event::Tick)
        };
        if sent.is_err() {
            break;
        }
    }
}

/// Key action that can be performed in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Help,
    /// Show the chat interface in the center column.
    ChatView,
    /// Show the config editor in the center column.
    ConfigView,
    /// Move focus between the center panel and the history panel.
    ToggleFocus,
    /// Start a fresh conversation.
    NewThread,
    /// Start (or cancel) an evaluation run.
    Evaluate,
    /// Save the config form.
    SaveConfig,
    Select,
    Back,
    Up,
    Down,
    None,
}

/// Convert a key event to an action.
pub fn key_to_action(key: KeyEvent) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Action::Quit,
            KeyCode::Char('n') => Action::NewThread,
            KeyCode::Char('r') => Action::Evaluate,
            KeyCode::Char('s') => Action::SaveConfig,
            _ => Action::None,
        };
    }

    match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('?') => Action::Help,
        KeyCode::Char('1') | KeyCode::F(1) => Action::ChatView,
        KeyCode::Char('2') | KeyCode::F(2) => Action::ConfigView,
        KeyCode::Tab => Action::ToggleFocus,
        KeyCode::Esc => Action::Back,
        KeyCode::Enter => Action::Select,
        KeyCode::Up | KeyCode::Char('k') => Action::Up,
        KeyCode::Down | KeyCode::Char('j') => Action::Down,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_keys() {
        let key = KeyEvent::new(KeyCode::Char('1'), KeyModifiers::NONE);
        assert_eq!(key_to_action(key), Action::ChatView);

        let key = KeyEvent::new(KeyCode::F(2), KeyModifiers::NONE);
        assert_eq!(key_to_action(key), Action::ConfigView);
    }

    #[test]
    fn test_control_combos() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key_to_action(key), Action::Quit);

        let key = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert_eq!(key_to_action(key), Action::SaveConfig);

        let key = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL);
        assert_eq!(key_to_action(key), Action::None);
    }

    #[test]
    fn test_plain_keys() {
        let key = KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE);
        assert_eq!(key_to_action(key), Action::ToggleFocus);

        let key = KeyEvent::new(KeyCode::Char('z'), KeyModifiers::NONE);
        assert_eq!(key_to_action(key), Action::None);
    }
}
