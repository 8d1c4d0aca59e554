use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io::Result;
use std::time::Duration;

use crate::state::ConsoleState;

/// Actions that can be triggered by key events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    SelectNext,
    SelectPrevious,
    SelectFirst,
    SelectLast,
    /// Open the drawer on a call (or switch the open drawer to it)
    OpenCall { call_id: String },
    CloseDrawer,
    /// Reload from the call source after a failure
    Retry,
}

/// Event handler for the console
pub struct EventHandler;

impl EventHandler {
    /// Read a single terminal event, waiting at most `timeout`
    pub fn read(timeout: Duration) -> Result<Option<Event>> {
        if crossterm::event::poll(timeout)? { Ok(Some(crossterm::event::read()?)) } else { Ok(None) }
    }

    /// Map a key press to an action, given what is on screen
    pub fn handle_key_event(event: KeyEvent, state: &ConsoleState) -> Option<KeyAction> {
        if event.kind != KeyEventKind::Press {
            return None;
        }

        if event.modifiers.contains(KeyModifiers::CONTROL) {
            return match event.code {
                KeyCode::Char('c') => Some(KeyAction::Quit),
                _ => None,
            };
        }

        match event.code {
            KeyCode::Char('q') => Some(KeyAction::Quit),
            KeyCode::Down | KeyCode::Char('j') => Some(KeyAction::SelectNext),
            KeyCode::Up | KeyCode::Char('k') => Some(KeyAction::SelectPrevious),
            KeyCode::Home | KeyCode::Char('g') => Some(KeyAction::SelectFirst),
            KeyCode::End | KeyCode::Char('G') => Some(KeyAction::SelectLast),
            KeyCode::Enter => {
                let call = state.selected_call()?;
                if state.open_call_id() == Some(call.id.as_str()) {
                    return None;
                }
                Some(KeyAction::OpenCall { call_id: call.id.clone() })
            }
            KeyCode::Esc if state.is_drawer_open() => Some(KeyAction::CloseDrawer),
            KeyCode::Char('r') if state.feed_status.can_retry() => Some(KeyAction::Retry),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::FeedStatus;
    use dispatch_core::Call;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn loaded_state() -> ConsoleState {
        let mut state = ConsoleState::new("test");
        state.store.initialize(vec![Call::new("a"), Call::new("b")]).unwrap();
        state.feed_status = FeedStatus::Live;
        state
    }

    #[test]
    fn test_navigation_keys() {
        let state = loaded_state();
        assert_eq!(EventHandler::handle_key_event(press(KeyCode::Char('j')), &state), Some(KeyAction::SelectNext));
        assert_eq!(EventHandler::handle_key_event(press(KeyCode::Down), &state), Some(KeyAction::SelectNext));
        assert_eq!(EventHandler::handle_key_event(press(KeyCode::Char('k')), &state), Some(KeyAction::SelectPrevious));
        assert_eq!(EventHandler::handle_key_event(press(KeyCode::Home), &state), Some(KeyAction::SelectFirst));
        assert_eq!(EventHandler::handle_key_event(press(KeyCode::Char('G')), &state), Some(KeyAction::SelectLast));
    }

    #[test]
    fn test_quit_keys() {
        let state = loaded_state();
        assert_eq!(EventHandler::handle_key_event(press(KeyCode::Char('q')), &state), Some(KeyAction::Quit));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(EventHandler::handle_key_event(ctrl_c, &state), Some(KeyAction::Quit));
    }

    #[test]
    fn test_enter_opens_selected_call_once() {
        let mut state = loaded_state();
        assert_eq!(
            EventHandler::handle_key_event(press(KeyCode::Enter), &state),
            Some(KeyAction::OpenCall { call_id: "a".to_string() })
        );

        state.open("a");
        assert_eq!(EventHandler::handle_key_event(press(KeyCode::Enter), &state), None);
    }

    #[test]
    fn test_enter_without_calls_does_nothing() {
        let state = ConsoleState::new("test");
        assert_eq!(EventHandler::handle_key_event(press(KeyCode::Enter), &state), None);
    }

    #[test]
    fn test_escape_only_closes_open_drawer() {
        let mut state = loaded_state();
        assert_eq!(EventHandler::handle_key_event(press(KeyCode::Esc), &state), None);

        state.open("b");
        assert_eq!(EventHandler::handle_key_event(press(KeyCode::Esc), &state), Some(KeyAction::CloseDrawer));
    }

    #[test]
    fn test_retry_only_when_feed_is_down() {
        let mut state = loaded_state();
        assert_eq!(EventHandler::handle_key_event(press(KeyCode::Char('r')), &state), None);

        state.feed_status = FeedStatus::Failed("refused".to_string());
        assert_eq!(EventHandler::handle_key_event(press(KeyCode::Char('r')), &state), Some(KeyAction::Retry));
    }

    #[test]
    fn test_release_events_are_ignored() {
        let state = loaded_state();
        let mut release = press(KeyCode::Char('q'));
        release.kind = KeyEventKind::Release;
        assert_eq!(EventHandler::handle_key_event(release, &state), None);
    }
}
