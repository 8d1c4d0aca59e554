use super::App;
use crate::event_handler::{EventHandler, KeyAction};
use crossterm::event::Event;

impl App {
    /// Handle one terminal event; returns whether the screen needs a redraw
    pub fn handle_event(&mut self, event: Event) -> bool {
        match event {
            Event::Key(key) => match EventHandler::handle_key_event(key, self.state()) {
                Some(action) => {
                    self.handle_key_action(action);
                    true
                }
                None => false,
            },
            Event::Resize(..) => true,
            _ => false,
        }
    }

    pub fn handle_key_action(&mut self, action: KeyAction) {
        match action {
            KeyAction::Quit => self.should_exit = true,
            KeyAction::SelectNext => self.state_mut().select_next(),
            KeyAction::SelectPrevious => self.state_mut().select_previous(),
            KeyAction::SelectFirst => self.state_mut().select_first(),
            KeyAction::SelectLast => self.state_mut().select_last(),
            KeyAction::OpenCall { call_id } => {
                tracing::debug!(call_id = %call_id, "opening call");
                self.state_mut().open(call_id);
                self.sync_reveal();
            }
            KeyAction::CloseDrawer => {
                self.state_mut().close();
                self.stop_ticker();
            }
            KeyAction::Retry => {
                tracing::info!(source = %self.state().source, "retrying call source");
                self.spawn_feed();
            }
        }
    }
}
