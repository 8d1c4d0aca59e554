use super::App;
use crate::components::{CallList, Drawer, Footer, Header};
use crate::layout::ConsoleLayout;
use crate::state::ConsoleState;
use crate::theme::Theme;
use ratatui::{Frame, Terminal, backend::CrosstermBackend, widgets::Block};
use std::io::{Result, Stdout};

impl App {
    pub fn render(&self, frame: &mut Frame<'_>) {
        render_console(self.state(), frame);
    }

    pub fn draw(&self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        terminal.draw(|frame| self.render(frame))?;
        Ok(())
    }
}

/// Draw the whole console for `state` into `frame`
pub fn render_console(state: &ConsoleState, frame: &mut Frame<'_>) {
    let area = frame.area();
    frame.render_widget(Block::default().style(Theme::base()), area);

    let layout = ConsoleLayout::calculate(area, state.is_drawer_open());

    Header::new(state).render(frame, layout.header);
    if let Some(list) = layout.list {
        CallList::new(state).render(frame, list);
    }
    if let Some(drawer) = layout.drawer {
        Drawer::new(state).render(frame, drawer);
    }
    Footer::new(state).render(frame, layout.footer);
}
