use crate::{
    state::{ConsoleState, FeedStatus},
    theme::Theme,
};

use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

/// Footer line: key hints, or the reason the feed is down
pub struct Footer<'a> {
    state: &'a ConsoleState,
}

impl<'a> Footer<'a> {
    pub fn new(state: &'a ConsoleState) -> Self {
        Self { state }
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        frame.render_widget(Paragraph::new(self.line()).style(Theme::base()), area);
    }

    fn line(&self) -> Line<'static> {
        match &self.state.feed_status {
            FeedStatus::Failed(reason) => Line::from(vec![
                Span::styled(format!(" Load failed: {} ", reason), Theme::error()),
                Self::key("r"),
                Span::styled(" retry  ", Theme::muted()),
                Self::key("q"),
                Span::styled(" quit", Theme::muted()),
            ]),
            FeedStatus::Offline(reason) => Line::from(vec![
                Span::styled(format!(" Live updates lost: {} ", reason), Style::default().fg(Theme::YELLOW)),
                Self::key("r"),
                Span::styled(" reload  ", Theme::muted()),
                Self::key("q"),
                Span::styled(" quit", Theme::muted()),
            ]),
            _ => Line::from(self.hints()),
        }
    }

    fn hints(&self) -> Vec<Span<'static>> {
        let mut spans = vec![
            Span::raw(" "),
            Self::key("j/k"),
            Span::styled(" move  ", Theme::muted()),
        ];
        if self.state.is_drawer_open() {
            spans.extend([Self::key("Enter"), Span::styled(" switch  ", Theme::muted())]);
            spans.extend([Self::key("Esc"), Span::styled(" close  ", Theme::muted())]);
        } else {
            spans.extend([Self::key("Enter"), Span::styled(" open  ", Theme::muted())]);
        }
        if self.state.feed_status.can_retry() {
            spans.extend([Self::key("r"), Span::styled(" reload  ", Theme::muted())]);
        }
        spans.extend([Self::key("q"), Span::styled(" quit", Theme::muted())]);
        spans
    }

    fn key(label: &'static str) -> Span<'static> {
        Span::styled(format!("[{}]", label), Style::default().fg(Theme::BLUE))
    }
}
