use crate::{state::ConsoleState, theme::Theme};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

/// Header line: console title, call counts and feed status
pub struct Header<'a> {
    state: &'a ConsoleState,
}

impl<'a> Header<'a> {
    pub fn new(state: &'a ConsoleState) -> Self {
        Self { state }
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(self.status_width())])
            .split(area);

        frame.render_widget(Paragraph::new(self.summary_line()).style(Theme::base()), chunks[0]);
        frame.render_widget(
            Paragraph::new(self.status_line()).alignment(Alignment::Right).style(Theme::base()),
            chunks[1],
        );
    }

    fn summary_line(&self) -> Line<'static> {
        let mut spans = vec![
            Span::styled(" DISPATCH ", Style::default().fg(Theme::BG).bg(Theme::BLUE).add_modifier(Modifier::BOLD)),
            Span::raw(" "),
            Span::styled(format!("{} calls", self.state.store.len()), Style::default().fg(Theme::FG)),
        ];

        for (priority, count) in self.state.priority_counts() {
            if count == 0 {
                continue;
            }
            spans.push(Span::styled("  ", Theme::muted()));
            spans.push(Theme::priority_span(priority));
            spans.push(Span::styled(format!(" {}", count), Style::default().fg(Theme::FG)));
        }

        let ai = self.state.ai_handling_count();
        if ai > 0 {
            spans.push(Span::styled(format!("  AI on {}", ai), Style::default().fg(Theme::PURPLE)));
        }
        Line::from(spans)
    }

    fn status_line(&self) -> Line<'static> {
        Line::from(vec![
            Span::styled(self.state.source.clone(), Theme::muted()),
            Span::styled(" ● ", Style::default().fg(Theme::feed_status_color(&self.state.feed_status))),
            Theme::feed_status_span(&self.state.feed_status),
            Span::raw(" "),
        ])
    }

    fn status_width(&self) -> u16 {
        let width = self.state.source.chars().count() + self.state.feed_status.label().len() + 4;
        width.min(u16::MAX as usize) as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::FeedStatus;
    use dispatch_core::{Call, Priority};

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn test_summary_counts_by_priority() {
        let mut state = ConsoleState::new("http://localhost:5001");
        state
            .store
            .initialize(vec![
                Call::new("a").with_priority(Priority::P1),
                Call::new("b").with_priority(Priority::P3),
                Call::new("c").with_priority(Priority::P3),
            ])
            .unwrap();

        let text = line_text(&Header::new(&state).summary_line());
        assert!(text.contains("3 calls"));
        assert!(text.contains("P1 1"));
        assert!(text.contains("P3 2"));
        assert!(!text.contains("P2"));
        assert!(text.contains("AI on 3"));
    }

    #[test]
    fn test_status_shows_source_and_state() {
        let mut state = ConsoleState::new("script: demo");
        state.feed_status = FeedStatus::Offline("connection reset".to_string());

        let header = Header::new(&state);
        let text = line_text(&header.status_line());
        assert!(text.contains("script: demo"));
        assert!(text.contains("offline"));
        assert_eq!(header.status_width() as usize, text.chars().count());
    }
}
