use crate::{
    state::{ConsoleState, FeedStatus},
    theme::Theme,
};

use dispatch_core::Call;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Call list, newest first, with the selected row highlighted
pub struct CallList<'a> {
    state: &'a ConsoleState,
}

impl<'a> CallList<'a> {
    pub fn new(state: &'a ConsoleState) -> Self {
        Self { state }
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let snapshot = self.state.snapshot();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border())
            .title(Span::styled(format!(" Calls ({}) ", snapshot.len()), Theme::primary()))
            .style(Theme::base());

        if snapshot.is_empty() {
            let message = self.empty_message();
            frame.render_widget(
                Paragraph::new(message).block(block).wrap(Wrap { trim: true }),
                area,
            );
            return;
        }

        let row_width = area.width.saturating_sub(4) as usize;
        let items: Vec<ListItem> = snapshot.iter().map(|call| ListItem::new(Self::row(call, row_width))).collect();

        let list = List::new(items).block(block).highlight_style(Theme::active()).highlight_symbol("▌");
        let mut list_state = ListState::default().with_selected(self.state.selected_index());
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn empty_message(&self) -> Line<'static> {
        match &self.state.feed_status {
            FeedStatus::Loading => Line::from(Span::styled("Loading calls…", Theme::muted())),
            FeedStatus::Failed(reason) => Line::from(Span::styled(format!("Could not load calls: {}", reason), Theme::error())),
            _ => Line::from(Span::styled("No active calls", Theme::muted())),
        }
    }

    /// One list row: priority, incident, location, status and elapsed time
    fn row(call: &Call, width: usize) -> Line<'static> {
        let incident = match (call.incident_icon.is_empty(), call.incident_type.is_empty()) {
            (_, true) => "Unclassified".to_string(),
            (true, false) => call.incident_type.clone(),
            (false, false) => format!("{} {}", call.incident_icon, call.incident_type),
        };

        let mut spans = vec![Theme::priority_span(call.priority), Span::raw(" ")];
        let mut detail = format!("{}  ·  {}  ·  {}", incident, call.location(), call.status);
        if !call.elapsed.is_empty() {
            detail.push_str(&format!("  {}", call.elapsed));
        }

        let marker = if call.ai_handling { "  AI" } else { "" };
        let budget = width.saturating_sub(3 + marker.len());
        spans.push(Span::styled(truncate(&detail, budget), Style::default().fg(Theme::FG)));
        if call.ai_handling {
            spans.push(Span::styled(marker, Style::default().fg(Theme::PURPLE).add_modifier(Modifier::BOLD)));
        }
        Line::from(spans)
    }
}

/// Cut `text` to at most `max` terminal columns, marking the cut with `…`
pub fn truncate(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > max - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatch_core::Priority;

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
        assert_eq!(truncate("abc", 0), "");
        assert_eq!(truncate("🚑🚑🚑", 4), "🚑…");
    }

    #[test]
    fn test_row_content() {
        let mut call = Call::new("CA1").with_priority(Priority::P2).with_incident_type("Medical");
        call.location_label = "Mission & 24th".to_string();
        call.status = "Dispatched".to_string();
        call.ai_handling = false;

        let text = line_text(&CallList::row(&call, 80));
        assert!(text.starts_with("P2 Medical"));
        assert!(text.contains("Mission & 24th"));
        assert!(text.contains("Dispatched"));
        assert!(text.contains("00:00"));
        assert!(!text.ends_with("AI"));
    }

    #[test]
    fn test_row_marks_ai_handling_and_unlocated_calls() {
        let call = Call::new("CA1");
        let text = line_text(&CallList::row(&call, 80));
        assert!(text.contains("Unclassified"));
        assert!(text.contains("Locating…"));
        assert!(text.ends_with("AI"));
    }

    #[test]
    fn test_row_respects_width() {
        let call = Call::new("CA1").with_incident_type("A very long incident type that keeps going");
        let text = line_text(&CallList::row(&call, 30));
        assert!(text.width() <= 30);
        assert!(text.contains('…'));
    }
}
