use crate::{state::ConsoleState, theme::Theme};

use dispatch_core::{Call, TranscriptMessage};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

/// Detail drawer for the open call
///
/// Shows the call's facts, then the transcript. Only the revealed prefix of
/// the transcript is drawn; the "responding" line follows `aiHandling` and
/// not the reveal cursor.
pub struct Drawer<'a> {
    state: &'a ConsoleState,
}

impl<'a> Drawer<'a> {
    pub fn new(state: &'a ConsoleState) -> Self {
        Self { state }
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let Some(call) = self.state.open_call() else {
            return;
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Theme::priority_color(call.priority)))
            .title(Line::from(vec![
                Span::raw(" "),
                Theme::priority_span(call.priority),
                Span::styled(format!(" {} ", call.id), Style::default().fg(Theme::FG).add_modifier(Modifier::BOLD)),
            ]))
            .style(Theme::panel());

        let mut lines = Self::detail_lines(call);
        lines.push(Line::default());
        lines.push(Line::from(Span::styled("Transcript", Theme::primary().add_modifier(Modifier::BOLD))));
        lines.extend(self.state.visible_transcript().iter().map(Self::message_line));
        if call.ai_handling {
            lines.push(Line::from(Span::styled(
                "AI responding…",
                Style::default().fg(Theme::PURPLE).add_modifier(Modifier::ITALIC),
            )));
        }

        let inner_height = area.height.saturating_sub(2) as usize;
        let scroll = lines.len().saturating_sub(inner_height).min(u16::MAX as usize) as u16;

        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: false }).scroll((scroll, 0)),
            area,
        );
    }

    fn detail_lines(call: &Call) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        let incident = if call.incident_type.is_empty() { "Unclassified" } else { &call.incident_type };
        lines.push(Self::field("Incident", format!("{} ({})", incident, call.priority.label())));

        let mut status = call.status.clone();
        if !call.status_detail.is_empty() {
            status.push_str(&format!(" · {}", call.status_detail));
        }
        lines.push(Self::field("Status", status));

        if !call.number_masked.is_empty() {
            lines.push(Self::field("Caller", call.number_masked.clone()));
        }

        let mut location = call.location().to_string();
        if !call.city.is_empty() {
            location.push_str(&format!(", {}", call.city));
        }
        lines.push(Self::field("Location", location));
        lines.push(Self::field(
            "Pin",
            if call.pin.is_placed() { call.pin.to_string() } else { "not located yet".to_string() },
        ));
        lines.push(Self::field("Confidence", format!("{}%", call.confidence)));

        if !call.in_service_area {
            lines.push(Line::from(Span::styled("Outside service area", Theme::error())));
        }
        if !call.summary.is_empty() {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled("Summary", Theme::primary().add_modifier(Modifier::BOLD))));
            lines.push(Line::from(Span::styled(call.summary.clone(), Style::default().fg(Theme::FG))));
        }
        for fact in &call.key_facts {
            lines.push(Line::from(vec![
                Span::styled("  • ", Style::default().fg(Theme::CYAN)),
                Span::styled(fact.clone(), Style::default().fg(Theme::FG)),
            ]));
        }

        lines
    }

    fn field(label: &str, value: String) -> Line<'static> {
        Line::from(vec![
            Span::styled(format!("{:<11}", label), Theme::muted()),
            Span::styled(value, Style::default().fg(Theme::FG)),
        ])
    }

    fn message_line(message: &TranscriptMessage) -> Line<'static> {
        let (speaker, color) = if message.is_ai() {
            ("AI".to_string(), Theme::PURPLE)
        } else {
            (message.caller_name.clone().unwrap_or_else(|| "Caller".to_string()), Theme::CYAN)
        };

        Line::from(vec![
            Span::styled(format!("{} ", message.time), Theme::muted()),
            Span::styled(speaker, Style::default().fg(color).add_modifier(Modifier::BOLD)),
            Span::styled(format!("  {}", message.text), Style::default().fg(Theme::FG)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatch_core::Pin;

    fn text(lines: &[Line<'_>]) -> String {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|span| span.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_detail_lines_for_stub_call() {
        let call = Call::new("CA1");
        let details = text(&Drawer::detail_lines(&call));
        assert!(details.contains("Unclassified (low)"));
        assert!(details.contains("Locating…"));
        assert!(details.contains("not located yet"));
        assert!(details.contains("0%"));
        assert!(!details.contains("Summary"));
    }

    #[test]
    fn test_detail_lines_for_located_call() {
        let mut call = Call::new("CA1").with_location("123 Main St", Pin::new(37.7897, -122.3942));
        call.city = "San Francisco".to_string();
        call.summary = "Two-car collision".to_string();
        call.key_facts = vec!["No injuries".to_string()];
        call.in_service_area = false;

        let details = text(&Drawer::detail_lines(&call));
        assert!(details.contains("123 Main St, San Francisco"));
        assert!(details.contains("37.7897, -122.3942"));
        assert!(details.contains("Outside service area"));
        assert!(details.contains("Two-car collision"));
        assert!(details.contains("• No injuries"));
    }

    #[test]
    fn test_message_line_names_speaker() {
        let ai = Drawer::message_line(&TranscriptMessage::ai("Help is coming", "14:02"));
        assert_eq!(text(&[ai]), "14:02 AI  Help is coming");

        let caller = Drawer::message_line(&TranscriptMessage::caller("Thanks", "14:03"));
        assert_eq!(text(&[caller]), "14:03 Caller  Thanks");

        let named = Drawer::message_line(&TranscriptMessage::caller("Hi", "14:03").with_caller_name("Jane Doe"));
        assert_eq!(text(&[named]), "14:03 Jane Doe  Hi");
    }
}
