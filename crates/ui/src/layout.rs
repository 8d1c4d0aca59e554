use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Layout breakpoints
///
/// Wide terminals show the call list and the drawer side by side; narrow ones
/// give the open drawer the whole main area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    /// List and drawer side by side (>= 100 columns)
    Wide,
    /// One pane at a time (< 100 columns)
    Narrow,
}

impl From<u16> for LayoutMode {
    fn from(width: u16) -> Self {
        if width >= 100 { Self::Wide } else { Self::Narrow }
    }
}

/// Calculated layout for the console
#[derive(Debug, Clone)]
pub struct ConsoleLayout {
    pub mode: LayoutMode,
    /// Header area (1 line)
    pub header: Rect,
    /// Call list; hidden when a narrow terminal shows the drawer
    pub list: Option<Rect>,
    /// Drawer for the open call
    pub drawer: Option<Rect>,
    /// Footer area (1 line)
    pub footer: Rect,
}

impl ConsoleLayout {
    pub fn calculate(area: Rect, drawer_open: bool) -> Self {
        let mode = LayoutMode::from(area.width);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0), Constraint::Length(1)])
            .split(area);

        let header = chunks[0];
        let main = chunks[1];
        let footer = chunks[2];

        let (list, drawer) = match (drawer_open, mode) {
            (false, _) => (Some(main), None),
            (true, LayoutMode::Narrow) => (None, Some(main)),
            (true, LayoutMode::Wide) => {
                let main_chunks = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(42), Constraint::Percentage(58)])
                    .split(main);
                (Some(main_chunks[0]), Some(main_chunks[1]))
            }
        };

        Self { mode, header, list, drawer, footer }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_mode_breakpoints() {
        assert_eq!(LayoutMode::from(160), LayoutMode::Wide);
        assert_eq!(LayoutMode::from(100), LayoutMode::Wide);
        assert_eq!(LayoutMode::from(99), LayoutMode::Narrow);
        assert_eq!(LayoutMode::from(40), LayoutMode::Narrow);
    }

    #[test]
    fn test_closed_drawer_gives_list_main_area() {
        let layout = ConsoleLayout::calculate(Rect::new(0, 0, 120, 30), false);
        assert_eq!(layout.header.height, 1);
        assert_eq!(layout.footer.height, 1);
        assert_eq!(layout.list.unwrap().height, 28);
        assert_eq!(layout.list.unwrap().width, 120);
        assert!(layout.drawer.is_none());
    }

    #[test]
    fn test_wide_layout_splits_list_and_drawer() {
        let layout = ConsoleLayout::calculate(Rect::new(0, 0, 120, 30), true);
        let list = layout.list.unwrap();
        let drawer = layout.drawer.unwrap();
        assert_eq!(list.width + drawer.width, 120);
        assert!(drawer.width > list.width);
        assert_eq!(drawer.x, list.x + list.width);
    }

    #[test]
    fn test_narrow_layout_drawer_replaces_list() {
        let layout = ConsoleLayout::calculate(Rect::new(0, 0, 80, 24), true);
        assert_eq!(layout.mode, LayoutMode::Narrow);
        assert!(layout.list.is_none());
        assert_eq!(layout.drawer.unwrap().width, 80);
    }
}
