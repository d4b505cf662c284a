//! Root layout: tab bar, main content and status bar.

use ratatui::layout::{Constraint, Layout, Rect};

/// Below this height the tab bar is dropped to leave room for content.
pub const HIDE_TABS_THRESHOLD: u16 = 8;

/// Computed layout regions for a single frame.
pub struct AppLayout {
    /// Tab bar (None on very short terminals).
    pub tabs: Option<Rect>,
    pub main: Rect,
    /// Status bar (bottom row).
    pub status: Rect,
}

impl AppLayout {
    pub fn compute(area: Rect) -> Self {
        if area.height < HIDE_TABS_THRESHOLD {
            let rows = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(area);
            return AppLayout {
                tabs: None,
                main: rows[0],
                status: rows[1],
            };
        }

        let rows = Layout::vertical([
            Constraint::Length(1), // Tabs
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

        AppLayout {
            tabs: Some(rows[0]),
            main: rows[1],
            status: rows[2],
        }
    }
}

/// Split a content area into a list column and a detail column.
pub fn master_detail(area: Rect, list_percent: u16) -> (Rect, Rect) {
    let cols = Layout::horizontal([
        Constraint::Percentage(list_percent),
        Constraint::Percentage(100 - list_percent.min(100)),
    ])
    .split(area);
    (cols[0], cols[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_layout() {
        let layout = AppLayout::compute(Rect::new(0, 0, 100, 40));
        let tabs = layout.tabs.unwrap();
        assert_eq!(tabs.height, 1);
        assert_eq!(tabs.y, 0);
        assert_eq!(layout.main.y, 1);
        assert_eq!(layout.main.height, 38);
        assert_eq!(layout.status.y, 39);
        assert_eq!(layout.status.height, 1);
    }

    #[test]
    fn test_short_terminal_hides_tabs() {
        let layout = AppLayout::compute(Rect::new(0, 0, 80, 5));
        assert!(layout.tabs.is_none());
        assert_eq!(layout.main.height, 4);
        assert_eq!(layout.status.y, 4);
    }

    #[test]
    fn test_master_detail_covers_width() {
        let (list, detail) = master_detail(Rect::new(0, 0, 100, 20), 35);
        assert_eq!(list.width + detail.width, 100);
        assert_eq!(list.width, 35);
        assert_eq!(detail.x, 35);
    }
}
