//! Layout helpers: split the terminal area into regions.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// The page fills the screen above a one-row status bar; the nav bar
/// overlays the page's first row rather than pushing it down.
pub struct AppLayout {
    pub page_area: Rect,
    pub nav_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    pub fn from_area(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // page
                Constraint::Length(1), // status bar
            ])
            .split(area);

        let page_area = chunks[0];
        Self {
            page_area,
            nav_area: Rect::new(page_area.x, page_area.y, page_area.width, page_area.height.min(1)),
            status_area: chunks[1],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_bar_takes_the_last_row() {
        let layout = AppLayout::from_area(Rect::new(0, 0, 120, 51));
        assert_eq!(layout.page_area, Rect::new(0, 0, 120, 50));
        assert_eq!(layout.nav_area, Rect::new(0, 0, 120, 1));
        assert_eq!(layout.status_area, Rect::new(0, 50, 120, 1));
    }
}
