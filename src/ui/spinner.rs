//! Loading indicator: a spinner and a label centred in the given area.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};

use super::theme::Theme;

/// Braille-dot spinner frames.  Cycles through these on each tick.
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub struct LoadingIndicator<'a> {
    pub label: &'a str,
    /// Monotonically increasing tick counter (drives the spinner frame).
    pub tick: u64,
}

impl LoadingIndicator<'_> {
    pub fn frame(tick: u64) -> &'static str {
        SPINNER_FRAMES[(tick as usize) % SPINNER_FRAMES.len()]
    }
}

impl Widget for LoadingIndicator<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = area.intersection(buf.area);
        if area.width == 0 || area.height == 0 {
            return;
        }
        let text = format!("{} {}", Self::frame(self.tick), self.label);
        let width = (text.chars().count() as u16).min(area.width);
        let x = area.x + (area.width - width) / 2;
        let y = area.y + area.height / 2;
        let line = Line::from(Span::styled(text, Theme::spinner_style()));
        buf.set_line(x, y, &line, width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_wrap_around() {
        assert_eq!(LoadingIndicator::frame(0), LoadingIndicator::frame(10));
        assert_ne!(LoadingIndicator::frame(0), LoadingIndicator::frame(1));
    }

    #[test]
    fn renders_centred() {
        let area = Rect::new(0, 0, 20, 3);
        let mut buf = Buffer::empty(area);
        LoadingIndicator {
            label: "Loading",
            tick: 0,
        }
        .render(area, &mut buf);
        let row: String = (0..20u16).map(|x| buf[(x, 1u16)].symbol().to_string()).collect();
        assert_eq!(row.trim(), "⠋ Loading");
    }

    #[test]
    fn area_outside_the_buffer_is_skipped() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 20, 4));
        LoadingIndicator {
            label: "Loading",
            tick: 0,
        }
        .render(Rect::new(0, 6, 20, 1), &mut buf);
        assert_eq!(buf, Buffer::empty(Rect::new(0, 0, 20, 4)));
    }
}
