//! Preview modal overlay.
//!
//! Shows either the showcase artwork or the current document page centred
//! on the terminal, with page arrows, a close button, and a page indicator
//! (e.g. "3 / 7").

use image::RgbaImage;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::app::preview::{DocumentState, PreviewPane};

use super::halfblock;
use super::spinner::LoadingIndicator;
use super::theme::Theme;

pub struct LightboxWidget<'a> {
    pub pane: PreviewPane,
    pub artwork: &'a RgbaImage,
    pub document: &'a DocumentState,
    /// The modal is fading out.
    pub closing: bool,
    pub tick: u64,
}

/// Clickable regions returned after rendering, for mouse hit-testing.
#[derive(Debug, Clone, Copy)]
pub struct LightboxHitZones {
    /// Clicks outside this close the modal.
    pub overlay_rect: Rect,
    pub close_rect: Rect,
    pub prev_rect: Rect,
    pub next_rect: Rect,
}

impl LightboxWidget<'_> {
    /// Centred, 80% of the terminal.
    fn overlay_area(terminal: Rect) -> Rect {
        let margin_x = (terminal.width as f32 * 0.1).round() as u16;
        let margin_y = (terminal.height as f32 * 0.1).round() as u16;
        let width = terminal.width.saturating_sub(margin_x * 2).max(20).min(terminal.width);
        let height = terminal.height.saturating_sub(margin_y * 2).max(8).min(terminal.height);
        Rect::new(
            terminal.x + (terminal.width - width) / 2,
            terminal.y + (terminal.height - height) / 2,
            width,
            height,
        )
    }

    pub fn render_and_hit(self, terminal_area: Rect, buf: &mut Buffer) -> LightboxHitZones {
        let area = Self::overlay_area(terminal_area);
        Clear.render(area, buf);

        let title = match self.pane {
            PreviewPane::Artwork => " Artwork ".to_string(),
            PreviewPane::Document => format!(" Document — {} ", self.document.indicator()),
        };
        let border = if self.closing {
            Theme::fading_border_style()
        } else {
            Theme::border_style()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(Span::styled(title, Theme::heading_style()));
        let inner = block.inner(area);
        block.render(area, buf);

        let close_rect = Rect::new(area.x + area.width.saturating_sub(5), area.y, 3, 1);
        Paragraph::new(Line::from(Span::styled(
            "[X]",
            Style::default()
                .fg(Color::LightRed)
                .add_modifier(Modifier::BOLD),
        )))
        .render(close_rect, buf);

        let arrow_y = area.y + area.height / 2;
        let prev_rect = Rect::new(area.x, arrow_y, 3, 1);
        let next_rect = Rect::new(area.x + area.width.saturating_sub(3), arrow_y, 3, 1);

        // Leave room for the arrows and one footer row.
        let body = Rect::new(
            inner.x.saturating_add(2),
            inner.y,
            inner.width.saturating_sub(4),
            inner.height.saturating_sub(1),
        );

        match self.pane {
            PreviewPane::Artwork => halfblock::render_fit(self.artwork, body, buf),
            PreviewPane::Document => {
                self.render_document(body, prev_rect, next_rect, buf);
            }
        }

        let hint = match self.pane {
            PreviewPane::Artwork => " Esc close ",
            PreviewPane::Document => " ←/→ page   Esc close ",
        };
        let footer_y = inner.y + inner.height.saturating_sub(1);
        Paragraph::new(Line::from(Span::styled(hint, Theme::message_style())))
            .render(Rect::new(inner.x, footer_y, inner.width, 1), buf);

        LightboxHitZones {
            overlay_rect: area,
            close_rect,
            prev_rect,
            next_rect,
        }
    }

    fn render_document(&self, body: Rect, prev_rect: Rect, next_rect: Rect, buf: &mut Buffer) {
        let arrow = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);
        match self.document {
            DocumentState::Ready { pager, current, .. } => {
                if pager.page() > 1 {
                    Paragraph::new(Span::styled(" ◀", arrow)).render(prev_rect, buf);
                }
                if pager.page() < pager.page_count() {
                    Paragraph::new(Span::styled("▶ ", arrow)).render(next_rect, buf);
                }
                match current {
                    Some(page) if !pager.is_rendering() => halfblock::render_fit(page, body, buf),
                    _ => LoadingIndicator {
                        label: "Loading…",
                        tick: self.tick,
                    }
                    .render(body, buf),
                }
            }
            DocumentState::NotLoaded | DocumentState::Loading => LoadingIndicator {
                label: "Loading…",
                tick: self.tick,
            }
            .render(body, buf),
            DocumentState::Failed | DocumentState::Unavailable => {
                let msg = self.document.indicator();
                let y = body.y + body.height / 2;
                Paragraph::new(Line::from(Span::styled(msg, Theme::message_style())).centered())
                    .render(Rect::new(body.x, y, body.width, 1.min(body.height)), buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(buf: &Buffer) -> String {
        let area = buf.area;
        (area.y..area.y + area.height)
            .map(|y| {
                (area.x..area.x + area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn failed_document_shows_message() {
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        let art = RgbaImage::new(4, 4);
        let hits = LightboxWidget {
            pane: PreviewPane::Document,
            artwork: &art,
            document: &DocumentState::Failed,
            closing: false,
            tick: 0,
        }
        .render_and_hit(area, &mut buf);
        assert!(text(&buf).contains("Unable to load the document."));
        assert_eq!(hits.overlay_rect, Rect::new(8, 2, 64, 20));
    }

    #[test]
    fn tiny_terminal_keeps_overlay_on_screen() {
        let area = Rect::new(0, 0, 10, 4);
        let overlay = LightboxWidget::overlay_area(area);
        assert!(overlay.width <= 10 && overlay.height <= 4);
    }
}
