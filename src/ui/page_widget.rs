//! The scrolling page.
//!
//! Each visible section is drawn into a scratch buffer the size of its
//! frame (the pinned panel for sticky sections, the whole box otherwise)
//! and then copied onto the screen at its current row, so partially
//! visible sections clip naturally.

use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::app::state::AppState;
use crate::core::catalog::BoardState;
use crate::core::effects::{silhouette_filter, sticky_transform};
use crate::core::page::{LayoutProvider, SectionKind, SectionSpec, SUB_STICKY};

use super::halfblock::{self, Transform};
use super::spinner::LoadingIndicator;
use super::theme::Theme;

/// Width of the date, size and action columns on the board.
const DATE_COL: u16 = 12;
const SIZE_COL: u16 = 10;
const ACTION_COL: u16 = 3;
/// First board row below the heading and column header.
const BOARD_FIRST_ROW: u16 = 5;

pub struct PageWidget<'a> {
    state: &'a AppState,
}

impl<'a> PageWidget<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Draw the page into `area` and return the clickable board rows.
    pub fn render_and_hit(self, area: Rect, buf: &mut Buffer) -> Vec<(Rect, usize)> {
        let mut hits = Vec::new();
        if area.width == 0 || area.height == 0 {
            return hits;
        }
        let page = &self.state.page;
        let cell_h = self.state.config.cell_height_px.max(1.0);
        let vh = page.viewport().height;
        let scroll_y = page.scroll_y();

        for (spec, b) in page.boxes() {
            let rect_top = b.rect_top(scroll_y);
            if rect_top + b.height <= 0.0 || rect_top >= vh {
                continue;
            }
            let (frame_top, frame_height) = match spec.kind {
                SectionKind::Sticky { .. } | SectionKind::Manifesto { .. } => {
                    (pinned_top(rect_top, b.height, vh), vh)
                }
                _ => (rect_top, b.height),
            };
            let top_row = (frame_top / cell_h).round() as i32;
            let rows = (((frame_top + frame_height) / cell_h).round() as i32 - top_row)
                .clamp(0, i32::from(area.height) * 4) as u16;
            if rows == 0 {
                continue;
            }

            let local = Rect::new(0, 0, area.width, rows);
            let mut scratch = Buffer::empty(local);
            let local_hits = self.render_section(spec, local, &mut scratch);
            blit(&scratch, area, top_row, buf);

            for (rect, index) in local_hits {
                let row = top_row + i32::from(rect.y);
                // Row 0 sits under the nav bar.
                if row >= 1 && row < i32::from(area.height) {
                    hits.push((Rect::new(area.x, area.y + row as u16, area.width, 1), index));
                }
            }
        }

        halfblock::render_scrollbar(
            Rect::new(area.x, area.y + 1, area.width, area.height.saturating_sub(1)),
            page.total_height(),
            scroll_y,
            vh,
            buf,
        );
        self.render_nav(Rect::new(area.x, area.y, area.width, 1), buf);
        hits
    }

    fn render_section(
        &self,
        spec: &SectionSpec,
        area: Rect,
        buf: &mut Buffer,
    ) -> Vec<(Rect, usize)> {
        if spec.fade_up && !self.state.reveals.is_revealed(&spec.id) {
            return Vec::new();
        }
        match &spec.kind {
            SectionKind::Intro { title, subtitle } => {
                self.render_intro(title, subtitle, area, buf);
                Vec::new()
            }
            SectionKind::Sticky { heading, tabs } => {
                self.render_sticky(&spec.id, heading, tabs, area, buf);
                Vec::new()
            }
            SectionKind::Manifesto { lines } => {
                self.render_manifesto(lines, area, buf);
                Vec::new()
            }
            SectionKind::Board { heading } => self.render_board(heading, area, buf),
            SectionKind::Footer { text } => {
                centred(text, Theme::footer_style(), area, area.height / 2, buf);
                Vec::new()
            }
        }
    }

    fn render_intro(&self, title: &str, subtitle: &str, area: Rect, buf: &mut Buffer) {
        let filter = silhouette_filter(self.state.page.scroll_y());
        let [r, g, bl] = filter.apply([240, 240, 240]);
        let style = Style::default()
            .fg(Color::Rgb(r, g, bl))
            .add_modifier(Modifier::BOLD);
        let mid = area.height / 2;
        centred(title, style, area, mid.saturating_sub(1), buf);
        centred(subtitle, Theme::subtitle_style(), area, mid + 1, buf);
    }

    fn render_sticky(&self, id: &str, heading: &str, tabs: &[String], area: Rect, buf: &mut Buffer) {
        centred(heading, Theme::heading_style(), area, 1, buf);

        let footer_rows = if tabs.is_empty() { 1 } else { 2 };
        let image_area = Rect::new(
            area.x + 2,
            area.y + 2,
            area.width.saturating_sub(4),
            area.height.saturating_sub(2 + footer_rows),
        );
        let page = &self.state.page;
        let nav_height = self.state.config.cell_height_px;
        if let Some(t) = sticky_transform(page, id, nav_height) {
            let vh = page.viewport().height;
            let image_px_h = f64::from(image_area.height) * 2.0;
            let transform = Transform {
                scale: t.scale,
                translate_px: if vh > 0.0 { t.translate_y / vh * image_px_h } else { 0.0 },
            };
            let art = if id == SUB_STICKY {
                self.state
                    .tab_artwork
                    .get(self.state.active_tab)
                    .unwrap_or(&self.state.artwork)
            } else {
                &self.state.artwork
            };
            halfblock::render_transformed(art, image_area, transform, |c| c, buf);
        }

        if !tabs.is_empty() {
            let spans: Vec<Span> = tabs
                .iter()
                .enumerate()
                .flat_map(|(i, tab)| {
                    let style = if i == self.state.active_tab {
                        Theme::active_tab_style()
                    } else {
                        Theme::tab_style()
                    };
                    [Span::styled(format!(" {tab} "), style), Span::raw("  ")]
                })
                .collect();
            let y = area.y + area.height.saturating_sub(2);
            Paragraph::new(Line::from(spans).centered()).render(Rect::new(area.x, y, area.width, 1), buf);
        }
    }

    fn render_manifesto(&self, lines: &[String], area: Rect, buf: &mut Buffer) {
        let n = lines.len() as u16;
        let start = (area.height / 2).saturating_sub(n);
        for (i, line) in lines.iter().enumerate() {
            let style = if self.state.manifesto_line == Some(i) {
                Theme::manifesto_active_style()
            } else {
                Theme::manifesto_dim_style()
            };
            centred(line, style, area, start + 2 * i as u16, buf);
        }
    }

    fn render_board(&self, heading: &str, area: Rect, buf: &mut Buffer) -> Vec<(Rect, usize)> {
        let mut hits = Vec::new();
        centred(heading, Theme::heading_style(), area, 2, buf);

        let board = &self.state.board;
        if let Some(msg) = board.message() {
            if BOARD_FIRST_ROW + 1 >= area.height {
                return hits;
            }
            let row = Rect::new(area.x, area.y + BOARD_FIRST_ROW + 1, area.width, 1);
            if matches!(board, BoardState::Loading) {
                LoadingIndicator {
                    label: msg,
                    tick: self.state.tick,
                }
                .render(row, buf);
            } else {
                centred(msg, Theme::message_style(), area, BOARD_FIRST_ROW + 1, buf);
            }
            return hits;
        }

        // Header and rows sit at fixed rows; short panels show the heading only.
        if BOARD_FIRST_ROW >= area.height {
            return hits;
        }
        let inner_w = area.width.saturating_sub(2);
        let title_w = inner_w.saturating_sub(DATE_COL + SIZE_COL + ACTION_COL);
        let header = Line::from(vec![
            Span::styled(pad(" Title", title_w), Theme::board_header_style()),
            Span::styled(pad("Date", DATE_COL), Theme::board_header_style()),
            Span::styled(pad("Size", SIZE_COL), Theme::board_header_style()),
        ]);
        buf.set_line(area.x + 1, area.y + BOARD_FIRST_ROW - 1, &header, inner_w);

        let records = board.records();
        let visible = area.height.saturating_sub(BOARD_FIRST_ROW + 1) as usize;
        if visible == 0 {
            return hits;
        }
        let first = self.state.board_selected.saturating_sub(visible - 1);
        for (slot, (index, record)) in records.iter().enumerate().skip(first).take(visible).enumerate() {
            let y = area.y + BOARD_FIRST_ROW + slot as u16;
            let selected = index == self.state.board_selected;
            let pick = |base: Style| if selected { Theme::selected_style() } else { base };

            let mut title = String::from(" ");
            if !record.category.is_empty() {
                title.push_str(&format!("[{}] ", record.category));
            }
            title.push_str(record.display_title());

            let line = Line::from(vec![
                Span::styled(pad(&title, title_w), pick(Theme::record_style())),
                Span::styled(pad(&record.display_date(), DATE_COL), pick(Theme::meta_style())),
                Span::styled(pad(&record.display_size(), SIZE_COL), pick(Theme::meta_style())),
                Span::styled(pad(" ↓", ACTION_COL), pick(Theme::category_style())),
            ]);
            buf.set_line(area.x + 1, y, &line, inner_w);
            hits.push((Rect::new(area.x, y, area.width, 1), index));
        }
        hits
    }

    fn render_nav(&self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, Theme::nav_style());
        buf.set_string(area.x + 1, area.y, "SNAPFOLIO", Theme::nav_current_style());

        let page = &self.state.page;
        let probe = page.scroll_y() + page.viewport().height / 2.0;
        let mut spans = Vec::new();
        for (spec, b) in page.boxes() {
            let Some(label) = nav_label(spec) else {
                continue;
            };
            let current = probe >= b.top && probe < b.bottom();
            let style = if current {
                Theme::nav_current_style()
            } else {
                Theme::nav_style()
            };
            spans.push(Span::styled(format!(" {label} "), style));
        }
        let line = Line::from(spans);
        let width = line.width() as u16;
        if width + 12 <= area.width {
            buf.set_line(area.x + area.width - width - 1, area.y, &line, width);
        }
    }
}

/// Screen-relative top of a sticky panel: pinned at the viewport top while
/// its section spans the viewport, carried off with the section's end.
fn pinned_top(rect_top: f64, height: f64, vh: f64) -> f64 {
    rect_top.max(0.0).min(rect_top + height - vh)
}

fn nav_label(spec: &SectionSpec) -> Option<&str> {
    match &spec.kind {
        SectionKind::Intro { title, .. } => Some(title),
        SectionKind::Sticky { heading, .. } | SectionKind::Board { heading } => Some(heading),
        SectionKind::Manifesto { .. } => Some("Manifesto"),
        SectionKind::Footer { .. } => None,
    }
}

/// Copy `scratch` onto `area` with its first row at `top_row`, clipping.
fn blit(scratch: &Buffer, area: Rect, top_row: i32, buf: &mut Buffer) {
    let src = scratch.area;
    for r in 0..src.height {
        let row = top_row + i32::from(r);
        if row < 0 || row >= i32::from(area.height) {
            continue;
        }
        for c in 0..src.width.min(area.width) {
            if let Some(cell) = buf.cell_mut(Position::new(area.x + c, area.y + row as u16)) {
                *cell = scratch[(c, r)].clone();
            }
        }
    }
}

fn centred(text: &str, style: Style, area: Rect, row: u16, buf: &mut Buffer) {
    if row >= area.height {
        return;
    }
    Paragraph::new(Line::from(Span::styled(text.to_string(), style)).centered())
        .render(Rect::new(area.x, area.y + row, area.width, 1), buf);
}

/// Left-align `s` in exactly `width` columns, truncating with `…`.
fn pad(s: &str, width: u16) -> String {
    let width = width as usize;
    let count = s.chars().count();
    if count <= width {
        format!("{s:<width$}")
    } else if width == 0 {
        String::new()
    } else {
        let mut out: String = s.chars().take(width - 1).collect();
        out.push('…');
        out
    }
}
