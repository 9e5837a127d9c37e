//! Image output with Unicode `▀` half-blocks (two pixels per cell) and the
//! page scrollbar.

use image::imageops::FilterType;
use image::RgbaImage;
use ratatui::{buffer::Buffer, layout::Position, layout::Rect, style::Color};

/// Draw `img` fitted inside `area`, aspect ratio preserved, centred.
///
/// Each cell is one pixel wide and two pixels tall.
pub fn render_fit(img: &RgbaImage, area: Rect, buf: &mut Buffer) {
    if area.width == 0 || area.height == 0 || img.width() == 0 || img.height() == 0 {
        return;
    }

    let max_px_w = area.width as f64;
    let max_px_h = (area.height as f64) * 2.0;
    let src_w = img.width() as f64;
    let src_h = img.height() as f64;

    let scale = (max_px_w / src_w).min(max_px_h / src_h).min(1.0);
    let fit_w = (src_w * scale).round().max(1.0) as u32;
    let fit_h = (src_h * scale).round().max(1.0) as u32;

    let rgba = image::imageops::resize(img, fit_w, fit_h, FilterType::Triangle);
    let (iw, ih) = (rgba.width(), rgba.height());

    let col_offset = (area.width.saturating_sub(iw as u16)) / 2;
    let row_offset = (area.height.saturating_sub(ih.div_ceil(2) as u16)) / 2;

    for row in 0..area.height.saturating_sub(row_offset) {
        let yt = (row as u32) * 2;
        if yt >= ih {
            break;
        }
        for col in 0..iw.min(area.width as u32) {
            let top = rgba.get_pixel(col, yt);
            let bottom = (yt + 1 < ih).then(|| rgba.get_pixel(col, yt + 1));
            put(
                buf,
                area.x + col_offset + col as u16,
                area.y + row_offset + row,
                Some([top[0], top[1], top[2]]),
                bottom.map(|b| [b[0], b[1], b[2]]),
            );
        }
    }
}

/// Placement of the showcase image inside its panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Zoom about the panel centre; 1 fills the panel exactly.
    pub scale: f64,
    /// Downward shift in half-block pixels, applied before scaling.
    pub translate_px: f64,
}

/// Sample `img` stretched over `area`, zoomed and shifted by `transform`.
/// Pixels that land outside the image are left untouched.
pub fn render_transformed(
    img: &RgbaImage,
    area: Rect,
    transform: Transform,
    shade: impl Fn([u8; 3]) -> [u8; 3],
    buf: &mut Buffer,
) {
    if area.width == 0 || area.height == 0 || img.width() == 0 || img.height() == 0 {
        return;
    }
    let scale = if transform.scale.is_finite() && transform.scale > 0.0 {
        transform.scale
    } else {
        1.0
    };
    let w = area.width as f64;
    let h = area.height as f64 * 2.0;
    let (cx, cy) = (w / 2.0, h / 2.0);
    let (sx, sy) = (img.width() as f64 / w, img.height() as f64 / h);

    let sample = |x: f64, y: f64| -> Option<[u8; 3]> {
        // Inverse of translate-then-scale about the centre.
        let u = cx + (x + 0.5 - cx) / scale;
        let v = cy + (y + 0.5 - cy - transform.translate_px) / scale;
        if u < 0.0 || v < 0.0 || u >= w || v >= h {
            return None;
        }
        let px = img.get_pixel(
            ((u * sx) as u32).min(img.width() - 1),
            ((v * sy) as u32).min(img.height() - 1),
        );
        Some(shade([px[0], px[1], px[2]]))
    };

    for row in 0..area.height {
        for col in 0..area.width {
            let y = row as f64 * 2.0;
            let top = sample(col as f64, y);
            let bottom = sample(col as f64, y + 1.0);
            if top.is_some() || bottom.is_some() {
                put(buf, area.x + col, area.y + row, top, bottom);
            }
        }
    }
}

fn put(buf: &mut Buffer, x: u16, y: u16, top: Option<[u8; 3]>, bottom: Option<[u8; 3]>) {
    let color = |c: Option<[u8; 3]>| c.map_or(Color::Reset, |[r, g, b]| Color::Rgb(r, g, b));
    if let Some(cell) = buf.cell_mut(Position::new(x, y)) {
        cell.set_char('▀').set_fg(color(top)).set_bg(color(bottom));
    }
}

/// Vertical scrollbar on the right edge of `area`.
pub fn render_scrollbar(area: Rect, total: f64, offset: f64, visible: f64, buf: &mut Buffer) {
    if total <= visible || visible <= 0.0 || area.height < 2 || area.width == 0 {
        return;
    }
    let x = area.x + area.width.saturating_sub(1);
    let h = area.height as f64;
    let thumb_sz = ((visible / total) * h).ceil().max(1.0) as u16;
    let max_off = total - visible;
    let thumb_pos = ((offset / max_off).clamp(0.0, 1.0) * (h - thumb_sz as f64)).round() as u16;

    for row in 0..area.height {
        let is_thumb = row >= thumb_pos && row < thumb_pos + thumb_sz;
        let (ch, fg) = if is_thumb {
            ('█', Color::LightBlue)
        } else {
            ('│', Color::DarkGray)
        };
        if let Some(cell) = buf.cell_mut(Position::new(x, area.y + row)) {
            cell.set_char(ch).set_fg(fg);
        }
    }
}
