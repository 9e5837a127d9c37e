//! Showcase artwork: a user-supplied image, or a generated placeholder.

use std::path::Path;

use image::{Rgba, RgbaImage};

pub const PLACEHOLDER_WIDTH: u32 = 320;
pub const PLACEHOLDER_HEIGHT: u32 = 200;

/// Load `path` if given and decodable, otherwise generate a placeholder.
pub fn load_or_generate(path: Option<&Path>, hue: f64) -> RgbaImage {
    if let Some(path) = path {
        match image::open(path) {
            Ok(img) => return img.to_rgba8(),
            Err(e) => tracing::warn!(path = %path.display(), "artwork unreadable, using placeholder: {e}"),
        }
    }
    placeholder(PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT, hue)
}

/// Concentric bands over a vertical gradient, tinted by `hue` (degrees).
/// The top rows are lighter so the zoomed-in start of the shrink effect
/// visibly shows the top of the picture.
pub fn placeholder(width: u32, height: u32, hue: f64) -> RgbaImage {
    let (w, h) = (width.max(1) as f64, height.max(1) as f64);
    RgbaImage::from_fn(width.max(1), height.max(1), |x, y| {
        let fx = x as f64 / w - 0.5;
        let fy = y as f64 / h - 0.5;
        let r = (fx * fx * 2.56 + fy * fy).sqrt();
        let band = if ((r * 14.0).floor() as i64) % 2 == 0 { 1.0 } else { 0.78 };
        let light = (0.75 - y as f64 / h * 0.45) * band;
        let [red, green, blue] = hsl_to_rgb(hue + r * 90.0, 0.55, light.clamp(0.05, 0.95));
        Rgba([red, green, blue, 255])
    })
}

fn hsl_to_rgb(hue: f64, sat: f64, light: f64) -> [u8; 3] {
    let h = hue.rem_euclid(360.0) / 60.0;
    let c = (1.0 - (2.0 * light - 1.0).abs()) * sat;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = light - c / 2.0;
    [r, g, b].map(|v| ((v + m).clamp(0.0, 1.0) * 255.0).round() as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_has_requested_size() {
        let img = placeholder(40, 20, 210.0);
        assert_eq!((img.width(), img.height()), (40, 20));
        assert_eq!(img.get_pixel(0, 0)[3], 255);
    }

    #[test]
    fn top_is_lighter_than_bottom() {
        let img = placeholder(40, 100, 30.0);
        let luma = |p: &Rgba<u8>| p[0] as u32 + p[1] as u32 + p[2] as u32;
        assert!(luma(img.get_pixel(0, 0)) > luma(img.get_pixel(0, 99)));
    }

    #[test]
    fn unreadable_path_falls_back() {
        let img = load_or_generate(Some(Path::new("/no/such/art.png")), 0.0);
        assert_eq!(img.width(), PLACEHOLDER_WIDTH);
    }

    #[test]
    fn hsl_primaries() {
        assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), [255, 0, 0]);
        assert_eq!(hsl_to_rgb(120.0, 1.0, 0.5), [0, 255, 0]);
        assert_eq!(hsl_to_rgb(240.0, 1.0, 0.5), [0, 0, 255]);
    }
}
