//! Paged document source for the preview modal.
//!
//! A document is either a directory of page images (sorted by name) or a
//! single image.  [`DocumentPager`] tracks the visible page and serialises
//! renders: while one page is being decoded, further requests collapse into a
//! single pending page.

use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use thiserror::Error;

const PAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot decode page: {0}")]
    Image(#[from] image::ImageError),
    #[error("no pages found in {0}")]
    Empty(PathBuf),
}

/// Page files of the document at `path`.
pub fn list_pages(path: &Path) -> Result<Vec<PathBuf>, DocumentError> {
    if path.is_file() {
        if !is_page_image(path) {
            return Err(DocumentError::Empty(path.to_path_buf()));
        }
        return Ok(vec![path.to_path_buf()]);
    }
    let entries = std::fs::read_dir(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut pages: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_page_image(p))
        .collect();
    if pages.is_empty() {
        return Err(DocumentError::Empty(path.to_path_buf()));
    }
    pages.sort_by_key(|p| p.file_name().map(|n| n.to_string_lossy().to_lowercase()));
    Ok(pages)
}

fn is_page_image(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|e| PAGE_EXTENSIONS.contains(&e.as_str()))
}

/// Decode a page and shrink it to fit `max_w × max_h` pixels.
pub fn load_page(path: &Path, max_w: u32, max_h: u32) -> Result<image::RgbaImage, DocumentError> {
    let img = image::open(path)?;
    let fitted = if img.width() > max_w || img.height() > max_h {
        img.resize(max_w.max(1), max_h.max(1), FilterType::Triangle)
    } else {
        img
    };
    Ok(fitted.to_rgba8())
}

// ───────────────────────────────────────── pager ─────────────

/// Current page plus render bookkeeping.  Pages are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPager {
    page: usize,
    page_count: usize,
    rendering: bool,
    pending: Option<usize>,
}

impl DocumentPager {
    pub fn new(page_count: usize) -> Self {
        Self {
            page: 1,
            page_count,
            rendering: false,
            pending: None,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn is_rendering(&self) -> bool {
        self.rendering
    }

    /// Request a render of `page`.  Returns the page to start rendering now,
    /// or `None` if a render is in flight (the request is parked instead).
    pub fn queue_render(&mut self, page: usize) -> Option<usize> {
        if self.rendering {
            self.pending = Some(page);
            None
        } else {
            self.rendering = true;
            Some(page)
        }
    }

    /// A render finished.  Returns the parked page, if any, which is now
    /// rendering.
    pub fn on_rendered(&mut self) -> Option<usize> {
        self.rendering = false;
        let next = self.pending.take()?;
        self.rendering = true;
        Some(next)
    }

    /// Step forward; returns the page to render now, if any.
    pub fn next(&mut self) -> Option<usize> {
        if self.page >= self.page_count {
            return None;
        }
        self.page += 1;
        self.queue_render(self.page)
    }

    pub fn prev(&mut self) -> Option<usize> {
        if self.page <= 1 {
            return None;
        }
        self.page -= 1;
        self.queue_render(self.page)
    }

    /// `"3 / 7"`.
    pub fn indicator(&self) -> String {
        format!("{} / {}", self.page, self.page_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_render_starts_immediately() {
        let mut pager = DocumentPager::new(5);
        assert_eq!(pager.queue_render(1), Some(1));
        assert!(pager.is_rendering());
        assert_eq!(pager.indicator(), "1 / 5");
    }

    #[test]
    fn requests_during_a_render_collapse_to_the_latest() {
        let mut pager = DocumentPager::new(5);
        pager.queue_render(1);
        assert_eq!(pager.next(), None);
        assert_eq!(pager.next(), None);
        assert_eq!(pager.page(), 3);
        assert_eq!(pager.on_rendered(), Some(3));
        assert!(pager.is_rendering());
        assert_eq!(pager.on_rendered(), None);
        assert!(!pager.is_rendering());
    }

    #[test]
    fn paging_is_bounded() {
        let mut pager = DocumentPager::new(2);
        assert_eq!(pager.prev(), None);
        assert_eq!(pager.page(), 1);
        assert_eq!(pager.next(), Some(2));
        pager.on_rendered();
        assert_eq!(pager.next(), None);
        assert_eq!(pager.page(), 2);
    }

    #[test]
    fn missing_document_is_an_error() {
        let err = list_pages(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, DocumentError::Io { .. }));
    }

    #[test]
    fn directory_pages_are_sorted_and_filtered() {
        let dir = std::env::temp_dir().join(format!("snapfolio-doc-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        for name in ["b.png", "A.png", "notes.txt"] {
            std::fs::write(dir.join(name), b"").unwrap();
        }
        let pages = list_pages(&dir).unwrap();
        let names: Vec<_> = pages
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["A.png", "b.png"]);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn single_file_must_be_an_image() {
        let dir = std::env::temp_dir().join(format!("snapfolio-doc-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let pdf = dir.join("deck.pdf");
        let png = dir.join("cover.png");
        std::fs::write(&pdf, b"%PDF-1.7").unwrap();
        std::fs::write(&png, b"not decoded here").unwrap();

        assert!(matches!(list_pages(&pdf), Err(DocumentError::Empty(_))));
        assert_eq!(list_pages(&png).unwrap(), vec![png.clone()]);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
