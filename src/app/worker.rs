//! Background network/decode jobs to keep the UI thread responsive.
//!
//! Every job runs on its own thread and reports back over the update
//! channel.  Page renders carry the document generation so results from a
//! previously opened document are ignored.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::core::catalog::{self, CatalogError, FileRecord};
use crate::core::document::{self, DocumentError};

pub enum WorkerUpdate {
    CatalogLoaded {
        generation: u64,
        result: Result<Vec<FileRecord>, CatalogError>,
    },
    Downloaded {
        title: String,
        result: Result<PathBuf, CatalogError>,
    },
    DocumentOpened {
        generation: u64,
        result: Result<Vec<PathBuf>, DocumentError>,
    },
    PageRendered {
        generation: u64,
        page: usize,
        result: Result<Arc<image::RgbaImage>, DocumentError>,
    },
}

pub fn spawn_catalog_fetch(tx: mpsc::UnboundedSender<WorkerUpdate>, generation: u64, base: String) {
    std::thread::spawn(move || {
        let t0 = std::time::Instant::now();
        let result = catalog::fetch_catalog(&base);
        match &result {
            Ok(files) => tracing::info!(count = files.len(), "catalog loaded in {:.2?}", t0.elapsed()),
            Err(e) => tracing::warn!("catalog fetch failed: {e}"),
        }
        let _ = tx.send(WorkerUpdate::CatalogLoaded { generation, result });
    });
}

pub fn spawn_download(
    tx: mpsc::UnboundedSender<WorkerUpdate>,
    base: String,
    record: FileRecord,
    dir: PathBuf,
) {
    std::thread::spawn(move || {
        let result = catalog::download(&base, &record, &dir);
        if let Err(e) = &result {
            tracing::warn!(file = %record.filename, "download failed: {e}");
        }
        let _ = tx.send(WorkerUpdate::Downloaded {
            title: record.display_title().to_string(),
            result,
        });
    });
}

pub fn spawn_document_open(tx: mpsc::UnboundedSender<WorkerUpdate>, generation: u64, path: PathBuf) {
    std::thread::spawn(move || {
        let result = document::list_pages(&path);
        if let Err(e) = &result {
            tracing::warn!("document open failed: {e}");
        }
        let _ = tx.send(WorkerUpdate::DocumentOpened { generation, result });
    });
}

/// Decode page `page` (1-based) of `pages`, fitted to `max_w × max_h`.
pub fn spawn_page_render(
    tx: mpsc::UnboundedSender<WorkerUpdate>,
    generation: u64,
    pages: Vec<PathBuf>,
    page: usize,
    max_w: u32,
    max_h: u32,
) {
    std::thread::spawn(move || {
        let result = match pages.get(page.saturating_sub(1)) {
            Some(path) => document::load_page(path, max_w, max_h).map(Arc::new),
            None => Err(DocumentError::Empty(PathBuf::new())),
        };
        let _ = tx.send(WorkerUpdate::PageRendered {
            generation,
            page,
            result,
        });
    });
}
