//! File catalog: the records behind the resources board, plus the blocking
//! HTTP calls that fetch the list and download individual files.
//!
//! Nothing here touches the UI; the runtime calls these from worker threads.

use std::path::{Path, PathBuf};

use chrono::{Local, TimeZone};
use serde::Deserialize;
use thiserror::Error;

/// Path of the listing endpoint relative to the catalog base URL.
pub const FILES_ENDPOINT: &str = "/api/files";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server answered {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed catalog: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("could not write download: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid file name {0:?}")]
    InvalidName(String),
}

/// One downloadable entry, as served by the listing endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default, rename = "originalName")]
    pub original_name: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub size_bytes: Option<u64>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub timestamp: Option<f64>,
}

impl FileRecord {
    /// Name the file is saved under.
    pub fn download_name(&self) -> &str {
        self.original_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.filename)
    }

    /// Title shown on the board, falling back to the file name.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            self.download_name()
        } else {
            &self.title
        }
    }

    pub fn display_size(&self) -> String {
        match (&self.size, self.size_bytes) {
            (Some(s), _) if !s.is_empty() => s.clone(),
            (_, Some(bytes)) => format_size(bytes),
            _ => "—".into(),
        }
    }

    pub fn display_date(&self) -> String {
        match (&self.date, self.timestamp) {
            (Some(d), _) if !d.is_empty() => d.clone(),
            (_, Some(ts)) => format_date(ts),
            _ => "—".into(),
        }
    }
}

/// What the board currently shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum BoardState {
    #[default]
    Loading,
    Loaded(Vec<FileRecord>),
    Empty,
    Failed,
    /// No catalog URL was configured.
    Disabled,
}

impl BoardState {
    pub fn from_result(result: &Result<Vec<FileRecord>, CatalogError>) -> Self {
        match result {
            Ok(files) if files.is_empty() => BoardState::Empty,
            Ok(files) => BoardState::Loaded(files.clone()),
            Err(_) => BoardState::Failed,
        }
    }

    /// Inline message for non-list states.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            BoardState::Loading => Some("Loading…"),
            BoardState::Empty => Some("No files yet."),
            BoardState::Failed => Some("Unable to load the file list."),
            BoardState::Disabled => Some("No catalog configured."),
            BoardState::Loaded(_) => None,
        }
    }

    pub fn records(&self) -> &[FileRecord] {
        match self {
            BoardState::Loaded(files) => files,
            _ => &[],
        }
    }
}

// ───────────────────────────────────────── formatting ────────

/// `"1.50 MB"` from 0.1 MB upward, whole kilobytes below.
pub fn format_size(bytes: u64) -> String {
    let mb = bytes as f64 / (1024.0 * 1024.0);
    if mb >= 0.1 {
        format!("{mb:.2} MB")
    } else {
        format!("{} KB", bytes / 1024)
    }
}

/// Local `YYYY.MM.DD` for a unix timestamp in seconds.
pub fn format_date(timestamp: f64) -> String {
    if !timestamp.is_finite() {
        return "—".into();
    }
    match Local.timestamp_opt(timestamp.trunc() as i64, 0).single() {
        Some(dt) => dt.format("%Y.%m.%d").to_string(),
        None => "—".into(),
    }
}

// ───────────────────────────────────────── http ──────────────

/// Join a possibly-relative record URL onto the catalog base.
pub fn resolve_url(base: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }
    let base = base.trim_end_matches('/');
    if url.starts_with('/') {
        format!("{base}{url}")
    } else {
        format!("{base}/{url}")
    }
}

/// Fetch and decode the file list.
pub fn fetch_catalog(base: &str) -> Result<Vec<FileRecord>, CatalogError> {
    let url = resolve_url(base, FILES_ENDPOINT);
    let response = reqwest::blocking::get(&url)?;
    if !response.status().is_success() {
        return Err(CatalogError::Status(response.status()));
    }
    let body = response.text()?;
    parse_catalog(&body)
}

pub fn parse_catalog(body: &str) -> Result<Vec<FileRecord>, CatalogError> {
    Ok(serde_json::from_str(body)?)
}

/// Reduce a server-supplied name to a bare file name.
pub fn safe_file_name(name: &str) -> Result<String, CatalogError> {
    let base = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .trim();
    if base.is_empty() || base.starts_with('.') {
        return Err(CatalogError::InvalidName(name.to_string()));
    }
    Ok(base.to_string())
}

/// Download `record` into `dir`, returning the written path.
pub fn download(base: &str, record: &FileRecord, dir: &Path) -> Result<PathBuf, CatalogError> {
    let name = safe_file_name(record.download_name())?;
    let url = resolve_url(base, &record.url);
    let response = reqwest::blocking::get(&url)?;
    if !response.status().is_success() {
        return Err(CatalogError::Status(response.status()));
    }
    let bytes = response.bytes()?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(name);
    std::fs::write(&path, &bytes)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"[
        {"id":"a.pdf","title":"Inception deck","category":"Deck","filename":"a.pdf",
         "url":"/uploads/a.pdf","size":"1.20 MB","date":"2025.03.01","timestamp":1740787200.0},
        {"id":"b.zip","title":"","category":"","filename":"b.zip","originalName":"Bundle.zip",
         "url":"/uploads/b.zip","size_bytes":20480}
    ]"#;

    #[test]
    fn parses_listing_with_missing_fields() {
        let files = parse_catalog(LISTING).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].display_title(), "Inception deck");
        assert_eq!(files[0].display_size(), "1.20 MB");
        assert_eq!(files[0].display_date(), "2025.03.01");
        assert_eq!(files[1].download_name(), "Bundle.zip");
        assert_eq!(files[1].display_title(), "Bundle.zip");
        assert_eq!(files[1].display_size(), "20 KB");
        assert_eq!(files[1].display_date(), "—");
    }

    #[test]
    fn malformed_listing_is_an_error() {
        assert!(matches!(parse_catalog("{oops"), Err(CatalogError::Decode(_))));
    }

    #[test]
    fn board_states() {
        assert_eq!(BoardState::from_result(&Ok(vec![])), BoardState::Empty);
        let failed = BoardState::from_result(&Err(CatalogError::InvalidName("x".into())));
        assert_eq!(failed.message(), Some("Unable to load the file list."));
        assert!(failed.records().is_empty());
        let loaded = BoardState::from_result(&parse_catalog(LISTING));
        assert_eq!(loaded.records().len(), 2);
        assert_eq!(loaded.message(), None);
    }

    #[test]
    fn size_formatting() {
        assert_eq!(format_size(2048), "2 KB");
        assert_eq!(format_size(1024 * 1024 * 3 / 2), "1.50 MB");
        assert_eq!(format_size(104_858), "0.10 MB");
    }

    #[test]
    fn urls_resolve_against_base() {
        assert_eq!(
            resolve_url("http://localhost:8000/", "/uploads/a.pdf"),
            "http://localhost:8000/uploads/a.pdf"
        );
        assert_eq!(resolve_url("http://h", "x"), "http://h/x");
        assert_eq!(resolve_url("http://h", "https://cdn/x"), "https://cdn/x");
    }

    #[test]
    fn download_names_are_basenames() {
        assert_eq!(safe_file_name("../../etc/passwd").unwrap(), "passwd");
        assert_eq!(safe_file_name("report.pdf").unwrap(), "report.pdf");
        assert!(safe_file_name("").is_err());
        assert!(safe_file_name("..").is_err());
        assert!(safe_file_name(".hidden").is_err());
    }
}
