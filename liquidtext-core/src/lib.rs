use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod config;
pub mod gesture;
pub mod highlight;
pub mod layout;
pub mod lines;
pub mod navigator;
pub mod search;
pub mod selection;
pub mod viewer;

pub use config::{ConfigError, ViewerConfig};
pub use gesture::{PinchGesture, SpacingLimits, TouchPoint};
pub use highlight::{render_line, Segment, SegmentKind};
pub use layout::{LayoutEngine, Layer};
pub use lines::{derive_lines, Page, PageStore};
pub use navigator::{Direction, PageChange, SearchNavigator};
pub use search::{search, MatchSpan};
pub use selection::SelectionSet;
pub use viewer::{Command, ExtractionTicket, LineView, SessionEvent, ViewSnapshot, ViewerSession};

pub type DocumentId = Uuid;

static DOCUMENT_NAMESPACE: Lazy<Uuid> = Lazy::new(|| {
    Uuid::parse_str("3f1e9a52-6c0b-5d7e-a4c8-91b20d6fe357").expect("valid namespace UUID")
});

/// Stable identifier for a document, derived from its resolved path.
pub fn document_id_for_path(path: &Path) -> DocumentId {
    let resolved = path
        .canonicalize()
        .or_else(|_| {
            if path.is_absolute() {
                Ok(path.to_path_buf())
            } else {
                std::env::current_dir().map(|cwd| cwd.join(path))
            }
        })
        .unwrap_or_else(|_| path.to_path_buf());
    let rendered = resolved.to_string_lossy();
    Uuid::new_v5(&*DOCUMENT_NAMESPACE, rendered.as_bytes())
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DocumentMetadata {
    pub title: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DocumentInfo {
    pub id: DocumentId,
    pub path: PathBuf,
    pub page_count: usize,
    pub metadata: DocumentMetadata,
}

impl DocumentInfo {
    pub fn display_name(&self) -> String {
        self.metadata.title.clone().unwrap_or_else(|| {
            self.path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.path.display().to_string())
        })
    }
}

/// A loaded document able to produce plain text per page.
pub trait DocumentBackend: Send + Sync {
    fn info(&self) -> &DocumentInfo;
    fn page_text(&self, page_index: usize) -> Result<String>;
}

#[async_trait::async_trait]
pub trait DocumentProvider: Send + Sync {
    async fn open(&self, path: &Path) -> Result<Arc<dyn DocumentBackend>>;
}

/// In-memory document, handy for tests and piped input.
pub struct MemoryDocument {
    info: DocumentInfo,
    pages: Vec<String>,
}

impl MemoryDocument {
    pub fn new(path: PathBuf, pages: Vec<String>) -> Self {
        let info = DocumentInfo {
            id: document_id_for_path(&path),
            path,
            page_count: pages.len(),
            metadata: DocumentMetadata::default(),
        };
        Self { info, pages }
    }
}

impl DocumentBackend for MemoryDocument {
    fn info(&self) -> &DocumentInfo {
        &self.info
    }

    fn page_text(&self, page_index: usize) -> Result<String> {
        self.pages
            .get(page_index)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("page {} out of range", page_index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn document_id_is_stable_for_same_path() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("sample.pdf");
        std::fs::write(&file_path, b"dummy").unwrap();

        let first = document_id_for_path(&file_path);
        let second = document_id_for_path(&file_path);

        assert_eq!(first, second);
        assert_ne!(first, document_id_for_path(&dir.path().join("other.pdf")));
    }

    #[test]
    fn memory_document_reports_missing_pages() {
        let doc = MemoryDocument::new(PathBuf::from("notes.txt"), vec!["one".into()]);
        assert_eq!(doc.info().page_count, 1);
        assert_eq!(doc.page_text(0).unwrap(), "one");
        assert!(doc.page_text(1).is_err());
        assert_eq!(doc.info().display_name(), "notes.txt");
    }
}
