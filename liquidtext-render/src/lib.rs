use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use liquidtext_core::{DocumentBackend, DocumentProvider, MemoryDocument};
#[cfg(feature = "pdf")]
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, instrument};

#[cfg(feature = "pdf")]
mod pdf;

#[cfg(feature = "pdf")]
pub use pdf::PdfiumTextFactory;

/// Separates pages in plain-text documents.
pub const PAGE_BREAK: char = '\u{c}';

#[derive(Debug, Error)]
pub enum OpenError {
    #[error("unsupported document type: {0:?}")]
    Unsupported(PathBuf),
    #[error("PDF support is not compiled in (enable the `pdf` feature)")]
    PdfDisabled,
}

/// Opens `.txt`/`.md` files; form feeds split the text into pages.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextProvider;

#[async_trait]
impl DocumentProvider for PlainTextProvider {
    async fn open(&self, path: &Path) -> Result<Arc<dyn DocumentBackend>> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {:?}", path))?;
        let pages = split_pages(&raw);
        debug!(path = %path.display(), pages = pages.len(), "plain text document loaded");
        Ok(Arc::new(MemoryDocument::new(path.to_path_buf(), pages)))
    }
}

/// Splits on form feeds. A trailing page break does not start a new page and
/// an empty file still has one (empty) page.
pub fn split_pages(raw: &str) -> Vec<String> {
    let mut pages: Vec<String> = raw.split(PAGE_BREAK).map(str::to_owned).collect();
    if pages.len() > 1 && pages.last().is_some_and(|page| page.trim().is_empty()) {
        pages.pop();
    }
    pages
}

/// Picks a backend by file extension. PDF bindings are created on first use.
#[derive(Default)]
pub struct DocumentOpener {
    #[cfg(feature = "pdf")]
    pdf: Mutex<Option<Arc<PdfiumTextFactory>>>,
}

impl DocumentOpener {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(feature = "pdf")]
    fn pdf_factory(&self) -> Result<Arc<PdfiumTextFactory>> {
        let mut guard = self.pdf.lock();
        if let Some(factory) = guard.as_ref() {
            return Ok(Arc::clone(factory));
        }
        let factory = Arc::new(PdfiumTextFactory::new()?);
        *guard = Some(Arc::clone(&factory));
        Ok(factory)
    }
}

#[async_trait]
impl DocumentProvider for DocumentOpener {
    #[instrument(skip(self))]
    async fn open(&self, path: &Path) -> Result<Arc<dyn DocumentBackend>> {
        match DocumentKind::from_path(path) {
            Some(DocumentKind::Text) => PlainTextProvider.open(path).await,
            #[cfg(feature = "pdf")]
            Some(DocumentKind::Pdf) => {
                let factory = self.pdf_factory()?;
                factory.open(path).await
            }
            #[cfg(not(feature = "pdf"))]
            Some(DocumentKind::Pdf) => Err(OpenError::PdfDisabled.into()),
            None => Err(OpenError::Unsupported(path.to_path_buf()).into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Text,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "txt" | "text" | "md" => Some(DocumentKind::Text),
            _ => None,
        }
    }
}
