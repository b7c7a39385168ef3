use serde::{Deserialize, Serialize};

/// Extracted text of one page. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub index: usize,
    pub content: String,
}

impl Page {
    pub fn new(index: usize, content: impl Into<String>) -> Self {
        Self {
            index,
            content: content.into(),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        derive_lines(&self.content)
    }
}

/// Splits page text into its non-blank lines, preserving order.
///
/// Accepts `\n`, `\r\n` and lone `\r` as line breaks. Lines that are empty or
/// contain only whitespace are dropped; the remaining lines keep their
/// original content so that character offsets line up with what is shown.
pub fn derive_lines(text: &str) -> Vec<String> {
    text.split(['\n', '\r'])
        .filter(|line| !line.trim().is_empty())
        .map(str::to_owned)
        .collect()
}

/// Page collection for the session. Pages arrive out of order as extraction
/// completes; a missing page reads as empty.
#[derive(Debug, Default, Clone)]
pub struct PageStore {
    pages: Vec<Option<Page>>,
}

impl PageStore {
    pub fn with_page_count(page_count: usize) -> Self {
        Self {
            pages: vec![None; page_count],
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Stores `content` for `index`. Returns false when the page is out of
    /// range or was already loaded.
    pub fn insert(&mut self, index: usize, content: String) -> bool {
        match self.pages.get_mut(index) {
            Some(slot @ None) => {
                *slot = Some(Page::new(index, content));
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, index: usize) -> Option<&Page> {
        self.pages.get(index).and_then(Option::as_ref)
    }

    pub fn is_loaded(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    pub fn lines(&self, index: usize) -> Vec<String> {
        self.get(index).map(Page::lines).unwrap_or_default()
    }

    /// Loaded pages in ascending index order.
    pub fn loaded(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter().filter_map(Option::as_ref)
    }
}
