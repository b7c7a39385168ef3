use serde::{Deserialize, Serialize};

use crate::search::MatchSpan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Next,
    Previous,
}

/// Emitted when moving the cursor lands on a match outside the displayed page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageChange {
    pub page: usize,
}

/// Cursor over the current result set.
///
/// `cursor` is `Some` exactly when `matches` is non-empty.
#[derive(Debug, Default, Clone)]
pub struct SearchNavigator {
    matches: Vec<MatchSpan>,
    cursor: Option<usize>,
}

impl SearchNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_results(&mut self, matches: Vec<MatchSpan>) {
        self.cursor = if matches.is_empty() { None } else { Some(0) };
        self.matches = matches;
    }

    /// Replaces the results but keeps the cursor on the same match when it
    /// survives the update.
    pub fn refresh_results(&mut self, matches: Vec<MatchSpan>) {
        let kept = self
            .current()
            .and_then(|current| matches.iter().position(|span| span == current));
        self.set_results(matches);
        if kept.is_some() {
            self.cursor = kept;
        }
    }

    pub fn clear(&mut self) {
        self.set_results(Vec::new());
    }

    pub fn matches(&self) -> &[MatchSpan] {
        &self.matches
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current(&self) -> Option<&MatchSpan> {
        self.cursor.and_then(|idx| self.matches.get(idx))
    }

    /// Matches on one line, left to right.
    pub fn matches_on_line(&self, page_index: usize, line_index: usize) -> Vec<&MatchSpan> {
        self.matches
            .iter()
            .filter(|span| span.is_on_line(page_index, line_index))
            .collect()
    }

    pub fn matches_on_page(&self, page_index: usize) -> Vec<&MatchSpan> {
        self.matches
            .iter()
            .filter(|span| span.page_index == page_index)
            .collect()
    }

    /// Moves the cursor one step with wraparound in both directions.
    pub fn advance(&mut self, direction: Direction, displayed_page: usize) -> Option<PageChange> {
        let len = self.matches.len();
        let current = self.cursor?;
        if len == 0 {
            return None;
        }
        let next = match direction {
            Direction::Next => (current + 1) % len,
            Direction::Previous => (current + len - 1) % len,
        };
        self.cursor = Some(next);
        let page = self.matches[next].page_index;
        (page != displayed_page).then_some(PageChange { page })
    }

    pub fn position_label(&self) -> String {
        match self.cursor {
            Some(idx) => format!("{} of {}", idx + 1, self.matches.len()),
            None => "No results".to_owned(),
        }
    }
}
