use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::lines::Page;

/// Queries shorter than this (in characters) never match anything.
pub const MIN_QUERY_LEN: usize = 2;

/// One occurrence of the query inside a single line.
///
/// `start` and `end` are character offsets into the line text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSpan {
    pub page_index: usize,
    pub line_index: usize,
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl MatchSpan {
    pub fn is_on_line(&self, page_index: usize, line_index: usize) -> bool {
        self.page_index == page_index && self.line_index == line_index
    }
}

/// Finds every case-insensitive literal occurrence of `query` across `pages`.
pub fn search<'a, I>(query: &str, pages: I) -> Vec<MatchSpan>
where
    I: IntoIterator<Item = &'a Page>,
{
    search_with_min_len(query, pages, MIN_QUERY_LEN)
}

/// Same as [`search`] with a configurable minimum query length.
///
/// The query is escaped before compiling, so characters such as `(` or `.`
/// match themselves. Results are ordered by page, then line, then position.
pub fn search_with_min_len<'a, I>(query: &str, pages: I, min_len: usize) -> Vec<MatchSpan>
where
    I: IntoIterator<Item = &'a Page>,
{
    if query.chars().count() < min_len.max(1) {
        return Vec::new();
    }

    let matcher = match RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    {
        Ok(matcher) => matcher,
        Err(err) => {
            warn!(?err, query_len = query.len(), "search query rejected");
            return Vec::new();
        }
    };

    let mut pages: Vec<&Page> = pages.into_iter().collect();
    pages.sort_by_key(|page| page.index);

    let mut results = Vec::new();
    for page in pages {
        for (line_index, line) in page.lines().iter().enumerate() {
            for found in matcher.find_iter(line) {
                let start = line[..found.start()].chars().count();
                let text = found.as_str().to_owned();
                let end = start + text.chars().count();
                results.push(MatchSpan {
                    page_index: page.index,
                    line_index,
                    start,
                    end,
                    text,
                });
            }
        }
    }
    results
}
