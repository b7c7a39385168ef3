use serde::{Deserialize, Serialize};

use crate::search::MatchSpan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentKind {
    Plain,
    Match,
    CurrentMatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub text: String,
}

impl Segment {
    fn new(kind: SegmentKind, text: String) -> Self {
        Self { kind, text }
    }
}

/// Splits a line into plain and highlighted runs.
///
/// `line_matches` must belong to this line and be ordered left to right.
/// Joining the returned segment texts always reproduces `line_text`; spans
/// that overlap an earlier one or run past the end are trimmed.
pub fn render_line(
    line_text: &str,
    line_matches: &[&MatchSpan],
    current: Option<&MatchSpan>,
) -> Vec<Segment> {
    let chars: Vec<char> = line_text.chars().collect();
    let mut segments = Vec::new();
    let mut cursor = 0;

    for span in line_matches {
        let start = span.start.max(cursor).min(chars.len());
        let end = span.end.min(chars.len());
        if start >= end {
            continue;
        }
        if start > cursor {
            segments.push(Segment::new(
                SegmentKind::Plain,
                chars[cursor..start].iter().collect(),
            ));
        }
        let kind = if current == Some(*span) {
            SegmentKind::CurrentMatch
        } else {
            SegmentKind::Match
        };
        segments.push(Segment::new(kind, chars[start..end].iter().collect()));
        cursor = end;
    }

    if cursor < chars.len() || segments.is_empty() {
        segments.push(Segment::new(
            SegmentKind::Plain,
            chars[cursor..].iter().collect(),
        ));
    }
    segments
}
