use std::collections::BTreeSet;

/// Selected line indices on the active page.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SelectionSet {
    lines: BTreeSet<usize>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips membership of `line_index` and returns whether it is now selected.
    pub fn toggle(&mut self, line_index: usize) -> bool {
        if self.lines.remove(&line_index) {
            false
        } else {
            self.lines.insert(line_index);
            true
        }
    }

    pub fn contains(&self, line_index: usize) -> bool {
        self.lines.contains(&line_index)
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.lines.iter().copied()
    }
}
