use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Layout units per spacing step; matches the default-spacing gap.
pub const BASE_UNIT: f32 = 1.5;

/// Draw order of a line. Later variants are drawn on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Layer {
    Plain,
    Selected,
    Dragged,
}

pub fn z_order(selected: bool, dragged: bool) -> Layer {
    if dragged {
        Layer::Dragged
    } else if selected {
        Layer::Selected
    } else {
        Layer::Plain
    }
}

/// Vertical placement of the active page's lines.
///
/// Lines default to `index * spacing * base_unit`; a drag pins a line to an
/// explicit offset until the overrides are cleared. Overlaps are allowed.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    base_unit: f32,
    overrides: BTreeMap<usize, f32>,
    dragging: Option<usize>,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(BASE_UNIT)
    }
}

impl LayoutEngine {
    pub fn new(base_unit: f32) -> Self {
        Self {
            base_unit,
            overrides: BTreeMap::new(),
            dragging: None,
        }
    }

    pub fn default_position(&self, line_index: usize, spacing: f32) -> f32 {
        line_index as f32 * spacing * self.base_unit
    }

    pub fn position_of(&self, line_index: usize, spacing: f32) -> f32 {
        self.overrides
            .get(&line_index)
            .copied()
            .unwrap_or_else(|| self.default_position(line_index, spacing))
    }

    pub fn set_override(&mut self, line_index: usize, offset: f32) {
        if offset.is_finite() {
            self.overrides.insert(line_index, offset);
        }
    }

    pub fn overrides(&self) -> &BTreeMap<usize, f32> {
        &self.overrides
    }

    pub fn clear_overrides(&mut self) {
        self.overrides.clear();
        self.dragging = None;
    }

    pub fn dragging(&self) -> Option<usize> {
        self.dragging
    }

    pub fn begin_drag(&mut self, line_index: usize) {
        self.dragging = Some(line_index);
    }

    /// Pins the dragged line to `offset`. Returns the line that moved.
    pub fn drag_over(&mut self, offset: f32) -> Option<usize> {
        let line = self.dragging?;
        self.set_override(line, offset);
        Some(line)
    }

    pub fn end_drag(&mut self) -> Option<usize> {
        self.dragging.take()
    }
}
