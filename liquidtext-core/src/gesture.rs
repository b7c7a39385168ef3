use serde::{Deserialize, Serialize};

pub const MIN_SPACING: f32 = 0.8;
pub const MAX_SPACING: f32 = 3.0;
pub const DEFAULT_SPACING: f32 = 1.5;
pub const PINCH_SENSITIVITY: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub x: f32,
    pub y: f32,
}

impl TouchPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &TouchPoint) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Bounds and constants for turning gestures into a line-spacing value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpacingLimits {
    pub min: f32,
    pub max: f32,
    pub default: f32,
    pub sensitivity: f32,
}

impl Default for SpacingLimits {
    fn default() -> Self {
        Self {
            min: MIN_SPACING,
            max: MAX_SPACING,
            default: DEFAULT_SPACING,
            sensitivity: PINCH_SENSITIVITY,
        }
    }
}

impl SpacingLimits {
    pub fn clamp(&self, spacing: f32) -> f32 {
        if spacing.is_nan() {
            self.default
        } else {
            spacing.clamp(self.min, self.max)
        }
    }

    /// Two-finger pinch: spacing follows the ratio of the current contact
    /// distance to the distance captured when the pinch began.
    pub fn update_spacing(
        &self,
        current_spacing: f32,
        reference_distance: f32,
        current_distance: f32,
    ) -> f32 {
        if !reference_distance.is_finite() || reference_distance <= 0.0 {
            return self.clamp(current_spacing);
        }
        let scale = current_distance / reference_distance;
        if scale.is_nan() {
            return self.clamp(current_spacing);
        }
        self.clamp(scale * self.default)
    }

    /// Single-axis pinch emulation used by drag-based input.
    pub fn nudge_spacing(&self, current_spacing: f32, delta_y: f32) -> f32 {
        let next = current_spacing + delta_y * self.sensitivity;
        if next.is_nan() {
            return self.clamp(current_spacing);
        }
        self.clamp(next)
    }

    pub fn reset_spacing(&self) -> f32 {
        self.default
    }
}

/// Tracks the reference distance of an in-progress two-finger pinch.
#[derive(Debug, Default, Clone)]
pub struct PinchGesture {
    reference: Option<f32>,
}

impl PinchGesture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.reference.is_some()
    }

    /// Starts a pinch when at least two contacts are down.
    pub fn touch_start(&mut self, points: &[TouchPoint]) -> bool {
        match points {
            [first, second, ..] => {
                self.reference = Some(first.distance_to(second));
                true
            }
            _ => false,
        }
    }

    /// Returns the new spacing while a pinch is in progress.
    pub fn touch_move(
        &self,
        points: &[TouchPoint],
        current_spacing: f32,
        limits: &SpacingLimits,
    ) -> Option<f32> {
        let reference = self.reference?;
        match points {
            [first, second, ..] => Some(limits.update_spacing(
                current_spacing,
                reference,
                first.distance_to(second),
            )),
            _ => None,
        }
    }

    pub fn touch_end(&mut self, remaining_contacts: usize) {
        if remaining_contacts < 2 {
            self.reference = None;
        }
    }
}
