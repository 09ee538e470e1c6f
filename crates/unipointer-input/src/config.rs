//! Tunables for the processors and the router.

use web_time::Duration;

use crate::bus::Priority;
use crate::gesture_constants::{DEFAULT_HOLD_THRESHOLD_MS, DEFAULT_TAP_THRESHOLD_MS, DRAG_THRESHOLD};

/// Whether raw events are reported as consumed back to the host after
/// normalization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PointerConfig {
    pub consume_mouse_events: bool,
    pub consume_touch_events: bool,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            consume_mouse_events: true,
            consume_touch_events: true,
        }
    }
}

impl PointerConfig {
    pub fn with_consume_mouse_events(mut self, consume: bool) -> Self {
        self.consume_mouse_events = consume;
        self
    }

    pub fn with_consume_touch_events(mut self, consume: bool) -> Self {
        self.consume_touch_events = consume;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureConfig {
    /// Longest press that still counts as a tap, and longest gap between the
    /// ups of two taps that forms a double-press.
    pub tap_threshold: Duration,
    /// How long a still pointer must stay down before press-and-hold fires.
    /// `None` disables hold detection.
    pub hold_threshold: Option<Duration>,
    /// Distance a held pointer may wander before it stops being a hold.
    pub hold_slop: f32,
    /// Maximum distance between the ups of a double-press. `None` keeps
    /// double-press purely time based.
    pub double_press_slop: Option<f32>,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            tap_threshold: Duration::from_millis(DEFAULT_TAP_THRESHOLD_MS),
            hold_threshold: Some(Duration::from_millis(DEFAULT_HOLD_THRESHOLD_MS)),
            hold_slop: DRAG_THRESHOLD,
            double_press_slop: None,
        }
    }
}

impl GestureConfig {
    pub fn with_tap_threshold(mut self, threshold: Duration) -> Self {
        self.tap_threshold = threshold;
        self
    }

    pub fn with_hold_threshold(mut self, threshold: Option<Duration>) -> Self {
        self.hold_threshold = threshold;
        self
    }

    pub fn with_hold_slop(mut self, slop: f32) -> Self {
        self.hold_slop = slop;
        self
    }

    pub fn with_double_press_slop(mut self, slop: Option<f32>) -> Self {
        self.double_press_slop = slop;
        self
    }
}

/// Everything an [`InputRouter`](crate::InputRouter) needs at construction.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct InputConfig {
    pub pointer: PointerConfig,
    pub gesture: GestureConfig,
    /// Priority the gesture processor subscribes to pointer channels with.
    pub gesture_priority: Priority,
}

impl InputConfig {
    pub fn with_pointer(mut self, pointer: PointerConfig) -> Self {
        self.pointer = pointer;
        self
    }

    pub fn with_gesture(mut self, gesture: GestureConfig) -> Self {
        self.gesture = gesture;
        self
    }

    pub fn with_gesture_priority(mut self, priority: Priority) -> Self {
        self.gesture_priority = priority;
        self
    }
}
