//! Shared gesture constants for consistent mouse/touch handling.
//!
//! These values are defaults only; every one of them can be overridden
//! through [`GestureConfig`](crate::GestureConfig).
//!
//! # DPI Considerations
//!
//! Distances are in logical pixels. Platform adapters divide by the scale
//! factor before events reach the gesture processor, so the same slop works
//! on high-density touch screens and desktop monitors.

/// Maximum time, in milliseconds, for a press to count as a tap, and
/// maximum time between two taps at the same key for a double-press.
pub const DEFAULT_TAP_THRESHOLD_MS: u64 = 300;

/// Time, in milliseconds, a pointer must stay down before press-and-hold
/// fires.
///
/// Matches Android's long-press timeout (ViewConfiguration.getLongPressTimeout).
pub const DEFAULT_HOLD_THRESHOLD_MS: u64 = 500;

/// Drag threshold in logical pixels.
///
/// A pointer that moves farther than this from its down position is no
/// longer a press-and-hold candidate. Tap timing is not affected by moves.
///
/// Matches common platform conventions (Android uses ~8dp for
/// ViewConfiguration.TOUCH_SLOP).
pub const DRAG_THRESHOLD: f32 = 8.0;
