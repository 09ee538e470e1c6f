use unipointer_core::{Clock, DeviceId, Point, PointerId, UptimeClock};
use unipointer_input::{RawMouseEvent, RawTouchEvent};
use winit::dpi::PhysicalPosition;

/// Builds raw notifications from winit window events.
///
/// Positions arrive in physical pixels and are divided by the window scale
/// factor. Every notification is stamped with the adapter's clock, which
/// should be the router's so that timestamps and frame ticks line up.
pub struct DesktopWinitPlatform {
    scale_factor: f64,
    clock: UptimeClock,
}

impl DesktopWinitPlatform {
    pub fn new(scale_factor: f64) -> Self {
        Self::with_clock(scale_factor, UptimeClock::new())
    }

    pub fn with_clock(scale_factor: f64, clock: UptimeClock) -> Self {
        Self {
            scale_factor,
            clock,
        }
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn set_scale_factor(&mut self, factor: f64) {
        self.scale_factor = factor;
    }

    pub fn clock(&self) -> UptimeClock {
        self.clock
    }

    pub fn pointer_position(&self, position: PhysicalPosition<f64>) -> Point {
        Point {
            x: (position.x / self.scale_factor) as f32,
            y: (position.y / self.scale_factor) as f32,
        }
    }

    /// Raw mouse notification for `button` (0 primary, 1 secondary,
    /// 2 middle, 3 back, 4 forward) at `position`.
    pub fn mouse_event(&self, position: PhysicalPosition<f64>, button: u8) -> RawMouseEvent {
        let logical = self.pointer_position(position);
        RawMouseEvent::new(logical.x, logical.y, button, self.clock.now_millis())
    }

    /// Raw touch notification for contact `id` on `device_id`. `force` is
    /// the normalized force winit reports, when the hardware has one.
    pub fn touch_event(
        &self,
        device_id: DeviceId,
        id: PointerId,
        position: PhysicalPosition<f64>,
        force: Option<f64>,
    ) -> RawTouchEvent {
        let logical = self.pointer_position(position);
        let raw = RawTouchEvent::new(device_id, id, logical.x, logical.y, self.clock.now_millis());
        match force {
            Some(force) => raw.with_pressure(force as f32),
            None => raw,
        }
    }
}

impl Default for DesktopWinitPlatform {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_are_divided_by_scale_factor() {
        let mut platform = DesktopWinitPlatform::new(2.0);
        assert_eq!(
            platform.pointer_position(PhysicalPosition::new(40.0, 10.0)),
            Point::new(20.0, 5.0)
        );

        platform.set_scale_factor(1.0);
        let raw = platform.mouse_event(PhysicalPosition::new(40.0, 10.0), 1);
        assert_eq!(raw.position(), Point::new(40.0, 10.0));
        assert_eq!(raw.button, 1);
    }

    #[test]
    fn touch_carries_force_as_pressure() {
        let platform = DesktopWinitPlatform::default();
        let pressed = platform.touch_event(3, 7, PhysicalPosition::new(1.0, 2.0), Some(0.5));
        assert_eq!(pressed.device_id, 3);
        assert_eq!(pressed.id, 7);
        assert_eq!(pressed.pressure, Some(0.5));

        let plain = platform.touch_event(3, 7, PhysicalPosition::new(1.0, 2.0), None);
        assert_eq!(plain.pressure, None);
    }

    #[test]
    fn shares_the_given_clock() {
        let clock = UptimeClock::new();
        let platform = DesktopWinitPlatform::with_clock(1.0, clock);
        assert_eq!(platform.clock().origin(), clock.origin());
        let raw = platform.mouse_event(PhysicalPosition::new(0.0, 0.0), 0);
        assert!(raw.timestamp <= clock.now_millis());
    }
}
