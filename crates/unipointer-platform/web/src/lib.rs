use unipointer_core::{Clock, DeviceId, Point, PointerId, UptimeClock};
use unipointer_input::{RawMouseEvent, RawTouchEvent};
use web_sys::{MouseEvent, Touch, TouchEvent};

/// Device id reported for the browser's single touch surface.
pub const WEB_TOUCH_DEVICE: DeviceId = 0;

/// Builds raw notifications from DOM events.
pub struct WebPlatform {
    clock: UptimeClock,
}

impl WebPlatform {
    pub fn new() -> Self {
        Self::with_clock(UptimeClock::new())
    }

    pub fn with_clock(clock: UptimeClock) -> Self {
        Self { clock }
    }

    pub fn clock(&self) -> UptimeClock {
        self.clock
    }

    pub fn pointer_position(&self, x: f64, y: f64) -> Point {
        // offset_x/offset_y are already in CSS pixels (logical coordinates)
        Point {
            x: x as f32,
            y: y as f32,
        }
    }

    pub fn mouse_at(&self, x: f64, y: f64, button: i16) -> RawMouseEvent {
        let logical = self.pointer_position(x, y);
        // DOM buttons are 0..=4 in the same order; anything else is primary.
        let button = u8::try_from(button).unwrap_or(0);
        RawMouseEvent::new(logical.x, logical.y, button, self.clock.now_millis())
    }

    pub fn touch_at(&self, id: PointerId, x: f64, y: f64, force: f32) -> RawTouchEvent {
        let logical = self.pointer_position(x, y);
        let raw = RawTouchEvent::new(
            WEB_TOUCH_DEVICE,
            id,
            logical.x,
            logical.y,
            self.clock.now_millis(),
        );
        // Browsers without force support report 0.
        if force > 0.0 {
            raw.with_pressure(force)
        } else {
            raw
        }
    }

    pub fn mouse_event(&self, event: &MouseEvent) -> RawMouseEvent {
        self.mouse_at(
            f64::from(event.offset_x()),
            f64::from(event.offset_y()),
            event.button(),
        )
    }

    /// Raw notifications for every contact that changed in `event`, with
    /// client coordinates made relative to `origin` (the target's top-left
    /// corner in client space).
    pub fn touch_events(&self, event: &TouchEvent, origin: (f64, f64)) -> Vec<RawTouchEvent> {
        let changed = event.changed_touches();
        (0..changed.length())
            .filter_map(|index| changed.get(index))
            .map(|touch| self.touch(&touch, origin))
            .collect()
    }

    fn touch(&self, touch: &Touch, origin: (f64, f64)) -> RawTouchEvent {
        let x = f64::from(touch.client_x()) - origin.0;
        let y = f64::from(touch.client_y()) - origin.1;
        let raw = self.touch_at(PointerId::from(touch.identifier()), x, y, touch.force());
        let (width, height) = (touch.radius_x(), touch.radius_y());
        if width > 0 || height > 0 {
            raw.with_contact_size(width as f32 * 2.0, height as f32 * 2.0)
        } else {
            raw
        }
    }
}

impl Default for WebPlatform {
    fn default() -> Self {
        Self::new()
    }
}
