//! Device-specific notifications as the host delivers them.
//!
//! These carry only what the host reports. They are not validated; the
//! processor passes coordinates and device data straight through.

use unipointer_core::{DeviceId, Point, PointerId, Size, Timestamp};

/// A mouse move, drag, press or release.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawMouseEvent {
    pub x: f32,
    pub y: f32,
    /// Button index: 0 primary, 1 secondary, 2 middle, 3 back, 4 forward.
    /// Moves report the button they were delivered for, 0 when none is held.
    pub button: u8,
    pub timestamp: Timestamp,
}

impl RawMouseEvent {
    pub fn new(x: f32, y: f32, button: u8, timestamp: Timestamp) -> Self {
        Self {
            x,
            y,
            button,
            timestamp,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A touch contact notification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawTouchEvent {
    /// Touch surface that reported the contact.
    pub device_id: DeviceId,
    /// Contact slot on that surface.
    pub id: PointerId,
    pub x: f32,
    pub y: f32,
    pub pressure: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub timestamp: Timestamp,
}

impl RawTouchEvent {
    pub fn new(device_id: DeviceId, id: PointerId, x: f32, y: f32, timestamp: Timestamp) -> Self {
        Self {
            device_id,
            id,
            x,
            y,
            pressure: None,
            width: None,
            height: None,
            timestamp,
        }
    }

    pub fn with_pressure(mut self, pressure: f32) -> Self {
        self.pressure = Some(pressure);
        self
    }

    pub fn with_contact_size(mut self, width: f32, height: f32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Contact size when the device reported at least one dimension; the
    /// missing one is zero.
    pub fn contact_size(&self) -> Option<Size> {
        match (self.width, self.height) {
            (None, None) => None,
            (width, height) => Some(Size::new(width.unwrap_or(0.0), height.unwrap_or(0.0))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_size_only_when_reported() {
        let touch = RawTouchEvent::new(1, 2, 3.0, 4.0, 5);
        assert_eq!(touch.contact_size(), None);
        assert_eq!(
            touch.with_contact_size(6.0, 8.0).contact_size(),
            Some(Size::new(6.0, 8.0))
        );
        let width_only = RawTouchEvent {
            width: Some(2.0),
            ..touch
        };
        assert_eq!(width_only.contact_size(), Some(Size::new(2.0, 0.0)));
    }
}
