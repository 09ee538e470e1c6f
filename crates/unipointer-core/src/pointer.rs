//! The unified pointer event model.
//!
//! A [`PointerEvent`] describes one input sample regardless of whether it
//! came from a mouse button or a touch contact. Events are `Copy` and carry
//! no shared state, so they can be handed to listeners on any thread.

use crate::geometry::{Point, Size};

/// Identifies a physical or logical input device. Always 0 for the mouse.
pub type DeviceId = i64;

/// Identifies a contact within a device: mouse button index or touch slot.
pub type PointerId = i64;

/// Milliseconds on the uptime clock that stamped the raw input.
pub type Timestamp = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerType {
    Mouse,
    Touch,
    Pen,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    Down,
    Up,
    Move,
    Cancel,
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary = 0,
    Secondary = 1,
    Middle = 2,
    Back = 3,
    Forward = 4,
}

impl PointerButton {
    /// Maps a raw button index to a known button.
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Primary),
            1 => Some(Self::Secondary),
            2 => Some(Self::Middle),
            3 => Some(Self::Back),
            4 => Some(Self::Forward),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PointerButtons(u8);

impl PointerButtons {
    pub const NONE: Self = Self(0);

    pub fn new() -> Self {
        Self::NONE
    }

    pub fn with(mut self, button: PointerButton) -> Self {
        self.insert(button);
        self
    }

    pub fn insert(&mut self, button: PointerButton) {
        self.0 |= 1 << (button as u8);
    }

    pub fn remove(&mut self, button: PointerButton) {
        self.0 &= !(1 << (button as u8));
    }

    pub fn contains(&self, button: PointerButton) -> bool {
        (self.0 & (1 << (button as u8))) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl Default for PointerButtons {
    fn default() -> Self {
        Self::NONE
    }
}

/// Composite identity used to correlate a pointer's down with its later
/// events: `(pointer type, device, pointer)`.
///
/// The pointer type keeps mouse button 0 and touch slot 0 on device 0 apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PointerKey {
    pub pointer_type: PointerType,
    pub device_id: DeviceId,
    pub pointer_id: PointerId,
}

impl PointerKey {
    pub const fn new(pointer_type: PointerType, device_id: DeviceId, pointer_id: PointerId) -> Self {
        Self {
            pointer_type,
            device_id,
            pointer_id,
        }
    }

    pub const fn mouse(button: u8) -> Self {
        Self::new(PointerType::Mouse, 0, button as PointerId)
    }

    pub const fn touch(device_id: DeviceId, slot: PointerId) -> Self {
        Self::new(PointerType::Touch, device_id, slot)
    }
}

/// One normalized input sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub device_id: DeviceId,
    pub pointer_id: PointerId,
    /// Position of this pointer among the currently active pointers.
    pub pointer_index: usize,
    pub position: Point,
    pub pointer_type: PointerType,
    pub kind: PointerEventKind,
    pub timestamp: Timestamp,
    /// Mouse buttons held when the sample was taken. Empty for touch.
    pub buttons: PointerButtons,
    /// Device-reported pressure, passed through untouched.
    pub pressure: Option<f32>,
    /// Device-reported contact width and height, passed through untouched.
    pub contact_size: Option<Size>,
}

impl PointerEvent {
    pub fn new(
        kind: PointerEventKind,
        pointer_type: PointerType,
        device_id: DeviceId,
        pointer_id: PointerId,
        position: Point,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            device_id,
            pointer_id,
            pointer_index: 0,
            position,
            pointer_type,
            kind,
            timestamp,
            buttons: PointerButtons::NONE,
            pressure: None,
            contact_size: None,
        }
    }

    pub fn key(&self) -> PointerKey {
        PointerKey::new(self.pointer_type, self.device_id, self.pointer_id)
    }

    pub fn with_pointer_index(mut self, pointer_index: usize) -> Self {
        self.pointer_index = pointer_index;
        self
    }

    /// Set the buttons state for this event
    pub fn with_buttons(mut self, buttons: PointerButtons) -> Self {
        self.buttons = buttons;
        self
    }

    pub fn with_pressure(mut self, pressure: Option<f32>) -> Self {
        self.pressure = pressure;
        self
    }

    pub fn with_contact_size(mut self, contact_size: Option<Size>) -> Self {
        self.contact_size = contact_size;
        self
    }

    /// Copy of this event retagged with another lifecycle kind.
    pub fn with_kind(mut self, kind: PointerEventKind) -> Self {
        self.kind = kind;
        self
    }
}
