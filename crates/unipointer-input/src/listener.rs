//! Listener capabilities accepted by the [`EventBus`](crate::EventBus).
//!
//! Any type implementing one of these traits can subscribe; the bus keeps
//! `Arc<dyn ...>` handles rather than method pointers. Every method returns
//! whether the listener handled the event and defaults to `false`, so
//! implementors only override what they care about.

use unipointer_core::PointerEvent;

/// Receives the four pointer lifecycle channels.
pub trait PointerListener: Send + Sync {
    fn on_pointer_down(&self, _event: &PointerEvent) -> bool {
        false
    }

    fn on_pointer_up(&self, _event: &PointerEvent) -> bool {
        false
    }

    fn on_pointer_move(&self, _event: &PointerEvent) -> bool {
        false
    }

    /// The system cancelled the pointer: the contact left the device, the
    /// device stopped reporting it, or the session was interrupted.
    fn on_pointer_cancel(&self, _event: &PointerEvent) -> bool {
        false
    }
}

/// Receives the gesture channels.
pub trait GestureListener: Send + Sync {
    /// Second successive tap or click at the same key. The payload is the
    /// up event that completed the second press.
    fn on_pointer_double_press(&self, _event: &PointerEvent) -> bool {
        false
    }

    /// A pointer stayed down and still past the hold threshold. The payload
    /// is the down event that started the hold.
    fn on_pointer_press_and_hold(&self, _event: &PointerEvent) -> bool {
        false
    }
}
