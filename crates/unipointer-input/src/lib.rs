//! Pointer input routing for unipointer.
//!
//! Raw mouse and touch notifications enter through the
//! [`PointerEventProcessor`], are normalized into [`PointerEvent`]s and
//! fanned out on the [`EventBus`]. The [`PointerGestureEventProcessor`]
//! listens to that stream and publishes double-press and press-and-hold
//! gestures back onto the bus. [`InputRouter`] owns one of each.
//!
//! ```text
//!  raw mouse/touch ──► PointerEventProcessor ──► EventBus (down/up/move/cancel)
//!                                                   │            │
//!                                                   ▼            ▼
//!                                  PointerGestureEventProcessor  app listeners
//!                                                   │
//!                                                   ▼
//!                              EventBus (double-press/press-and-hold) ──► app listeners
//! ```

pub mod bus;
pub mod config;
pub mod gesture;
pub mod gesture_constants;
pub mod listener;
pub mod processor;
pub mod raw;
pub mod router;

pub use bus::{EventBus, EventChannel, ListenerId, Priority, Subscription};
pub use config::{GestureConfig, InputConfig, PointerConfig};
pub use gesture::PointerGestureEventProcessor;
pub use listener::{GestureListener, PointerListener};
pub use processor::PointerEventProcessor;
pub use raw::{RawMouseEvent, RawTouchEvent};
pub use router::InputRouter;
pub use unipointer_core::{
    PointerButton, PointerButtons, PointerEvent, PointerEventKind, PointerKey, PointerType,
};

pub mod prelude {
    pub use crate::bus::{EventBus, ListenerId, Priority, Subscription};
    pub use crate::config::{GestureConfig, InputConfig, PointerConfig};
    pub use crate::listener::{GestureListener, PointerListener};
    pub use crate::raw::{RawMouseEvent, RawTouchEvent};
    pub use crate::router::InputRouter;
    pub use unipointer_core::prelude::*;
}
