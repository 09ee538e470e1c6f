//! Pure data for unipointer: the unified pointer event model, geometry,
//! and the uptime clock that stamps raw input.
//!
//! Nothing in this crate has behavior beyond field access and small
//! conversions, so it is shared by the processors, the platform adapters
//! and the testing helpers alike.

mod clock;
mod geometry;
mod pointer;

pub use clock::*;
pub use geometry::*;
pub use pointer::*;

pub mod prelude {
    pub use crate::clock::{Clock, ManualClock, UptimeClock};
    pub use crate::geometry::{Point, Size};
    pub use crate::pointer::{
        PointerButton, PointerButtons, PointerEvent, PointerEventKind, PointerKey, PointerType,
    };
}
