//! Testing utilities for unipointer

pub mod recorder;
pub mod robot;

pub use recorder::*;
pub use robot::*;

pub mod prelude {
    pub use crate::recorder::{Channel, EventRecorder, Recorded};
    pub use crate::robot::InputRobot;
}
