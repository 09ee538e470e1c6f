//! A listener that remembers everything published on a bus.

use parking_lot::Mutex;
use unipointer_core::{PointerEvent, PointerEventKind};
use unipointer_input::{GestureListener, PointerListener};

/// Channel an event arrived on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Down,
    Up,
    Move,
    Cancel,
    DoublePress,
    PressAndHold,
}

impl From<PointerEventKind> for Channel {
    fn from(kind: PointerEventKind) -> Self {
        match kind {
            PointerEventKind::Down => Channel::Down,
            PointerEventKind::Up => Channel::Up,
            PointerEventKind::Move => Channel::Move,
            PointerEventKind::Cancel => Channel::Cancel,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Recorded {
    pub channel: Channel,
    pub event: PointerEvent,
}

/// Records pointer and gesture events in arrival order.
///
/// Subscribe one recorder to both the pointer and the gesture channels to
/// see how the two streams interleave.
#[derive(Default)]
pub struct EventRecorder {
    log: Mutex<Vec<Recorded>>,
    handled: bool,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A recorder that reports every event as handled.
    pub fn handling() -> Self {
        Self {
            log: Mutex::new(Vec::new()),
            handled: true,
        }
    }

    fn push(&self, channel: Channel, event: &PointerEvent) -> bool {
        self.log.lock().push(Recorded {
            channel,
            event: *event,
        });
        self.handled
    }

    pub fn events(&self) -> Vec<Recorded> {
        self.log.lock().clone()
    }

    pub fn take(&self) -> Vec<Recorded> {
        std::mem::take(&mut *self.log.lock())
    }

    pub fn clear(&self) {
        self.log.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.log.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.lock().is_empty()
    }

    /// Events received on `channel`, oldest first.
    pub fn on(&self, channel: Channel) -> Vec<PointerEvent> {
        self.log
            .lock()
            .iter()
            .filter(|recorded| recorded.channel == channel)
            .map(|recorded| recorded.event)
            .collect()
    }

    pub fn channels(&self) -> Vec<Channel> {
        self.log.lock().iter().map(|recorded| recorded.channel).collect()
    }

    pub fn count(&self, channel: Channel) -> usize {
        self.log
            .lock()
            .iter()
            .filter(|recorded| recorded.channel == channel)
            .count()
    }

    pub fn last(&self) -> Option<Recorded> {
        self.log.lock().last().copied()
    }
}

impl PointerListener for EventRecorder {
    fn on_pointer_down(&self, event: &PointerEvent) -> bool {
        self.push(Channel::Down, event)
    }

    fn on_pointer_up(&self, event: &PointerEvent) -> bool {
        self.push(Channel::Up, event)
    }

    fn on_pointer_move(&self, event: &PointerEvent) -> bool {
        self.push(Channel::Move, event)
    }

    fn on_pointer_cancel(&self, event: &PointerEvent) -> bool {
        self.push(Channel::Cancel, event)
    }
}

impl GestureListener for EventRecorder {
    fn on_pointer_double_press(&self, event: &PointerEvent) -> bool {
        self.push(Channel::DoublePress, event)
    }

    fn on_pointer_press_and_hold(&self, event: &PointerEvent) -> bool {
        self.push(Channel::PressAndHold, event)
    }
}
