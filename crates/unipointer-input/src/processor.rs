//! Raw mouse/touch normalization.
//!
//! [`PointerEventProcessor`] turns every raw notification into exactly one
//! [`PointerEvent`] and publishes it on the bus channel matching its kind.
//! It also assigns pointer indices across devices and tracks held mouse
//! buttons. Its return value tells the host whether to stop propagating the
//! raw event.

use std::sync::Arc;

use parking_lot::Mutex;
use smallvec::SmallVec;
use unipointer_core::{
    PointerButton, PointerButtons, PointerEvent, PointerEventKind, PointerId, PointerKey,
    PointerType,
};

use crate::bus::EventBus;
use crate::config::PointerConfig;
use crate::raw::{RawMouseEvent, RawTouchEvent};

/// Ordered set of pointers that are currently down, across all devices.
#[derive(Default, Debug)]
struct ActivePointers {
    keys: SmallVec<[PointerKey; 8]>,
}

impl ActivePointers {
    /// Marks `key` down and returns its index. A redundant down keeps the
    /// index it already had.
    fn press(&mut self, key: PointerKey) -> usize {
        match self.keys.iter().position(|active| *active == key) {
            Some(index) => index,
            None => {
                self.keys.push(key);
                self.keys.len() - 1
            }
        }
    }

    /// Index of `key`, or the active count when it is not down.
    fn index_of(&self, key: PointerKey) -> usize {
        self.keys
            .iter()
            .position(|active| *active == key)
            .unwrap_or(self.keys.len())
    }

    /// Removes `key` and returns the index it had.
    fn release(&mut self, key: PointerKey) -> usize {
        match self.keys.iter().position(|active| *active == key) {
            Some(index) => {
                self.keys.remove(index);
                index
            }
            None => self.keys.len(),
        }
    }

    fn len(&self) -> usize {
        self.keys.len()
    }
}

struct ProcessorState {
    config: PointerConfig,
    active: ActivePointers,
    mouse_buttons: PointerButtons,
    last_frame: Option<u64>,
}

pub struct PointerEventProcessor {
    bus: Arc<EventBus>,
    state: Mutex<ProcessorState>,
}

impl PointerEventProcessor {
    pub fn new(bus: Arc<EventBus>, config: PointerConfig) -> Self {
        Self {
            bus,
            state: Mutex::new(ProcessorState {
                config,
                active: ActivePointers::default(),
                mouse_buttons: PointerButtons::NONE,
                last_frame: None,
            }),
        }
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Periodic frame hook. Events are normalized as they arrive, so this
    /// only records the tick.
    pub fn update(&self, frame_tick: u64) {
        self.state.lock().last_frame = Some(frame_tick);
    }

    pub fn last_frame(&self) -> Option<u64> {
        self.state.lock().last_frame
    }

    pub fn on_mouse_moved(&self, raw: &RawMouseEvent) -> bool {
        self.normalize_mouse(raw, PointerEventKind::Move)
    }

    pub fn on_mouse_dragged(&self, raw: &RawMouseEvent) -> bool {
        self.normalize_mouse(raw, PointerEventKind::Move)
    }

    pub fn on_mouse_pressed(&self, raw: &RawMouseEvent) -> bool {
        self.normalize_mouse(raw, PointerEventKind::Down)
    }

    pub fn on_mouse_released(&self, raw: &RawMouseEvent) -> bool {
        self.normalize_mouse(raw, PointerEventKind::Up)
    }

    pub fn on_touch_down(&self, raw: &RawTouchEvent) -> bool {
        self.normalize_touch(raw, PointerEventKind::Down)
    }

    pub fn on_touch_moved(&self, raw: &RawTouchEvent) -> bool {
        self.normalize_touch(raw, PointerEventKind::Move)
    }

    pub fn on_touch_up(&self, raw: &RawTouchEvent) -> bool {
        self.normalize_touch(raw, PointerEventKind::Up)
    }

    /// Hosts report a double tap alongside the contact's second down, so it
    /// is published as a down; the gesture layer treats it as a redundant
    /// down for the same key.
    pub fn on_touch_double_tap(&self, raw: &RawTouchEvent) -> bool {
        self.normalize_touch(raw, PointerEventKind::Down)
    }

    pub fn on_touch_cancelled(&self, raw: &RawTouchEvent) -> bool {
        self.normalize_touch(raw, PointerEventKind::Cancel)
    }

    pub fn set_consume_mouse_events(&self, consume: bool) {
        self.state.lock().config.consume_mouse_events = consume;
    }

    pub fn set_consume_touch_events(&self, consume: bool) {
        self.state.lock().config.consume_touch_events = consume;
    }

    pub fn consume_mouse_events(&self) -> bool {
        self.state.lock().config.consume_mouse_events
    }

    pub fn consume_touch_events(&self) -> bool {
        self.state.lock().config.consume_touch_events
    }

    pub fn config(&self) -> PointerConfig {
        self.state.lock().config
    }

    /// Number of pointers currently down across all devices.
    pub fn active_pointer_count(&self) -> usize {
        self.state.lock().active.len()
    }

    fn normalize_mouse(&self, raw: &RawMouseEvent, kind: PointerEventKind) -> bool {
        let key = PointerKey::mouse(raw.button);
        let button = PointerButton::from_index(raw.button);

        let (event, consumed) = {
            let mut state = self.state.lock();
            let pointer_index = match kind {
                PointerEventKind::Down => {
                    if let Some(button) = button {
                        state.mouse_buttons.insert(button);
                    }
                    state.active.press(key)
                }
                PointerEventKind::Up | PointerEventKind::Cancel => {
                    if let Some(button) = button {
                        state.mouse_buttons.remove(button);
                    }
                    state.active.release(key)
                }
                PointerEventKind::Move => state.active.index_of(key),
            };
            let event = PointerEvent::new(
                kind,
                PointerType::Mouse,
                0,
                PointerId::from(raw.button),
                raw.position(),
                raw.timestamp,
            )
            .with_pointer_index(pointer_index)
            .with_buttons(state.mouse_buttons);
            (event, state.config.consume_mouse_events)
        };

        self.publish(&event);
        consumed
    }

    fn normalize_touch(&self, raw: &RawTouchEvent, kind: PointerEventKind) -> bool {
        let key = PointerKey::touch(raw.device_id, raw.id);

        let (event, consumed) = {
            let mut state = self.state.lock();
            let pointer_index = match kind {
                PointerEventKind::Down => state.active.press(key),
                PointerEventKind::Up | PointerEventKind::Cancel => state.active.release(key),
                PointerEventKind::Move => state.active.index_of(key),
            };
            let event = PointerEvent::new(
                kind,
                PointerType::Touch,
                raw.device_id,
                raw.id,
                raw.position(),
                raw.timestamp,
            )
            .with_pointer_index(pointer_index)
            .with_pressure(raw.pressure)
            .with_contact_size(raw.contact_size());
            (event, state.config.consume_touch_events)
        };

        self.publish(&event);
        consumed
    }

    fn publish(&self, event: &PointerEvent) {
        log::trace!(
            "{:?} {:?} device={} pointer={} index={} at ({:.1}, {:.1}) t={}",
            event.pointer_type,
            event.kind,
            event.device_id,
            event.pointer_id,
            event.pointer_index,
            event.position.x,
            event.position.y,
            event.timestamp
        );
        self.bus.publish_pointer_event(event);
    }
}
