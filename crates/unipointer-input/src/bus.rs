//! In-process publish/subscribe for pointer and gesture events.
//!
//! The bus owns six independent channels: pointer down, up, move and
//! cancel, plus the double-press and press-and-hold gesture channels. Each
//! channel is an ordered list of `(priority, listener)` entries behind its
//! own lock.
//!
//! Publishing takes a snapshot of the list under the lock and invokes the
//! listeners after releasing it, so listeners may subscribe or unsubscribe
//! from inside a callback. Every subscription owns a gate shared by its
//! channel entries. A dispatch enters the gate around each call, and
//! unsubscribing closes it and waits for calls running on other threads to
//! leave. Once `unsubscribe` returns, the listener is never called again.
//!
//! A listener that unsubscribes itself from its own callback does not wait
//! for itself. Two listeners on different threads that unsubscribe each
//! other from inside their callbacks deadlock.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};

use parking_lot::{Condvar, Mutex};
use smallvec::SmallVec;
use unipointer_core::{PointerEvent, PointerEventKind};

use crate::listener::{GestureListener, PointerListener};

/// Ordering hint among subscribers of a channel. Lower values run first;
/// equal values run in attach order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(pub i32);

impl Priority {
    pub const BEFORE_APP: Self = Self(0);
    pub const APP: Self = Self(100);
    pub const AFTER_APP: Self = Self(200);
}

impl Default for Priority {
    fn default() -> Self {
        Self::AFTER_APP
    }
}

/// Unique identifier for a subscription on one bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
struct GateState {
    open: bool,
    // One element per call in flight; a thread appears once per nesting level.
    running: SmallVec<[ThreadId; 2]>,
}

/// Admission control for one subscription's listener.
#[derive(Debug)]
struct EntryGate {
    state: Mutex<GateState>,
    idle: Condvar,
}

impl EntryGate {
    fn new() -> Self {
        Self {
            state: Mutex::new(GateState {
                open: true,
                running: SmallVec::new(),
            }),
            idle: Condvar::new(),
        }
    }

    /// Registers a call on the current thread, or `None` once closed.
    fn enter(&self) -> Option<GatePass<'_>> {
        let mut state = self.state.lock();
        if !state.open {
            return None;
        }
        let caller = thread::current().id();
        state.running.push(caller);
        Some(GatePass {
            gate: self,
            thread: caller,
        })
    }

    /// Refuses new calls, then blocks until no other thread is inside.
    fn close(&self) {
        let current = thread::current().id();
        let mut state = self.state.lock();
        state.open = false;
        while state.running.iter().any(|thread| *thread != current) {
            self.idle.wait(&mut state);
        }
    }
}

/// Held for the duration of one listener call. Leaves the gate on drop,
/// including while unwinding from a panicking listener.
struct GatePass<'a> {
    gate: &'a EntryGate,
    thread: ThreadId,
}

impl Drop for GatePass<'_> {
    fn drop(&mut self) {
        let mut state = self.gate.state.lock();
        if let Some(index) = state.running.iter().position(|thread| *thread == self.thread) {
            state.running.swap_remove(index);
        }
        self.gate.idle.notify_all();
    }
}

struct ChannelEntry<L: ?Sized> {
    id: ListenerId,
    priority: Priority,
    listener: Arc<L>,
    gate: Arc<EntryGate>,
}

/// A single broadcast list.
pub struct EventChannel<L: ?Sized> {
    name: &'static str,
    entries: Mutex<Vec<ChannelEntry<L>>>,
}

impl<L: ?Sized> EventChannel<L> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn contains(&self, id: ListenerId) -> bool {
        self.entries.lock().iter().any(|entry| entry.id == id)
    }

    fn attach(&self, id: ListenerId, priority: Priority, listener: Arc<L>, gate: Arc<EntryGate>) {
        log::trace!("{}: attach listener {} at {:?}", self.name, id.0, priority);
        let mut entries = self.entries.lock();
        // Insert after every entry with the same priority to keep attach order.
        let position = entries
            .iter()
            .position(|entry| entry.priority > priority)
            .unwrap_or(entries.len());
        entries.insert(
            position,
            ChannelEntry {
                id,
                priority,
                listener,
                gate,
            },
        );
    }

    fn detach(&self, id: ListenerId) -> Option<Arc<EntryGate>> {
        let mut entries = self.entries.lock();
        let position = entries.iter().position(|entry| entry.id == id)?;
        log::trace!("{}: detach listener {}", self.name, id.0);
        Some(entries.remove(position).gate)
    }

    /// Invokes `invoke` on every active listener in priority order.
    ///
    /// Returns `true` if any listener reported the event handled. All
    /// listeners run regardless of earlier results.
    pub fn notify<F>(&self, mut invoke: F) -> bool
    where
        F: FnMut(&L) -> bool,
    {
        let snapshot: SmallVec<[(Arc<L>, Arc<EntryGate>); 4]> = self
            .entries
            .lock()
            .iter()
            .map(|entry| (Arc::clone(&entry.listener), Arc::clone(&entry.gate)))
            .collect();

        let mut handled = false;
        for (listener, gate) in &snapshot {
            if let Some(_pass) = gate.enter() {
                handled |= invoke(&**listener);
            }
        }
        handled
    }
}

/// The process-independent set of pointer and gesture channels.
///
/// Construct one per input context; nothing here is global.
pub struct EventBus {
    next_id: AtomicU64,
    pointer_down: EventChannel<dyn PointerListener>,
    pointer_up: EventChannel<dyn PointerListener>,
    pointer_move: EventChannel<dyn PointerListener>,
    pointer_cancel: EventChannel<dyn PointerListener>,
    double_press: EventChannel<dyn GestureListener>,
    press_and_hold: EventChannel<dyn GestureListener>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            pointer_down: EventChannel::new("pointer_down"),
            pointer_up: EventChannel::new("pointer_up"),
            pointer_move: EventChannel::new("pointer_move"),
            pointer_cancel: EventChannel::new("pointer_cancel"),
            double_press: EventChannel::new("pointer_double_press"),
            press_and_hold: EventChannel::new("pointer_press_and_hold"),
        }
    }

    fn allocate_id(&self) -> ListenerId {
        ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn pointer_channels(&self) -> [&EventChannel<dyn PointerListener>; 4] {
        [
            &self.pointer_down,
            &self.pointer_up,
            &self.pointer_move,
            &self.pointer_cancel,
        ]
    }

    fn gesture_channels(&self) -> [&EventChannel<dyn GestureListener>; 2] {
        [&self.double_press, &self.press_and_hold]
    }

    /// Attaches `listener` to the four pointer channels.
    pub fn subscribe_pointer_events(
        self: &Arc<Self>,
        listener: Arc<dyn PointerListener>,
        priority: Priority,
    ) -> Subscription {
        let id = self.allocate_id();
        let gate = Arc::new(EntryGate::new());
        for channel in self.pointer_channels() {
            channel.attach(id, priority, Arc::clone(&listener), Arc::clone(&gate));
        }
        log::debug!("pointer listener {} attached at {:?}", id.0, priority);
        Subscription::new(Arc::downgrade(self), id)
    }

    /// Attaches `listener` to the two gesture channels.
    pub fn subscribe_gesture_events(
        self: &Arc<Self>,
        listener: Arc<dyn GestureListener>,
        priority: Priority,
    ) -> Subscription {
        let id = self.allocate_id();
        let gate = Arc::new(EntryGate::new());
        for channel in self.gesture_channels() {
            channel.attach(id, priority, Arc::clone(&listener), Arc::clone(&gate));
        }
        log::debug!("gesture listener {} attached at {:?}", id.0, priority);
        Subscription::new(Arc::downgrade(self), id)
    }

    /// Detaches the listener from every channel it was attached to.
    ///
    /// Returns `false` for ids that are not attached. When it returns `true`
    /// the listener has finished every call running on other threads and
    /// will not be called again. Safe to call from a listener callback,
    /// including for the listener being invoked.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        // Every channel entry of one subscription shares the same gate.
        let mut gate = None;
        for channel in self.pointer_channels() {
            gate = channel.detach(id).or(gate);
        }
        for channel in self.gesture_channels() {
            gate = channel.detach(id).or(gate);
        }
        let Some(gate) = gate else {
            return false;
        };
        // Channel locks are released; calls in flight may still subscribe
        // or unsubscribe without blocking on us.
        gate.close();
        log::debug!("listener {} detached", id.0);
        true
    }

    pub fn is_subscribed(&self, id: ListenerId) -> bool {
        self.pointer_down.contains(id) || self.double_press.contains(id)
    }

    /// Publishes on the pointer channel selected by `event.kind`.
    pub fn publish_pointer_event(&self, event: &PointerEvent) -> bool {
        match event.kind {
            PointerEventKind::Down => self
                .pointer_down
                .notify(|listener| listener.on_pointer_down(event)),
            PointerEventKind::Up => self
                .pointer_up
                .notify(|listener| listener.on_pointer_up(event)),
            PointerEventKind::Move => self
                .pointer_move
                .notify(|listener| listener.on_pointer_move(event)),
            PointerEventKind::Cancel => self
                .pointer_cancel
                .notify(|listener| listener.on_pointer_cancel(event)),
        }
    }

    pub fn publish_double_press(&self, event: &PointerEvent) -> bool {
        self.double_press
            .notify(|listener| listener.on_pointer_double_press(event))
    }

    pub fn publish_press_and_hold(&self, event: &PointerEvent) -> bool {
        self.press_and_hold
            .notify(|listener| listener.on_pointer_press_and_hold(event))
    }

    pub fn pointer_channel(&self, kind: PointerEventKind) -> &EventChannel<dyn PointerListener> {
        match kind {
            PointerEventKind::Down => &self.pointer_down,
            PointerEventKind::Up => &self.pointer_up,
            PointerEventKind::Move => &self.pointer_move,
            PointerEventKind::Cancel => &self.pointer_cancel,
        }
    }

    pub fn double_press_channel(&self) -> &EventChannel<dyn GestureListener> {
        &self.double_press
    }

    pub fn press_and_hold_channel(&self) -> &EventChannel<dyn GestureListener> {
        &self.press_and_hold
    }

    pub fn pointer_listener_count(&self) -> usize {
        self.pointer_down.len()
    }

    pub fn gesture_listener_count(&self) -> usize {
        self.double_press.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("pointer_listeners", &self.pointer_listener_count())
            .field("gesture_listeners", &self.gesture_listener_count())
            .finish()
    }
}

/// Keeps a listener attached for as long as it lives.
///
/// Dropping the subscription detaches the listener. Use [`detach`] to keep
/// the listener attached and manage it by id instead.
///
/// [`detach`]: Subscription::detach
#[must_use = "dropping a Subscription detaches its listener"]
pub struct Subscription {
    bus: Weak<EventBus>,
    id: ListenerId,
    armed: bool,
}

impl Subscription {
    fn new(bus: Weak<EventBus>, id: ListenerId) -> Self {
        Self {
            bus,
            id,
            armed: true,
        }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn is_attached(&self) -> bool {
        self.bus
            .upgrade()
            .map(|bus| bus.is_subscribed(self.id))
            .unwrap_or(false)
    }

    /// Detaches the listener now.
    pub fn cancel(mut self) {
        self.release();
    }

    /// Gives up the guard and leaves the listener attached.
    pub fn detach(mut self) -> ListenerId {
        self.armed = false;
        self.id
    }

    fn release(&mut self) {
        if !std::mem::replace(&mut self.armed, false) {
            return;
        }
        if let Some(bus) = self.bus.upgrade() {
            bus.unsubscribe(self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("armed", &self.armed)
            .finish()
    }
}
