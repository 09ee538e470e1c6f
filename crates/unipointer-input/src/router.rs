//! The explicitly owned input context.
//!
//! An [`InputRouter`] bundles one bus, one pointer processor and one gesture
//! processor. The gesture processor is subscribed to the bus for as long as
//! the router lives. Routers share nothing, so tests and multi-window hosts
//! can run as many as they like side by side.

use std::sync::Arc;

use unipointer_core::{Clock, Timestamp, UptimeClock};

use crate::bus::{EventBus, ListenerId, Priority, Subscription};
use crate::config::InputConfig;
use crate::gesture::PointerGestureEventProcessor;
use crate::listener::{GestureListener, PointerListener};
use crate::processor::PointerEventProcessor;

pub struct InputRouter {
    bus: Arc<EventBus>,
    pointer_processor: PointerEventProcessor,
    gesture_processor: Arc<PointerGestureEventProcessor>,
    gesture_subscription: Subscription,
    clock: UptimeClock,
}

impl InputRouter {
    pub fn new(config: InputConfig) -> Self {
        let bus = Arc::new(EventBus::new());
        let pointer_processor = PointerEventProcessor::new(Arc::clone(&bus), config.pointer);
        let gesture_processor = Arc::new(PointerGestureEventProcessor::new(&bus, config.gesture));
        let gesture_subscription =
            bus.subscribe_pointer_events(gesture_processor.clone(), config.gesture_priority);
        log::debug!(
            "input router ready (gesture processor at {:?}, tap threshold {:?})",
            config.gesture_priority,
            config.gesture.tap_threshold
        );

        Self {
            bus,
            pointer_processor,
            gesture_processor,
            gesture_subscription,
            clock: UptimeClock::new(),
        }
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Entry point for raw mouse and touch notifications.
    pub fn pointer_processor(&self) -> &PointerEventProcessor {
        &self.pointer_processor
    }

    pub fn gesture_processor(&self) -> &Arc<PointerGestureEventProcessor> {
        &self.gesture_processor
    }

    /// Clock raw input should be stamped with. Platform adapters copy it so
    /// that event timestamps and [`tick`](Self::tick) share one origin.
    pub fn clock(&self) -> UptimeClock {
        self.clock
    }

    pub fn gesture_listener_id(&self) -> ListenerId {
        self.gesture_subscription.id()
    }

    pub fn subscribe_pointer_events(
        &self,
        listener: Arc<dyn PointerListener>,
        priority: Priority,
    ) -> Subscription {
        self.bus.subscribe_pointer_events(listener, priority)
    }

    pub fn subscribe_gesture_events(
        &self,
        listener: Arc<dyn GestureListener>,
        priority: Priority,
    ) -> Subscription {
        self.bus.subscribe_gesture_events(listener, priority)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Frame hook: forwards `now` to both processors, which fires any
    /// press-and-hold that has come due.
    pub fn update(&self, now: Timestamp) {
        self.pointer_processor.update(now);
        self.gesture_processor.update(now);
    }

    /// [`update`](Self::update) with the router's own clock.
    pub fn tick(&self) {
        self.update(self.clock.now_millis());
    }
}

impl Default for InputRouter {
    fn default() -> Self {
        Self::new(InputConfig::default())
    }
}
