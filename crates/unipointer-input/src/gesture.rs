//! Double-press and press-and-hold recognition.
//!
//! [`PointerGestureEventProcessor`] listens to the pointer channels and keeps
//! a down table: one pending entry per [`PointerKey`] that is currently
//! down. Alongside it, the up event of the last completed tap at each key is
//! remembered so that a second tap inside the tap threshold can be reported
//! as a double-press.
//!
//! Per key the machine is:
//!
//! ```text
//!   Idle --down--> DownPending --up (tap)--> Idle  (+ double-press if a prior
//!                     |   ^                         tap at the key is recent)
//!                     |   +--down (overwrites)
//!                     +--up (slow) / cancel--> Idle
//! ```
//!
//! Press-and-hold is driven by [`update`](PointerGestureEventProcessor::update):
//! every pending entry that stayed within the hold slop for the hold
//! threshold fires once.
//!
//! All timestamps are compared with `checked_sub`. An elapsed time that would
//! be negative counts as exceeding every threshold.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use smallvec::SmallVec;
use unipointer_core::{PointerEvent, PointerKey, Timestamp};
use web_time::Duration;

use crate::bus::EventBus;
use crate::config::GestureConfig;
use crate::listener::PointerListener;

fn elapsed(earlier: Timestamp, later: Timestamp) -> Option<Duration> {
    later.checked_sub(earlier).map(Duration::from_millis)
}

#[derive(Clone, Copy, Debug)]
struct PendingDown {
    down: PointerEvent,
    hold_fired: bool,
    moved_beyond_slop: bool,
}

impl PendingDown {
    fn new(down: PointerEvent) -> Self {
        Self {
            down,
            hold_fired: false,
            moved_beyond_slop: false,
        }
    }
}

struct GestureState {
    config: GestureConfig,
    pending: HashMap<PointerKey, PendingDown>,
    last_taps: HashMap<PointerKey, PointerEvent>,
}

impl GestureState {
    fn is_double_press(&self, key: &PointerKey, up: &PointerEvent) -> bool {
        let Some(previous) = self.last_taps.get(key) else {
            return false;
        };
        let in_time = matches!(
            elapsed(previous.timestamp, up.timestamp),
            Some(interval) if interval < self.config.tap_threshold
        );
        let in_reach = self
            .config
            .double_press_slop
            .map_or(true, |slop| previous.position.distance_to(up.position) <= slop);
        in_time && in_reach
    }

    /// Forgets taps too old to start a double-press at `now`. Taps stamped
    /// after `now` are kept until the clock catches up.
    fn expire_taps(&mut self, now: Timestamp) {
        let window = self.config.tap_threshold;
        self.last_taps
            .retain(|_, tap| !matches!(elapsed(tap.timestamp, now), Some(age) if age >= window));
    }
}

pub struct PointerGestureEventProcessor {
    bus: Weak<EventBus>,
    state: Mutex<GestureState>,
}

impl PointerGestureEventProcessor {
    /// Creates a processor that publishes gestures on `bus`.
    ///
    /// Only a weak handle is kept because the bus usually holds this
    /// processor as a pointer listener.
    pub fn new(bus: &Arc<EventBus>, config: GestureConfig) -> Self {
        Self {
            bus: Arc::downgrade(bus),
            state: Mutex::new(GestureState {
                config,
                pending: HashMap::new(),
                last_taps: HashMap::new(),
            }),
        }
    }

    pub fn config(&self) -> GestureConfig {
        self.state.lock().config
    }

    pub fn set_config(&self, config: GestureConfig) {
        self.state.lock().config = config;
    }

    pub fn set_tap_threshold(&self, threshold: Duration) {
        self.state.lock().config.tap_threshold = threshold;
    }

    pub fn set_hold_threshold(&self, threshold: Option<Duration>) {
        self.state.lock().config.hold_threshold = threshold;
    }

    /// Number of outstanding downs in the down table.
    pub fn pending_count(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// The down event currently pending for `key`.
    pub fn pending_down(&self, key: &PointerKey) -> Option<PointerEvent> {
        self.state.lock().pending.get(key).map(|pending| pending.down)
    }

    /// The up event of the last completed tap at `key`. Taps are dropped
    /// once they are too old to start a double-press, on the next up or
    /// [`update`](Self::update) that observes it.
    pub fn last_tap(&self, key: &PointerKey) -> Option<PointerEvent> {
        self.state.lock().last_taps.get(key).copied()
    }

    /// Number of remembered taps across all keys.
    pub fn last_tap_count(&self) -> usize {
        self.state.lock().last_taps.len()
    }

    /// Forgets every pending down and remembered tap.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.pending.clear();
        state.last_taps.clear();
    }

    /// Fires press-and-hold for every pointer that has been down and still
    /// for at least the hold threshold at `now`. Each down fires at most once.
    /// Also forgets taps that can no longer start a double-press.
    pub fn update(&self, now: Timestamp) {
        let mut fired: SmallVec<[PointerEvent; 4]> = {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            state.expire_taps(now);
            let Some(hold_threshold) = state.config.hold_threshold else {
                return;
            };
            state
                .pending
                .values_mut()
                .filter(|pending| !pending.hold_fired && !pending.moved_beyond_slop)
                .filter(|pending| {
                    matches!(
                        elapsed(pending.down.timestamp, now),
                        Some(held) if held >= hold_threshold
                    )
                })
                .map(|pending| {
                    pending.hold_fired = true;
                    pending.down
                })
                .collect()
        };
        fired.sort_by_key(|event| (event.timestamp, event.pointer_index));

        for event in &fired {
            log::debug!("press-and-hold at {:?} (t={})", event.key(), now);
            if let Some(bus) = self.bus.upgrade() {
                bus.publish_press_and_hold(event);
            }
        }
    }
}

impl PointerListener for PointerGestureEventProcessor {
    /// Records the down. A down for a key that is already pending replaces
    /// the stale entry and starts a fresh press.
    fn on_pointer_down(&self, event: &PointerEvent) -> bool {
        let key = event.key();
        if let Some(stale) = self
            .state
            .lock()
            .pending
            .insert(key, PendingDown::new(*event))
        {
            log::debug!(
                "redundant down at {:?}; replacing entry from t={}",
                key,
                stale.down.timestamp
            );
        }
        false
    }

    /// Closes the pending press and reports whether it completed a
    /// double-press.
    fn on_pointer_up(&self, event: &PointerEvent) -> bool {
        let key = event.key();
        let recognized = {
            let mut state = self.state.lock();
            state.expire_taps(event.timestamp);
            let Some(pending) = state.pending.remove(&key) else {
                log::debug!("up without pending down at {:?}", key);
                return false;
            };

            let is_tap = !pending.hold_fired
                && matches!(
                    elapsed(pending.down.timestamp, event.timestamp),
                    Some(pressed) if pressed <= state.config.tap_threshold
                );

            if !is_tap {
                state.last_taps.remove(&key);
                false
            } else if state.is_double_press(&key, event) {
                state.last_taps.remove(&key);
                true
            } else {
                state.last_taps.insert(key, *event);
                false
            }
        };

        if recognized {
            log::debug!("double-press at {:?} (t={})", key, event.timestamp);
            if let Some(bus) = self.bus.upgrade() {
                bus.publish_double_press(event);
            }
        }
        recognized
    }

    /// Moves never change tap timing. They only disqualify a hold once the
    /// pointer leaves the hold slop.
    fn on_pointer_move(&self, event: &PointerEvent) -> bool {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        if let Some(pending) = state.pending.get_mut(&event.key()) {
            if !pending.moved_beyond_slop
                && pending.down.position.distance_to(event.position) > state.config.hold_slop
            {
                pending.moved_beyond_slop = true;
            }
        }
        false
    }

    /// Drops every bit of state for the key. Idempotent.
    fn on_pointer_cancel(&self, event: &PointerEvent) -> bool {
        let key = event.key();
        let mut state = self.state.lock();
        let had_pending = state.pending.remove(&key).is_some();
        let had_tap = state.last_taps.remove(&key).is_some();
        if !had_pending && !had_tap {
            log::debug!("cancel for unknown key {:?}", key);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{Priority, Subscription};
    use crate::listener::GestureListener;
    use unipointer_core::{Point, PointerEventKind, PointerType};

    #[derive(Default)]
    struct Gestures {
        double: Mutex<Vec<PointerEvent>>,
        hold: Mutex<Vec<PointerEvent>>,
    }

    impl GestureListener for Gestures {
        fn on_pointer_double_press(&self, event: &PointerEvent) -> bool {
            self.double.lock().push(*event);
            false
        }

        fn on_pointer_press_and_hold(&self, event: &PointerEvent) -> bool {
            self.hold.lock().push(*event);
            false
        }
    }

    struct Fixture {
        _bus: Arc<EventBus>,
        _sub: Subscription,
        processor: PointerGestureEventProcessor,
        gestures: Arc<Gestures>,
    }

    impl Fixture {
        fn new(config: GestureConfig) -> Self {
            let bus = Arc::new(EventBus::new());
            let gestures = Arc::new(Gestures::default());
            let sub = bus.subscribe_gesture_events(gestures.clone(), Priority::APP);
            let processor = PointerGestureEventProcessor::new(&bus, config);
            Self {
                _bus: bus,
                _sub: sub,
                processor,
                gestures,
            }
        }

        fn default_with_tap(tap_ms: u64) -> Self {
            Self::new(GestureConfig::default().with_tap_threshold(Duration::from_millis(tap_ms)))
        }

        fn down(&self, key: PointerKey, t: Timestamp) -> bool {
            self.processor.on_pointer_down(&at(key, PointerEventKind::Down, t))
        }

        fn up(&self, key: PointerKey, t: Timestamp) -> bool {
            self.processor.on_pointer_up(&at(key, PointerEventKind::Up, t))
        }

        fn cancel(&self, key: PointerKey, t: Timestamp) -> bool {
            self.processor.on_pointer_cancel(&at(key, PointerEventKind::Cancel, t))
        }

        fn tap(&self, key: PointerKey, t: Timestamp) -> bool {
            self.down(key, t);
            self.up(key, t)
        }

        fn doubles(&self) -> Vec<PointerEvent> {
            self.gestures.double.lock().clone()
        }

        fn holds(&self) -> Vec<PointerEvent> {
            self.gestures.hold.lock().clone()
        }
    }

    fn at(key: PointerKey, kind: PointerEventKind, t: Timestamp) -> PointerEvent {
        PointerEvent::new(
            kind,
            key.pointer_type,
            key.device_id,
            key.pointer_id,
            Point::new(10.0, 10.0),
            t,
        )
    }

    const K: PointerKey = PointerKey::mouse(0);

    #[test]
    fn two_quick_taps_make_a_double_press() {
        let f = Fixture::default_with_tap(300);
        assert!(!f.tap(K, 0));
        assert!(f.tap(K, 100));

        let doubles = f.doubles();
        assert_eq!(doubles.len(), 1);
        assert_eq!(doubles[0].kind, PointerEventKind::Up);
        assert_eq!(doubles[0].timestamp, 100);
    }

    #[test]
    fn taps_outside_the_threshold_stay_single() {
        let f = Fixture::default_with_tap(300);
        f.tap(K, 0);
        assert!(!f.tap(K, 500));
        assert!(f.doubles().is_empty());
        assert_eq!(f.processor.last_tap(&K).map(|e| e.timestamp), Some(500));
    }

    #[test]
    fn interval_is_measured_between_ups() {
        let f = Fixture::default_with_tap(300);
        f.down(K, 0);
        f.up(K, 50);
        f.down(K, 120);
        assert!(f.up(K, 120));
    }

    #[test]
    fn slow_press_is_plain_and_breaks_the_sequence() {
        let f = Fixture::default_with_tap(300);
        f.tap(K, 0);
        f.down(K, 50);
        assert!(!f.up(K, 400));
        assert_eq!(f.processor.last_tap(&K), None);
        assert!(!f.tap(K, 450));
        assert!(f.doubles().is_empty());
    }

    #[test]
    fn third_tap_starts_a_new_sequence() {
        let f = Fixture::default_with_tap(300);
        f.tap(K, 0);
        assert!(f.tap(K, 100));
        assert!(!f.tap(K, 200));
        assert!(f.tap(K, 250));
        assert_eq!(f.doubles().len(), 2);
    }

    #[test]
    fn cancel_purges_pending_down_and_prior_tap() {
        let f = Fixture::default_with_tap(300);
        f.down(K, 0);
        assert!(!f.cancel(K, 10));
        assert_eq!(f.processor.pending_count(), 0);

        assert!(!f.tap(K, 50));
        assert!(f.doubles().is_empty());

        f.cancel(K, 60);
        assert!(!f.tap(K, 70));
        assert!(f.doubles().is_empty());
    }

    #[test]
    fn cancel_and_up_on_unknown_keys_are_no_ops() {
        let f = Fixture::default_with_tap(300);
        let other = PointerKey::touch(5, 5);
        f.down(K, 0);

        assert!(!f.cancel(other, 1));
        assert!(!f.cancel(other, 2));
        assert!(!f.up(other, 3));

        assert_eq!(f.processor.pending_count(), 1);
        assert_eq!(f.processor.pending_down(&K).map(|e| e.timestamp), Some(0));
        assert_eq!(f.processor.last_tap(&other), None);
    }

    #[test]
    fn redundant_down_overwrites_and_resets_timing() {
        let f = Fixture::default_with_tap(300);
        f.down(K, 0);
        f.down(K, 290);
        assert_eq!(f.processor.pending_count(), 1);
        assert_eq!(f.processor.pending_down(&K).map(|e| e.timestamp), Some(290));

        // 110 ms from the latest down is a tap; 400 ms from the first is not.
        f.up(K, 400);
        assert_eq!(f.processor.pending_count(), 0);
        assert_eq!(f.processor.last_tap(&K).map(|e| e.timestamp), Some(400));
    }

    #[test]
    fn keys_do_not_influence_each_other() {
        let f = Fixture::default_with_tap(300);
        let k2 = PointerKey::touch(0, 0);

        f.down(K, 0);
        f.down(k2, 5);
        f.up(K, 10);
        f.up(k2, 15);
        assert!(f.doubles().is_empty());

        f.down(k2, 40);
        assert!(f.up(k2, 50));
        assert_eq!(f.doubles().len(), 1);
        assert_eq!(f.doubles()[0].pointer_type, PointerType::Touch);
        assert_eq!(f.processor.last_tap(&K).map(|e| e.timestamp), Some(10));
    }

    #[test]
    fn out_of_order_timestamps_never_double_press() {
        let f = Fixture::default_with_tap(300);
        f.tap(K, 500);
        assert!(!f.tap(K, 100));

        f.down(K, 1_000);
        assert!(!f.up(K, 900));
        assert!(f.doubles().is_empty());
    }

    #[test]
    fn moves_do_not_invalidate_a_tap() {
        let f = Fixture::default_with_tap(300);
        f.tap(K, 0);
        f.down(K, 50);
        let far = at(K, PointerEventKind::Move, 60).copy_at(Point::new(500.0, 500.0));
        assert!(!f.processor.on_pointer_move(&far));
        assert!(f.up(K, 70));
    }

    #[test]
    fn double_press_slop_rejects_distant_taps_when_configured() {
        let f = Fixture::new(
            GestureConfig::default()
                .with_tap_threshold(Duration::from_millis(300))
                .with_double_press_slop(Some(8.0)),
        );
        f.tap(K, 0);
        let far_down = at(K, PointerEventKind::Down, 50).copy_at(Point::new(100.0, 10.0));
        let far_up = far_down.with_kind(PointerEventKind::Up);
        f.processor.on_pointer_down(&far_down);
        assert!(!f.processor.on_pointer_up(&far_up));
        assert!(f.doubles().is_empty());
    }

    #[test]
    fn hold_fires_once_after_threshold() {
        let f = Fixture::new(
            GestureConfig::default().with_hold_threshold(Some(Duration::from_millis(500))),
        );
        f.down(K, 0);
        f.processor.update(499);
        assert!(f.holds().is_empty());

        f.processor.update(500);
        f.processor.update(900);
        let holds = f.holds();
        assert_eq!(holds.len(), 1);
        assert_eq!(holds[0].kind, PointerEventKind::Down);
        assert_eq!(holds[0].timestamp, 0);

        // A held press is never a tap.
        assert!(!f.up(K, 950));
        assert_eq!(f.processor.last_tap(&K), None);
    }

    #[test]
    fn hold_is_cancelled_by_moving_beyond_slop() {
        let f = Fixture::new(GestureConfig::default().with_hold_slop(8.0));
        f.down(K, 0);
        let near = at(K, PointerEventKind::Move, 10).copy_at(Point::new(14.0, 10.0));
        f.processor.on_pointer_move(&near);
        let far = at(K, PointerEventKind::Move, 20).copy_at(Point::new(30.0, 10.0));
        f.processor.on_pointer_move(&far);
        let back = at(K, PointerEventKind::Move, 30);
        f.processor.on_pointer_move(&back);

        f.processor.update(1_000);
        assert!(f.holds().is_empty());
    }

    #[test]
    fn hold_needs_a_pending_down() {
        let f = Fixture::default_with_tap(300);
        f.tap(K, 0);
        f.down(PointerKey::touch(1, 1), 0);
        f.cancel(PointerKey::touch(1, 1), 10);
        f.processor.update(10_000);
        assert!(f.holds().is_empty());
    }

    #[test]
    fn hold_detection_can_be_disabled() {
        let f = Fixture::new(GestureConfig::default().with_hold_threshold(None));
        f.down(K, 0);
        f.processor.update(60_000);
        assert!(f.holds().is_empty());
    }

    #[test]
    fn simultaneous_holds_fire_in_down_order() {
        let f = Fixture::new(GestureConfig::default());
        let a = PointerKey::touch(1, 1);
        let b = PointerKey::touch(1, 2);
        f.down(b, 20);
        f.down(a, 10);
        f.processor.update(1_000);
        let holds = f.holds();
        assert_eq!(holds.len(), 2);
        assert_eq!(holds[0].key(), a);
        assert_eq!(holds[1].key(), b);
    }

    #[test]
    fn hold_with_clock_behind_the_down_never_fires() {
        let f = Fixture::new(GestureConfig::default());
        f.down(K, 5_000);
        f.processor.update(100);
        assert!(f.holds().is_empty());
    }

    #[test]
    fn dropped_bus_is_tolerated() {
        let bus = Arc::new(EventBus::new());
        let processor = PointerGestureEventProcessor::new(&bus, GestureConfig::default());
        drop(bus);
        processor.on_pointer_down(&at(K, PointerEventKind::Down, 0));
        processor.on_pointer_up(&at(K, PointerEventKind::Up, 1));
        processor.on_pointer_down(&at(K, PointerEventKind::Down, 2));
        assert!(processor.on_pointer_up(&at(K, PointerEventKind::Up, 3)));
        processor.on_pointer_down(&at(K, PointerEventKind::Down, 4));
        processor.update(10_000);
    }

    #[test]
    fn single_taps_on_fresh_ids_do_not_accumulate() {
        let f = Fixture::default_with_tap(300);
        for id in 0..10_000 {
            f.tap(PointerKey::touch(0, id), id as u64 * 1_000);
        }
        // Each up expires the taps before it.
        assert_eq!(f.processor.last_tap_count(), 1);

        f.processor.update(100_000_000);
        assert_eq!(f.processor.last_tap_count(), 0);
    }

    #[test]
    fn update_keeps_taps_that_can_still_double() {
        let f = Fixture::new(GestureConfig::default().with_hold_threshold(None));
        f.tap(K, 1_000);
        f.processor.update(1_299);
        assert!(f.processor.last_tap(&K).is_some());
        assert!(f.tap(K, 1_250));

        f.tap(K, 2_000);
        f.processor.update(2_300);
        assert_eq!(f.processor.last_tap(&K), None);
        // Taps stamped ahead of the frame clock survive the sweep.
        f.tap(K, 9_000);
        f.processor.update(5_000);
        assert!(f.processor.last_tap(&K).is_some());
    }

    #[test]
    fn reset_forgets_everything() {
        let f = Fixture::default_with_tap(300);
        f.tap(K, 0);
        f.down(K, 10);
        f.processor.reset();
        assert_eq!(f.processor.pending_count(), 0);
        assert_eq!(f.processor.last_tap(&K), None);
    }

    #[test]
    fn down_and_move_are_never_handled() {
        let f = Fixture::default_with_tap(300);
        assert!(!f.down(K, 0));
        assert!(!f
            .processor
            .on_pointer_move(&at(K, PointerEventKind::Move, 1)));
    }

    trait CopyAt {
        fn copy_at(self, position: Point) -> Self;
    }

    impl CopyAt for PointerEvent {
        fn copy_at(mut self, position: Point) -> Self {
            self.position = position;
            self
        }
    }
}
