//! Mouse and touch callbacks arriving on different threads.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use unipointer_core::PointerEvent;
use unipointer_input::{
    InputRouter, PointerListener, Priority, RawMouseEvent, RawTouchEvent,
};
use unipointer_testing::{Channel, EventRecorder};

const ROUNDS: u64 = 500;

#[test]
fn mouse_and_touch_threads_share_one_router() {
    let router = InputRouter::default();
    let recorder = Arc::new(EventRecorder::new());
    let _pointer = router.subscribe_pointer_events(recorder.clone(), Priority::APP);
    let _gestures = router.subscribe_gesture_events(recorder.clone(), Priority::APP);

    thread::scope(|scope| {
        scope.spawn(|| {
            let input = router.pointer_processor();
            for round in 0..ROUNDS {
                let t = round * 1_000;
                input.on_mouse_pressed(&RawMouseEvent::new(1.0, 1.0, 0, t));
                input.on_mouse_dragged(&RawMouseEvent::new(2.0, 1.0, 0, t + 5));
                input.on_mouse_released(&RawMouseEvent::new(2.0, 1.0, 0, t + 10));
            }
        });
        scope.spawn(|| {
            let input = router.pointer_processor();
            for round in 0..ROUNDS {
                let t = round * 1_000;
                let id = round as i64;
                input.on_touch_down(&RawTouchEvent::new(1, id, 50.0, 50.0, t));
                input.on_touch_moved(&RawTouchEvent::new(1, id, 51.0, 50.0, t + 5));
                input.on_touch_up(&RawTouchEvent::new(1, id, 51.0, 50.0, t + 10));
            }
        });
        // Frames stamped at the origin never see a down as held.
        scope.spawn(|| {
            for _ in 0..ROUNDS {
                router.update(0);
            }
        });
    });

    let per_channel = 2 * ROUNDS as usize;
    assert_eq!(recorder.count(Channel::Down), per_channel);
    assert_eq!(recorder.count(Channel::Move), per_channel);
    assert_eq!(recorder.count(Channel::Up), per_channel);
    assert_eq!(recorder.count(Channel::DoublePress), 0);
    assert_eq!(recorder.count(Channel::PressAndHold), 0);
    assert_eq!(router.pointer_processor().active_pointer_count(), 0);
    assert_eq!(router.gesture_processor().pending_count(), 0);

    router.update(ROUNDS * 1_000 + 1_000);
    assert_eq!(router.gesture_processor().last_tap_count(), 0);
}

#[derive(Default)]
struct LateCallCounter {
    detached: AtomicBool,
    late_calls: AtomicUsize,
}

impl PointerListener for LateCallCounter {
    fn on_pointer_down(&self, _event: &PointerEvent) -> bool {
        if self.detached.load(Ordering::SeqCst) {
            self.late_calls.fetch_add(1, Ordering::SeqCst);
        }
        thread::yield_now();
        false
    }
}

#[test]
fn detached_listener_is_never_called_from_another_thread() {
    for round in 0..1_000 {
        let router = InputRouter::default();
        let listener = Arc::new(LateCallCounter::default());
        let id = router
            .subscribe_pointer_events(listener.clone(), Priority::APP)
            .detach();

        thread::scope(|scope| {
            scope.spawn(|| {
                for pointer in 0..20 {
                    router
                        .pointer_processor()
                        .on_touch_down(&RawTouchEvent::new(0, pointer, 0.0, 0.0, round));
                }
            });
            assert!(router.unsubscribe(id));
            listener.detached.store(true, Ordering::SeqCst);
        });

        assert_eq!(listener.late_calls.load(Ordering::SeqCst), 0);
    }
}
