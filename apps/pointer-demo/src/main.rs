use std::sync::Arc;

use unipointer_core::PointerEvent;
use unipointer_input::prelude::*;

/// Prints every event it sees.
struct PrintingListener;

impl PrintingListener {
    fn print(&self, label: &str, event: &PointerEvent) {
        println!(
            "{:>6} ms  {:<14} {:?} device={} pointer={} index={} at ({:.0}, {:.0})",
            event.timestamp,
            label,
            event.pointer_type,
            event.device_id,
            event.pointer_id,
            event.pointer_index,
            event.position.x,
            event.position.y,
        );
    }
}

impl PointerListener for PrintingListener {
    fn on_pointer_down(&self, event: &PointerEvent) -> bool {
        self.print("down", event);
        false
    }

    fn on_pointer_up(&self, event: &PointerEvent) -> bool {
        self.print("up", event);
        false
    }

    fn on_pointer_move(&self, event: &PointerEvent) -> bool {
        self.print("move", event);
        false
    }

    fn on_pointer_cancel(&self, event: &PointerEvent) -> bool {
        self.print("cancel", event);
        false
    }
}

impl GestureListener for PrintingListener {
    fn on_pointer_double_press(&self, event: &PointerEvent) -> bool {
        self.print("DOUBLE-PRESS", event);
        true
    }

    fn on_pointer_press_and_hold(&self, event: &PointerEvent) -> bool {
        self.print("PRESS-AND-HOLD", event);
        true
    }
}

fn main() {
    #[cfg(feature = "logging")]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    println!("=== unipointer scripted demo ===");
    println!("Set RUST_LOG=debug to see gesture bookkeeping.");
    println!();

    let router = InputRouter::default();
    let listener = Arc::new(PrintingListener);
    let _pointer = router.subscribe_pointer_events(listener.clone(), Priority::APP);
    let _gestures = router.subscribe_gesture_events(listener, Priority::APP);
    let input = router.pointer_processor();

    println!("-- mouse double click");
    input.on_mouse_pressed(&RawMouseEvent::new(10.0, 10.0, 0, 0));
    input.on_mouse_released(&RawMouseEvent::new(10.0, 10.0, 0, 50));
    input.on_mouse_pressed(&RawMouseEvent::new(10.0, 10.0, 0, 100));
    input.on_mouse_released(&RawMouseEvent::new(10.0, 10.0, 0, 120));

    println!("-- two-finger touch, one finger held");
    input.on_touch_down(&RawTouchEvent::new(0, 1, 100.0, 100.0, 1_000).with_pressure(0.6));
    input.on_touch_down(&RawTouchEvent::new(0, 2, 200.0, 100.0, 1_010));
    input.on_touch_moved(&RawTouchEvent::new(0, 2, 260.0, 100.0, 1_100));
    for frame in (1_016..=1_600).step_by(16) {
        router.update(frame);
    }
    input.on_touch_up(&RawTouchEvent::new(0, 1, 100.0, 100.0, 1_620));
    input.on_touch_cancelled(&RawTouchEvent::new(0, 2, 260.0, 100.0, 1_620));

    log::info!(
        "done: {} pointer listeners, {} gesture listeners",
        router.bus().pointer_listener_count(),
        router.bus().gesture_listener_count()
    );
}
