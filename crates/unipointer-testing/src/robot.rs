//! Scripted input for end-to-end tests.
//!
//! [`InputRobot`] owns an [`InputRouter`] and drives it with raw mouse and
//! touch notifications on a virtual timeline. Nothing reads the wall clock:
//! every event is stamped from the robot's [`ManualClock`], which only moves
//! when a test says so.
//!
//! # Example
//!
//! ```
//! use unipointer_testing::{Channel, InputRobot};
//!
//! let mut robot = InputRobot::new();
//! robot.click_at(10.0, 10.0);
//! robot.advance_time(50);
//! robot.click_at(10.0, 10.0);
//!
//! assert_eq!(robot.recorder().count(Channel::DoublePress), 1);
//! ```

use std::sync::Arc;

use unipointer_core::{Clock, DeviceId, ManualClock, PointerId, Timestamp};
use unipointer_input::{
    InputConfig, InputRouter, Priority, RawMouseEvent, RawTouchEvent, Subscription,
};

use crate::recorder::EventRecorder;

/// Default touch device used by the touch helpers.
pub const ROBOT_TOUCH_DEVICE: DeviceId = 0;

/// Time between the down and the up of a click or tap.
pub const ROBOT_CLICK_DURATION_MS: u64 = 10;

/// Number of intermediate moves emitted by drags.
pub const ROBOT_DRAG_STEPS: u32 = 4;

pub struct InputRobot {
    router: InputRouter,
    recorder: Arc<EventRecorder>,
    subscriptions: Vec<Subscription>,
    clock: ManualClock,
}

impl InputRobot {
    pub fn new() -> Self {
        Self::with_config(InputConfig::default())
    }

    /// Builds a router from `config` and attaches a recorder to both its
    /// pointer and gesture channels at [`Priority::APP`].
    pub fn with_config(config: InputConfig) -> Self {
        let router = InputRouter::new(config);
        let recorder = Arc::new(EventRecorder::new());
        let subscriptions = vec![
            router.subscribe_pointer_events(recorder.clone(), Priority::APP),
            router.subscribe_gesture_events(recorder.clone(), Priority::APP),
        ];
        Self {
            router,
            recorder,
            subscriptions,
            clock: ManualClock::new(0),
        }
    }

    pub fn router(&self) -> &InputRouter {
        &self.router
    }

    pub fn recorder(&self) -> &EventRecorder {
        &self.recorder
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> Timestamp {
        self.clock.now_millis()
    }

    /// Detaches the robot's recorder from the bus.
    pub fn stop_recording(&mut self) {
        self.subscriptions.clear();
    }

    /// Moves the timeline forward and runs one frame update.
    pub fn advance_time(&mut self, millis: u64) {
        let now = self.clock.advance(millis);
        self.router.update(now);
    }

    /// Jumps to `timestamp` without running a frame update. Moving
    /// backwards is allowed so tests can exercise out-of-order input.
    pub fn set_time(&mut self, timestamp: Timestamp) {
        self.clock.set(timestamp);
    }

    /// Runs one frame update at the current time.
    pub fn update(&self) {
        self.router.update(self.now());
    }

    // Mouse

    pub fn mouse_down(&self, x: f32, y: f32, button: u8) -> bool {
        self.router
            .pointer_processor()
            .on_mouse_pressed(&RawMouseEvent::new(x, y, button, self.now()))
    }

    pub fn mouse_up(&self, x: f32, y: f32, button: u8) -> bool {
        self.router
            .pointer_processor()
            .on_mouse_released(&RawMouseEvent::new(x, y, button, self.now()))
    }

    pub fn mouse_move(&self, x: f32, y: f32) -> bool {
        self.router
            .pointer_processor()
            .on_mouse_moved(&RawMouseEvent::new(x, y, 0, self.now()))
    }

    pub fn mouse_drag_to(&self, x: f32, y: f32, button: u8) -> bool {
        self.router
            .pointer_processor()
            .on_mouse_dragged(&RawMouseEvent::new(x, y, button, self.now()))
    }

    /// Primary-button press and release [`ROBOT_CLICK_DURATION_MS`] apart.
    pub fn click_at(&mut self, x: f32, y: f32) {
        self.mouse_down(x, y, 0);
        self.advance_time(ROBOT_CLICK_DURATION_MS);
        self.mouse_up(x, y, 0);
    }

    /// Two clicks separated by `gap_ms` between the first release and the
    /// second press.
    pub fn double_click_at(&mut self, x: f32, y: f32, gap_ms: u64) {
        self.click_at(x, y);
        self.advance_time(gap_ms);
        self.click_at(x, y);
    }

    /// Presses `button` at `from`, drags in [`ROBOT_DRAG_STEPS`] steps over
    /// `duration_ms` and releases at `to`.
    pub fn drag(&mut self, from: (f32, f32), to: (f32, f32), button: u8, duration_ms: u64) {
        self.mouse_down(from.0, from.1, button);
        let step_time = duration_ms / u64::from(ROBOT_DRAG_STEPS);
        for (x, y) in interpolate(from, to) {
            self.advance_time(step_time);
            self.mouse_drag_to(x, y, button);
        }
        self.mouse_up(to.0, to.1, button);
    }

    // Touch

    fn touch(&self, id: PointerId, x: f32, y: f32) -> RawTouchEvent {
        RawTouchEvent::new(ROBOT_TOUCH_DEVICE, id, x, y, self.now())
    }

    pub fn touch_down(&self, id: PointerId, x: f32, y: f32) -> bool {
        self.router.pointer_processor().on_touch_down(&self.touch(id, x, y))
    }

    pub fn touch_move(&self, id: PointerId, x: f32, y: f32) -> bool {
        self.router.pointer_processor().on_touch_moved(&self.touch(id, x, y))
    }

    pub fn touch_up(&self, id: PointerId, x: f32, y: f32) -> bool {
        self.router.pointer_processor().on_touch_up(&self.touch(id, x, y))
    }

    pub fn touch_double_tap(&self, id: PointerId, x: f32, y: f32) -> bool {
        self.router
            .pointer_processor()
            .on_touch_double_tap(&self.touch(id, x, y))
    }

    pub fn touch_cancel(&self, id: PointerId, x: f32, y: f32) -> bool {
        self.router
            .pointer_processor()
            .on_touch_cancelled(&self.touch(id, x, y))
    }

    /// Touch down and up [`ROBOT_CLICK_DURATION_MS`] apart.
    pub fn tap_at(&mut self, id: PointerId, x: f32, y: f32) {
        self.touch_down(id, x, y);
        self.advance_time(ROBOT_CLICK_DURATION_MS);
        self.touch_up(id, x, y);
    }

    /// Holds a stationary touch for `hold_ms`, running a frame update every
    /// `frame_ms`, then lifts it.
    pub fn long_press_at(&mut self, id: PointerId, x: f32, y: f32, hold_ms: u64, frame_ms: u64) {
        self.touch_down(id, x, y);
        let frame_ms = frame_ms.max(1);
        let mut held = 0;
        while held < hold_ms {
            let step = frame_ms.min(hold_ms - held);
            self.advance_time(step);
            held += step;
        }
        self.touch_up(id, x, y);
    }

    pub fn swipe(&mut self, id: PointerId, from: (f32, f32), to: (f32, f32), duration_ms: u64) {
        self.touch_down(id, from.0, from.1);
        let step_time = duration_ms / u64::from(ROBOT_DRAG_STEPS);
        for (x, y) in interpolate(from, to) {
            self.advance_time(step_time);
            self.touch_move(id, x, y);
        }
        self.touch_up(id, to.0, to.1);
    }
}

impl Default for InputRobot {
    fn default() -> Self {
        Self::new()
    }
}

fn interpolate(from: (f32, f32), to: (f32, f32)) -> impl Iterator<Item = (f32, f32)> {
    (1..=ROBOT_DRAG_STEPS).map(move |step| {
        let t = step as f32 / ROBOT_DRAG_STEPS as f32;
        (from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t)
    })
}
