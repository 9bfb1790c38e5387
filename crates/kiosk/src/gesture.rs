//! Gesture classification.
//!
//! The [`Classifier`] is a two-state machine (idle, contacted) fed with
//! [`RawEvent`]s and the time each event was observed. It emits a `Press` as
//! soon as a contact has a position of its own and exactly one further
//! gesture when it ends.
//!
//! Multi-touch kernels report a new contact as tracking id, positions, then
//! `BTN_TOUCH`, so the position held when a contact starts may belong to the
//! previous contact. Only positions reported since the last lift are trusted
//! to start a contact.

use std::time::{Duration, Instant};

use tracing::trace;

use crate::{
    config::GestureConfig,
    event::{Axis, Gesture, GestureKind, RawEvent},
    geom::{Direction, SensorSpace},
};

/// Classifier-internal state.
#[derive(Debug, Default, Clone)]
struct GestureState {
    /// Is a finger currently down?
    contact_active: bool,
    /// Latest reported x, in or out of a contact.
    cursor_x: Option<i32>,
    /// Latest reported y, in or out of a contact.
    cursor_y: Option<i32>,
    /// X reported since the last contact ended.
    fresh_x: bool,
    /// Y reported since the last contact ended.
    fresh_y: bool,
    /// Where the current contact started.
    start: Option<(i32, i32)>,
    /// When the current contact started.
    start_time: Option<Instant>,
    /// Most recent position within the current contact.
    last: Option<(i32, i32)>,
    /// The contact started before a position of its own was known; `Press`
    /// goes out with the first one.
    press_pending: bool,
    /// When the last tap or double tap was emitted.
    last_tap_time: Option<Instant>,
    /// Consecutive taps inside the double-tap window.
    tap_count: u32,
}

impl GestureState {
    /// The latest complete position, if both axes have reported.
    fn cursor(&self) -> Option<(i32, i32)> {
        Some((self.cursor_x?, self.cursor_y?))
    }

    /// Has either axis reported since the last contact ended?
    fn fresh(&self) -> bool {
        self.fresh_x || self.fresh_y
    }
}

/// Turns raw touch events into gestures.
#[derive(Debug, Clone)]
pub struct Classifier {
    /// Thresholds.
    config: GestureConfig,
    /// Sensor dimensions, for the swipe threshold.
    space: SensorSpace,
    /// Current state.
    state: GestureState,
}

impl Classifier {
    /// Construct a classifier.
    pub fn new(config: GestureConfig, space: SensorSpace) -> Self {
        Self {
            config,
            space,
            state: GestureState::default(),
        }
    }

    /// Is a contact in progress?
    pub fn contact_active(&self) -> bool {
        self.state.contact_active
    }

    /// The current consecutive tap count.
    pub fn tap_count(&self) -> u32 {
        self.state.tap_count
    }

    /// Feed one event observed at `now`, returning the gesture it completes.
    pub fn feed(&mut self, event: RawEvent, now: Instant) -> Option<Gesture> {
        match event {
            RawEvent::AxisUpdate { axis, value } => self.axis(axis, value),
            RawEvent::TrackingUpdate { id } if id >= 0 => self.contact_down(now),
            RawEvent::TrackingUpdate { .. } => self.contact_up(now),
            RawEvent::ContactUpdate { down: true } => self.contact_down(now),
            RawEvent::ContactUpdate { down: false } => self.contact_up(now),
        }
    }

    /// Record a position update.
    fn axis(&mut self, axis: Axis, value: i32) -> Option<Gesture> {
        match axis {
            Axis::X => {
                self.state.cursor_x = Some(value);
                self.state.fresh_x = true;
            }
            Axis::Y => {
                self.state.cursor_y = Some(value);
                self.state.fresh_y = true;
            }
        }
        if !self.state.contact_active {
            return None;
        }
        if self.state.press_pending {
            if self.state.fresh_x && self.state.fresh_y {
                return self.begin();
            }
            return None;
        }
        let pos = self.state.cursor()?;
        self.state.last = Some(pos);
        None
    }

    /// Fix the contact's start at the cursor and emit its `Press`.
    fn begin(&mut self) -> Option<Gesture> {
        let (x, y) = self.state.cursor()?;
        self.state.start = Some((x, y));
        self.state.last = Some((x, y));
        self.state.press_pending = false;
        Some(Gesture::at(GestureKind::Press, x, y))
    }

    /// Idle → contacted.
    ///
    /// A second down signal for a contact that is still waiting for its
    /// position settles the start at the cursor: by then the kernel has sent
    /// every axis that changed.
    fn contact_down(&mut self, now: Instant) -> Option<Gesture> {
        if self.state.contact_active {
            if self.state.press_pending && self.state.fresh() {
                return self.begin();
            }
            return None;
        }
        let window = self.config.double_tap_window();
        if self
            .state
            .last_tap_time
            .is_none_or(|t| now.saturating_duration_since(t) > window)
        {
            self.state.tap_count = 0;
        }
        self.state.contact_active = true;
        self.state.start_time = Some(now);
        self.state.start = None;
        self.state.last = None;
        self.state.press_pending = true;
        if self.state.fresh() {
            return self.begin();
        }
        None
    }

    /// Contacted → idle.
    fn contact_up(&mut self, now: Instant) -> Option<Gesture> {
        if !self.state.contact_active {
            return None;
        }
        self.state.contact_active = false;
        if self.state.press_pending {
            // No axis changed during the contact: it sits where the cursor is.
            let pos = self.state.cursor();
            self.state.start = pos;
            self.state.last = pos;
            self.state.press_pending = false;
        }
        self.state.fresh_x = false;
        self.state.fresh_y = false;
        let start = self.state.start.take();
        let last = self.state.last.take();
        let started = self.state.start_time.take();
        let (Some(start), Some(last)) = (start, last) else {
            trace!("contact ended without a position");
            return None;
        };
        let duration = started.map_or(Duration::ZERO, |t| now.saturating_duration_since(t));
        let kind = self.classify(start, last, duration, now);
        Some(Gesture {
            kind,
            x: last.0,
            y: last.1,
            start_x: start.0,
            start_y: start.1,
        })
    }

    /// Pick the gesture for a finished contact.
    fn classify(
        &mut self,
        start: (i32, i32),
        last: (i32, i32),
        duration: Duration,
        now: Instant,
    ) -> GestureKind {
        let sdx = last.0.saturating_sub(start.0);
        let sdy = last.1.saturating_sub(start.1);
        let (dx, dy) = (sdx.saturating_abs(), sdy.saturating_abs());
        let cfg = &self.config;

        if dx < cfg.tap_distance && dy < cfg.tap_distance && duration < cfg.tap_time() {
            let within = self
                .state
                .last_tap_time
                .is_some_and(|t| now.saturating_duration_since(t) < cfg.double_tap_window());
            self.state.last_tap_time = Some(now);
            if within {
                self.state.tap_count += 1;
                if self.state.tap_count >= 2 {
                    self.state.tap_count = 0;
                    return GestureKind::DoubleTap;
                }
            } else {
                self.state.tap_count = 1;
            }
            return GestureKind::Tap;
        }

        if duration > cfg.long_press_time()
            && dx < cfg.long_press_distance
            && dy < cfg.long_press_distance
        {
            return GestureKind::LongPress;
        }

        if let Some(dir) = self.swipe_direction(sdx, sdy) {
            return GestureKind::swipe(dir);
        }
        GestureKind::Release
    }

    /// The swipe direction for a signed delta, if it travelled far enough
    /// along its dominant axis.
    fn swipe_direction(&self, sdx: i32, sdy: i32) -> Option<Direction> {
        let frac = self.config.swipe_fraction;
        let (dx, dy) = (sdx.saturating_abs(), sdy.saturating_abs());
        if dx > dy {
            if f64::from(dx) < frac * f64::from(self.space.width) {
                return None;
            }
            Some(if sdx > 0 {
                Direction::Right
            } else {
                Direction::Left
            })
        } else {
            if f64::from(dy) < frac * f64::from(self.space.height) || sdy == 0 {
                return None;
            }
            Some(if sdy > 0 { Direction::Down } else { Direction::Up })
        }
    }
}
