//! Low-level touch events and the semantic gestures classified from them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geom::Direction;

/// A touch axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Horizontal position.
    X,
    /// Vertical position.
    Y,
}

/// A low-level event from the touch device, in sensor space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawEvent {
    /// Absolute position update on one axis.
    AxisUpdate {
        /// Axis being updated.
        axis: Axis,
        /// New position.
        value: i32,
    },
    /// Multi-touch tracking id change. A non-negative id starts a contact,
    /// `-1` ends it.
    TrackingUpdate {
        /// Tracking id.
        id: i32,
    },
    /// Touch contact state.
    ContactUpdate {
        /// Finger down?
        down: bool,
    },
}

/// Gesture kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureKind {
    /// Contact started.
    Press,
    /// Contact ended without matching any other pattern.
    Release,
    /// Short stationary contact.
    Tap,
    /// Second tap within the double-tap window.
    DoubleTap,
    /// Long stationary contact.
    LongPress,
    /// Upward swipe.
    SwipeUp,
    /// Downward swipe.
    SwipeDown,
    /// Leftward swipe.
    SwipeLeft,
    /// Rightward swipe.
    SwipeRight,
}

impl GestureKind {
    /// The swipe gesture for a direction.
    pub fn swipe(dir: Direction) -> Self {
        match dir {
            Direction::Up => Self::SwipeUp,
            Direction::Down => Self::SwipeDown,
            Direction::Left => Self::SwipeLeft,
            Direction::Right => Self::SwipeRight,
        }
    }

    /// The direction of a swipe gesture.
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Self::SwipeUp => Some(Direction::Up),
            Self::SwipeDown => Some(Direction::Down),
            Self::SwipeLeft => Some(Direction::Left),
            Self::SwipeRight => Some(Direction::Right),
            _ => None,
        }
    }

    /// Short lowercase name, used in logs and the touch test screen.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Press => "press",
            Self::Release => "release",
            Self::Tap => "tap",
            Self::DoubleTap => "double_tap",
            Self::LongPress => "long_press",
            Self::SwipeUp => "swipe_up",
            Self::SwipeDown => "swipe_down",
            Self::SwipeLeft => "swipe_left",
            Self::SwipeRight => "swipe_right",
        }
    }
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A classified gesture in sensor space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Gesture {
    /// What happened.
    pub kind: GestureKind,
    /// Final x position.
    pub x: i32,
    /// Final y position.
    pub y: i32,
    /// X position where the contact started.
    pub start_x: i32,
    /// Y position where the contact started.
    pub start_y: i32,
}

impl Gesture {
    /// A gesture that started and ended at the same point.
    pub fn at(kind: GestureKind, x: i32, y: i32) -> Self {
        Self {
            kind,
            x,
            y,
            start_x: x,
            start_y: y,
        }
    }

    /// Signed horizontal travel of the contact.
    pub fn dx(&self) -> i32 {
        self.x.saturating_sub(self.start_x)
    }

    /// Signed vertical travel of the contact.
    pub fn dy(&self) -> i32 {
        self.y.saturating_sub(self.start_y)
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ({}, {})", self.kind, self.x, self.y)
    }
}
