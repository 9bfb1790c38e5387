//! Handing the display over to a collaborator.
//!
//! A [`Handoff`] belongs to a screen and tracks at most one collaborator
//! through `Idle → Active → Idle`, or `Active → Failed → Idle` when the
//! launch goes wrong. Launching never waits for the process. While active,
//! gestures are matched against the screen's bindings instead of its widgets.

use std::time::{Duration, Instant};

use serde_json::{Value, json};
use tracing::{debug, error, info};

use crate::{
    canvas::{Canvas, centered},
    collaborator::{Collaborator, CollaboratorSpec, TEARDOWN_GRACE, describe_exit},
    control::ControlChannel,
    event::{Gesture, GestureKind},
    geom::SensorSpace,
    screen::{Context, draw_title},
};

/// A collaborator that exits sooner than this after launch has failed.
pub const STARTUP_GRACE: Duration = Duration::from_secs(1);

/// How long a launch failure stays on screen.
pub const FAILURE_DISPLAY: Duration = Duration::from_secs(2);

/// What a bound gesture does while a collaborator runs.
#[derive(Debug, Clone, PartialEq)]
pub enum HandoffAction {
    /// Terminate the collaborator and return to the screen.
    Stop,
    /// Navigate to the previous screen, terminating the collaborator on exit.
    Back,
    /// Send a fixed command over the control channel.
    Send(Vec<Value>),
    /// Seek by the horizontal drag distance, scaled so that a full-width
    /// swipe covers `span_secs`.
    Seek {
        /// Seconds per full sensor width.
        span_secs: f64,
    },
}

/// The hand-off sub-state.
#[derive(Debug, Default)]
pub enum HandoffState {
    /// No collaborator.
    #[default]
    Idle,
    /// A collaborator owns the display.
    Active(Collaborator),
    /// The last launch failed; the message shows until `until`.
    Failed {
        /// What went wrong.
        message: String,
        /// When to return to idle.
        until: Instant,
    },
}

/// Transitions reported by [`Handoff::tick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandoffEvent {
    /// The collaborator exited normally.
    Exited(String),
    /// The launch failed.
    Failed(String),
    /// The failure display finished.
    Recovered,
}

/// Supervision of one screen's collaborator.
#[derive(Debug)]
pub struct Handoff {
    /// How to launch.
    spec: CollaboratorSpec,
    /// Current state.
    state: HandoffState,
    /// Gesture bindings while active.
    bindings: Vec<(GestureKind, HandoffAction)>,
    /// Control socket for `Send` and `Seek` bindings.
    control: Option<ControlChannel>,
    /// Minimum lifetime of a healthy collaborator.
    startup_grace: Duration,
    /// How long failures stay on screen.
    failure_display: Duration,
}

impl Handoff {
    /// Supervise collaborators launched from `spec`.
    pub fn new(spec: CollaboratorSpec) -> Self {
        Self {
            spec,
            state: HandoffState::Idle,
            bindings: vec![],
            control: None,
            startup_grace: STARTUP_GRACE,
            failure_display: FAILURE_DISPLAY,
        }
    }

    /// Bind a gesture to an action.
    pub fn bind(mut self, kind: GestureKind, action: HandoffAction) -> Self {
        self.bindings.retain(|(k, _)| *k != kind);
        self.bindings.push((kind, action));
        self
    }

    /// Use a control socket for `Send` and `Seek` bindings.
    pub fn with_control(mut self, control: ControlChannel) -> Self {
        self.control = Some(control);
        self
    }

    /// Override the startup grace and failure display times.
    pub fn with_timing(mut self, startup_grace: Duration, failure_display: Duration) -> Self {
        self.startup_grace = startup_grace;
        self.failure_display = failure_display;
        self
    }

    /// The launch spec.
    pub fn spec(&self) -> &CollaboratorSpec {
        &self.spec
    }

    /// The action bound to a gesture.
    pub fn binding(&self, kind: GestureKind) -> Option<&HandoffAction> {
        self.bindings
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, a)| a)
    }

    /// Current state.
    pub fn state(&self) -> &HandoffState {
        &self.state
    }

    /// Does a collaborator own the display?
    pub fn is_active(&self) -> bool {
        matches!(self.state, HandoffState::Active(_))
    }

    /// The failure being displayed, if any.
    pub fn failure(&self) -> Option<&str> {
        match &self.state {
            HandoffState::Failed { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Does a running collaborator own the terminal?
    pub fn holds_terminal(&self) -> bool {
        matches!(&self.state, HandoffState::Active(c) if c.holds_terminal())
    }

    /// Start a collaborator with an optional extra argument. Returns false
    /// if one is already running. A spawn error moves to `Failed`.
    pub fn launch(&mut self, extra: Option<&str>, now: Instant) -> bool {
        if self.is_active() {
            return false;
        }
        match Collaborator::spawn(&self.spec, extra) {
            Ok(c) => {
                self.state = HandoffState::Active(c);
                true
            }
            Err(e) => {
                error!("launch failed: {e}");
                self.fail(format!("Failed to launch: {e}"), now);
                false
            }
        }
    }

    /// Show a failure without launching, e.g. when a precondition does not
    /// hold. Any running collaborator is stopped first.
    pub fn fail(&mut self, message: String, now: Instant) {
        if self.is_active() {
            self.stop();
        }
        self.state = HandoffState::Failed {
            message,
            until: now + self.failure_display,
        };
    }

    /// Poll the collaborator and advance the failure timer.
    pub fn tick(&mut self, now: Instant) -> Option<HandoffEvent> {
        match &mut self.state {
            HandoffState::Idle => None,
            HandoffState::Active(c) => {
                let status = match c.poll() {
                    Ok(Some(s)) => s,
                    Ok(None) => return None,
                    Err(e) => {
                        let msg = e.to_string();
                        self.fail(msg.clone(), now);
                        return Some(HandoffEvent::Failed(msg));
                    }
                };
                let quick = now.saturating_duration_since(c.started()) < self.startup_grace;
                let desc = describe_exit(status);
                if quick && !c.stopping() {
                    let msg = format!("{} exited immediately ({desc})", c.name());
                    error!("{msg}");
                    self.fail(msg.clone(), now);
                    Some(HandoffEvent::Failed(msg))
                } else {
                    info!("{} finished: {desc}", c.name());
                    self.state = HandoffState::Idle;
                    Some(HandoffEvent::Exited(desc))
                }
            }
            HandoffState::Failed { until, .. } => {
                if now >= *until {
                    self.state = HandoffState::Idle;
                    Some(HandoffEvent::Recovered)
                } else {
                    None
                }
            }
        }
    }

    /// Ask a running collaborator to stop without waiting.
    pub fn request_stop(&mut self) {
        if let HandoffState::Active(c) = &mut self.state {
            c.request_stop();
        }
    }

    /// Terminate any running collaborator and return to idle. Used when
    /// the owning screen exits.
    pub fn stop(&mut self) {
        if let HandoffState::Active(c) = &mut self.state
            && let Err(e) = c.terminate(TEARDOWN_GRACE)
        {
            error!("stopping collaborator: {e}");
        }
        self.state = HandoffState::Idle;
    }

    /// Route a gesture while a collaborator is active. Returns true whenever
    /// the hand-off owns the display, so gestures never leak through to the
    /// screen's widgets.
    pub fn handle(&mut self, g: &Gesture, ctx: &mut Context) -> bool {
        if !self.is_active() {
            return false;
        }
        let Some(action) = self.binding(g.kind).cloned() else {
            return true;
        };
        debug!("hand-off {g} -> {action:?}");
        match action {
            HandoffAction::Stop => self.request_stop(),
            HandoffAction::Back => ctx.back(),
            HandoffAction::Send(cmd) => self.send(&cmd),
            HandoffAction::Seek { span_secs } => {
                let secs = seek_seconds(g.dx(), ctx.space(), span_secs);
                self.send(&[json!("seek"), json!(secs), json!("relative")]);
            }
        }
        true
    }

    /// Send a command over the control channel, if there is one.
    fn send(&self, cmd: &[Value]) {
        match &self.control {
            Some(ch) => {
                ch.send(cmd);
            }
            None => debug!("no control channel for {cmd:?}"),
        }
    }

    /// Draw the instruction overlay shown while a collaborator runs, or the
    /// failure message. Does nothing while idle.
    pub fn draw_overlay(&self, c: &mut Canvas, title: &str, instructions: &[&str]) {
        let lines: Vec<String> = match &self.state {
            HandoffState::Idle => return,
            HandoffState::Active(p) => std::iter::once(format!("{} is running", p.name()))
                .chain(std::iter::once(String::new()))
                .chain(instructions.iter().map(|s| s.to_string()))
                .collect(),
            HandoffState::Failed { message, .. } => {
                vec![format!("Error: {message}"), String::new(), "Returning...".into()]
            }
        };
        // Long messages wrap rather than clip at both edges.
        let width = c.width().saturating_sub(4).max(10) as usize;
        let lines: Vec<String> = lines
            .iter()
            .flat_map(|l| {
                if l.is_empty() {
                    vec![String::new()]
                } else {
                    textwrap::wrap(l, width)
                        .into_iter()
                        .map(|s| s.into_owned())
                        .collect()
                }
            })
            .collect();
        c.clear();
        draw_title(c, title);
        let top = (c.height() as i32 - lines.len() as i32) / 2;
        for (i, l) in lines.iter().enumerate() {
            c.draw_text(centered(0, c.width(), l), top + i as i32, l);
        }
    }
}

impl Drop for Handoff {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Seconds to seek for a horizontal drag of `dx` sensor units. A drag across
/// the full sensor width seeks `span_secs`.
pub fn seek_seconds(dx: i32, space: SensorSpace, span_secs: f64) -> f64 {
    (space.fraction_x(dx) * span_secs).round()
}
