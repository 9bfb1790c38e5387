//! External collaborator processes: media players, mirroring receivers,
//! camera previews and system monitors that the kiosk hands control to.

use std::{
    os::unix::process::ExitStatusExt,
    process::{Child, Command, ExitStatus, Stdio},
    thread,
    time::{Duration, Instant},
};

use nix::{
    sys::signal::{Signal, kill},
    unistd::Pid,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    backend::release_terminal,
    error::{Error, Result},
};

/// How long a terminated collaborator gets between SIGTERM and SIGKILL.
pub const TEARDOWN_GRACE: Duration = Duration::from_secs(3);

/// Interval between liveness checks while waiting for an exit.
const WAIT_STEP: Duration = Duration::from_millis(50);

/// How to launch a collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollaboratorSpec {
    /// Program to run, looked up on `PATH` if not absolute.
    pub program: String,
    /// Fixed arguments.
    pub args: Vec<String>,
    /// The collaborator draws on the terminal itself and inherits stdio.
    pub holds_terminal: bool,
}

impl CollaboratorSpec {
    /// A collaborator with null stdio.
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|s| s.to_string()).collect(),
            holds_terminal: false,
        }
    }

    /// Mark the collaborator as owning the terminal.
    pub fn holding_terminal(mut self) -> Self {
        self.holds_terminal = true;
        self
    }

    /// The full argument vector, with `extra` appended if given.
    pub fn argv(&self, extra: Option<&str>) -> Vec<String> {
        let mut v = Vec::with_capacity(self.args.len() + 2);
        v.push(self.program.clone());
        v.extend(self.args.iter().cloned());
        v.extend(extra.map(String::from));
        v
    }
}

/// Describe an exit status for display.
pub fn describe_exit(status: ExitStatus) -> String {
    match (status.code(), status.signal()) {
        (Some(code), _) => format!("exit code {code}"),
        (None, Some(sig)) => format!("killed by signal {sig}"),
        _ => "unknown exit".into(),
    }
}

/// A running collaborator. Dropping it terminates the process.
#[derive(Debug)]
pub struct Collaborator {
    /// Program name, for logs.
    name: String,
    /// The child process.
    child: Child,
    /// Inherits the terminal?
    holds_terminal: bool,
    /// Launch time.
    started: Instant,
    /// When a non-blocking stop was requested.
    stop_requested: Option<Instant>,
    /// Exit status once observed.
    status: Option<ExitStatus>,
}

impl Collaborator {
    /// Launch a collaborator, appending `extra` to its arguments.
    pub fn spawn(spec: &CollaboratorSpec, extra: Option<&str>) -> Result<Self> {
        if spec.program.is_empty() {
            return Err(Error::Collaborator("no program configured".into()));
        }
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);
        if let Some(e) = extra {
            cmd.arg(e);
        }
        if spec.holds_terminal {
            release_terminal();
        } else {
            cmd.stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null());
        }
        let child = cmd
            .spawn()
            .map_err(|e| Error::Collaborator(format!("{}: {e}", spec.program)))?;
        info!(pid = child.id(), argv = ?spec.argv(extra), "launched collaborator");
        Ok(Self {
            name: spec.program.clone(),
            child,
            holds_terminal: spec.holds_terminal,
            started: Instant::now(),
            stop_requested: None,
            status: None,
        })
    }

    /// Process id.
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Program name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Does this collaborator own the terminal?
    pub fn holds_terminal(&self) -> bool {
        self.holds_terminal
    }

    /// Launch time.
    pub fn started(&self) -> Instant {
        self.started
    }

    /// Was a stop requested?
    pub fn stopping(&self) -> bool {
        self.stop_requested.is_some()
    }

    /// Check for exit without blocking. Returns the exit status once the
    /// process has ended. A pending stop escalates to SIGKILL once the
    /// teardown grace has passed.
    pub fn poll(&mut self) -> Result<Option<ExitStatus>> {
        if self.status.is_some() {
            return Ok(self.status);
        }
        self.status = self
            .child
            .try_wait()
            .map_err(|e| Error::Collaborator(format!("{}: {e}", self.name)))?;
        if let Some(s) = self.status {
            info!(name = %self.name, status = %describe_exit(s), "collaborator exited");
        } else if self
            .stop_requested
            .is_some_and(|t| t.elapsed() >= TEARDOWN_GRACE)
        {
            warn!(name = %self.name, "collaborator ignored SIGTERM, killing");
            self.stop_requested = None;
            drop(self.child.kill());
        }
        Ok(self.status)
    }

    /// Is the process still running?
    pub fn is_running(&mut self) -> bool {
        matches!(self.poll(), Ok(None))
    }

    /// Send SIGTERM and return immediately. [`Collaborator::poll`] finishes
    /// the job.
    pub fn request_stop(&mut self) {
        if self.status.is_some() || self.stop_requested.is_some() {
            return;
        }
        self.signal(Signal::SIGTERM);
        self.stop_requested = Some(Instant::now());
    }

    /// Deliver a signal, ignoring a process that has already gone.
    fn signal(&self, sig: Signal) {
        let Ok(pid) = i32::try_from(self.child.id()) else {
            return;
        };
        if let Err(e) = kill(Pid::from_raw(pid), sig) {
            warn!(name = %self.name, "sending {sig}: {e}");
        }
    }

    /// Terminate: SIGTERM, wait up to `grace`, then SIGKILL. Returns the
    /// exit status.
    pub fn terminate(&mut self, grace: Duration) -> Result<ExitStatus> {
        if let Some(s) = self.poll()? {
            return Ok(s);
        }
        info!(name = %self.name, pid = self.id(), "terminating collaborator");
        self.signal(Signal::SIGTERM);
        let deadline = Instant::now() + grace;
        while Instant::now() < deadline {
            if let Some(s) = self.poll()? {
                return Ok(s);
            }
            thread::sleep(WAIT_STEP);
        }
        warn!(name = %self.name, "collaborator did not exit, killing");
        drop(self.child.kill());
        let s = self
            .child
            .wait()
            .map_err(|e| Error::Collaborator(format!("{}: {e}", self.name)))?;
        self.status = Some(s);
        Ok(s)
    }

    /// Block until the process exits.
    pub fn wait(&mut self) -> Result<ExitStatus> {
        if let Some(s) = self.status {
            return Ok(s);
        }
        let s = self
            .child
            .wait()
            .map_err(|e| Error::Collaborator(format!("{}: {e}", self.name)))?;
        self.status = Some(s);
        Ok(s)
    }
}

impl Drop for Collaborator {
    fn drop(&mut self) {
        if self.status.is_none() {
            drop(self.terminate(TEARDOWN_GRACE));
        }
    }
}
