//! The application: screen registry, navigation, gesture dispatch and the
//! render loop.

use std::{
    io::{self, Write},
    panic,
    sync::mpsc::{Receiver, TryRecvError},
    thread,
    time::{Duration, Instant},
};

use color_backtrace::{BacktracePrinter, default_output_stream};
use scopeguard::guard;
use tracing::{debug, info, warn};

use crate::{
    backend::{TerminalInput, TerminalSession, poll_input, restore_terminal},
    canvas::Canvas,
    config::{Config, LoopConfig},
    error::{Error, Result},
    event::Gesture,
    geom::{Expanse, SensorSpace},
    screen::{Context, Request, Screen},
};

/// A canned sequence of frames played before the main loop.
pub trait Animation {
    /// Draw the next frame onto a cleared canvas. Returns false once the
    /// frame drawn was the last.
    fn frame(&mut self, c: &mut Canvas) -> bool;

    /// Delay between frames.
    fn interval(&self) -> Duration;
}

/// Application state.
pub struct App {
    /// Registered screens, in registration order.
    screens: Vec<(&'static str, Box<dyn Screen>)>,
    /// Index of the active screen.
    current: Option<usize>,
    /// Index of the screen that was active before it, for "back".
    previous: Option<usize>,
    /// Keep looping?
    running: bool,
    /// Does the active screen need redrawing?
    dirty: bool,
    /// When the last frame was written.
    last_render: Option<Instant>,
    /// The frame buffer.
    canvas: Canvas,
    /// Gestures from the input thread.
    gestures: Receiver<Gesture>,
    /// Touch sensor space.
    space: SensorSpace,
    /// Loop cadence.
    config: LoopConfig,
    /// Terminal size.
    term: Expanse,
    /// Is a collaborator holding the terminal?
    terminal_held: bool,
    /// Has the input thread gone away?
    input_lost: bool,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("current", &self.current_name())
            .field("previous", &self.previous_name())
            .field("running", &self.running)
            .field("dirty", &self.dirty)
            .field("term", &self.term)
            .finish()
    }
}

impl App {
    /// Create an application reading gestures from `gestures`, drawing on a
    /// terminal of size `term`. No screen is active until the first
    /// [`App::switch_screen`].
    pub fn new(config: &Config, gestures: Receiver<Gesture>, term: Expanse) -> Result<Self> {
        Ok(Self {
            screens: vec![],
            current: None,
            previous: None,
            running: true,
            dirty: true,
            last_render: None,
            canvas: Canvas::new(term),
            gestures,
            space: config.sensor.space()?,
            config: config.runloop.clone(),
            term,
            terminal_held: false,
            input_lost: false,
        })
    }

    /// Register a screen under a name. A later registration under the same
    /// name replaces the earlier one.
    pub fn add_screen(&mut self, name: &'static str, screen: impl Screen + 'static) {
        let screen: Box<dyn Screen> = Box::new(screen);
        match self.screens.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = screen,
            None => self.screens.push((name, screen)),
        }
    }

    /// Names of all registered screens.
    pub fn screen_names(&self) -> Vec<&'static str> {
        self.screens.iter().map(|(n, _)| *n).collect()
    }

    /// The active screen's name.
    pub fn current_name(&self) -> Option<&'static str> {
        self.current.map(|i| self.screens[i].0)
    }

    /// The previous screen's name.
    pub fn previous_name(&self) -> Option<&'static str> {
        self.previous.map(|i| self.screens[i].0)
    }

    /// Is the loop still running?
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Does the active screen need redrawing?
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The frame buffer.
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Terminal size.
    pub fn term(&self) -> Expanse {
        self.term
    }

    /// Stop the loop after the current iteration.
    pub fn quit(&mut self) {
        info!("quit requested");
        self.running = false;
    }

    /// A context for a dispatch at `now`.
    fn context(&self, now: Instant) -> Context {
        Context::new(now, self.term, self.space)
    }

    /// Adopt a new terminal size.
    pub fn resize(&mut self, term: Expanse) {
        if term == self.term {
            return;
        }
        debug!("terminal resized to {}x{}", term.w, term.h);
        self.term = term;
        self.canvas.resize(term);
        if let Some(i) = self.current {
            self.screens[i].1.layout(term);
        }
        self.dirty = true;
    }

    /// Make a named screen active. The outgoing screen's `exit` runs before
    /// the incoming screen's `layout` and `enter`.
    pub fn switch_screen(&mut self, name: &str, now: Instant) -> Result<()> {
        let idx = self
            .screens
            .iter()
            .position(|(n, _)| *n == name)
            .ok_or_else(|| Error::RunLoop(format!("unknown screen: {name}")))?;
        if self.current == Some(idx) {
            return Ok(());
        }
        let mut ctx = self.context(now);
        if let Some(cur) = self.current {
            debug!("leaving screen {}", self.screens[cur].0);
            self.screens[cur].1.exit(&mut ctx);
        }
        // Requests made while exiting are superseded by this switch.
        drop(ctx.take_request());
        info!("switching to screen {name}");
        self.previous = self.current;
        self.current = Some(idx);
        let term = self.term;
        let screen = &mut self.screens[idx].1;
        screen.layout(term);
        screen.enter(&mut ctx);
        self.dirty = true;
        self.apply(ctx, now)
    }

    /// Return to the previous screen, if there is one.
    pub fn back(&mut self, now: Instant) -> Result<()> {
        match self.previous {
            Some(p) => {
                let name = self.screens[p].0;
                self.switch_screen(name, now)
            }
            None => Ok(()),
        }
    }

    /// Apply what a screen asked for during a dispatch.
    fn apply(&mut self, mut ctx: Context, now: Instant) -> Result<()> {
        if ctx.is_dirty() {
            self.dirty = true;
        }
        match ctx.take_request() {
            Some(Request::Switch(name)) => self.switch_screen(name, now),
            Some(Request::Back) => self.back(now),
            Some(Request::Quit) => {
                self.quit();
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Deliver one gesture to the active screen. Delivery always marks the
    /// screen dirty.
    pub fn dispatch(&mut self, g: &Gesture, now: Instant) -> Result<bool> {
        self.dirty = true;
        let Some(cur) = self.current else {
            return Ok(false);
        };
        let mut ctx = self.context(now);
        let handled = self.screens[cur].1.handle(g, &mut ctx);
        debug!("{g} -> {} (handled: {handled})", self.screens[cur].0);
        self.apply(ctx, now)?;
        Ok(handled)
    }

    /// Deliver every gesture waiting on the channel.
    fn drain(&mut self, now: Instant) -> Result<usize> {
        let mut n = 0;
        loop {
            match self.gestures.try_recv() {
                Ok(g) => {
                    self.dispatch(&g, now)?;
                    n += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.input_lost {
                        warn!("touch input has stopped; keyboard quit still works");
                        self.input_lost = true;
                    }
                    break;
                }
            }
        }
        Ok(n)
    }

    /// Does the active screen's collaborator own the terminal?
    pub fn holds_terminal(&self) -> bool {
        self.current
            .is_some_and(|i| self.screens[i].1.holds_terminal())
    }

    /// One loop iteration without the terminal: drain gestures, tick the
    /// active screen, apply requests, then render if due. Returns true if a
    /// frame was written.
    pub fn step<W: Write>(&mut self, now: Instant, out: &mut W) -> Result<bool> {
        self.drain(now)?;
        if !self.running {
            return Ok(false);
        }
        if let Some(cur) = self.current {
            let mut ctx = self.context(now);
            self.screens[cur].1.tick(&mut ctx);
            self.apply(ctx, now)?;
        }
        if !self.running || self.holds_terminal() {
            return Ok(false);
        }
        self.render_if_due(now, out)
    }

    /// Render if dirty and the frame interval has passed since the last
    /// frame.
    fn render_if_due<W: Write>(&mut self, now: Instant, out: &mut W) -> Result<bool> {
        if !self.dirty {
            return Ok(false);
        }
        if self
            .last_render
            .is_some_and(|t| now.saturating_duration_since(t) < self.config.frame_interval())
        {
            return Ok(false);
        }
        self.render(now, out)
    }

    /// Draw the active screen and write the frame.
    fn render<W: Write>(&mut self, now: Instant, out: &mut W) -> Result<bool> {
        let Some(cur) = self.current else {
            return Ok(false);
        };
        self.screens[cur].1.draw(&mut self.canvas);
        let wrote = self.canvas.render(out)?;
        self.dirty = false;
        self.last_render = Some(now);
        Ok(wrote)
    }

    /// Play an animation on the canvas, then leave the screen dirty so the
    /// first real frame replaces it.
    pub fn play<W: Write>(&mut self, anim: &mut dyn Animation, out: &mut W) -> Result<()> {
        loop {
            self.canvas.clear();
            let more = anim.frame(&mut self.canvas);
            self.canvas.render(out)?;
            if !more {
                break;
            }
            thread::sleep(anim.interval());
        }
        self.canvas.mark_dirty();
        self.dirty = true;
        Ok(())
    }

    /// Exit the active screen, stopping any collaborator it owns.
    pub fn shutdown(&mut self, now: Instant) {
        if let Some(cur) = self.current.take() {
            let mut ctx = self.context(now);
            self.screens[cur].1.exit(&mut ctx);
        }
        self.running = false;
    }

    /// Run the loop on a terminal session until quit.
    pub fn run_session(&mut self, session: &mut TerminalSession) -> Result<()> {
        while self.running {
            let now = Instant::now();
            if !self.terminal_held {
                match poll_input(self.config.quit_key)? {
                    Some(TerminalInput::Quit) => {
                        self.quit();
                        break;
                    }
                    Some(TerminalInput::Resized(sz)) => self.resize(sz),
                    None => {}
                }
                self.resize(session.size()?);
            }
            self.step(now, session.writer())?;

            let held = self.holds_terminal();
            if held && !self.terminal_held {
                info!("collaborator owns the terminal");
                session.suspend()?;
                self.terminal_held = true;
            } else if !held && self.terminal_held {
                info!("terminal returned");
                session.resume()?;
                self.terminal_held = false;
                self.resize(session.size()?);
                self.canvas.mark_dirty();
                self.dirty = true;
            }
            thread::sleep(self.config.idle_sleep());
        }
        self.shutdown(Instant::now());
        Ok(())
    }

    /// Take over the terminal, optionally play a splash animation, switch to
    /// `initial` and loop until quit. The terminal is restored on every exit
    /// path, including panics.
    pub fn run(&mut self, initial: &str, splash: Option<&mut dyn Animation>) -> Result<()> {
        let mut session = TerminalSession::start()?;
        let previous = panic::take_hook();
        panic::set_hook(Box::new(|pi| {
            restore_terminal();
            #[allow(unused_must_use)]
            {
                BacktracePrinter::new().print_panic_info(pi, &mut default_output_stream());
            }
        }));
        let _hook = guard(previous, |hook| {
            panic::set_hook(hook);
        });

        self.resize(session.size()?);
        if let Some(anim) = splash {
            self.play(anim, session.writer())?;
        }
        self.switch_screen(initial, Instant::now())?;
        let ret = self.run_session(&mut session);
        drop(io::stdout().flush());
        ret
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc, sync::mpsc};

    use super::*;
    use crate::{
        event::GestureKind,
        testing::{CountingWriter, canvas_contains},
    };

    /// Records lifecycle calls into a shared log.
    struct Probe {
        name: &'static str,
        log: Rc<RefCell<Vec<String>>>,
        on_tap: Option<Request>,
        hold: bool,
    }

    impl Probe {
        fn new(name: &'static str, log: &Rc<RefCell<Vec<String>>>) -> Self {
            Self {
                name,
                log: log.clone(),
                on_tap: None,
                hold: false,
            }
        }

        fn on_tap(mut self, r: Request) -> Self {
            self.on_tap = Some(r);
            self
        }
    }

    impl Screen for Probe {
        fn title(&self) -> &str {
            self.name
        }

        fn layout(&mut self, size: Expanse) {
            self.log
                .borrow_mut()
                .push(format!("layout {} {}x{}", self.name, size.w, size.h));
        }

        fn enter(&mut self, _ctx: &mut Context) {
            self.log.borrow_mut().push(format!("enter {}", self.name));
        }

        fn exit(&mut self, _ctx: &mut Context) {
            self.log.borrow_mut().push(format!("exit {}", self.name));
        }

        fn handle(&mut self, g: &Gesture, ctx: &mut Context) -> bool {
            self.log
                .borrow_mut()
                .push(format!("{} got {}", self.name, g.kind));
            if g.kind == GestureKind::Tap {
                match self.on_tap.clone() {
                    Some(Request::Switch(n)) => ctx.switch(n),
                    Some(Request::Back) => ctx.back(),
                    Some(Request::Quit) => ctx.quit(),
                    None => {}
                }
            }
            true
        }

        fn draw(&self, c: &mut Canvas) {
            c.clear();
            c.draw_text(0, 0, self.name);
        }

        fn holds_terminal(&self) -> bool {
            self.hold
        }
    }

    fn app() -> (App, mpsc::Sender<Gesture>, Rc<RefCell<Vec<String>>>) {
        let (tx, rx) = mpsc::channel();
        let log = Rc::new(RefCell::new(vec![]));
        let mut a = match App::new(&Config::default(), rx, Expanse::new(20, 5)) {
            Ok(a) => a,
            Err(e) => panic!("{e}"),
        };
        a.add_screen("main", Probe::new("main", &log).on_tap(Request::Switch("other")));
        a.add_screen("other", Probe::new("other", &log).on_tap(Request::Back));
        (a, tx, log)
    }

    fn tap() -> Gesture {
        Gesture::at(GestureKind::Tap, 1, 1)
    }

    #[test]
    fn nothing_active_before_first_switch() -> Result<()> {
        let (mut a, tx, log) = app();
        assert_eq!(a.current_name(), None);
        tx.send(tap()).ok();
        let mut w = CountingWriter::default();
        assert!(!a.step(Instant::now(), &mut w)?);
        assert!(log.borrow().is_empty());
        Ok(())
    }

    #[test]
    fn exit_runs_before_enter() -> Result<()> {
        let (mut a, tx, log) = app();
        let now = Instant::now();
        a.switch_screen("main", now)?;
        tx.send(tap()).ok();
        a.step(now, &mut CountingWriter::default())?;
        assert_eq!(a.current_name(), Some("other"));
        assert_eq!(a.previous_name(), Some("main"));
        assert_eq!(
            *log.borrow(),
            vec![
                "layout main 20x5",
                "enter main",
                "main got tap",
                "exit main",
                "layout other 20x5",
                "enter other",
            ]
        );
        tx.send(tap()).ok();
        a.step(now, &mut CountingWriter::default())?;
        assert_eq!(a.current_name(), Some("main"));
        Ok(())
    }

    #[test]
    fn unknown_screen_is_an_error() {
        let (mut a, _tx, _log) = app();
        assert!(matches!(
            a.switch_screen("nope", Instant::now()),
            Err(Error::RunLoop(_))
        ));
    }

    #[test]
    fn render_cap_and_dirty_flag() -> Result<()> {
        let (mut a, tx, _log) = app();
        let t0 = Instant::now();
        a.switch_screen("main", t0)?;
        let mut w = CountingWriter::default();
        assert!(a.step(t0, &mut w)?);
        assert_eq!(w.writes, 1);
        assert!(canvas_contains(a.canvas(), "main"));
        assert!(!a.is_dirty());

        // Clean: nothing written.
        assert!(!a.step(t0 + Duration::from_millis(100), &mut w)?);
        assert_eq!(w.writes, 1);

        // Dirty but inside the frame interval: deferred.
        tx.send(Gesture::at(GestureKind::Press, 1, 1)).ok();
        assert!(!a.step(t0 + Duration::from_millis(110), &mut w)?);
        assert!(a.is_dirty());
        assert!(a.step(t0 + Duration::from_millis(150), &mut w)?);
        assert_eq!(w.writes, 2);
        Ok(())
    }

    #[test]
    fn quit_request_stops_the_loop() -> Result<()> {
        let (tx, rx) = mpsc::channel();
        let log = Rc::new(RefCell::new(vec![]));
        let mut a = App::new(&Config::default(), rx, Expanse::new(20, 5))?;
        a.add_screen("main", Probe::new("main", &log).on_tap(Request::Quit));
        a.switch_screen("main", Instant::now())?;
        tx.send(tap()).ok();
        a.step(Instant::now(), &mut CountingWriter::default())?;
        assert!(!a.is_running());
        a.shutdown(Instant::now());
        assert_eq!(log.borrow().last().map(String::as_str), Some("exit main"));
        Ok(())
    }

    #[test]
    fn held_terminal_suppresses_rendering() -> Result<()> {
        let (tx, rx) = mpsc::channel::<Gesture>();
        drop(tx);
        let log = Rc::new(RefCell::new(vec![]));
        let mut a = App::new(&Config::default(), rx, Expanse::new(20, 5))?;
        let mut p = Probe::new("mon", &log);
        p.hold = true;
        a.add_screen("mon", p);
        a.switch_screen("mon", Instant::now())?;
        let mut w = CountingWriter::default();
        assert!(!a.step(Instant::now(), &mut w)?);
        assert_eq!(w.writes, 0);
        assert!(a.holds_terminal());
        Ok(())
    }

    #[test]
    fn resize_relayouts_current_screen() -> Result<()> {
        let (mut a, _tx, log) = app();
        a.switch_screen("main", Instant::now())?;
        a.resize(Expanse::new(30, 8));
        assert_eq!(log.borrow().last().map(String::as_str), Some("layout main 30x8"));
        assert_eq!(a.canvas().size(), Expanse::new(30, 8));
        Ok(())
    }

    struct Count(u32);

    impl Animation for Count {
        fn frame(&mut self, c: &mut Canvas) -> bool {
            c.draw_text(0, 0, &format!("{}", self.0));
            self.0 += 1;
            self.0 < 3
        }

        fn interval(&self) -> Duration {
            Duration::ZERO
        }
    }

    #[test]
    fn animation_plays_every_frame() -> Result<()> {
        let (mut a, _tx, _log) = app();
        let mut w = CountingWriter::default();
        a.play(&mut Count(0), &mut w)?;
        assert_eq!(w.writes, 3);
        assert!(a.is_dirty());
        Ok(())
    }
}
