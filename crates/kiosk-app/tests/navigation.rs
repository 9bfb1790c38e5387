//! Drive the assembled kiosk through gestures on an 80×24 terminal with the
//! default 800×480 sensor.

use std::{
    io::{BufRead, BufReader},
    os::unix::net::UnixListener,
    path::PathBuf,
    process,
    sync::mpsc::{self, Sender},
    thread,
    time::{Duration, Instant},
};

use kiosk::{
    App, Gesture, GestureKind, Result,
    collaborator::CollaboratorSpec,
    geom::Expanse,
    testing::{CountingWriter, canvas_contains},
};
use kiosk_app::{AppConfig, build, screens};

/// The application plus the sending half of its gesture channel.
struct Rig {
    app: App,
    tx: Sender<Gesture>,
    out: CountingWriter,
}

impl Rig {
    fn new(cfg: &AppConfig) -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let mut app = build(cfg, rx, Expanse::new(80, 24))?;
        app.switch_screen(screens::MAIN, Instant::now())?;
        let mut r = Self {
            app,
            tx,
            out: CountingWriter::default(),
        };
        r.step()?;
        Ok(r)
    }

    /// One loop iteration, late enough that a dirty screen renders.
    fn step(&mut self) -> Result<()> {
        thread::sleep(Duration::from_millis(40));
        self.app.step(Instant::now(), &mut self.out)?;
        Ok(())
    }

    /// A gesture at the centre of a terminal cell.
    fn send(&mut self, kind: GestureKind, col: i32, row: i32) -> Result<()> {
        self.tx.send(Gesture::at(kind, col * 10 + 5, row * 20 + 10)).ok();
        self.step()
    }

    /// Press and lift on a cell.
    fn tap(&mut self, col: i32, row: i32) -> Result<()> {
        self.tx
            .send(Gesture::at(GestureKind::Press, col * 10 + 5, row * 20 + 10))
            .ok();
        self.send(GestureKind::Tap, col, row)
    }

    fn screen(&self) -> Option<&'static str> {
        self.app.current_name()
    }

    fn shows(&self, text: &str) -> bool {
        canvas_contains(self.app.canvas(), text)
    }
}

fn socket_path(tag: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!("touchkiosk-{}-{tag}.sock", process::id()));
    drop(std::fs::remove_file(&p));
    p
}

#[test]
fn menus_round_trip() -> Result<()> {
    let mut r = Rig::new(&AppConfig::default())?;
    assert!(r.shows("MAIN MENU"));
    assert!(r.shows("Settings"));

    r.tap(50, 8)?;
    assert_eq!(r.screen(), Some(screens::APPS));
    assert!(r.shows("APPLICATIONS"));
    assert!(r.shows("Video Player"));

    r.tap(38, 20)?;
    assert_eq!(r.screen(), Some(screens::MAIN));
    Ok(())
}

#[test]
fn swipe_does_not_press_buttons() -> Result<()> {
    let mut r = Rig::new(&AppConfig::default())?;
    r.tx.send(Gesture::at(GestureKind::Press, 505, 170)).ok();
    r.send(GestureKind::SwipeLeft, 10, 8)?;
    assert_eq!(r.screen(), Some(screens::MAIN));
    // The next tap elsewhere does not fire the button held earlier.
    r.tap(2, 2)?;
    assert_eq!(r.screen(), Some(screens::MAIN));
    Ok(())
}

#[test]
fn exit_button_quits() -> Result<()> {
    let mut r = Rig::new(&AppConfig::default())?;
    r.tap(40, 22)?;
    assert!(!r.app.is_running());
    Ok(())
}

#[test]
fn brightness_slider() -> Result<()> {
    let mut r = Rig::new(&AppConfig::default())?;
    r.tap(18, 8)?;
    assert_eq!(r.screen(), Some(screens::SETTINGS));
    assert!(r.shows("Brightness"));
    assert!(r.shows("50%"));
    r.tap(40, 8)?;
    assert!(r.shows("51%"));
    r.tap(38, 20)?;
    assert_eq!(r.screen(), Some(screens::MAIN));
    Ok(())
}

#[test]
fn touch_test_shows_gestures() -> Result<()> {
    let mut r = Rig::new(&AppConfig::default())?;
    r.tap(50, 14)?;
    assert_eq!(r.screen(), Some(screens::TESTING));
    r.send(GestureKind::DoubleTap, 40, 12)?;
    assert!(r.shows("Last: double_tap"));
    assert!(r.shows("Position: (405, 250)"));
    Ok(())
}

#[test]
fn launch_failure_shows_and_recovers() -> Result<()> {
    let mut cfg = AppConfig::default();
    cfg.collaborators.airplay = CollaboratorSpec::new("/nonexistent/uxplay", &[]);
    let mut r = Rig::new(&cfg)?;
    r.tap(50, 8)?;
    r.tap(50, 8)?;
    assert_eq!(r.screen(), Some(screens::AIRPLAY));
    assert!(r.shows("Status: Stopped"));

    r.tap(40, 8)?;
    assert!(r.shows("Failed to launch"));
    assert!(r.shows("Returning..."));
    // Touches are ignored while the error shows.
    r.tap(40, 20)?;
    assert_eq!(r.screen(), Some(screens::AIRPLAY));

    thread::sleep(Duration::from_millis(2100));
    r.step()?;
    assert!(r.shows("Start AirPlay"));
    assert!(!r.shows("Failed to launch"));
    Ok(())
}

#[test]
fn missing_video_device() -> Result<()> {
    let mut cfg = AppConfig::default();
    cfg.video_device = "/nonexistent/video9".into();
    cfg.collaborators.camera = CollaboratorSpec::new("sleep", &["30"]);
    let mut r = Rig::new(&cfg)?;
    r.tap(50, 8)?;
    r.tap(40, 14)?;
    assert_eq!(r.screen(), Some(screens::CAMERA));
    assert!(r.shows("Device: /nonexistent/video9"));
    r.tap(40, 8)?;
    assert!(r.shows("Video device /nonexistent/video9 not found"));
    Ok(())
}

#[test]
fn monitor_runs_until_double_tap() -> Result<()> {
    let mut cfg = AppConfig::default();
    cfg.collaborators.monitor = CollaboratorSpec::new("sleep", &["30"]);
    let mut r = Rig::new(&cfg)?;
    r.tap(18, 14)?;
    assert_eq!(r.screen(), Some(screens::MONITOR));
    // Ordinary taps go nowhere while the monitor runs.
    r.tap(40, 22)?;
    assert!(r.app.is_running());
    assert_eq!(r.screen(), Some(screens::MONITOR));

    let t = Instant::now();
    r.send(GestureKind::DoubleTap, 40, 12)?;
    assert_eq!(r.screen(), Some(screens::MAIN));
    assert!(t.elapsed() < Duration::from_secs(3));
    Ok(())
}

#[test]
fn player_is_steered_over_its_socket() -> Result<()> {
    let sock = socket_path("player");
    let listener = UnixListener::bind(&sock).map_err(kiosk::Error::device)?;
    let reader = thread::spawn(move || {
        let mut lines = vec![];
        for _ in 0..2 {
            let Ok((stream, _)) = listener.accept() else {
                break;
            };
            let mut line = String::new();
            if BufReader::new(stream).read_line(&mut line).is_ok() {
                lines.push(line);
            }
        }
        lines
    });

    let mut cfg = AppConfig::default();
    // The selected path is appended, so the stand-in ignores its arguments.
    cfg.collaborators.player = CollaboratorSpec::new("sh", &["-c", "sleep 30"]);
    cfg.player_socket = sock.clone();
    cfg.media = vec!["/srv/media/first.mp4".into(), "/srv/media/second.mp4".into()];
    let mut r = Rig::new(&cfg)?;
    r.tap(50, 8)?;
    r.tap(18, 8)?;
    assert_eq!(r.screen(), Some(screens::MEDIA));
    assert!(r.shows("first.mp4"));
    assert!(r.shows("Videos: 2"));

    r.tap(20, 9)?;
    assert!(r.shows("sh is running"));

    r.send(GestureKind::Tap, 40, 12)?;
    r.tx
        .send(Gesture {
            kind: GestureKind::SwipeRight,
            x: 600,
            y: 240,
            start_x: 200,
            start_y: 240,
        })
        .ok();
    r.step()?;

    let lines = reader.join().unwrap_or_default();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].trim(), r#"{"command":["cycle","pause"]}"#);
    assert_eq!(lines[1].trim(), r#"{"command":["seek",60.0,"relative"]}"#);
    drop(std::fs::remove_file(&sock));
    Ok(())
}
