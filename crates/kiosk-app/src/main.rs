//! touchkiosk: a touch-driven menu for a small display, handing off to media
//! players, mirroring receivers and monitors.

use std::{
    fs::File,
    path::{Path, PathBuf},
    process,
    sync::{Mutex, mpsc},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use kiosk::{
    Animation,
    geom::Expanse,
    gesture::Classifier,
    input::{
        InputThread,
        evdev::{EvdevSource, list_devices, name_matches},
    },
};
use kiosk_app::{AppConfig, build, screens, splash::Splash};
use tracing::{Level, error, info};
use tracing_subscriber::fmt;

/// CLI flags.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// JSON config file. Defaults apply to anything it leaves out.
    #[clap(long)]
    config: Option<PathBuf>,

    /// Touch device node, skipping discovery by name.
    #[clap(long)]
    device: Option<PathBuf>,

    /// Log file. The terminal is the display, so logs never go there.
    #[clap(long, default_value = "/tmp/touchkiosk.log")]
    log: PathBuf,

    /// Log level: error, warn, info, debug or trace.
    #[clap(long, default_value = "info")]
    log_level: Level,

    /// Skip the startup animation.
    #[clap(long)]
    no_splash: bool,

    /// List input devices and exit.
    #[clap(long)]
    list_devices: bool,

    /// Print the effective config as JSON and exit.
    #[clap(long)]
    print_config: bool,
}

/// Send all tracing output to a file.
fn init_logging(path: &Path, level: Level) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating log {}", path.display()))?;
    let format = fmt::format()
        .with_level(true)
        .with_line_number(true)
        .with_ansi(false)
        .without_time()
        .compact();
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_max_level(level)
        .event_format(format)
        .init();
    Ok(())
}

/// Print a table of input devices, highlighting those that match the
/// configured touch controller names.
fn print_devices(patterns: &[String]) {
    let devs = list_devices();
    if devs.is_empty() {
        println!("No input devices visible. Is this process in the input group?");
        return;
    }
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Device", "Name", "Touch match"]);
    for d in devs {
        let hit = name_matches(&d.name, patterns);
        table.add_row(vec![
            Cell::new(d.path.display()),
            Cell::new(&d.name),
            if hit {
                Cell::new("yes").fg(Color::Green)
            } else {
                Cell::new("")
            },
        ]);
    }
    println!("{table}");
}

/// Open the configured touch device.
fn open_device(args: &Args, cfg: &AppConfig) -> kiosk::Result<EvdevSource> {
    match &args.device {
        Some(p) => EvdevSource::open(p),
        None => EvdevSource::find(&cfg.core.input.device_names),
    }
}

/// Run the kiosk.
fn main() -> Result<()> {
    let args = Args::parse();
    let cfg = match &args.config {
        Some(p) => AppConfig::load(p).with_context(|| format!("loading {}", p.display()))?,
        None => AppConfig::default(),
    };
    if args.print_config {
        println!("{}", cfg.to_json()?);
        return Ok(());
    }
    let patterns = &cfg.core.input.device_names;
    if args.list_devices {
        print_devices(patterns);
        return Ok(());
    }

    init_logging(&args.log, args.log_level)?;
    let source = match open_device(&args, &cfg) {
        Ok(s) => s,
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}\n");
            print_devices(patterns);
            process::exit(1);
        }
    };
    info!(
        device = %source.path().display(),
        name = source.name(),
        "starting touchkiosk"
    );

    let (tx, rx) = mpsc::channel();
    let classifier = Classifier::new(cfg.core.gesture.clone(), cfg.core.sensor.space()?);
    let input = InputThread::spawn(
        source,
        classifier,
        tx,
        Duration::from_millis(cfg.core.input.poll_timeout_ms.into()),
    )?;

    let mut app = build(&cfg, rx, Expanse::new(80, 24))?;
    let mut splash = Splash::new();
    let anim: Option<&mut dyn Animation> = if args.no_splash {
        None
    } else {
        Some(&mut splash)
    };
    let ret = app.run(screens::MAIN, anim);
    if let Err(e) = input.join() {
        error!("input thread: {e}");
    }
    ret?;
    info!("exiting");
    println!("Goodbye!");
    Ok(())
}
