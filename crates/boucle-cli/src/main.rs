mod log_surface;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use boucle_midi::backend_midir::MidirBackend;
use boucle_midi::config::{self, PadSettings};
use boucle_midi::device::MidiDeviceManager;
use boucle_midi::output::{MidiOutputHandle, MidiOutputManager};
use boucle_midi::PadProtocol;
use boucle_session::{CellCoord, Clip, LoopEngine, Song};
use boucle_sync::{BlinkScheduler, GridSynchronizer, ProgressPoller};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::log_surface::LogSurface;

const SAMPLE_RATE: u32 = 48_000;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .ok();

    let cli = Cli::parse();
    match cli.command {
        Commands::Ports => list_ports(),
        Commands::Settings(args) => show_settings(args),
        Commands::Run(args) => run(args),
    }
}

#[derive(Parser)]
#[command(author, version, about = "Clip grid runner with MIDI pad control")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List MIDI input and output ports.
    Ports,
    /// Print the stored pad settings.
    Settings(SettingsArgs),
    /// Run a demo song with the grid logged and the pad controller attached.
    Run(RunArgs),
}

#[derive(Args)]
struct SettingsArgs {
    /// Write the defaults back to disk, filling in missing fields.
    #[arg(long)]
    save: bool,
}

#[derive(Args)]
struct RunArgs {
    /// Grid width (rows).
    #[arg(long, default_value_t = 4)]
    width: usize,
    /// Grid height (columns).
    #[arg(long, default_value_t = 4)]
    height: usize,
    /// MIDI input port index. Overrides the stored settings.
    #[arg(long)]
    input: Option<usize>,
    /// MIDI output port index. Overrides the stored settings.
    #[arg(long)]
    output: Option<usize>,
    /// MIDI channel for pad feedback (0-15).
    #[arg(long)]
    channel: Option<u8>,
    /// Tempo used to place bar boundaries.
    #[arg(long, default_value_t = 120.0)]
    bpm: f32,
    /// Control loop period in milliseconds.
    #[arg(long, default_value_t = 10)]
    tick_ms: u64,
    /// Stop after this many seconds instead of running until killed.
    #[arg(long)]
    duration_secs: Option<u64>,
    /// Cells to toggle at startup, as `x,y`. May be repeated.
    #[arg(long = "press", value_parser = parse_coord)]
    presses: Vec<CellCoord>,
}

fn parse_coord(raw: &str) -> Result<CellCoord, String> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{raw}`"))?;
    let x = x.trim().parse().map_err(|err| format!("bad x: {err}"))?;
    let y = y.trim().parse().map_err(|err| format!("bad y: {err}"))?;
    Ok((x, y))
}

fn list_ports() -> Result<()> {
    let inputs = MidiDeviceManager::new(MidirBackend::default()).list_ports()?;
    let outputs = MidiOutputManager::new()?.enumerate();
    print_ports("inputs", &inputs);
    print_ports("outputs", &outputs);
    Ok(())
}

fn print_ports(label: &str, names: &[String]) {
    if names.is_empty() {
        println!("No MIDI {label} reported by the system.");
        return;
    }
    println!("MIDI {label}:");
    for (index, name) in names.iter().enumerate() {
        println!("  [{index}] {name}");
    }
}

fn show_settings(args: SettingsArgs) -> Result<()> {
    let settings = config::load();
    println!("{}", serde_json::to_string_pretty(&settings)?);
    if args.save {
        config::save(&settings);
    }
    Ok(())
}

fn demo_song(width: usize, height: usize, bar_frames: u64) -> Result<(Song, LoopEngine)> {
    if width == 0 || height == 0 {
        bail!("grid must be at least 1x1, got {width}x{height}");
    }
    let (mut song, commands) = Song::new(width, height);
    for x in 0..width {
        for y in 0..height {
            let bars = 1 + ((x + y) % 4) as u64;
            song.add_clip(Clip::new(format!("loop {x}:{y}"), x, y, bars * bar_frames))?;
        }
    }
    Ok((song, LoopEngine::new(commands, bar_frames)))
}

fn resolve_settings(args: &RunArgs) -> Result<PadSettings> {
    let mut settings = config::load();
    if args.input.is_some() {
        settings.input_port = args.input;
    }
    if args.output.is_some() {
        settings.output_port = args.output;
    }
    if let Some(channel) = args.channel {
        settings.channel = channel;
    }
    settings.validate()?;
    Ok(settings)
}

fn open_output(port: Option<usize>) -> Result<Option<MidiOutputHandle>> {
    let Some(port) = port else {
        return Ok(None);
    };
    let handle = MidiOutputManager::new()?
        .open_port(port)
        .with_context(|| format!("failed to open MIDI output {port}"))?;
    info!(name = handle.name(), "pad output connected");
    Ok(Some(handle))
}

fn spawn_engine(
    song: Arc<Song>,
    mut engine: LoopEngine,
    tick: Duration,
    running: Arc<AtomicBool>,
) -> Result<thread::JoinHandle<()>> {
    let frames_per_tick = (SAMPLE_RATE as u64 * tick.as_millis() as u64 / 1_000).max(1);
    thread::Builder::new()
        .name("boucle-engine".into())
        .spawn(move || {
            while running.load(Ordering::Relaxed) {
                engine.process_commands(&song);
                engine.advance(&song, frames_per_tick);
                thread::sleep(tick);
            }
            debug!(position = engine.position(), "engine stopped");
        })
        .context("failed to spawn engine thread")
}

fn run(args: RunArgs) -> Result<()> {
    let settings = resolve_settings(&args)?;
    let tick = Duration::from_millis(args.tick_ms.max(1));
    let bar_frames = LoopEngine::bar_frames_for(SAMPLE_RATE, args.bpm);
    let (song, engine) = demo_song(args.width, args.height, bar_frames)?;
    let song = Arc::new(song);
    info!(
        width = song.width(),
        height = song.height(),
        bar_frames,
        "demo song loaded"
    );

    for &(x, y) in &args.presses {
        if let Err(err) = song.toggle(x, y) {
            warn!(%err, "startup press ignored");
        }
    }

    let (frames_tx, frames_rx) = crossbeam_channel::unbounded();
    let mut devices = MidiDeviceManager::new(MidirBackend::default());
    if let Some(port) = settings.input_port {
        devices
            .ensure_connection(port, frames_tx)
            .with_context(|| format!("failed to open MIDI input {port}"))?;
    }
    let mut output = open_output(settings.output_port)?;

    let running = Arc::new(AtomicBool::new(true));
    let engine_thread = spawn_engine(Arc::clone(&song), engine, tick, Arc::clone(&running))?;

    let mut surface = LogSurface::new();
    let mut grid = GridSynchronizer::for_song(&song, BlinkScheduler::new(settings.blink_period()));
    let mut poller = ProgressPoller::new(settings.progress_period());
    let mut pad = PadProtocol::new(settings.palette);

    let started = Instant::now();
    let deadline = args.duration_secs.map(Duration::from_secs);
    let mut last = started;
    loop {
        if deadline.is_some_and(|limit| started.elapsed() >= limit) {
            break;
        }

        let toggles = pad.process_note(&song, frames_rx.try_iter());
        if toggles > 0 {
            debug!(toggles, "pad presses queued");
        }

        grid.synchronize(&song, &mut surface);
        let messages = pad.update_pad(&song);
        if let Some(handle) = output.as_mut() {
            if let Err(err) = handle.send_pad_messages(&messages, settings.channel) {
                warn!(?err, "pad update failed");
            }
        }

        let now = Instant::now();
        let elapsed = now - last;
        last = now;
        grid.advance_blink(elapsed, &mut surface);
        poller.advance(elapsed, &song, &mut surface);

        thread::sleep(tick);
    }

    running.store(false, Ordering::Relaxed);
    if engine_thread.join().is_err() {
        warn!("engine thread panicked");
    }
    devices.close_all();
    info!(updates = surface.updates(), "run finished");
    Ok(())
}
