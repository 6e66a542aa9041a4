use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};

use dutyscope::{
    load_timeline, logging, BrightnessController, DutyEngine, DutyStrategy, Frame, Playback,
    PlaybackConfig,
};

/// Replay a decoded bus trace and print per-bit duty cycle as LED brightness.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// YAML or JSON playback config; defaults apply when omitted.
    #[clap(short, long)]
    config: Option<PathBuf>,
    /// Decoded trace dump (overrides the config).
    #[clap(short, long)]
    source: Option<PathBuf>,
    /// Signal to replay (overrides the config).
    #[clap(long)]
    signal: Option<String>,
    #[clap(long)]
    fps: Option<u32>,
    #[clap(long)]
    speed: Option<f64>,
    #[clap(long, value_enum)]
    strategy: Option<StrategyArg>,
    /// Stop after this many frames instead of at the end of the trace.
    #[clap(long)]
    frames: Option<u64>,
    /// Evaluate on the render thread instead of a worker.
    #[clap(long)]
    blocking: bool,
    /// Render as fast as possible instead of pacing frames at `fps`.
    #[clap(long)]
    no_pace: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    LinearScan,
    BinarySearch,
}

impl From<StrategyArg> for DutyStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::LinearScan => DutyStrategy::LinearScan,
            StrategyArg::BinarySearch => DutyStrategy::BinarySearch,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init("info")?;

    let mut config = match &args.config {
        Some(path) => PlaybackConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PlaybackConfig::default(),
    };
    if let Some(source) = args.source {
        config.source = source;
    }
    if let Some(signal) = args.signal {
        config.signal = signal;
    }
    if let Some(fps) = args.fps {
        config.fps = fps;
    }
    if let Some(speed) = args.speed {
        config.speed = speed;
    }
    if let Some(strategy) = args.strategy {
        config.strategy = strategy.into();
    }
    config.validate()?;

    let timeline = load_timeline(&config)
        .with_context(|| format!("loading trace {}", config.source.display()))?;
    println!("Total Time: {} ps", timeline.end_time());

    let mut playback = Playback::new(&config, timeline.end_time());
    let engine = DutyEngine::new(Arc::new(timeline), config.strategy);
    let controller = BrightnessController::new(engine.clone());

    playback.play();
    let mut rendered = 0u64;
    while args.frames.map_or(true, |max| rendered < max) {
        let frame = if args.blocking {
            playback.tick_blocking(&engine)
        } else {
            playback.tick(&controller)
        };
        let Some(frame) = frame else {
            break;
        };
        println!("{}", render_line(&frame));
        rendered += 1;
        if !args.no_pace {
            std::thread::sleep(playback.frame_interval());
        }
    }
    tracing::info!(rendered, completed = controller.completed(), "playback finished");
    Ok(())
}

fn render_line(frame: &Frame) -> String {
    let mut line = frame.elapsed_label.clone();
    for (i, led) in frame.leds.iter().enumerate() {
        line.push_str(&format!(" | LED {i} {}", led.label));
    }
    line
}
