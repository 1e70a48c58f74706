//! Headless demo: runs an autoplay round over a built-in chart and prints
//! the round summary as JSON.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use lanefall::audio::{AudioSession, ManualTrack};
use lanefall::chart::{BuiltinCharts, ChartProvider, DEMO_TRACK, NoteKind};
use lanefall::config::EngineConfig;
use lanefall::engine::{FramePacer, GameEngine, Layout, RoundPhase};

#[derive(Parser)]
#[command(name = "lanefall", about = "Headless autoplay demo round")]
struct Args {
    /// Track id to play.
    #[arg(long, default_value = DEMO_TRACK)]
    track: String,
    /// Show debug logs.
    #[arg(long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    lanefall::util::logging::init_logging(None, args.verbose)?;

    let config = EngineConfig::load();
    let mut pacer = FramePacer::new(config.target_fps);
    let chart = BuiltinCharts::new().chart(&args.track);
    info!(track = args.track, notes = chart.len(), "chart loaded");

    let mut session = AudioSession::new();
    session.connect();
    let latency_ms = session.calibrate();

    // The round itself runs on a manual track so the demo works with no
    // audio device at all; the session is only used for calibration.
    let driver = ManualTrack::new();
    let layout = Layout::new(720.0, 1080.0)?;
    let mut engine = GameEngine::new(layout, config, Box::new(driver.clone()))?;
    engine.set_judgment_sink(|event| info!(?event, "judgment"));
    engine.bind_chart(&chart, latency_ms);

    // Autoplay script: press each note at its latency-adjusted timing and
    // release long notes at their end.
    let mut script: Vec<(f64, usize, bool)> = Vec::new();
    for note in chart.notes() {
        let timing = note.timing_ms + latency_ms;
        script.push((timing, note.lane, true));
        if note.kind == NoteKind::Long {
            script.push((timing + note.duration_ms, note.lane, false));
        }
    }
    script.sort_by(|a, b| a.0.total_cmp(&b.0));

    // The manual track "ends" one second after the last note.
    let track_end_ms = chart.last_end_ms().unwrap_or(0.0) + latency_ms + 1000.0;

    engine.start()?;
    let mut next = 0;
    while engine.phase() == RoundPhase::Running {
        driver.advance_ms(5.0);
        let now = engine.now_ms();
        while next < script.len() && script[next].0 <= now {
            let (_, lane, press) = script[next];
            if press {
                engine.press_lane(lane);
            } else {
                engine.release_lane(lane);
            }
            next += 1;
        }
        if now > track_end_ms {
            driver.finish();
        }
        if pacer.should_run(now) {
            engine.frame();
        }
    }

    println!("{}", serde_json::to_string_pretty(&engine.summary())?);
    Ok(())
}
