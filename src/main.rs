use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use posture_guard::config::Config;
use posture_guard::pose::{JsonLinesSource, LandmarkSource};
use posture_guard::posture::PostureSession;

/// Sitting-posture monitor driven by a stream of pose landmarks
///
/// Reads one JSON landmark record per line and writes one JSON report per
/// frame to stdout. Logs go to stderr.
#[derive(Parser, Debug)]
#[command(name = "posture-guard")]
#[command(version = env!("POSTURE_GUARD_VERSION"))]
struct Args {
    /// TOML config file (defaults are used when it does not exist)
    #[arg(short, long, default_value = "config.toml", env = "POSTURE_GUARD_CONFIG")]
    config: PathBuf,

    /// JSON-lines landmark file; stdin when omitted
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Frames collected before classification starts
    #[arg(long, env = "CALIBRATION_FRAMES")]
    calibration_frames: Option<usize>,

    /// Half-width of the shoulder envelope in degrees
    #[arg(long, env = "SHOULDER_RANGE", allow_negative_numbers = true)]
    shoulder_range: Option<f32>,

    /// Half-width of the neck envelope in degrees
    #[arg(long, env = "NECK_RANGE", allow_negative_numbers = true)]
    neck_range: Option<f32>,

    /// Minimum seconds between two alerts
    #[arg(long, env = "ALERT_COOLDOWN", allow_negative_numbers = true)]
    alert_cooldown: Option<f64>,
}

impl Args {
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(frames) = self.calibration_frames {
            config.calibration.frames = frames;
        }
        if let Some(range) = self.shoulder_range {
            config.calibration.shoulder_range = range;
        }
        if let Some(range) = self.neck_range {
            config.calibration.neck_range = range;
        }
        if let Some(cooldown) = self.alert_cooldown {
            config.alert.cooldown_secs = cooldown;
        }
    }
}

#[derive(Default)]
struct RunStats {
    frames: u64,
    skipped: u64,
    alerts: u64,
}

fn run<S: LandmarkSource, W: Write>(
    session: &mut PostureSession,
    source: &mut S,
    out: &mut W,
) -> Result<RunStats> {
    let mut stats = RunStats::default();

    while let Some(frame) = source.next_frame()? {
        let report = session.process(&frame)?;

        stats.frames += 1;
        if report.skipped.is_some() {
            stats.skipped += 1;
        }
        if report.alert.is_some() {
            stats.alerts += 1;
        }

        serde_json::to_writer(&mut *out, &report)?;
        writeln!(out)?;
    }

    out.flush()?;
    Ok(stats)
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "posture_guard=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();

    let mut config = Config::load_or_default(&args.config)
        .with_context(|| format!("Failed to load config {}", args.config.display()))?;
    args.apply_overrides(&mut config);

    let mut session = PostureSession::new(&config).context("Invalid configuration")?;

    info!("Posture Guard {}", env!("POSTURE_GUARD_VERSION"));
    info!(
        "Calibration: {} frames, shoulder ±{}°, neck ±{}°",
        config.calibration.frames, config.calibration.shoulder_range, config.calibration.neck_range
    );
    info!("Alert cooldown: {}s", config.alert.cooldown_secs);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let stats = match &args.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open input {}", path.display()))?;
            info!("Reading landmarks from {}", path.display());
            let mut source = JsonLinesSource::new(BufReader::new(file), &config.input);
            run(&mut session, &mut source, &mut out)?
        }
        None => {
            info!("Reading landmarks from stdin");
            let mut source = JsonLinesSource::new(io::stdin().lock(), &config.input);
            run(&mut session, &mut source, &mut out)?
        }
    };

    info!(
        "Done: {} frames, {} skipped, {} alerts",
        stats.frames, stats.skipped, stats.alerts
    );
    Ok(())
}
