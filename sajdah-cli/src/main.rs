//! sajdah - contador de rakats
//! Command-line interface for replaying and simulating prayer sessions

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use colored::*;
use serde::Serialize;
use sajdah_cli::{generate, read_script, replay, to_jsonl, ReplaySummary, ScriptLine, SimChannel, SimulationConfig};
use sajdah_counter::{CounterEvent, FeedbackKind, SAJDAHS_PER_RAKAT};
use sajdah_session::{MotionPreset, SajdahPipeline, Settings};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sajdah")]
#[command(author = "Silvano Neto <dev@silvanoneto.com>")]
#[command(version = "2026.1.16")]
#[command(about = "Sajdah/rakat counter - replay and simulate prayer sessions", long_about = None)]
struct Cli {
    #[command(flatten)]
    settings: SettingsArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Overrides applied on top of the configuration file
#[derive(Args)]
struct SettingsArgs {
    /// Configuration file (sajdah.toml)
    #[arg(long, global = true, env = "SAJDAH_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Motion threshold preset (sensitive, firm)
    #[arg(long, global = true, value_name = "PRESET")]
    preset: Option<MotionPreset>,

    /// Minimum rise over the rolling baseline (m/s²)
    #[arg(long, global = true, allow_negative_numbers = true)]
    delta_threshold: Option<f64>,

    /// Minimum total acceleration magnitude (m/s²)
    #[arg(long, global = true, allow_negative_numbers = true)]
    absolute_threshold: Option<f64>,

    /// Microphone level threshold (dBFS)
    #[arg(long, global = true, allow_negative_numbers = true)]
    volume_threshold: Option<f64>,

    /// Debounce window (ms)
    #[arg(long, global = true, env = "SAJDAH_COOLDOWN_MS")]
    cooldown_ms: Option<u64>,

    /// Samples in the rolling baseline
    #[arg(long, global = true)]
    buffer_size: Option<usize>,

    /// Ignore motion samples
    #[arg(long, global = true)]
    no_motion: bool,

    /// Ignore microphone samples
    #[arg(long, global = true)]
    no_audio: bool,

    /// Require audio peaks to rise above the ambient noise floor
    #[arg(long, global = true)]
    ambient_tracking: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON-lines sample script
    Replay {
        /// Script file (.jsonl)
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,

        /// Print notifications as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Generate a synthetic prayer and replay it
    Simulate {
        /// Number of rakats to perform
        #[arg(short, long, default_value_t = 4)]
        rakats: u32,

        /// Channel that observes the thumps
        #[arg(short, long, value_enum, default_value_t = SimChannel::Motion)]
        channel: SimChannel,

        /// Accelerometer noise amplitude (g); microphone jitter is 100x in dB
        #[arg(long, default_value_t = 0.01)]
        noise: f64,

        /// Sensor sample rate (Hz)
        #[arg(long, default_value_t = 50)]
        rate: u32,

        /// Random seed
        #[arg(long, default_value_t = 7)]
        seed: u64,

        /// Also write the generated script to a file
        #[arg(long, value_name = "FILE")]
        dump: Option<PathBuf>,

        /// Print notifications as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = cli.settings.resolve().and_then(|settings| match cli.command {
        Commands::Replay { script, json } => replay_command(settings, &script, json),
        Commands::Simulate {
            rakats,
            channel,
            noise,
            rate,
            seed,
            dump,
            json,
        } => {
            let sim = SimulationConfig {
                rakats,
                channel,
                noise,
                sample_rate_hz: rate,
                seed,
                ..SimulationConfig::default()
            };
            simulate_command(settings, &sim, dump.as_deref(), json)
        }
        Commands::Config => config_command(&settings),
    });

    if let Err(e) = result {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Logs go to stderr so `--json` output stays clean
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sajdah=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

impl SettingsArgs {
    fn resolve(&self) -> anyhow::Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::from_file(path)
                .with_context(|| format!("loading configuration from {}", path.display()))?,
            None => Settings::default(),
        };

        if let Some(preset) = self.preset {
            settings.motion_preset = preset;
        }
        if let Some(delta) = self.delta_threshold {
            settings.delta_threshold = Some(delta);
        }
        if let Some(absolute) = self.absolute_threshold {
            settings.absolute_threshold = Some(absolute);
        }
        if let Some(volume) = self.volume_threshold {
            settings.volume_threshold = volume;
        }
        if let Some(cooldown) = self.cooldown_ms {
            settings.cooldown_ms = cooldown;
        }
        if let Some(size) = self.buffer_size {
            settings.buffer_size = size;
        }
        if self.no_motion {
            settings.motion_enabled = false;
        }
        if self.no_audio {
            settings.audio_enabled = false;
        }
        if self.ambient_tracking {
            settings.ambient_tracking = true;
        }

        settings.validate()?;
        Ok(settings)
    }
}

// ============================================================================
// Commands
// ============================================================================

fn replay_command(settings: Settings, script: &Path, json: bool) -> anyhow::Result<()> {
    let lines = read_script(script).with_context(|| format!("reading {}", script.display()))?;

    if !json {
        println!(
            "{} {} ({} records)",
            "Replaying".green().bold(),
            script.display().to_string().cyan(),
            lines.len()
        );
    }

    run_and_report(settings, &lines, json)
}

fn simulate_command(settings: Settings, sim: &SimulationConfig, dump: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let lines = generate(sim)?;

    if let Some(path) = dump {
        fs::write(path, to_jsonl(&lines)?).with_context(|| format!("writing {}", path.display()))?;
        if !json {
            println!("{} {}", "   Wrote".green().bold(), path.display().to_string().cyan());
        }
    }

    if !json {
        println!(
            "{} {} rakats on {:?} channel ({} records)",
            "Simulating".green().bold(),
            sim.rakats,
            sim.channel,
            lines.len()
        );
    }

    run_and_report(settings, &lines, json)
}

fn config_command(settings: &Settings) -> anyhow::Result<()> {
    print!("{}", settings.effective().to_toml_string()?);
    Ok(())
}

fn run_and_report(settings: Settings, lines: &[ScriptLine], json: bool) -> anyhow::Result<()> {
    let mut pipeline = SajdahPipeline::with_settings(settings, Default::default())?;
    let mut output_error = None;

    let summary = replay(&mut pipeline, lines, |event| {
        if output_error.is_some() {
            return;
        }
        if let Err(e) = print_event(event, json) {
            output_error = Some(e);
        }
    })?;

    if let Some(e) = output_error {
        return Err(e);
    }

    print_summary(&summary, json)
}

// ============================================================================
// Output
// ============================================================================

#[derive(Serialize)]
struct Notification<'a> {
    #[serde(flatten)]
    event: &'a CounterEvent,
    feedback: FeedbackKind,
}

/// Pontos de progresso: `●○`, `●●`
fn dots(progress: u8) -> String {
    let lit = progress.min(SAJDAHS_PER_RAKAT) as usize;
    format!("{}{}", "●".repeat(lit), "○".repeat(SAJDAHS_PER_RAKAT as usize - lit))
}

fn print_event(event: &CounterEvent, json: bool) -> anyhow::Result<()> {
    if json {
        let line = serde_json::to_string(&Notification {
            event,
            feedback: event.feedback(),
        })?;
        println!("{}", line);
        return Ok(());
    }

    match *event {
        CounterEvent::SajdahProgress { value, timestamp } => {
            println!("{:>9} ms  {} sajdah {}/{}", timestamp, dots(value).cyan(), value, SAJDAHS_PER_RAKAT);
        }
        CounterEvent::RakatComplete { count, timestamp } => {
            println!(
                "{:>9} ms  {} {}",
                timestamp,
                "✔ rakat".green().bold(),
                count.to_string().green().bold()
            );
        }
        CounterEvent::Reset => {
            println!("{:>12}  {}", "", "reset".yellow().bold());
        }
    }
    Ok(())
}

fn print_summary(summary: &ReplaySummary, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(&serde_json::json!({ "summary": summary }))?);
        return Ok(());
    }

    let snap = &summary.snapshot;
    println!();
    println!("{} {}", "   Rakats".green().bold(), snap.rakat_count.to_string().bold());
    println!("{} {}", " Progress".green().bold(), dots(snap.display_progress));
    println!(
        "{} {} accepted, {} debounced",
        "  Sajdahs".green().bold(),
        snap.accepted_events,
        snap.debounced_events
    );
    Ok(())
}
