// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{debug, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::watch;

use lyricsync::app_config::{Config, LogLevel};
use lyricsync::cue_parser::format_timestamp;
use lyricsync::presentation::{wait_for_cues, CueWait, PlaybackSource, PresentationAdapter};
use lyricsync::simulation::{ConsoleRenderer, SimulatedPlayer};
use lyricsync::sync::LineSet;
use lyricsync::vtt_processor::VttTrack;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

/// A scheduled seek: once the clock reaches `at`, jump to `to`
#[derive(Debug, Clone, Copy)]
struct ScheduledSeek {
    at: f64,
    to: f64,
}

fn parse_scheduled_seek(value: &str) -> Result<ScheduledSeek, String> {
    let (at, to) = value
        .split_once('=')
        .ok_or_else(|| format!("expected AT=TARGET, got '{}'", value))?;
    let at: f64 = at.trim().parse().map_err(|_| format!("invalid time '{}'", at))?;
    let to: f64 = to.trim().parse().map_err(|_| format!("invalid time '{}'", to))?;
    Ok(ScheduledSeek { at, to })
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Simulate playback over a caption file and print every display update
    Play(PlayArgs),

    /// Print the parsed lines of a caption file
    Dump {
        /// WebVTT caption file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions for lyricsync
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct PlayArgs {
    /// WebVTT caption file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Playback speed multiplier for the simulated clock
    #[arg(long, default_value_t = 1.0)]
    speed: f64,

    /// Clock tick interval in milliseconds
    #[arg(long, default_value_t = 250)]
    tick_ms: u64,

    /// Seek when the clock reaches AT to TARGET seconds (repeatable)
    #[arg(long = "seek", value_name = "AT=TARGET", value_parser = parse_scheduled_seek)]
    seeks: Vec<ScheduledSeek>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// lyricsync - karaoke lyrics synchronized to a playback clock
#[derive(Parser, Debug)]
#[command(name = "lyricsync")]
#[command(version = "0.1.0")]
#[command(about = "Word-highlighted lyrics synchronized to playback")]
#[command(long_about = "lyricsync reveals and highlights karaoke-style WebVTT lyrics in step with a playback clock.

EXAMPLES:
    lyricsync play song.vtt                       # Simulate playback in real time
    lyricsync play --speed 4 song.vtt             # Four times faster
    lyricsync play --seek 12=40 song.vtt          # At 12s, jump to 40s
    lyricsync dump --json song.vtt                # Show parsed lines
    lyricsync completions bash > lyricsync.bash   # Generate bash completions")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Colorized stderr logger
struct ConsoleLogger {
    level: LevelFilter,
}

impl ConsoleLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(ConsoleLogger { level: LevelFilter::Trace }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "{}{} {} {}\x1B[0m",
                color, now, tag, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the config says otherwise
    ConsoleLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "lyricsync", &mut std::io::stdout());
            Ok(())
        }
        Commands::Dump { input, json } => run_dump(&input, json),
        Commands::Play(args) => run_play(args).await,
    }
}

/// Load the config file, creating it with defaults when missing
fn load_config(config_path: &str) -> Result<Config> {
    if !Path::new(config_path).exists() {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let config = Config::default();
        config
            .to_file(config_path)
            .with_context(|| format!("Failed to write default config to {}", config_path))?;
        return Ok(config);
    }

    Config::from_file(config_path)
        .with_context(|| format!("Failed to load config from {}", config_path))
}

fn run_dump(input: &Path, json: bool) -> Result<()> {
    let track = VttTrack::load(input)
        .with_context(|| format!("Failed to read captions from {}", input.display()))?;
    let lines = LineSet::from_cues(&track.cues);

    if json {
        println!("{}", serde_json::to_string_pretty(lines.as_slice())?);
        return Ok(());
    }

    for line in lines.iter() {
        println!(
            "{:>3} [{} --> {}] {}",
            line.index,
            format_timestamp(line.start),
            format_timestamp(line.end),
            line.text()
        );
        if line.has_word_timing() {
            for word in &line.words {
                println!("      {} {}", format_timestamp(word.time), word.text);
            }
        }
    }
    info!("{} lines from {} cues", lines.len(), track.cues.len());
    Ok(())
}

async fn run_play(args: PlayArgs) -> Result<()> {
    let mut config = load_config(&args.config_path)?;
    if let Some(level) = args.log_level {
        config.log_level = level.into();
    }
    log::set_max_level(config.log_level.to_level_filter());

    if !(args.speed.is_finite() && args.speed > 0.0) {
        return Err(anyhow!("Speed must be a positive number, got {}", args.speed));
    }
    if args.tick_ms == 0 {
        return Err(anyhow!("Tick interval must be greater than zero"));
    }

    let track = VttTrack::load(&args.input)
        .with_context(|| format!("Failed to read captions from {}", args.input.display()))?;
    let duration = track.cues.iter().map(|cue| cue.end).fold(0.0, f64::max) + 1.0;
    debug!("Simulated media duration: {}", format_timestamp(duration));

    let mut player = SimulatedPlayer::new(duration);
    let mut adapter = PresentationAdapter::new(ConsoleRenderer::new(), config.clone());
    adapter.start_session();

    let (cancel_tx, mut cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        let _ = cancel_tx.send(true);
    });

    match wait_for_cues(&track, &config.polling, cancel_rx.clone()).await {
        CueWait::Ready(cues) => {
            adapter.load_cues(&cues, &player);
        }
        CueWait::GaveUp => {
            adapter.give_up();
            return Ok(());
        }
        CueWait::Cancelled => return Ok(()),
    }

    let mut seeks = args.seeks.clone();
    seeks.sort_by(|a, b| a.at.total_cmp(&b.at));
    let mut seeks = seeks.into_iter().peekable();

    let step = args.tick_ms as f64 / 1000.0 * args.speed;
    let mut interval = tokio::time::interval(Duration::from_millis(args.tick_ms));
    player.play();

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = cancel_rx.changed() => {
                info!("Interrupted at {}", format_timestamp(player.current_time()));
                break;
            }
        }

        let running = player.advance(step);
        while let Some(seek) = seeks.next_if(|s| player.current_time() >= s.at) {
            info!("Seeking from {} to {}", format_timestamp(player.current_time()), format_timestamp(seek.to));
            adapter.seek_to(&mut player, seek.to);
        }
        adapter.on_time_update(&player);

        if !running {
            break;
        }
    }

    adapter.flush();
    info!(
        "Playback stopped at {} after {} display updates",
        format_timestamp(player.current_time()),
        adapter.renderer().operations()
    );
    Ok(())
}
