//! gesture_particles: entry point.

use clap::Parser;
use gesture_particles::app::{run, AppConfig};
use gesture_particles::state::parse_word;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

const BANNER: [&str; 3] = [
    "╔══════════════════════════════════════════════════════════════╗",
    "║        Gesture Particles — hand-driven particle text         ║",
    "╚══════════════════════════════════════════════════════════════╝",
];

/// Particle text controlled by hand gestures.
#[derive(Parser, Debug)]
#[command(name = "gesture_particles", version, about)]
struct Cli {
    /// Number of particles
    #[arg(long, default_value_t = 8000)]
    particles: usize,

    /// Text shown before the first gesture
    #[arg(long, default_value = "HELLO")]
    text: String,

    /// Bind a finger count to a word, e.g. --word 4=RUST (repeatable)
    #[arg(long = "word", value_parser = parse_word)]
    words: Vec<(u8, String)>,

    /// Window width in pixels
    #[arg(long, default_value_t = 1024)]
    width: usize,

    /// Window height in pixels
    #[arg(long, default_value_t = 640)]
    height: usize,

    /// Disable MIDI cues
    #[arg(long)]
    mute: bool,

    /// Fixed seed for particle scatter and colors
    #[arg(long)]
    seed: Option<u64>,

    /// Logging verbosity level
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    println!();
    for line in BANNER {
        println!("{}", line);
    }
    println!();

    #[cfg(feature = "leap")]
    println!("  Mode: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    println!("  Mode: Keyboard simulation  (use --features leap for hardware)");
    println!();

    let mut cfg = AppConfig {
        initial_text: cli.text,
        width:        cli.width,
        height:       cli.height,
        muted:        cli.mute,
        seed:         cli.seed,
        ..AppConfig::default()
    };
    cfg.field.particle_count = cli.particles;
    for (count, word) in cli.words {
        cfg.words.set(count, word);
    }

    for (count, word) in cfg.words.iter() {
        println!("  {} finger{}  →  {}", count, if count == 1 { "" } else { "s" }, word);
    }
    println!();

    info!(particles = cfg.field.particle_count, "opening window");
    run(cfg)?;
    Ok(())
}
