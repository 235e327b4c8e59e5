//! glyph_preview: print the sampled ink grid for a string.

use clap::Parser;
use glyph_field::{Canvas, RasterConfig};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Show which canvas samples become particle targets.
#[derive(Parser, Debug)]
#[command(name = "glyph_preview", version, about)]
struct Cli {
    /// Text to rasterize
    text: String,

    /// Glyph cell height in pixels
    #[arg(long, default_value_t = 100)]
    font_size: u32,

    /// Sampling stride in pixels
    #[arg(long, default_value_t = 4)]
    stride: usize,

    /// Logging verbosity level
    #[arg(short, long, default_value = "warn")]
    log_level: Level,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cfg = RasterConfig {
        font_size: cli.font_size,
        stride:    cli.stride.max(1),
        ..RasterConfig::default()
    };

    let mut canvas = Canvas::new(cfg.width, cfg.height);
    canvas.fill_text(&cli.text, &cfg);
    info!(text = %cli.text, scale = cfg.cell_scale(), "canvas filled");

    let mut rows: Vec<String> = Vec::new();
    for y in (0..cfg.height).step_by(cfg.stride) {
        let row: String = (0..cfg.width).step_by(cfg.stride)
            .map(|x| if canvas.luminance(x, y) > cfg.threshold { '#' } else { ' ' })
            .collect();
        if row.contains('#') {
            rows.push(row.trim_end().to_string());
        }
    }

    // Drop the common left margin so the art fits a terminal.
    let margin = rows.iter()
        .map(|r| r.len() - r.trim_start().len())
        .min()
        .unwrap_or(0);
    for r in &rows {
        println!("{}", &r[margin..]);
    }

    let points = canvas.sample(&cfg);
    println!();
    println!("  {} points  (stride {}, threshold {})", points.len(), cfg.stride, cfg.threshold);
    Ok(())
}
