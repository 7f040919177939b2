//! Pegfall level preview
//!
//! Generates one or more consecutive levels and prints each as a JSON line
//! (pegs, available colors, thresholds) for inspection or for feeding a
//! game client during development.

use std::path::PathBuf;

use clap::Parser;

use pegfall::{Generator, GeneratorSettings};

/// Preview generated pegfall levels as JSON
#[derive(Debug, Parser)]
#[command(name = "pegfall", version, about)]
struct Cli {
    /// First level to generate
    #[arg(short, long, default_value_t = 1)]
    level: u32,

    /// Number of consecutive levels to generate
    #[arg(short, long, default_value_t = 1)]
    count: u32,

    /// JSON settings file (canvas size, peg radius, margins)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Seed for a repeatable preview
    #[arg(long)]
    seed: Option<u64>,

    /// Pretty-print JSON
    #[arg(long)]
    pretty: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let settings = cli
        .settings
        .as_deref()
        .map(GeneratorSettings::load_from)
        .unwrap_or_default();
    log::info!(
        "Pegfall preview: {}x{} canvas, peg radius {}",
        settings.canvas_width,
        settings.canvas_height,
        settings.peg_radius
    );

    let mut generator = match cli.seed {
        Some(seed) => Generator::with_seed(settings, seed),
        None => Generator::from_settings(settings),
    };

    let first = cli.level.max(1);
    for level in first..first.saturating_add(cli.count) {
        let layout = generator.generate_layout(level);
        log::info!("Level {} color counts: {:?}", level, layout.color_counts());

        let json = if cli.pretty {
            serde_json::to_string_pretty(&layout)
        } else {
            serde_json::to_string(&layout)
        };
        match json {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("Failed to serialize level {}: {}", level, e),
        }
    }
}
