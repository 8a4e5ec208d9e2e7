use crate::cli::{Cli, RegionateArgs};
use crate::progress_bar::BarProgress;
use anyhow::Context;
use celestial_regionator::{pipeline, LogProgress, ProgressSink};
use std::fs;

pub fn run(args: &RegionateArgs, cli: &Cli) -> anyhow::Result<()> {
    let config = args.to_config()?;
    if args.create_dir {
        fs::create_dir_all(&config.output_dir)
            .with_context(|| format!("creating {}", config.output_dir.display()))?;
    }

    println!("=== Regionate {} ===", config.input.display());
    println!("Survey: {}", config.survey_name());
    println!("Output: {}", config.output_dir.display());
    println!("Objects per region: {}", config.max_per_node);
    println!(
        "LOD pixels: {} to {}",
        config.min_lod_pixels, config.max_lod_pixels
    );
    println!();

    let mut bar = BarProgress::new();
    let mut log = LogProgress;
    let progress: &mut dyn ProgressSink = if cli.verbose { &mut log } else { &mut bar };

    let summary = pipeline::regionate(&config, progress)
        .with_context(|| format!("regionating {}", config.input.display()))?;

    println!();
    println!("Objects: {}", summary.points);
    println!("Region files: {}", summary.regions_written);
    println!("Deepest region: {}", summary.max_depth);
    println!("Index: {}", summary.index.display());
    Ok(())
}
