use crate::cli::{Cli, FlattenArgs};
use crate::progress_bar::BarProgress;
use anyhow::Context;
use celestial_regionator::{pipeline, LogProgress, ProgressSink};

pub fn run(args: &FlattenArgs, cli: &Cli) -> anyhow::Result<()> {
    let config = args.catalog.to_config(&args.input)?;

    let mut bar = BarProgress::new();
    let mut log = LogProgress;
    let progress: &mut dyn ProgressSink = if cli.verbose { &mut log } else { &mut bar };

    let count = pipeline::flatten(&config, &args.output, progress)
        .with_context(|| format!("flattening {}", config.input.display()))?;
    println!("Wrote {count} placemarks to {}", args.output.display());
    Ok(())
}
