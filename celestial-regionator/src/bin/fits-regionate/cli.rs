//! CLI argument definitions for fits-regionate

use anyhow::Context;
use celestial_regionator::RegionatorConfig;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "fits-regionate")]
#[command(about = "Turn FITS point catalogs into regionated KML for sky viewers")]
#[command(version)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Regionate a catalog into a quad-tree of linked KML files
    Regionate(RegionateArgs),

    /// List HDUs and print the primary header
    Inspect(InspectArgs),

    /// Write every object into a single KML file
    Flatten(FlattenArgs),
}

/// Options shared by every command that reads a catalog table.
#[derive(Args)]
pub struct CatalogArgs {
    /// JSON run configuration used as the base for all other options
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// HDU holding the binary table [default: 1]
    #[arg(long)]
    pub hdu: Option<usize>,

    /// Survey name prefixed to object designations [default: input file name]
    #[arg(long)]
    pub survey: Option<String>,

    /// URL of the placemark icon
    #[arg(long)]
    pub icon: Option<String>,

    /// Sort objects by this column before placing them
    #[arg(long)]
    pub orderby_field: Option<String>,

    /// Right ascension column, bypassing name detection
    #[arg(long)]
    pub ra_column: Option<String>,

    /// Declination column, bypassing name detection
    #[arg(long)]
    pub dec_column: Option<String>,

    /// Fail on repeated header keywords instead of keeping the first
    #[arg(long)]
    pub strict_keywords: bool,
}

#[derive(Parser)]
pub struct RegionateArgs {
    /// Input FITS catalog
    pub input: PathBuf,

    /// Index KML to write
    pub root_kml: PathBuf,

    /// Directory for the region files
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Public URL where the output directory will be served
    #[arg(long)]
    pub url: Option<String>,

    /// Minimum region size in pixels before its contents load [default: 128]
    #[arg(long)]
    pub min_lod: Option<i64>,

    /// Region size in pixels at which its contents fade out, -1 for never [default: -1]
    #[arg(long, allow_negative_numbers = true)]
    pub max_lod: Option<i64>,

    /// Maximum number of objects per region [default: 50]
    #[arg(long)]
    pub objects_per_node: Option<usize>,

    /// Depth at which regions stop subdividing, at most 50 [default: 32]
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Create the output directory if it does not exist
    #[arg(long)]
    pub create_dir: bool,
}

#[derive(Parser)]
pub struct InspectArgs {
    /// FITS file to inspect
    pub input: PathBuf,
}

#[derive(Parser)]
pub struct FlattenArgs {
    /// Input FITS catalog
    pub input: PathBuf,

    /// KML file to write
    pub output: PathBuf,

    #[command(flatten)]
    pub catalog: CatalogArgs,
}

impl CatalogArgs {
    /// Loads `--config` if given, then applies the flags set on the command line.
    pub fn to_config(&self, input: &Path) -> anyhow::Result<RegionatorConfig> {
        let mut config = match &self.config {
            Some(path) => RegionatorConfig::from_json_file(path)
                .with_context(|| format!("reading config {}", path.display()))?,
            None => RegionatorConfig::default(),
        };

        config.input = input.to_path_buf();
        if let Some(hdu) = self.hdu {
            config.hdu = hdu;
        }
        if let Some(survey) = &self.survey {
            config.survey = Some(survey.clone());
        }
        if let Some(icon) = &self.icon {
            config.icon_url = icon.clone();
        }
        if let Some(field) = &self.orderby_field {
            config.order_by = Some(field.clone());
        }
        if let Some(column) = &self.ra_column {
            config.ra_column = Some(column.clone());
        }
        if let Some(column) = &self.dec_column {
            config.dec_column = Some(column.clone());
        }
        if self.strict_keywords {
            config.allow_duplicate_keywords = false;
        }
        Ok(config)
    }
}

impl RegionateArgs {
    pub fn to_config(&self) -> anyhow::Result<RegionatorConfig> {
        let mut config = self.catalog.to_config(&self.input)?;
        config.root_kml = self.root_kml.clone();
        config.output_dir = self.output_dir.clone();
        if let Some(url) = &self.url {
            config.base_url = Some(url.clone());
        }
        if let Some(min_lod) = self.min_lod {
            config.min_lod_pixels = min_lod;
        }
        if let Some(max_lod) = self.max_lod {
            config.max_lod_pixels = max_lod;
        }
        if let Some(count) = self.objects_per_node {
            config.max_per_node = count;
        }
        if let Some(depth) = self.max_depth {
            config.max_depth = depth;
        }
        Ok(config)
    }
}
