//! End-to-end runs: FITS catalog in, KML out.

use crate::config::RegionatorConfig;
use crate::errors::{RegionatorError, Result};
use crate::extract::{self, GeoPoint};
use crate::kml::{self, PointStyle};
use crate::progress::{ProgressEvent, ProgressSink};
use crate::region::{build_tree, Lod};
use celestial_fits::{FitsFile, TableSource};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionationSummary {
    pub points: usize,
    pub regions_written: usize,
    pub max_depth: usize,
    pub index: PathBuf,
}

/// Fails unless `dir` is an existing directory this process can create
/// files in. A scratch file is created and removed to find out.
pub fn check_output_dir(dir: &Path) -> Result<()> {
    let metadata = fs::metadata(dir).map_err(|_| {
        RegionatorError::config(format!("{}: must exist and must be writable", dir.display()))
    })?;
    if !metadata.is_dir() {
        return Err(RegionatorError::config(format!(
            "{}: not a directory",
            dir.display()
        )));
    }

    let scratch = tempfile::Builder::new()
        .prefix(".regionate-")
        .tempfile_in(dir)
        .map_err(|e| {
            RegionatorError::config(format!(
                "{}: must exist and must be writable ({e})",
                dir.display()
            ))
        })?;
    scratch.close()?;
    Ok(())
}

/// Reads the configured table HDU and converts its rows to points, sorted
/// by `order_by` when set.
pub fn load_points<P>(config: &RegionatorConfig, progress: &mut P) -> Result<Vec<GeoPoint>>
where
    P: ProgressSink + ?Sized,
{
    log::info!("parsing {}", config.input.display());
    let mut fits = FitsFile::open(&config.input)?;
    progress.report(ProgressEvent::HdusFound {
        count: fits.num_hdus(),
    });

    let mut table = fits.read_table(config.hdu, config.header_options())?;
    let columns = extract::resolve(
        table.column_names(),
        config.ra_column.as_deref(),
        config.dec_column.as_deref(),
    )?;
    progress.report(ProgressEvent::ColumnsDetected {
        ra: columns.ra_name.clone(),
        dec: columns.dec_name.clone(),
    });

    if let Some(column) = &config.order_by {
        table.sort_by_column(column)?;
        progress.report(ProgressEvent::Sorted {
            column: column.clone(),
        });
    }

    extract::extract_points(&table, &columns, &config.survey_name(), progress)
}

/// Regionates the catalog into `output_dir` and writes the index KML.
pub fn regionate<P>(config: &RegionatorConfig, progress: &mut P) -> Result<RegionationSummary>
where
    P: ProgressSink + ?Sized,
{
    config.validate()?;
    check_output_dir(&config.output_dir)?;

    let points = load_points(config, progress)?;
    let lod = Lod::new(config.min_lod_pixels, config.max_lod_pixels);
    let tree = build_tree(points, config.max_per_node, config.max_depth, lod)?;
    let max_depth = tree.max_depth_reached();
    progress.report(ProgressEvent::TreeBuilt {
        points: tree.len(),
        regions: tree.region_count(),
        depth: max_depth,
    });

    log::info!("writing regions to {}", config.output_dir.display());
    let style = PointStyle::regionated(config.icon_url.clone());
    let regions_written = kml::write_region_tree(&tree, &config.output_dir, &style, progress)?;

    let href = format!("{}/{}", config.link_base(), kml::region_file_name("0"));
    let file = BufWriter::new(File::create(&config.root_kml)?);
    kml::write_index_document(file, &config.survey_name(), &href)?;
    progress.report(ProgressEvent::IndexWritten {
        path: config.root_kml.clone(),
    });
    progress.report(ProgressEvent::Finished {
        files: regions_written + 1,
    });

    Ok(RegionationSummary {
        points: tree.len(),
        regions_written,
        max_depth,
        index: config.root_kml.clone(),
    })
}

/// Writes every placemark into the single document `output`. Returns the
/// number of placemarks.
pub fn flatten<P>(config: &RegionatorConfig, output: &Path, progress: &mut P) -> Result<usize>
where
    P: ProgressSink + ?Sized,
{
    config.validate()?;
    let points = load_points(config, progress)?;

    let name = output
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.split('.').next())
        .unwrap_or_default();
    let style = PointStyle::flat(config.icon_url.clone());
    let file = BufWriter::new(File::create(output)?);
    kml::write_flat_document(file, name, &points, &style)?;

    progress.report(ProgressEvent::FileWritten {
        path: output.to_path_buf(),
    });
    progress.report(ProgressEvent::Finished { files: 1 });
    Ok(points.len())
}
