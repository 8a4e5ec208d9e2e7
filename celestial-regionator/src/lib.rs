//! Quad-tree regionation of FITS point catalogs into hierarchical KML.
//!
//! Rows of a binary table become sky placemarks, the placemarks fill a
//! capacity-bounded quad-tree over the whole sky, and every populated tile
//! is written as a KML document linking to its populated children with
//! level-of-detail regions.
//!
//! ```no_run
//! use celestial_regionator::{regionate, LogProgress, RegionatorConfig};
//!
//! let config = RegionatorConfig::new("sdss.fits", "sdss.kml", "sdss_regions");
//! let summary = regionate(&config, &mut LogProgress)?;
//! println!("{} regions", summary.regions_written);
//! # Ok::<(), celestial_regionator::RegionatorError>(())
//! ```

pub mod config;
pub mod errors;
pub mod extract;
pub mod kml;
pub mod pipeline;
pub mod progress;
pub mod region;

pub use config::RegionatorConfig;
pub use errors::{RegionatorError, Result};
pub use extract::{CoordinateColumns, GeoPoint};
pub use pipeline::{flatten, load_points, regionate, RegionationSummary};
pub use progress::{LogProgress, NullProgress, ProgressEvent, ProgressSink};
pub use region::{BoundingBox, Lod, RegionNode};
