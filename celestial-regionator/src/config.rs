//! Run parameters for regionation and flat export.
//!
//! A [`RegionatorConfig`] can be built in code with [`RegionatorConfig::new`]
//! or loaded from JSON. Every field except the three paths has a default, so
//! a config file only needs to name what it changes.

use crate::errors::{RegionatorError, Result};
use crate::region::MAX_TREE_DEPTH;
use celestial_fits::HeaderOptions;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

pub const DEFAULT_ICON_URL: &str = "http://mw1.google.com/mw-earth-vectordb/sky/sky1/pics/icon.png";
pub const DEFAULT_SURVEY: &str = "MySurvey";
pub const DEFAULT_HDU: usize = 1;
pub const DEFAULT_MAX_PER_NODE: usize = 50;
pub const DEFAULT_MIN_LOD_PIXELS: i64 = 128;
pub const DEFAULT_MAX_LOD_PIXELS: i64 = -1;
pub const DEFAULT_MAX_DEPTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegionatorConfig {
    /// Source FITS catalog.
    pub input: PathBuf,
    /// Index KML linking to the root region file.
    pub root_kml: PathBuf,
    /// Directory receiving one `<id>.kml` per populated region. Must exist.
    pub output_dir: PathBuf,
    /// HDU holding the binary table.
    pub hdu: usize,
    /// Label prefix for object designations. Falls back to the input file name.
    pub survey: Option<String>,
    pub icon_url: String,
    /// Column to sort rows by before insertion.
    pub order_by: Option<String>,
    /// Public location of `output_dir`, used in the index link.
    pub base_url: Option<String>,
    pub max_per_node: usize,
    pub min_lod_pixels: i64,
    /// `-1` means the region never fades out.
    pub max_lod_pixels: i64,
    /// Regions at this depth accept points beyond `max_per_node`.
    pub max_depth: usize,
    pub ra_column: Option<String>,
    pub dec_column: Option<String>,
    pub allow_duplicate_keywords: bool,
}

impl Default for RegionatorConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            root_kml: PathBuf::new(),
            output_dir: PathBuf::new(),
            hdu: DEFAULT_HDU,
            survey: None,
            icon_url: DEFAULT_ICON_URL.to_string(),
            order_by: None,
            base_url: None,
            max_per_node: DEFAULT_MAX_PER_NODE,
            min_lod_pixels: DEFAULT_MIN_LOD_PIXELS,
            max_lod_pixels: DEFAULT_MAX_LOD_PIXELS,
            max_depth: DEFAULT_MAX_DEPTH,
            ra_column: None,
            dec_column: None,
            allow_duplicate_keywords: true,
        }
    }
}

impl RegionatorConfig {
    pub fn new(
        input: impl Into<PathBuf>,
        root_kml: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            input: input.into(),
            root_kml: root_kml.into(),
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.input.as_os_str().is_empty() {
            return Err(RegionatorError::config("no input file given"));
        }
        if self.max_per_node == 0 {
            return Err(RegionatorError::config("max_per_node must be at least 1"));
        }
        if self.max_lod_pixels >= 0 && self.min_lod_pixels > self.max_lod_pixels {
            return Err(RegionatorError::config(format!(
                "min_lod_pixels ({}) exceeds max_lod_pixels ({})",
                self.min_lod_pixels, self.max_lod_pixels
            )));
        }
        if self.max_lod_pixels < -1 {
            return Err(RegionatorError::config(format!(
                "max_lod_pixels must be -1 or non-negative, got {}",
                self.max_lod_pixels
            )));
        }
        if self.max_depth > MAX_TREE_DEPTH {
            return Err(RegionatorError::config(format!(
                "max_depth must be at most {MAX_TREE_DEPTH}, got {}",
                self.max_depth
            )));
        }
        if self.survey.as_deref().is_some_and(|s| s.trim().is_empty()) {
            return Err(RegionatorError::config("survey name is empty"));
        }
        Ok(())
    }

    /// The configured survey, else the input file name up to its first `.`.
    pub fn survey_name(&self) -> String {
        if let Some(survey) = &self.survey {
            return survey.clone();
        }
        self.input
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.split('.').next())
            .filter(|stem| !stem.is_empty())
            .unwrap_or(DEFAULT_SURVEY)
            .to_string()
    }

    /// Prefix for the index link: `base_url` if set, else the output directory.
    pub fn link_base(&self) -> String {
        let base = match &self.base_url {
            Some(url) if !url.is_empty() => url.clone(),
            _ => self.output_dir.display().to_string(),
        };
        base.trim_end_matches('/').to_string()
    }

    pub fn header_options(&self) -> HeaderOptions {
        HeaderOptions {
            allow_duplicate_keywords: self.allow_duplicate_keywords,
        }
    }
}
