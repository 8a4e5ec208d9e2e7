//! Error types for the regionation pipeline.
//!
//! Every failure is fatal to a run; nothing is retried.
//!
//! | Variant | Raised when |
//! |---------|-------------|
//! | [`Fits`](RegionatorError::Fits) | the source file is malformed, truncated or missing |
//! | [`Config`](RegionatorError::Config) | a parameter is invalid or the output directory is unusable |
//! | [`CoordinateColumnsNotFound`](RegionatorError::CoordinateColumnsNotFound) | no RA or Dec column can be identified |
//! | [`InvalidCoordinate`](RegionatorError::InvalidCoordinate) | a row holds a non-numeric or out-of-range position |
//! | [`Logic`](RegionatorError::Logic) | the quad-tree refuses a point inside the whole-sky root |

use celestial_fits::FitsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegionatorError {
    #[error(transparent)]
    Fits(#[from] FitsError),

    #[error("Configuration error: {0}")]
    Config(String),

    /// `missing` names the roles that could not be matched, e.g. `"RA, Dec"`.
    #[error("No {missing} column found in table")]
    CoordinateColumnsNotFound { missing: String },

    #[error("Row {row} has an invalid position (ra = {ra}, dec = {dec})")]
    InvalidCoordinate { row: usize, ra: String, dec: String },

    /// A regionator invariant was violated.
    #[error("Internal error: {0}")]
    Logic(String),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RegionatorError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::CoordinateColumnsNotFound { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, RegionatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits_errors_pass_through_display() {
        let inner = FitsError::DuplicateKeyword("NAXIS".into());
        let expected = inner.to_string();
        let error = RegionatorError::from(inner);
        assert_eq!(error.to_string(), expected);
        assert!(!error.is_config());
    }

    #[test]
    fn missing_columns_are_config_errors() {
        let error = RegionatorError::CoordinateColumnsNotFound {
            missing: "Dec".into(),
        };
        assert_eq!(error.to_string(), "No Dec column found in table");
        assert!(error.is_config());
        assert!(RegionatorError::config("bad").is_config());
    }

    #[test]
    fn invalid_coordinate_message() {
        let error = RegionatorError::InvalidCoordinate {
            row: 4,
            ra: "NaN".into(),
            dec: "12".into(),
        };
        assert_eq!(
            error.to_string(),
            "Row 4 has an invalid position (ra = NaN, dec = 12)"
        );
    }
}
