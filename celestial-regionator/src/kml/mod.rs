//! KML output for sky-mode virtual globes.
//!
//! A regionated catalog is a tree of documents. Each populated region gets
//! `<id>.kml` holding its own placemarks and a `NetworkLink` per populated
//! child, each gated by the child's `Region` so viewers fetch it only when
//! it covers enough pixels. A separate index document links to `0.kml`.

mod style;
mod writer;

pub use style::PointStyle;
pub use writer::{
    write_flat_document, write_index_document, write_region_document, write_region_tree,
    KmlWriter, INDEX_LINK_NAME,
};

pub const KML_NAMESPACE: &str = "http://earth.google.com/kml/2.2";
pub const SKY_HINT: &str = "target=sky";
pub const REGION_FILE_EXTENSION: &str = "kml";

pub fn region_file_name(id: &str) -> String {
    format!("{id}.{REGION_FILE_EXTENSION}")
}

/// Decimal degrees, always with a fractional part (`90.0`, not `90`).
pub fn format_degrees(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degrees_keep_a_fraction() {
        assert_eq!(format_degrees(90.0), "90.0");
        assert_eq!(format_degrees(-180.0), "-180.0");
        assert_eq!(format_degrees(0.0), "0.0");
        assert_eq!(format_degrees(-169.5), "-169.5");
        assert_eq!(format_degrees(30.000000000000004), "30.000000000000004");
    }

    #[test]
    fn region_files_use_kml_extension() {
        assert_eq!(region_file_name("0312"), "0312.kml");
    }
}
