//! Conversion of catalog rows into sky placemarks.
//!
//! Sky viewers map the celestial sphere onto the globe with
//! `longitude = ra - 180` and `latitude = dec`. Each point carries an IAU
//! designation as its name and an HTML table of the source row as its
//! description.

pub mod columns;
pub mod sexagesimal;

pub use columns::{detect, resolve, CoordinateColumns};
pub use sexagesimal::{iau_name, Sexagesimal};

use crate::errors::{RegionatorError, Result};
use crate::progress::{ProgressEvent, ProgressSink, EXTRACT_REPORT_INTERVAL};
use celestial_fits::{FieldValue, TableSource};
use quick_xml::escape::escape;
use std::fmt::Write as _;

pub const POINT_STYLE_ID: &str = "FitsPoint";

/// One catalog object positioned on the sky-globe.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoPoint {
    pub name: String,
    /// HTML table, unescaped.
    pub description: String,
    /// Degrees in `[-180, 180)`.
    pub longitude: f64,
    /// Degrees in `[-90, 90]`.
    pub latitude: f64,
    pub style_url: String,
}

impl GeoPoint {
    pub fn new(name: impl Into<String>, longitude: f64, latitude: f64) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            longitude,
            latitude,
            style_url: format!("#{POINT_STYLE_ID}"),
        }
    }
}

/// Builds one point per row, in row order.
pub fn extract_points<T, P>(
    table: &T,
    columns: &CoordinateColumns,
    survey: &str,
    progress: &mut P,
) -> Result<Vec<GeoPoint>>
where
    T: TableSource + ?Sized,
    P: ProgressSink + ?Sized,
{
    let total = table.num_rows();
    let mut points = Vec::with_capacity(total);

    for row in 0..total {
        points.push(point_from_row(table, row, columns, survey)?);

        let done = row + 1;
        if done % EXTRACT_REPORT_INTERVAL == 0 || done == total {
            progress.report(ProgressEvent::PointsExtracted { done, total });
        }
    }
    Ok(points)
}

pub fn point_from_row<T: TableSource + ?Sized>(
    table: &T,
    row: usize,
    columns: &CoordinateColumns,
    survey: &str,
) -> Result<GeoPoint> {
    let ra_field = table.field(row, columns.ra);
    let dec_field = table.field(row, columns.dec);
    let invalid = || RegionatorError::InvalidCoordinate {
        row,
        ra: field_text(ra_field),
        dec: field_text(dec_field),
    };

    let ra = ra_field.and_then(FieldValue::as_f64).ok_or_else(invalid)?;
    let dec = dec_field.and_then(FieldValue::as_f64).ok_or_else(invalid)?;
    if !(0.0..360.0).contains(&ra) || !(-90.0..=90.0).contains(&dec) {
        return Err(invalid());
    }

    let mut point = GeoPoint::new(iau_name(survey, ra, dec), ra - 180.0, dec);
    point.description = describe_row(table, row, columns, ra, dec);
    Ok(point)
}

/// HTML table of every column, with the coordinate columns shown in
/// sexagesimal form.
pub fn describe_row<T: TableSource + ?Sized>(
    table: &T,
    row: usize,
    columns: &CoordinateColumns,
    ra: f64,
    dec: f64,
) -> String {
    let ra_text = Sexagesimal::hours_from_degrees(ra, 2).hms_html();
    let dec_text = Sexagesimal::from_value(dec, 2).dms_html();

    let mut html = String::from("<table width='300' cellspacing='0' cellpadding='0'>");
    for (index, name) in table.column_names().iter().enumerate() {
        let value = if index == columns.ra {
            ra_text.clone()
        } else if index == columns.dec {
            dec_text.clone()
        } else {
            escape(field_text(table.field(row, index)).as_str()).into_owned()
        };
        let _ = writeln!(
            html,
            "<tr><td align='center'>{}</td><td align='center'>{value}</td></tr>",
            escape(name.as_str())
        );
    }
    html.push_str("</table>\n");
    html
}

fn field_text(field: Option<&FieldValue>) -> String {
    field.map(ToString::to_string).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::RecordingProgress;
    use celestial_fits::Table;

    fn catalog(rows: &[(i64, f64, f64, &str)]) -> Table {
        let mut table = Table::new(vec!["ID".into(), "RA".into(), "DEC".into(), "CLASS".into()]);
        for (id, ra, dec, class) in rows {
            table
                .push_row(vec![
                    FieldValue::Int(*id),
                    FieldValue::Float(*ra),
                    FieldValue::Float(*dec),
                    FieldValue::String(class.to_string()),
                ])
                .unwrap();
        }
        table
    }

    fn columns() -> CoordinateColumns {
        CoordinateColumns {
            ra: 1,
            dec: 2,
            ra_name: "RA".into(),
            dec_name: "DEC".into(),
        }
    }

    #[test]
    fn row_becomes_point() {
        let table = catalog(&[(7, 10.5, 12.25, "STAR")]);
        let point = point_from_row(&table, 0, &columns(), "SDSS").unwrap();
        assert_eq!(point.name, "SDSS J004200.00+121500.0");
        assert_eq!(point.longitude, -169.5);
        assert_eq!(point.latitude, 12.25);
        assert_eq!(point.style_url, "#FitsPoint");
    }

    #[test]
    fn description_lists_every_column() {
        let table = catalog(&[(7, 10.5, -12.25, "Q<SO")]);
        let point = point_from_row(&table, 0, &columns(), "SDSS").unwrap();
        let expected = "<table width='300' cellspacing='0' cellpadding='0'>\
            <tr><td align='center'>ID</td><td align='center'>7</td></tr>\n\
            <tr><td align='center'>RA</td><td align='center'>00<sup>h</sup>42<sup>m</sup>00.00<sup>s</sup></td></tr>\n\
            <tr><td align='center'>DEC</td><td align='center'>-12<sup>d</sup>15<sup>m</sup>00.00<sup>s</sup></td></tr>\n\
            <tr><td align='center'>CLASS</td><td align='center'>Q&lt;SO</td></tr>\n\
            </table>\n";
        assert_eq!(point.description, expected);
    }

    #[test]
    fn out_of_range_positions_are_rejected() {
        for (ra, dec) in [(360.0, 0.0), (-0.5, 0.0), (10.0, 90.5), (f64::NAN, 0.0)] {
            let table = catalog(&[(1, ra, dec, "")]);
            let error = point_from_row(&table, 0, &columns(), "S").unwrap_err();
            assert!(matches!(error, RegionatorError::InvalidCoordinate { row: 0, .. }));
        }
    }

    #[test]
    fn non_numeric_position_is_rejected() {
        let mut table = Table::new(vec!["RA".into(), "DEC".into()]);
        table
            .push_row(vec![
                FieldValue::String("12:00:00".into()),
                FieldValue::Float(1.0),
            ])
            .unwrap();
        let cols = CoordinateColumns {
            ra: 0,
            dec: 1,
            ra_name: "RA".into(),
            dec_name: "DEC".into(),
        };
        let error = point_from_row(&table, 0, &cols, "S").unwrap_err();
        assert!(
            matches!(error, RegionatorError::InvalidCoordinate { ref ra, .. } if ra == "12:00:00")
        );
    }

    #[test]
    fn extraction_keeps_row_order_and_reports() {
        let table = catalog(&[(1, 0.0, 0.0, "A"), (2, 180.0, 45.0, "B"), (3, 359.0, -90.0, "C")]);
        let mut progress = RecordingProgress::default();
        let points = extract_points(&table, &columns(), "T", &mut progress).unwrap();

        let longitudes: Vec<f64> = points.iter().map(|p| p.longitude).collect();
        assert_eq!(longitudes, vec![-180.0, 0.0, 179.0]);
        assert_eq!(
            progress.events,
            vec![ProgressEvent::PointsExtracted { done: 3, total: 3 }]
        );
    }
}
