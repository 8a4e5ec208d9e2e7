//! Sexagesimal decomposition for object designations.
//!
//! Values are split into whole units, minutes and seconds on an integer grid
//! of `10^-frac_digits` seconds. Seconds are truncated onto that grid, so
//! carries into minutes and units happen exactly and a component never
//! renders as `60`.

/// Slack added before truncation so values like `0.7 h` that land a hair
/// under a grid point in binary do not lose the last digit.
const GRID_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sexagesimal {
    pub negative: bool,
    pub whole: u32,
    pub minutes: u32,
    /// Seconds in units of `10^-frac_digits`.
    pub scaled_seconds: u64,
    pub frac_digits: u8,
}

impl Sexagesimal {
    pub fn from_value(value: f64, frac_digits: u8) -> Self {
        let scale = 10u64.pow(frac_digits as u32);
        let per_minute = 60 * scale;
        let per_unit = 60 * per_minute;

        let units = (value.abs() * per_unit as f64 + GRID_EPSILON).floor() as u64;
        Self {
            negative: value < 0.0,
            whole: (units / per_unit) as u32,
            minutes: ((units % per_unit) / per_minute) as u32,
            scaled_seconds: units % per_minute,
            frac_digits,
        }
    }

    /// Right ascension in degrees as hours, wrapped to `[0, 24)`.
    pub fn hours_from_degrees(ra: f64, frac_digits: u8) -> Self {
        let mut hms = Self::from_value(ra.rem_euclid(360.0) / 15.0, frac_digits);
        hms.whole %= 24;
        hms
    }

    pub fn sign(&self) -> char {
        if self.negative {
            '-'
        } else {
            '+'
        }
    }

    /// Seconds with a two-digit integer part, e.g. `07.25`.
    pub fn seconds_text(&self) -> String {
        let scale = 10u64.pow(self.frac_digits as u32);
        let whole = self.scaled_seconds / scale;
        match self.frac_digits {
            0 => format!("{whole:02}"),
            digits => format!(
                "{whole:02}.{:0width$}",
                self.scaled_seconds % scale,
                width = digits as usize
            ),
        }
    }

    /// `HHhMMmSS.sss` with HTML superscript unit markers.
    pub fn hms_html(&self) -> String {
        format!(
            "{:02}<sup>h</sup>{:02}<sup>m</sup>{}<sup>s</sup>",
            self.whole,
            self.minutes,
            self.seconds_text()
        )
    }

    /// `±DDdMMmSS.ss` with HTML superscript unit markers.
    pub fn dms_html(&self) -> String {
        format!(
            "{}{:02}<sup>d</sup>{:02}<sup>m</sup>{}<sup>s</sup>",
            self.sign(),
            self.whole,
            self.minutes,
            self.seconds_text()
        )
    }
}

/// IAU-style designation `<survey> JHHMMSS.ss±DDMMSS.s`.
pub fn iau_name(survey: &str, ra: f64, dec: f64) -> String {
    let ra = Sexagesimal::hours_from_degrees(ra, 2);
    let dec = Sexagesimal::from_value(dec, 1);
    format!(
        "{survey} J{:02}{:02}{}{}{:02}{:02}{}",
        ra.whole,
        ra.minutes,
        ra.seconds_text(),
        dec.sign(),
        dec.whole,
        dec.minutes,
        dec.seconds_text()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decompose_right_ascension() {
        // 18h 36m 56.33s
        let ra = Sexagesimal::hours_from_degrees(279.234_708_333, 2);
        assert_eq!((ra.whole, ra.minutes), (18, 36));
        assert_eq!(ra.seconds_text(), "56.33");
        assert_eq!(ra.hms_html(), "18<sup>h</sup>36<sup>m</sup>56.33<sup>s</sup>");
    }

    #[test]
    fn decompose_negative_declination() {
        let dec = Sexagesimal::from_value(-23.4392, 2);
        assert!(dec.negative);
        assert_eq!((dec.whole, dec.minutes), (23, 26));
        assert_eq!(dec.seconds_text(), "21.12");
        assert_eq!(dec.dms_html(), "-23<sup>d</sup>26<sup>m</sup>21.12<sup>s</sup>");
    }

    #[test]
    fn exact_grid_values_keep_last_digit() {
        let ra = Sexagesimal::hours_from_degrees(10.5, 2);
        assert_eq!((ra.whole, ra.minutes, ra.seconds_text().as_str()), (0, 42, "00.00"));
    }

    #[test]
    fn seconds_truncate_and_never_show_sixty() {
        // 59.999 arcseconds past 10 deg 59 min
        let dec = Sexagesimal::from_value(10.0 + 59.0 / 60.0 + 59.999 / 3600.0, 1);
        assert_eq!((dec.whole, dec.minutes), (10, 59));
        assert_eq!(dec.seconds_text(), "59.9");
    }

    #[test]
    fn right_ascension_wraps_to_day() {
        let ra = Sexagesimal::hours_from_degrees(359.999_999_999_999_9, 2);
        assert!(ra.whole < 24);
        let negative = Sexagesimal::hours_from_degrees(-15.0, 0);
        assert_eq!(negative.whole, 23);
    }

    #[test]
    fn zero_frac_digits() {
        let dec = Sexagesimal::from_value(45.5, 0);
        assert_eq!(dec.seconds_text(), "00");
        assert_eq!(dec.minutes, 30);
    }

    #[test]
    fn designation_layout() {
        assert_eq!(
            iau_name("SDSS", 10.5, 12.25),
            "SDSS J004200.00+121500.0"
        );
        assert_eq!(
            iau_name("2MASS", 279.234_708_333, -23.4392),
            "2MASS J183656.33-232621.1"
        );
        assert_eq!(iau_name("X", 0.0, 0.0), "X J000000.00+000000.0");
    }
}
