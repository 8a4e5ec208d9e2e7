use crate::errors::{RegionatorError, Result};

const RA_PATTERNS: [&str; 3] = ["ra", "right_ascension", "rightascension"];
const DEC_PATTERNS: [&str; 2] = ["dec", "declination"];

/// Positions and names of the two coordinate columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinateColumns {
    pub ra: usize,
    pub dec: usize,
    pub ra_name: String,
    pub dec_name: String,
}

/// Picks the first column, in table order, whose lowercased name contains
/// one of the role's patterns.
pub fn detect(names: &[String]) -> Result<CoordinateColumns> {
    let ra = find_by_patterns(names, &RA_PATTERNS);
    let dec = find_by_patterns(names, &DEC_PATTERNS);

    match (ra, dec) {
        (Some(ra), Some(dec)) => Ok(CoordinateColumns {
            ra,
            dec,
            ra_name: names[ra].clone(),
            dec_name: names[dec].clone(),
        }),
        (None, None) => Err(RegionatorError::CoordinateColumnsNotFound {
            missing: "RA or Dec".into(),
        }),
        (None, Some(_)) => Err(RegionatorError::CoordinateColumnsNotFound {
            missing: "RA".into(),
        }),
        (Some(_), None) => Err(RegionatorError::CoordinateColumnsNotFound {
            missing: "Dec".into(),
        }),
    }
}

/// Like [`detect`], but a named override replaces detection for its role.
pub fn resolve(
    names: &[String],
    ra_override: Option<&str>,
    dec_override: Option<&str>,
) -> Result<CoordinateColumns> {
    if ra_override.is_none() && dec_override.is_none() {
        return detect(names);
    }

    let ra = match ra_override {
        Some(name) => find_named(names, name, "RA")?,
        None => find_by_patterns(names, &RA_PATTERNS).ok_or_else(|| {
            RegionatorError::CoordinateColumnsNotFound {
                missing: "RA".into(),
            }
        })?,
    };
    let dec = match dec_override {
        Some(name) => find_named(names, name, "Dec")?,
        None => find_by_patterns(names, &DEC_PATTERNS).ok_or_else(|| {
            RegionatorError::CoordinateColumnsNotFound {
                missing: "Dec".into(),
            }
        })?,
    };

    Ok(CoordinateColumns {
        ra,
        dec,
        ra_name: names[ra].clone(),
        dec_name: names[dec].clone(),
    })
}

fn find_by_patterns(names: &[String], patterns: &[&str]) -> Option<usize> {
    names.iter().position(|name| {
        let lower = name.to_lowercase();
        patterns.iter().any(|pattern| lower.contains(pattern))
    })
}

fn find_named(names: &[String], wanted: &str, role: &str) -> Result<usize> {
    names
        .iter()
        .position(|n| n == wanted)
        .or_else(|| names.iter().position(|n| n.eq_ignore_ascii_case(wanted)))
        .ok_or_else(|| {
            RegionatorError::config(format!("{role} column '{wanted}' is not in the table"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn detect_plain_names() {
        let found = detect(&names(&["objID", "RA", "DEC", "r"])).unwrap();
        assert_eq!((found.ra, found.dec), (1, 2));
        assert_eq!(found.ra_name, "RA");
        assert_eq!(found.dec_name, "DEC");
    }

    #[test]
    fn dec_found_by_substring() {
        let found = detect(&names(&["ID", "RA_DEG", "DEC_EST", "MAG"])).unwrap();
        assert_eq!(found.dec, 2);
        assert_eq!(found.dec_name, "DEC_EST");
    }

    #[test]
    fn first_matching_column_wins() {
        let found =
            detect(&names(&["Right_Ascension", "RAJ2000", "Declination", "DEJ2000"])).unwrap();
        assert_eq!((found.ra, found.dec), (0, 2));
    }

    #[test]
    fn missing_roles_are_reported() {
        let error = detect(&names(&["ID", "RA", "MAG"])).unwrap_err();
        assert!(
            matches!(error, RegionatorError::CoordinateColumnsNotFound { ref missing } if missing == "Dec")
        );

        let error = detect(&names(&["ID", "MAG"])).unwrap_err();
        assert!(error.is_config());
    }

    #[test]
    fn overrides_bypass_detection() {
        let table = names(&["TRACT", "alpha", "delta_j2000"]);
        assert!(detect(&table).is_err());

        let found = resolve(&table, Some("ALPHA"), Some("delta_j2000")).unwrap();
        assert_eq!((found.ra, found.dec), (1, 2));
        assert_eq!(found.ra_name, "alpha");
    }

    #[test]
    fn single_override_detects_the_other_role() {
        let table = names(&["TRACT", "ra_icrs", "dec_icrs"]);
        let found = resolve(&table, Some("ra_icrs"), None).unwrap();
        assert_eq!((found.ra, found.dec), (1, 2));
    }

    #[test]
    fn unknown_override_is_config_error() {
        let table = names(&["RA", "DEC"]);
        let error = resolve(&table, None, Some("DE")).unwrap_err();
        assert!(matches!(error, RegionatorError::Config(_)));
    }
}
