use crate::config::DEFAULT_ICON_URL;
use crate::extract::POINT_STYLE_ID;

const REGION_BALLOON: &str = "<center><b><font face='Verdana' size='+2'>$[name]</font></b></center><br><center>$[description]</center>";
const FLAT_BALLOON: &str = "<center>$[description]</center>";

/// Icon and balloon shared by every placemark in a document.
#[derive(Debug, Clone, PartialEq)]
pub struct PointStyle {
    pub id: String,
    pub icon_url: String,
    pub icon_scale: f64,
    /// Balloon template, written as CDATA.
    pub balloon_text: String,
    pub balloon_color: String,
}

impl PointStyle {
    /// Balloon with the object name as a heading above its description.
    pub fn regionated(icon_url: impl Into<String>) -> Self {
        Self::with_balloon(icon_url, REGION_BALLOON)
    }

    /// Balloon showing only the description.
    pub fn flat(icon_url: impl Into<String>) -> Self {
        Self::with_balloon(icon_url, FLAT_BALLOON)
    }

    fn with_balloon(icon_url: impl Into<String>, balloon: &str) -> Self {
        Self {
            id: POINT_STYLE_ID.to_string(),
            icon_url: icon_url.into(),
            icon_scale: 1.0,
            balloon_text: balloon.to_string(),
            balloon_color: "ffffffff".to_string(),
        }
    }
}

impl Default for PointStyle {
    fn default() -> Self {
        Self::regionated(DEFAULT_ICON_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn styles_share_id_and_differ_in_balloon() {
        let region = PointStyle::regionated("icon.png");
        let flat = PointStyle::flat("icon.png");
        assert_eq!(region.id, "FitsPoint");
        assert_eq!(region.id, flat.id);
        assert!(region.balloon_text.contains("$[name]"));
        assert!(!flat.balloon_text.contains("$[name]"));
        assert_eq!(PointStyle::default().icon_url, DEFAULT_ICON_URL);
    }
}
