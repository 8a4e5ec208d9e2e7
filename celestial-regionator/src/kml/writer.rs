use super::{format_degrees, region_file_name, PointStyle, KML_NAMESPACE, SKY_HINT};
use crate::errors::{RegionatorError, Result};
use crate::extract::GeoPoint;
use crate::progress::{ProgressEvent, ProgressSink};
use crate::region::{BoundingBox, Lod, RegionNode};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const INDEX_LINK_NAME: &str = "Regionated Catalog";

/// Streams one KML document.
pub struct KmlWriter<W: Write> {
    writer: Writer<W>,
}

impl KmlWriter<BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> KmlWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: Writer::new_with_indent(inner, b' ', 2),
        }
    }

    /// Writes the XML declaration and opens `<kml><Document>`.
    pub fn begin_document(&mut self, name: &str) -> Result<()> {
        self.emit(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        let kml = BytesStart::new("kml").with_attributes([("xmlns", KML_NAMESPACE), ("hint", SKY_HINT)]);
        self.emit(Event::Start(kml))?;
        self.start("Document")?;
        self.text_element("name", name)
    }

    /// Closes the document and returns the flushed sink.
    pub fn finish(mut self) -> Result<W> {
        self.end("Document")?;
        self.end("kml")?;
        let mut inner = self.writer.into_inner();
        inner.write_all(b"\n")?;
        inner.flush()?;
        Ok(inner)
    }

    pub fn write_point_style(&mut self, style: &PointStyle) -> Result<()> {
        self.emit(Event::Start(
            BytesStart::new("Style").with_attributes([("id", style.id.as_str())]),
        ))?;

        self.start("IconStyle")?;
        self.text_element("scale", &format_degrees(style.icon_scale))?;
        self.start("Icon")?;
        self.text_element("href", &style.icon_url)?;
        self.end("Icon")?;
        self.end("IconStyle")?;

        self.start("BalloonStyle")?;
        self.start("text")?;
        self.emit(Event::CData(BytesCData::new(style.balloon_text.as_str())))?;
        self.end("text")?;
        self.text_element("color", &style.balloon_color)?;
        self.end("BalloonStyle")?;

        self.end("Style")
    }

    /// Collapses child links in the viewer's list panel.
    pub fn write_list_style(&mut self) -> Result<()> {
        self.start("Style")?;
        self.start("ListStyle")?;
        self.text_element("listItemType", "checkHideChildren")?;
        self.end("ListStyle")?;
        self.end("Style")
    }

    pub fn write_region(&mut self, bounds: &BoundingBox, lod: Lod) -> Result<()> {
        self.start("Region")?;
        self.start("Lod")?;
        self.text_element("minLodPixels", &lod.min_pixels.to_string())?;
        self.text_element("maxLodPixels", &lod.max_pixels.to_string())?;
        self.end("Lod")?;
        self.start("LatLonAltBox")?;
        self.text_element("north", &format_degrees(bounds.north))?;
        self.text_element("south", &format_degrees(bounds.south))?;
        self.text_element("east", &format_degrees(bounds.east))?;
        self.text_element("west", &format_degrees(bounds.west))?;
        self.end("LatLonAltBox")?;
        self.end("Region")
    }

    /// A link to another document, optionally gated by a region.
    pub fn write_network_link(
        &mut self,
        name: &str,
        region: Option<(&BoundingBox, Lod)>,
        href: &str,
    ) -> Result<()> {
        self.start("NetworkLink")?;
        self.text_element("name", name)?;
        if let Some((bounds, lod)) = region {
            self.write_region(bounds, lod)?;
        }
        self.start("Link")?;
        self.text_element("href", href)?;
        self.end("Link")?;
        self.end("NetworkLink")
    }

    pub fn write_placemark(&mut self, point: &GeoPoint) -> Result<()> {
        self.start("Placemark")?;
        self.text_element("name", &point.name)?;
        self.text_element("description", &point.description)?;
        self.text_element("styleUrl", &point.style_url)?;
        self.start("Point")?;
        let coordinates = format!(
            "{},{},0",
            format_degrees(point.longitude),
            format_degrees(point.latitude)
        );
        self.text_element("coordinates", &coordinates)?;
        self.end("Point")?;
        self.end("Placemark")
    }

    fn start(&mut self, name: &str) -> Result<()> {
        self.emit(Event::Start(BytesStart::new(name)))
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.emit(Event::End(BytesEnd::new(name)))
    }

    fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
        self.start(name)?;
        self.emit(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    fn emit(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| RegionatorError::Xml(e.to_string()))
    }
}

/// Writes the document for one region: its own placemarks plus links to
/// its populated children.
pub fn write_region_document<W: Write>(inner: W, node: &RegionNode, style: &PointStyle) -> Result<W> {
    let mut kml = KmlWriter::new(inner);
    kml.begin_document(node.id())?;
    kml.write_point_style(style)?;
    kml.write_list_style()?;
    kml.write_region(node.bounds(), node.lod())?;

    for child in node.children().iter().filter(|c| !c.is_empty()) {
        kml.write_network_link(
            child.id(),
            Some((child.bounds(), child.lod())),
            &region_file_name(child.id()),
        )?;
    }
    for point in node.points() {
        kml.write_placemark(point)?;
    }
    kml.finish()
}

/// Writes `<id>.kml` into `dir` for every populated region, parents first.
/// Returns the number of files written.
pub fn write_region_tree<P>(
    root: &RegionNode,
    dir: &Path,
    style: &PointStyle,
    progress: &mut P,
) -> Result<usize>
where
    P: ProgressSink + ?Sized,
{
    let mut written = 0;
    for node in root.iter().filter(|n| !n.is_empty()) {
        let path = dir.join(region_file_name(node.id()));
        let file = BufWriter::new(File::create(&path)?);
        write_region_document(file, node, style)?;
        written += 1;
        progress.report(ProgressEvent::FileWritten { path });
    }
    Ok(written)
}

/// The entry document: a single link to the root region file.
pub fn write_index_document<W: Write>(inner: W, survey: &str, href: &str) -> Result<W> {
    let mut kml = KmlWriter::new(inner);
    kml.begin_document(survey)?;
    kml.write_network_link(INDEX_LINK_NAME, None, href)?;
    kml.finish()
}

/// All placemarks in one document, without regions.
pub fn write_flat_document<W: Write>(
    inner: W,
    name: &str,
    points: &[GeoPoint],
    style: &PointStyle,
) -> Result<W> {
    let mut kml = KmlWriter::new(inner);
    kml.begin_document(name)?;
    kml.write_point_style(style)?;
    for point in points {
        kml.write_placemark(point)?;
    }
    kml.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::build_tree;

    fn render<F>(f: F) -> String
    where
        F: FnOnce(Vec<u8>) -> Result<Vec<u8>>,
    {
        String::from_utf8(f(Vec::new()).unwrap()).unwrap()
    }

    fn star(name: &str, lon: f64, lat: f64) -> GeoPoint {
        let mut point = GeoPoint::new(name, lon, lat);
        point.description = "<table><tr><td>V</td></tr></table>\n".into();
        point
    }

    fn lod() -> Lod {
        Lod::new(128, -1)
    }

    #[test]
    fn leaf_region_document() {
        let tree = build_tree(vec![star("Vega", 99.0, 38.5)], 4, 32, lod()).unwrap();
        let text = render(|out| write_region_document(out, &tree, &PointStyle::regionated("icon.png")));

        assert!(text.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(text.contains(r#"<kml xmlns="http://earth.google.com/kml/2.2" hint="target=sky">"#));
        assert!(text.contains("<name>0</name>"));
        assert!(text.contains(r#"<Style id="FitsPoint">"#));
        assert!(text.contains("<href>icon.png</href>"));
        assert!(text.contains("<![CDATA[<center><b><font face='Verdana' size='+2'>$[name]"));
        assert!(text.contains("<listItemType>checkHideChildren</listItemType>"));
        assert!(text.contains("<minLodPixels>128</minLodPixels>"));
        assert!(text.contains("<maxLodPixels>-1</maxLodPixels>"));
        assert!(text.contains("<north>90.0</north>"));
        assert!(text.contains("<west>-180.0</west>"));
        assert!(text.contains("<coordinates>99.0,38.5,0</coordinates>"));
        assert!(text.contains("<styleUrl>#FitsPoint</styleUrl>"));
        assert!(text.contains("&lt;table&gt;"));
        assert!(!text.contains("<NetworkLink>"));
        assert!(text.trim_end().ends_with("</kml>"));
    }

    #[test]
    fn subdivided_region_links_only_populated_children() {
        let points = vec![
            star("a", 10.0, 5.0),
            star("b", 20.0, 10.0),
            star("c", -10.0, -5.0),
        ];
        let tree = build_tree(points, 2, 32, lod()).unwrap();
        let text = render(|out| write_region_document(out, &tree, &PointStyle::default()));

        assert_eq!(text.matches("<NetworkLink>").count(), 2);
        assert!(text.contains("<href>00.kml</href>"));
        assert!(text.contains("<href>03.kml</href>"));
        assert!(!text.contains("01.kml"));
        assert!(!text.contains("02.kml"));
        assert!(!text.contains("<Placemark>"));
    }

    #[test]
    fn tree_written_one_file_per_populated_region() {
        let dir = tempfile::tempdir().unwrap();
        let points = vec![
            star("a", 10.0, 5.0),
            star("b", 20.0, 10.0),
            star("c", -10.0, -5.0),
        ];
        let tree = build_tree(points, 2, 32, lod()).unwrap();
        let mut progress = crate::progress::RecordingProgress::default();

        let written = write_region_tree(&tree, dir.path(), &PointStyle::default(), &mut progress).unwrap();
        assert_eq!(written, 3);

        let mut files: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        files.sort();
        assert_eq!(files, ["0.kml", "00.kml", "03.kml"]);

        let ne = std::fs::read_to_string(dir.path().join("03.kml")).unwrap();
        assert_eq!(ne.matches("<Placemark>").count(), 2);
        assert_eq!(progress.events.len(), 3);
    }

    #[test]
    fn index_links_to_root_region() {
        let text = render(|out| write_index_document(out, "SDSS", "https://example.org/sky/0.kml"));
        assert!(text.contains("<name>SDSS</name>"));
        assert!(text.contains("<name>Regionated Catalog</name>"));
        assert!(text.contains("<href>https://example.org/sky/0.kml</href>"));
        assert!(!text.contains("<Region>"));
    }

    #[test]
    fn flat_document_holds_every_point() {
        let points: Vec<GeoPoint> = (0..5).map(|i| star(&format!("s{i}"), i as f64, 0.5)).collect();
        let text = render(|out| write_flat_document(out, "catalog", &points, &PointStyle::flat("i.png")));
        assert_eq!(text.matches("<Placemark>").count(), 5);
        assert!(text.contains("<![CDATA[<center>$[description]</center>]]>"));
        assert!(!text.contains("<Region>"));
    }
}
