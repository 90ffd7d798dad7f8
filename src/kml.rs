//! KML document assembly: one ground overlay plus one annotated placemark
//! per geolocated photo.

use anyhow::Result;
use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::Write;

use crate::config::Config;
use crate::geometry::OverlayBox;
use crate::metadata::ImageMetadata;

const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";

/// Table styling shared by every placemark description.
const DESCRIPTION_STYLE: &str = "\
table { width: 100%; text-align: center; border-collapse: collapse; }\n\
th, td { border: 1px solid black; padding: 5px; }\n\
th { background-color: grey; color: white; }";

/// An in-memory KML document under construction.
///
/// The single point of mutation during a conversion run: each geolocated
/// photo appends one `GroundOverlay` and one `Placemark`, and the finished
/// document is serialized once with [`KmlDocument::to_xml`]. Serialization
/// is deterministic — the same entries in the same order always produce
/// byte-identical markup.
pub struct KmlDocument {
    overlay_icon: String,
    branding_image: String,
    marker_icon_href: String,
    entries: Vec<PhotoEntry>,
}

struct PhotoEntry {
    name: String,
    metadata: ImageMetadata,
    overlay: OverlayBox,
}

impl KmlDocument {
    /// Create an empty document wired to the configured asset names.
    pub fn new(config: &Config) -> Self {
        Self {
            overlay_icon: config.overlay_icon_name(),
            branding_image: config.branding_image_name(),
            marker_icon_href: config.marker_icon_href.clone(),
            entries: Vec::new(),
        }
    }

    /// Append the overlay + placemark pair for one photo.
    pub fn add_photo(&mut self, name: &str, metadata: &ImageMetadata, overlay: &OverlayBox) {
        self.entries.push(PhotoEntry {
            name: name.to_string(),
            metadata: metadata.clone(),
            overlay: *overlay,
        });
    }

    /// Number of photos appended so far.
    pub fn photo_count(&self) -> usize {
        self.entries.len()
    }

    /// Serialize the document. The pipeline guarantees at least one entry
    /// before calling this; an empty document is never written to disk.
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut kml = BytesStart::new("kml");
        kml.push_attribute(("xmlns", KML_NAMESPACE));
        writer.write_event(Event::Start(kml))?;
        start(&mut writer, "Document")?;

        for entry in &self.entries {
            self.write_overlay(&mut writer, entry)?;
            self.write_placemark(&mut writer, entry)?;
        }

        end(&mut writer, "Document")?;
        writer.write_event(Event::End(BytesEnd::new("kml")))?;

        Ok(String::from_utf8(writer.into_inner())?)
    }

    fn write_overlay<W: Write>(&self, w: &mut Writer<W>, entry: &PhotoEntry) -> Result<()> {
        let overlay = &entry.overlay;
        start(w, "GroundOverlay")?;
        leaf(w, "name", &format!("Overlay - {}", entry.name))?;
        start(w, "Icon")?;
        leaf(w, "href", &self.overlay_icon)?;
        end(w, "Icon")?;
        start(w, "LatLonBox")?;
        leaf(w, "north", &overlay.north.to_string())?;
        leaf(w, "south", &overlay.south.to_string())?;
        leaf(w, "east", &overlay.east.to_string())?;
        leaf(w, "west", &overlay.west.to_string())?;
        leaf(w, "rotation", &overlay.rotation.to_string())?;
        end(w, "LatLonBox")?;
        end(w, "GroundOverlay")?;
        Ok(())
    }

    fn write_placemark<W: Write>(&self, w: &mut Writer<W>, entry: &PhotoEntry) -> Result<()> {
        let meta = &entry.metadata;
        start(w, "Placemark")?;
        leaf(w, "name", &entry.name)?;

        start(w, "description")?;
        w.write_event(Event::CData(BytesCData::new(self.description_html(entry))))?;
        end(w, "description")?;

        start(w, "Style")?;
        start(w, "IconStyle")?;
        start(w, "Icon")?;
        leaf(w, "href", &self.marker_icon_href)?;
        end(w, "Icon")?;
        end(w, "IconStyle")?;
        end(w, "Style")?;

        start(w, "Point")?;
        leaf(w, "altitudeMode", "absolute")?;
        leaf(
            w,
            "coordinates",
            &format!("{},{},{}", meta.longitude, meta.latitude, meta.altitude),
        )?;
        end(w, "Point")?;
        end(w, "Placemark")?;
        Ok(())
    }

    /// The rich HTML block shown when the placemark is selected: branding
    /// header, a small metadata table, and the corrected photo inline.
    fn description_html(&self, entry: &PhotoEntry) -> String {
        let meta = &entry.metadata;
        format!(
            "<html>\n\
             <head>\n\
             <style>\n{DESCRIPTION_STYLE}\n</style>\n\
             </head>\n\
             <body>\n\
             <h1><img src=\"{branding}\" alt=\"Logo\" style=\"height: 50px;\"></h1>\n\
             <table>\n\
             <thead>\n\
             <tr><th>DATE CREATED</th><th>ALTITUDE</th><th>ORIENTATION</th><th>LATITUDE</th><th>LONGITUDE</th></tr>\n\
             </thead>\n\
             <tbody>\n\
             <tr><td>{date}</td><td>{altitude:.1} Meters</td><td>{heading:.1}°</td><td>{latitude:.6}</td><td>{longitude:.6}</td></tr>\n\
             </tbody>\n\
             </table>\n\
             <div><img src=\"{image}\" alt=\"Image\" width=\"800\" /></div>\n\
             </body>\n\
             </html>",
            branding = self.branding_image,
            date = meta.timestamp,
            altitude = meta.altitude,
            heading = meta.heading,
            latitude = meta.latitude,
            longitude = meta.longitude,
            image = entry.name,
        )
    }
}

fn start<W: Write>(w: &mut Writer<W>, name: &str) -> Result<()> {
    w.write_event(Event::Start(BytesStart::new(name)))?;
    Ok(())
}

fn end<W: Write>(w: &mut Writer<W>, name: &str) -> Result<()> {
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn leaf<W: Write>(w: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    start(w, name)?;
    w.write_event(Event::Text(BytesText::new(text)))?;
    end(w, name)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_metadata() -> ImageMetadata {
        ImageMetadata {
            latitude: 40.0 + 26.0 / 60.0 + 46.0 / 3600.0,
            longitude: -(79.0 + 58.0 / 60.0 + 56.0 / 3600.0),
            altitude: 300.0,
            heading: 45.0,
            timestamp: "2023-06-01 10:00:00".to_string(),
        }
    }

    fn sample_document() -> KmlDocument {
        let config = Config::default();
        let meta = sample_metadata();
        let overlay = OverlayBox::from_center(
            meta.latitude,
            meta.longitude,
            meta.heading,
            config.overlay_size,
        );
        let mut doc = KmlDocument::new(&config);
        doc.add_photo("photo.jpg", &meta, &overlay);
        doc
    }

    #[test]
    fn overlay_carries_the_negative_rotation() {
        let xml = sample_document().to_xml().unwrap();
        assert!(xml.contains("<rotation>-45</rotation>"), "{xml}");
        assert!(xml.contains("<name>Overlay - photo.jpg</name>"));
        assert!(xml.contains("<href>fan.png</href>"));
    }

    #[test]
    fn placemark_uses_absolute_altitude_at_the_exact_coordinate() {
        let xml = sample_document().to_xml().unwrap();
        let meta = sample_metadata();
        assert!(xml.contains("<altitudeMode>absolute</altitudeMode>"));
        assert!(xml.contains(&format!(
            "<coordinates>{},{},{}</coordinates>",
            meta.longitude, meta.latitude, meta.altitude
        )));
    }

    #[test]
    fn description_formats_every_field() {
        let xml = sample_document().to_xml().unwrap();
        assert!(xml.contains("2023-06-01 10:00:00"));
        assert!(xml.contains("300.0 Meters"));
        assert!(xml.contains("45.0°"));
        assert!(xml.contains("40.446111"));
        assert!(xml.contains("-79.982222"));
        assert!(xml.contains("src=\"logo.png\""));
        assert!(xml.contains("src=\"photo.jpg\""));
    }

    #[test]
    fn marker_style_references_the_configured_icon() {
        let xml = sample_document().to_xml().unwrap();
        assert!(xml.contains("http://maps.google.com/mapfiles/kml/paddle/blu-circle.png"));
    }

    #[test]
    fn one_overlay_and_one_placemark_per_photo() {
        let config = Config::default();
        let meta = sample_metadata();
        let overlay = OverlayBox::from_center(meta.latitude, meta.longitude, 0.0, 0.0001);

        let mut doc = KmlDocument::new(&config);
        doc.add_photo("a.jpg", &meta, &overlay);
        doc.add_photo("b.jpg", &meta, &overlay);
        assert_eq!(doc.photo_count(), 2);

        let xml = doc.to_xml().unwrap();
        assert_eq!(xml.matches("<GroundOverlay>").count(), 2);
        assert_eq!(xml.matches("<Placemark>").count(), 2);
    }

    #[test]
    fn serialization_is_deterministic() {
        let doc = sample_document();
        assert_eq!(doc.to_xml().unwrap(), doc.to_xml().unwrap());
    }
}
