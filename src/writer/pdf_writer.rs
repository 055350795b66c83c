//! PDF document writer.
//!
//! Assembles complete PDF documents with proper structure:
//! header, body, xref table, and trailer. Page geometry is given in
//! millimetres and converted to points here.

use super::content_stream::ContentStreamBuilder;
use super::image_handler::JpegXObject;
use super::object::{Dict, Object};
use super::serializer::ObjectSerializer;
use crate::geometry::{PageSize, Placement, MM_PER_POINT};
use std::io::Write;

/// Configuration for PDF generation.
#[derive(Debug, Clone)]
pub struct PdfWriterConfig {
    /// PDF version (e.g., "1.7")
    pub version: String,
    /// Document title
    pub title: Option<String>,
    /// Document subject
    pub subject: Option<String>,
    /// Document keywords
    pub keywords: Option<String>,
    /// Creator application
    pub creator: Option<String>,
    /// Whether to Flate-compress content streams
    pub compress: bool,
}

impl Default for PdfWriterConfig {
    fn default() -> Self {
        Self {
            version: "1.7".to_string(),
            title: None,
            subject: None,
            keywords: None,
            creator: Some("roadmap_export".to_string()),
            compress: true,
        }
    }
}

impl PdfWriterConfig {
    /// Set document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set document subject.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set document keywords.
    pub fn with_keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = Some(keywords.into());
        self
    }

    /// Enable or disable content stream compression.
    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }
}

/// Compress data using Flate/Deflate compression.
fn compress_data(data: &[u8]) -> std::io::Result<Vec<u8>> {
    use flate2::write::ZlibEncoder;
    use flate2::Compression;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Internal page data.
struct PageData {
    size: PageSize,
    content: ContentStreamBuilder,
    images: Vec<(String, JpegXObject)>,
}

/// A page being built.
pub struct PageBuilder<'a> {
    page: &'a mut PageData,
}

impl PageBuilder<'_> {
    /// Paint `image` at `placement` (millimetres, top-left origin).
    pub fn draw_image(&mut self, image: JpegXObject, placement: &Placement) -> &mut Self {
        let resource_id = format!("Im{}", self.page.images.len() + 1);
        let page_height = self.page.size.height;

        // PDF user space has its origin at the bottom-left corner.
        let x = placement.x / MM_PER_POINT;
        let y = (page_height - placement.y - placement.height) / MM_PER_POINT;
        let width = placement.width / MM_PER_POINT;
        let height = placement.height / MM_PER_POINT;

        self.page
            .content
            .draw_image(&resource_id, x, y, width, height);
        self.page.images.push((resource_id, image));
        self
    }
}

/// PDF document writer.
pub struct PdfWriter {
    config: PdfWriterConfig,
    pages: Vec<PageData>,
}

impl PdfWriter {
    /// Create a new PDF writer with default config.
    pub fn new() -> Self {
        Self::with_config(PdfWriterConfig::default())
    }

    /// Create a PDF writer with custom config.
    pub fn with_config(config: PdfWriterConfig) -> Self {
        Self {
            config,
            pages: Vec::new(),
        }
    }

    /// Append a page of the given size.
    pub fn add_page(&mut self, size: PageSize) -> PageBuilder<'_> {
        self.pages.push(PageData {
            size,
            content: ContentStreamBuilder::new(),
            images: Vec::new(),
        });
        let index = self.pages.len() - 1;
        PageBuilder {
            page: &mut self.pages[index],
        }
    }

    /// Build the complete PDF document.
    pub fn finish(self) -> std::io::Result<Vec<u8>> {
        let serializer = ObjectSerializer::new();
        let mut objects: Vec<(u32, Object)> = Vec::new();
        let mut next_id = 1u32;
        let mut alloc = || {
            let id = next_id;
            next_id += 1;
            id
        };

        let catalog_id = alloc();
        let pages_id = alloc();
        let mut kids = Vec::with_capacity(self.pages.len());

        for page in &self.pages {
            let page_id = alloc();
            let content_id = alloc();

            let mut xobjects = Dict::new();
            for (resource_id, image) in &page.images {
                let image_id = alloc();
                objects.push((image_id, image.to_object()));
                xobjects.insert(resource_id.clone(), Object::reference(image_id));
            }

            let raw = page.content.build()?;
            let mut content_dict = Dict::new();
            let data = if self.config.compress {
                content_dict.insert("Filter".to_string(), Object::name("FlateDecode"));
                compress_data(&raw)?
            } else {
                raw
            };
            objects.push((
                content_id,
                Object::Stream {
                    dict: content_dict,
                    data: bytes::Bytes::from(data),
                },
            ));

            let (width_pt, height_pt) = page.size.to_points();
            objects.push((
                page_id,
                Object::dict([
                    ("Type", Object::name("Page")),
                    ("Parent", Object::reference(pages_id)),
                    ("MediaBox", Object::rect(0.0, 0.0, width_pt, height_pt)),
                    ("Contents", Object::reference(content_id)),
                    ("Resources", Object::dict([("XObject", Object::Dictionary(xobjects))])),
                ]),
            ));
            kids.push(Object::reference(page_id));
        }

        let page_count = kids.len() as i64;
        objects.push((
            pages_id,
            Object::dict([
                ("Type", Object::name("Pages")),
                ("Kids", Object::Array(kids)),
                ("Count", Object::Integer(page_count)),
            ]),
        ));
        objects.push((
            catalog_id,
            Object::dict([
                ("Type", Object::name("Catalog")),
                ("Pages", Object::reference(pages_id)),
            ]),
        ));

        let info_id = alloc();
        let mut info = Vec::new();
        if let Some(title) = &self.config.title {
            info.push(("Title", Object::text(title)));
        }
        if let Some(subject) = &self.config.subject {
            info.push(("Subject", Object::text(subject)));
        }
        if let Some(keywords) = &self.config.keywords {
            info.push(("Keywords", Object::text(keywords)));
        }
        if let Some(creator) = &self.config.creator {
            info.push(("Creator", Object::text(creator)));
        }
        objects.push((info_id, Object::dict(info)));
        objects.sort_by_key(|(id, _)| *id);

        let mut output = Vec::new();
        writeln!(output, "%PDF-{}", self.config.version)?;
        // Binary marker (recommended for binary content)
        output.extend_from_slice(b"%\xE2\xE3\xCF\xD3\n");

        let mut offsets = Vec::with_capacity(objects.len());
        for (id, obj) in &objects {
            offsets.push(output.len());
            serializer.write_indirect(&mut output, *id, obj)?;
        }

        let size = objects.len() as u32 + 1;
        let xref_start = output.len();
        writeln!(output, "xref")?;
        writeln!(output, "0 {}", size)?;
        writeln!(output, "0000000000 65535 f ")?;
        for offset in &offsets {
            writeln!(output, "{:010} 00000 n ", offset)?;
        }

        let trailer = Object::dict([
            ("Size", Object::Integer(size as i64)),
            ("Root", Object::reference(catalog_id)),
            ("Info", Object::reference(info_id)),
        ]);
        writeln!(output, "trailer")?;
        serializer.write_object(&mut output, &trailer)?;
        writeln!(output)?;
        writeln!(output, "startxref")?;
        writeln!(output, "{}", xref_start)?;
        write!(output, "%%EOF")?;

        Ok(output)
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Orientation;
    use image::codecs::jpeg::JpegEncoder;

    fn jpeg(width: u32, height: u32) -> JpegXObject {
        let pixels = vec![90u8; (width * height * 3) as usize];
        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, 75)
            .encode(&pixels, width, height, image::ColorType::Rgb8)
            .unwrap();
        JpegXObject::from_jpeg(out).unwrap()
    }

    #[test]
    fn test_create_empty_pdf() {
        let mut writer = PdfWriter::new();
        writer.add_page(PageSize::a4(Orientation::Portrait));
        let bytes = writer.finish().unwrap();

        let content = String::from_utf8_lossy(&bytes);
        assert!(content.starts_with("%PDF-1.7"));
        assert!(content.contains("/Type /Catalog"));
        assert!(content.contains("/Type /Pages"));
        assert!(content.contains("/Count 1"));
        assert!(content.ends_with("%%EOF"));
    }

    #[test]
    fn test_a4_landscape_media_box() {
        let mut writer = PdfWriter::with_config(PdfWriterConfig::default().with_compress(false));
        writer.add_page(PageSize::a4(Orientation::Landscape));
        let content = String::from_utf8_lossy(&writer.finish().unwrap()).to_string();
        assert!(content.contains("/MediaBox [0 0 841.88976 595.27559]"));
    }

    #[test]
    fn test_image_page_references_xobject() {
        let mut writer = PdfWriter::with_config(PdfWriterConfig::default().with_compress(false));
        let placement = Placement {
            x: 0.0,
            y: 0.0,
            width: 210.0,
            height: 297.0,
        };
        writer
            .add_page(PageSize::a4(Orientation::Portrait))
            .draw_image(jpeg(8, 8), &placement);
        let content = String::from_utf8_lossy(&writer.finish().unwrap()).to_string();

        assert!(content.contains("/XObject <</Im1 "));
        assert!(content.contains("/Filter /DCTDecode"));
        assert!(content.contains("/Im1 Do"));
        assert!(content.contains("595.2756 0 0 841.8898 0 0 cm"));
    }

    #[test]
    fn test_placement_flips_to_bottom_left_origin() {
        let mut writer = PdfWriter::with_config(PdfWriterConfig::default().with_compress(false));
        let placement = Placement {
            x: 0.0,
            y: 0.0,
            width: 297.0,
            height: 105.0,
        };
        writer
            .add_page(PageSize::a4(Orientation::Landscape))
            .draw_image(jpeg(4, 2), &placement);
        let content = String::from_utf8_lossy(&writer.finish().unwrap()).to_string();
        // Top-aligned image: lower edge sits 105mm (297.6378pt) above the page bottom.
        assert!(content.contains(" 0 297.6378 cm"));
    }

    #[test]
    fn test_multiple_pages_and_metadata() {
        let config = PdfWriterConfig::default()
            .with_title("Roadmap")
            .with_subject("Platform team");
        let mut writer = PdfWriter::with_config(config);
        writer.add_page(PageSize::a4(Orientation::Landscape));
        writer.add_page(PageSize::a4(Orientation::Landscape));
        writer.add_page(PageSize::a4(Orientation::Landscape));

        let content = String::from_utf8_lossy(&writer.finish().unwrap()).to_string();
        assert!(content.contains("/Count 3"));
        assert!(content.contains("/Title (Roadmap)"));
        assert!(content.contains("/Subject (Platform team)"));
        assert!(content.contains("/Filter /FlateDecode"));
    }

    #[test]
    fn test_non_ascii_metadata_is_utf16() {
        let config = PdfWriterConfig::default()
            .with_title("Café")
            .with_subject("Platform team");
        let mut writer = PdfWriter::with_config(config);
        writer.add_page(PageSize::a4(Orientation::Landscape));

        let content = String::from_utf8_lossy(&writer.finish().unwrap()).to_string();
        assert!(content.contains("/Title <FEFF00430061006600E9>"));
        assert!(content.contains("/Subject (Platform team)"));
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let mut writer = PdfWriter::with_config(PdfWriterConfig::default().with_compress(false));
        writer.add_page(PageSize::a4(Orientation::Portrait));
        let bytes = writer.finish().unwrap();

        let xref_at = bytes.windows(5).position(|w| w == b"xref\n").unwrap();
        let table = std::str::from_utf8(&bytes[xref_at..]).unwrap();
        let first_entry = table.lines().nth(3).unwrap();
        let offset: usize = first_entry[..10].parse().unwrap();
        assert!(bytes[offset..].starts_with(b"1 0 obj"));
    }
}
