//! In-memory paginated documents.

use crate::error::{Error, Result};
use crate::geometry::{fit_to_page, PageSize, Placement};
use crate::optimize::{EncodedImage, ImageEncoding};
use crate::writer::{JpegXObject, PdfWriter, PdfWriterConfig};

/// One page: an encoded image and where it sits on the page, in mm.
#[derive(Debug, Clone)]
pub struct DocumentPage {
    /// Page image
    pub image: EncodedImage,
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Display width
    pub width: f64,
    /// Display height
    pub height: f64,
}

impl DocumentPage {
    /// Aspect-fit `image` onto `page`, centred.
    pub fn fit(image: EncodedImage, page: &PageSize) -> Result<Self> {
        let placement = fit_to_page(image.width, image.height, page).ok_or_else(|| {
            Error::Assembly(format!(
                "cannot place a {}x{} image on a page",
                image.width, image.height
            ))
        })?;
        Ok(Self {
            image,
            x: placement.x,
            y: placement.y,
            width: placement.width,
            height: placement.height,
        })
    }

    fn placement(&self) -> Placement {
        Placement {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }
}

/// Ordered pages sharing one page size, plus document metadata.
#[derive(Debug, Clone)]
pub struct Document {
    page_size: PageSize,
    pages: Vec<DocumentPage>,
    title: String,
    subtitle: Option<String>,
    keywords: Option<String>,
}

impl Document {
    /// An empty document.
    pub fn new(page_size: PageSize, title: impl Into<String>) -> Self {
        Self {
            page_size,
            pages: Vec::new(),
            title: title.into(),
            subtitle: None,
            keywords: None,
        }
    }

    /// Set the subtitle, written as the PDF subject.
    pub fn with_subtitle(mut self, subtitle: Option<String>) -> Self {
        self.subtitle = subtitle;
        self
    }

    /// Set the keywords.
    pub fn with_keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = Some(keywords.into());
        self
    }

    /// Fit `image` and append it as the next page.
    pub fn push_image(&mut self, image: EncodedImage) -> Result<&DocumentPage> {
        let page = DocumentPage::fit(image, &self.page_size)?;
        self.pages.push(page);
        Ok(&self.pages[self.pages.len() - 1])
    }

    /// Pages in order.
    pub fn pages(&self) -> &[DocumentPage] {
        &self.pages
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Page size shared by every page.
    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// Title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Serialize to PDF bytes. Every page must hold a JPEG.
    pub fn to_pdf(&self) -> Result<Vec<u8>> {
        if self.pages.is_empty() {
            return Err(Error::Assembly("document has no pages".to_string()));
        }

        let mut config = PdfWriterConfig::default().with_title(self.title.clone());
        if let Some(subtitle) = &self.subtitle {
            config = config.with_subject(subtitle.clone());
        }
        if let Some(keywords) = &self.keywords {
            config = config.with_keywords(keywords.clone());
        }

        let mut writer = PdfWriter::with_config(config);
        for (index, page) in self.pages.iter().enumerate() {
            if page.image.encoding != ImageEncoding::Jpeg {
                return Err(Error::Assembly(format!(
                    "page {} holds a {} image; documents embed JPEG",
                    index + 1,
                    page.image.encoding.extension()
                )));
            }
            let xobject = JpegXObject::from_jpeg(page.image.data.clone())
                .map_err(|e| Error::Assembly(format!("page {}: {}", index + 1, e)))?;
            writer
                .add_page(self.page_size)
                .draw_image(xobject, &page.placement());
        }

        writer
            .finish()
            .map_err(|e| Error::Assembly(format!("PDF serialization failed: {}", e)))
    }
}
