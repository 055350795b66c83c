//! PDF writing module for exported documents.
//!
//! ## Architecture
//!
//! ```text
//! JpegXObject + Placement (mm)
//!     ↓
//! [PdfWriter / PageBuilder] (pages, resources, mm → pt)
//!     ↓
//! [ContentStreamBuilder] (q / cm / Do / Q)
//!     ↓
//! [ObjectSerializer] (PDF object syntax)
//!     ↓
//! PDF bytes
//! ```
//!
//! ```ignore
//! use roadmap_export::geometry::{fit_to_page, Orientation, PageSize};
//! use roadmap_export::writer::{JpegXObject, PdfWriter};
//!
//! let page = PageSize::a4(Orientation::Landscape);
//! let image = JpegXObject::from_jpeg(jpeg_bytes)?;
//! let placement = fit_to_page(image.width, image.height, &page).unwrap();
//!
//! let mut writer = PdfWriter::new();
//! writer.add_page(page).draw_image(image, &placement);
//! let bytes = writer.finish()?;
//! ```

mod content_stream;
mod image_handler;
mod object;
mod pdf_writer;
mod serializer;

pub use content_stream::{ContentStreamBuilder, ContentStreamOp};
pub use image_handler::{ColorSpace, ImageError, JpegXObject};
pub use object::{Dict, Object, ObjectRef};
pub use pdf_writer::{PageBuilder, PdfWriter, PdfWriterConfig};
pub use serializer::ObjectSerializer;
