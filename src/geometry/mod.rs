//! Geometric primitives and the page aspect-fit algorithm.
//!
//! Page geometry is expressed in millimetres; the PDF writer converts to
//! points when it serializes a page.

use serde::Deserialize;

/// Millimetres per PDF point (1 pt = 1/72 in).
pub const MM_PER_POINT: f64 = 25.4 / 72.0;

/// A rectangle, origin at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct Rect {
    /// X coordinate of top-left corner
    pub x: f32,
    /// Y coordinate of top-left corner
    pub y: f32,
    /// Width of rectangle
    pub width: f32,
    /// Height of rectangle
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle from position and dimensions.
    ///
    /// # Examples
    ///
    /// ```
    /// use roadmap_export::geometry::Rect;
    ///
    /// let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
    /// assert_eq!(rect.width, 100.0);
    /// assert_eq!(rect.height, 50.0);
    /// ```
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Same rectangle shifted by `(dx, dy)`.
    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Height greater than width
    #[default]
    Portrait,
    /// Width greater than height
    Landscape,
}

impl Orientation {
    /// `Landscape` when `landscape` is true.
    pub fn from_landscape(landscape: bool) -> Self {
        if landscape {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }
}

/// A page format in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    /// Page width (mm)
    pub width: f64,
    /// Page height (mm)
    pub height: f64,
}

impl PageSize {
    /// A4 (210mm x 297mm) in the given orientation.
    pub fn a4(orientation: Orientation) -> Self {
        match orientation {
            Orientation::Portrait => Self {
                width: 210.0,
                height: 297.0,
            },
            Orientation::Landscape => Self {
                width: 297.0,
                height: 210.0,
            },
        }
    }

    /// Dimensions in PDF points.
    pub fn to_points(&self) -> (f64, f64) {
        (self.width / MM_PER_POINT, self.height / MM_PER_POINT)
    }
}

/// Where an image lands on a page, in page units (mm), top-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Display width
    pub width: f64,
    /// Display height
    pub height: f64,
}

/// Scale an image of `image_width × image_height` pixels onto `page`,
/// preserving its aspect ratio and centering it on both axes.
///
/// The image first takes the full page width; when that makes it taller
/// than the page it is refitted by height instead. Returns `None` for a
/// zero-sized image.
///
/// # Examples
///
/// ```
/// use roadmap_export::geometry::{fit_to_page, Orientation, PageSize};
///
/// let page = PageSize::a4(Orientation::Landscape);
/// let placed = fit_to_page(600, 400, &page).unwrap();
/// assert!(placed.width <= page.width && placed.height <= page.height);
/// assert!((placed.y - (page.height - placed.height) / 2.0).abs() < 1e-9);
/// ```
pub fn fit_to_page(image_width: u32, image_height: u32, page: &PageSize) -> Option<Placement> {
    if image_width == 0 || image_height == 0 {
        return None;
    }

    let aspect = image_height as f64 / image_width as f64;
    let mut width = page.width;
    let mut height = page.width * aspect;
    if height > page.height {
        height = page.height;
        width = page.height / aspect;
    }

    Some(Placement {
        x: (page.width - width) / 2.0,
        y: (page.height - height) / 2.0,
        width,
        height,
    })
}
