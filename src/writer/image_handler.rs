//! Image XObjects for PDF generation.
//!
//! Exported pages embed JPEG data as-is using the DCTDecode filter
//! (ISO 32000-1 §8.9); dimensions and colour space are read from the
//! JPEG frame header.

use super::object::{Dict, Object};

/// Color space for image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// Grayscale (1 component per pixel)
    DeviceGray,
    /// RGB color (3 components per pixel)
    DeviceRGB,
    /// CMYK color (4 components per pixel)
    DeviceCMYK,
}

impl ColorSpace {
    /// Get the PDF name for this color space.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ColorSpace::DeviceGray => "DeviceGray",
            ColorSpace::DeviceRGB => "DeviceRGB",
            ColorSpace::DeviceCMYK => "DeviceCMYK",
        }
    }

    fn from_components(components: u8) -> Self {
        match components {
            1 => ColorSpace::DeviceGray,
            4 => ColorSpace::DeviceCMYK,
            _ => ColorSpace::DeviceRGB,
        }
    }
}

/// JPEG image ready to be written as an Image XObject.
#[derive(Debug, Clone)]
pub struct JpegXObject {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Colour space declared by the frame header
    pub color_space: ColorSpace,
    /// Encoded JPEG bytes
    pub data: bytes::Bytes,
}

impl JpegXObject {
    /// Wrap JPEG bytes, reading dimensions from the frame header.
    pub fn from_jpeg(data: impl Into<bytes::Bytes>) -> Result<Self, ImageError> {
        let data = data.into();
        let (width, height, color_space) = parse_jpeg_header(&data)?;
        if width == 0 || height == 0 {
            return Err(ImageError::InvalidData(format!(
                "JPEG declares empty frame {}x{}",
                width, height
            )));
        }
        Ok(Self {
            width,
            height,
            color_space,
            data,
        })
    }

    /// Build the Image XObject stream.
    pub fn to_object(&self) -> Object {
        let mut dict = Dict::new();
        dict.insert("Type".to_string(), Object::name("XObject"));
        dict.insert("Subtype".to_string(), Object::name("Image"));
        dict.insert("Width".to_string(), Object::Integer(self.width as i64));
        dict.insert("Height".to_string(), Object::Integer(self.height as i64));
        dict.insert("ColorSpace".to_string(), Object::name(self.color_space.pdf_name()));
        dict.insert("BitsPerComponent".to_string(), Object::Integer(8));
        dict.insert("Filter".to_string(), Object::name("DCTDecode"));
        Object::Stream {
            dict,
            data: self.data.clone(),
        }
    }
}

/// Image embedding error.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// Data is not a JPEG this writer can embed
    #[error("Invalid image data: {0}")]
    InvalidData(String),
}

/// Parse JPEG header to extract dimensions and color space.
fn parse_jpeg_header(data: &[u8]) -> Result<(u32, u32, ColorSpace), ImageError> {
    if data.len() < 4 || data[0] != 0xFF || data[1] != 0xD8 {
        return Err(ImageError::InvalidData("Not a valid JPEG".to_string()));
    }

    let mut pos = 2;
    while pos + 1 < data.len() {
        if data[pos] != 0xFF {
            pos += 1;
            continue;
        }
        let marker = data[pos + 1];
        pos += 2;

        // Fill bytes and standalone markers carry no length.
        if marker == 0xFF || marker == 0x00 || (0xD0..=0xD7).contains(&marker) {
            continue;
        }

        let is_sof = matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_sof {
            if pos + 8 > data.len() {
                return Err(ImageError::InvalidData("Truncated JPEG header".to_string()));
            }
            let height = u16::from_be_bytes([data[pos + 3], data[pos + 4]]) as u32;
            let width = u16::from_be_bytes([data[pos + 5], data[pos + 6]]) as u32;
            let color_space = ColorSpace::from_components(data[pos + 7]);
            return Ok((width, height, color_space));
        }

        if pos + 2 > data.len() {
            break;
        }
        let length = u16::from_be_bytes([data[pos], data[pos + 1]]) as usize;
        pos += length;
    }

    Err(ImageError::InvalidData("Could not find JPEG dimensions".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::jpeg::JpegEncoder;

    fn encode_jpeg(width: u32, height: u32) -> Vec<u8> {
        let pixels = vec![200u8; (width * height * 3) as usize];
        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, 80)
            .encode(&pixels, width, height, image::ColorType::Rgb8)
            .unwrap();
        out
    }

    #[test]
    fn test_reads_dimensions_from_encoded_jpeg() {
        let xobj = JpegXObject::from_jpeg(encode_jpeg(37, 11)).unwrap();
        assert_eq!((xobj.width, xobj.height), (37, 11));
        assert_eq!(xobj.color_space, ColorSpace::DeviceRGB);
    }

    #[test]
    fn test_xobject_dict() {
        let xobj = JpegXObject::from_jpeg(encode_jpeg(4, 2)).unwrap();
        let obj = xobj.to_object();
        let Object::Stream { dict, .. } = obj else {
            panic!("expected an image stream");
        };
        assert_eq!(dict.get("Subtype"), Some(&Object::name("Image")));
        assert_eq!(dict.get("Filter"), Some(&Object::name("DCTDecode")));
        assert_eq!(dict.get("Width"), Some(&Object::Integer(4)));
        assert_eq!(dict.get("Height"), Some(&Object::Integer(2)));
    }

    #[test]
    fn test_rejects_non_jpeg() {
        let result = JpegXObject::from_jpeg(b"\x89PNG\r\n\x1a\n".to_vec());
        assert!(matches!(result, Err(ImageError::InvalidData(_))));
    }

    #[test]
    fn test_rejects_truncated_jpeg() {
        let result = parse_jpeg_header(&[0xFF, 0xD8, 0xFF, 0xC0, 0x00]);
        assert!(result.is_err());
    }
}
