//! PDF object model used by the writer.
//!
//! Only the object kinds an image-per-page document needs are modelled.
//! Dictionaries are ordered maps so serialized output is deterministic.

use std::collections::BTreeMap;

/// Dictionary of PDF objects keyed by name (without the leading `/`).
pub type Dict = BTreeMap<String, Object>;

/// PDF object representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    /// Integer value
    Integer(i64),
    /// Real (floating-point) value
    Real(f64),
    /// String (byte array)
    String(Vec<u8>),
    /// Name (starting with /)
    Name(String),
    /// Array of objects
    Array(Vec<Object>),
    /// Dictionary (key-value pairs)
    Dictionary(Dict),
    /// Stream (dictionary + data)
    Stream {
        /// Stream dictionary; `Length` is filled in on write
        dict: Dict,
        /// Stream data
        data: bytes::Bytes,
    },
    /// Indirect object reference
    Reference(ObjectRef),
}

/// Reference to an indirect object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectRef {
    /// Object number
    pub id: u32,
    /// Generation number
    pub gen: u16,
}

impl ObjectRef {
    /// Create a new object reference.
    pub fn new(id: u32, gen: u16) -> Self {
        Self { id, gen }
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} R", self.id, self.gen)
    }
}

impl Object {
    /// Name object.
    pub fn name(s: &str) -> Object {
        Object::Name(s.to_string())
    }

    /// Text string. ASCII is stored as is; anything else as UTF-16BE with a
    /// byte order mark (ISO 32000-1 §7.9.2.2).
    pub fn text(s: &str) -> Object {
        if s.is_ascii() {
            return Object::String(s.as_bytes().to_vec());
        }
        Object::String(encode_utf16_be(s))
    }

    /// Reference to generation 0 of `id`.
    pub fn reference(id: u32) -> Object {
        Object::Reference(ObjectRef::new(id, 0))
    }

    /// Dictionary from `(key, value)` pairs.
    pub fn dict<'a>(entries: impl IntoIterator<Item = (&'a str, Object)>) -> Object {
        Object::Dictionary(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    /// Rectangle `[llx lly urx ury]` from origin and size.
    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Object {
        Object::Array(vec![
            Object::Real(x),
            Object::Real(y),
            Object::Real(x + width),
            Object::Real(y + height),
        ])
    }
}

fn encode_utf16_be(s: &str) -> Vec<u8> {
    let mut bytes = vec![0xFE, 0xFF];
    for unit in s.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_display() {
        assert_eq!(ObjectRef::new(7, 0).to_string(), "7 0 R");
    }

    #[test]
    fn test_dict_helper_orders_keys() {
        let obj = Object::dict([("Type", Object::name("Page")), ("Count", Object::Integer(1))]);
        let Object::Dictionary(dict) = obj else {
            panic!("expected a dictionary");
        };
        let keys: Vec<_> = dict.keys().cloned().collect();
        assert_eq!(keys, vec!["Count".to_string(), "Type".to_string()]);
    }

    #[test]
    fn test_ascii_text_is_stored_verbatim() {
        assert_eq!(Object::text("Q3 roadmap"), Object::String(b"Q3 roadmap".to_vec()));
    }

    #[test]
    fn test_non_ascii_text_is_utf16_with_bom() {
        assert_eq!(
            Object::text("Café"),
            Object::String(vec![0xFE, 0xFF, 0x00, 0x43, 0x00, 0x61, 0x00, 0x66, 0x00, 0xE9])
        );
        // Outside the BMP: one surrogate pair.
        assert_eq!(
            Object::text("🚀"),
            Object::String(vec![0xFE, 0xFF, 0xD8, 0x3D, 0xDE, 0x80])
        );
    }
}
