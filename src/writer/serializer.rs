//! PDF object serialization.
//!
//! Writes [`Object`] values in PDF syntax (ISO 32000-1 §7.3).

use super::object::{Dict, Object};
use std::io::{self, Write};

/// Serializer for PDF objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectSerializer;

impl ObjectSerializer {
    /// Create a serializer.
    pub fn new() -> Self {
        Self
    }

    /// Write an indirect object definition: `{id} 0 obj … endobj`.
    pub fn write_indirect<W: Write>(&self, w: &mut W, id: u32, obj: &Object) -> io::Result<()> {
        writeln!(w, "{} 0 obj", id)?;
        self.write_object(w, obj)?;
        write!(w, "\nendobj\n")
    }

    /// Write any object.
    pub fn write_object<W: Write>(&self, w: &mut W, obj: &Object) -> io::Result<()> {
        match obj {
            Object::Integer(i) => write!(w, "{}", i),
            Object::Real(r) => write_real(w, *r),
            Object::String(s) => write_string(w, s),
            Object::Name(n) => write_name(w, n),
            Object::Array(items) => {
                write!(w, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(w, " ")?;
                    }
                    self.write_object(w, item)?;
                }
                write!(w, "]")
            },
            Object::Dictionary(dict) => self.write_dict(w, dict),
            Object::Stream { dict, data } => {
                let mut dict = dict.clone();
                dict.insert("Length".to_string(), Object::Integer(data.len() as i64));
                self.write_dict(w, &dict)?;
                write!(w, "\nstream\n")?;
                w.write_all(data)?;
                write!(w, "\nendstream")
            },
            Object::Reference(r) => write!(w, "{}", r),
        }
    }

    fn write_dict<W: Write>(&self, w: &mut W, dict: &Dict) -> io::Result<()> {
        write!(w, "<<")?;
        for (key, value) in dict {
            write_name(w, key)?;
            write!(w, " ")?;
            self.write_object(w, value)?;
        }
        write!(w, ">>")
    }
}

/// Reals are written with at most five decimals, trailing zeros trimmed.
fn write_real<W: Write>(w: &mut W, value: f64) -> io::Result<()> {
    if value.fract() == 0.0 {
        return write!(w, "{}", value as i64);
    }
    let formatted = format!("{:.5}", value);
    write!(w, "{}", formatted.trim_end_matches('0').trim_end_matches('.'))
}

/// Printable ASCII becomes a literal string; anything else a hex string.
fn write_string<W: Write>(w: &mut W, data: &[u8]) -> io::Result<()> {
    let printable = data.iter().all(|&b| (0x20..=0x7E).contains(&b));
    if !printable {
        write!(w, "<")?;
        for byte in data {
            write!(w, "{:02X}", byte)?;
        }
        return write!(w, ">");
    }

    write!(w, "(")?;
    for &byte in data {
        match byte {
            b'(' | b')' | b'\\' => w.write_all(&[b'\\', byte])?,
            _ => w.write_all(&[byte])?,
        }
    }
    write!(w, ")")
}

fn write_name<W: Write>(w: &mut W, name: &str) -> io::Result<()> {
    write!(w, "/")?;
    for byte in name.bytes() {
        let delimiter = matches!(
            byte,
            b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%' | b'#'
        );
        if byte.is_ascii_graphic() && !delimiter {
            w.write_all(&[byte])?;
        } else {
            write!(w, "#{:02X}", byte)?;
        }
    }
    Ok(())
}
