//! PDF content stream builder.
//!
//! Pages of an exported document carry a single painted image, so the
//! builder only needs graphics-state, transform and XObject operators
//! (ISO 32000-1 §8.4, §8.8).

use std::io::{self, Write};

/// Operations that can be added to a content stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentStreamOp {
    /// Save graphics state (q)
    SaveState,
    /// Restore graphics state (Q)
    RestoreState,
    /// Concatenate transformation matrix (cm)
    Transform(f64, f64, f64, f64, f64, f64),
    /// Paint XObject (Do)
    PaintXObject(String),
}

/// Builder for PDF content streams.
#[derive(Debug, Default, Clone)]
pub struct ContentStreamBuilder {
    operations: Vec<ContentStreamOp>,
}

impl ContentStreamBuilder {
    /// Create a new content stream builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an operation to the stream.
    pub fn op(&mut self, op: ContentStreamOp) -> &mut Self {
        self.operations.push(op);
        self
    }

    /// Paint image XObject `resource_id` into the box whose lower-left corner
    /// is `(x, y)`, all values in points.
    pub fn draw_image(
        &mut self,
        resource_id: &str,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> &mut Self {
        self.op(ContentStreamOp::SaveState)
            .op(ContentStreamOp::Transform(width, 0.0, 0.0, height, x, y))
            .op(ContentStreamOp::PaintXObject(resource_id.to_string()))
            .op(ContentStreamOp::RestoreState)
    }

    /// Build the content stream to bytes.
    pub fn build(&self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        for op in &self.operations {
            write_op(&mut buf, op)?;
            writeln!(buf)?;
        }
        Ok(buf)
    }
}

fn write_op<W: Write>(w: &mut W, op: &ContentStreamOp) -> io::Result<()> {
    match op {
        ContentStreamOp::SaveState => write!(w, "q"),
        ContentStreamOp::RestoreState => write!(w, "Q"),
        ContentStreamOp::Transform(a, b, c, d, e, f) => {
            write!(
                w,
                "{} {} {} {} {} {} cm",
                fmt_num(*a),
                fmt_num(*b),
                fmt_num(*c),
                fmt_num(*d),
                fmt_num(*e),
                fmt_num(*f)
            )
        },
        ContentStreamOp::PaintXObject(name) => write!(w, "/{} Do", name),
    }
}

/// Four decimals are well below a printer dot at PDF point scale.
fn fmt_num(value: f64) -> String {
    let formatted = format!("{:.4}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
