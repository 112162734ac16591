//! Serializer with per-node output caching

use std::fmt::Write as _;

use crate::document::{Document, MAX_DEPTH};
use crate::error::{JsonError, JsonResult};
use crate::node::{Kind, NodeId, PrintCache};

/// Output layout for serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Format {
    /// No whitespace at all; the layout used on the wire
    #[default]
    Compact,
    /// Objects are broken over lines and indented with tabs
    Pretty,
}

impl Document {
    /// Serialize the subtree rooted at `id`
    pub fn render(&self, id: NodeId, format: Format) -> JsonResult<String> {
        let mut out = String::new();
        self.write_value(&mut out, id, 0, format)?;
        Ok(out)
    }

    /// Serialize the subtree rooted at `id`, reusing cached text when valid
    ///
    /// The text is kept on the node until the next mutation of the document
    /// or a request for a different format.
    pub fn print(&mut self, id: NodeId, format: Format) -> JsonResult<&str> {
        if !self.is_cached(id, format) {
            let text = self.render(id, format)?;
            let revision = self.revision;
            self.get_mut(id)?.cache = Some(PrintCache {
                format,
                revision,
                text,
            });
        }
        Ok(self
            .get(id)?
            .cache
            .as_ref()
            .map(|cache| cache.text.as_str())
            .unwrap_or_default())
    }

    /// Check if [`Document::print`] would return cached text for `id`
    pub fn is_cached(&self, id: NodeId, format: Format) -> bool {
        self.node(id)
            .and_then(|node| node.cache.as_ref())
            .is_some_and(|cache| cache.format == format && cache.revision == self.revision)
    }

    fn write_value(&self, out: &mut String, id: NodeId, depth: usize, format: Format) -> JsonResult<()> {
        if depth > MAX_DEPTH {
            return Err(JsonError::TooDeep { limit: MAX_DEPTH });
        }
        self.get(id)?;
        let Some(node) = self.data(id) else {
            out.push_str("null");
            return Ok(());
        };
        match node.kind {
            Kind::Null => out.push_str("null"),
            Kind::False => out.push_str("false"),
            Kind::True => out.push_str("true"),
            Kind::Number => {
                let _ = write!(out, "{}", node.number);
            }
            Kind::String => write_escaped(out, node.text.as_deref().unwrap_or_default()),
            Kind::Array => self.write_array(out, id, depth, format)?,
            Kind::Object => self.write_object(out, id, depth + 1, format)?,
        }
        Ok(())
    }

    fn write_array(&self, out: &mut String, id: NodeId, depth: usize, format: Format) -> JsonResult<()> {
        out.push('[');
        for (i, child) in self.children(id).enumerate() {
            if i > 0 {
                out.push(',');
                if format == Format::Pretty {
                    out.push(' ');
                }
            }
            self.write_value(out, child, depth + 1, format)?;
        }
        out.push(']');
        Ok(())
    }

    fn write_object(&self, out: &mut String, id: NodeId, depth: usize, format: Format) -> JsonResult<()> {
        let pretty = format == Format::Pretty;
        out.push('{');
        if pretty {
            out.push('\n');
        }
        let mut members = self.children(id).peekable();
        while let Some(member) = members.next() {
            if pretty {
                indent(out, depth);
            }
            write_escaped(out, self.name(member).unwrap_or_default());
            out.push(':');
            if pretty {
                out.push('\t');
            }
            self.write_value(out, member, depth, format)?;
            if members.peek().is_some() {
                out.push(',');
            }
            if pretty {
                out.push('\n');
            }
        }
        if pretty {
            indent(out, depth - 1);
        }
        out.push('}');
        Ok(())
    }
}

fn indent(out: &mut String, depth: usize) {
    out.extend(std::iter::repeat_n('\t', depth));
}

/// Write `text` as a quoted JSON string
fn write_escaped(out: &mut String, text: &str) {
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if u32::from(c) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
