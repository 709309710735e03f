//! Serializer for the restricted XML subset.
//!
//! A pure function of the node tree: attribute values and text are escaped
//! on the way out, structure is taken on faith. Element and attribute names
//! are emitted verbatim; supplying names with markup characters corrupts the
//! output, so callers must stick to identifier-like names (debug builds
//! assert this).

use std::io::Write;

use rdl_convert::xml_escape;

use crate::error::MarkupResult;
use crate::node::Node;

/// The declaration line emitted when headers are enabled.
pub const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>";

/// Indent step for one nesting level.
const INDENT: &str = "  ";

/// Line ending used in indented output.
const CRLF: &str = "\r\n";

/// Writer configuration.
#[derive(Clone, Debug)]
pub struct WriterOptions {
    /// Indent nested elements by two spaces per level, one element per
    /// CRLF-terminated line. When off, elements are concatenated
    /// back-to-back with no inserted whitespace (clipboard/undo buffers).
    pub indent: bool,
    /// Emit the `<?xml ...?>` declaration first.
    pub header: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            indent: true,
            header: true,
        }
    }
}

/// Serializes a [`Node`] tree to a byte stream.
pub struct XmlWriter<W: Write> {
    out: W,
    options: WriterOptions,
}

impl<W: Write> XmlWriter<W> {
    /// Create a writer with default options.
    pub fn new(out: W) -> Self {
        Self::with_options(out, WriterOptions::default())
    }

    /// Create a writer with explicit options.
    pub fn with_options(out: W, options: WriterOptions) -> Self {
        Self { out, options }
    }

    /// Write the whole tree rooted at `node`.
    pub fn write_document(&mut self, node: &Node) -> MarkupResult<()> {
        if self.options.header {
            self.out.write_all(XML_HEADER.as_bytes())?;
            if self.options.indent {
                self.out.write_all(CRLF.as_bytes())?;
            }
        }
        self.write_node(node, 0)?;
        self.out.flush()?;
        Ok(())
    }

    fn write_node(&mut self, node: &Node, depth: usize) -> MarkupResult<()> {
        debug_assert!(is_valid_name(node.name()), "invalid element name");

        self.write_indent(depth)?;
        self.out.write_all(b"<")?;
        self.out.write_all(node.name().as_bytes())?;

        for attr in node.attributes() {
            debug_assert!(is_valid_name(&attr.key), "invalid attribute name");
            self.out.write_all(b" ")?;
            self.out.write_all(attr.key.as_bytes())?;
            self.out.write_all(b"=\"")?;
            self.out.write_all(xml_escape(&attr.value).as_bytes())?;
            self.out.write_all(b"\"")?;
        }

        if node.child_count() > 0 {
            self.out.write_all(b">")?;
            if self.options.indent {
                self.out.write_all(CRLF.as_bytes())?;
            }
            for child in node.children() {
                self.write_node(child, depth + 1)?;
            }
            self.write_indent(depth)?;
            self.out.write_all(b"</")?;
            self.out.write_all(node.name().as_bytes())?;
            self.out.write_all(b">")?;
        } else if !node.value().is_empty() {
            self.out.write_all(b">")?;
            self.out.write_all(xml_escape(node.value()).as_bytes())?;
            self.out.write_all(b"</")?;
            self.out.write_all(node.name().as_bytes())?;
            self.out.write_all(b">")?;
        } else {
            self.out.write_all(b"/>")?;
        }

        if self.options.indent {
            self.out.write_all(CRLF.as_bytes())?;
        }
        Ok(())
    }

    fn write_indent(&mut self, depth: usize) -> MarkupResult<()> {
        if self.options.indent {
            for _ in 0..depth {
                self.out.write_all(INDENT.as_bytes())?;
            }
        }
        Ok(())
    }
}

/// Serialize a tree to a string with the given options.
pub fn write_str(node: &Node, options: WriterOptions) -> String {
    let mut buf = Vec::new();
    XmlWriter::with_options(&mut buf, options)
        .write_document(node)
        .expect("writing to a Vec cannot fail");
    String::from_utf8(buf).expect("writer output is UTF-8")
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '&' | '"' | '/' | '='))
}
