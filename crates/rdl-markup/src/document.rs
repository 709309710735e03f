//! A markup document: one root node plus formatting flags.

use std::io::{Read, Write};

use crate::error::MarkupResult;
use crate::node::Node;
use crate::reader::{ReaderOptions, XmlReader};
use crate::writer::{write_str, WriterOptions, XmlWriter};

/// Wraps a root [`Node`] and owns the document's formatting flags.
#[derive(Debug)]
pub struct Document {
    root: Node,
    /// Indent nested elements on save.
    pub auto_indent: bool,
    /// Emit the `<?xml ...?>` declaration on save.
    pub write_header: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document with an unnamed root.
    pub fn new() -> Self {
        Self {
            root: Node::default(),
            auto_indent: true,
            write_header: true,
        }
    }

    /// The root node.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Mutable access to the root node.
    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    /// Replace the root node.
    pub fn set_root(&mut self, root: Node) {
        self.root = root;
    }

    /// Parse a stream, replacing the current tree. On error the previous
    /// tree is kept; no partial tree is ever installed.
    pub fn load(&mut self, reader: impl Read) -> MarkupResult<()> {
        self.load_with(reader, ReaderOptions::default())
    }

    /// Parse a stream with explicit reader options.
    pub fn load_with(&mut self, reader: impl Read, options: ReaderOptions) -> MarkupResult<()> {
        self.root = XmlReader::with_options(reader, options).read_document()?;
        Ok(())
    }

    /// Parse from a string.
    pub fn load_str(&mut self, text: &str) -> MarkupResult<()> {
        self.load(text.as_bytes())
    }

    /// Stream the current tree out using the document's formatting flags.
    pub fn save(&self, writer: impl Write) -> MarkupResult<()> {
        XmlWriter::with_options(writer, self.writer_options()).write_document(&self.root)
    }

    /// Serialize the current tree to a string.
    pub fn save_to_string(&self) -> String {
        write_str(&self.root, self.writer_options())
    }

    /// Drop the whole tree, keeping the formatting flags.
    pub fn clear(&mut self) {
        self.root = Node::default();
    }

    fn writer_options(&self) -> WriterOptions {
        WriterOptions {
            indent: self.auto_indent,
            header: self.write_header,
        }
    }
}
