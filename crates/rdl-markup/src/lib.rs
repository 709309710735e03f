//! Markup engine for RDL report documents.
//!
//! This crate implements the document format's custom markup layer: a
//! restricted XML subset parsed by a hand-written, single-pass streaming
//! reader and emitted by a writer with optional indentation. It is *not* a
//! general XML parser; the grammar is exactly what report documents use:
//!
//! ```text
//! <?xml version="1.0" encoding="utf-8"?>
//! <Report attr="value">
//!   <Page Name="Page1"/>
//!   <!-- comments are skipped -->
//! </Report>
//! ```
//!
//! # Key Types
//!
//! - [`Node`] — one markup element (name, attributes, children, text value)
//! - [`Document`] — a root node plus formatting flags
//! - [`XmlReader`] / [`ReaderOptions`] — streaming parser
//! - [`XmlWriter`] / [`WriterOptions`] — tree serializer
//! - [`MarkupError`] — malformed-document and I/O failures
//!
//! # Design Rules
//!
//! 1. Parsing is forward-only with one character of pushback; the input is
//!    never materialized as a single string.
//! 2. Any grammar violation is fatal: no recovery, no partial tree.
//! 3. The writer escapes attribute values and text, never names; callers
//!    must supply valid identifiers as names.
//! 4. Child order is insertion order and is preserved across round trips.

pub mod document;
pub mod error;
pub mod node;
pub mod pool;
pub mod reader;
pub mod writer;

pub use document::Document;
pub use error::{MarkupError, MarkupResult};
pub use node::{Attribute, IStr, Node};
pub use pool::StringPool;
pub use reader::{parse_str, ReaderOptions, XmlReader};
pub use writer::{write_str, WriterOptions, XmlWriter, XML_HEADER};
