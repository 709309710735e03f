//! Streaming parser for the restricted XML subset.
//!
//! The reader is a single forward-only scan over an [`io::Read`] stream with
//! a one-character pushback slot. It decodes UTF-8 incrementally from a
//! fixed-size byte buffer, so arbitrarily large documents parse without ever
//! holding the whole input in memory. Grammar violations are fatal: the
//! reader returns [`MarkupError::Malformed`] and no partial tree.

use std::io::{self, Read};

use rdl_convert::xml_unescape;

use crate::error::{MarkupError, MarkupResult};
use crate::node::{IStr, Node};
use crate::pool::StringPool;

const BUF_SIZE: usize = 8 * 1024;

/// Parser configuration.
#[derive(Clone, Debug, Default)]
pub struct ReaderOptions {
    /// Intern all parsed names and attribute strings in a [`StringPool`]
    /// so repeated strings share one allocation. Costs a hash lookup per
    /// string; off by default.
    pub intern: bool,
}

/// Incremental UTF-8 decoder over a byte stream with one char of pushback.
struct CharSource<R: Read> {
    inner: R,
    buf: Vec<u8>,
    pos: usize,
    len: usize,
    /// Bytes consumed so far, for error positions.
    offset: u64,
    pushback: Option<char>,
}

impl<R: Read> CharSource<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            buf: vec![0; BUF_SIZE],
            pos: 0,
            len: 0,
            offset: 0,
            pushback: None,
        }
    }

    fn fill(&mut self) -> MarkupResult<bool> {
        loop {
            match self.inner.read(&mut self.buf) {
                Ok(n) => {
                    self.pos = 0;
                    self.len = n;
                    return Ok(n > 0);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn next_byte(&mut self) -> MarkupResult<Option<u8>> {
        if self.pos == self.len && !self.fill()? {
            return Ok(None);
        }
        let b = self.buf[self.pos];
        self.pos += 1;
        self.offset += 1;
        Ok(Some(b))
    }

    /// Next character, or `None` at end of stream.
    fn next(&mut self) -> MarkupResult<Option<char>> {
        if let Some(c) = self.pushback.take() {
            self.offset += c.len_utf8() as u64;
            return Ok(Some(c));
        }
        let b0 = match self.next_byte()? {
            Some(b) => b,
            None => return Ok(None),
        };
        if b0 < 0x80 {
            return Ok(Some(b0 as char));
        }
        let width = match b0 {
            0xC2..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF4 => 4,
            _ => return Err(MarkupError::malformed(self.offset, "invalid UTF-8")),
        };
        let mut bytes = [b0, 0, 0, 0];
        for slot in bytes.iter_mut().take(width).skip(1) {
            *slot = self.next_byte()?.ok_or_else(|| {
                MarkupError::malformed(self.offset, "end of stream inside UTF-8 sequence")
            })?;
        }
        let decoded = std::str::from_utf8(&bytes[..width])
            .map_err(|_| MarkupError::malformed(self.offset, "invalid UTF-8"))?;
        Ok(decoded.chars().next())
    }

    /// Push one character back; the next call to `next` returns it.
    fn push_back(&mut self, c: char) {
        debug_assert!(self.pushback.is_none(), "pushback slot already occupied");
        self.offset -= c.len_utf8() as u64;
        self.pushback = Some(c);
    }
}

/// Streaming parser producing a [`Node`] tree.
pub struct XmlReader<R: Read> {
    src: CharSource<R>,
    pool: Option<StringPool>,
    /// Reusable token accumulator for names and attribute strings.
    token: String,
}

impl<R: Read> XmlReader<R> {
    /// Create a reader with default options.
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, ReaderOptions::default())
    }

    /// Create a reader with explicit options.
    pub fn with_options(reader: R, options: ReaderOptions) -> Self {
        Self {
            src: CharSource::new(reader),
            pool: options.intern.then(StringPool::new),
            token: String::new(),
        }
    }

    /// Parse the whole stream into a node tree.
    ///
    /// The input must begin with a `<?xml ...?>` declaration, contain
    /// exactly one root element, and carry nothing but whitespace and
    /// comments outside it.
    pub fn read_document(mut self) -> MarkupResult<Node> {
        self.read_prologue()?;

        let mut root: Option<Node> = None;
        loop {
            match self.next_non_ws()? {
                None => break,
                Some('<') => {
                    let c = self.next_required("after '<'")?;
                    match c {
                        '!' => self.skip_comment()?,
                        '/' => return Err(self.malformed("unexpected end tag")),
                        '?' => return Err(self.malformed("unexpected declaration")),
                        _ => {
                            self.src.push_back(c);
                            if root.is_some() {
                                return Err(self.malformed("multiple root elements"));
                            }
                            root = Some(self.read_element()?);
                        }
                    }
                }
                Some(_) => return Err(self.malformed("text outside root element")),
            }
        }
        root.ok_or_else(|| self.malformed("missing root element"))
    }

    // ---- prologue ------------------------------------------------------

    fn read_prologue(&mut self) -> MarkupResult<()> {
        let missing = "missing ?xml prologue";
        match self.next_non_ws()? {
            Some('<') => {}
            _ => return Err(self.malformed(missing)),
        }
        if self.next_required(missing)? != '?' {
            return Err(self.malformed(missing));
        }
        for expected in ['x', 'm', 'l'] {
            if self.next_required(missing)? != expected {
                return Err(self.malformed(missing));
            }
        }
        // The declaration body (version, encoding) is not validated.
        loop {
            match self.src.next()? {
                Some('>') => return Ok(()),
                Some(_) => {}
                None => return Err(self.malformed("unterminated declaration")),
            }
        }
    }

    // ---- elements ------------------------------------------------------

    /// Parse one element. The leading `<` and any lookahead character have
    /// already been consumed and pushed back; the next character starts the
    /// element name.
    fn read_element(&mut self) -> MarkupResult<Node> {
        let name = self.read_name()?;
        if name.is_empty() {
            return Err(self.malformed("empty element name"));
        }
        let mut node = Node::with_name(name);

        // Attribute list, up to `>` or `/>`.
        loop {
            match self.next_non_ws()? {
                None => return Err(self.malformed("end of stream inside element")),
                Some('/') => {
                    self.expect('>', "after '/' in element")?;
                    return Ok(node);
                }
                Some('>') => break,
                Some('<') => return Err(self.malformed("unexpected '<' inside element")),
                Some(c) => {
                    self.src.push_back(c);
                    self.read_attribute(&mut node)?;
                }
            }
        }

        // Element body: text, children and comments, up to the end tag.
        let mut text = String::new();
        loop {
            let c = self.next_required("inside element body")?;
            if c != '<' {
                text.push(c);
                continue;
            }
            let c = self.next_required("after '<' in element body")?;
            match c {
                '/' => {
                    let end_name = self.read_name()?;
                    match self.next_non_ws()? {
                        Some('>') => {}
                        _ => return Err(self.malformed("unterminated end tag")),
                    }
                    if !end_name.eq_ignore_ascii_case(node.name()) {
                        return Err(self.malformed(format!(
                            "end tag </{}> does not match <{}>",
                            end_name,
                            node.name()
                        )));
                    }
                    break;
                }
                '!' => self.skip_comment()?,
                '?' => return Err(self.malformed("unexpected declaration")),
                _ => {
                    self.src.push_back(c);
                    let child = self.read_element()?;
                    node.add_child(child);
                }
            }
        }

        // Whitespace between child elements is formatting, not content; a
        // node carries either children or a text value, never both.
        if node.child_count() == 0 && !text.is_empty() {
            let decoded = self.unescape(&text)?;
            node.set_value_interned(self.make_istr(&decoded));
        }
        Ok(node)
    }

    fn read_attribute(&mut self, node: &mut Node) -> MarkupResult<()> {
        let key = self.read_name()?;
        if key.is_empty() {
            return Err(self.malformed("empty attribute name"));
        }
        match self.next_non_ws()? {
            Some('=') => {}
            _ => return Err(self.malformed("expected '=' after attribute name")),
        }
        match self.next_non_ws()? {
            Some('"') => {}
            _ => return Err(self.malformed("expected '\"' to open attribute value")),
        }

        self.token.clear();
        loop {
            match self.src.next()? {
                Some('"') => break,
                Some('<') => return Err(self.malformed("unexpected '<' in attribute value")),
                Some(c) => self.token.push(c),
                None => return Err(self.malformed("end of stream inside attribute value")),
            }
        }
        let raw = std::mem::take(&mut self.token);
        let value = self.unescape(&raw)?;
        self.token = raw;

        let value = self.make_istr(&value);
        node.set_prop_interned(key, value);
        Ok(())
    }

    /// Accumulate a name token: characters up to whitespace, `/`, `>` or
    /// `=`, which is pushed back for the caller.
    fn read_name(&mut self) -> MarkupResult<IStr> {
        self.token.clear();
        loop {
            match self.src.next()? {
                None => break,
                Some(c) if c.is_whitespace() || matches!(c, '/' | '>' | '=') => {
                    self.src.push_back(c);
                    break;
                }
                Some('<') => return Err(self.malformed("unexpected '<' in name")),
                Some('"') => return Err(self.malformed("unexpected '\"' in name")),
                Some(c) => self.token.push(c),
            }
        }
        let name = std::mem::take(&mut self.token);
        let interned = self.make_istr(&name);
        self.token = name;
        Ok(interned)
    }

    /// Skip a `<!-- ... -->` comment. The `<!` prefix has been consumed.
    fn skip_comment(&mut self) -> MarkupResult<()> {
        for _ in 0..2 {
            if self.next_required("in comment")? != '-' {
                return Err(self.malformed("malformed comment open"));
            }
        }
        let mut dashes = 0u8;
        loop {
            match self.next_required("inside comment")? {
                '-' => dashes = (dashes + 1).min(2),
                '>' if dashes >= 2 => return Ok(()),
                _ => dashes = 0,
            }
        }
    }

    // ---- low-level helpers ---------------------------------------------

    fn make_istr(&mut self, s: &str) -> IStr {
        match &mut self.pool {
            Some(pool) => pool.intern(s),
            None => IStr::from(s),
        }
    }

    fn unescape(&self, raw: &str) -> MarkupResult<String> {
        xml_unescape(raw)
            .map_err(|e| MarkupError::malformed(self.src.offset, format!("bad escape: {e}")))
    }

    /// Next character skipping whitespace.
    fn next_non_ws(&mut self) -> MarkupResult<Option<char>> {
        loop {
            match self.src.next()? {
                Some(c) if c.is_whitespace() => continue,
                other => return Ok(other),
            }
        }
    }

    /// Next character; end of stream is malformed with the given context.
    fn next_required(&mut self, context: &str) -> MarkupResult<char> {
        self.src.next()?.ok_or_else(|| {
            MarkupError::malformed(self.src.offset, format!("unexpected end of stream {context}"))
        })
    }

    fn expect(&mut self, expected: char, context: &str) -> MarkupResult<()> {
        let c = self.next_required(context)?;
        if c != expected {
            return Err(self.malformed(format!("expected '{expected}' {context}")));
        }
        Ok(())
    }

    fn malformed(&self, reason: impl Into<String>) -> MarkupError {
        MarkupError::malformed(self.src.offset, reason)
    }
}

/// Parse a complete document from a string.
pub fn parse_str(text: &str) -> MarkupResult<Node> {
    XmlReader::new(text.as_bytes()).read_document()
}
