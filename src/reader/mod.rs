//! A module to handle `Reader`

mod scan;
mod source;

use crate::attributes::{AttrSpan, Attributes, MAX_ATTRS};
use crate::errors::Result;
use crate::escape::unescape;
use crate::intern::NameCache;
use source::Buffer;

use std::borrow::Cow;
use std::cell::{OnceCell, RefCell};
use std::io::Read;
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

/// Type of the current node.
///
/// The discriminants are stable and part of the public contract: callers
/// may compare them numerically (`Element = 1`, `Text = 3`,
/// `EndElement = 15`, the usual XML-reader constants).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NodeType {
    /// Start of an element, `<x ...>` or `<x/>`.
    Element = 1,
    /// Non-blank character data between tags.
    Text = 3,
    /// End of an element, `</x>`.
    EndElement = 15,
}

impl NodeType {
    /// Numeric code of this node type.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// User-defined settings that affect scanning, set through
/// [`Reader::config_mut`] before driving the reader.
#[derive(Debug, Clone)]
pub struct Config {
    /// Report the contents of `<![CDATA[...]]>` sections as
    /// [`NodeType::Text`] nodes. CDATA contents are literal, so no entity
    /// expansion is applied to them.
    ///
    /// Default: `false`, CDATA sections are skipped entirely and an element
    /// whose only content is CDATA looks empty.
    pub surface_cdata: bool,

    /// Discard text nodes that consist solely of whitespace.
    ///
    /// Default: `true`.
    pub skip_blank_text: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            surface_cdata: false,
            skip_blank_text: true,
        }
    }
}

/// A forward-only XML pull reader over a memory-resident document.
///
/// Each call to [`read`] advances to the next node: an element start, an
/// element end or a text run. The current node is then inspected in place
/// through [`name`], [`node_type`], [`depth`], [`value`], [`attribute`]
/// and friends; the next advance overwrites it.
///
/// Raw accessors borrow slices of the backing buffer, which makes their
/// lifetime end at the next advance by construction: `read` takes
/// `&mut self`, so no borrowed slice can survive it.
///
/// The reader recovers from malformed input silently: it consumes what it
/// can and reports end of input for the rest. Only opening the document
/// can fail.
///
/// # Examples
///
/// ```
/// use fast_xml_reader::{NodeType, Reader};
///
/// let mut reader = Reader::from_str("<list><item id=\"1\">first</item><item id=\"2\"/></list>");
///
/// let mut items = 0;
/// while reader.read() {
///     if reader.node_type() == Some(NodeType::Element) && reader.name().as_deref() == Some("item") {
///         items += 1;
///         assert_eq!(reader.attribute("id").unwrap(), items.to_string());
///     }
/// }
/// assert_eq!(items, 2);
/// ```
///
/// [`read`]: Self::read
/// [`name`]: Self::name
/// [`node_type`]: Self::node_type
/// [`depth`]: Self::depth
/// [`value`]: Self::value
/// [`attribute`]: Self::attribute
#[derive(Debug)]
pub struct Reader {
    buf: Buffer,
    pos: usize,
    config: Config,

    /// Depth the next sibling or child would see.
    depth: usize,
    /// Depth at which the current node is reported.
    report_depth: usize,
    node_type: Option<NodeType>,
    /// Local name of the current element, empty range for text nodes.
    name: Range<usize>,
    /// Raw text of the current text node, entity expansion deferred.
    text: Range<usize>,
    text_has_entity: bool,
    is_empty: bool,
    attrs: [AttrSpan; MAX_ATTRS],
    attr_count: usize,

    names: RefCell<NameCache>,
    /// Expanded text of the current node, filled at most once per node.
    decoded: OnceCell<String>,
}

impl Reader {
    fn with_buffer(buf: Buffer) -> Reader {
        Reader {
            buf,
            pos: 0,
            config: Config::default(),
            depth: 0,
            report_depth: 0,
            node_type: None,
            name: 0..0,
            text: 0..0,
            text_has_entity: false,
            is_empty: false,
            attrs: [AttrSpan::default(); MAX_ATTRS],
            attr_count: 0,
            names: RefCell::new(NameCache::new()),
            decoded: OnceCell::new(),
        }
    }

    /// Creates a reader over a memory-mapped file.
    ///
    /// The file is mapped read-only with a sequential-access hint. An empty
    /// file yields a reader that immediately reports end of input.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Open`](crate::Error::Open), carrying the path,
    /// when the file cannot be opened, stat'd or mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Reader> {
        Ok(Reader::with_buffer(Buffer::open_path(path.as_ref())?))
    }

    /// Creates a reader by draining a streaming source into a heap buffer.
    ///
    /// The source is read to its end before the reader is returned; this is
    /// not an incremental parser.
    pub fn from_reader<R: Read>(source: R) -> Result<Reader> {
        Ok(Reader::with_buffer(Buffer::drain(source)?))
    }

    /// Creates a reader over an in-memory document, taking ownership of the
    /// bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Reader {
        Reader::with_buffer(Buffer::Heap(bytes))
    }

    /// Creates a reader from a string slice, copying it.
    pub fn from_str(s: &str) -> Reader {
        Reader::from_bytes(s.as_bytes().to_vec())
    }

    /// Gets a reference to the reader configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Gets a mutable reference to the reader configuration.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Advances to the next node.
    ///
    /// Returns `true` when a node was produced and `false` at end of input,
    /// whether by clean exhaustion or after giving up on a truncated tail.
    /// Calling again at end of input keeps returning `false`.
    #[inline]
    pub fn read(&mut self) -> bool {
        self.read_impl()
    }

    /// Drives the reader to end of input, invoking `visit` after each
    /// successful advance.
    ///
    /// For external iteration just call [`read`](Self::read) in a loop; the
    /// reader cannot implement `Iterator` because every node borrows from
    /// it.
    pub fn each<F>(&mut self, mut visit: F)
    where
        F: FnMut(&Reader),
    {
        while self.read() {
            visit(self);
        }
    }

    /// Type of the current node, or `None` before the first advance.
    #[inline]
    pub fn node_type(&self) -> Option<NodeType> {
        self.node_type
    }

    /// Depth at which the current node is reported.
    ///
    /// A document-root element is reported at depth 0, its children at
    /// depth 1, and an end tag at the same depth as its start tag.
    #[inline]
    pub fn depth(&self) -> usize {
        self.report_depth
    }

    /// `true` if the current element is empty: written `<x/>` or collapsed
    /// from an immediately-closed `<x></x>` pair. No end-element node
    /// follows an empty element.
    #[inline]
    pub fn is_empty_element(&self) -> bool {
        self.is_empty
    }

    /// Byte offset of the cursor into the backing buffer.
    #[inline]
    pub fn buffer_position(&self) -> usize {
        self.pos
    }

    /// Local name of the current node as a raw slice into the buffer, with
    /// any namespace prefix stripped. `None` for text nodes.
    pub fn name_bytes(&self) -> Option<&[u8]> {
        if self.name.is_empty() {
            None
        } else {
            Some(&self.buf.as_bytes()[self.name.clone()])
        }
    }

    /// Interned local name of the current node. `None` for text nodes.
    ///
    /// Repeated occurrences of the same element name normally share one
    /// allocation, so handles can be compared cheaply. The interning table
    /// is bounded: on hash-bucket overflow a fresh unshared handle is
    /// returned, so correctness may not depend on pointer identity.
    pub fn name(&self) -> Option<Arc<str>> {
        self.name_bytes()
            .map(|bytes| self.names.borrow_mut().intern(bytes))
    }

    /// Raw text of the current text node, entities not yet expanded.
    /// `None` for element and end-element nodes.
    pub fn text_bytes(&self) -> Option<&[u8]> {
        if self.text.is_empty() {
            None
        } else {
            Some(&self.buf.as_bytes()[self.text.clone()])
        }
    }

    /// Text of the current text node with entities expanded. `None` for
    /// element and end-element nodes.
    ///
    /// Entity-free text borrows straight from the buffer. Text containing
    /// `&` is expanded once and memoized, so repeat calls for the same node
    /// return the same value without re-decoding. Ill-formed UTF-8
    /// (including out-of-range numeric references) is replaced with
    /// `U+FFFD`.
    pub fn value(&self) -> Option<Cow<'_, str>> {
        let raw = self.text_bytes()?;
        if self.text_has_entity {
            let decoded = self
                .decoded
                .get_or_init(|| String::from_utf8_lossy(&unescape(raw)).into_owned());
            Some(Cow::Borrowed(decoded.as_str()))
        } else {
            Some(String::from_utf8_lossy(raw))
        }
    }

    /// Value of the first attribute with the given name, entities expanded.
    ///
    /// Names match byte-for-byte as written in the document (prefixes
    /// included). Returns `None` when the current node has no such
    /// attribute.
    pub fn attribute(&self, name: impl AsRef<[u8]>) -> Option<Cow<'_, str>> {
        let needle = name.as_ref();
        let data = self.buf.as_bytes();
        self.attrs[..self.attr_count]
            .iter()
            .find(|span| &data[span.name_start..span.name_end] == needle)
            .map(|span| {
                let value = &data[span.value_start..span.value_end];
                if span.has_entity {
                    Cow::Owned(String::from_utf8_lossy(&unescape(value)).into_owned())
                } else {
                    String::from_utf8_lossy(value)
                }
            })
    }

    /// Raw value of the first attribute with the given name, entities not
    /// expanded.
    pub fn attribute_bytes(&self, name: impl AsRef<[u8]>) -> Option<&[u8]> {
        let needle = name.as_ref();
        let data = self.buf.as_bytes();
        self.attrs[..self.attr_count]
            .iter()
            .find(|span| &data[span.name_start..span.name_end] == needle)
            .map(|span| &data[span.value_start..span.value_end])
    }

    /// Iterator over the attributes kept for the current element, in
    /// document order.
    ///
    /// Namespace declarations (`xmlns`, `xmlns:*`) are never reported, and
    /// at most the first 32 attributes of an element are kept.
    pub fn attributes(&self) -> Attributes<'_> {
        Attributes::new(self.buf.as_bytes(), &self.attrs[..self.attr_count])
    }

    /// Releases the backing buffer (unmapping or freeing it) and clears the
    /// current node. Subsequent [`read`](Self::read) calls report end of
    /// input.
    ///
    /// Dropping the reader releases the buffer as well; `close` only makes
    /// the release explicit and early.
    pub fn close(&mut self) {
        self.buf = Buffer::Released;
        self.node_type = None;
        self.name = 0..0;
        self.text = 0..0;
        self.text_has_entity = false;
        self.attr_count = 0;
        self.is_empty = false;
        self.decoded.take();
    }
}
