//! The advance state machine.
//!
//! One decision per advance, driven by the byte at the cursor: text runs to
//! the next `<`; markup dispatches on the byte after `<`. Comments,
//! processing instructions, CDATA sections and DOCTYPE declarations produce
//! no node and restart the loop. Malformed input is never an error, the
//! scanner consumes what it can and reports end of input for the rest.

use crate::attributes::{AttrSpan, MAX_ATTRS};
use crate::parser::{
    cdata_span, is_blank, is_whitespace, skip_comment, skip_doctype, skip_pi, skip_spaces,
};
use crate::reader::{NodeType, Reader};

use memchr::memchr;
use std::ops::Range;

impl Reader {
    pub(super) fn read_impl(&mut self) -> bool {
        // Per-node state resets even when this advance reports end of input
        self.decoded.take();
        self.text = 0..0;
        self.text_has_entity = false;
        self.attr_count = 0;

        loop {
            let data = self.buf.as_bytes();
            if self.pos >= data.len() {
                return false;
            }

            if data[self.pos] != b'<' {
                // Text: runs to the next `<` or to the end of input
                let start = self.pos;
                let end = match memchr(b'<', &data[start..]) {
                    Some(i) => start + i,
                    None => data.len(),
                };
                self.pos = end;
                if self.config.skip_blank_text && is_blank(&data[start..end]) {
                    continue;
                }
                self.emit_text(start..end);
                return true;
            }

            self.pos += 1;
            if self.pos >= data.len() {
                return false;
            }

            match data[self.pos] {
                b'/' => return self.read_end_tag(),
                b'!' if data[self.pos..].starts_with(b"!--") => {
                    self.pos = skip_comment(data, self.pos + 3);
                }
                b'!' if data[self.pos..].starts_with(b"![CDATA[") => {
                    let (content_end, after) = cdata_span(data, self.pos + 8);
                    let start = self.pos + 8;
                    self.pos = after;
                    if self.config.surface_cdata && content_end > start {
                        // CDATA contents are literal, no entity scan
                        self.emit_text(start..content_end);
                        return true;
                    }
                }
                b'!' if data[self.pos + 1..].starts_with(b"DOCTYPE") => {
                    self.pos = skip_doctype(data, self.pos + 8);
                }
                b'?' => {
                    self.pos = skip_pi(data, self.pos + 1);
                }
                _ => return self.read_start_tag(),
            }
        }
    }

    /// Records a text node spanning `range` at the current depth.
    fn emit_text(&mut self, range: Range<usize>) {
        let data = self.buf.as_bytes();
        self.text_has_entity = memchr(b'&', &data[range.clone()]).is_some();
        self.text = range;
        self.name = 0..0;
        self.is_empty = false;
        self.node_type = Some(NodeType::Text);
        self.report_depth = self.depth;
    }

    /// Cursor sits at the `/` of `</name>`. Consumes through the `>`.
    fn read_end_tag(&mut self) -> bool {
        let data = self.buf.as_bytes();
        let name_start = self.pos + 1;
        let gt = match memchr(b'>', &data[name_start..]) {
            Some(i) => name_start + i,
            None => {
                // Unterminated closing tag, give up on the tail
                self.pos = data.len();
                return false;
            }
        };
        self.pos = gt + 1;
        self.name = local_name(data, name_start..gt);
        self.node_type = Some(NodeType::EndElement);
        self.is_empty = false;
        self.depth = self.depth.saturating_sub(1);
        self.report_depth = self.depth;
        true
    }

    /// Cursor sits at the first byte of the element name. Consumes through
    /// the tag terminator, or further when the element collapses with an
    /// immediately following matching close tag.
    fn read_start_tag(&mut self) -> bool {
        let data = self.buf.as_bytes();
        let name_start = self.pos;
        while self.pos < data.len() {
            match data[self.pos] {
                b' ' | b'\t' | b'\n' | b'\r' | b'>' | b'/' => break,
                _ => self.pos += 1,
            }
        }
        self.name = local_name(data, name_start..self.pos);
        self.node_type = Some(NodeType::Element);

        self.parse_attrs();

        // Collapse `<x></x>` into a single empty element: peek at an
        // immediately following close tag and compare local names.
        if !self.is_empty {
            let data = self.buf.as_bytes();
            if data[self.pos..].starts_with(b"</") {
                let peek_start = self.pos + 2;
                if let Some(i) = memchr(b'>', &data[peek_start..]) {
                    let gt = peek_start + i;
                    let close = local_name(data, peek_start..gt);
                    if data[close] == data[self.name.clone()] {
                        self.is_empty = true;
                        self.pos = gt + 1;
                    }
                }
            }
        }

        self.report_depth = self.depth;
        if !self.is_empty {
            self.depth += 1;
        }
        true
    }

    /// Parses `name="value"` pairs up to and past the `>` or `/>`
    /// terminator, filling the bounded attribute table.
    ///
    /// Attributes without `=` or an opening quote are abandoned, namespace
    /// declarations are dropped, and attributes past the table capacity are
    /// silently ignored.
    fn parse_attrs(&mut self) {
        self.attr_count = 0;
        self.is_empty = false;
        let data = self.buf.as_bytes();

        loop {
            self.pos = skip_spaces(data, self.pos);
            if self.pos >= data.len() {
                return;
            }

            match data[self.pos] {
                b'>' => {
                    self.pos += 1;
                    return;
                }
                b'/' => {
                    self.is_empty = true;
                    self.pos += 1;
                    if data.get(self.pos) == Some(&b'>') {
                        self.pos += 1;
                    }
                    return;
                }
                _ => (),
            }

            let name_start = self.pos;
            while self.pos < data.len() {
                match data[self.pos] {
                    b'=' | b' ' | b'\t' | b'\n' | b'\r' | b'>' | b'/' => break,
                    _ => self.pos += 1,
                }
            }
            let name_end = self.pos;

            self.pos = skip_spaces(data, self.pos);
            if self.pos >= data.len() || data[self.pos] != b'=' {
                // No value follows, abandon this attribute
                continue;
            }
            self.pos += 1;
            self.pos = skip_spaces(data, self.pos);
            if self.pos >= data.len() {
                return;
            }

            let quote = data[self.pos];
            if quote != b'"' && quote != b'\'' {
                continue;
            }
            self.pos += 1;

            let value_start = self.pos;
            let value_end = match memchr(quote, &data[value_start..]) {
                Some(i) => value_start + i,
                None => {
                    // Unterminated value, give up on the tail
                    self.pos = data.len();
                    return;
                }
            };
            self.pos = value_end + 1;

            let name = &data[name_start..name_end];
            if name == b"xmlns" || name.starts_with(b"xmlns:") {
                continue;
            }

            if self.attr_count < MAX_ATTRS {
                self.attrs[self.attr_count] = AttrSpan {
                    name_start,
                    name_end,
                    value_start,
                    value_end,
                    has_entity: memchr(b'&', &data[value_start..value_end]).is_some(),
                };
                self.attr_count += 1;
            }
        }
    }
}

/// Reduces a raw tag-name range to the local name: drops everything up to
/// and including the first `:`, then trims trailing whitespace (closing
/// tags may carry it, as in `</a >`).
fn local_name(data: &[u8], mut range: Range<usize>) -> Range<usize> {
    if let Some(colon) = memchr(b':', &data[range.clone()]) {
        range.start += colon + 1;
    }
    while range.end > range.start && is_whitespace(data[range.end - 1]) {
        range.end -= 1;
    }
    range
}
