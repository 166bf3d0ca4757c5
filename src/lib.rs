//! Forward-only XML pull reader optimized for large documents.
//!
//! ## Description
//!
//! - [`Reader`]: a pull reader over a memory-resident document. Each call
//!   to [`Reader::read`] advances to the next node (element start, element
//!   end or text); the caller then inspects the current node's name, depth,
//!   attributes and text in place before advancing again.
//!
//! The design trades XML-specification completeness for throughput on
//! well-formed, ASCII-heavy documents such as catalogs, data dumps and
//! feeds. Text and attribute values stay slices into the source buffer
//! until a caller asks for them, the five predefined entities and numeric
//! character references are expanded lazily, and repeated element names are
//! interned so they can be compared by identity. Malformed input is
//! tolerated silently: the reader consumes what it can and then reports
//! end of input.
//!
//! Whole files are memory-mapped read-only ([`Reader::open`]); streaming
//! sources are drained into a single heap buffer up front
//! ([`Reader::from_reader`]). There is no incremental parsing mode.
//!
//! ## Example
//!
//! ```rust
//! use fast_xml_reader::{NodeType, Reader};
//!
//! let xml = r#"<catalog>
//!                 <book id="b1"><title>Dune</title></book>
//!                 <book id="b2"/>
//!             </catalog>"#;
//!
//! let mut reader = Reader::from_str(xml);
//!
//! let mut books = Vec::new();
//! let mut titles = Vec::new();
//! // The `Reader` does not implement `Iterator` because every node borrows from it
//! while reader.read() {
//!     match reader.node_type() {
//!         Some(NodeType::Element) if reader.name().as_deref() == Some("book") => {
//!             books.push(reader.attribute("id").unwrap().into_owned());
//!         }
//!         Some(NodeType::Text) => titles.push(reader.value().unwrap().into_owned()),
//!         _ => (),
//!     }
//! }
//!
//! assert_eq!(books, ["b1", "b2"]);
//! assert_eq!(titles, ["Dune"]);
//! ```
#![deny(unsafe_code)]
#![deny(missing_docs)]

mod errors;
mod intern;
mod parser;

pub mod attributes;
pub mod escape;
pub mod reader;

// reexports
pub use crate::attributes::{Attribute, Attributes};
pub use crate::errors::{Error, Result};
pub use crate::reader::{Config, NodeType, Reader};
