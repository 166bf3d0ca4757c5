use std::borrow::Cow;
use std::io::Cursor;
use std::io::Write;

use fast_xml_reader::{NodeType, Reader};

use pretty_assertions::assert_eq;

/// Snapshot of the current-node view, for comparing whole documents at once.
#[derive(Debug, PartialEq)]
struct Node {
    node_type: NodeType,
    name: Option<String>,
    depth: usize,
    value: Option<String>,
    empty: bool,
}

fn collect(reader: &mut Reader) -> Vec<Node> {
    let mut nodes = Vec::new();
    while reader.read() {
        nodes.push(Node {
            node_type: reader.node_type().unwrap(),
            name: reader.name().map(|n| n.to_string()),
            depth: reader.depth(),
            value: reader.value().map(|v| v.into_owned()),
            empty: reader.is_empty_element(),
        });
    }
    nodes
}

fn walk(xml: &str) -> Vec<Node> {
    collect(&mut Reader::from_str(xml))
}

fn element(name: &str, depth: usize) -> Node {
    Node {
        node_type: NodeType::Element,
        name: Some(name.to_string()),
        depth,
        value: None,
        empty: false,
    }
}

fn empty_element(name: &str, depth: usize) -> Node {
    Node {
        empty: true,
        ..element(name, depth)
    }
}

fn text(value: &str, depth: usize) -> Node {
    Node {
        node_type: NodeType::Text,
        name: None,
        depth,
        value: Some(value.to_string()),
        empty: false,
    }
}

fn end(name: &str, depth: usize) -> Node {
    Node {
        node_type: NodeType::EndElement,
        ..element(name, depth)
    }
}

#[test]
fn nested_elements_with_text() {
    assert_eq!(
        walk("<a><b>hi</b></a>"),
        [
            element("a", 0),
            element("b", 1),
            text("hi", 2),
            end("b", 1),
            end("a", 0),
        ]
    );
}

#[test]
fn self_closing_and_collapsed_elements() {
    // `<y></y>` collapses: no end-element is reported for `x` or `y`
    assert_eq!(
        walk("<r><x/><y></y></r>"),
        [
            element("r", 0),
            empty_element("x", 1),
            empty_element("y", 1),
            end("r", 0),
        ]
    );
}

#[test]
fn self_closing_with_space() {
    assert_eq!(walk("<x />"), [empty_element("x", 0)]);
}

#[test]
fn collapse_trims_closing_tag_whitespace() {
    assert_eq!(walk("<a></a >"), [empty_element("a", 0)]);
}

#[test]
fn collapse_requires_matching_names() {
    // `</b>` does not close `<a>`; depth still comes back down
    assert_eq!(walk("<a></b>"), [element("a", 0), end("b", 0)]);
}

#[test]
fn collapse_does_not_cross_text() {
    // Whitespace between the tags defeats the collapse, then the blank text
    // is dropped, leaving a start/end pair with nothing in between
    assert_eq!(walk("<a>  </a>"), [element("a", 0), end("a", 0)]);
}

#[test]
fn namespace_prefixes_are_stripped() {
    assert_eq!(
        walk(r#"<ns:root xmlns:ns="u"><ns:child/></ns:root>"#),
        [
            element("root", 0),
            empty_element("child", 1),
            end("root", 0),
        ]
    );
}

#[test]
fn entities_in_text() {
    assert_eq!(
        walk("<s>&lt;ok&gt; &amp; &#65;&#x42;</s>"),
        [element("s", 0), text("<ok> & AB", 1), end("s", 0)]
    );
}

#[test]
fn miscellany_produces_no_nodes() {
    assert_eq!(
        walk("<!-- hi --><?pi x?><!DOCTYPE q><a>  </a><a>x</a>"),
        [
            element("a", 0),
            end("a", 0),
            element("a", 0),
            text("x", 1),
            end("a", 0),
        ]
    );
}

#[test]
fn mixed_content() {
    assert_eq!(
        walk("<p>one<b>two</b>three</p>"),
        [
            element("p", 0),
            text("one", 1),
            element("b", 1),
            text("two", 2),
            end("b", 1),
            text("three", 1),
            end("p", 0),
        ]
    );
}

#[test]
fn cdata_is_skipped_by_default() {
    // An element whose only content is CDATA looks empty (but does not collapse)
    assert_eq!(
        walk("<c><![CDATA[raw <>&]]></c>"),
        [element("c", 0), end("c", 0)]
    );
}

#[test]
fn cdata_surfaced_on_request() {
    let mut reader = Reader::from_str("<c><![CDATA[a&amp;b]]></c>");
    reader.config_mut().surface_cdata = true;
    // CDATA contents are literal: the entity is not expanded
    assert_eq!(
        collect(&mut reader),
        [element("c", 0), text("a&amp;b", 1), end("c", 0)]
    );
}

#[test]
fn blank_text_kept_on_request() {
    let mut reader = Reader::from_str("<a> </a>");
    reader.config_mut().skip_blank_text = false;
    assert_eq!(
        collect(&mut reader),
        [element("a", 0), text(" ", 1), end("a", 0)]
    );
}

#[test]
fn empty_input() {
    let mut reader = Reader::from_str("");
    assert!(!reader.read());
    assert_eq!(reader.depth(), 0);
    assert_eq!(reader.node_type(), None);
    // idempotent at end of input
    assert!(!reader.read());
}

#[test]
fn input_without_nodes() {
    let mut reader = Reader::from_str("  <!-- c --> <?pi x?> <!DOCTYPE d [<!ENTITY e \"v\">]> ");
    assert!(!reader.read());
}

#[test]
fn truncated_inputs_terminate() {
    assert_eq!(walk("<a"), [element("a", 0)]);
    assert_eq!(walk("<a><!-- oops"), [element("a", 0)]);
    assert_eq!(walk("<a><![CDATA[x"), [element("a", 0)]);
    assert_eq!(walk("<a><?pi"), [element("a", 0)]);
    assert_eq!(walk("<a></a"), [element("a", 0)]);
    assert!(walk("<").is_empty());
    assert_eq!(walk("text only"), [text("text only", 0)]);
}

#[test]
fn depth_never_goes_negative() {
    assert_eq!(
        walk("</x></x><a/>"),
        [end("x", 0), end("x", 0), empty_element("a", 0)]
    );
}

#[test]
fn depth_balances_out() {
    let mut reader = Reader::from_str("<a><b><c/><d>t</d></b></a>");
    let mut max_depth = 0;
    while reader.read() {
        max_depth = max_depth.max(reader.depth());
    }
    // deepest node is the text inside <d>
    assert_eq!(max_depth, 3);
    // after consuming balanced content the next node would be at depth 0
    assert_eq!(reader.depth(), 0);
}

#[test]
fn value_is_none_for_elements() {
    let mut reader = Reader::from_str("<a>t</a>");
    assert!(reader.read());
    assert_eq!(reader.node_type(), Some(NodeType::Element));
    assert_eq!(reader.value(), None);
    assert_eq!(reader.text_bytes(), None);
}

#[test]
fn name_is_none_for_text() {
    let mut reader = Reader::from_str("<a>t</a>");
    assert!(reader.read());
    assert!(reader.read());
    assert_eq!(reader.node_type(), Some(NodeType::Text));
    assert_eq!(reader.name(), None);
    assert_eq!(reader.name_bytes(), None);
}

#[test]
fn borrowed_and_materialized_paths_agree() {
    let mut reader = Reader::from_str("<ns:a>plain</ns:a>");
    assert!(reader.read());
    assert_eq!(reader.name_bytes(), Some(&b"a"[..]));
    assert_eq!(reader.name().as_deref(), Some("a"));

    assert!(reader.read());
    assert_eq!(reader.text_bytes(), Some(&b"plain"[..]));
    // entity-free text borrows straight from the buffer
    assert!(matches!(reader.value(), Some(Cow::Borrowed("plain"))));
}

#[test]
fn interned_names_share_allocations() {
    let mut reader = Reader::from_str("<item/><item/>");
    assert!(reader.read());
    let first = reader.name().unwrap();
    assert!(reader.read());
    let second = reader.name().unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));
}

#[test]
fn each_visits_every_node() {
    let mut reader = Reader::from_str("<a><b/>text</a>");
    let mut kinds = Vec::new();
    reader.each(|r| kinds.push(r.node_type().unwrap().code()));
    assert_eq!(kinds, [1, 1, 3, 15]);
}

#[test]
fn node_type_codes_are_stable() {
    assert_eq!(NodeType::Element.code(), 1);
    assert_eq!(NodeType::Text.code(), 3);
    assert_eq!(NodeType::EndElement.code(), 15);
    assert_eq!(NodeType::Element as u8, 1);
}

#[test]
fn buffer_position_is_monotonic() {
    let mut reader = Reader::from_str("<a foo=\"1\"><b>text</b><!-- c --></a>");
    let mut last = reader.buffer_position();
    while reader.read() {
        let pos = reader.buffer_position();
        assert!(pos >= last);
        last = pos;
    }
}

#[test]
fn close_releases_the_document() {
    let mut reader = Reader::from_str("<a><b/></a>");
    assert!(reader.read());
    reader.close();
    assert!(!reader.read());
    assert_eq!(reader.node_type(), None);
    assert_eq!(reader.name(), None);
    assert_eq!(reader.value(), None);
}

#[test]
fn open_reads_a_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"<root><item id=\"1\"/></root>").unwrap();
    file.flush().unwrap();

    let mut reader = Reader::open(file.path()).unwrap();
    assert_eq!(
        collect(&mut reader),
        [element("root", 0), empty_element("item", 1), end("root", 0)]
    );
}

#[test]
fn open_empty_file_is_immediately_done() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let mut reader = Reader::open(file.path()).unwrap();
    assert!(!reader.read());
}

#[test]
fn open_missing_file_fails_with_path() {
    let err = Reader::open("/no/such/file.xml").unwrap_err();
    assert!(err.to_string().contains("/no/such/file.xml"));
}

#[test]
fn from_reader_drains_the_source() {
    let doc = format!("<list>{}</list>", "<item/>".repeat(500));
    let mut reader = Reader::from_reader(Cursor::new(doc.into_bytes())).unwrap();
    let mut items = 0;
    while reader.read() {
        if reader.node_type() == Some(NodeType::Element) && reader.name_bytes() == Some(b"item") {
            items += 1;
        }
    }
    assert_eq!(items, 500);
}

#[test]
fn from_reader_empty_source() {
    let mut reader = Reader::from_reader(Cursor::new(Vec::new())).unwrap();
    assert!(!reader.read());
}

#[test]
fn readers_can_move_between_threads() {
    fn assert_send<T: Send>() {}
    assert_send::<Reader>();
}
