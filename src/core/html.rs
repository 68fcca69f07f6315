// src/core/html.rs
//! Tolerant HTML scanner producing a flat element arena.
//!
//! Good enough for server-rendered listing pages: case-insensitive tag
//! names, quoted and bare attributes, comments, raw `script`/`style`
//! bodies, void elements, and the implicit closes HTML allows for table
//! cells, rows, list items, paragraphs and options. Stray end tags are
//! dropped; anything still open at EOF is closed.
//!
//! Nodes are stored in document order, so an element's descendants are the
//! contiguous range `index + 1 .. end`.

use crate::markup::{MarkupDocument, MarkupElement};

use super::sanitize::{normalize_entities, normalize_ws};

const VOID: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];
const RAW_TEXT: &[&str] = &["script", "style", "textarea", "title"];
// Elements whose boundaries read as a word break in extracted text.
const BREAKS: &[&str] = &[
    "br", "div", "p", "li", "td", "th", "tr", "table", "ul", "ol", "h1", "h2", "h3", "h4",
];

#[derive(Debug)]
struct Node {
    tag: String,
    attrs: Vec<(String, String)>,
    parent: Option<usize>,
    children: Vec<Child>,
    end: usize,
}

#[derive(Debug)]
enum Child {
    Element(usize),
    Text(String),
}

/// Parsed document. Index 0 is a synthetic root that owns top-level nodes.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
}

/// Borrowed handle to one element of a [`Document`].
#[derive(Clone, Copy, Debug)]
pub struct ElementRef<'a> {
    doc: &'a Document,
    index: usize,
}

impl Document {
    pub fn parse(src: &str) -> Self {
        Parser::new(src).run()
    }

    /// Number of elements (the synthetic root excluded).
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Matching elements anywhere in the document, in document order.
    pub fn select(&self, selector: &str) -> Vec<ElementRef<'_>> {
        self.select_within(0, &Selector::parse(selector))
    }

    fn select_within(&self, scope: usize, sel: &Selector) -> Vec<ElementRef<'_>> {
        (scope + 1..self.nodes[scope].end)
            .filter(|&i| sel.matches(self, i, scope))
            .map(|index| ElementRef { doc: self, index })
            .collect()
    }

    fn raw_text(&self, index: usize, out: &mut String) {
        let node = &self.nodes[index];
        let brk = BREAKS.contains(&node.tag.as_str());
        if brk { out.push(' '); }
        for child in &node.children {
            match child {
                Child::Text(t) => out.push_str(t),
                Child::Element(i) => self.raw_text(*i, out),
            }
        }
        if brk { out.push(' '); }
    }
}

impl<'a> ElementRef<'a> {
    pub fn tag(&self) -> &'a str {
        &self.doc.nodes[self.index].tag
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.doc.nodes[self.index]
            .attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|c| c.split_ascii_whitespace().any(|x| x == class))
    }

    /// Visible text: descendant text nodes joined, entities decoded,
    /// whitespace collapsed. A `<` that opened no tag is kept as text.
    pub fn text_content(&self) -> String {
        let mut raw = String::new();
        self.doc.raw_text(self.index, &mut raw);
        normalize_ws(&normalize_entities(&raw))
    }

    /// Matching descendants, in document order.
    pub fn select(&self, selector: &str) -> Vec<ElementRef<'a>> {
        self.doc.select_within(self.index, &Selector::parse(selector))
    }
}

impl MarkupElement for ElementRef<'_> {
    fn attr(&self, name: &str) -> Option<String> {
        ElementRef::attr(self, name).map(String::from)
    }

    fn sub_attr(&self, selector: &str, name: &str) -> Option<String> {
        self.select(selector)
            .iter()
            .find_map(|e| ElementRef::attr(e, name))
            .map(String::from)
    }

    fn text(&self, selector: &str) -> String {
        let parts: Vec<String> = self
            .select(selector)
            .iter()
            .map(ElementRef::text_content)
            .filter(|t| !t.is_empty())
            .collect();
        parts.join(" ")
    }
}

impl MarkupDocument for Document {
    type Element<'a> = ElementRef<'a>;

    fn select<'a>(&'a self, selector: &str) -> Vec<ElementRef<'a>> {
        Document::select(self, selector)
    }
}

/* ---------------- Selectors ---------------- */

#[derive(Debug, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

#[derive(Debug)]
struct Selector {
    steps: Vec<Compound>,
}

impl Selector {
    /// Unknown syntax is not an error; the selector simply matches less.
    fn parse(s: &str) -> Self {
        let steps = s.split_ascii_whitespace().map(Compound::parse).collect();
        Self { steps }
    }

    /// Descendant combinators only, so matching ancestors greedily from
    /// the right is exact. Ancestors above `scope` are not considered.
    fn matches(&self, doc: &Document, index: usize, scope: usize) -> bool {
        let Some((last, rest)) = self.steps.split_last() else { return false; };
        if !last.matches(doc, index) {
            return false;
        }
        let mut cursor = doc.nodes[index].parent;
        for step in rest.iter().rev() {
            loop {
                match cursor {
                    Some(a) if a >= scope && a != 0 => {
                        cursor = doc.nodes[a].parent;
                        if step.matches(doc, a) { break; }
                    }
                    _ => return false,
                }
            }
        }
        true
    }
}

impl Compound {
    fn parse(s: &str) -> Self {
        let mut out = Compound::default();
        let split = s.find(['.', '#']).unwrap_or(s.len());
        let tag = &s[..split];
        if !tag.is_empty() && tag != "*" {
            out.tag = Some(tag.to_ascii_lowercase());
        }
        let mut rest = &s[split..];
        while let Some(mark) = rest.chars().next() {
            let body = &rest[1..];
            let end = body.find(['.', '#']).unwrap_or(body.len());
            let name = &body[..end];
            if !name.is_empty() {
                match mark {
                    '.' => out.classes.push(s!(name)),
                    _ => out.id = Some(s!(name)),
                }
            }
            rest = &body[end..];
        }
        out
    }

    fn matches(&self, doc: &Document, index: usize) -> bool {
        let el = ElementRef { doc, index };
        self.tag.as_deref().is_none_or(|t| el.tag() == t)
            && self.id.as_deref().is_none_or(|id| el.attr("id") == Some(id))
            && self.classes.iter().all(|c| el.has_class(c))
    }
}

/* ---------------- Parser ---------------- */

struct Parser<'s> {
    src: &'s str,
    pos: usize,
    nodes: Vec<Node>,
    open: Vec<usize>,
}

impl<'s> Parser<'s> {
    fn new(src: &'s str) -> Self {
        let root = Node { tag: s!(), attrs: Vec::new(), parent: None, children: Vec::new(), end: 0 };
        Self { src, pos: 0, nodes: vec![root], open: vec![0] }
    }

    fn run(mut self) -> Document {
        while self.pos < self.src.len() {
            let rest = &self.src[self.pos..];
            if rest.starts_with("<!--") {
                self.pos = match rest[4..].find("-->") {
                    Some(e) => self.pos + 4 + e + 3,
                    None => self.src.len(),
                };
            } else if rest.starts_with("<!") || rest.starts_with("<?") {
                self.skip_past('>');
            } else if rest.starts_with("</") {
                self.end_tag();
            } else if rest.starts_with('<') && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
                self.start_tag();
            } else {
                self.text();
            }
        }
        while self.open.len() > 1 {
            self.pop();
        }
        self.nodes[0].end = self.nodes.len();
        Document { nodes: self.nodes }
    }

    fn current(&self) -> usize {
        self.open.last().copied().unwrap_or(0)
    }

    fn pop(&mut self) {
        if let Some(i) = self.open.pop() {
            self.nodes[i].end = self.nodes.len();
        }
    }

    fn skip_past(&mut self, c: char) {
        self.pos = match self.src[self.pos..].find(c) {
            Some(i) => self.pos + i + 1,
            None => self.src.len(),
        };
    }

    fn text(&mut self) {
        let src = self.src;
        // a '<' that opens nothing is plain text
        let from = if src[self.pos..].starts_with('<') { self.pos + 1 } else { self.pos };
        let end = src[from..].find('<').map_or(src.len(), |i| from + i);
        let parent = self.current();
        self.nodes[parent].children.push(Child::Text(s!(&src[self.pos..end])));
        self.pos = end;
    }

    fn end_tag(&mut self) {
        let src = self.src;
        let start = self.pos + 2;
        let (inner, next) = match src[start..].find('>') {
            Some(e) => (&src[start..start + e], start + e + 1),
            None => (&src[start..], src.len()),
        };
        self.pos = next;
        let name = inner.trim().to_ascii_lowercase();
        if let Some(depth) = self.open.iter().rposition(|&i| i != 0 && self.nodes[i].tag == name) {
            while self.open.len() > depth {
                self.pop();
            }
        }
    }

    fn start_tag(&mut self) {
        let bytes = self.src.as_bytes();
        let mut i = self.pos + 1;
        while i < bytes.len() && !is_tag_delim(bytes[i]) { i += 1; }
        let tag = self.src[self.pos + 1..i].to_ascii_lowercase();

        let mut attrs = Vec::new();
        let mut self_closing = false;
        loop {
            while i < bytes.len() && bytes[i].is_ascii_whitespace() { i += 1; }
            if i >= bytes.len() { break; }
            match bytes[i] {
                b'>' => { i += 1; break; }
                b'/' => {
                    i += 1;
                    if bytes.get(i) == Some(&b'>') { self_closing = true; i += 1; break; }
                    continue;
                }
                _ => {}
            }
            let name_start = i;
            while i < bytes.len() && !is_tag_delim(bytes[i]) && bytes[i] != b'=' { i += 1; }
            let name = self.src[name_start..i].to_ascii_lowercase();
            while i < bytes.len() && bytes[i].is_ascii_whitespace() { i += 1; }
            let mut value = s!();
            if bytes.get(i) == Some(&b'=') {
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_whitespace() { i += 1; }
                match bytes.get(i) {
                    Some(&q) if q == b'"' || q == b'\'' => {
                        let from = i + 1;
                        let end = self.src[from..].find(q as char).map_or(bytes.len(), |e| from + e);
                        value = normalize_entities(&self.src[from..end]);
                        i = (end + 1).min(bytes.len());
                    }
                    _ => {
                        let from = i;
                        while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' { i += 1; }
                        value = normalize_entities(&self.src[from..i]);
                    }
                }
            }
            if !name.is_empty() {
                attrs.push((name, value));
            } else if i == name_start {
                i += 1;
            }
        }
        self.pos = i;

        while let Some(&top) = self.open.last() {
            if top != 0 && closes_implicitly(&tag, &self.nodes[top].tag) {
                self.pop();
            } else {
                break;
            }
        }

        let raw = RAW_TEXT.contains(&tag.as_str());
        let keep_body = tag == "textarea" || tag == "title";
        let void = self_closing || VOID.contains(&tag.as_str());
        let close = format!("</{tag}");

        let parent = self.current();
        let index = self.nodes.len();
        self.nodes.push(Node { tag, attrs, parent: Some(parent), children: Vec::new(), end: index + 1 });
        self.nodes[parent].children.push(Child::Element(index));

        if raw {
            let body_end = find_ci(self.src, &close, self.pos).unwrap_or(self.src.len());
            if keep_body {
                let body = s!(&self.src[self.pos..body_end]);
                self.nodes[index].children.push(Child::Text(body));
            }
            self.pos = body_end;
            if self.pos < self.src.len() { self.skip_past('>'); }
            self.nodes[index].end = self.nodes.len();
        } else if !void {
            self.open.push(index);
        }
    }
}

fn is_tag_delim(b: u8) -> bool {
    b.is_ascii_whitespace() || b == b'>' || b == b'/'
}

/// Whether opening `new` ends an open `top` element.
fn closes_implicitly(new: &str, top: &str) -> bool {
    match new {
        "td" | "th" => matches!(top, "td" | "th"),
        "tr" => matches!(top, "td" | "th" | "tr"),
        "tbody" | "thead" | "tfoot" => matches!(top, "td" | "th" | "tr" | "tbody" | "thead" | "tfoot"),
        "li" => top == "li",
        "option" => top == "option",
        "p" | "div" | "table" | "ul" | "ol" => top == "p",
        _ => false,
    }
}

fn find_ci(hay: &str, needle: &str, from: usize) -> Option<usize> {
    let n = needle.len();
    hay.as_bytes()
        .get(from..)?
        .windows(n)
        .position(|w| w.eq_ignore_ascii_case(needle.as_bytes()))
        .map(|p| from + p)
}
