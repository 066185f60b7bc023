// ABOUTME: Parsed page snapshots and the DOM read primitives used by extraction.
// ABOUTME: Provides query/query_all/read_text/read_attribute plus browser-like inner text.

//! Page snapshots.
//!
//! A [`Page`] is the parsed markup of whatever the browser currently shows.
//! All lookups are infallible: a malformed selector or a missing element is
//! simply "absent".

use ego_tree::iter::Edge;
use scraper::node::Node;
use scraper::{ElementRef, Html};

use crate::compiled::get_or_compile;

/// Elements whose boundaries start a new line of visible text.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "figcaption", "figure",
    "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav",
    "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Elements whose contents are never visible text.
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// A parsed snapshot of one page.
pub struct Page {
    url: String,
    source: String,
    doc: Html,
}

impl Page {
    /// Parses raw markup captured from `url`.
    pub fn parse(url: impl Into<String>, source: impl Into<String>) -> Self {
        let source = source.into();
        let doc = Html::parse_document(&source);
        Self {
            url: url.into(),
            source,
            doc,
        }
    }

    /// The URL this snapshot was captured from.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The raw markup as delivered, including embedded script payloads.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The document root element.
    pub fn root(&self) -> ElementRef<'_> {
        self.doc.root_element()
    }

    /// First element matching `css`, or `None` when absent or the selector is invalid.
    pub fn query(&self, css: &str) -> Option<ElementRef<'_>> {
        let selector = get_or_compile(css)?;
        self.doc.select(&selector).next()
    }

    /// All elements matching `css`; empty when the selector is invalid.
    pub fn query_all(&self, css: &str) -> Vec<ElementRef<'_>> {
        match get_or_compile(css) {
            Some(selector) => self.doc.select(&selector).collect(),
            None => Vec::new(),
        }
    }

    /// Visible text of the whole page, one line per block.
    pub fn inner_text(&self) -> String {
        inner_text(self.root())
    }
}

/// First descendant of `el` matching `css`.
pub fn query_within<'a>(el: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = get_or_compile(css)?;
    el.select(&selector).next()
}

/// Visible text of an element with whitespace collapsed onto a single line.
pub fn read_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Trimmed attribute value, or `None` when missing or blank.
pub fn read_attribute(el: ElementRef<'_>, name: &str) -> Option<String> {
    let value = el.value().attr(name)?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Approximates a browser's `innerText`: block boundaries and `<br>` become line
/// breaks, other whitespace collapses, hidden elements are skipped.
pub fn inner_text(el: ElementRef<'_>) -> String {
    let mut out = String::new();
    let mut hidden_depth = 0usize;

    for edge in el.traverse() {
        match edge {
            Edge::Open(node) => match node.value() {
                Node::Element(e) => {
                    let name = e.name();
                    if HIDDEN_TAGS.contains(&name) {
                        hidden_depth += 1;
                    } else if hidden_depth == 0 && (name == "br" || BLOCK_TAGS.contains(&name)) {
                        out.push('\n');
                    }
                }
                Node::Text(text) if hidden_depth == 0 => {
                    for c in text.text.chars() {
                        out.push(if c.is_whitespace() { ' ' } else { c });
                    }
                }
                _ => {}
            },
            Edge::Close(node) => {
                if let Node::Element(e) = node.value() {
                    let name = e.name();
                    if HIDDEN_TAGS.contains(&name) {
                        hidden_depth = hidden_depth.saturating_sub(1);
                    } else if hidden_depth == 0 && BLOCK_TAGS.contains(&name) {
                        out.push('\n');
                    }
                }
            }
        }
    }

    out.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
