// ABOUTME: Generic field extraction over an ordered strategy chain with a raw-text fallback.
// ABOUTME: Defines the Scope trait implemented for whole pages and single elements.

//! Field extraction.
//!
//! Key behaviors:
//! - Strategies are tried in order; the first accepted value wins and later
//!   strategies are never attempted.
//! - A value is accepted when its trimmed length exceeds `min_length` and the
//!   strategy's filter passes.
//! - A failed lookup (invalid selector, missing element, missing attribute) is
//!   "not found" and moves on to the next strategy.
//! - [`extract`] falls back to the first meaningful line of raw text;
//!   [`extract_strict`] does not.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;

use crate::page::{inner_text, query_within, read_attribute, read_text, Page};
use crate::strategy::{Locator, Strategy};

/// Default minimum length; values must be strictly longer.
pub const DEFAULT_MIN_LENGTH: usize = 3;

/// Raw-text lines shorter than this are treated as noise.
const RAW_LINE_MIN_CHARS: usize = 10;

static RELATIVE_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+[smhd]?( ago)?$").expect("valid relative-time regex"));

/// A context that strategies can be evaluated against.
pub trait Scope {
    /// Resolves a locator to its raw (untrimmed) value, or `None` if absent.
    fn locate(&self, locator: &Locator) -> Option<String>;

    /// All visible text under the scope, one line per block.
    fn inner_text(&self) -> String;
}

impl Scope for ElementRef<'_> {
    fn locate(&self, locator: &Locator) -> Option<String> {
        match *locator {
            Locator::Text(css) => query_within(*self, css).map(read_text),
            Locator::Attr(css, attr) => query_within(*self, css).and_then(|el| read_attribute(el, attr)),
        }
    }

    fn inner_text(&self) -> String {
        inner_text(*self)
    }
}

impl Scope for Page {
    fn locate(&self, locator: &Locator) -> Option<String> {
        match *locator {
            Locator::Text(css) => self.query(css).map(read_text),
            Locator::Attr(css, attr) => self.query(css).and_then(|el| read_attribute(el, attr)),
        }
    }

    fn inner_text(&self) -> String {
        Page::inner_text(self)
    }
}

/// Which step of the chain produced a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// The strategy at this index.
    Strategy(usize),
    /// The raw-text fallback.
    RawText,
}

/// An accepted field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub value: String,
    pub origin: Origin,
}

impl Extraction {
    /// Flattens into the `(value, found)` pair, with an empty value when absent.
    pub fn into_pair(extraction: Option<Extraction>) -> (String, bool) {
        match extraction {
            Some(e) => (e.value, true),
            None => (String::new(), false),
        }
    }
}

fn attempt<S: Scope + ?Sized>(scope: &S, strategy: &Strategy, min_length: usize) -> Option<String> {
    let raw = scope.locate(&strategy.locator)?;
    let trimmed = raw.trim();
    if trimmed.chars().count() <= min_length || !strategy.accepts(trimmed) {
        return None;
    }
    Some(trimmed.to_string())
}

/// Runs the strategy chain only; no raw-text fallback.
pub fn extract_strict<S: Scope + ?Sized>(
    scope: &S,
    strategies: &[Strategy],
    min_length: usize,
) -> Option<Extraction> {
    strategies.iter().enumerate().find_map(|(index, strategy)| {
        attempt(scope, strategy, min_length).map(|value| Extraction {
            value,
            origin: Origin::Strategy(index),
        })
    })
}

/// Runs the strategy chain, then falls back to the first meaningful raw-text line.
pub fn extract<S: Scope + ?Sized>(
    scope: &S,
    strategies: &[Strategy],
    min_length: usize,
) -> Option<Extraction> {
    extract_strict(scope, strategies, min_length).or_else(|| {
        raw_text_fallback(&scope.inner_text()).map(|value| Extraction {
            value,
            origin: Origin::RawText,
        })
    })
}

/// Returns the first line that is at least 10 characters and not a relative timestamp.
pub fn raw_text_fallback(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| line.chars().count() >= RAW_LINE_MIN_CHARS && !RELATIVE_TIME_RE.is_match(line))
        .map(str::to_string)
}
