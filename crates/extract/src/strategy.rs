// ABOUTME: Tagged strategy descriptors for locating a field value inside a scope.
// ABOUTME: A Strategy pairs a Locator (text or attribute lookup) with an optional post-filter.

//! Extraction strategies.
//!
//! A field is described by an ordered list of [`Strategy`] values. Each one
//! names where to look ([`Locator`]) and, optionally, a [`Filter`] the found
//! text must satisfy. Strategies are plain data so new ones are additive and
//! each can be exercised in isolation.

/// Where a strategy looks for its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator {
    /// Visible text of the first element matching the CSS selector.
    Text(&'static str),
    /// An attribute of the first element matching the CSS selector.
    Attr(&'static str, &'static str),
}

impl Locator {
    /// The CSS selector this locator queries.
    pub fn selector(&self) -> &'static str {
        match self {
            Locator::Text(css) => css,
            Locator::Attr(css, _) => css,
        }
    }
}

/// Post-filter applied to a located, trimmed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// Value must start with an ASCII digit (counters).
    LeadingDigit,
}

impl Filter {
    /// Returns true if `value` passes the filter.
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Filter::LeadingDigit => value.chars().next().is_some_and(|c| c.is_ascii_digit()),
        }
    }
}

/// One candidate way of reading a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strategy {
    pub locator: Locator,
    pub filter: Option<Filter>,
}

impl Strategy {
    /// Reads the visible text of the first element matching `css`.
    pub const fn text(css: &'static str) -> Self {
        Self {
            locator: Locator::Text(css),
            filter: None,
        }
    }

    /// Reads `attr` from the first element matching `css`.
    pub const fn attr(css: &'static str, attr: &'static str) -> Self {
        Self {
            locator: Locator::Attr(css, attr),
            filter: None,
        }
    }

    /// Requires the value to start with a digit.
    pub const fn numeric(self) -> Self {
        Self {
            locator: self.locator,
            filter: Some(Filter::LeadingDigit),
        }
    }

    /// Returns true if the post-filter (if any) accepts `value`.
    pub fn accepts(&self, value: &str) -> bool {
        self.filter.map_or(true, |f| f.accepts(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_digit_filter() {
        let s = Strategy::text("span").numeric();
        assert!(s.accepts("12"));
        assert!(s.accepts("1.2K"));
        assert!(!s.accepts("Reply"));
        assert!(!s.accepts(""));
    }

    #[test]
    fn test_unfiltered_accepts_anything() {
        assert!(Strategy::attr("a", "href").accepts("whatever"));
    }

    #[test]
    fn test_locator_selector() {
        assert_eq!(Strategy::text("p.caption").locator.selector(), "p.caption");
        assert_eq!(Strategy::attr("img", "src").locator.selector(), "img");
    }
}
