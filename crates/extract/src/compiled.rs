// ABOUTME: Pre-compiled CSS selector cache shared by every strategy lookup.
// ABOUTME: Invalid selectors are cached as None so a broken strategy fails fast every time.

//! Selector caching for repeated strategy lookups.
//!
//! The same strategy chains run against every video page and every comment
//! container, so each selector string is compiled once and reused.

use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use scraper::Selector;

static SELECTOR_CACHE: Lazy<RwLock<HashMap<String, Option<Selector>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Gets or compiles a CSS selector, caching the result.
///
/// Returns `None` if the selector is invalid. A poisoned cache lock only
/// disables caching; compilation still happens.
pub fn get_or_compile(css: &str) -> Option<Selector> {
    if let Ok(cache) = SELECTOR_CACHE.read() {
        if let Some(cached) = cache.get(css) {
            return cached.clone();
        }
    }

    let compiled = Selector::parse(css).ok();
    if let Ok(mut cache) = SELECTOR_CACHE.write() {
        cache
            .entry(css.to_string())
            .or_insert_with(|| compiled.clone());
    }
    compiled
}

/// Precompiles a batch of selectors into the cache.
pub fn precompile_selectors<I, S>(selectors: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for css in selectors {
        let _ = get_or_compile(css.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_selector_is_cached() {
        assert!(get_or_compile("div[data-e2e='video-desc']").is_some());
        assert!(get_or_compile("div[data-e2e='video-desc']").is_some());
    }

    #[test]
    fn test_invalid_selector_returns_none() {
        assert!(get_or_compile("[[[invalid").is_none());
        assert!(get_or_compile("[[[invalid").is_none());
    }

    #[test]
    fn test_precompile_selectors() {
        precompile_selectors(["strong", "a[href*='/video/']"]);
        assert!(get_or_compile("strong").is_some());
        assert!(get_or_compile("a[href*='/video/']").is_some());
    }
}
