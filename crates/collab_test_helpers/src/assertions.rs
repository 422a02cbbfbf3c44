//! Domain-specific assertions for collaboration tests
//!
//! Predicates over the strings a session produces: error banners, patch
//! text and cursor metadata.

use predicates::prelude::*;
use predicates::str::contains;

/// Matches a collaboration error banner, fatal or not
///
/// # Example
/// ```rust
/// use collab_test_helpers::assertions::error_banner;
/// use predicates::prelude::*;
///
/// let banner = "Fatal Collaboration Error: gone\nWarning: Changes since the last sync could be lost";
/// assert!(error_banner().eval(banner));
/// ```
pub fn error_banner() -> impl Predicate<str> {
    contains("Collaboration Error: ").and(contains("Changes since the last sync could be lost"))
}

/// Matches a fatal error banner
pub fn fatal_banner() -> impl Predicate<str> {
    predicate::str::starts_with("Fatal ").and(error_banner())
}

/// Matches text in the patch wire format (`@@ -a,b +c,d @@` headers)
pub fn patch_text() -> impl Predicate<str> {
    predicate::function(|s: &str| {
        !s.is_empty()
            && s.lines()
                .next()
                .is_some_and(|header| header.starts_with("@@ -") && header.ends_with(" @@"))
    })
}

/// Asserts that none of `values` appear in the text
pub fn not_contains_any(values: &[&str]) -> impl Predicate<str> {
    let owned_values: Vec<String> = values.iter().map(|&s| s.to_string()).collect();
    predicate::function(move |s: &str| !owned_values.iter().any(|v| s.contains(v.as_str())))
}
