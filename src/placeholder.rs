//! Placeholder guard for protecting `{{...}}` template tokens during machine translation
//!
//! Template placeholders like `{{name}}` or `{{- count }}` must come back from the
//! translation service byte for byte. Before a text is sent, every placeholder is
//! wrapped in an XML tag that the service is told to leave alone (`ignore_tags`);
//! after the translation returns, the tag is stripped again.
//!
//! Format: `<donut>{{...}}</donut>`
//!
//! ```ignore
//! let guarded = protect("Hello {{name}}!");
//! assert_eq!(guarded, "Hello <donut>{{name}}</donut>!");
//! assert_eq!(unprotect(&guarded), "Hello {{name}}!");
//! ```
//!
//! `protect` inserts a start tag in front of every `{{` and an end tag after
//! every `}}`, independently of each other; `unprotect` removes only tags in
//! exactly those positions. Marker text that was already part of the input is
//! therefore left untouched and `unprotect(protect(s)) == s` holds for every `s`.

use regex::Regex;
use std::sync::LazyLock;

/// XML tag excluded from translation by the provider
pub const IGNORE_TAG: &str = "donut";

static PLACEHOLDER_START: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{").unwrap());
static PLACEHOLDER_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\}\}").unwrap());
static GUARDED_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"<{}>(\{{\{{)", IGNORE_TAG)).unwrap());
static GUARDED_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(\}}\}})</{}>", IGNORE_TAG)).unwrap());

/// Wrap every placeholder delimiter in the ignore tag
///
/// # Example
/// ```ignore
/// assert_eq!(
///     protect("outside {{inside}} and {{ inside spaces }}"),
///     "outside <donut>{{inside}}</donut> and <donut>{{ inside spaces }}</donut>"
/// );
/// ```
pub fn protect(text: &str) -> String {
    let start_tag = format!("<{}>{{{{", IGNORE_TAG);
    let end_tag = format!("}}}}</{}>", IGNORE_TAG);
    let wrapped = PLACEHOLDER_START.replace_all(text, regex::NoExpand(&start_tag));
    PLACEHOLDER_END
        .replace_all(&wrapped, regex::NoExpand(&end_tag))
        .into_owned()
}

/// Strip the ignore tags inserted by [`protect`]
pub fn unprotect(text: &str) -> String {
    let unwrapped = GUARDED_START.replace_all(text, "$1");
    GUARDED_END.replace_all(&unwrapped, "$1").into_owned()
}
