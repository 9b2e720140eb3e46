//! Link filtering for the search box.
//!
//! A query starting with `/` is fuzzy: its letters must appear in order with
//! anything in between. Any other query is a case-insensitive substring. A
//! leading `?` means "send this to a web search engine" and is never turned
//! into a matcher.

use std::ops::Range;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use serde::Serialize;

const FUZZY_PREFIX: char = '/';
const WEB_SEARCH_PREFIX: char = '?';

static NON_WORD_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\W_]+").expect("non-word pattern is valid"));
static WHITESPACE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchMode {
    Fuzzy,
    Literal,
}

impl SearchMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fuzzy => "fuzzy",
            Self::Literal => "literal",
        }
    }
}

/// How the host should treat raw search-box input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchIntent<'a> {
    /// Nothing typed.
    Empty,
    /// `?rust borrow checker`: hand the remainder to a web search engine.
    WebSearch(&'a str),
    /// Filter local links with [`build_search_matcher`].
    Filter(&'a str),
}

impl<'a> SearchIntent<'a> {
    #[must_use]
    pub fn parse(query: &'a str) -> Self {
        if query.is_empty() {
            Self::Empty
        } else if let Some(rest) = query.strip_prefix(WEB_SEARCH_PREFIX) {
            Self::WebSearch(rest.trim())
        } else {
            Self::Filter(query)
        }
    }
}

/// Compiled, case-insensitive matcher for one query.
#[derive(Debug, Clone)]
pub struct SearchMatcher {
    mode: SearchMode,
    regex: Regex,
}

impl SearchMatcher {
    #[must_use]
    pub const fn mode(&self) -> SearchMode {
        self.mode
    }

    /// The regex source, without the case-insensitivity flag.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Byte range of the leftmost match, for highlighting.
    #[must_use]
    pub fn find(&self, text: &str) -> Option<Range<usize>> {
        self.regex.find(text).map(|found| found.range())
    }
}

/// Build a matcher for `query`, or `None` when a fuzzy query has nothing
/// left to match after cleaning.
#[must_use]
pub fn build_search_matcher(query: &str) -> Option<SearchMatcher> {
    let (mode, pattern) = match query.strip_prefix(FUZZY_PREFIX) {
        Some(rest) => (SearchMode::Fuzzy, fuzzy_pattern(rest)?),
        None => (SearchMode::Literal, regex::escape(query)),
    };

    let regex = RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .ok()?;
    Some(SearchMatcher { mode, regex })
}

fn fuzzy_pattern(rest: &str) -> Option<String> {
    let spaced = NON_WORD_RUNS.replace_all(rest, " ");
    let collapsed = WHITESPACE_RUNS.replace_all(&spaced, " ");
    let cleaned = collapsed.trim();
    if cleaned.is_empty() {
        return None;
    }

    let pattern = cleaned
        .chars()
        .map(|ch| regex::escape(ch.encode_utf8(&mut [0; 4])))
        .collect::<Vec<_>>()
        .join(".*?");
    Some(pattern)
}

/// Filter `suggestions` in order, keeping at most `limit`.
///
/// Empty and web-search (`?`) queries yield nothing.
#[must_use]
pub fn filter_suggestions<'a, S: AsRef<str>>(
    query: &str,
    suggestions: &'a [S],
    limit: usize,
) -> Vec<&'a S> {
    let SearchIntent::Filter(query) = SearchIntent::parse(query) else {
        return Vec::new();
    };
    let Some(matcher) = build_search_matcher(query) else {
        return Vec::new();
    };
    suggestions
        .iter()
        .filter(|suggestion| matcher.is_match(suggestion.as_ref()))
        .take(limit)
        .collect()
}
