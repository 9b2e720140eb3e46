#![forbid(unsafe_code)]

mod block_ids;
mod component_builder;
mod line;
mod link;
mod schema_parser;
mod search;
mod section_sort;

use std::time::{SystemTime, UNIX_EPOCH};

use nav_core::{LinkComponent, NavError, ParseWarning, ParserConfig, SchemaComponent};
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use tracing::debug;

pub use line::{LineKind, TabSpec, classify_line};
pub use link::{ResolvedLink, parse_link_line, resolve_link};
pub use search::{
    SearchIntent, SearchMatcher, SearchMode, build_search_matcher, filter_suggestions,
};
pub use section_sort::sort_schema_by_sections;

/// Largest accepted starting counter; larger seeds are clamped down to it.
///
/// Every line and block id draws one value, so the headroom above this can
/// never run out for text that fits in memory.
pub const MAX_STARTING_COUNTER: u64 = u64::MAX / 2;

const UNTITLED_TIMESTAMP: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second] UTC");

/// Components of one parse in source order, plus the counter value the next
/// parse should start from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub components: Vec<SchemaComponent>,
    pub next_counter: u64,
    pub warnings: Vec<ParseWarning>,
}

/// Consecutive links that share a header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSection<'a> {
    pub header_name: &'a str,
    pub links: Vec<&'a LinkComponent>,
}

impl ParseResult {
    /// The first title, which is always present for parser output.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.components.iter().find_map(|component| match component {
            SchemaComponent::Title(title) => Some(title.value.as_str()),
            _ => None,
        })
    }

    /// The last favicon line wins.
    #[must_use]
    pub fn favicon(&self) -> Option<&str> {
        self.components.iter().rev().find_map(|component| match component {
            SchemaComponent::FavIcon(icon) => Some(icon.value.as_str()),
            _ => None,
        })
    }

    #[must_use]
    pub fn favicon_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.favicon().unwrap_or(default)
    }

    pub fn links(&self) -> impl Iterator<Item = &LinkComponent> {
        self.components.iter().filter_map(SchemaComponent::as_link)
    }

    /// Every component as JSON, the `--full` output of the CLI.
    pub fn to_json(&self, pretty: bool) -> Result<String, NavError> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    /// Links grouped into runs of the same `header_name`, in source order.
    #[must_use]
    pub fn sections(&self) -> Vec<LinkSection<'_>> {
        let mut sections: Vec<LinkSection<'_>> = Vec::new();
        for link in self.links() {
            match sections.last_mut() {
                Some(section) if section.header_name == link.header_name => {
                    section.links.push(link);
                }
                _ => sections.push(LinkSection {
                    header_name: &link.header_name,
                    links: vec![link],
                }),
            }
        }
        sections
    }
}

/// Owns the key counter across parses.
#[derive(Debug, Clone)]
pub struct SchemaParser {
    counter: u64,
    config: ParserConfig,
}

impl Default for SchemaParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaParser {
    /// Seed the counter from the current time in milliseconds.
    #[must_use]
    pub fn new() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or_default();
        Self::with_counter(millis)
    }

    /// Start from `counter`, clamped to [`MAX_STARTING_COUNTER`].
    #[must_use]
    pub fn with_counter(counter: u64) -> Self {
        Self {
            counter: counter.min(MAX_STARTING_COUNTER),
            config: ParserConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub const fn counter(&self) -> u64 {
        self.counter
    }

    #[must_use]
    pub const fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn parse(&mut self, text: &str) -> ParseResult {
        let result = parse_schema_with(text, self.counter, &self.config);
        self.counter = result.next_counter;
        result
    }
}

/// Parse with default settings. Never fails; see [`ParseResult::warnings`].
#[must_use]
pub fn parse_schema(text: &str, starting_counter: u64) -> ParseResult {
    parse_schema_with(text, starting_counter, &ParserConfig::default())
}

#[must_use]
pub fn parse_schema_with(text: &str, starting_counter: u64, config: &ParserConfig) -> ParseResult {
    if starting_counter > MAX_STARTING_COUNTER {
        debug!(starting_counter, "clamping starting counter");
    }
    let starting_counter = starting_counter.min(MAX_STARTING_COUNTER);
    schema_parser::parse_text(text, starting_counter, config, untitled_timestamp)
}

fn untitled_timestamp() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(UNTITLED_TIMESTAMP)
        .unwrap_or_else(|_| now.unix_timestamp().to_string())
}

/// Compact machine-readable summary of a parse.
#[must_use]
pub fn parse_summary_json(parsed: &ParseResult) -> String {
    let count = |kind: &str| {
        parsed
            .components
            .iter()
            .filter(|component| component.kind_str() == kind)
            .count()
    };
    json!({
        "title": parsed.title(),
        "component_count": parsed.components.len(),
        "link_count": count("link"),
        "header_count": count("header"),
        "tab_row_count": count("tabs"),
        "block_count": parsed
            .components
            .iter()
            .filter_map(SchemaComponent::as_block)
            .count(),
        "next_counter": parsed.next_counter,
        "warning_count": parsed.warnings.len(),
        "warnings": parsed
            .warnings
            .iter()
            .map(|warning| format!("{}:{} {}", warning.line, warning.code.as_str(), warning.message))
            .collect::<Vec<_>>(),
    })
    .to_string()
}
