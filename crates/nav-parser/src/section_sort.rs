//! Regroup schema text into alphabetically ordered sections.
//!
//! Titles are pinned to the top, followed by whatever came before the first
//! header. Each `#` section is then emitted in header order with its link
//! lines sorted and every other unit (blocks, tab rows, favicons, comments,
//! dropped text) kept in source order after the links. Every group ends with
//! one blank line.

use nav_core::{
    BlockKind, COMMENT_PREFIX, FAV_ICON_SPLIT, HEADER_SPLIT, TAB_SPLIT, TITLE_SPLIT,
};
use tracing::debug;

use crate::line::{block_fence, strip_marker};
use crate::link::parse_link_line;

/// A line or fenced block that moves as one piece.
#[derive(Debug)]
enum Unit<'a> {
    Title(&'a str),
    Header(&'a str),
    Link(&'a str),
    Other(Vec<&'a str>),
}

#[derive(Debug, Default)]
struct Section<'a> {
    header: &'a str,
    links: Vec<&'a str>,
    others: Vec<Vec<&'a str>>,
}

impl Section<'_> {
    fn sort_key(&self) -> String {
        strip_marker(self.header.trim(), HEADER_SPLIT).to_lowercase()
    }
}

/// Sort a schema by section. Applying this twice gives the same text as once.
#[must_use]
pub fn sort_schema_by_sections(text: &str) -> String {
    let mut titles: Vec<&str> = Vec::new();
    let mut preamble: Vec<&str> = Vec::new();
    let mut sections: Vec<Section<'_>> = Vec::new();

    for unit in split_units(text) {
        match unit {
            Unit::Title(line) => titles.push(line),
            Unit::Header(line) => sections.push(Section {
                header: line,
                ..Section::default()
            }),
            Unit::Link(line) => match sections.last_mut() {
                Some(section) => section.links.push(line),
                None => preamble.push(line),
            },
            Unit::Other(lines) => match sections.last_mut() {
                Some(section) => section.others.push(lines),
                None => preamble.extend(lines),
            },
        }
    }

    sections.sort_by_cached_key(Section::sort_key);
    debug!(
        titles = titles.len(),
        sections = sections.len(),
        "sorted schema sections"
    );

    let mut out = titles;
    out.extend(preamble);
    if !out.is_empty() {
        out.push("");
    }

    for mut section in sections {
        section.links.sort_by_cached_key(|line| line.trim().to_lowercase());
        out.push(section.header);
        out.extend(section.links);
        out.extend(section.others.into_iter().flatten());
        out.push("");
    }

    out.join("\n")
}

fn split_units(text: &str) -> Vec<Unit<'_>> {
    let mut units = Vec::new();
    let mut lines = text.lines().map(str::trim_end);

    while let Some(line) = lines.next() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if line.starts_with(COMMENT_PREFIX) {
            units.push(Unit::Other(vec![line]));
            continue;
        }
        if let Some((kind, _)) = block_fence(trimmed) {
            units.push(Unit::Other(capture_block(line, kind, &mut lines)));
            continue;
        }
        if trimmed.starts_with(TITLE_SPLIT) {
            units.push(Unit::Title(line));
        } else if trimmed.starts_with(HEADER_SPLIT) {
            units.push(Unit::Header(line));
        } else if is_link_line(trimmed) {
            units.push(Unit::Link(line));
        } else {
            units.push(Unit::Other(vec![line]));
        }
    }

    units
}

/// Links are what the parser would emit as a link; the `@` and `>>>`
/// prefixes take precedence, as they do when parsing.
fn is_link_line(trimmed: &str) -> bool {
    !trimmed.starts_with(FAV_ICON_SPLIT)
        && !trimmed.starts_with(TAB_SPLIT)
        && parse_link_line(trimmed).is_some()
}

/// Collect a fenced block through its closing fence. A block still open at
/// end of input is closed so that a later pass reads the same unit back.
fn capture_block<'a>(
    opener: &'a str,
    kind: BlockKind,
    lines: &mut impl Iterator<Item = &'a str>,
) -> Vec<&'a str> {
    let mut block = vec![opener];
    for line in lines.by_ref() {
        block.push(line);
        if line.trim() == kind.fence() {
            return block;
        }
    }
    block.push(kind.fence());
    block
}
