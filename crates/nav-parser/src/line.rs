use nav_core::{
    BlockKind, CODE_BLOCK_SPLIT, COMMENT_PREFIX, FAV_ICON_SPLIT, HEADER_SPLIT, HTML_BLOCK_SPLIT,
    TAB_SPLIT, TAB_TITLE_SPLIT, TITLE_SPLIT,
};
use serde::Serialize;

use crate::link::{ResolvedLink, parse_link_line};

/// What a single schema line is, decided without any block state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LineKind {
    Empty,
    Comment,
    FavIcon { value: String },
    Title { value: String },
    Header { value: String },
    BlockFence { kind: BlockKind, id: Option<String> },
    Tabs { entries: Vec<TabSpec> },
    Link(ResolvedLink),
    /// Non-empty text that matches no rule; the parser drops it.
    Text { value: String },
}

/// One `name|id` entry of a tab row, before block id allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabSpec {
    pub tab_name: String,
    pub user_id: String,
}

/// A tab row split into usable entries plus the raw segments that were skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct TabRow {
    pub(crate) entries: Vec<TabSpec>,
    pub(crate) malformed: Vec<String>,
}

/// Classify one line the way the parser would outside a fenced block.
#[must_use]
pub fn classify_line(line: &str) -> LineKind {
    if line.starts_with(COMMENT_PREFIX) {
        return LineKind::Comment;
    }

    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineKind::Empty;
    }

    if trimmed.starts_with(FAV_ICON_SPLIT) {
        return LineKind::FavIcon {
            value: favicon_value(trimmed),
        };
    }
    if trimmed.starts_with(TITLE_SPLIT) {
        return LineKind::Title {
            value: strip_marker(trimmed, TITLE_SPLIT),
        };
    }
    if trimmed.starts_with(HEADER_SPLIT) {
        return LineKind::Header {
            value: strip_marker(trimmed, HEADER_SPLIT),
        };
    }
    if let Some((kind, id)) = block_fence(trimmed) {
        return LineKind::BlockFence {
            kind,
            id: id.map(str::to_string),
        };
    }
    if trimmed.starts_with(TAB_SPLIT) {
        return LineKind::Tabs {
            entries: split_tab_row(trimmed).entries,
        };
    }

    match parse_link_line(trimmed) {
        Some(link) => LineKind::Link(link),
        None => LineKind::Text {
            value: trimmed.to_string(),
        },
    }
}

/// `@@ 🔖` -> `🔖`.
pub(crate) fn favicon_value(trimmed: &str) -> String {
    trimmed.trim_start_matches(FAV_ICON_SPLIT).trim().to_string()
}

/// Remove the first occurrence of `marker` and trim what is left.
pub(crate) fn strip_marker(trimmed: &str, marker: &str) -> String {
    trimmed.replacen(marker, "", 1).trim().to_string()
}

/// Recognize a fence opener. The id is the trimmed text after the fence, if any.
pub(crate) fn block_fence(trimmed: &str) -> Option<(BlockKind, Option<&str>)> {
    let (kind, rest) = if let Some(rest) = trimmed.strip_prefix(CODE_BLOCK_SPLIT) {
        (BlockKind::Code, rest)
    } else if let Some(rest) = trimmed.strip_prefix(HTML_BLOCK_SPLIT) {
        (BlockKind::Html, rest)
    } else {
        return None;
    };
    let id = rest.trim();
    Some((kind, (!id.is_empty()).then_some(id)))
}

pub(crate) fn split_tab_row(trimmed: &str) -> TabRow {
    let mut row = TabRow::default();
    for segment in trimmed
        .split(TAB_SPLIT)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
    {
        let mut parts = segment.split(TAB_TITLE_SPLIT);
        let name = parts.next().unwrap_or_default().trim();
        let id = parts.next().unwrap_or_default().trim();
        if name.is_empty() || id.is_empty() {
            row.malformed.push(segment.to_string());
            continue;
        }
        row.entries.push(TabSpec {
            tab_name: name.to_string(),
            user_id: id.to_string(),
        });
    }
    row
}

#[cfg(test)]
mod tests {
    use nav_core::{BlockKind, LinkType};

    use super::{LineKind, TabSpec, classify_line, split_tab_row};

    fn tab(name: &str, id: &str) -> TabSpec {
        TabSpec {
            tab_name: name.to_string(),
            user_id: id.to_string(),
        }
    }

    #[test]
    fn classifies_markers_by_precedence() {
        assert_eq!(classify_line(""), LineKind::Empty);
        assert_eq!(classify_line("   "), LineKind::Empty);
        assert_eq!(classify_line("// note"), LineKind::Comment);
        assert_eq!(
            classify_line("@@@ 🔖 "),
            LineKind::FavIcon {
                value: "🔖".to_string()
            }
        );
        assert_eq!(
            classify_line("  ! My Page"),
            LineKind::Title {
                value: "My Page".to_string()
            }
        );
        assert_eq!(
            classify_line("# Work ! Stuff"),
            LineKind::Header {
                value: "Work ! Stuff".to_string()
            }
        );
        // favicon wins over a later title marker
        assert!(matches!(classify_line("@!"), LineKind::FavIcon { .. }));
    }

    #[test]
    fn indented_comment_is_not_a_comment() {
        assert!(matches!(classify_line("  // note"), LineKind::Text { .. }));
    }

    #[test]
    fn fences_carry_optional_ids() {
        assert_eq!(
            classify_line("``` notes "),
            LineKind::BlockFence {
                kind: BlockKind::Code,
                id: Some("notes".to_string())
            }
        );
        assert_eq!(
            classify_line("---"),
            LineKind::BlockFence {
                kind: BlockKind::Html,
                id: None
            }
        );
    }

    #[test]
    fn tab_rows_keep_complete_entries_in_order() {
        assert_eq!(
            classify_line(">>>tabName1|blockId1>>>tabName2|blockId2"),
            LineKind::Tabs {
                entries: vec![tab("tabName1", "blockId1"), tab("tabName2", "blockId2")]
            }
        );
    }

    #[test]
    fn tab_rows_skip_entries_missing_name_or_id() {
        let row = split_tab_row(">>> A | a >>> B >>> | c >>> D|d|extra");
        assert_eq!(row.entries, vec![tab("A", "a"), tab("D", "d")]);
        assert_eq!(row.malformed, vec!["B".to_string(), "| c".to_string()]);
    }

    #[test]
    fn links_and_plain_text() {
        match classify_line("Google | google.com") {
            LineKind::Link(link) => assert_eq!(link.link_type, LinkType::SameTabLink),
            other => panic!("expected link, got {other:?}"),
        }
        assert_eq!(
            classify_line("just words"),
            LineKind::Text {
                value: "just words".to_string()
            }
        );
    }
}
