use nav_core::{
    BlockKind, COMMENT_PREFIX, FAV_ICON_SPLIT, HEADER_SPLIT, ParserConfig, TAB_SPLIT, TITLE_SPLIT,
    WarningCode,
};
use tracing::{debug, trace};

use crate::ParseResult;
use crate::component_builder::ComponentBuilder;
use crate::line::{block_fence, favicon_value, split_tab_row, strip_marker};
use crate::link::resolve_link;

/// A fenced block waiting for its closing fence.
struct OpenBlock<'a> {
    kind: BlockKind,
    user_id: Option<&'a str>,
    opened_at: usize,
    body: Vec<&'a str>,
}

/// Single pass over the schema text.
///
/// `untitled` is only called when the first line is not a title.
pub(crate) fn parse_text(
    text: &str,
    starting_counter: u64,
    config: &ParserConfig,
    untitled: impl FnOnce() -> String,
) -> ParseResult {
    let lines: Vec<(usize, &str)> = text
        .trim()
        .split('\n')
        .enumerate()
        .filter(|(_, line)| !line.starts_with(COMMENT_PREFIX))
        .map(|(index, line)| (index + 1, line.trim_end()))
        .collect();

    let mut builder = ComponentBuilder::new(starting_counter);

    let has_title = lines
        .first()
        .is_some_and(|(_, line)| line.starts_with(TITLE_SPLIT));
    if !has_title {
        let key = builder.next_key();
        builder.push_title(key, format!("{} - {}", config.untitled_prefix, untitled()));
    }

    let mut open: Option<OpenBlock<'_>> = None;

    for &(line_no, line) in &lines {
        let key = builder.next_key();

        if let Some(mut block) = open.take() {
            if line.trim() == block.kind.fence() {
                trace!(
                    kind = block.kind.as_str(),
                    line = line_no,
                    body_lines = block.body.len(),
                    "closed block"
                );
                let body = block.body.join("\n");
                let value = pretty_json(&body).unwrap_or(body);
                builder.push_block(key, block.kind, block.user_id, value);
            } else {
                block.body.push(line);
                open = Some(block);
            }
            continue;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if trimmed.starts_with(FAV_ICON_SPLIT) {
            builder.push_favicon(key, favicon_value(trimmed));
        } else if trimmed.starts_with(TITLE_SPLIT) {
            builder.push_title(key, strip_marker(trimmed, TITLE_SPLIT));
        } else if trimmed.starts_with(HEADER_SPLIT) {
            builder.push_header(key, strip_marker(trimmed, HEADER_SPLIT));
        } else if let Some((kind, user_id)) = block_fence(trimmed) {
            trace!(kind = kind.as_str(), line = line_no, id = ?user_id, "opened block");
            if user_id.is_some() {
                builder.upsert_block_id(user_id);
            }
            open = Some(OpenBlock {
                kind,
                user_id,
                opened_at: line_no,
                body: Vec::new(),
            });
        } else if trimmed.starts_with(TAB_SPLIT) {
            builder.push_tabs(key, split_tab_row(trimmed), line_no);
        } else if let Some(link) = resolve_link(trimmed, &config.origin) {
            builder.push_link(key, link);
        } else {
            debug!(line = line_no, "dropped unrecognized line");
            builder.add_warning(
                WarningCode::DroppedLine,
                line_no,
                format!("`{trimmed}` is not a title, header, block, tab row, or link"),
            );
        }
    }

    if let Some(block) = open {
        debug!(
            kind = block.kind.as_str(),
            line = block.opened_at,
            "discarding unterminated block"
        );
        builder.add_warning(
            WarningCode::UnterminatedBlock,
            block.opened_at,
            format!(
                "{} block opened here is never closed with `{}`",
                block.kind.as_str(),
                block.kind.fence()
            ),
        );
    }

    debug!(
        lines = lines.len(),
        components = builder.component_count(),
        warnings = builder.warning_count(),
        "parsed schema"
    );
    builder.finish()
}

/// Re-indent a JSON body with two spaces, keeping key order.
fn pretty_json(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    serde_json::to_string_pretty(&value).ok()
}
