use nav_core::{
    BlockComponent, BlockKind, LinkComponent, ParseWarning, SchemaComponent, TabEntry,
    TabsComponent, TextComponent, WarningCode,
};

use crate::ParseResult;
use crate::block_ids::BlockIdAllocator;
use crate::line::TabRow;
use crate::link::ResolvedLink;

/// Accumulates components in source order and owns the key counter for one
/// parse call.
pub(crate) struct ComponentBuilder {
    components: Vec<SchemaComponent>,
    block_ids: BlockIdAllocator,
    warnings: Vec<ParseWarning>,
    counter: u64,
    current_header: String,
}

impl ComponentBuilder {
    pub(crate) fn new(starting_counter: u64) -> Self {
        Self {
            components: Vec::new(),
            block_ids: BlockIdAllocator::new(),
            warnings: Vec::new(),
            counter: starting_counter,
            current_header: String::new(),
        }
    }

    /// Draw the key for the line being processed.
    pub(crate) fn next_key(&mut self) -> u64 {
        let key = self.counter;
        self.counter = self.counter.saturating_add(1);
        key
    }

    pub(crate) fn upsert_block_id(&mut self, user_id: Option<&str>) -> String {
        self.block_ids.upsert(user_id, &mut self.counter)
    }

    pub(crate) fn add_warning(&mut self, code: WarningCode, line: usize, message: impl Into<String>) {
        self.warnings.push(ParseWarning::new(code, line, message));
    }

    pub(crate) fn component_count(&self) -> usize {
        self.components.len()
    }

    pub(crate) fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub(crate) fn push_title(&mut self, key: u64, value: String) {
        self.components
            .push(SchemaComponent::Title(TextComponent { key, value }));
    }

    pub(crate) fn push_favicon(&mut self, key: u64, value: String) {
        self.components
            .push(SchemaComponent::FavIcon(TextComponent { key, value }));
    }

    pub(crate) fn push_header(&mut self, key: u64, value: String) {
        self.current_header.clone_from(&value);
        self.components
            .push(SchemaComponent::Header(TextComponent { key, value }));
    }

    pub(crate) fn push_tabs(&mut self, key: u64, row: TabRow, line: usize) {
        for segment in row.malformed {
            self.add_warning(
                WarningCode::MalformedTab,
                line,
                format!("tab entry `{segment}` needs both a name and an id"),
            );
        }

        let tab_content = row
            .entries
            .into_iter()
            .map(|entry| TabEntry {
                tab_id: self.upsert_block_id(Some(&entry.user_id)),
                tab_name: entry.tab_name,
            })
            .collect();

        self.components
            .push(SchemaComponent::Tabs(TabsComponent { key, tab_content }));
    }

    /// Emit a closed block. Closing a block also ends the current section.
    pub(crate) fn push_block(
        &mut self,
        key: u64,
        kind: BlockKind,
        user_id: Option<&str>,
        value: String,
    ) {
        let block = BlockComponent {
            key,
            id: self.upsert_block_id(user_id),
            value,
        };
        self.components.push(match kind {
            BlockKind::Code => SchemaComponent::CodeBlock(block),
            BlockKind::Html => SchemaComponent::HtmlBlock(block),
        });
        self.current_header.clear();
    }

    pub(crate) fn push_link(&mut self, key: u64, link: ResolvedLink) {
        let link_url = link.component_url();
        self.components.push(SchemaComponent::Link(LinkComponent {
            key,
            link_type: link.link_type,
            link_text: link.link_text,
            link_url,
            header_name: self.current_header.clone(),
        }));
    }

    pub(crate) fn finish(self) -> ParseResult {
        ParseResult {
            components: self.components,
            next_counter: self.counter,
            warnings: self.warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use nav_core::{BlockKind, SchemaComponent};

    use super::ComponentBuilder;

    #[test]
    fn closing_a_block_resets_the_section() {
        let mut builder = ComponentBuilder::new(1);
        let key = builder.next_key();
        builder.push_header(key, "Work".to_string());
        let key = builder.next_key();
        builder.push_block(key, BlockKind::Code, None, "x".to_string());
        let link = crate::link::parse_link_line("a.com").expect("bare link");
        let key = builder.next_key();
        builder.push_link(key, link);

        let result = builder.finish();
        let SchemaComponent::Link(link) = &result.components[2] else {
            panic!("expected link component");
        };
        assert_eq!(link.header_name, "");
        // three line keys plus one generated block id
        assert_eq!(result.next_counter, 5);
    }
}
