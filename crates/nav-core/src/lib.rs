#![forbid(unsafe_code)]

mod config;

pub use config::{NavConfig, PageConfig, ParserConfig, SearchConfig, ShareConfig};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix of a title line.
pub const TITLE_SPLIT: &str = "!";
/// Prefix of a section header line.
pub const HEADER_SPLIT: &str = "#";
/// Prefix of a favicon line.
pub const FAV_ICON_SPLIT: &str = "@";
/// Fence of a code block.
pub const CODE_BLOCK_SPLIT: &str = "```";
/// Fence of an HTML block.
pub const HTML_BLOCK_SPLIT: &str = "---";
/// Separator between tab entries on a tab row.
pub const TAB_SPLIT: &str = ">>>";
/// Separator between tab name and tab id.
pub const TAB_TITLE_SPLIT: &str = "|";
/// Same-tab link separator.
pub const SAME_TAB_LINK_SPLIT: &str = "|";
/// New-tab link separator.
pub const NEW_TAB_LINK_SPLIT: &str = "|||";
/// Scheme of inline script links.
pub const JS_LINK_SCHEME: &str = "javascript://";
/// Scheme of embedded data URL links.
pub const DATA_LINK_SCHEME: &str = "data:";
/// Prefix of comment lines.
pub const COMMENT_PREFIX: &str = "//";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum NavErrorCode {
    #[default]
    InvalidArgument,
    Config,
    Serialization,
}

impl NavErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "nav/error/invalid-argument",
            Self::Config => "nav/error/config",
            Self::Serialization => "nav/error/serialization",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Error, PartialEq, Eq)]
pub enum NavError {
    /// A caller broke the input contract (e.g. passed a non-string schema).
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },
    #[error("invalid config value for `{field}`: {message}")]
    Config { field: String, message: String },
    #[error("serialization failed: {message}")]
    Serialization { message: String },
}

impl NavError {
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            field: field.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn code(&self) -> NavErrorCode {
        match self {
            Self::InvalidArgument { .. } => NavErrorCode::InvalidArgument,
            Self::Config { .. } => NavErrorCode::Config,
            Self::Serialization { .. } => NavErrorCode::Serialization,
        }
    }
}

impl From<serde_json::Error> for NavError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum WarningCode {
    /// A non-empty line matched no grammar rule and was dropped.
    #[default]
    DroppedLine,
    /// A tab row entry was missing its name or id.
    MalformedTab,
    /// A fenced block was still open at end of input.
    UnterminatedBlock,
}

impl WarningCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DroppedLine => "nav/warn/dropped-line",
            Self::MalformedTab => "nav/warn/malformed-tab",
            Self::UnterminatedBlock => "nav/warn/unterminated-block",
        }
    }
}

/// A recoverable oddity found while parsing. Never fatal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ParseWarning {
    pub code: WarningCode,
    pub message: String,
    /// 1-based line number in the whitespace-trimmed input text.
    pub line: usize,
}

impl ParseWarning {
    #[must_use]
    pub fn new(code: WarningCode, line: usize, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            line,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum LinkType {
    #[default]
    NewTabLink,
    SameTabLink,
    JsLink,
    DataLink,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum BlockKind {
    #[default]
    Code,
    Html,
}

impl BlockKind {
    /// The fence token that opens and closes this kind of block.
    #[must_use]
    pub const fn fence(self) -> &'static str {
        match self {
            Self::Code => CODE_BLOCK_SPLIT,
            Self::Html => HTML_BLOCK_SPLIT,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Html => "html",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TextComponent {
    pub key: u64,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TabEntry {
    pub tab_id: String,
    pub tab_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TabsComponent {
    pub key: u64,
    pub tab_content: Vec<TabEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct BlockComponent {
    pub key: u64,
    pub id: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LinkComponent {
    pub key: u64,
    pub link_type: LinkType,
    pub link_text: String,
    pub link_url: String,
    pub header_name: String,
}

impl LinkComponent {
    /// The script carried by a `jsLink`, if this is one.
    ///
    /// Nothing in this workspace evaluates it; a host that wants script
    /// links to do anything has to run [`InlineScript::code`] itself.
    #[must_use]
    pub fn inline_script(&self) -> Option<InlineScript<'_>> {
        (self.link_type == LinkType::JsLink).then_some(InlineScript {
            code: &self.link_url,
        })
    }
}

/// Opaque handle to the wrapped script of a `jsLink`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineScript<'a> {
    code: &'a str,
}

impl<'a> InlineScript<'a> {
    /// The async IIFE source, e.g. `(async () => { alert(1) })()`.
    #[must_use]
    pub const fn code(&self) -> &'a str {
        self.code
    }
}

/// One typed record of a parsed schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SchemaComponent {
    Title(TextComponent),
    FavIcon(TextComponent),
    Header(TextComponent),
    Tabs(TabsComponent),
    CodeBlock(BlockComponent),
    HtmlBlock(BlockComponent),
    Link(LinkComponent),
}

impl SchemaComponent {
    #[must_use]
    pub const fn key(&self) -> u64 {
        match self {
            Self::Title(c) | Self::FavIcon(c) | Self::Header(c) => c.key,
            Self::Tabs(c) => c.key,
            Self::CodeBlock(c) | Self::HtmlBlock(c) => c.key,
            Self::Link(c) => c.key,
        }
    }

    #[must_use]
    pub const fn kind_str(&self) -> &'static str {
        match self {
            Self::Title(_) => "title",
            Self::FavIcon(_) => "favIcon",
            Self::Header(_) => "header",
            Self::Tabs(_) => "tabs",
            Self::CodeBlock(_) => "codeBlock",
            Self::HtmlBlock(_) => "htmlBlock",
            Self::Link(_) => "link",
        }
    }

    #[must_use]
    pub const fn as_link(&self) -> Option<&LinkComponent> {
        match self {
            Self::Link(link) => Some(link),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_block(&self) -> Option<(BlockKind, &BlockComponent)> {
        match self {
            Self::CodeBlock(block) => Some((BlockKind::Code, block)),
            Self::HtmlBlock(block) => Some((BlockKind::Html, block)),
            _ => None,
        }
    }
}
