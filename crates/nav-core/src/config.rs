//! Host-level configuration shared by the parser, the share/export helpers,
//! the CLI, and the wasm binding.

use serde::{Deserialize, Serialize};

use crate::NavError;

const DEFAULT_SHARE_BASE_URL: &str = "https://synle.github.io/nav-generator";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct NavConfig {
    pub parser: ParserConfig,
    pub share: ShareConfig,
    pub search: SearchConfig,
    pub page: PageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ParserConfig {
    /// Prepended to link URLs that start with `/`, e.g. `https://example.com`.
    pub origin: String,
    /// Text of the synthesized title, followed by ` - <timestamp>`.
    pub untitled_prefix: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            origin: String::new(),
            untitled_prefix: String::from("Unnamed Navigation"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ShareConfig {
    /// Where the receiving page loads `index.css` and `index.js` from.
    pub base_url: String,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_SHARE_BASE_URL),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SearchConfig {
    pub suggestion_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            suggestion_limit: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PageConfig {
    /// Favicon glyph used when the schema has no `@` line.
    pub default_favicon: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            default_favicon: String::from("📑"),
        }
    }
}

impl NavConfig {
    /// Check values that would otherwise produce broken URLs downstream.
    pub fn validate(&self) -> Result<(), NavError> {
        validate_base("parser.origin", &self.parser.origin, true)?;
        validate_base("share.base_url", &self.share.base_url, false)?;
        if self.search.suggestion_limit == 0 {
            return Err(NavError::config(
                "search.suggestion_limit",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

fn validate_base(field: &str, value: &str, allow_empty: bool) -> Result<(), NavError> {
    if value.is_empty() {
        return if allow_empty {
            Ok(())
        } else {
            Err(NavError::config(field, "must not be empty"))
        };
    }
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        return Err(NavError::config(
            field,
            format!("`{value}` must start with http:// or https://"),
        ));
    }
    if value.ends_with('/') {
        return Err(NavError::config(
            field,
            format!("`{value}` must not end with a slash"),
        ));
    }
    Ok(())
}
