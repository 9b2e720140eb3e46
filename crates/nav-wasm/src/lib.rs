#![forbid(unsafe_code)]

use std::sync::{LazyLock, RwLock};

use nav_core::{NavConfig, NavError};
use nav_parser::{
    ParseResult, SchemaParser, build_search_matcher, filter_suggestions, parse_schema_with,
    sort_schema_by_sections,
};
use nav_render_html::{
    export_chrome_bookmarks, extract_shared_schema, generate_bookmarklet,
    generate_shareable_document,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use wasm_bindgen::JsValue;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::wasm_bindgen;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RuntimeInitConfig {
    parser: ParserOverrides,
    share: ShareOverrides,
    search: SearchOverrides,
    page: PageOverrides,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ParserOverrides {
    origin: Option<String>,
    untitled_prefix: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ShareOverrides {
    base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SearchOverrides {
    suggestion_limit: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PageOverrides {
    default_favicon: Option<String>,
}

/// Parse output plus the document-level values a page needs up front.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ParseOutput {
    #[serde(flatten)]
    parsed: ParseResult,
    title: Option<String>,
    favicon: String,
}

impl ParseOutput {
    fn new(parsed: ParseResult, default_favicon: &str) -> Self {
        Self {
            title: parsed.title().map(str::to_string),
            favicon: parsed.favicon_or(default_favicon).to_string(),
            parsed,
        }
    }
}

static RUNTIME_CONFIG: LazyLock<RwLock<NavConfig>> =
    LazyLock::new(|| RwLock::new(NavConfig::default()));

fn read_runtime_config() -> NavConfig {
    match RUNTIME_CONFIG.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

fn write_runtime_config(config: NavConfig) {
    match RUNTIME_CONFIG.write() {
        Ok(mut guard) => *guard = config,
        Err(poisoned) => {
            let mut guard = poisoned.into_inner();
            *guard = config;
        }
    }
}

fn js_error(message: impl Into<String>) -> JsValue {
    JsValue::from_str(&message.into())
}

fn nav_error(err: &NavError) -> JsValue {
    js_error(format!("{}: {err}", err.code().as_str()))
}

fn parse_js_value_or_default<T>(value: Option<JsValue>) -> Result<T, JsValue>
where
    T: for<'de> Deserialize<'de> + Default,
{
    match value {
        None => Ok(T::default()),
        Some(raw) if raw.is_undefined() || raw.is_null() => Ok(T::default()),
        Some(raw) => {
            #[cfg(target_arch = "wasm32")]
            {
                serde_wasm_bindgen::from_value(raw)
                    .map_err(|err| js_error(format!("invalid config: {err}")))
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                let _ = raw;
                Ok(T::default())
            }
        }
    }
}

fn to_js_value<T>(value: &T) -> Result<JsValue, JsValue>
where
    T: Serialize,
{
    #[cfg(target_arch = "wasm32")]
    {
        serde_wasm_bindgen::to_value(value)
            .map_err(|err| js_error(format!("failed to serialize response: {err}")))
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        serde_json::to_string(value)
            .map(|json| JsValue::from_str(&json))
            .map_err(|err| js_error(format!("failed to serialize response: {err}")))
    }
}

fn merge_config(base: &NavConfig, overrides: &RuntimeInitConfig) -> Result<NavConfig, NavError> {
    let mut merged = base.clone();

    if let Some(value) = overrides.parser.origin.as_ref() {
        merged.parser.origin.clone_from(value);
    }
    if let Some(value) = overrides.parser.untitled_prefix.as_ref() {
        merged.parser.untitled_prefix.clone_from(value);
    }
    if let Some(value) = overrides.share.base_url.as_ref() {
        merged.share.base_url.clone_from(value);
    }
    if let Some(value) = overrides.search.suggestion_limit {
        merged.search.suggestion_limit = value;
    }
    if let Some(value) = overrides.page.default_favicon.as_ref() {
        merged.page.default_favicon.clone_from(value);
    }

    merged.validate()?;
    Ok(merged)
}

/// Schema text has to arrive as a JS string.
fn require_schema_text(value: Option<String>) -> Result<String, NavError> {
    value.ok_or_else(|| NavError::invalid_argument("schema must be a string"))
}

fn now_millis() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now() as u64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or_default()
    }
}

/// JS numbers for counters and timestamps; negative or NaN becomes 0.
fn js_number_to_u64(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value as u64
    } else {
        0
    }
}

fn parse_output(text: &str, starting_counter: u64, config: &NavConfig) -> ParseOutput {
    let parsed = parse_schema_with(text, starting_counter, &config.parser);
    ParseOutput::new(parsed, &config.page.default_favicon)
}

/// Convert a byte range in `text` to UTF-16 code unit offsets for JS.
fn utf16_range(text: &str, range: std::ops::Range<usize>) -> [u32; 2] {
    let to_units = |end: usize| {
        let units = text.get(..end).map_or(0, |prefix| prefix.encode_utf16().count());
        u32::try_from(units).unwrap_or(u32::MAX)
    };
    [to_units(range.start), to_units(range.end)]
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
pub fn init(config: Option<JsValue>) -> Result<(), JsValue> {
    let overrides: RuntimeInitConfig = parse_js_value_or_default(config)?;
    let next = merge_config(&read_runtime_config(), &overrides).map_err(|err| nav_error(&err))?;
    debug!(base_url = %next.share.base_url, "runtime config updated");
    write_runtime_config(next);
    Ok(())
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen(js_name = parseSchema))]
pub fn parse_schema_js(text: JsValue, starting_counter: Option<f64>) -> Result<JsValue, JsValue> {
    let text = require_schema_text(text.as_string()).map_err(|err| nav_error(&err))?;
    let counter = starting_counter.map_or_else(now_millis, js_number_to_u64);
    to_js_value(&parse_output(&text, counter, &read_runtime_config()))
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen(js_name = sortSchema))]
#[must_use]
pub fn sort_schema_js(text: &str) -> String {
    sort_schema_by_sections(text)
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen(js_name = classifyLine))]
pub fn classify_line_js(line: &str) -> Result<JsValue, JsValue> {
    to_js_value(&nav_parser::classify_line(line))
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen(js_name = parseLinkLine))]
pub fn parse_link_line_js(line: &str) -> Result<JsValue, JsValue> {
    to_js_value(&nav_parser::parse_link_line(line))
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen(js_name = filterSuggestions))]
#[must_use]
pub fn filter_suggestions_js(
    query: &str,
    suggestions: Vec<String>,
    limit: Option<u32>,
) -> Vec<String> {
    let limit = limit.map_or_else(
        || read_runtime_config().search.suggestion_limit,
        |limit| limit as usize,
    );
    filter_suggestions(query, &suggestions, limit)
        .into_iter()
        .cloned()
        .collect()
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen(js_name = generateShareableDocument))]
#[must_use]
pub fn generate_shareable_document_js(schema: &str, base_url: Option<String>) -> String {
    let base_url = base_url.unwrap_or_else(|| read_runtime_config().share.base_url);
    generate_shareable_document(schema, &base_url)
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen(js_name = generateBookmarklet))]
#[must_use]
pub fn generate_bookmarklet_js(schema: &str, base_url: Option<String>) -> String {
    let base_url = base_url.unwrap_or_else(|| read_runtime_config().share.base_url);
    generate_bookmarklet(schema, &base_url)
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen(js_name = extractSharedSchema))]
pub fn extract_shared_schema_js(data_url: &str) -> Result<String, JsValue> {
    extract_shared_schema(data_url).map_err(|err| nav_error(&err))
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen(js_name = exportChromeBookmarks))]
#[must_use]
pub fn export_chrome_bookmarks_js(schema: &str, timestamp: Option<f64>) -> String {
    let config = read_runtime_config();
    let parsed = parse_schema_with(schema, now_millis(), &config.parser);
    let timestamp = timestamp.map_or_else(|| now_millis() / 1000, js_number_to_u64);
    export_chrome_bookmarks(&parsed.components, timestamp)
}

/// Compiled search query. Build with `SearchMatcher.build(query)`, which
/// returns `undefined` for a fuzzy query with nothing to match.
#[cfg_attr(target_arch = "wasm32", wasm_bindgen(js_name = SearchMatcher))]
#[derive(Debug, Clone)]
pub struct WasmSearchMatcher {
    inner: nav_parser::SearchMatcher,
}

impl WasmSearchMatcher {
    #[must_use]
    pub fn from_query(query: &str) -> Option<Self> {
        build_search_matcher(query).map(|inner| Self { inner })
    }

    #[must_use]
    pub fn mode_str(&self) -> String {
        self.inner.mode().as_str().to_string()
    }

    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        self.inner.is_match(text)
    }

    /// `[start, end]` in UTF-16 code units, ready for `String.prototype.slice`.
    #[must_use]
    pub fn highlight_range(&self, text: &str) -> Option<Vec<u32>> {
        self.inner
            .find(text)
            .map(|range| utf16_range(text, range).to_vec())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(js_class = SearchMatcher)]
impl WasmSearchMatcher {
    pub fn build(query: &str) -> Option<WasmSearchMatcher> {
        Self::from_query(query)
    }

    #[wasm_bindgen(getter)]
    pub fn mode(&self) -> String {
        self.mode_str()
    }

    #[wasm_bindgen(getter)]
    pub fn pattern(&self) -> String {
        self.inner.pattern().to_string()
    }

    #[wasm_bindgen(js_name = isMatch)]
    pub fn is_match(&self, text: &str) -> bool {
        self.matches(text)
    }

    pub fn find(&self, text: &str) -> Option<Vec<u32>> {
        self.highlight_range(text)
    }
}

/// A parser that keeps its key counter between calls.
#[cfg_attr(target_arch = "wasm32", wasm_bindgen(js_name = NavParser))]
#[derive(Debug, Clone)]
pub struct WasmNavParser {
    inner: SchemaParser,
}

impl WasmNavParser {
    #[must_use]
    pub fn with_counter(counter: u64) -> Self {
        Self {
            inner: SchemaParser::with_counter(counter)
                .with_config(read_runtime_config().parser),
        }
    }

    #[must_use]
    pub const fn current_counter(&self) -> u64 {
        self.inner.counter()
    }

    fn parse_text(&mut self, text: &str) -> ParseOutput {
        let parsed = self.inner.parse(text);
        ParseOutput::new(parsed, &read_runtime_config().page.default_favicon)
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(js_class = NavParser)]
impl WasmNavParser {
    #[wasm_bindgen(constructor)]
    pub fn new(starting_counter: Option<f64>) -> WasmNavParser {
        Self::with_counter(starting_counter.map_or_else(now_millis, js_number_to_u64))
    }

    pub fn parse(&mut self, text: JsValue) -> Result<JsValue, JsValue> {
        let text = require_schema_text(text.as_string()).map_err(|err| nav_error(&err))?;
        to_js_value(&self.parse_text(&text))
    }

    #[wasm_bindgen(getter)]
    pub fn counter(&self) -> f64 {
        self.current_counter() as f64
    }
}
