use nav_core::{
    DATA_LINK_SCHEME, JS_LINK_SCHEME, LinkType, NEW_TAB_LINK_SPLIT, SAME_TAB_LINK_SPLIT,
};
use serde::Serialize;
use unicode_segmentation::UnicodeSegmentation;
use url::Url;

const JS_LINK_TEXT: &str = "JS Link";
const DATA_LINK_TEXT: &str = "Data URL Link";
const FALLBACK_TEXT_GRAPHEMES: usize = 20;

/// A link line after separator resolution, URL normalization, and scheme
/// reclassification, but before script links are wrapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLink {
    #[serde(rename = "type")]
    pub link_type: LinkType,
    pub link_text: String,
    pub link_url: String,
}

impl ResolvedLink {
    /// The URL stored on the emitted component: script links become an
    /// async IIFE, everything else is unchanged.
    #[must_use]
    pub fn component_url(&self) -> String {
        match self.link_type {
            LinkType::JsLink => wrap_script(&self.link_url),
            _ => self.link_url.clone(),
        }
    }
}

/// Resolve a single link line with no page origin.
#[must_use]
pub fn parse_link_line(line: &str) -> Option<ResolvedLink> {
    resolve_link(line, "")
}

/// Resolve a link line. `origin` is prefixed to URLs starting with `/`.
#[must_use]
pub fn resolve_link(line: &str, origin: &str) -> Option<ResolvedLink> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (link_type, raw_text, raw_url, bare) = split_link(trimmed)?;
    let raw_url = raw_url.trim();
    if raw_url.is_empty() {
        return None;
    }

    let link_url = normalize_url(raw_url, origin);
    let link_type = reclassify(link_type, &link_url);

    let mut link_text = raw_text.trim().to_string();
    if bare && matches!(link_type, LinkType::JsLink | LinkType::DataLink) {
        link_text.clear();
    }
    if link_text.is_empty() {
        link_text = auto_link_text(link_type, &link_url);
    }

    Some(ResolvedLink {
        link_type,
        link_text,
        link_url,
    })
}

/// Pick the separator and split into `(type, text, url, bare)`.
fn split_link(trimmed: &str) -> Option<(LinkType, &str, &str, bool)> {
    let new_tab_idx = trimmed.find(NEW_TAB_LINK_SPLIT);
    let same_tab_idx = trimmed.find(SAME_TAB_LINK_SPLIT);

    // `|` is a substring of `|||`, so prefer `|||` only when it is the first pipe.
    if let Some(idx) = new_tab_idx
        && same_tab_idx.is_none_or(|same| idx <= same)
    {
        return Some((
            LinkType::NewTabLink,
            &trimmed[..idx],
            &trimmed[idx + NEW_TAB_LINK_SPLIT.len()..],
            false,
        ));
    }

    if let Some(idx) = same_tab_idx {
        return Some((
            LinkType::SameTabLink,
            &trimmed[..idx],
            &trimmed[idx + SAME_TAB_LINK_SPLIT.len()..],
            false,
        ));
    }

    looks_like_bare_url(trimmed).then_some((LinkType::NewTabLink, trimmed, trimmed, true))
}

/// Bare lines only count as links when they look like an address.
fn looks_like_bare_url(trimmed: &str) -> bool {
    trimmed.contains('.') || has_known_scheme(trimmed)
}

fn has_known_scheme(url: &str) -> bool {
    url.starts_with("http://")
        || url.starts_with("https://")
        || url.starts_with(JS_LINK_SCHEME)
        || url.starts_with(DATA_LINK_SCHEME)
}

fn normalize_url(url: &str, origin: &str) -> String {
    if url.starts_with('/') {
        format!("{origin}{url}")
    } else if has_known_scheme(url) {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

fn reclassify(link_type: LinkType, url: &str) -> LinkType {
    if url.starts_with(JS_LINK_SCHEME) {
        LinkType::JsLink
    } else if url.starts_with(DATA_LINK_SCHEME) {
        LinkType::DataLink
    } else {
        link_type
    }
}

fn wrap_script(url: &str) -> String {
    let code = url.strip_prefix(JS_LINK_SCHEME).unwrap_or(url);
    format!("(async () => {{ {code} }})()")
}

fn auto_link_text(link_type: LinkType, url: &str) -> String {
    match link_type {
        LinkType::JsLink => JS_LINK_TEXT.to_string(),
        LinkType::DataLink => DATA_LINK_TEXT.to_string(),
        LinkType::NewTabLink | LinkType::SameTabLink => {
            root_domain_name(url).unwrap_or_else(|| truncated_fallback(url))
        }
    }
}

/// `https://www.finance.google.com/x` -> `google`.
fn root_domain_name(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    let labels: Vec<&str> = host.split('.').collect();
    let name = if labels.len() >= 2 {
        labels[labels.len() - 2]
    } else {
        host
    };
    (!name.is_empty()).then(|| name.to_string())
}

fn truncated_fallback(url: &str) -> String {
    let head: String = url.graphemes(true).take(FALLBACK_TEXT_GRAPHEMES).collect();
    format!("{head}...")
}

#[cfg(test)]
mod tests {
    use nav_core::LinkType;

    use super::{ResolvedLink, parse_link_line, resolve_link};

    fn link(link_type: LinkType, text: &str, url: &str) -> Option<ResolvedLink> {
        Some(ResolvedLink {
            link_type,
            link_text: text.to_string(),
            link_url: url.to_string(),
        })
    }

    #[test]
    fn new_tab_separator() {
        assert_eq!(
            parse_link_line("Google ||| google.com"),
            link(LinkType::NewTabLink, "Google", "https://google.com")
        );
    }

    #[test]
    fn same_tab_separator() {
        assert_eq!(
            parse_link_line("Google | google.com"),
            link(LinkType::SameTabLink, "Google", "https://google.com")
        );
    }

    #[test]
    fn later_triple_pipe_does_not_win_over_first_single_pipe() {
        assert_eq!(
            parse_link_line("Search | example.com/?q=a|||b"),
            link(LinkType::SameTabLink, "Search", "https://example.com/?q=a|||b")
        );
    }

    #[test]
    fn pipes_inside_new_tab_url_are_kept() {
        assert_eq!(
            parse_link_line("Test ||| https://example.com?a=b|c=d"),
            link(LinkType::NewTabLink, "Test", "https://example.com?a=b|c=d")
        );
    }

    #[test]
    fn script_link_keeps_raw_url_until_wrapped() {
        let resolved = parse_link_line("Alert | javascript://alert('hi')").expect("js link");
        assert_eq!(resolved.link_type, LinkType::JsLink);
        assert_eq!(resolved.link_text, "Alert");
        assert_eq!(resolved.link_url, "javascript://alert('hi')");
        assert_eq!(resolved.component_url(), "(async () => { alert('hi') })()");
    }

    #[test]
    fn data_link_is_not_prefixed() {
        assert_eq!(
            parse_link_line("Data | data:text/html,<html></html>"),
            link(LinkType::DataLink, "Data", "data:text/html,<html></html>")
        );
    }

    #[test]
    fn bare_url_uses_its_own_text() {
        assert_eq!(
            parse_link_line("google.com"),
            link(LinkType::NewTabLink, "google.com", "https://google.com")
        );
        assert_eq!(
            parse_link_line("http://google.com"),
            link(LinkType::NewTabLink, "http://google.com", "http://google.com")
        );
    }

    #[test]
    fn bare_word_without_dot_is_not_a_link() {
        assert_eq!(parse_link_line("Some random text"), None);
        assert_eq!(parse_link_line("localhost"), None);
    }

    #[test]
    fn bare_script_link_gets_generated_text() {
        let resolved = parse_link_line("javascript://alert(1)").expect("bare js");
        assert_eq!(resolved.link_type, LinkType::JsLink);
        assert_eq!(resolved.link_text, "JS Link");
    }

    #[test]
    fn empty_lines_and_missing_urls_are_rejected() {
        assert_eq!(parse_link_line(""), None);
        assert_eq!(parse_link_line("   "), None);
        assert_eq!(parse_link_line("Google |"), None);
        assert_eq!(parse_link_line("Google |||   "), None);
    }

    #[test]
    fn root_relative_urls_get_the_origin() {
        assert_eq!(
            resolve_link("Docs | /docs/index.html", "https://home.example"),
            link(
                LinkType::SameTabLink,
                "Docs",
                "https://home.example/docs/index.html"
            )
        );
    }

    #[test]
    fn missing_text_is_generated_from_the_host() {
        let resolved = parse_link_line("| finance.google.com").expect("link");
        assert_eq!(resolved.link_text, "google");
        let resolved = parse_link_line("||| https://www.cnbc.com/world").expect("link");
        assert_eq!(resolved.link_text, "cnbc");
        let resolved = parse_link_line("| javascript://confirm('sure?')").expect("link");
        assert_eq!(resolved.link_text, "JS Link");
        let resolved = parse_link_line("| data:text/plain,hi").expect("link");
        assert_eq!(resolved.link_text, "Data URL Link");
    }

    #[test]
    fn unparseable_url_falls_back_to_truncated_text() {
        // Root-relative with no origin cannot be parsed as an absolute URL.
        let resolved = parse_link_line("| /a/very/long/relative/path/here").expect("link");
        assert_eq!(resolved.link_url, "/a/very/long/relative/path/here");
        assert_eq!(resolved.link_text, "/a/very/long/relativ...");
    }
}
