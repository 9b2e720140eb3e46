//! Self-contained `data:text/html,` links that carry a schema.
//!
//! The receiving page loads its stylesheet and script from `base_url` and
//! reads the schema back out of the `<script type='schema'>` element.

use nav_core::NavError;
use tracing::debug;

use crate::attributes::Attributes;
use crate::document::HtmlDocument;
use crate::element::Element;

pub const DATA_URL_PREFIX: &str = "data:text/html,";

const SCHEMA_OPENERS: [&str; 3] = [
    "<script type='schema'>",
    "<script type=\"schema\">",
    "<script type=schema>",
];
const SCRIPT_CLOSE: &str = "</script>";
const LOADING_TITLE: &str = "Loading...";

/// Build the full shareable page for `schema`, percent-encoded as a data URL.
///
/// The schema is embedded as-is, so a schema containing `</script>` cannot
/// be read back.
#[must_use]
pub fn generate_shareable_document(schema: &str, base_url: &str) -> String {
    let html = HtmlDocument::new()
        .lang("en")
        .head(Element::meta_charset())
        .head(Element::title(LOADING_TITLE))
        .head(Element::stylesheet(&format!("{base_url}/index.css")))
        .body(schema_script(schema))
        .body(Element::script_src(&format!("{base_url}/index.js")))
        .render();
    to_data_url(&html)
}

/// Lighter variant for bookmarks: no stylesheet, trimmed schema.
#[must_use]
pub fn generate_bookmarklet(schema: &str, base_url: &str) -> String {
    let html = HtmlDocument::new()
        .head(Element::meta_charset())
        .head(Element::title(LOADING_TITLE))
        .body(schema_script(schema.trim()))
        .body(Element::script_src(&format!("{base_url}/index.js")))
        .render();
    to_data_url(&html)
}

/// Decode a shareable or bookmarklet URL and return its trimmed schema.
pub fn extract_shared_schema(data_url: &str) -> Result<String, NavError> {
    let encoded = data_url
        .trim()
        .strip_prefix(DATA_URL_PREFIX)
        .ok_or_else(|| NavError::invalid_argument("expected a data:text/html, URL"))?;
    let html = urlencoding::decode(encoded).map_err(|err| {
        NavError::invalid_argument(format!("data URL is not percent-encoded UTF-8: {err}"))
    })?;

    let (opener_end, opener) = SCHEMA_OPENERS
        .iter()
        .filter_map(|opener| html.find(opener).map(|idx| (idx + opener.len(), *opener)))
        .min_by_key(|(idx, _)| *idx)
        .ok_or_else(|| NavError::invalid_argument("data URL has no embedded schema"))?;
    let body = &html[opener_end..];
    let close = body.find(SCRIPT_CLOSE).ok_or_else(|| {
        NavError::invalid_argument(format!("schema script `{opener}` is never closed"))
    })?;

    let schema = body[..close].trim().to_string();
    debug!(bytes = schema.len(), "extracted shared schema");
    Ok(schema)
}

fn schema_script(schema: &str) -> Element {
    Element::new("script")
        .attrs(Attributes::new().single("type", "schema"))
        .raw(schema)
}

fn to_data_url(html: &str) -> String {
    format!("{DATA_URL_PREFIX}{}", urlencoding::encode(html))
}

#[cfg(test)]
mod tests {
    use nav_core::NavErrorCode;
    use proptest::prelude::*;

    use super::{extract_shared_schema, generate_bookmarklet, generate_shareable_document};

    const BASE: &str = "https://synle.github.io/nav-generator";

    #[test]
    fn shareable_document_embeds_schema_and_assets() {
        let url = generate_shareable_document("! T\n# A\ngoogle.com", BASE);
        assert!(url.starts_with("data:text/html,%3C%21doctype%20html%3E"));
        let html = urlencoding::decode(&url["data:text/html,".len()..]).expect("decode");
        assert_eq!(
            html,
            "<!doctype html>
<html lang=\"en\">
  <head>
    <meta charset=\"UTF-8\" />
    <title>Loading...</title>
    <link rel=\"stylesheet\" href=\"https://synle.github.io/nav-generator/index.css\" />
  </head>
  <body>
    <script type='schema'>! T
# A
google.com</script>
    <script src=\"https://synle.github.io/nav-generator/index.js\"></script>
  </body>
</html>"
        );
    }

    #[test]
    fn bookmarklet_has_no_stylesheet_and_trims() {
        let url = generate_bookmarklet("\n  ! T\n", "http://localhost:8080");
        let html = urlencoding::decode(&url["data:text/html,".len()..]).expect("decode");
        assert!(!html.contains("stylesheet"));
        assert!(html.contains("<script type='schema'>! T</script>"));
        assert!(html.contains("<script src=\"http://localhost:8080/index.js\"></script>"));
        assert!(html.starts_with("<!doctype html>\n<html>\n"));
    }

    #[test]
    fn extracts_from_both_variants() {
        let schema = "! Shared\n# Links\nGoogle | google.com";
        assert_eq!(
            extract_shared_schema(&generate_shareable_document(schema, BASE)).expect("shareable"),
            schema
        );
        assert_eq!(
            extract_shared_schema(&generate_bookmarklet(schema, BASE)).expect("bookmarklet"),
            schema
        );
    }

    #[test]
    fn extracts_from_browser_encoded_urls() {
        // encodeURIComponent leaves `'` and `!` unescaped.
        let url = "data:text/html,%3Cscript%20type%3D'schema'%3E!%20Nav%0A%23%20A%3C%2Fscript%3E";
        assert_eq!(extract_shared_schema(url).expect("extract"), "! Nav\n# A");
    }

    #[test]
    fn rejects_foreign_urls() {
        let err = extract_shared_schema("https://example.com").expect_err("not a data url");
        assert_eq!(err.code(), NavErrorCode::InvalidArgument);
        assert!(extract_shared_schema("data:text/html,%3Cp%3Ehi%3C%2Fp%3E").is_err());
        assert!(extract_shared_schema("data:text/html,%FF").is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_share_round_trips_trimmed_schema(schema in "(?s).{0,200}") {
            prop_assume!(!schema.contains("</script>"));
            let url = generate_shareable_document(&schema, BASE);
            prop_assert_eq!(extract_shared_schema(&url).expect("round trip"), schema.trim());
        }
    }
}
