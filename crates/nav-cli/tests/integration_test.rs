//! End-to-end tests: schema text through parsing, sorting, sharing and
//! export, plus a few runs of the `nav` binary itself.

use std::io::Write;
use std::process::{Command, Stdio};

use nav_core::{LinkType, SchemaComponent};
use nav_parser::{filter_suggestions, parse_schema, sort_schema_by_sections};
use nav_render_html::{
    export_chrome_bookmarks, extract_shared_schema, generate_bookmarklet,
    generate_shareable_document,
};

const SCHEMA: &str = "! Daily
@ 🚀
# Work
Jira | jira.example.com
Calendar ||| calendar.google.com
# Docs
Rust Book | doc.rust-lang.org/book
```
console.log(1)
```
# Apps
>>>Tab One|tab1>>>Tab Two|tab2
";

fn nav() -> Command {
    Command::new(env!("CARGO_BIN_EXE_nav"))
}

/// Parse, then check the pieces a page renders from.
#[test]
fn schema_parses_into_sections_with_stable_keys() {
    let parsed = parse_schema(SCHEMA, 1_000);
    assert!(parsed.warnings.is_empty(), "{:?}", parsed.warnings);
    assert_eq!(parsed.title(), Some("Daily"));
    assert_eq!(parsed.favicon(), Some("🚀"));

    let sections = parsed.sections();
    let names: Vec<&str> = sections.iter().map(|section| section.header_name).collect();
    assert_eq!(names, ["Work", "Docs"]);
    assert_eq!(sections[0].links[1].link_type, LinkType::NewTabLink);
    assert_eq!(sections[1].links[0].link_url, "https://doc.rust-lang.org/book");

    let keys: Vec<u64> = parsed.components.iter().map(SchemaComponent::key).collect();
    assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(keys.iter().all(|key| *key >= 1_000 && *key < parsed.next_counter));
}

/// Sorting reorders sections and keeps the same components.
#[test]
fn sorted_schema_parses_to_the_same_links() {
    let sorted = sort_schema_by_sections(SCHEMA);
    assert!(sorted.starts_with("! Daily\n@ 🚀\n\n# Apps\n"));
    assert_eq!(sort_schema_by_sections(&sorted), sorted);

    let before = parse_schema(SCHEMA, 1);
    let after = parse_schema(&sorted, 1);
    let mut before_urls: Vec<&str> = before.links().map(|link| link.link_url.as_str()).collect();
    let mut after_urls: Vec<&str> = after.links().map(|link| link.link_url.as_str()).collect();
    before_urls.sort_unstable();
    after_urls.sort_unstable();
    assert_eq!(before_urls, after_urls);
}

/// Share, extract, and re-parse gives back the same page.
#[test]
fn shared_schema_survives_the_round_trip() {
    let base = "https://synle.github.io/nav-generator";
    for url in [
        generate_shareable_document(SCHEMA, base),
        generate_bookmarklet(SCHEMA, base),
    ] {
        let extracted = extract_shared_schema(&url).expect("extract");
        assert_eq!(extracted, SCHEMA.trim());
        assert_eq!(
            parse_schema(&extracted, 1).components,
            parse_schema(SCHEMA, 1).components
        );
    }
}

#[test]
fn export_and_search_cover_every_link() {
    let parsed = parse_schema(SCHEMA, 1);
    let html = export_chrome_bookmarks(&parsed.components, 42);
    for link in parsed.links() {
        assert!(html.contains(&link.link_url), "missing {}", link.link_url);
    }
    assert!(!html.contains("Apps"));

    let texts: Vec<&str> = parsed.links().map(|link| link.link_text.as_str()).collect();
    assert_eq!(filter_suggestions("/rb", &texts, 10), [&"Rust Book"]);
    assert_eq!(filter_suggestions("CAL", &texts, 10), [&"Calendar"]);
    assert!(filter_suggestions("?rust", &texts, 10).is_empty());
}

#[test]
fn cli_parse_summary_reports_counts() {
    let output = nav()
        .args(["parse", SCHEMA, "--counter", "5"])
        .output()
        .expect("run nav");
    assert!(output.status.success());
    let summary: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("summary is JSON");
    assert_eq!(summary["title"], "Daily");
    assert_eq!(summary["link_count"], 3);
    assert_eq!(summary["favicon"], "🚀");
    assert_eq!(summary["source_sha256"].as_str().map(str::len), Some(64));
}

#[test]
fn cli_parse_full_and_counter_bounds() {
    let output = nav()
        .args(["parse", "! T\na.com", "--full", "--counter", "9223372036854775806"])
        .output()
        .expect("run nav");
    assert!(output.status.success());
    let full: serde_json::Value = serde_json::from_slice(&output.stdout).expect("full is JSON");
    assert_eq!(full["components"][0]["key"], 9_223_372_036_854_775_806_u64);
    assert_eq!(full["nextCounter"], 9_223_372_036_854_775_808_u64);

    let too_big = nav()
        .args(["parse", "! T", "--counter", "18446744073709551615"])
        .output()
        .expect("run nav");
    assert!(!too_big.status.success());
}

#[test]
fn cli_sort_in_place_rewrites_the_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nav.txt");
    std::fs::write(&path, "! T\n# B\nb.com\n# A\na.com\n").expect("write");

    let status = nav()
        .args(["sort", "--in-place"])
        .arg(&path)
        .status()
        .expect("run nav");
    assert!(status.success());
    assert_eq!(
        std::fs::read_to_string(&path).expect("read"),
        "! T\n\n# A\na.com\n\n# B\nb.com\n"
    );
}

#[test]
fn cli_lint_strict_fails_on_warnings() {
    let output = nav()
        .args(["lint", "--strict", "--json", "! T\n```js\nopen"])
        .output()
        .expect("run nav");
    assert!(!output.status.success());
    let result: serde_json::Value = serde_json::from_slice(&output.stdout).expect("JSON");
    assert_eq!(result["warnings"][0]["code"], "nav/warn/unterminated-block");

    let clean = nav()
        .args(["lint", "--strict", "! T\na.com"])
        .output()
        .expect("run nav");
    assert!(clean.status.success());
}

#[test]
fn cli_share_then_extract_via_stdin() {
    let share = nav()
        .args(["share", "! Piped\nx.com", "--base-url", "http://localhost:3000"])
        .output()
        .expect("run nav");
    assert!(share.status.success());

    let mut extract = nav()
        .args(["extract", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn nav");
    extract
        .stdin
        .take()
        .expect("stdin")
        .write_all(&share.stdout)
        .expect("pipe data url");
    let output = extract.wait_with_output().expect("wait");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "! Piped\nx.com\n");
}

#[test]
fn cli_rejects_bad_base_url_and_config() {
    let share = nav()
        .args(["share", "! T", "--base-url", "ftp://nope/"])
        .output()
        .expect("run nav");
    assert!(!share.status.success());

    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("nav.toml");
    std::fs::write(&config, "[share]\nbase_url = \"not a url\"\n").expect("write");
    let output = nav()
        .arg("--config")
        .arg(&config)
        .args(["parse", "! T"])
        .output()
        .expect("run nav");
    assert!(!output.status.success());
}
