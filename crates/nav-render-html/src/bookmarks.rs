//! Netscape bookmark file export, the format Chrome imports.

use std::fmt::Write;

use nav_core::SchemaComponent;

use crate::attributes::{escape_html_attr, escape_html_text};

pub const NO_BOOKMARKS: &str = "<!-- No bookmarks to export -->";
const DEFAULT_GROUP: &str = "Bookmarks";

struct Folder<'a> {
    name: &'a str,
    links: Vec<(&'a str, &'a str)>,
}

/// Render parsed components as a bookmark file.
///
/// Each header becomes a folder; links before the first header go into a
/// `Bookmarks` folder. Folders without links are left out. `timestamp` is
/// seconds since the Unix epoch, used for `ADD_DATE` and `LAST_MODIFIED`.
#[must_use]
pub fn export_chrome_bookmarks(components: &[SchemaComponent], timestamp: u64) -> String {
    let mut title = None;
    let mut folders: Vec<Folder<'_>> = Vec::new();

    for component in components {
        match component {
            SchemaComponent::Title(text) if title.is_none() => title = Some(text.value.as_str()),
            SchemaComponent::Header(text) => folders.push(Folder {
                name: &text.value,
                links: Vec::new(),
            }),
            SchemaComponent::Link(link) => {
                if folders.is_empty() {
                    folders.push(Folder {
                        name: DEFAULT_GROUP,
                        links: Vec::new(),
                    });
                }
                if let Some(folder) = folders.last_mut() {
                    folder.links.push((link.link_text.as_str(), link.link_url.as_str()));
                }
            }
            _ => {}
        }
    }

    folders.retain(|folder| !folder.links.is_empty());
    if folders.is_empty() {
        return NO_BOOKMARKS.to_string();
    }

    let title = escape_html_text(title.unwrap_or(DEFAULT_GROUP));
    let mut html = format!(
        "<!DOCTYPE NETSCAPE-Bookmark-file-1>
<!-- This is an automatically generated file.
     It will be read and overwritten.
     DO NOT EDIT! -->
<META HTTP-EQUIV=\"Content-Type\" CONTENT=\"text/html; charset=UTF-8\">
<TITLE>{title}</TITLE>
<H1>{title}</H1>
<DL><p>
"
    );

    for folder in &folders {
        let _ = writeln!(
            html,
            "    <DT><H3 ADD_DATE=\"{timestamp}\" LAST_MODIFIED=\"{timestamp}\">{}</H3>",
            escape_html_text(folder.name)
        );
        html.push_str("    <DL><p>\n");
        for (text, url) in &folder.links {
            let _ = writeln!(
                html,
                "        <DT><A HREF=\"{}\" ADD_DATE=\"{timestamp}\">{}</A>",
                escape_html_attr(url),
                escape_html_text(text)
            );
        }
        html.push_str("    </DL><p>\n");
    }
    html.push_str("</DL><p>\n");
    html
}

#[cfg(test)]
mod tests {
    use nav_parser::parse_schema;

    use super::{NO_BOOKMARKS, export_chrome_bookmarks};

    #[test]
    fn groups_links_by_header() {
        let parsed = parse_schema(
            "! My Links\nloose.com\n# Search\nGoogle | google.com\n# Empty\n# Q&A\nAsk | ask.com/?a=1&b=2",
            1,
        );
        let html = export_chrome_bookmarks(&parsed.components, 1_700_000_000);
        assert_eq!(
            html,
            "<!DOCTYPE NETSCAPE-Bookmark-file-1>
<!-- This is an automatically generated file.
     It will be read and overwritten.
     DO NOT EDIT! -->
<META HTTP-EQUIV=\"Content-Type\" CONTENT=\"text/html; charset=UTF-8\">
<TITLE>My Links</TITLE>
<H1>My Links</H1>
<DL><p>
    <DT><H3 ADD_DATE=\"1700000000\" LAST_MODIFIED=\"1700000000\">Bookmarks</H3>
    <DL><p>
        <DT><A HREF=\"https://loose.com\" ADD_DATE=\"1700000000\">loose.com</A>
    </DL><p>
    <DT><H3 ADD_DATE=\"1700000000\" LAST_MODIFIED=\"1700000000\">Search</H3>
    <DL><p>
        <DT><A HREF=\"https://google.com\" ADD_DATE=\"1700000000\">Google</A>
    </DL><p>
    <DT><H3 ADD_DATE=\"1700000000\" LAST_MODIFIED=\"1700000000\">Q&amp;A</H3>
    <DL><p>
        <DT><A HREF=\"https://ask.com/?a=1&amp;b=2\" ADD_DATE=\"1700000000\">Ask</A>
    </DL><p>
</DL><p>
"
        );
    }

    #[test]
    fn nothing_to_export() {
        assert_eq!(export_chrome_bookmarks(&[], 0), NO_BOOKMARKS);
        let parsed = parse_schema("! Only a title\n# Header", 1);
        assert_eq!(export_chrome_bookmarks(&parsed.components, 0), NO_BOOKMARKS);
    }
}
