#![forbid(unsafe_code)]

//! HTML output for navigation schemas: shareable data URLs and Chrome
//! bookmark export.

mod attributes;
mod bookmarks;
mod document;
mod element;
mod share;

pub use attributes::{Attributes, escape_html_attr, escape_html_text};
pub use bookmarks::{NO_BOOKMARKS, export_chrome_bookmarks};
pub use document::HtmlDocument;
pub use element::Element;
pub use share::{
    DATA_URL_PREFIX, extract_shared_schema, generate_bookmarklet, generate_shareable_document,
};
