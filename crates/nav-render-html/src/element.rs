//! HTML element primitives with a fluent builder API.

use std::fmt::Write;

use crate::attributes::{Attributes, escape_html_text};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Content {
    Empty,
    Text(String),
    /// Emitted verbatim. Used for script bodies.
    Raw(String),
}

/// A single-line HTML element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: &'static str,
    attrs: Attributes,
    content: Content,
    void: bool,
}

impl Element {
    #[must_use]
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            attrs: Attributes::new(),
            content: Content::Empty,
            void: false,
        }
    }

    /// `<meta charset="UTF-8" />`
    #[must_use]
    pub fn meta_charset() -> Self {
        Self::void("meta").attr("charset", "UTF-8")
    }

    #[must_use]
    pub fn title(text: &str) -> Self {
        Self::new("title").text(text)
    }

    #[must_use]
    pub fn stylesheet(href: &str) -> Self {
        Self::void("link")
            .attr("rel", "stylesheet")
            .attr("href", href)
    }

    #[must_use]
    pub fn script_src(src: &str) -> Self {
        Self::new("script").attr("src", src)
    }

    /// An element with no closing tag, rendered as `<tag ... />`.
    fn void(tag: &'static str) -> Self {
        Self {
            void: true,
            ..Self::new(tag)
        }
    }

    #[must_use]
    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attrs = self.attrs.set(name, value);
        self
    }

    #[must_use]
    pub fn attrs(mut self, attrs: Attributes) -> Self {
        self.attrs = attrs;
        self
    }

    /// Escaped text content.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.content = Content::Text(text.into());
        self
    }

    /// Unescaped content.
    #[must_use]
    pub fn raw(mut self, body: impl Into<String>) -> Self {
        self.content = Content::Raw(body.into());
        self
    }

    pub fn write_to_string(&self, output: &mut String) {
        let _ = write!(output, "<{}{}", self.tag, self.attrs.render());
        if self.void {
            output.push_str(" />");
            return;
        }
        output.push('>');
        match &self.content {
            Content::Empty => {}
            Content::Text(text) => output.push_str(&escape_html_text(text)),
            Content::Raw(body) => output.push_str(body),
        }
        let _ = write!(output, "</{}>", self.tag);
    }

    #[must_use]
    pub fn render(&self) -> String {
        let mut output = String::new();
        self.write_to_string(&mut output);
        output
    }
}

#[cfg(test)]
mod tests {
    use super::Element;
    use crate::attributes::Attributes;

    #[test]
    fn void_elements_self_close() {
        assert_eq!(Element::meta_charset().render(), "<meta charset=\"UTF-8\" />");
        assert_eq!(
            Element::stylesheet("https://x.example/index.css").render(),
            "<link rel=\"stylesheet\" href=\"https://x.example/index.css\" />"
        );
    }

    #[test]
    fn text_is_escaped_and_raw_is_not() {
        assert_eq!(Element::title("A & B").render(), "<title>A &amp; B</title>");
        let script = Element::new("script")
            .attrs(Attributes::new().single("type", "schema"))
            .raw("! T\n# <b>");
        assert_eq!(script.render(), "<script type='schema'>! T\n# <b></script>");
    }

    #[test]
    fn empty_element_still_closes() {
        assert_eq!(
            Element::script_src("/index.js").render(),
            "<script src=\"/index.js\"></script>"
        );
    }
}
