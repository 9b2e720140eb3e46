//! HTML attributes with escaping.

use std::fmt::Write;

/// Which quote character wraps an attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quote {
    #[default]
    Double,
    Single,
}

impl Quote {
    const fn as_char(self) -> char {
        match self {
            Self::Double => '"',
            Self::Single => '\'',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
    pub quote: Quote,
}

/// Ordered attribute list; rendering keeps insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    attrs: Vec<Attribute>,
}

impl Attributes {
    #[must_use]
    pub fn new() -> Self {
        Self { attrs: Vec::new() }
    }

    /// Add a double-quoted attribute.
    #[must_use]
    pub fn set(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name.into(), value.into(), Quote::Double)
    }

    /// Add a single-quoted attribute, e.g. the `type='schema'` marker.
    #[must_use]
    pub fn single(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name.into(), value.into(), Quote::Single)
    }

    /// Render as ` name="value"` pairs, each preceded by a space.
    #[must_use]
    pub fn render(&self) -> String {
        let mut result = String::new();
        for attr in &self.attrs {
            let quote = attr.quote.as_char();
            let _ = write!(
                result,
                " {}={quote}{}{quote}",
                attr.name,
                escape_html_attr(&attr.value)
            );
        }
        result
    }

    fn push(mut self, name: String, value: String, quote: Quote) -> Self {
        self.attrs.push(Attribute { name, value, quote });
        self
    }
}

/// Escape `& < > " '` for use inside a quoted attribute value.
#[must_use]
pub fn escape_html_attr(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape `& < >` for element text.
#[must_use]
pub fn escape_html_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_in_insertion_order_with_quote_style() {
        let attrs = Attributes::new()
            .set("rel", "stylesheet")
            .single("type", "schema");
        assert_eq!(attrs.render(), " rel=\"stylesheet\" type='schema'");
        assert_eq!(Attributes::new().render(), "");
    }

    #[test]
    fn escapes_special_characters() {
        let rendered = Attributes::new()
            .set("href", "a?x=1&y=\"2\" 'z' <b>")
            .render();
        assert_eq!(
            rendered,
            " href=\"a?x=1&amp;y=&quot;2&quot; &#39;z&#39; &lt;b&gt;\""
        );
        assert_eq!(escape_html_text("Q&A <tag> \"ok\""), "Q&amp;A &lt;tag&gt; \"ok\"");
    }
}
