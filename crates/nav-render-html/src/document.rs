//! HTML document skeleton.
//!
//! Renders the fixed two-space indented layout the navigation page expects:
//! one element per line inside `<head>` and `<body>`.

use crate::attributes::Attributes;
use crate::element::Element;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlDocument {
    lang: Option<String>,
    head: Vec<Element>,
    body: Vec<Element>,
}

impl HtmlDocument {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lang(mut self, lang: &str) -> Self {
        self.lang = Some(lang.to_string());
        self
    }

    #[must_use]
    pub fn head(mut self, elem: Element) -> Self {
        self.head.push(elem);
        self
    }

    #[must_use]
    pub fn body(mut self, elem: Element) -> Self {
        self.body.push(elem);
        self
    }

    pub fn write_to_string(&self, output: &mut String) {
        output.push_str("<!doctype html>\n");
        match &self.lang {
            Some(lang) => {
                output.push_str("<html");
                output.push_str(&Attributes::new().set("lang", lang.as_str()).render());
                output.push_str(">\n");
            }
            None => output.push_str("<html>\n"),
        }
        write_section(output, "head", &self.head);
        write_section(output, "body", &self.body);
        output.push_str("</html>");
    }

    #[must_use]
    pub fn render(&self) -> String {
        let mut output = String::new();
        self.write_to_string(&mut output);
        output
    }
}

fn write_section(output: &mut String, tag: &str, children: &[Element]) {
    output.push_str("  <");
    output.push_str(tag);
    output.push_str(">\n");
    for child in children {
        output.push_str("    ");
        child.write_to_string(output);
        output.push('\n');
    }
    output.push_str("  </");
    output.push_str(tag);
    output.push_str(">\n");
}
