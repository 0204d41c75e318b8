//! HTML format implementation
//!
//! Import and export carry different data:
//!
//! - Parsing reads stored editor markup. Vendor classes are rewritten or dropped first (see
//!   [`cleanup`]), then the DOM is walked into a document (see [`parser`]).
//! - Serialization writes the author view of a document (see [`serializer`]). For a client
//!   preview, render with a preview context and call [`render_to_html`] directly.
//!
//! # Data Model
//!
//! | Document        | HTML Element            |
//! |-----------------|-------------------------|
//! | paragraph       | `<p>`                   |
//! | heading         | `<h1>`-`<h6>`           |
//! | bulletList      | `<ul>`                  |
//! | orderedList     | `<ol>`                  |
//! | listItem        | `<li>`                  |
//! | blockquote      | `<blockquote>`          |
//! | horizontalRule  | `<hr>`                  |
//! | hardBreak       | `<br>`                  |
//! | bold / italic / underline / strike | `<strong>` / `<em>` / `<u>` / `<s>` |

pub mod cleanup;
pub mod parser;
pub mod serializer;

pub use cleanup::ClassCleaner;
pub use parser::parse_html;
pub use serializer::render_to_html;

use crate::error::FormatError;
use crate::format::Format;
use clause_core::{Document, Renderer};

/// HTML format with a configurable vendor class prefix
#[derive(Debug, Clone, Default)]
pub struct HtmlFormat {
    cleaner: ClassCleaner,
}

impl HtmlFormat {
    pub fn with_vendor_prefix(prefix: &str) -> Self {
        Self {
            cleaner: ClassCleaner::new(prefix),
        }
    }
}

impl Format for HtmlFormat {
    fn name(&self) -> &str {
        "html"
    }

    fn description(&self) -> &str {
        "HTML fragments from rich-text editors"
    }

    fn file_extensions(&self) -> &[&str] {
        &["html", "htm"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Document, FormatError> {
        parse_html(&self.cleaner.clean(source))
    }

    fn serialize(&self, doc: &Document) -> Result<String, FormatError> {
        render_to_html(&Renderer::author().render(doc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_cleans_vendor_classes() {
        let doc = HtmlFormat::default()
            .parse(r#"<p class="ql-align-center ql-direction-rtl">Hello</p>"#)
            .unwrap();
        let block = doc.content[0].as_block().unwrap();
        assert_eq!(block.attrs.get("style"), Some(&json!("text-align: center;")));
        assert_eq!(block.attrs.get("dir"), Some(&json!("rtl")));
        assert!(block.attrs.get("class").is_none());
    }

    #[test]
    fn test_custom_prefix_keeps_other_vendors() {
        let doc = HtmlFormat::with_vendor_prefix("ed")
            .parse(r#"<p class="ql-indent-1 ed-align-right">x</p>"#)
            .unwrap();
        let block = doc.content[0].as_block().unwrap();
        assert_eq!(block.attrs.get("class"), Some(&json!("ql-indent-1")));
        assert_eq!(block.attrs.get("style"), Some(&json!("text-align: right;")));
    }

    #[test]
    fn test_serialize_parse_keeps_text() {
        let format = HtmlFormat::default();
        let doc = format
            .parse("<h1>Agreement</h1><p>Between <b>{{client_name}}</b> and us</p>")
            .unwrap();
        let html = format.serialize(&doc).unwrap();
        assert_eq!(
            html,
            "<h1>Agreement</h1><p>Between <strong>{{client_name}}</strong> and us</p>"
        );
        assert_eq!(format.parse(&html).unwrap(), doc);
    }
}
