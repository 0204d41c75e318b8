//! XML-like document tree serialization
//!
//! A debugging view of the document structure, one node per line. Render output has the same
//! view through [`serialize_render_output`], with fields shown as `<field key="text_0"/>`.
//!
//! ## Format
//!
//! - Block type → tag name (kebab-case), attributes as XML attributes
//! - Text → `<text>` with its marks listed in a `marks` attribute
//! - Leaves (hard break, rule) → self-closing tags
//!
//! ## Example
//!
//! ```text
//! <doc>
//!   <heading level="2">
//!     <text>Terms</text>
//!   </heading>
//!   <paragraph style="text-align: center;">
//!     <text marks="bold">Total: {{total_amount}}</text>
//!   </paragraph>
//! </doc>
//! ```

use crate::error::FormatError;
use crate::format::Format;
use clause_core::{Attrs, BlockKind, Document, Node, RenderNode, RenderOutput};
use serde_json::Value;

struct TagSerializer {
    output: String,
    indent_level: usize,
}

impl TagSerializer {
    fn new() -> Self {
        Self {
            output: String::new(),
            indent_level: 0,
        }
    }

    fn indent(&self) -> String {
        "  ".repeat(self.indent_level)
    }

    fn push_line(&mut self, s: &str) {
        self.output.push_str(&self.indent());
        self.output.push_str(s);
        self.output.push('\n');
    }

    fn serialize_node(&mut self, node: &Node) {
        match node {
            Node::Text(text) => {
                let marks: Vec<&str> = text.marks.iter().map(|m| m.kind.type_name()).collect();
                let attrs = if marks.is_empty() {
                    String::new()
                } else {
                    format!(" marks=\"{}\"", escape_xml(&marks.join(",")))
                };
                self.push_line(&format!("<text{}>{}</text>", attrs, escape_xml(&text.text)));
            }
            Node::Block(block) => {
                let tag = to_tag_name(block.kind.type_name());
                let attrs = block_attributes(&block.kind, &block.attrs);
                let children = block.children();
                if children.is_empty() {
                    self.push_line(&format!("<{}{}/>", tag, attrs));
                    return;
                }
                self.push_line(&format!("<{}{}>", tag, attrs));
                self.indent_level += 1;
                for child in children {
                    self.serialize_node(child);
                }
                self.indent_level -= 1;
                self.push_line(&format!("</{}>", tag));
            }
        }
    }

    fn serialize_render_node(&mut self, node: &RenderNode) {
        let (tag, attrs, children) = match node {
            RenderNode::Text { text } => {
                self.push_line(&format!("<text>{}</text>", escape_xml(text)));
                return;
            }
            RenderNode::Field { key } => {
                self.push_line(&format!("<field key=\"{}\"/>", key));
                return;
            }
            RenderNode::LineBreak => {
                self.push_line("<line-break/>");
                return;
            }
            RenderNode::Rule => {
                self.push_line("<rule/>");
                return;
            }
            RenderNode::Marked { mark, children } => (
                "mark".to_string(),
                format!(" type=\"{}\"", escape_xml(mark.type_name())),
                children,
            ),
            RenderNode::Block {
                kind,
                attrs,
                children,
            } => (
                to_tag_name(kind.type_name()),
                block_attributes(kind, attrs),
                children,
            ),
        };

        if children.is_empty() {
            self.push_line(&format!("<{}{}/>", tag, attrs));
            return;
        }
        self.push_line(&format!("<{}{}>", tag, attrs));
        self.indent_level += 1;
        for child in children {
            self.serialize_render_node(child);
        }
        self.indent_level -= 1;
        self.push_line(&format!("</{}>", tag));
    }
}

fn block_attributes(kind: &BlockKind, block_attrs: &Attrs) -> String {
    let mut attrs = String::new();
    if let BlockKind::Heading(level) = kind {
        attrs.push_str(&format!(" level=\"{}\"", level));
    }
    for (key, value) in block_attrs {
        let value = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        attrs.push_str(&format!(" {}=\"{}\"", to_tag_name(key), escape_xml(&value)));
    }
    attrs
}

/// Convert a camelCase type name to a tag name (e.g., "bulletList" → "bullet-list")
fn to_tag_name(type_name: &str) -> String {
    let mut tag = String::new();
    for (i, c) in type_name.chars().enumerate() {
        if i > 0 && c.is_uppercase() {
            tag.push('-');
        }
        tag.extend(c.to_lowercase());
    }
    tag
}

/// Serialize a document to tag format
pub fn serialize_document(doc: &Document) -> String {
    let mut serializer = TagSerializer::new();
    serializer.output.push_str("<doc>\n");
    serializer.indent_level = 1;
    for node in &doc.content {
        serializer.serialize_node(node);
    }
    serializer.output.push_str("</doc>");
    serializer.output
}

/// Serialize a render pass to tag format
pub fn serialize_render_output(output: &RenderOutput) -> String {
    let mut serializer = TagSerializer::new();
    serializer.output.push_str("<render>\n");
    serializer.indent_level = 1;
    for node in &output.nodes {
        serializer.serialize_render_node(node);
    }
    serializer.output.push_str("</render>");
    serializer.output
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\"', "&quot;")
        .replace('\'', "&apos;")
}

/// Format implementation for the XML-like tag format
pub struct TagFormat;

impl Format for TagFormat {
    fn name(&self) -> &str {
        "tag"
    }

    fn description(&self) -> &str {
        "XML-like tag format with hierarchical structure"
    }

    fn file_extensions(&self) -> &[&str] {
        &["tag", "xml"]
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn serialize(&self, doc: &Document) -> Result<String, FormatError> {
        Ok(serialize_document(doc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clause_core::{Block, MarkKind, Marks, Text};

    #[test]
    fn test_serialize_simple_paragraph() {
        let result = serialize_document(&Document::from_plain_text("Hello world"));
        insta::assert_snapshot!(result, @r###"
        <doc>
          <paragraph>
            <text>Hello world</text>
          </paragraph>
        </doc>
        "###);
    }

    #[test]
    fn test_serialize_heading_marks_and_leaves() {
        let doc = Document::with_content(vec![
            Node::Block(Block::heading(2, vec![Node::text("Terms")])),
            Node::Block(Block::paragraph(vec![
                Node::Text(Text::with_marks(
                    "Total",
                    Marks::from_kinds([MarkKind::Bold, MarkKind::Italic]),
                )),
                Node::Block(Block::hard_break()),
            ])),
            Node::Block(Block::horizontal_rule()),
        ]);

        let result = serialize_document(&doc);
        assert!(result.contains("<heading level=\"2\">"));
        assert!(result.contains("<text marks=\"bold,italic\">Total</text>"));
        assert!(result.contains("<hard-break/>"));
        assert!(result.contains("<horizontal-rule/>"));
    }

    #[test]
    fn test_xml_escaping() {
        let doc = Document::from_plain_text("Fees <net> & \"gross\"");
        let result = serialize_document(&doc);
        assert!(result.contains("Fees &lt;net&gt; &amp; &quot;gross&quot;"));
    }

    #[test]
    fn test_serialize_render_output() {
        use clause_core::{PreviewContext, Renderer};

        let doc = Document::with_content(vec![Node::Block(Block::paragraph(vec![Node::Text(
            Text::with_marks("Sign: {{signature}}", Marks::from_kinds([MarkKind::Bold])),
        )]))]);
        let ctx = PreviewContext::default();
        let result = serialize_render_output(&Renderer::preview(&ctx).render(&doc));
        insta::assert_snapshot!(result, @r###"
        <render>
          <paragraph>
            <mark type="bold">
              <text>Sign: </text>
              <field key="signature_0"/>
            </mark>
          </paragraph>
        </render>
        "###);
    }

    #[test]
    fn test_block_attrs_become_attributes() {
        let doc = Document::with_content(vec![Node::Block(
            Block::paragraph(vec![Node::text("x")]).with_attr("dir", "rtl"),
        )]);
        assert!(serialize_document(&doc).contains("<paragraph dir=\"rtl\">"));
    }
}
