//! HTML export (render output → HTML)
//!
//! Pipeline: document → render pass → RcDom → HTML string. Rendering first means preview output
//! already has its placeholders substituted, and interactive fields arrive as bound slots:
//!
//! - text field → `<input type="text" class="clause-field" data-slot="text_0">`
//! - signature field → `<span class="signature-slot" data-slot="signature_0"></span>`
//!
//! A host page finds fields by `data-slot` and writes entered values back under the same key.

use crate::error::FormatError;
use clause_core::{Attrs, BlockKind, FieldType, MarkKind, RenderNode, RenderOutput};
use html5ever::{
    ns, serialize, serialize::SerializeOpts, serialize::TraversalScope, Attribute, LocalName,
    QualName,
};
use markup5ever_rcdom::{Handle, Node, NodeData, SerializableHandle};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::default::Default;
use std::rc::Rc;

/// Block attributes written through to the element
const PASSED_ATTRIBUTES: [&str; 4] = ["style", "dir", "class", "lang"];

/// Serialize a render pass to an HTML fragment.
pub fn render_to_html(output: &RenderOutput) -> Result<String, FormatError> {
    let container = create_element("div", Vec::new());
    for node in &output.nodes {
        append_node(&container, node);
    }
    serialize_children(&container)
}

fn append_node(parent: &Handle, node: &RenderNode) {
    let child = match node {
        RenderNode::Text { text } => create_text(text),
        RenderNode::LineBreak => create_element("br", Vec::new()),
        RenderNode::Rule => create_element("hr", Vec::new()),
        RenderNode::Field { key } => {
            let slot = key.to_string();
            match key.field {
                FieldType::Text => create_element(
                    "input",
                    vec![("type", "text"), ("class", "clause-field"), ("data-slot", &slot)],
                ),
                FieldType::Signature => create_element(
                    "span",
                    vec![("class", "signature-slot"), ("data-slot", &slot)],
                ),
            }
        }
        RenderNode::Marked { mark, children } => {
            let element = create_element(mark_tag(mark), Vec::new());
            for child in children {
                append_node(&element, child);
            }
            element
        }
        RenderNode::Block {
            kind,
            attrs,
            children,
        } => {
            let attributes = element_attributes(kind, attrs);
            let borrowed: Vec<(&str, &str)> = attributes
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str()))
                .collect();
            let element = create_element(&block_tag(kind), borrowed);
            for child in children {
                append_node(&element, child);
            }
            element
        }
    };
    parent.children.borrow_mut().push(child);
}

fn block_tag(kind: &BlockKind) -> String {
    match kind {
        BlockKind::Paragraph => "p".to_string(),
        BlockKind::Heading(level) => format!("h{}", (*level).clamp(1, 6)),
        BlockKind::BulletList => "ul".to_string(),
        BlockKind::OrderedList => "ol".to_string(),
        BlockKind::ListItem => "li".to_string(),
        BlockKind::Blockquote => "blockquote".to_string(),
        BlockKind::HorizontalRule => "hr".to_string(),
        BlockKind::HardBreak => "br".to_string(),
        BlockKind::Other(_) => "div".to_string(),
    }
}

fn mark_tag(mark: &MarkKind) -> &'static str {
    match mark {
        MarkKind::Bold => "strong",
        MarkKind::Italic => "em",
        MarkKind::Underline => "u",
        MarkKind::Strike => "s",
        MarkKind::Other(_) => "span",
    }
}

/// String attributes from the allow list, plus the editor's `textAlign` attr as a style.
fn element_attributes(kind: &BlockKind, attrs: &Attrs) -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = PASSED_ATTRIBUTES
        .iter()
        .filter_map(|name| match attrs.get(*name) {
            Some(Value::String(value)) => Some((name.to_string(), value.clone())),
            _ => None,
        })
        .collect();

    if let Some(Value::String(align)) = attrs.get("textAlign") {
        let declaration = format!("text-align: {};", align);
        match out.iter_mut().find(|(name, _)| name == "style") {
            Some((_, style)) if !style.contains("text-align") => {
                let existing = style.trim().trim_end_matches(';').to_string();
                *style = format!("{}; {}", existing, declaration);
            }
            Some(_) => {}
            None => out.push(("style".to_string(), declaration)),
        }
    }

    if let BlockKind::Other(name) = kind {
        out.push(("data-type".to_string(), name.clone()));
    }
    out
}

/// Create an HTML element node
fn create_element(tag: &str, attrs: Vec<(&str, &str)>) -> Handle {
    let qual_name = QualName::new(None, ns!(html), LocalName::from(tag));
    let attributes = attrs
        .into_iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.to_string().into(),
        })
        .collect();

    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name: qual_name,
            attrs: RefCell::new(attributes),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

/// Create a text node
fn create_text(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(text.to_string().into()),
        },
    })
}

/// Serialize each child of `container` (the container itself is not written)
fn serialize_children(container: &Handle) -> Result<String, FormatError> {
    let mut output = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };

    for child in container.children.borrow().iter() {
        let serializable = SerializableHandle::from(child.clone());
        serialize(&mut output, &serializable, opts.clone()).map_err(|e| {
            FormatError::SerializationError(format!("HTML serialization failed: {}", e))
        })?;
    }

    String::from_utf8(output)
        .map_err(|e| FormatError::SerializationError(format!("UTF-8 conversion failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clause_core::{Document, PreviewContext, Renderer};

    fn author_html(doc: &Document) -> String {
        render_to_html(&Renderer::author().render(doc)).expect("html")
    }

    fn doc(value: serde_json::Value) -> Document {
        Document::from_value(&value).expect("valid document")
    }

    #[test]
    fn test_paragraph_with_marks() {
        let d = doc(serde_json::json!({"type": "doc", "content": [
            {"type": "paragraph", "content": [
                {"type": "text", "text": "Dear "},
                {"type": "text", "text": "{{client_name}}", "marks": [{"type": "bold"}, {"type": "italic"}]}
            ]}
        ]}));
        insta::assert_snapshot!(
            author_html(&d),
            @"<p>Dear <strong><em>{{client_name}}</em></strong></p>"
        );
    }

    #[test]
    fn test_text_is_escaped() {
        let html = author_html(&Document::from_plain_text("Fees < 5 & up"));
        assert_eq!(html, "<p>Fees &lt; 5 &amp; up</p>");
    }

    #[test]
    fn test_preview_fields_become_slots() {
        let ctx = PreviewContext::default();
        let d = Document::from_plain_text("City: {{text}} Sign: {{signature}}");
        let html = render_to_html(&Renderer::preview(&ctx).render(&d)).expect("html");
        assert_eq!(
            html,
            "<p>City: <input type=\"text\" class=\"clause-field\" data-slot=\"text_0\"> Sign: \
             <span class=\"signature-slot\" data-slot=\"signature_0\"></span></p>"
        );
    }

    #[test]
    fn test_alignment_attributes() {
        let d = doc(serde_json::json!({"type": "doc", "content": [
            {"type": "heading", "attrs": {"level": 3, "textAlign": "center"}, "content": [
                {"type": "text", "text": "Terms"}
            ]},
            {"type": "paragraph", "attrs": {"style": "text-align: right;", "dir": "rtl"}, "content": [
                {"type": "text", "text": "x"}
            ]}
        ]}));
        assert_eq!(
            author_html(&d),
            "<h3 style=\"text-align: center;\">Terms</h3>\
             <p style=\"text-align: right;\" dir=\"rtl\">x</p>"
        );
    }

    #[test]
    fn test_lists_breaks_and_rules() {
        let d = doc(serde_json::json!({"type": "doc", "content": [
            {"type": "bulletList", "content": [
                {"type": "listItem", "content": [
                    {"type": "paragraph", "content": [
                        {"type": "text", "text": "a"}, {"type": "hardBreak"}, {"type": "text", "text": "b"}
                    ]}
                ]}
            ]},
            {"type": "horizontalRule"}
        ]}));
        assert_eq!(author_html(&d), "<ul><li><p>a<br>b</p></li></ul><hr>");
    }
}
