//! Canonical JSON conversion and structural validation
//!
//! Two decoders share one walk:
//!
//! - strict ([`validate`], [`Document::from_value`]) reports the first structural violation;
//! - lenient ([`Document::from_value_lenient`]) repairs what it can and drops what it cannot, so
//!   that content already stored as a document is never rejected outright.
//!
//! Both require the root to be `{"type": "doc"}` with an array (or absent) `content`.

use super::marks::{Mark, MarkKind, Marks};
use super::node::{Attrs, Block, BlockKind, Document, Node, Text};
use crate::error::StructureError;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Checks `tree` against the document invariants and returns the typed document.
///
/// Rules: the root has `type = "doc"`; every `content` present is an array; known container
/// blocks carry a `content` array; text nodes carry a string `text` and no `content`; `marks`,
/// when present, is an array of typed objects; heading levels are 1..=6. Unknown attributes and
/// unknown node types are accepted.
pub fn validate(tree: &Value) -> Result<Document, StructureError> {
    Decoder { strict: true }.document(tree)
}

impl Document {
    /// Strict decode; see [`validate`].
    pub fn from_value(tree: &Value) -> Result<Self, StructureError> {
        validate(tree)
    }

    /// Decode, repairing defects below the root.
    ///
    /// Fails only when the root is not a document object.
    pub fn from_value_lenient(tree: &Value) -> Result<Self, StructureError> {
        Decoder { strict: false }.document(tree)
    }

    pub fn to_value(&self) -> Value {
        let mut obj = self.extra.clone();
        obj.insert("type".to_string(), Value::from("doc"));
        if !self.attrs.is_empty() {
            obj.insert("attrs".to_string(), Value::Object(self.attrs.clone()));
        }
        obj.insert("content".to_string(), encode_nodes(&self.content));
        Value::Object(obj)
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        validate(&value).map_err(D::Error::custom)
    }
}

struct Decoder {
    strict: bool,
}

impl Decoder {
    fn document(&self, tree: &Value) -> Result<Document, StructureError> {
        let obj = tree.as_object().ok_or(StructureError::NotAnObject {
            path: String::new(),
        })?;
        match obj.get("type").and_then(Value::as_str) {
            Some("doc") => {}
            other => {
                return Err(StructureError::NotADocument {
                    found: other.map(str::to_string),
                })
            }
        }
        let content = match obj.get("content") {
            None => Vec::new(),
            Some(Value::Array(items)) => self.nodes(items, "")?,
            Some(_) => {
                return Err(StructureError::ContentNotSequence {
                    path: String::new(),
                })
            }
        };
        Ok(Document {
            content,
            attrs: attrs_of(obj),
            extra: extra_of(obj),
        })
    }

    fn nodes(&self, items: &[Value], parent: &str) -> Result<Vec<Node>, StructureError> {
        let mut nodes = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let path = child_path(parent, index);
            if let Some(node) = self.node(item, &path)? {
                nodes.push(node);
            }
        }
        Ok(nodes)
    }

    /// `Ok(None)` means the lenient decoder dropped the node.
    fn node(&self, item: &Value, path: &str) -> Result<Option<Node>, StructureError> {
        let Some(obj) = item.as_object() else {
            return self.reject(StructureError::NotAnObject {
                path: path.to_string(),
            });
        };
        let Some(type_name) = obj.get("type").and_then(Value::as_str) else {
            return self.reject(StructureError::MissingType {
                path: path.to_string(),
            });
        };
        if type_name == "text" {
            return self.text(obj, path).map(|t| t.map(Node::Text));
        }
        self.block(type_name, obj, path).map(|b| b.map(Node::Block))
    }

    fn text(&self, obj: &Map<String, Value>, path: &str) -> Result<Option<Text>, StructureError> {
        if obj.contains_key("content") && self.strict {
            return Err(StructureError::TextHasContent {
                path: path.to_string(),
            });
        }
        let text = match obj.get("text") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) if !self.strict => n.to_string(),
            Some(Value::Bool(b)) if !self.strict => b.to_string(),
            _ => {
                return self.reject(StructureError::TextNotString {
                    path: path.to_string(),
                })
            }
        };
        let marks = self.marks(obj.get("marks"), path)?;
        let mut extra = obj.clone();
        for key in ["type", "text", "marks", "content"] {
            extra.remove(key);
        }
        Ok(Some(Text { text, marks, extra }))
    }

    fn marks(&self, value: Option<&Value>, path: &str) -> Result<Marks, StructureError> {
        let mut marks = Marks::new();
        let items = match value {
            None | Some(Value::Null) => return Ok(marks),
            Some(Value::Array(items)) => items,
            Some(_) if self.strict => {
                return Err(StructureError::MalformedMarks {
                    path: path.to_string(),
                })
            }
            Some(_) => return Ok(marks),
        };
        for item in items {
            let name = item
                .as_object()
                .and_then(|m| m.get("type"))
                .and_then(Value::as_str);
            match (name, item.as_object()) {
                (Some(name), Some(obj)) => {
                    marks.insert(Mark {
                        kind: MarkKind::from_type_name(name),
                        attrs: attrs_of(obj),
                    });
                }
                _ if self.strict => {
                    return Err(StructureError::MalformedMarks {
                        path: path.to_string(),
                    })
                }
                _ => {}
            }
        }
        Ok(marks)
    }

    fn block(
        &self,
        type_name: &str,
        obj: &Map<String, Value>,
        path: &str,
    ) -> Result<Option<Block>, StructureError> {
        let mut kind = BlockKind::from_type_name(type_name);
        let mut attrs = attrs_of(obj);

        if let BlockKind::Heading(_) = kind {
            let level = attrs.remove("level");
            kind = BlockKind::Heading(self.heading_level(level.as_ref(), path)?);
        }

        let content = match obj.get("content") {
            _ if kind.is_leaf() => None,
            Some(Value::Array(items)) => Some(self.nodes(items, path)?),
            Some(_) if self.strict => {
                return Err(StructureError::ContentNotSequence {
                    path: path.to_string(),
                })
            }
            Some(_) | None if kind.requires_content() => {
                if self.strict {
                    return Err(StructureError::MissingContent {
                        path: path.to_string(),
                        kind: type_name.to_string(),
                    });
                }
                Some(Vec::new())
            }
            Some(_) | None => None,
        };

        Ok(Some(Block {
            kind,
            attrs,
            content,
            extra: extra_of(obj),
        }))
    }

    fn heading_level(&self, level: Option<&Value>, path: &str) -> Result<u8, StructureError> {
        let parsed = match level {
            None | Some(Value::Null) => return Ok(1),
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
            Some(_) => None,
        };
        match parsed {
            Some(n @ 1..=6) => Ok(n as u8),
            _ if self.strict => Err(StructureError::InvalidHeadingLevel {
                path: path.to_string(),
                level: level.map(Value::to_string).unwrap_or_default(),
            }),
            Some(n) => Ok(n.clamp(1, 6) as u8),
            None => Ok(1),
        }
    }

    fn reject<T>(&self, err: StructureError) -> Result<Option<T>, StructureError> {
        if self.strict {
            Err(err)
        } else {
            log::warn!("dropping malformed node: {}", err);
            Ok(None)
        }
    }
}

fn child_path(parent: &str, index: usize) -> String {
    if parent.is_empty() {
        format!("content[{}]", index)
    } else {
        format!("{}.content[{}]", parent, index)
    }
}

fn attrs_of(obj: &Map<String, Value>) -> Attrs {
    match obj.get("attrs") {
        Some(Value::Object(attrs)) => attrs.clone(),
        _ => Attrs::new(),
    }
}

fn extra_of(obj: &Map<String, Value>) -> Attrs {
    obj.iter()
        .filter(|(key, _)| !matches!(key.as_str(), "type" | "content" | "attrs"))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn encode_nodes(nodes: &[Node]) -> Value {
    Value::Array(nodes.iter().map(encode_node).collect())
}

fn encode_node(node: &Node) -> Value {
    match node {
        Node::Text(text) => {
            let mut obj = text.extra.clone();
            obj.insert("type".to_string(), Value::from("text"));
            obj.insert("text".to_string(), Value::from(text.text.as_str()));
            if !text.marks.is_empty() {
                obj.insert("marks".to_string(), encode_marks(&text.marks));
            }
            Value::Object(obj)
        }
        Node::Block(block) => {
            let mut obj = block.extra.clone();
            obj.insert("type".to_string(), Value::from(block.kind.type_name()));
            let mut attrs = block.attrs.clone();
            if let BlockKind::Heading(level) = block.kind {
                attrs.insert("level".to_string(), Value::from(level));
            }
            if !attrs.is_empty() {
                obj.insert("attrs".to_string(), Value::Object(attrs));
            }
            if let Some(content) = &block.content {
                obj.insert("content".to_string(), encode_nodes(content));
            }
            Value::Object(obj)
        }
    }
}

fn encode_marks(marks: &Marks) -> Value {
    Value::Array(
        marks
            .iter()
            .map(|mark| {
                let mut obj = Map::new();
                obj.insert("type".to_string(), Value::from(mark.kind.type_name()));
                if !mark.attrs.is_empty() {
                    obj.insert("attrs".to_string(), Value::Object(mark.attrs.clone()));
                }
                Value::Object(obj)
            })
            .collect(),
    )
}
