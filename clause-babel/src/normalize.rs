//! Legacy content normalization
//!
//! Stored template bodies come in every shape an editor ever saved. [`LegacyNormalizer`] turns
//! any of them into a canonical [`Document`] and never fails. The cascade, first match wins:
//!
//! 1. null, or a blank string → empty document
//! 2. a canonical tree (`type: "doc"` with a `content` sequence) → decoded leniently, unknown
//!    node shapes dropped
//! 3. a string holding JSON → decoded once, then the cascade restarts on the decoded value
//! 4. an operation log carrying an `html` rendering → the markup path below
//! 5. an operation log without markup → converted line by line
//! 6. any other string → the markup path: vendor classes cleaned, fragments not starting with
//!    a block wrapped in `<div>`, parsed into a tree
//! 7. anything else, or any path that produced nothing → the raw content as one paragraph
//!
//! The raw fallback keeps every template openable: the author sees the stored text and can
//! repair it in the editor.

use crate::formats::delta;
use crate::formats::html::{parse_html, ClassCleaner};
use clause_core::{validate, Document};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

/// Markup that already starts with one of these needs no wrapper
static BLOCK_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^<(p|div|h[1-6]|ul|ol|blockquote|pre)[\s>/]").unwrap());

static DEFAULT: Lazy<LegacyNormalizer> = Lazy::new(LegacyNormalizer::default);

/// Which step of the cascade produced a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizationPath {
    Empty,
    Canonical,
    Markup,
    OperationLog,
    RawText,
}

impl NormalizationPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            NormalizationPath::Empty => "empty",
            NormalizationPath::Canonical => "canonical",
            NormalizationPath::Markup => "markup",
            NormalizationPath::OperationLog => "operation-log",
            NormalizationPath::RawText => "raw-text",
        }
    }
}

/// A normalized document and the path that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub document: Document,
    pub path: NormalizationPath,
}

impl Normalized {
    fn new(document: Document, path: NormalizationPath) -> Self {
        debug!("normalized stored content via {} path", path.as_str());
        Self { document, path }
    }

    fn raw(text: &str) -> Self {
        Self::new(Document::from_plain_text(text), NormalizationPath::RawText)
    }
}

/// Converts stored template content into canonical documents.
#[derive(Debug, Clone, Default)]
pub struct LegacyNormalizer {
    cleaner: ClassCleaner,
}

impl LegacyNormalizer {
    /// A normalizer stripping classes named `<prefix>-*` from stored markup.
    pub fn new(vendor_class_prefix: &str) -> Self {
        Self {
            cleaner: ClassCleaner::new(vendor_class_prefix),
        }
    }

    pub fn vendor_class_prefix(&self) -> &str {
        self.cleaner.prefix()
    }

    /// Normalize stored content. Total: every input yields a valid document.
    pub fn normalize(&self, content: &Value) -> Document {
        self.normalize_traced(content).document
    }

    /// [`LegacyNormalizer::normalize`], also reporting which path was taken.
    pub fn normalize_traced(&self, content: &Value) -> Normalized {
        self.value(content, None)
    }

    /// Normalize content that arrived as text (a database text column, a file).
    pub fn normalize_str(&self, content: &str) -> Normalized {
        self.string(content, None)
    }

    /// `stored` is the text `content` was decoded from, if any. Raw fallbacks keep that text
    /// verbatim, and a decoded value is never decoded again.
    fn value(&self, content: &Value, stored: Option<&str>) -> Normalized {
        match content {
            Value::Null => Normalized::new(Document::new(), NormalizationPath::Empty),
            Value::String(s) => self.string(s, stored),
            Value::Object(obj) if is_canonical(obj) => self.canonical(content, stored),
            Value::Object(obj) => match obj.get("html").and_then(Value::as_str) {
                Some(html) if is_operation_log(obj) => self.markup(html, stored),
                _ => self.operation_log(content, stored),
            },
            Value::Array(_) => self.operation_log(content, stored),
            Value::Bool(_) | Value::Number(_) => raw_fallback(content, stored),
        }
    }

    fn string(&self, content: &str, stored: Option<&str>) -> Normalized {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Normalized::new(Document::new(), NormalizationPath::Empty);
        }
        if stored.is_none() && looks_like_json(trimmed) {
            match serde_json::from_str::<Value>(trimmed) {
                Ok(decoded) => {
                    debug!("stored content is a JSON-encoded {}", kind_of(&decoded));
                    return self.value(&decoded, Some(content));
                }
                Err(err) => debug!("content looks like JSON but is not: {}", err),
            }
        }
        self.markup(content, stored)
    }

    fn canonical(&self, content: &Value, stored: Option<&str>) -> Normalized {
        match Document::from_value_lenient(content) {
            Ok(document) => Normalized::new(document, NormalizationPath::Canonical),
            Err(err) => {
                warn!("canonical tree could not be decoded ({}), keeping raw text", err);
                raw_fallback(content, stored)
            }
        }
    }

    fn operation_log(&self, content: &Value, stored: Option<&str>) -> Normalized {
        let converted = delta::operations(content).and_then(|ops| delta::document_from_ops(ops));
        match converted {
            Some(document) => Normalized::new(document, NormalizationPath::OperationLog),
            None => {
                warn!(
                    "unrecognized stored {} with no recoverable text, keeping raw JSON",
                    kind_of(content)
                );
                raw_fallback(content, stored)
            }
        }
    }

    /// Parse `markup`; on failure the raw fallback keeps `stored`, or `markup` itself.
    fn markup(&self, markup: &str, stored: Option<&str>) -> Normalized {
        let original = stored.unwrap_or(markup);
        let cleaned = self.cleaner.clean(markup.trim());
        let wrapped = if BLOCK_START.is_match(&cleaned) {
            cleaned
        } else {
            format!("<div>{}</div>", cleaned)
        };

        let parsed = parse_html(&wrapped).and_then(|document| {
            validate(&document.to_value())
                .map_err(|e| crate::error::FormatError::ParseError(e.to_string()))
        });
        match parsed {
            Ok(document) if !document.is_empty() => {
                Normalized::new(document, NormalizationPath::Markup)
            }
            Ok(_) => {
                warn!("markup produced no content, keeping raw text");
                Normalized::raw(original)
            }
            Err(err) => {
                warn!("markup could not be parsed ({}), keeping raw text", err);
                Normalized::raw(original)
            }
        }
    }
}

/// The stored text a value came from, or its JSON rendering when it was never text.
fn raw_fallback(content: &Value, stored: Option<&str>) -> Normalized {
    match stored {
        Some(text) => Normalized::raw(text),
        None => Normalized::raw(&content.to_string()),
    }
}

/// An editor save: an `ops` or `delta` entry, whatever its encoding.
fn is_operation_log(obj: &Map<String, Value>) -> bool {
    obj.contains_key("ops") || obj.contains_key("delta")
}

fn is_canonical(obj: &Map<String, Value>) -> bool {
    obj.get("type").and_then(Value::as_str) == Some("doc")
        && obj.get("content").map_or(true, Value::is_array)
}

fn looks_like_json(trimmed: &str) -> bool {
    trimmed.starts_with('{') || trimmed.starts_with('[') || trimmed.starts_with('"')
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Normalize with the default vendor prefix.
pub fn normalize(content: &Value) -> Document {
    DEFAULT.normalize(content)
}
