//! Canonical document JSON
//!
//! The stored shape of a template body: `{"type": "doc", "content": [...]}`. Parsing is strict,
//! so a structurally invalid tree is reported rather than repaired. Use the normalizer for
//! content of unknown provenance.

use crate::error::FormatError;
use crate::format::Format;
use clause_core::Document;
use serde_json::Value;

pub struct JsonFormat;

impl Format for JsonFormat {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Canonical document tree as JSON"
    }

    fn file_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Document, FormatError> {
        let tree: Value = serde_json::from_str(source)?;
        Document::from_value(&tree).map_err(|e| FormatError::ParseError(e.to_string()))
    }

    fn serialize(&self, doc: &Document) -> Result<String, FormatError> {
        serde_json::to_string_pretty(&doc.to_value())
            .map_err(|e| FormatError::SerializationError(e.to_string()))
    }
}
