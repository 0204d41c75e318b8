//! Template records and where they are stored
//!
//! A [`TemplateRecord`] is one row of the template table: the body as stored (any legacy shape)
//! plus the per-template defaults a preview is seeded with. Columns this crate does not interpret
//! ride along in `extra` and are written back untouched.

use crate::error::StoreError;
use crate::normalize::{LegacyNormalizer, Normalized};
use clause_core::{Document, PreviewContext, PricingTierTable};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// The body exactly as stored
    #[serde(default)]
    pub content: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_pricing_tiers: Option<PricingTierTable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_country: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "template id must be a string or number, got {}",
            other
        ))),
    }
}

impl TemplateRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            content: Value::Null,
            language_id: None,
            category_id: None,
            active: None,
            default_pricing_tiers: None,
            default_currency: None,
            default_country: None,
            extra: Map::new(),
        }
    }

    pub fn with_content(mut self, content: Value) -> Self {
        self.content = content;
        self
    }

    /// The stored body as a canonical document.
    pub fn document(&self, normalizer: &LegacyNormalizer) -> Normalized {
        normalizer.normalize_traced(&self.content)
    }

    /// `base` overlaid with this record's stored defaults.
    pub fn preview_context(&self, base: PreviewContext) -> PreviewContext {
        base.seeded(
            self.default_pricing_tiers,
            self.default_currency.as_deref(),
            self.default_country.as_deref(),
        )
    }

    /// Replace the stored body with the canonical form of `document`.
    pub fn set_document(&mut self, document: &Document) {
        self.content = document.to_value();
    }

    /// Store the pricing, currency and country of `context` as this record's defaults.
    pub fn set_defaults(&mut self, context: &PreviewContext) {
        self.default_pricing_tiers = Some(context.pricing);
        self.default_currency = Some(context.currency.clone());
        self.default_country = Some(context.client_country.clone()).filter(|c| !c.is_empty());
    }
}

/// Where template records live.
pub trait RecordStore {
    fn get(&self, id: &str) -> Result<TemplateRecord, StoreError>;

    fn upsert(&mut self, record: TemplateRecord) -> Result<(), StoreError>;
}

/// A [`RecordStore`] held in memory, ordered by id.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: BTreeMap<String, TemplateRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<TemplateRecord> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = TemplateRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().map(|r| (r.id.clone(), r)).collect(),
        }
    }
}

impl RecordStore for MemoryStore {
    fn get(&self, id: &str) -> Result<TemplateRecord, StoreError> {
        self.records
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn upsert(&mut self, record: TemplateRecord) -> Result<(), StoreError> {
        if record.id.trim().is_empty() {
            return Err(StoreError::Backend("template id must not be empty".to_string()));
        }
        self.records.insert(record.id.clone(), record);
        Ok(())
    }
}
