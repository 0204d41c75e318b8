//! Editor session over one template record
//!
//! Opening a record normalizes its body and seeds a preview context from the record defaults.
//! The session then owns the document while it is being edited, renders it in either mode, and
//! keeps the values entered into interactive fields attached to their fields across re-renders.
//! Saving writes the canonical document and the current defaults back into the record.

use crate::error::StoreError;
use crate::normalize::{LegacyNormalizer, NormalizationPath};
use crate::record::{RecordStore, TemplateRecord};
use clause_core::{
    CaptureError, CaptureKey, CaptureSlotMap, CapturedValue, Document, EditError, EditPosition,
    PreviewContext, RenderOutput, Renderer,
};
use log::debug;

#[derive(Debug, Clone)]
pub struct EditorSession {
    record: TemplateRecord,
    document: Document,
    context: PreviewContext,
    slots: CaptureSlotMap,
    bound: Vec<CaptureKey>,
    opened_via: NormalizationPath,
}

impl EditorSession {
    /// Open `record`, with `defaults` as the preview context before record defaults apply.
    pub fn open(
        record: TemplateRecord,
        defaults: PreviewContext,
        normalizer: &LegacyNormalizer,
    ) -> Self {
        let normalized = record.document(normalizer);
        let context = record.preview_context(defaults);
        debug!(
            "opened template '{}' via {} path",
            record.id,
            normalized.path.as_str()
        );
        Self {
            record,
            document: normalized.document,
            context,
            slots: CaptureSlotMap::new(),
            bound: Vec::new(),
            opened_via: normalized.path,
        }
    }

    /// Load record `id` from `store` and open it.
    pub fn load<S: RecordStore + ?Sized>(
        store: &S,
        id: &str,
        defaults: PreviewContext,
        normalizer: &LegacyNormalizer,
    ) -> Result<Self, StoreError> {
        Ok(Self::open(store.get(id)?, defaults, normalizer))
    }

    pub fn record(&self) -> &TemplateRecord {
        &self.record
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn context(&self) -> &PreviewContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut PreviewContext {
        &mut self.context
    }

    /// Which normalization path produced the document when the record was opened.
    pub fn opened_via(&self) -> NormalizationPath {
        self.opened_via
    }

    /// Insert a placeholder tag at `position`. Unknown tags are accepted.
    pub fn insert_token(&mut self, position: &EditPosition, tag: &str) -> Result<(), EditError> {
        self.document.insert_token(position, tag)
    }

    /// Append a placeholder tag at the end of the document.
    pub fn append_token(&mut self, tag: &str) {
        self.document.append_token(tag);
    }

    /// The editable surface: placeholders stay visible.
    pub fn author_view(&self) -> RenderOutput {
        Renderer::author().render(&self.document)
    }

    /// Render the client preview and rebind captured values to the fields it produced.
    pub fn preview(&mut self) -> RenderOutput {
        let output = Renderer::preview(&self.context).render(&self.document);
        self.slots = CaptureSlotMap::carry_over(&self.slots, &output.capture_keys);
        self.bound = output.capture_keys.clone();
        output
    }

    /// Record a value entered into the field bound to `key` by the latest preview.
    pub fn capture(&mut self, key: &str, value: CapturedValue) -> Result<(), CaptureError> {
        let key: CaptureKey = key.parse()?;
        if !self.bound.contains(&key) {
            return Err(CaptureError::UnboundKey(key.to_string()));
        }
        self.slots.write(key, value)?;
        Ok(())
    }

    pub fn captured(&self) -> &CaptureSlotMap {
        &self.slots
    }

    /// The record with the edited document and current defaults written back.
    pub fn save(&self) -> TemplateRecord {
        let mut record = self.record.clone();
        record.set_document(&self.document);
        record.set_defaults(&self.context);
        record
    }

    /// [`EditorSession::save`] into `store`.
    pub fn save_to<S: RecordStore + ?Sized>(&self, store: &mut S) -> Result<(), StoreError> {
        store.upsert(self.save())
    }
}
