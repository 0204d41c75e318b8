//! Subcommand implementations
//!
//! Each command returns the text to print on success, or a message for stderr.

use clause_babel::formats::html::render_to_html;
use clause_babel::formats::tag::{serialize_document, serialize_render_output};
use clause_babel::{EditorSession, FormatRegistry, TemplateRecord};
use clause_config::ClauseConfig;
use clause_core::{list_families, tag_for, Document, RenderOutput, Renderer};
use log::info;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Output formats accepted by `normalize --to`
pub const NORMALIZE_TARGETS: &[&str] = &["json", "yaml", "tag", "html"];

/// Output formats accepted by `render --to`
pub const RENDER_TARGETS: &[&str] = &["html", "tag", "json"];

/// Flags of the render command after defaults are resolved
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub preview: bool,
    pub target: String,
    pub applicants: Option<u32>,
    pub currency: Option<String>,
    pub discount: Option<f64>,
}

fn read_file(path: &str) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("Failed to read file '{}': {}", path, e))
}

/// Normalize the stored content in `path` and print it as `target`.
///
/// `.json` files are decoded first so canonical trees and operation logs are recognized; any
/// other file is treated as stored text.
pub fn normalize_file(path: &str, target: &str, config: &ClauseConfig) -> Result<String, String> {
    let source = read_file(path)?;
    let normalizer = config.normalizer();
    let is_json = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let normalized = if is_json {
        let value: Value = serde_json::from_str(&source)
            .map_err(|e| format!("Invalid JSON in '{}': {}", path, e))?;
        normalizer.normalize_traced(&value)
    } else {
        normalizer.normalize_str(&source)
    };
    info!("'{}' normalized via {} path", path, normalized.path.as_str());

    serialize_document_as(&normalized.document, target)
}

fn serialize_document_as(doc: &Document, target: &str) -> Result<String, String> {
    match target {
        "json" => serde_json::to_string_pretty(&doc.to_value())
            .map_err(|e| format!("Serialization error: {}", e)),
        "yaml" => serde_yaml::to_string(&doc.to_value())
            .map_err(|e| format!("Serialization error: {}", e)),
        "tag" => Ok(serialize_document(doc)),
        "html" => render_to_html(&Renderer::author().render(doc)).map_err(|e| e.to_string()),
        other => Err(format!("Unknown output format '{}'", other)),
    }
}

/// Render the template record stored as JSON in `path`.
pub fn render_record(
    path: &str,
    options: &RenderOptions,
    config: &ClauseConfig,
) -> Result<String, String> {
    let source = read_file(path)?;
    let record: TemplateRecord = serde_json::from_str(&source)
        .map_err(|e| format!("Invalid template record in '{}': {}", path, e))?;

    let mut session = EditorSession::open(record, config.preview_context(), &config.normalizer());
    let context = session.context_mut();
    if let Some(applicants) = options.applicants {
        context.applicant_count = applicants;
    }
    if let Some(currency) = &options.currency {
        context.currency = currency.clone();
    }
    if let Some(discount) = options.discount {
        context.discount_percentage = discount;
    }

    let output = if options.preview {
        session.preview()
    } else {
        session.author_view()
    };
    serialize_output_as(&output, &options.target)
}

fn serialize_output_as(output: &RenderOutput, target: &str) -> Result<String, String> {
    match target {
        "html" => render_to_html(output).map_err(|e| e.to_string()),
        "tag" => Ok(serialize_render_output(output)),
        "json" => {
            serde_json::to_string_pretty(output).map_err(|e| format!("Serialization error: {}", e))
        }
        other => Err(format!("Unknown output format '{}'", other)),
    }
}

/// Placeholder families with the tags each one inserts.
pub fn list_tokens() -> String {
    let mut lines = Vec::new();
    for (family, labels) in list_families() {
        lines.push(format!("{}:", family.name()));
        for label in labels {
            let tag = tag_for(family, label).unwrap_or_default();
            lines.push(format!("  {:<22} {}", label, tag));
        }
    }
    lines.join("\n")
}

/// Registered formats with their capabilities.
pub fn list_formats() -> String {
    let registry = FormatRegistry::with_defaults();
    let mut lines = vec!["Available formats:".to_string()];
    for name in registry.list_formats() {
        let Ok(format) = registry.get(&name) else {
            continue;
        };
        let mut caps = Vec::new();
        if format.supports_parsing() {
            caps.push("parse");
        }
        if format.supports_serialization() {
            caps.push("serialize");
        }
        lines.push(format!(
            "  {:<6} [{}] {}",
            name,
            caps.join(", "),
            format.description()
        ));
    }
    lines.join("\n")
}
