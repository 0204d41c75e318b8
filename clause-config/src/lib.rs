//! Shared configuration loader for the clause toolchain.
//!
//! `defaults/clause.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`ClauseConfig`].

use clause_babel::LegacyNormalizer;
use clause_core::{DemoIdentity, PreviewContext, PricingTierTable};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/clause.default.toml");

/// Top-level configuration consumed by clause applications.
#[derive(Debug, Clone, Deserialize)]
pub struct ClauseConfig {
    pub preview: PreviewConfig,
    pub pricing: PricingConfig,
    pub normalize: NormalizeConfig,
    pub render: RenderConfig,
}

/// Seed values for a fresh preview context.
#[derive(Debug, Clone, Deserialize)]
pub struct PreviewConfig {
    pub currency: String,
    pub country: String,
    pub date: String,
    pub discount_percentage: f64,
    pub applicant_count: u32,
    pub demo: DemoIdentity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PricingConfig {
    pub tiers: PricingTierTable,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NormalizeConfig {
    pub vendor_class_prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    pub format: RenderFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderFormat {
    Html,
    Tag,
    Json,
}

impl RenderFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderFormat::Html => "html",
            RenderFormat::Tag => "tag",
            RenderFormat::Json => "json",
        }
    }
}

impl ClauseConfig {
    /// A preview context built from `[preview]` and `[pricing]`, before any template record
    /// defaults are applied.
    pub fn preview_context(&self) -> PreviewContext {
        PreviewContext {
            currency: self.preview.currency.clone(),
            discount_percentage: self.preview.discount_percentage,
            client_country: self.preview.country.clone(),
            date: self.preview.date.clone(),
            pricing: self.pricing.tiers,
            applicant_count: self.preview.applicant_count,
            demo: self.preview.demo.clone(),
            installments: Vec::new(),
        }
    }

    pub fn normalizer(&self) -> LegacyNormalizer {
        LegacyNormalizer::new(&self.normalize.vendor_class_prefix)
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<ClauseConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<ClauseConfig, ConfigError> {
    Loader::new().build()
}
