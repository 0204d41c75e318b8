//! Values a preview is rendered against

use crate::pricing::{PricingTierTable, Quote};
use serde::{Deserialize, Serialize};

/// Fixed demonstration values for identity placeholders. Real client data never reaches the
/// template engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoIdentity {
    pub client_name: String,
    pub client_phone: String,
    pub client_email: String,
}

impl Default for DemoIdentity {
    fn default() -> Self {
        Self {
            client_name: "John Doe".to_string(),
            client_phone: "+1 555 0100".to_string(),
            client_email: "john.doe@example.com".to_string(),
        }
    }
}

/// One row of a payment schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    /// Share of the final amount, 0..=100
    pub percent: f64,
    /// Due date, printed verbatim
    pub due: String,
}

/// Preview session state. Built fresh when the editor opens, mutated by the editor, never part
/// of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PreviewContext {
    pub currency: String,
    /// 0..=100; out-of-range values are clamped when quoting
    pub discount_percentage: f64,
    pub client_country: String,
    /// Printed verbatim
    pub date: String,
    pub pricing: PricingTierTable,
    pub applicant_count: u32,
    pub demo: DemoIdentity,
    /// Empty means a single installment of 100% due on `date`
    pub installments: Vec<Installment>,
}

impl Default for PreviewContext {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            discount_percentage: 0.0,
            client_country: String::new(),
            date: String::new(),
            pricing: PricingTierTable::default(),
            applicant_count: 1,
            demo: DemoIdentity::default(),
            installments: Vec::new(),
        }
    }
}

impl PreviewContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlay defaults stored with a template record on top of `self`.
    pub fn seeded(
        mut self,
        pricing: Option<PricingTierTable>,
        currency: Option<&str>,
        country: Option<&str>,
    ) -> Self {
        if let Some(pricing) = pricing {
            self.pricing = pricing;
        }
        if let Some(currency) = currency.filter(|c| !c.trim().is_empty()) {
            self.currency = currency.to_string();
        }
        if let Some(country) = country.filter(|c| !c.trim().is_empty()) {
            self.client_country = country.to_string();
        }
        self
    }

    pub fn quote(&self) -> Quote {
        Quote::compute(&self.pricing, self.applicant_count, self.discount_percentage)
    }

    pub fn schedule(&self) -> Vec<Installment> {
        if self.installments.is_empty() {
            vec![Installment {
                percent: 100.0,
                due: self.date.clone(),
            }]
        } else {
            self.installments.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::TierKey;

    #[test]
    fn test_seeded_overrides_only_present_values() {
        let table = PricingTierTable::from_pairs([(TierKey::One, 10.0)]).expect("prices");
        let ctx = PreviewContext::new().seeded(Some(table), Some(""), Some("Kenya"));
        assert_eq!(ctx.currency, "USD");
        assert_eq!(ctx.client_country, "Kenya");
        assert_eq!(ctx.pricing.get(TierKey::One), 10.0);
    }

    #[test]
    fn test_default_schedule_is_single_installment() {
        let ctx = PreviewContext {
            date: "2026-01-31".to_string(),
            ..PreviewContext::default()
        };
        assert_eq!(
            ctx.schedule(),
            vec![Installment {
                percent: 100.0,
                due: "2026-01-31".to_string()
            }]
        );
    }

    #[test]
    fn test_deserialize_partial_context() {
        let ctx: PreviewContext = serde_json::from_str(
            r#"{"currency": "EUR", "applicantCount": 3, "pricing": {"3": 700}}"#,
        )
        .expect("context");
        assert_eq!(ctx.currency, "EUR");
        assert_eq!(ctx.quote().total, 2100.0);
        assert_eq!(ctx.demo, DemoIdentity::default());
    }
}
