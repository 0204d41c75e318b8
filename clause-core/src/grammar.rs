//! Placeholder grammar
//!
//!     A placeholder is `{{identifier}}` inside a text payload: case-sensitive, no whitespace
//!     inside the braces, identifier made of ASCII letters, digits and underscores.
//!
//!     Recognized identifiers form closed families:
//!
//!     | Family          | Identifiers                                                          |
//!     |-----------------|----------------------------------------------------------------------|
//!     | Identity        | client_name, client_phone, client_email, signature, date             |
//!     | Pricing         | applicant_count, price_per_applicant, total_amount,                  |
//!     |                 | discount_percentage, discount_amount, final_amount, currency,        |
//!     |                 | client_country                                                       |
//!     | PaymentSchedule | payment_plan_row, payment_percent, payment_due, payment_amount       |
//!     | Interactive     | text, signature                                                      |
//!     | TierPricing     | price_1, price_2, price_3, price_4_7, price_8_9, price_10_15,        |
//!     |                 | price_16_plus                                                        |
//!
//!     `signature` belongs to both Identity and Interactive; at preview time it is always bound
//!     to a capture slot (see the render module).
//!
//!     This module only names and finds tokens. Substitution happens in the renderer, and any
//!     identifier outside the families is inert text.

use crate::pricing::TierKey;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

/// Matches any well-formed placeholder; group 1 is the identifier.
pub static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{([A-Za-z0-9_]+)\}\}").unwrap());

/// A recognized placeholder identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    ClientName,
    ClientPhone,
    ClientEmail,
    Signature,
    Date,
    ApplicantCount,
    PricePerApplicant,
    TotalAmount,
    DiscountPercentage,
    DiscountAmount,
    FinalAmount,
    Currency,
    ClientCountry,
    PaymentPlanRow,
    PaymentPercent,
    PaymentDue,
    PaymentAmount,
    Text,
    TierPrice(TierKey),
}

impl Token {
    pub fn parse(identifier: &str) -> Option<Token> {
        let token = match identifier {
            "client_name" => Token::ClientName,
            "client_phone" => Token::ClientPhone,
            "client_email" => Token::ClientEmail,
            "signature" => Token::Signature,
            "date" => Token::Date,
            "applicant_count" => Token::ApplicantCount,
            "price_per_applicant" => Token::PricePerApplicant,
            "total_amount" => Token::TotalAmount,
            "discount_percentage" => Token::DiscountPercentage,
            "discount_amount" => Token::DiscountAmount,
            "final_amount" => Token::FinalAmount,
            "currency" => Token::Currency,
            "client_country" => Token::ClientCountry,
            "payment_plan_row" => Token::PaymentPlanRow,
            "payment_percent" => Token::PaymentPercent,
            "payment_due" => Token::PaymentDue,
            "payment_amount" => Token::PaymentAmount,
            "text" => Token::Text,
            other => return TierKey::from_token(other).map(Token::TierPrice),
        };
        Some(token)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Token::ClientName => "client_name",
            Token::ClientPhone => "client_phone",
            Token::ClientEmail => "client_email",
            Token::Signature => "signature",
            Token::Date => "date",
            Token::ApplicantCount => "applicant_count",
            Token::PricePerApplicant => "price_per_applicant",
            Token::TotalAmount => "total_amount",
            Token::DiscountPercentage => "discount_percentage",
            Token::DiscountAmount => "discount_amount",
            Token::FinalAmount => "final_amount",
            Token::Currency => "currency",
            Token::ClientCountry => "client_country",
            Token::PaymentPlanRow => "payment_plan_row",
            Token::PaymentPercent => "payment_percent",
            Token::PaymentDue => "payment_due",
            Token::PaymentAmount => "payment_amount",
            Token::Text => "text",
            Token::TierPrice(key) => key.token(),
        }
    }

    /// Families this token belongs to. Only `signature` belongs to two.
    pub fn families(&self) -> Vec<Family> {
        Family::ALL
            .into_iter()
            .filter(|family| family.tokens().contains(self))
            .collect()
    }

    pub fn tag(&self) -> String {
        token(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Identity,
    Pricing,
    PaymentSchedule,
    Interactive,
    TierPricing,
}

impl Family {
    pub const ALL: [Family; 5] = [
        Family::Identity,
        Family::Pricing,
        Family::PaymentSchedule,
        Family::Interactive,
        Family::TierPricing,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Family::Identity => "identity",
            Family::Pricing => "pricing",
            Family::PaymentSchedule => "payment_schedule",
            Family::Interactive => "interactive",
            Family::TierPricing => "tier_pricing",
        }
    }

    pub fn tokens(&self) -> &'static [Token] {
        match self {
            Family::Identity => &[
                Token::ClientName,
                Token::ClientPhone,
                Token::ClientEmail,
                Token::Signature,
                Token::Date,
            ],
            Family::Pricing => &[
                Token::ApplicantCount,
                Token::PricePerApplicant,
                Token::TotalAmount,
                Token::DiscountPercentage,
                Token::DiscountAmount,
                Token::FinalAmount,
                Token::Currency,
                Token::ClientCountry,
            ],
            Family::PaymentSchedule => &[
                Token::PaymentPlanRow,
                Token::PaymentPercent,
                Token::PaymentDue,
                Token::PaymentAmount,
            ],
            Family::Interactive => &[Token::Text, Token::Signature],
            Family::TierPricing => &[
                Token::TierPrice(TierKey::One),
                Token::TierPrice(TierKey::Two),
                Token::TierPrice(TierKey::Three),
                Token::TierPrice(TierKey::FourToSeven),
                Token::TierPrice(TierKey::EightToNine),
                Token::TierPrice(TierKey::TenToFifteen),
                Token::TierPrice(TierKey::SixteenPlus),
            ],
        }
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.tokens().iter().map(Token::label).collect()
    }
}

/// Every family with its labels, in a stable order (for token pickers).
pub fn list_families() -> Vec<(Family, Vec<&'static str>)> {
    Family::ALL
        .into_iter()
        .map(|family| (family, family.labels()))
        .collect()
}

/// The insertable tag for `label`, if `label` belongs to `family`.
pub fn tag_for(family: Family, label: &str) -> Option<String> {
    family
        .tokens()
        .iter()
        .find(|t| t.label() == label)
        .map(Token::tag)
}

/// `{{identifier}}`, for any identifier.
pub fn token(identifier: &str) -> String {
    format!("{{{{{}}}}}", identifier)
}

/// Families containing `identifier`; empty for unknown identifiers.
pub fn lookup(identifier: &str) -> Vec<Family> {
    Token::parse(identifier)
        .map(|t| t.families())
        .unwrap_or_default()
}

/// One placeholder occurrence inside a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMatch<'t> {
    /// Byte range of the whole `{{…}}` occurrence
    pub range: Range<usize>,
    pub identifier: &'t str,
}

impl TokenMatch<'_> {
    pub fn token(&self) -> Option<Token> {
        Token::parse(self.identifier)
    }
}

/// Every placeholder occurrence in `text`, recognized or not, in order.
pub fn scan(text: &str) -> impl Iterator<Item = TokenMatch<'_>> + '_ {
    TOKEN_PATTERN.captures_iter(text).filter_map(|caps| {
        let whole = caps.get(0)?;
        let identifier = caps.get(1)?;
        Some(TokenMatch {
            range: whole.range(),
            identifier: identifier.as_str(),
        })
    })
}
