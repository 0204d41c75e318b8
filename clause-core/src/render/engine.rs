use super::capture::{CaptureKey, FieldType};
use super::context::{Installment, PreviewContext};
use super::output::{RenderNode, RenderOutput};
use crate::grammar::{self, Token, TOKEN_PATTERN};
use crate::model::{Block, BlockKind, Document, Node, Text};
use crate::pricing::{format_amount, replace_tier_labels, Quote};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static INTERACTIVE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{(text|signature)\}\}").unwrap());

#[derive(Debug, Clone, Copy)]
pub enum RenderMode<'a> {
    /// Placeholders stay literal
    Author,
    /// Placeholders are substituted and interactive fields bound
    Preview(&'a PreviewContext),
}

/// Renders documents in one mode. Holds no state between calls; each [`Renderer::render`] call
/// starts its counters at zero.
#[derive(Debug, Clone, Copy)]
pub struct Renderer<'a> {
    mode: RenderMode<'a>,
}

impl<'a> Renderer<'a> {
    pub fn new(mode: RenderMode<'a>) -> Self {
        Self { mode }
    }

    pub fn author() -> Self {
        Self::new(RenderMode::Author)
    }

    pub fn preview(context: &'a PreviewContext) -> Self {
        Self::new(RenderMode::Preview(context))
    }

    pub fn mode(&self) -> RenderMode<'a> {
        self.mode
    }

    pub fn render(&self, doc: &Document) -> RenderOutput {
        let mut pass = Pass::new(self.mode);
        let nodes = pass.nodes(&doc.content);
        log::debug!(
            "rendered {} top-level nodes, {} capture keys",
            nodes.len(),
            pass.keys.len()
        );
        RenderOutput {
            nodes,
            capture_keys: pass.keys,
        }
    }
}

/// State of a single traversal.
struct Pass<'a> {
    preview: Option<(&'a PreviewContext, Quote)>,
    text_index: usize,
    signature_index: usize,
    keys: Vec<CaptureKey>,
}

impl<'a> Pass<'a> {
    fn new(mode: RenderMode<'a>) -> Self {
        let preview = match mode {
            RenderMode::Author => None,
            RenderMode::Preview(ctx) => Some((ctx, ctx.quote())),
        };
        Self {
            preview,
            text_index: 0,
            signature_index: 0,
            keys: Vec::new(),
        }
    }

    fn nodes(&mut self, nodes: &[Node]) -> Vec<RenderNode> {
        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            match node {
                Node::Text(text) => out.extend(self.text(text)),
                Node::Block(block) => out.extend(self.block(block)),
            }
        }
        out
    }

    fn block(&mut self, block: &Block) -> Vec<RenderNode> {
        match &block.kind {
            BlockKind::HardBreak => vec![RenderNode::LineBreak],
            BlockKind::HorizontalRule => vec![RenderNode::Rule],
            // Unknown types render as their children, or not at all
            BlockKind::Other(_) => match &block.content {
                Some(children) => self.nodes(children),
                None => Vec::new(),
            },
            kind => vec![RenderNode::Block {
                kind: kind.clone(),
                attrs: block.attrs.clone(),
                children: self.nodes(block.children()),
            }],
        }
    }

    fn text(&mut self, text: &Text) -> Vec<RenderNode> {
        let mut content = match self.preview {
            None => vec![RenderNode::text(text.text.as_str())],
            Some((ctx, quote)) => {
                let substituted = substitute(&text.text, ctx, &quote);
                self.bind_fields(&substituted)
            }
        };
        // Innermost wrapper first, so the first mark in the set ends up outermost
        for mark in text.marks.iter().rev() {
            if !mark.kind.is_known() {
                continue;
            }
            content = vec![RenderNode::Marked {
                mark: mark.kind.clone(),
                children: content,
            }];
        }
        content
    }

    /// Split `text` around interactive tokens, binding one key per occurrence.
    fn bind_fields(&mut self, text: &str) -> Vec<RenderNode> {
        let mut out = Vec::new();
        let mut last = 0;
        for caps in INTERACTIVE_PATTERN.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if whole.start() > last {
                out.push(RenderNode::text(&text[last..whole.start()]));
            }
            let key = self.next_key(if name.as_str() == "text" {
                FieldType::Text
            } else {
                FieldType::Signature
            });
            out.push(RenderNode::Field { key });
            last = whole.end();
        }
        if last < text.len() || out.is_empty() {
            out.push(RenderNode::text(&text[last..]));
        }
        out
    }

    fn next_key(&mut self, field: FieldType) -> CaptureKey {
        let counter = match field {
            FieldType::Text => &mut self.text_index,
            FieldType::Signature => &mut self.signature_index,
        };
        let key = CaptureKey::new(field, *counter);
        *counter += 1;
        self.keys.push(key);
        key
    }
}

/// Substitute every non-interactive token in one payload.
///
/// Legacy tier labels are rewritten first. If any tier label or bracket token is present in the
/// payload, `{{price_per_applicant}}` is left as written: the payload already prices each
/// bracket explicitly.
fn substitute(text: &str, ctx: &PreviewContext, quote: &Quote) -> String {
    let (labelled, label_matched) = replace_tier_labels(text, &ctx.pricing);
    let bracket_specific = label_matched
        || grammar::scan(&labelled).any(|m| matches!(m.token(), Some(Token::TierPrice(_))));

    TOKEN_PATTERN
        .replace_all(&labelled, |caps: &Captures| {
            Token::parse(&caps[1])
                .and_then(|token| resolve(token, ctx, quote, bracket_specific))
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Value for one token; `None` leaves the token as written.
fn resolve(token: Token, ctx: &PreviewContext, quote: &Quote, bracket_specific: bool) -> Option<String> {
    let value = match token {
        Token::ClientName => ctx.demo.client_name.clone(),
        Token::ClientPhone => ctx.demo.client_phone.clone(),
        Token::ClientEmail => ctx.demo.client_email.clone(),
        Token::Date => ctx.date.clone(),
        // Bound to capture slots after substitution
        Token::Signature | Token::Text => return None,
        Token::ApplicantCount => quote.applicant_count.to_string(),
        // A payload that prices each bracket itself has no single unit price to print, so the
        // token stays literal there rather than contradicting the bracket amounts beside it
        Token::PricePerApplicant if bracket_specific => return None,
        Token::PricePerApplicant => format_amount(quote.unit_price),
        Token::TotalAmount => format_amount(quote.total),
        Token::DiscountPercentage => format_amount(quote.discount_percentage),
        Token::DiscountAmount => format_amount(quote.discount_amount),
        Token::FinalAmount => format_amount(quote.final_amount),
        Token::Currency => ctx.currency.clone(),
        Token::ClientCountry => ctx.client_country.clone(),
        Token::PaymentPlanRow => ctx
            .schedule()
            .iter()
            .enumerate()
            .map(|(i, installment)| {
                format!(
                    "{}. {}% - {} {} - due {}",
                    i + 1,
                    format_amount(installment.percent),
                    ctx.currency,
                    format_amount(quote.final_amount * installment.percent / 100.0),
                    installment.due
                )
            })
            .collect::<Vec<_>>()
            .join("; "),
        Token::PaymentPercent => format_amount(first_installment(ctx).percent),
        Token::PaymentDue => first_installment(ctx).due,
        Token::PaymentAmount => {
            format_amount(quote.final_amount * first_installment(ctx).percent / 100.0)
        }
        Token::TierPrice(key) => format_amount(ctx.pricing.get(key)),
    };
    Some(value)
}

fn first_installment(ctx: &PreviewContext) -> Installment {
    ctx.schedule().swap_remove(0)
}
