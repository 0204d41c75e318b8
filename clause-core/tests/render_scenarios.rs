//! End-to-end render scenarios over canonical JSON documents.

use clause_core::model::validate;
use clause_core::{
    CaptureKey, CaptureSlotMap, CapturedValue, Document, FieldType, MarkKind, PreviewContext,
    PricingTierTable, RenderNode, Renderer, TierKey,
};
use serde_json::json;

fn doc(tree: serde_json::Value) -> Document {
    validate(&tree).expect("fixture is a valid document")
}

fn keys(out: &clause_core::RenderOutput) -> Vec<String> {
    out.capture_keys.iter().map(|k| k.to_string()).collect()
}

#[test]
fn total_scenario() {
    let document = doc(json!({"type": "doc", "content": [
        {"type": "paragraph", "content": [
            {"type": "text", "text": "Total: {{currency}} {{total_amount}}"}
        ]}
    ]}));
    let ctx = PreviewContext {
        currency: "USD".to_string(),
        pricing: PricingTierTable::from_pairs([(TierKey::One, 1000.0)]).expect("prices"),
        applicant_count: 1,
        ..PreviewContext::default()
    };

    let out = Renderer::preview(&ctx).render(&document);
    assert_eq!(out.to_plain_text(), "Total: USD 1000");
}

#[test]
fn occurrence_keys_follow_document_order_per_type() {
    let document = doc(json!({"type": "doc", "content": [
        {"type": "paragraph", "content": [{"type": "text", "text": "Client signature: {{signature}}"}]},
        {"type": "bulletList", "content": [
            {"type": "listItem", "content": [
                {"type": "paragraph", "content": [{"type": "text", "text": "Passport no. {{text}}"}]}
            ]},
            {"type": "listItem", "content": [
                {"type": "paragraph", "content": [
                    {"type": "text", "text": "Address {{text}}", "marks": [{"type": "bold"}]}
                ]}
            ]}
        ]},
        {"type": "paragraph", "content": [{"type": "text", "text": "Witness: {{signature}}"}]}
    ]}));
    let ctx = PreviewContext::default();

    let first = Renderer::preview(&ctx).render(&document);
    assert_eq!(
        keys(&first),
        vec!["signature_0", "text_0", "text_1", "signature_1"]
    );

    let second = Renderer::preview(&ctx).render(&document);
    assert_eq!(first, second);
}

#[test]
fn entered_values_survive_rerender() {
    let document = doc(json!({"type": "doc", "content": [
        {"type": "paragraph", "content": [{"type": "text", "text": "{{text}} {{text}} {{signature}}"}]}
    ]}));
    let ctx = PreviewContext::default();

    let first = Renderer::preview(&ctx).render(&document);
    let mut slots = CaptureSlotMap::new();
    slots
        .write_str("text_1", CapturedValue::Text("Mombasa".to_string()))
        .expect("text slot");
    slots
        .write_str("signature_0", CapturedValue::Signature(vec![0x89, b'P', b'N', b'G']))
        .expect("signature slot");

    let second = Renderer::preview(&ctx).render(&document);
    let carried = CaptureSlotMap::carry_over(&slots, &second.capture_keys);
    assert_eq!(carried, slots);
    assert_eq!(
        carried.get(&CaptureKey::new(FieldType::Text, 1)),
        Some(&CapturedValue::Text("Mombasa".to_string()))
    );
}

#[test]
fn unknown_token_passthrough() {
    let document = doc(json!({"type": "doc", "content": [
        {"type": "paragraph", "content": [{"type": "text", "text": "Ref {{not_a_real_field}}"}]}
    ]}));
    let out = Renderer::preview(&PreviewContext::default()).render(&document);
    assert_eq!(out.to_plain_text(), "Ref {{not_a_real_field}}");
}

#[test]
fn mark_composition_is_bold_outer_italic_inner() {
    let tree = json!({"type": "doc", "content": [
        {"type": "paragraph", "content": [
            {"type": "text", "text": "Important", "marks": [{"type": "bold"}, {"type": "italic"}]}
        ]}
    ]});
    let document = doc(tree.clone());
    // The mark order survives a save
    assert_eq!(document.to_value(), tree);

    let out = Renderer::author().render(&document);
    let RenderNode::Block { children, .. } = &out.nodes[0] else {
        panic!("expected paragraph");
    };
    let RenderNode::Marked { mark, children } = &children[0] else {
        panic!("expected outer mark");
    };
    assert_eq!(mark, &MarkKind::Bold);
    assert!(matches!(
        &children[0],
        RenderNode::Marked { mark: MarkKind::Italic, .. }
    ));
}

#[test]
fn concurrent_sessions_number_independently() {
    let document = doc(json!({"type": "doc", "content": [
        {"type": "paragraph", "content": [{"type": "text", "text": "{{text}}{{signature}}"}]}
    ]}));
    let a = PreviewContext::default();
    let b = PreviewContext {
        currency: "EUR".to_string(),
        ..PreviewContext::default()
    };

    let handles: Vec<_> = [a, b]
        .into_iter()
        .map(|ctx| {
            let document = document.clone();
            std::thread::spawn(move || Renderer::preview(&ctx).render(&document).capture_keys)
        })
        .collect();
    for handle in handles {
        let keys = handle.join().expect("render thread");
        assert_eq!(
            keys,
            vec![
                CaptureKey::new(FieldType::Text, 0),
                CaptureKey::new(FieldType::Signature, 0)
            ]
        );
    }
}

#[test]
fn rendered_output_serializes() {
    let document = doc(json!({"type": "doc", "content": [
        {"type": "paragraph", "content": [{"type": "text", "text": "Sign {{signature}}"}]},
        {"type": "horizontalRule"}
    ]}));
    let out = Renderer::preview(&PreviewContext::default()).render(&document);
    let value = serde_json::to_value(&out).expect("serialize");
    assert_eq!(value["captureKeys"], json!(["signature_0"]));
    assert_eq!(value["nodes"][0]["node"], json!("block"));
    assert_eq!(value["nodes"][0]["kind"], json!("paragraph"));
    assert_eq!(
        value["nodes"][0]["children"][1],
        json!({"node": "field", "key": "signature_0"})
    );
    assert_eq!(value["nodes"][1], json!({"node": "rule"}));
    insta::assert_snapshot!(out.to_plain_text().replace('\n', " / "), @"Sign [signature_0] / ---");
}
