//! Properties of the pricing calculator.

use clause_core::pricing::{discount_amount, final_amount, total_amount, unit_price};
use clause_core::{bracket_key_for, PricingTierTable, Quote, TierKey};
use proptest::prelude::*;

#[test]
fn brackets_are_monotonic_over_first_twenty_counts() {
    let mut previous = bracket_key_for(1).index();
    for count in 1..=20u32 {
        let current = bracket_key_for(count).index();
        assert!(current >= previous, "bracket went down at {}", count);
        previous = current;
    }
}

#[test]
fn documented_examples() {
    assert_eq!(bracket_key_for(1), TierKey::One);
    assert_eq!(bracket_key_for(5), TierKey::FourToSeven);
    assert_eq!(bracket_key_for(9), TierKey::EightToNine);
    assert_eq!(bracket_key_for(16), TierKey::SixteenPlus);
    assert_eq!(bracket_key_for(100), TierKey::SixteenPlus);
}

#[test]
fn arithmetic_chain() {
    let table = PricingTierTable::from_pairs([(TierKey::One, 2500.0)]).expect("prices");
    let unit = unit_price(&table, 1);
    let total = total_amount(unit, 1);
    let discount = discount_amount(total, 10.0);
    assert_eq!(unit, 2500.0);
    assert_eq!(total, 2500.0);
    assert_eq!(discount, 250.0);
    assert_eq!(final_amount(total, discount), 2250.0);
}

proptest! {
    #[test]
    fn bracket_index_never_decreases(a in 0u32..10_000, b in 0u32..10_000) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(bracket_key_for(lo).index() <= bracket_key_for(hi).index());
    }

    #[test]
    fn final_never_exceeds_total(
        price in 0.0f64..100_000.0,
        count in 1u32..200,
        discount in -50.0f64..150.0,
    ) {
        let table = PricingTierTable::from_pairs(TierKey::ALL.map(|k| (k, price))).unwrap();
        let quote = Quote::compute(&table, count, discount);
        prop_assert!(quote.final_amount <= quote.total + 1e-6);
        prop_assert!(quote.final_amount >= -1e-6);
    }
}
