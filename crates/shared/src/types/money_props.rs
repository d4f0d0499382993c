//! Property-based tests for Amount summation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::types::money::Amount;

/// Cent amounts up to one million.
fn arb_amount() -> impl Strategy<Value = Amount> {
    (1i64..100_000_000).prop_map(|cents| Amount::new(Decimal::new(cents, 2)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Summing amounts equals summing their cents as integers.
    #[test]
    fn prop_sum_is_exact(cents in prop::collection::vec(1i64..100_000_000, 0..50)) {
        let total: Amount = cents.iter().map(|c| Amount::new(Decimal::new(*c, 2))).sum();
        prop_assert_eq!(total.value(), Decimal::new(cents.iter().sum(), 2));
    }

    /// Order of summation does not change the total.
    #[test]
    fn prop_sum_is_order_independent(amounts in prop::collection::vec(arb_amount(), 0..50)) {
        let forward: Amount = amounts.iter().sum();
        let backward: Amount = amounts.iter().rev().sum();
        prop_assert_eq!(forward, backward);
    }

    /// Any sum of positive amounts stays positive.
    #[test]
    fn prop_sum_of_positives_is_positive(amounts in prop::collection::vec(arb_amount(), 1..50)) {
        let total: Amount = amounts.into_iter().sum();
        prop_assert!(total.is_positive());
    }
}
