//! Property checks for the totals aggregator.

use assay_receipts::models::{LineItem, NumericText};
use assay_receipts::services::totals::{payable_amount, Totals};
use proptest::prelude::*;

fn row(index: usize, qty: u32, weights: [u32; 4]) -> LineItem {
    let mut item = LineItem::blank(format!("row-{}", index));
    item.qty = NumericText::new(qty.to_string());
    // thousandths of a gram keep sums exact enough to compare
    item.customer_gross_weight = NumericText::new(format!("{}.{:03}", weights[0] / 1000, weights[0] % 1000));
    item.customer_net_weight = NumericText::new(format!("{}.{:03}", weights[1] / 1000, weights[1] % 1000));
    item.centre_gross_weight = NumericText::new(format!("{}.{:03}", weights[2] / 1000, weights[2] % 1000));
    item.centre_net_weight = NumericText::new(format!("{}.{:03}", weights[3] / 1000, weights[3] % 1000));
    item
}

fn rows_strategy() -> impl Strategy<Value = Vec<LineItem>> {
    prop::collection::vec((0u32..500, prop::array::uniform4(0u32..100_000)), 1..12).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(index, (qty, weights))| row(index, qty, weights))
            .collect()
    })
}

proptest! {
    #[test]
    fn totals_ignore_row_order(rows in rows_strategy(), seed in any::<u64>()) {
        let forward = Totals::from_items(&rows);
        let mut shuffled = rows.clone();
        shuffled.reverse();
        let len = shuffled.len();
        shuffled.rotate_left((seed as usize) % len);
        let permuted = Totals::from_items(&shuffled);

        prop_assert_eq!(forward.pieces, permuted.pieces);
        prop_assert_eq!(forward.weight_columns(), permuted.weight_columns());
    }

    #[test]
    fn junk_rows_add_nothing(rows in rows_strategy(), junk in "[a-z ]{0,8}") {
        let baseline = Totals::from_items(&rows);
        let mut noisy = rows.clone();
        let mut extra = LineItem::blank("junk".to_string());
        extra.qty = NumericText::new(junk.clone());
        extra.customer_net_weight = NumericText::new(junk);
        noisy.push(extra);

        let with_junk = Totals::from_items(&noisy);
        prop_assert_eq!(baseline.pieces, with_junk.pieces);
        prop_assert_eq!(baseline.weight_columns(), with_junk.weight_columns());
    }

    #[test]
    fn payable_never_drops_below_the_floor(pieces in 0u64..10_000) {
        let payable = payable_amount(pieces, 50.0, 500.0);
        prop_assert!(payable >= 500.0);
        prop_assert!(payable >= pieces as f64 * 50.0);
    }
}
