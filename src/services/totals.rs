use serde::Serialize;

use crate::models::LineItem;
use crate::utils::{format_decimal, format_weight};

/// Column sums of a receipt's rows. Always derived, never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub pieces: u64,
    pub customer_gross: f64,
    pub customer_net: f64,
    pub centre_gross: f64,
    pub centre_net: f64,
}

impl Totals {
    pub fn from_items(items: &[LineItem]) -> Self {
        items.iter().fold(Totals::default(), |acc, item| Totals {
            pieces: acc.pieces.saturating_add(item.qty.count()),
            customer_gross: acc.customer_gross + item.customer_gross_weight.value(),
            customer_net: acc.customer_net + item.customer_net_weight.value(),
            centre_gross: acc.centre_gross + item.centre_gross_weight.value(),
            centre_net: acc.centre_net + item.centre_net_weight.value(),
        })
    }

    pub fn payable(&self, rate_per_piece: f64, minimum_payable: f64) -> f64 {
        payable_amount(self.pieces, rate_per_piece, minimum_payable)
    }

    /// Weight columns as printed, three decimals each.
    pub fn weight_columns(&self) -> [String; 4] {
        [
            format_weight(self.customer_gross),
            format_weight(self.customer_net),
            format_weight(self.centre_gross),
            format_weight(self.centre_net),
        ]
    }
}

pub fn payable_amount(pieces: u64, rate_per_piece: f64, minimum_payable: f64) -> f64 {
    (pieces as f64 * rate_per_piece).max(minimum_payable)
}

pub fn format_payable(pieces: u64, rate_per_piece: f64, minimum_payable: f64) -> String {
    format_decimal(payable_amount(pieces, rate_per_piece, minimum_payable))
}
