use crate::models::Receipt;

const PREFIX: &str = "RC";

/// Next receipt number after the highest `RC<digits>` in `receipts`.
/// Numbers that do not follow the pattern are skipped.
pub fn next_receipt_number<'a, I>(receipts: I) -> String
where
    I: IntoIterator<Item = &'a Receipt>,
{
    let max = receipts
        .into_iter()
        .filter_map(|receipt| parse_receipt_number(&receipt.receipt_no))
        .max()
        .unwrap_or(0);
    format!("{}{}", PREFIX, max.saturating_add(1))
}

pub fn parse_receipt_number(receipt_no: &str) -> Option<u64> {
    let digits = receipt_no.trim().strip_prefix(PREFIX)?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
