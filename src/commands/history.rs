use crate::models::ReceiptSummary;
use crate::services::state::AppState;

pub fn get_history(state: &AppState) -> Vec<ReceiptSummary> {
    state.history().summaries()
}

pub fn format_history(summaries: &[ReceiptSummary]) -> String {
    if summaries.is_empty() {
        return "No saved receipts found.".to_string();
    }
    let mut lines = vec![format!("{:<10} {:<32} {:<12} {}", "Receipt No", "Customer", "Date", "Id")];
    for summary in summaries {
        lines.push(format!(
            "{:<10} {:<32} {:<12} {}",
            summary.receipt_no, summary.received_from, summary.date, summary.id
        ));
    }
    lines.join("\n")
}

pub fn load_receipt(key: String, state: &mut AppState) -> Result<String, String> {
    let receipt = state.load(&key).map_err(|e| e.to_string())?;
    Ok(format!("Loaded {}", receipt.receipt_no))
}

pub fn reload_history(state: &mut AppState) -> Result<String, String> {
    let count = state.reload();
    Ok(format!("History reloaded ({} saved)", count))
}
