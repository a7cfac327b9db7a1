use std::path::Path;

use crate::models::{filter_options, Purity, ORNAMENT_LIST};
use crate::services::editor::{ItemField, ReceiptField};
use crate::services::print::{export_html, render_text};
use crate::services::state::AppState;

pub fn show_receipt(state: &AppState) -> String {
    render_text(state.receipt(), state.settings())
}

pub fn get_totals(state: &AppState) -> String {
    let totals = state.totals();
    let [cust_gross, cust_net, centre_gross, centre_net] = totals.weight_columns();
    format!(
        "Pieces: {}\nCustomer gross/net: {} / {}\nCentre gross/net: {} / {}\nPayable: {}",
        totals.pieces,
        cust_gross,
        cust_net,
        centre_gross,
        centre_net,
        state.payable()
    )
}

pub fn update_receipt_field(field: ReceiptField, value: String, state: &mut AppState) -> Result<(), String> {
    state.editor_mut().set_field(field, value);
    Ok(())
}

pub fn update_item_field(sl_no: usize, field: ItemField, value: String, state: &mut AppState) -> Result<(), String> {
    let item_id = state.editor().item_id_at(sl_no).map_err(|e| e.to_string())?;
    state
        .editor_mut()
        .set_item_field(&item_id, field, value)
        .map_err(|e| e.to_string())
}

pub fn add_row(state: &mut AppState) -> Result<String, String> {
    state.editor_mut().add_row();
    Ok(format!("Added row {}", state.receipt().items.len()))
}

pub fn remove_row(sl_no: usize, state: &mut AppState) -> Result<String, String> {
    let item_id = state.editor().item_id_at(sl_no).map_err(|e| e.to_string())?;
    let removed = state
        .editor_mut()
        .remove_row(&item_id)
        .map_err(|e| e.to_string())?;
    if removed {
        Ok(format!("Removed row {}", sl_no))
    } else {
        Ok("A receipt keeps at least one row".to_string())
    }
}

pub fn save_receipt(state: &mut AppState) -> Result<String, String> {
    let unreadable = state.unreadable_records();
    let summary = state.save().map_err(|e| e.to_string())?;
    let mut message = format!("Receipt {} saved successfully", summary.receipt_no);
    if unreadable > 0 {
        message.push_str(&format!(
            "\n{} unreadable stored record(s) were copied aside before saving",
            unreadable
        ));
    }
    Ok(message)
}

pub fn new_receipt(state: &mut AppState) -> Result<String, String> {
    let receipt = state.new_receipt();
    Ok(format!("Started {}", receipt.receipt_no))
}

pub fn print_receipt(state: &AppState, dir: &Path, open_file: bool) -> Result<String, String> {
    let path = export_html(state.receipt(), state.settings(), dir)
        .map_err(|e| format!("Could not write voucher: {}", e))?;
    if open_file {
        open::that(&path).map_err(|e| e.to_string())?;
    }
    Ok(format!("Voucher written to {}", path.display()))
}

pub fn suggest(list: &str, term: &str) -> Result<Vec<&'static str>, String> {
    match list {
        "desc" | "description" => Ok(filter_options(&ORNAMENT_LIST, term)),
        "purity" => Ok(filter_options(&Purity::codes(), term)),
        other => Err(format!("No suggestions for '{}'; try desc or purity", other)),
    }
}
