use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local};
use thiserror::Error;
use tracing::debug;

use crate::models::{LineItem, NumericText, Purity, Receipt};
use crate::services::ids::generate_id;
use crate::services::totals::Totals;
use crate::utils::{date_en_gb, time_en_gb};

pub const BLANK_ROWS: usize = 5;
pub const DEFAULT_DC_NO: &str = "BY HAND";

#[derive(Debug, Error, PartialEq)]
pub enum EditError {
    #[error("No line item with id {0}")]
    UnknownItem(String),
    #[error("No saved receipt matches {0}")]
    UnknownReceipt(String),
    #[error("Sl. No. {0} is out of range (1-{1})")]
    InvalidSlNo(usize, usize),
}

/// Header fields the operator may change after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptField {
    ReceivedFrom,
    BisCertificateNo,
    DcNo,
    DcDate,
}

impl FromStr for ReceiptField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "from" | "received_from" | "customer" => Ok(ReceiptField::ReceivedFrom),
            "bis" | "certificate" | "bis_certificate_no" => Ok(ReceiptField::BisCertificateNo),
            "dc" | "dc_no" => Ok(ReceiptField::DcNo),
            "dcdate" | "dc_date" => Ok(ReceiptField::DcDate),
            other => Err(format!("Unknown receipt field: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemField {
    Description,
    Qty,
    CustomerGrossWeight,
    CustomerNetWeight,
    CentreGrossWeight,
    CentreNetWeight,
    DeclaredPurity,
    Remarks,
}

impl FromStr for ItemField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "desc" | "description" => Ok(ItemField::Description),
            "qty" | "pcs" => Ok(ItemField::Qty),
            "cgross" | "customer_gross" => Ok(ItemField::CustomerGrossWeight),
            "cnet" | "customer_net" => Ok(ItemField::CustomerNetWeight),
            "hgross" | "centre_gross" => Ok(ItemField::CentreGrossWeight),
            "hnet" | "centre_net" => Ok(ItemField::CentreNetWeight),
            "purity" => Ok(ItemField::DeclaredPurity),
            "remarks" | "note" => Ok(ItemField::Remarks),
            other => Err(format!("Unknown item field: {}", other)),
        }
    }
}

impl fmt::Display for ItemField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ItemField::Description => "description",
            ItemField::Qty => "qty",
            ItemField::CustomerGrossWeight => "customer gross weight",
            ItemField::CustomerNetWeight => "customer net weight",
            ItemField::CentreGrossWeight => "centre gross weight",
            ItemField::CentreNetWeight => "centre net weight",
            ItemField::DeclaredPurity => "declared purity",
            ItemField::Remarks => "remarks",
        };
        f.write_str(name)
    }
}

/// The receipt currently on screen and the edits allowed on it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptEditor {
    receipt: Receipt,
}

impl ReceiptEditor {
    /// A blank receipt with [`BLANK_ROWS`] empty rows, dated `now`.
    pub fn blank(receipt_no: String, now: DateTime<Local>) -> Self {
        let date = date_en_gb(&now);
        let receipt = Receipt {
            id: generate_id(),
            receipt_no,
            received_from: String::new(),
            bis_certificate_no: String::new(),
            date: date.clone(),
            time: time_en_gb(&now),
            items: (0..BLANK_ROWS).map(|_| LineItem::blank(generate_id())).collect(),
            dc_no: DEFAULT_DC_NO.to_string(),
            dc_date: date,
            created_at: now.timestamp_millis(),
        };
        ReceiptEditor { receipt }
    }

    pub fn open(mut receipt: Receipt) -> Self {
        if receipt.items.is_empty() {
            receipt.items.push(LineItem::blank(generate_id()));
        }
        ReceiptEditor { receipt }
    }

    pub fn receipt(&self) -> &Receipt {
        &self.receipt
    }

    pub fn totals(&self) -> Totals {
        Totals::from_items(&self.receipt.items)
    }

    pub fn set_field(&mut self, field: ReceiptField, value: impl Into<String>) {
        let value = value.into();
        debug!(receipt = %self.receipt.receipt_no, ?field, "Receipt field updated");
        match field {
            ReceiptField::ReceivedFrom => self.receipt.received_from = value,
            ReceiptField::BisCertificateNo => self.receipt.bis_certificate_no = value,
            ReceiptField::DcNo => self.receipt.dc_no = value,
            ReceiptField::DcDate => self.receipt.dc_date = value,
        }
    }

    pub fn set_item_field(
        &mut self,
        item_id: &str,
        field: ItemField,
        value: impl Into<String>,
    ) -> Result<(), EditError> {
        let value = value.into();
        let item = self
            .receipt
            .items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| EditError::UnknownItem(item_id.to_string()))?;

        match field {
            ItemField::Description => item.description = value,
            ItemField::Qty => item.qty = NumericText::new(value),
            ItemField::CustomerGrossWeight => item.customer_gross_weight = NumericText::new(value),
            ItemField::CustomerNetWeight => item.customer_net_weight = NumericText::new(value),
            ItemField::CentreGrossWeight => item.centre_gross_weight = NumericText::new(value),
            ItemField::CentreNetWeight => item.centre_net_weight = NumericText::new(value),
            ItemField::DeclaredPurity => {
                item.declared_purity = match value.parse::<Purity>() {
                    Ok(purity) => purity.code().to_string(),
                    Err(_) => value,
                }
            }
            ItemField::Remarks => item.remarks = value,
        }
        debug!(item = item_id, %field, "Line item updated");
        Ok(())
    }

    /// Appends an empty row and returns its id.
    pub fn add_row(&mut self) -> String {
        let id = generate_id();
        self.receipt.items.push(LineItem::blank(id.clone()));
        id
    }

    /// Removes a row. The last remaining row is never removed; asking to is
    /// a no-op that returns `Ok(false)`.
    pub fn remove_row(&mut self, item_id: &str) -> Result<bool, EditError> {
        if !self.receipt.items.iter().any(|item| item.id == item_id) {
            return Err(EditError::UnknownItem(item_id.to_string()));
        }
        if self.receipt.items.len() <= 1 {
            return Ok(false);
        }
        self.receipt.items.retain(|item| item.id != item_id);
        Ok(true)
    }

    /// Id of the row printed as `sl_no` (1-based).
    pub fn item_id_at(&self, sl_no: usize) -> Result<String, EditError> {
        let count = self.receipt.items.len();
        if sl_no == 0 || sl_no > count {
            return Err(EditError::InvalidSlNo(sl_no, count));
        }
        Ok(self.receipt.items[sl_no - 1].id.clone())
    }

    pub(crate) fn mark_saved(&mut self, saved: &Receipt) {
        self.receipt.created_at = saved.created_at;
    }
}
