use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::utils::{parse_count_or_zero, parse_or_zero};

pub mod vocabulary;

pub use vocabulary::{filter_options, Purity, ORNAMENT_LIST};

/// Raw text of a numeric input as the operator typed it.
///
/// Edits keep the text as typed and its value is derived on read, falling
/// back to zero for anything that does not parse. Saving writes text that
/// parses as a number in JSON number form, so `"2.50"` reloads as `"2.5"`
/// and `"007"` as `"7"`. Other text is saved as typed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericText(String);

impl NumericText {
    pub fn new(raw: impl Into<String>) -> Self {
        NumericText(raw.into())
    }

    pub fn raw(&self) -> &str {
        &self.0
    }

    pub fn value(&self) -> f64 {
        parse_or_zero(&self.0)
    }

    pub fn count(&self) -> u64 {
        parse_count_or_zero(&self.0)
    }
}

impl From<&str> for NumericText {
    fn from(raw: &str) -> Self {
        NumericText::new(raw)
    }
}

impl Serialize for NumericText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let trimmed = self.0.trim();
        if trimmed.is_empty() {
            return serializer.serialize_u64(0);
        }
        if let Ok(whole) = trimmed.parse::<u64>() {
            return serializer.serialize_u64(whole);
        }
        match trimmed.parse::<f64>() {
            Ok(number) if number.is_finite() => serializer.serialize_f64(number),
            _ => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for NumericText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let raw = match value {
            serde_json::Value::Null => String::new(),
            serde_json::Value::Number(number) => {
                if number.as_f64() == Some(0.0) {
                    String::new()
                } else {
                    number.to_string()
                }
            }
            serde_json::Value::String(text) => text,
            other => other.to_string(),
        };
        Ok(NumericText(raw))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub qty: NumericText,
    #[serde(default)]
    pub customer_gross_weight: NumericText,
    #[serde(default)]
    pub customer_net_weight: NumericText,
    #[serde(default)]
    pub centre_gross_weight: NumericText,
    #[serde(default)]
    pub centre_net_weight: NumericText,
    #[serde(default)]
    pub declared_purity: String,
    #[serde(default)]
    pub remarks: String,
}

impl LineItem {
    pub fn blank(id: String) -> Self {
        LineItem {
            id,
            description: String::new(),
            qty: NumericText::default(),
            customer_gross_weight: NumericText::default(),
            customer_net_weight: NumericText::default(),
            centre_gross_weight: NumericText::default(),
            centre_net_weight: NumericText::default(),
            declared_purity: String::new(),
            remarks: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub id: String,
    pub receipt_no: String,
    #[serde(default)]
    pub received_from: String,
    #[serde(default)]
    pub bis_certificate_no: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub dc_no: String,
    #[serde(default)]
    pub dc_date: String,
    #[serde(default)]
    pub created_at: i64,
}

/// One row of the history listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptSummary {
    pub id: String,
    pub receipt_no: String,
    pub received_from: String,
    pub date: String,
    pub created_at: i64,
}

impl From<&Receipt> for ReceiptSummary {
    fn from(receipt: &Receipt) -> Self {
        let received_from = if receipt.received_from.trim().is_empty() {
            "N/A".to_string()
        } else {
            receipt.received_from.clone()
        };
        ReceiptSummary {
            id: receipt.id.clone(),
            receipt_no: receipt.receipt_no.clone(),
            received_from,
            date: receipt.date.clone(),
            created_at: receipt.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub company_name: String,
    pub address: String,
    pub phones: String,
    pub email_gst: String,
    pub jurisdiction: String,
    pub rate_per_piece: f64,
    pub minimum_payable: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            company_name: "SREERAM ASSAY & HALLMARKING CENTRE".to_string(),
            address: "Serampore, Hooghly, West Bengal".to_string(),
            phones: "Ph.: +91 00000 00000".to_string(),
            email_gst: "Email: info@sreeramhallmarking.in | GSTIN: 19XXXXXXXXXXXXX".to_string(),
            jurisdiction: "SERAMPORE, HOOGHLY, (WEST BENGAL)".to_string(),
            rate_per_piece: 50.0,
            minimum_payable: 500.0,
        }
    }
}
