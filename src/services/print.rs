use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::models::{LineItem, Receipt, Settings};
use crate::services::totals::{format_payable, Totals};
use crate::utils::{escape_html, sanitize_filename};

const TITLE: &str = "RECEIPT / COLLECTION VOUCHER";
const PREAMBLE: &str = "The following articles, as detailed below for hallmarking / assaying:";
const ACCEPTANCE: &str = "I accept and are bound by all the 'Terms and Conditions' printed attached.";
const PAYABLE_CAPTION: &str = "After Collecting the Article Payable Amount";
const RULE_WIDTH: usize = 100;

/// Weight cell as printed: blank for an empty or zero entry, the raw text
/// otherwise so an unparsed value stays visible for correction.
fn cell(raw: &str) -> &str {
    let trimmed = raw.trim();
    let zero = trimmed
        .replace(',', ".")
        .parse::<f64>()
        .map_or(false, |value| value == 0.0);
    if zero {
        ""
    } else {
        trimmed
    }
}

fn row_cells(index: usize, item: &LineItem) -> [String; 9] {
    [
        (index + 1).to_string(),
        item.description.clone(),
        cell(item.qty.raw()).to_string(),
        cell(item.customer_gross_weight.raw()).to_string(),
        cell(item.customer_net_weight.raw()).to_string(),
        cell(item.centre_gross_weight.raw()).to_string(),
        cell(item.centre_net_weight.raw()).to_string(),
        item.declared_purity.clone(),
        item.remarks.clone(),
    ]
}

fn centred(text: &str) -> String {
    let len = text.chars().count();
    let pad = RULE_WIDTH.saturating_sub(len) / 2;
    format!("{}{}", " ".repeat(pad), text)
}

/// Fixed-layout plain-text voucher.
pub fn render_text(receipt: &Receipt, settings: &Settings) -> String {
    let totals = Totals::from_items(&receipt.items);
    let rule = "=".repeat(RULE_WIDTH);
    let thin = "-".repeat(RULE_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "{}", rule);
    for line in [
        settings.company_name.as_str(),
        settings.address.as_str(),
        settings.phones.as_str(),
        settings.email_gst.as_str(),
        TITLE,
    ] {
        let _ = writeln!(out, "{}", centred(line));
    }
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(
        out,
        "Received from M/s.: {:<40} Receipt No.: {}",
        receipt.received_from, receipt.receipt_no
    );
    let _ = writeln!(
        out,
        "BIS Certificate No.: {:<39} Date: {}  Time: {}",
        receipt.bis_certificate_no, receipt.date, receipt.time
    );
    let _ = writeln!(out, "{}", thin);
    let _ = writeln!(out, "{}", PREAMBLE);
    let _ = writeln!(
        out,
        "{:>3} {:<16} {:>5} {:>9} {:>9} {:>9} {:>9} {:<8} {}",
        "Sl", "Description", "Qty", "Cust.Gr", "Cust.Net", "Ctr.Gr", "Ctr.Net", "Purity", "Remarks"
    );
    let _ = writeln!(out, "{}", thin);
    for (index, item) in receipt.items.iter().enumerate() {
        let c = row_cells(index, item);
        let _ = writeln!(
            out,
            "{:>3} {:<16} {:>5} {:>9} {:>9} {:>9} {:>9} {:<8} {}",
            c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7], c[8]
        );
    }
    let _ = writeln!(out, "{}", thin);
    let [cust_gross, cust_net, centre_gross, centre_net] = totals.weight_columns();
    let _ = writeln!(
        out,
        "{:>3} {:<16} {:>5} {:>9} {:>9} {:>9} {:>9}",
        "", "TOTAL", totals.pieces, cust_gross, cust_net, centre_gross, centre_net
    );
    let _ = writeln!(out, "{}", thin);
    let _ = writeln!(
        out,
        "Your D. C. No.: {}    Date: {}",
        receipt.dc_no, receipt.dc_date
    );
    let _ = writeln!(out, "{}", ACCEPTANCE);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{}: Rs. {}",
        PAYABLE_CAPTION,
        format_payable(totals.pieces, settings.rate_per_piece, settings.minimum_payable)
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "{:<50}{}", "Customer's Signature", "Authorized Signatory");
    let _ = writeln!(out, "{:<50}{}", "", settings.company_name);
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(
        out,
        "{}",
        centred(&format!(
            "Note: Any dispute subject to {} jurisdiction only.",
            settings.jurisdiction
        ))
    );
    out
}

/// Self-contained HTML voucher for the browser's print dialog.
pub fn render_html(receipt: &Receipt, settings: &Settings) -> String {
    let totals = Totals::from_items(&receipt.items);
    let [cust_gross, cust_net, centre_gross, centre_net] = totals.weight_columns();
    let e = escape_html;
    let mut rows = String::new();
    for (index, item) in receipt.items.iter().enumerate() {
        rows.push_str("<tr>");
        for value in row_cells(index, item) {
            let _ = write!(rows, "<td>{}</td>", e(&value));
        }
        rows.push_str("</tr>\n");
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{receipt_no}</title>
<style>
body {{ font-family: sans-serif; font-size: 12px; }}
.voucher {{ max-width: 800px; margin: 0 auto; border: 2px solid #000; }}
header, .note {{ text-align: center; padding: 8px; }}
table {{ width: 100%; border-collapse: collapse; }}
td, th {{ border: 1px solid #000; padding: 3px; text-align: center; }}
.details, .footer {{ padding: 8px; }}
.payable {{ font-size: 28px; font-weight: bold; text-align: center; padding: 12px; }}
.signatures {{ display: flex; justify-content: space-around; padding: 40px 8px 8px; }}
</style>
</head>
<body>
<div class="voucher">
<header>
<h1>{company}</h1>
<p>{address}</p>
<p>{phones}</p>
<p>{email_gst}</p>
<h2>{title}</h2>
</header>
<div class="details">
<p><b>Received from M/s.:</b> {received_from}</p>
<p><b>BIS Certificate No.:</b> {bis}</p>
<p><b>Receipt No.:</b> {receipt_no} &nbsp; <b>Date:</b> {date} &nbsp; <b>Time:</b> {time}</p>
<p><i>{preamble}</i></p>
</div>
<table>
<thead>
<tr><th rowspan="2">Sl. No.</th><th rowspan="2">Descriptions</th><th rowspan="2">Qty (Total Pcs.)</th>
<th colspan="2">Weight of Customer</th><th colspan="2">Weight of Centre</th>
<th rowspan="2">Declared Purity</th><th rowspan="2">Remarks</th></tr>
<tr><th>Gross Wt.</th><th>Net Wt.</th><th>Gross Wt.</th><th>Net Wt.</th></tr>
</thead>
<tbody>
{rows}<tr><th colspan="2">TOTAL</th><th>{pieces}</th><th>{cust_gross}</th><th>{cust_net}</th><th>{centre_gross}</th><th>{centre_net}</th><th colspan="2"></th></tr>
</tbody>
</table>
<div class="footer">
<p><b>Your D. C. No.:</b> {dc_no} &nbsp; <b>Date:</b> {dc_date}</p>
<p><i>{acceptance}</i></p>
</div>
<div class="payable"><div>{payable_caption}</div>&#8377;{payable}</div>
<div class="signatures"><span>Customer's Signature</span><span>Authorized Signatory<br>{company}</span></div>
<div class="note">Note: Any dispute subject to {jurisdiction} jurisdiction only.</div>
</div>
</body>
</html>
"#,
        receipt_no = e(&receipt.receipt_no),
        company = e(&settings.company_name),
        address = e(&settings.address),
        phones = e(&settings.phones),
        email_gst = e(&settings.email_gst),
        title = TITLE,
        received_from = e(&receipt.received_from),
        bis = e(&receipt.bis_certificate_no),
        date = e(&receipt.date),
        time = e(&receipt.time),
        preamble = PREAMBLE,
        rows = rows,
        pieces = totals.pieces,
        cust_gross = cust_gross,
        cust_net = cust_net,
        centre_gross = centre_gross,
        centre_net = centre_net,
        dc_no = e(&receipt.dc_no),
        dc_date = e(&receipt.dc_date),
        acceptance = e(ACCEPTANCE),
        payable_caption = PAYABLE_CAPTION,
        payable = format_payable(totals.pieces, settings.rate_per_piece, settings.minimum_payable),
        jurisdiction = e(&settings.jurisdiction),
    )
}

/// Writes `<receipt_no>.html` into `dir` and returns its path.
pub fn export_html(receipt: &Receipt, settings: &Settings, dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.html", sanitize_filename(&receipt.receipt_no)));
    fs::write(&path, render_html(receipt, settings))?;
    info!(path = %path.display(), "Voucher exported");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NumericText;

    fn receipt() -> Receipt {
        let mut ring = LineItem::blank("r1".to_string());
        ring.description = "RING".to_string();
        ring.qty = NumericText::new("3");
        ring.customer_net_weight = NumericText::new("4.5");
        ring.declared_purity = "22K916".to_string();
        let mut chain = LineItem::blank("r2".to_string());
        chain.description = "CHAIN".to_string();
        chain.qty = NumericText::new("2");
        chain.customer_net_weight = NumericText::new("abc");
        Receipt {
            id: "x".to_string(),
            receipt_no: "RC9".to_string(),
            received_from: "Gold <& Co>".to_string(),
            bis_certificate_no: "BIS-77".to_string(),
            date: "16/10/2026".to_string(),
            time: "12:00:00".to_string(),
            items: vec![ring, chain],
            dc_no: "BY HAND".to_string(),
            dc_date: "16/10/2026".to_string(),
            created_at: 0,
        }
    }

    #[test]
    fn zero_entries_print_blank() {
        for zero in ["0", "0.0", "0.000", "00", " 0,00 "] {
            assert_eq!(cell(zero), "", "{zero:?}");
        }
        assert_eq!(cell("0.010"), "0.010");
        assert_eq!(cell("abc"), "abc");
        assert_eq!(cell(" 7 "), "7");
    }

    #[test]
    fn text_voucher_carries_totals_and_payable() {
        let text = render_text(&receipt(), &Settings::default());
        assert!(text.contains("RC9"));
        assert!(text.contains("TOTAL"));
        assert!(text.contains("4.500"));
        assert!(text.contains("Rs. 500.00"));
        assert!(text.contains("abc"));
        assert!(text.contains("SERAMPORE, HOOGHLY, (WEST BENGAL)"));
    }

    #[test]
    fn html_voucher_escapes_operator_text() {
        let html = render_html(&receipt(), &Settings::default());
        assert!(html.contains("Gold &lt;&amp; Co&gt;"));
        assert!(!html.contains("Gold <& Co>"));
        assert!(html.contains("<td>22K916</td>"));
        assert!(html.contains("&#8377;500.00"));
    }

    #[test]
    fn export_writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_html(&receipt(), &Settings::default(), dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "RC9.html");
        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn export_reports_write_failures() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("vouchers");
        std::fs::write(&blocker, "not a directory").unwrap();

        let result: io::Result<PathBuf> = export_html(&receipt(), &Settings::default(), &blocker);
        assert!(result.is_err());
        assert_eq!(std::fs::read_to_string(&blocker).unwrap(), "not a directory");
    }
}
