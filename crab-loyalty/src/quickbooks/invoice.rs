//! Invoice → order mapping
//!
//! Pure parsing of a QuickBooks invoice into the fields the order upsert needs.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use shared::models::OrderStatus;

use super::types::{QbInvoice, QbLine};
use crate::money::{is_zero, to_decimal, to_f64};

const SALES_ITEM_LINE: &str = "SalesItemLineDetail";
const DISCOUNT_LINE: &str = "DiscountLineDetail";

/// `CODE: SUMMER10` anywhere in a memo, first match wins
static DISCOUNT_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)CODE:\s*(\w+)").expect("valid discount code pattern"));

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLineItem {
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedInvoice {
    pub invoice_id: String,
    pub doc_number: Option<String>,
    /// QuickBooks customer id
    pub customer_ref: String,
    pub customer_name: Option<String>,
    /// Sum of sales lines (before discount)
    pub total_amount: f64,
    /// Invoice total after discount
    pub final_amount: f64,
    pub discount_percent: Option<f64>,
    /// Upper-cased code found in the memo
    pub discount_code: Option<String>,
    pub status: OrderStatus,
    pub items: Vec<ParsedLineItem>,
}

/// Zero balance means paid
pub fn status_from_balance(balance: f64) -> OrderStatus {
    if is_zero(balance) {
        OrderStatus::Completed
    } else {
        OrderStatus::Pending
    }
}

/// Find a discount code in free text
pub fn find_discount_code(text: &str) -> Option<String> {
    DISCOUNT_CODE_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_uppercase())
}

/// Customer memo first, then private note
pub fn extract_discount_code(invoice: &QbInvoice) -> Option<String> {
    let memo = invoice
        .customer_memo
        .as_ref()
        .and_then(|m| m.value.as_deref());
    [memo, invoice.private_note.as_deref()]
        .into_iter()
        .flatten()
        .find_map(find_discount_code)
}

fn parse_item(line: &QbLine) -> ParsedLineItem {
    let detail = line.sales_item_line_detail.as_ref();
    let quantity = detail
        .and_then(|d| d.qty)
        .filter(|q| *q > 0.0)
        .unwrap_or(1.0);
    let unit_price = detail
        .and_then(|d| d.unit_price)
        .unwrap_or_else(|| to_f64(to_decimal(line.amount) / to_decimal(quantity)));
    let description = line
        .description
        .clone()
        .or_else(|| detail.and_then(|d| d.item_ref.as_ref()).and_then(|r| r.name.clone()))
        .unwrap_or_default();
    ParsedLineItem {
        description,
        quantity,
        unit_price,
        amount: line.amount,
    }
}

/// Percent of the discount line, derived from its amount when not percent-based
fn discount_percent(lines: &[QbLine], subtotal: Decimal) -> Option<f64> {
    let line = lines.iter().find(|l| l.detail_type == DISCOUNT_LINE)?;
    let detail = line.discount_line_detail.as_ref();
    if detail.and_then(|d| d.percent_based) == Some(true) {
        return detail.and_then(|d| d.discount_percent);
    }
    if subtotal.is_zero() || is_zero(line.amount) {
        return None;
    }
    Some(to_f64(
        to_decimal(line.amount) / subtotal * Decimal::ONE_HUNDRED,
    ))
}

pub fn parse_invoice(invoice: &QbInvoice) -> ParsedInvoice {
    let items: Vec<ParsedLineItem> = invoice
        .line
        .iter()
        .filter(|l| l.detail_type == SALES_ITEM_LINE)
        .map(parse_item)
        .collect();

    let subtotal: Decimal = items.iter().map(|i| to_decimal(i.amount)).sum();
    let total_amount = if items.is_empty() {
        invoice.total_amt
    } else {
        to_f64(subtotal)
    };

    ParsedInvoice {
        invoice_id: invoice.id.clone(),
        doc_number: invoice.doc_number.clone(),
        customer_ref: invoice.customer_ref.value.clone(),
        customer_name: invoice.customer_ref.name.clone(),
        total_amount,
        final_amount: invoice.total_amt,
        discount_percent: discount_percent(&invoice.line, subtotal),
        discount_code: extract_discount_code(invoice),
        status: status_from_balance(invoice.balance),
        items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn invoice(value: serde_json::Value) -> QbInvoice {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn code_regex_is_case_insensitive_first_match() {
        assert_eq!(
            find_discount_code("thanks! code: vip20 and CODE: OTHER").as_deref(),
            Some("VIP20")
        );
        assert_eq!(find_discount_code("Code:SUMMER").as_deref(), Some("SUMMER"));
        assert_eq!(find_discount_code("no code here"), None);
        assert_eq!(find_discount_code("CODE:   "), None);
    }

    #[test]
    fn memo_wins_over_private_note() {
        let inv = invoice(json!({
            "Id": "1",
            "CustomerRef": { "value": "5" },
            "CustomerMemo": { "value": "CODE: MEMO10" },
            "PrivateNote": "CODE: NOTE10"
        }));
        assert_eq!(extract_discount_code(&inv).as_deref(), Some("MEMO10"));

        let inv = invoice(json!({
            "Id": "1",
            "CustomerRef": { "value": "5" },
            "CustomerMemo": { "value": "Thank you" },
            "PrivateNote": "code: note10"
        }));
        assert_eq!(extract_discount_code(&inv).as_deref(), Some("NOTE10"));
    }

    #[test]
    fn status_follows_balance() {
        assert_eq!(status_from_balance(0.0), OrderStatus::Completed);
        assert_eq!(status_from_balance(0.001), OrderStatus::Completed);
        assert_eq!(status_from_balance(12.5), OrderStatus::Pending);
    }

    #[test]
    fn parses_sales_and_percent_discount_lines() {
        let inv = invoice(json!({
            "Id": "130",
            "DocNumber": "1037",
            "CustomerRef": { "value": "58", "name": "Jane Doe" },
            "TotalAmt": 180.0,
            "Balance": 0,
            "Line": [
                {
                    "Amount": 150.0,
                    "Description": "Oak panel",
                    "DetailType": "SalesItemLineDetail",
                    "SalesItemLineDetail": { "Qty": 3, "UnitPrice": 50.0 }
                },
                {
                    "Amount": 50.0,
                    "DetailType": "SalesItemLineDetail",
                    "SalesItemLineDetail": { "ItemRef": { "value": "2", "name": "Hinge" } }
                },
                { "Amount": 200.0, "DetailType": "SubTotalLineDetail" },
                {
                    "Amount": 20.0,
                    "DetailType": "DiscountLineDetail",
                    "DiscountLineDetail": { "PercentBased": true, "DiscountPercent": 10 }
                }
            ]
        }));

        let parsed = parse_invoice(&inv);
        assert_eq!(parsed.invoice_id, "130");
        assert_eq!(parsed.doc_number.as_deref(), Some("1037"));
        assert_eq!(parsed.customer_ref, "58");
        assert_eq!(parsed.customer_name.as_deref(), Some("Jane Doe"));
        assert_eq!(parsed.total_amount, 200.0);
        assert_eq!(parsed.final_amount, 180.0);
        assert_eq!(parsed.discount_percent, Some(10.0));
        assert_eq!(parsed.status, OrderStatus::Completed);
        assert_eq!(parsed.items.len(), 2);
        assert_eq!(parsed.items[0].quantity, 3.0);
        assert_eq!(parsed.items[1].description, "Hinge");
        assert_eq!(parsed.items[1].quantity, 1.0);
        assert_eq!(parsed.items[1].unit_price, 50.0);
    }

    #[test]
    fn fixed_discount_line_derives_percent() {
        let inv = invoice(json!({
            "Id": "2",
            "CustomerRef": { "value": "5" },
            "TotalAmt": 75.0,
            "Balance": 75.0,
            "Line": [
                { "Amount": 100.0, "DetailType": "SalesItemLineDetail", "SalesItemLineDetail": {} },
                {
                    "Amount": 25.0,
                    "DetailType": "DiscountLineDetail",
                    "DiscountLineDetail": { "PercentBased": false }
                }
            ]
        }));
        let parsed = parse_invoice(&inv);
        assert_eq!(parsed.discount_percent, Some(25.0));
        assert_eq!(parsed.status, OrderStatus::Pending);
    }

    #[test]
    fn invoice_without_lines_uses_total() {
        let inv = invoice(json!({
            "Id": "3",
            "CustomerRef": { "value": "5" },
            "TotalAmt": 42.0,
            "Balance": 42.0
        }));
        let parsed = parse_invoice(&inv);
        assert_eq!(parsed.total_amount, 42.0);
        assert!(parsed.items.is_empty());
        assert_eq!(parsed.discount_percent, None);
    }
}
