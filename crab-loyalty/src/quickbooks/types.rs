//! QuickBooks Online wire types (accounting API v3, PascalCase JSON)

use serde::Deserialize;

/// Reference to another entity (`CustomerRef`, `ItemRef`)
#[derive(Debug, Clone, Deserialize)]
pub struct QbRef {
    pub value: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QbPhone {
    pub free_form_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QbEmail {
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QbMetaData {
    pub create_time: Option<String>,
    pub last_updated_time: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QbCustomer {
    pub id: String,
    pub display_name: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub company_name: Option<String>,
    pub primary_phone: Option<QbPhone>,
    pub primary_email_addr: Option<QbEmail>,
}

impl QbCustomer {
    /// Best available display name
    pub fn name(&self) -> String {
        if let Some(name) = self.display_name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.trim().to_string();
        }
        let full = [self.given_name.as_deref(), self.family_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        if !full.trim().is_empty() {
            return full.trim().to_string();
        }
        self.company_name
            .clone()
            .unwrap_or_else(|| format!("QuickBooks customer {}", self.id))
    }

    pub fn phone(&self) -> Option<String> {
        self.primary_phone
            .as_ref()
            .and_then(|p| p.free_form_number.as_deref())
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from)
    }

    pub fn email(&self) -> Option<String> {
        self.primary_email_addr
            .as_ref()
            .and_then(|e| e.address.as_deref())
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QbSalesItemLineDetail {
    pub qty: Option<f64>,
    pub unit_price: Option<f64>,
    pub item_ref: Option<QbRef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QbDiscountLineDetail {
    pub percent_based: Option<bool>,
    pub discount_percent: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QbLine {
    #[serde(default)]
    pub amount: f64,
    pub description: Option<String>,
    #[serde(default)]
    pub detail_type: String,
    pub sales_item_line_detail: Option<QbSalesItemLineDetail>,
    pub discount_line_detail: Option<QbDiscountLineDetail>,
}

/// `CustomerMemo` is `{ "value": "..." }`
#[derive(Debug, Clone, Deserialize)]
pub struct QbMemo {
    pub value: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QbInvoice {
    pub id: String,
    pub doc_number: Option<String>,
    pub customer_ref: QbRef,
    #[serde(default)]
    pub total_amt: f64,
    #[serde(default)]
    pub balance: f64,
    #[serde(default)]
    pub line: Vec<QbLine>,
    pub customer_memo: Option<QbMemo>,
    pub private_note: Option<String>,
    #[serde(default)]
    pub meta_data: QbMetaData,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QbLinkedTxn {
    pub txn_id: String,
    pub txn_type: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QbPaymentLine {
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub linked_txn: Vec<QbLinkedTxn>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QbPayment {
    pub id: String,
    pub customer_ref: QbRef,
    #[serde(default)]
    pub total_amt: f64,
    #[serde(default)]
    pub line: Vec<QbPaymentLine>,
}

impl QbPayment {
    /// Invoice ids this payment is linked to
    pub fn linked_invoice_ids(&self) -> Vec<&str> {
        self.line
            .iter()
            .flat_map(|l| l.linked_txn.iter())
            .filter(|t| t.txn_type == "Invoice")
            .map(|t| t.txn_id.as_str())
            .collect()
    }
}

/// OAuth token endpoint response
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Seconds
    pub expires_in: i64,
    /// Seconds
    pub x_refresh_token_expires_in: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customer_contact_fields() {
        let customer: QbCustomer = serde_json::from_value(serde_json::json!({
            "Id": "58",
            "DisplayName": "  Jane Doe ",
            "PrimaryPhone": { "FreeFormNumber": "(555) 010-2000" },
            "PrimaryEmailAddr": { "Address": "Jane@Example.com" }
        }))
        .unwrap();
        assert_eq!(customer.name(), "Jane Doe");
        assert_eq!(customer.phone().as_deref(), Some("(555) 010-2000"));
        assert_eq!(customer.email().as_deref(), Some("jane@example.com"));
    }

    #[test]
    fn customer_name_falls_back() {
        let customer: QbCustomer = serde_json::from_value(serde_json::json!({
            "Id": "7",
            "GivenName": "Ana",
            "FamilyName": "Lopez"
        }))
        .unwrap();
        assert_eq!(customer.name(), "Ana Lopez");

        let bare: QbCustomer = serde_json::from_value(serde_json::json!({ "Id": "8" })).unwrap();
        assert_eq!(bare.name(), "QuickBooks customer 8");
        assert!(bare.phone().is_none());
    }

    #[test]
    fn payment_linked_invoices() {
        let payment: QbPayment = serde_json::from_value(serde_json::json!({
            "Id": "301",
            "CustomerRef": { "value": "58" },
            "TotalAmt": 120.0,
            "Line": [
                { "Amount": 100.0, "LinkedTxn": [{ "TxnId": "130", "TxnType": "Invoice" }] },
                { "Amount": 20.0, "LinkedTxn": [{ "TxnId": "9", "TxnType": "CreditMemo" }] }
            ]
        }))
        .unwrap();
        assert_eq!(payment.linked_invoice_ids(), vec!["130"]);
    }
}
