use serde::{Deserialize, Serialize};

use super::{Coin, Payment};
use crate::utils::format::left_pad;

/// Minimum digit count of the invoice id in generated invoice names
const INVOICE_NAME_DIGITS: usize = 5;

/// Payment state shared by invoices and payments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Expired,
    Paid,
    Confirmed,
    #[default]
    #[serde(other)]
    Unknown,
}

impl InvoiceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "Pending",
            InvoiceStatus::Expired => "Expired",
            InvoiceStatus::Paid => "Paid",
            InvoiceStatus::Confirmed => "Confirmed",
            InvoiceStatus::Unknown => "Unknown",
        }
    }

    /// Whether the invoice can still receive a payment
    pub fn is_open(&self) -> bool {
        matches!(self, InvoiceStatus::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Invoice {
    pub id: i64,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub amount_cents: Option<i64>,
    #[serde(default)]
    pub creation_date: Option<f64>,
    #[serde(default)]
    pub expiry_date: Option<f64>,
    #[serde(default)]
    pub payment_date: Option<f64>,
    #[serde(default)]
    pub status: InvoiceStatus,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub notes_html: Option<String>,
    #[serde(default)]
    pub contents: Option<String>,
    #[serde(default)]
    pub contents_html: Option<String>,
    /// Short token customers use to open and pay the invoice
    #[serde(default)]
    pub token: Option<String>,
}

impl Invoice {
    /// The invoice's name, or `#INV-00053` style when the server left it blank.
    pub fn display_name(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => format!("#INV-{}", left_pad(self.id, INVOICE_NAME_DIGITS)),
        }
    }

    pub fn amount_dollars(&self) -> Option<f64> {
        self.amount_cents.map(|cents| cents as f64 / 100.0)
    }
}

/// Body of `POST /admin/invoice`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct InvoiceCreation {
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_cents: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes_html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contents: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contents_html: Option<String>,
}

impl Default for InvoiceCreation {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            amount_cents: None,
            expiry_date: None,
            name: None,
            customer_name: None,
            customer_email: None,
            notes: None,
            notes_html: None,
            contents: None,
            contents_html: None,
        }
    }
}

impl InvoiceCreation {
    pub fn new(amount_cents: i64) -> Self {
        Self {
            amount_cents: Some(amount_cents),
            ..Self::default()
        }
    }
}

/// Response of `GET /admin/invoice/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLookup {
    pub invoice: Invoice,
    #[serde(default)]
    pub payments: Vec<Payment>,
}

/// Response of the public `GET /invoice?token=` lookup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PublicInvoice {
    pub invoice: Invoice,
    #[serde(default)]
    pub coins: Vec<Coin>,
    #[serde(default)]
    pub payments: Vec<Payment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_admin_invoice() {
        let json = r#"{"id": 53, "uuid": "c0e7635e-c547-4068-ad04-2b96263ce201", "currency": "USD",
            "amount_cents": 999, "creation_date": 1649999999.5, "expiry_date": 1699999999.5,
            "payment_date": null, "status": "pending", "name": null,
            "customer_name": "Test User", "token": "eyJpZCI6NTN9.sig"}"#;
        let invoice: Invoice = serde_json::from_str(json).unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Pending);
        assert!(invoice.status.is_open());
        assert_eq!(invoice.display_name(), "#INV-00053");
        assert_eq!(invoice.amount_dollars(), Some(9.99));
        assert_eq!(invoice.payment_date, None);
    }

    #[test]
    fn test_unknown_status_does_not_fail_parsing() {
        let invoice: Invoice = serde_json::from_str(r#"{"id": 1, "status": "refunded"}"#).unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Unknown);
        let invoice: Invoice = serde_json::from_str(r#"{"id": 2}"#).unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Unknown);
    }

    #[test]
    fn test_display_name_prefers_given_name() {
        let mut invoice: Invoice = serde_json::from_str(r#"{"id": 123456, "name": "  "}"#).unwrap();
        assert_eq!(invoice.display_name(), "#INV-123456");
        invoice.name = Some("Consulting, March".to_string());
        assert_eq!(invoice.display_name(), "Consulting, March");
    }

    #[test]
    fn test_invoice_creation_omits_unset_fields() {
        let body = serde_json::to_value(InvoiceCreation::new(2500)).unwrap();
        assert_eq!(body, serde_json::json!({"currency": "USD", "amount_cents": 2500}));
    }
}
