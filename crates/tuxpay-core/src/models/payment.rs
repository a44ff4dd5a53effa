use serde::{Deserialize, Serialize};

use super::{Invoice, InvoiceCreation, InvoiceStatus};

/// A coin payment address attached to an invoice.
///
/// Customer-facing endpoints return a subset of these fields; the admin
/// endpoints add the derivation details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Payment {
    pub id: i64,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub invoice_id: Option<i64>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub status: InvoiceStatus,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub creation_date: Option<f64>,
    #[serde(default)]
    pub creation_height: Option<i64>,
    #[serde(default)]
    pub expiry_date: Option<f64>,
    #[serde(default)]
    pub payment_date: Option<f64>,
    #[serde(default)]
    pub last_update: Option<f64>,
    #[serde(default)]
    pub amount_sats: Option<i64>,
    #[serde(default)]
    pub amount_coin: Option<f64>,
    #[serde(default)]
    pub paid_amount_sats: Option<i64>,
    #[serde(default)]
    pub paid_amount_coin: Option<f64>,
    /// BIP-21 QR code as a base64 PNG data URL, only for active addresses
    #[serde(default)]
    pub qr_code: Option<String>,
    #[serde(default)]
    pub invoice: Option<Invoice>,
    #[serde(default)]
    pub scripthash: Option<String>,
    #[serde(default)]
    pub derivation_path: Option<String>,
    #[serde(default)]
    pub derivation_account: Option<i64>,
    #[serde(default)]
    pub derivation_index: Option<i64>,
}

impl Payment {
    /// Satoshis still owed on this address
    pub fn remaining_sats(&self) -> Option<i64> {
        let amount = self.amount_sats?;
        Some((amount - self.paid_amount_sats.unwrap_or(0)).max(0))
    }
}

/// Body of `POST /admin/payment`: an invoice and its payment in one call.
///
/// Exactly one of `amount_cents` (on the invoice) or `amount_sats` should be
/// set; the server converts between them at the current exchange rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct PaymentCreation {
    #[serde(flatten)]
    pub invoice: InvoiceCreation,
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_sats: Option<i64>,
}

/// Response of `POST /admin/payment`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaymentCreated {
    pub invoice: Invoice,
    pub payment: Payment,
}
