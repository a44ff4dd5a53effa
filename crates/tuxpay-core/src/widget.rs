//! Embeddable payment widget.
//!
//! A host page renders the widget with a small JSON options object. Any
//! option it leaves out is taken from the page URL's query string, so a
//! bare `https://shop.example/pay?token=...` link works without host code.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::api::{ApiClient, ApiError};
use crate::models::{Payment, PublicInvoice};
use crate::utils::format::widget_currency;

/// Id of the host element the widget mounts into
pub const MOUNT_SELECTOR: &str = "#tuxpay";

/// Options a host page passes when rendering the widget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(default)]
pub struct WidgetOptions {
    pub payment_uuid: Option<String>,
    pub invoice_token: Option<String>,
    /// Payment data the host already has; skips the fetch
    #[cfg_attr(feature = "ts", ts(type = "unknown"))]
    pub payment_details: Option<Value>,
    pub is_modal: Option<bool>,
    pub redirect: Option<String>,
}

/// Options after URL fallbacks have been applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct WidgetConfig {
    pub payment_uuid: Option<String>,
    pub invoice_token: Option<String>,
    #[cfg_attr(feature = "ts", ts(type = "unknown"))]
    pub payment_details: Option<Value>,
    pub is_modal: bool,
    pub redirect: Option<String>,
}

/// Empty strings count as not given.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn query_param(page_url: &Url, name: &str) -> Option<String> {
    page_url
        .query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

impl WidgetConfig {
    /// Fill omitted options from the page URL's `uuid`, `token` and
    /// `redirect` query parameters.
    pub fn resolve(options: WidgetOptions, page_url: &Url) -> Self {
        Self {
            payment_uuid: non_empty(options.payment_uuid).or_else(|| query_param(page_url, "uuid")),
            invoice_token: non_empty(options.invoice_token)
                .or_else(|| query_param(page_url, "token")),
            payment_details: options.payment_details.filter(|v| !v.is_null()),
            is_modal: options.is_modal.unwrap_or(false),
            redirect: non_empty(options.redirect).or_else(|| query_param(page_url, "redirect")),
        }
    }
}

/// What the widget has to show once loaded.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetView {
    /// Payment data supplied by the host
    Details(Value),
    Payment(Payment),
    /// An invoice with its enabled coins, waiting for the customer to pick one
    Invoice(PublicInvoice),
}

impl WidgetView {
    /// Amount due, formatted for the widget
    pub fn amount_due(&self) -> Option<String> {
        let dollars = match self {
            WidgetView::Details(details) => details
                .get("invoice")
                .and_then(|i| i.get("amount_cents"))
                .and_then(Value::as_f64)
                .map(|cents| cents / 100.0),
            WidgetView::Payment(payment) => payment.invoice.as_ref().and_then(|i| i.amount_dollars()),
            WidgetView::Invoice(public) => public.invoice.amount_dollars(),
        };
        widget_currency(dollars, None)
    }
}

#[derive(Error, Debug)]
pub enum WidgetError {
    #[error("No payment or invoice to show - pass payment_uuid or invoice_token, or add ?uuid= or ?token= to the page URL")]
    MissingTarget,

    #[error(transparent)]
    Api(#[from] ApiError),
}

pub struct PaymentWidget {
    config: WidgetConfig,
    client: ApiClient,
}

impl PaymentWidget {
    pub fn new(config: WidgetConfig, client: ApiClient) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn mount_selector(&self) -> &'static str {
        MOUNT_SELECTOR
    }

    /// Load what the widget should display: host-supplied details first,
    /// then the payment by uuid, then the invoice by token.
    pub async fn load(&self) -> Result<WidgetView, WidgetError> {
        if let Some(details) = &self.config.payment_details {
            return Ok(WidgetView::Details(details.clone()));
        }
        if let Some(uuid) = &self.config.payment_uuid {
            debug!(uuid = %uuid, "Loading widget payment");
            return Ok(WidgetView::Payment(self.client.payment_by_uuid(uuid).await?));
        }
        if let Some(token) = &self.config.invoice_token {
            debug!("Loading widget invoice");
            return Ok(WidgetView::Invoice(self.client.invoice_by_token(token).await?));
        }
        Err(WidgetError::MissingTarget)
    }

    /// Open a payment for the widget's invoice in the chosen coin.
    pub async fn pay(&self, coin: &str) -> Result<Payment, WidgetError> {
        let token = self
            .config
            .invoice_token
            .as_deref()
            .ok_or(WidgetError::MissingTarget)?;
        Ok(self.client.pay_invoice(token, coin).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(url: &str) -> Url {
        Url::parse(url).unwrap()
    }

    #[test]
    fn test_options_fall_back_to_query() {
        let config = WidgetConfig::resolve(
            WidgetOptions::default(),
            &page("https://shop.example/pay?uuid=abc&token=t0k&redirect=https%3A%2F%2Fshop.example%2Fdone"),
        );
        assert_eq!(config.payment_uuid.as_deref(), Some("abc"));
        assert_eq!(config.invoice_token.as_deref(), Some("t0k"));
        assert_eq!(config.redirect.as_deref(), Some("https://shop.example/done"));
        assert!(!config.is_modal);
    }

    #[test]
    fn test_explicit_options_win() {
        let options = WidgetOptions {
            payment_uuid: Some("from-host".to_string()),
            is_modal: Some(true),
            ..Default::default()
        };
        let config = WidgetConfig::resolve(options, &page("https://shop.example/pay?uuid=from-url"));
        assert_eq!(config.payment_uuid.as_deref(), Some("from-host"));
        assert!(config.is_modal);
        assert_eq!(config.invoice_token, None);
    }

    #[test]
    fn test_empty_strings_count_as_omitted() {
        let options = WidgetOptions {
            invoice_token: Some(String::new()),
            ..Default::default()
        };
        let config = WidgetConfig::resolve(options, &page("https://shop.example/pay?token=t0k"));
        assert_eq!(config.invoice_token.as_deref(), Some("t0k"));
    }

    #[test]
    fn test_options_from_host_json() {
        let options: WidgetOptions =
            serde_json::from_value(json!({"invoice_token": "t0k", "payment_details": null})).unwrap();
        let config = WidgetConfig::resolve(options, &page("https://shop.example/"));
        assert_eq!(config.invoice_token.as_deref(), Some("t0k"));
        assert_eq!(config.payment_details, None);
    }

    #[test]
    fn test_amount_due_from_details() {
        let view = WidgetView::Details(json!({"invoice": {"amount_cents": 250010}}));
        assert_eq!(view.amount_due().as_deref(), Some("$2,500.10"));
        assert_eq!(WidgetView::Details(json!({})).amount_due(), None);
    }
}
