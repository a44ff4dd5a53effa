use serde::{Deserialize, Serialize};

use super::InvoiceStatus;

/// Invoice row as listed on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct DashboardInvoice {
    pub id: i64,
    #[serde(default)]
    pub creation_date: Option<f64>,
    #[serde(default)]
    pub expiry_date: Option<f64>,
    #[serde(default)]
    pub payment_date: Option<f64>,
    #[serde(default)]
    pub amount_cents: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub status: InvoiceStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Summary {
    pub count: i64,
    pub dollars: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ExpiredSummary {
    pub count: i64,
    pub dollars: f64,
    #[serde(default)]
    pub invoices: Vec<DashboardInvoice>,
}

/// Last 30 days of invoice activity, from `GET /admin/dashboard`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Dashboard {
    pub created: Summary,
    pub paid: Summary,
    pub expired: ExpiredSummary,
    #[serde(default)]
    pub open: Vec<DashboardInvoice>,
}

impl Dashboard {
    /// Value of invoices still awaiting payment, in dollars
    pub fn open_dollars(&self) -> f64 {
        let cents: i64 = self.open.iter().filter_map(|i| i.amount_cents).sum();
        cents as f64 / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dashboard() {
        let json = r#"{
            "created": {"count": 3, "dollars": 42.5},
            "paid": {"count": 1, "dollars": 10.0},
            "expired": {"count": 1, "dollars": 7.5, "invoices": [
                {"id": 2, "creation_date": 1700000000.0, "expiry_date": 1700000900.0,
                 "payment_date": null, "amount_cents": 750, "currency": "USD", "status": "expired"}
            ]},
            "open": [
                {"id": 3, "amount_cents": 2500, "currency": "USD", "status": "pending"},
                {"id": 4, "amount_cents": 1, "currency": "CAD", "status": "pending"}
            ]
        }"#;
        let dashboard: Dashboard = serde_json::from_str(json).unwrap();
        assert_eq!(dashboard.created.count, 3);
        assert_eq!(dashboard.expired.invoices[0].status, InvoiceStatus::Expired);
        assert_eq!(dashboard.open.len(), 2);
        assert!((dashboard.open_dollars() - 25.01).abs() < 1e-9);
    }
}
