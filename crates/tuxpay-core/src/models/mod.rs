//! Data models for the TuxPay server API.
//!
//! These mirror the JSON the server returns. Timestamps are fractional
//! seconds since the epoch; most fields are optional because the server
//! omits them depending on the endpoint and the record's state.

pub mod coin;
pub mod dashboard;
pub mod invoice;
pub mod payment;

pub use coin::{Coin, CoinsResponse};
pub use dashboard::{Dashboard, DashboardInvoice, ExpiredSummary, Summary};
pub use invoice::{Invoice, InvoiceCreation, InvoiceLookup, InvoiceStatus, PublicInvoice};
pub use payment::{Payment, PaymentCreated, PaymentCreation};
