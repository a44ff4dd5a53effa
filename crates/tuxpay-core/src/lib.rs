//! TuxPay client core.
//!
//! Shared by the admin command line and the embeddable payment widget:
//!
//! - [`auth`]: the bearer token session and where it is persisted
//! - [`api`]: the request pipeline and the server's endpoints
//! - [`utils`]: locale-aware currency, date and time formatting
//! - [`widget`]: option resolution and loading for the payment widget
//!
//! A typical admin setup:
//!
//! ```no_run
//! # async fn run() -> anyhow::Result<()> {
//! use tuxpay_core::{ApiClient, Config};
//!
//! let config = Config::load()?;
//! let api_url = config.api_url();
//! let session = config.build_session(&api_url)?.shared();
//! let client = ApiClient::new(api_url, session)?;
//! if client.is_authenticated().await {
//!     let dashboard = client.dashboard().await?;
//!     println!("{} open invoices", dashboard.open.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod notify;
pub mod utils;
pub mod widget;

pub use api::{ApiClient, ApiError};
pub use auth::{Session, SharedSession};
pub use config::Config;
pub use notify::{ChannelNotifier, LogNotifier, Notification, Notifier, RecordingNotifier};
pub use utils::Formatter;
pub use widget::{PaymentWidget, WidgetConfig, WidgetError, WidgetOptions, WidgetView};
