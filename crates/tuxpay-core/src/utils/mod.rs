//! Formatting helpers shared by the dashboard and the payment widget.

pub mod format;
pub mod locale;

// Re-export commonly used functions at module level
pub use format::{
    currency, date_string, left_pad, time_string, truncate_string, widget_currency, Amount,
    DateOptions, Formatter, Moment,
};
pub use locale::{supported_locales, DEFAULT_LOCALE};
