//! Display formatting for amounts, dates and times.
//!
//! Every helper accepts missing input and returns the caller's default for
//! it, so views can pass optional fields straight through.

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};

use super::locale::{rules, DateOrder, LocaleRules, SymbolPosition, DEFAULT_LOCALE, NBSP};

/// Epoch values below this are seconds, at or above it milliseconds.
/// 10,000,000,000 ms is late April 1970, so no real millisecond timestamp
/// falls under it.
pub const EPOCH_SECONDS_CUTOFF: f64 = 10_000_000_000.0;

/// A monetary amount as it arrives from the API or a form field.
#[derive(Debug, Clone, PartialEq)]
pub enum Amount {
    Number(f64),
    Text(String),
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Amount::Number(value)
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Amount::Number(value as f64)
    }
}

impl From<i32> for Amount {
    fn from(value: i32) -> Self {
        Amount::Number(value.into())
    }
}

impl From<&str> for Amount {
    fn from(value: &str) -> Self {
        Amount::Text(value.to_string())
    }
}

impl From<String> for Amount {
    fn from(value: String) -> Self {
        Amount::Text(value)
    }
}

/// A point in time: an epoch number (seconds or milliseconds) or a date string.
#[derive(Debug, Clone, PartialEq)]
pub enum Moment {
    Epoch(f64),
    Text(String),
}

impl From<f64> for Moment {
    fn from(value: f64) -> Self {
        Moment::Epoch(value)
    }
}

impl From<i64> for Moment {
    fn from(value: i64) -> Self {
        Moment::Epoch(value as f64)
    }
}

impl From<&str> for Moment {
    fn from(value: &str) -> Self {
        Moment::Text(value.to_string())
    }
}

impl From<String> for Moment {
    fn from(value: String) -> Self {
        Moment::Text(value)
    }
}

impl From<DateTime<Utc>> for Moment {
    fn from(value: DateTime<Utc>) -> Self {
        Moment::Epoch(value.timestamp_millis() as f64)
    }
}

/// Options for `date_string`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateOptions {
    pub locale: Option<String>,
    pub default: Option<String>,
    pub year: bool,
    /// Include the short weekday name
    pub dow: bool,
}

impl Default for DateOptions {
    fn default() -> Self {
        Self {
            locale: None,
            default: None,
            year: true,
            dow: true,
        }
    }
}

impl DateOptions {
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn without_year(mut self) -> Self {
        self.year = false;
        self
    }

    pub fn without_weekday(mut self) -> Self {
        self.dow = false;
        self
    }
}

/// Parse the leading number of a string the way a lenient form field would:
/// `"12.5"` and `" 3.10 CAD"` are numbers, `"abc"` is not.
pub fn parse_leading_number(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - digits_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        mantissa_digits += frac_end - frac_start;
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return None;
    }
    // Optional exponent, only taken when complete
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    s[..end].parse().ok()
}

/// Format `value` with two decimals and the locale's separators, wrapping
/// it with `symbol` on the side the locale puts currency symbols.
fn format_money(value: f64, symbol: &str, rules: &LocaleRules) -> String {
    let (whole, fraction) = round_cents(value.abs());
    let number = format!("{}{}{}", rules.group_digits(&whole), rules.decimal, fraction);
    let is_zero = whole == "0" && fraction == "00";
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };
    match rules.symbol_position {
        SymbolPosition::Before => format!("{}{}{}", sign, symbol, number),
        SymbolPosition::After => format!("{}{}{}{}", sign, number, NBSP, symbol),
    }
}

/// Whole and two-digit fraction of a non-negative amount, rounded half away
/// from zero on its exact decimal expansion. Scaling by 100 first would
/// push values such as 0.015 (stored just below) over the half cent.
fn round_cents(value: f64) -> (String, String) {
    let exact = format!("{:.20}", value);
    let (whole, fraction) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let mut digits: Vec<char> = whole.chars().chain(fraction.chars().chain("00".chars()).take(2)).collect();

    if fraction.chars().nth(2).is_some_and(|d| d >= '5') {
        let mut carry = true;
        for digit in digits.iter_mut().rev() {
            if *digit == '9' {
                *digit = '0';
            } else {
                *digit = char::from(*digit as u8 + 1);
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, '1');
        }
    }

    let split = digits.len() - 2;
    (digits[..split].iter().collect(), digits[split..].iter().collect())
}

fn resolve_amount(value: Amount) -> Result<f64, String> {
    match value {
        Amount::Number(n) => Ok(n),
        Amount::Text(text) => parse_leading_number(&text).ok_or(text),
    }
}

/// Format an amount for the admin views.
///
/// Amounts are Canadian dollars shown with a bare `$`. Numeric strings are
/// parsed; other strings are returned unchanged; missing or non-finite
/// values give `default`.
pub fn currency<A: Into<Amount>>(value: Option<A>, locale: Option<&str>, default: Option<&str>) -> Option<String> {
    let number = match value.map(Into::<Amount>::into).map(resolve_amount) {
        None => return default.map(str::to_string),
        Some(Err(text)) => return Some(text),
        Some(Ok(number)) => number,
    };
    if !number.is_finite() {
        return default.map(str::to_string);
    }
    Some(format_money(number, "$", rules(locale.unwrap_or(DEFAULT_LOCALE))))
}

/// Format an amount for the payment widget: US dollars, narrow `$`,
/// default locale.
pub fn widget_currency<A: Into<Amount>>(value: Option<A>, default: Option<&str>) -> Option<String> {
    currency(value, Some(DEFAULT_LOCALE), default)
}

/// Convert a moment to wall-clock time. Epochs are shown in the local time
/// zone; strings are shown as written.
fn to_wall_clock(value: &Moment) -> Option<NaiveDateTime> {
    match value {
        Moment::Epoch(epoch) => {
            if !epoch.is_finite() {
                return None;
            }
            let millis = if epoch.abs() < EPOCH_SECONDS_CUTOFF {
                epoch * 1000.0
            } else {
                *epoch
            };
            Local
                .timestamp_millis_opt(millis as i64)
                .single()
                .map(|dt| dt.naive_local())
        }
        Moment::Text(text) => parse_date_text(text.trim()),
    }
}

fn parse_date_text(text: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, pattern) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn render_date(dt: &NaiveDateTime, options: &DateOptions, rules: &LocaleRules) -> String {
    let month = rules.months[dt.month0() as usize];
    let day = format!("{}{}", dt.day(), rules.day_suffix);
    let mut out = String::new();
    if options.dow {
        out.push_str(rules.weekdays[dt.weekday().num_days_from_sunday() as usize]);
        out.push_str(rules.weekday_separator);
    }
    match rules.date_order {
        DateOrder::MonthDay => {
            out.push_str(&format!("{} {}", month, day));
            if options.year {
                out.push_str(&format!(", {}", dt.year()));
            }
        }
        DateOrder::DayMonth => {
            out.push_str(&format!("{} {}", day, month));
            if options.year {
                out.push_str(&format!(" {}", dt.year()));
            }
        }
    }
    out
}

/// Format the calendar date of `value`, e.g. `Tue, Nov 14, 2023`.
pub fn date_string<M: Into<Moment>>(value: Option<M>, options: &DateOptions) -> Option<String> {
    let Some(moment) = value.map(Into::<Moment>::into) else {
        return options.default.clone();
    };
    let Some(dt) = to_wall_clock(&moment) else {
        return options.default.clone();
    };
    let rules = rules(options.locale.as_deref().unwrap_or(DEFAULT_LOCALE));
    Some(render_date(&dt, options, rules))
}

fn render_time(dt: &NaiveDateTime, rules: &LocaleRules) -> String {
    if rules.hour12 {
        let (is_pm, hour) = dt.hour12();
        format!(
            "{}:{:02}:{:02} {}",
            hour,
            dt.minute(),
            dt.second(),
            if is_pm { "PM" } else { "AM" }
        )
    } else {
        format!("{:02}:{:02}:{:02}", dt.hour(), dt.minute(), dt.second())
    }
}

/// Format the time of day of `value`, e.g. `3:04:05 PM`.
pub fn time_string<M: Into<Moment>>(value: Option<M>, locale: Option<&str>, default: Option<&str>) -> Option<String> {
    let wall_clock = value.map(Into::<Moment>::into).as_ref().and_then(to_wall_clock);
    match wall_clock {
        Some(dt) => Some(render_time(&dt, rules(locale.unwrap_or(DEFAULT_LOCALE)))),
        None => default.map(str::to_string),
    }
}

/// Left-pad with zeros to at least `len` characters
pub fn left_pad(value: impl ToString, len: usize) -> String {
    format!("{:0>width$}", value.to_string(), width = len)
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Formatting helpers bound to the application's current locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatter {
    locale: String,
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(DEFAULT_LOCALE)
    }
}

impl Formatter {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn set_locale(&mut self, locale: impl Into<String>) {
        self.locale = locale.into();
    }

    pub fn currency<A: Into<Amount>>(&self, value: Option<A>, default: Option<&str>) -> Option<String> {
        currency(value, Some(&self.locale), default)
    }

    /// `options.locale`, when set, wins over the formatter's locale.
    pub fn date_string<M: Into<Moment>>(&self, value: Option<M>, options: &DateOptions) -> Option<String> {
        if options.locale.is_some() {
            return date_string(value, options);
        }
        let options = options.clone().with_locale(self.locale.clone());
        date_string(value, &options)
    }

    pub fn time_string<M: Into<Moment>>(&self, value: Option<M>, default: Option<&str>) -> Option<String> {
        time_string(value, Some(&self.locale), default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_missing_value_returns_default() {
        assert_eq!(currency(None::<f64>, None, Some("-")), Some("-".to_string()));
        assert_eq!(currency(None::<f64>, None, None), None);
        assert_eq!(currency(Some(f64::NAN), None, Some("n/a")), Some("n/a".to_string()));
    }

    #[test]
    fn test_currency_formats_numbers_and_numeric_strings() {
        assert_eq!(currency(Some("12.5"), None, None).as_deref(), Some("$12.50"));
        assert_eq!(currency(Some(" 3.10 CAD"), None, None).as_deref(), Some("$3.10"));
        assert_eq!(currency(Some(1234567.891), Some("en-US"), None).as_deref(), Some("$1,234,567.89"));
        assert_eq!(currency(Some(0), None, None).as_deref(), Some("$0.00"));
        assert_eq!(currency(Some(-42.1), Some("en-CA"), None).as_deref(), Some("-$42.10"));
    }

    #[test]
    fn test_currency_rounds_the_stored_value() {
        // 0.015 and 1.005 are stored just below the half cent
        assert_eq!(currency(Some(0.015), None, None).as_deref(), Some("$0.01"));
        assert_eq!(currency(Some(1.005), None, None).as_deref(), Some("$1.00"));
        // 0.125 is exact, and ties round away from zero
        assert_eq!(currency(Some(0.125), None, None).as_deref(), Some("$0.13"));
        assert_eq!(currency(Some(-0.125), None, None).as_deref(), Some("-$0.13"));
        assert_eq!(currency(Some(9.999), None, None).as_deref(), Some("$10.00"));
        assert_eq!(currency(Some(999.999), Some("en-US"), None).as_deref(), Some("$1,000.00"));
        assert_eq!(currency(Some(-0.001), None, None).as_deref(), Some("$0.00"));
    }

    #[test]
    fn test_currency_non_numeric_string_passes_through() {
        assert_eq!(currency(Some("free"), None, Some("-")).as_deref(), Some("free"));
    }

    #[test]
    fn test_currency_locales() {
        assert_eq!(currency(Some(1234.5), Some("fr-CA"), None), Some("1\u{a0}234,50\u{a0}$".to_string()));
        assert_eq!(currency(Some(1234.5), Some("de-DE"), None), Some("1.234,50\u{a0}$".to_string()));
        assert_eq!(currency(Some(1234.5), Some("es-ES"), None), Some("1234,50\u{a0}$".to_string()));
        assert_eq!(currency(Some(12.5), Some("xx-YY"), None).as_deref(), Some("$12.50"));
    }

    #[test]
    fn test_widget_currency() {
        assert_eq!(widget_currency(Some(2500.1), None).as_deref(), Some("$2,500.10"));
        assert_eq!(widget_currency(None::<f64>, Some("")).as_deref(), Some(""));
    }

    #[test]
    fn test_parse_leading_number() {
        assert_eq!(parse_leading_number("12.5"), Some(12.5));
        assert_eq!(parse_leading_number("-.5"), Some(-0.5));
        assert_eq!(parse_leading_number("7."), Some(7.0));
        assert_eq!(parse_leading_number("1e3x"), Some(1000.0));
        assert_eq!(parse_leading_number("2e"), Some(2.0));
        assert_eq!(parse_leading_number("abc"), None);
        assert_eq!(parse_leading_number("."), None);
        assert_eq!(parse_leading_number(""), None);
    }

    #[test]
    fn test_date_string_seconds_and_millis_agree() {
        let options = DateOptions::default();
        let from_seconds = date_string(Some(1_700_000_000_i64), &options);
        let from_millis = date_string(Some(1_700_000_000_000_i64), &options);
        assert!(from_seconds.is_some());
        assert_eq!(from_seconds, from_millis);
    }

    #[test]
    fn test_date_string_from_text() {
        let options = DateOptions::default();
        assert_eq!(date_string(Some("2023-11-14"), &options).as_deref(), Some("Tue, Nov 14, 2023"));
        assert_eq!(
            date_string(Some("2023-11-14T23:30:00Z"), &options.clone().without_weekday()).as_deref(),
            Some("Nov 14, 2023")
        );
        assert_eq!(
            date_string(Some("2023-11-14 08:00:00"), &options.clone().without_year()).as_deref(),
            Some("Tue, Nov 14")
        );
    }

    #[test]
    fn test_date_string_locales() {
        let options = DateOptions::default();
        let date = |locale: &str| date_string(Some("2023-11-14"), &options.clone().with_locale(locale));
        assert_eq!(date("en-GB").as_deref(), Some("Tue 14 Nov 2023"));
        assert_eq!(date("fr-CA").as_deref(), Some("mar. 14 nov. 2023"));
        assert_eq!(date("de-DE").as_deref(), Some("Di., 14. Nov. 2023"));
    }

    #[test]
    fn test_date_string_defaults() {
        let options = DateOptions::default().with_default("never");
        assert_eq!(date_string(None::<f64>, &options).as_deref(), Some("never"));
        assert_eq!(date_string(Some("not a date"), &options).as_deref(), Some("never"));
        assert_eq!(date_string(None::<f64>, &DateOptions::default()), None);
    }

    #[test]
    fn test_time_string() {
        assert_eq!(time_string(Some("2023-11-14T15:04:05"), None, None).as_deref(), Some("3:04:05 PM"));
        assert_eq!(time_string(Some("2023-11-14T00:04:05"), None, None).as_deref(), Some("12:04:05 AM"));
        assert_eq!(time_string(Some("2023-11-14T15:04:05"), Some("de-DE"), None).as_deref(), Some("15:04:05"));
        assert_eq!(time_string(None::<f64>, None, Some("-")).as_deref(), Some("-"));
        assert_eq!(
            time_string(Some(1_700_000_000_i64), None, None),
            time_string(Some(1_700_000_000_000_i64), None, None)
        );
    }

    #[test]
    fn test_left_pad() {
        assert_eq!(left_pad(53, 5), "00053");
        assert_eq!(left_pad("123456", 5), "123456");
        assert_eq!(left_pad(7, 0), "7");
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("Ünïcödé text", 6), "Ünï...");
    }

    #[test]
    fn test_formatter_uses_its_locale() {
        let mut formatter = Formatter::default();
        assert_eq!(formatter.locale(), "en-US");
        assert_eq!(formatter.currency(Some(5), None).as_deref(), Some("$5.00"));

        formatter.set_locale("fr-CA");
        assert_eq!(formatter.currency(Some(5), None), Some("5,00\u{a0}$".to_string()));
        assert_eq!(
            formatter.date_string(Some("2023-11-14"), &DateOptions::default()).as_deref(),
            Some("mar. 14 nov. 2023")
        );
        // Explicit option wins
        assert_eq!(
            formatter
                .date_string(Some("2023-11-14"), &DateOptions::default().with_locale("en-US"))
                .as_deref(),
            Some("Tue, Nov 14, 2023")
        );
        assert_eq!(formatter.time_string(Some("2023-11-14T15:04:05"), None).as_deref(), Some("15:04:05"));
    }
}
