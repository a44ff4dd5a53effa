//! Per-locale number, date and time conventions.
//!
//! Only the locales the dashboard is offered in are described. Anything
//! else, including malformed tags, falls back to `en-US`.

/// Locale used when none is configured
pub const DEFAULT_LOCALE: &str = "en-US";

/// Non-breaking space, as used between amount and trailing symbol
pub(crate) const NBSP: char = '\u{a0}';

/// Narrow non-breaking space, the French digit group separator
const NNBSP: char = '\u{202f}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolPosition {
    /// `$12.50`
    Before,
    /// `12,50 $`
    After,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    /// `Nov 14, 2023`
    MonthDay,
    /// `14 Nov 2023`
    DayMonth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocaleRules {
    pub tag: &'static str,
    pub decimal: char,
    pub group: char,
    /// Smallest integer digit count that gets grouping (4 groups `1,234`,
    /// 5 leaves `1234` alone)
    pub min_grouping_digits: usize,
    pub symbol_position: SymbolPosition,
    pub date_order: DateOrder,
    /// Appended to the day number (`14.` in German)
    pub day_suffix: &'static str,
    /// Placed between the weekday and the rest of the date
    pub weekday_separator: &'static str,
    pub months: [&'static str; 12],
    /// Sunday first
    pub weekdays: [&'static str; 7],
    pub hour12: bool,
}

const EN_MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const EN_WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

const FR_MONTHS: [&str; 12] = [
    "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.", "oct.", "nov.",
    "déc.",
];
const FR_WEEKDAYS: [&str; 7] = ["dim.", "lun.", "mar.", "mer.", "jeu.", "ven.", "sam."];

const DE_MONTHS: [&str; 12] = [
    "Jan.", "Feb.", "März", "Apr.", "Mai", "Juni", "Juli", "Aug.", "Sept.", "Okt.", "Nov.", "Dez.",
];
const DE_WEEKDAYS: [&str; 7] = ["So.", "Mo.", "Di.", "Mi.", "Do.", "Fr.", "Sa."];

const ES_MONTHS: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov", "dic",
];
const ES_WEEKDAYS: [&str; 7] = ["dom", "lun", "mar", "mié", "jue", "vie", "sáb"];

const EN_US: LocaleRules = LocaleRules {
    tag: "en-US",
    decimal: '.',
    group: ',',
    min_grouping_digits: 4,
    symbol_position: SymbolPosition::Before,
    date_order: DateOrder::MonthDay,
    day_suffix: "",
    weekday_separator: ", ",
    months: EN_MONTHS,
    weekdays: EN_WEEKDAYS,
    hour12: true,
};

const LOCALES: [LocaleRules; 8] = [
    EN_US,
    LocaleRules { tag: "en-CA", ..EN_US },
    LocaleRules {
        tag: "en-GB",
        date_order: DateOrder::DayMonth,
        weekday_separator: " ",
        hour12: false,
        ..EN_US
    },
    LocaleRules {
        tag: "en-AU",
        date_order: DateOrder::DayMonth,
        weekday_separator: " ",
        ..EN_US
    },
    LocaleRules {
        tag: "fr-CA",
        decimal: ',',
        group: NBSP,
        symbol_position: SymbolPosition::After,
        date_order: DateOrder::DayMonth,
        weekday_separator: " ",
        months: FR_MONTHS,
        weekdays: FR_WEEKDAYS,
        hour12: false,
        ..EN_US
    },
    LocaleRules {
        tag: "fr-FR",
        decimal: ',',
        group: NNBSP,
        symbol_position: SymbolPosition::After,
        date_order: DateOrder::DayMonth,
        weekday_separator: " ",
        months: FR_MONTHS,
        weekdays: FR_WEEKDAYS,
        hour12: false,
        ..EN_US
    },
    LocaleRules {
        tag: "de-DE",
        decimal: ',',
        group: '.',
        symbol_position: SymbolPosition::After,
        date_order: DateOrder::DayMonth,
        day_suffix: ".",
        months: DE_MONTHS,
        weekdays: DE_WEEKDAYS,
        hour12: false,
        ..EN_US
    },
    LocaleRules {
        tag: "es-ES",
        decimal: ',',
        group: '.',
        min_grouping_digits: 5,
        symbol_position: SymbolPosition::After,
        date_order: DateOrder::DayMonth,
        months: ES_MONTHS,
        weekdays: ES_WEEKDAYS,
        hour12: false,
        ..EN_US
    },
];

/// Rules for `locale`, matched case-insensitively with `_` accepted for `-`.
/// A bare language (`fr`) picks the first region listed for it.
pub fn rules(locale: &str) -> &'static LocaleRules {
    let normalized = locale.trim().replace('_', "-");
    LOCALES
        .iter()
        .find(|r| r.tag.eq_ignore_ascii_case(&normalized))
        .or_else(|| {
            let language = normalized.split('-').next().unwrap_or_default();
            if language.is_empty() {
                return None;
            }
            LOCALES.iter().find(|r| {
                r.tag
                    .split('-')
                    .next()
                    .is_some_and(|l| l.eq_ignore_ascii_case(language))
            })
        })
        .unwrap_or(&LOCALES[0])
}

/// Locale tags with dedicated rules
pub fn supported_locales() -> impl Iterator<Item = &'static str> {
    LOCALES.iter().map(|r| r.tag)
}

impl LocaleRules {
    /// Group the integer digits of a number (`1234567` → `1,234,567`).
    pub fn group_digits(&self, digits: &str) -> String {
        if digits.len() < self.min_grouping_digits {
            return digits.to_string();
        }
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(self.group);
            }
            out.push(c);
        }
        out
    }
}
