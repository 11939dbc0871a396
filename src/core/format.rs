//! Locale-aware rendering of amounts and rates

use super::currency::Currency;

const GROUPING_SEPARATOR: char = ' ';
const MILLION: f64 = 1_000_000.0;
const THOUSAND: f64 = 1_000.0;
const MILLIONS_SUFFIX: &str = "M";
const THOUSANDS_SUFFIX: &str = "k";

/// Precision recorded for rates entered by hand.
pub const MANUAL_RATE_DECIMALS: usize = 4;

/// Number conventions of the active locale.
///
/// Only the decimal separator is locale-derived; grouping always uses a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberLocale {
    pub decimal_separator: char,
}

impl Default for NumberLocale {
    fn default() -> Self {
        Self {
            decimal_separator: '.',
        }
    }
}

impl NumberLocale {
    pub fn new(decimal_separator: char) -> Self {
        Self { decimal_separator }
    }
}

/// Formats a converted amount for display in `currency`'s field.
///
/// Amounts of a million or more are shown in millions, amounts of a thousand or
/// more in thousands, both with two decimals. Smaller amounts use the
/// currency's own decimal policy.
pub fn format_amount(value: f64, currency: Currency, locale: &NumberLocale) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    if value >= MILLION {
        format!(
            "{}{}",
            format_grouped(value / MILLION, 2, locale),
            MILLIONS_SUFFIX
        )
    } else if value >= THOUSAND {
        format!(
            "{}{}",
            format_grouped(value / THOUSAND, 2, locale),
            THOUSANDS_SUFFIX
        )
    } else {
        format_grouped(value, currency.display_decimals(), locale)
    }
}

/// Formats a rate for an editable override field: fixed decimals, no grouping.
pub fn format_rate(rate: f64, decimals: usize, locale: &NumberLocale) -> String {
    let text = format!("{rate:.decimals$}");
    localize_separator(text, locale)
}

/// Renders raw user input with space grouping and at most two decimals.
/// Text that is not a number is returned as typed.
pub fn group_input(raw: &str, locale: &NumberLocale) -> String {
    let Some(value) = parse_amount(raw, locale) else {
        return raw.to_string();
    };

    let grouped = format_grouped(value, 2, locale);
    match grouped.split_once(locale.decimal_separator) {
        Some((int_part, frac_part)) => {
            let frac_part = frac_part.trim_end_matches('0');
            if frac_part.is_empty() {
                int_part.to_string()
            } else {
                format!("{}{}{}", int_part, locale.decimal_separator, frac_part)
            }
        }
        None => grouped,
    }
}

/// Parses user-typed text into a finite number, tolerating grouping spaces
/// and the locale decimal separator.
pub fn parse_amount(raw: &str, locale: &NumberLocale) -> Option<f64> {
    let mut text: String = raw
        .trim()
        .chars()
        .filter(|c| *c != GROUPING_SEPARATOR)
        .collect();
    if locale.decimal_separator != '.' {
        text = text.replace(locale.decimal_separator, ".");
    }

    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn format_grouped(value: f64, decimals: usize, locale: &NumberLocale) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::with_capacity(fixed.len() + fixed.len() / 3 + 1);
    if value.is_sign_negative() && value != 0.0 {
        out.push('-');
    }
    out.push_str(&group_digits(int_part));
    if let Some(frac) = frac_part {
        out.push(locale.decimal_separator);
        out.push_str(frac);
    }
    out
}

fn group_digits(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(GROUPING_SEPARATOR);
        }
        out.push(ch);
    }
    out
}

fn localize_separator(text: String, locale: &NumberLocale) -> String {
    if locale.decimal_separator == '.' {
        text
    } else {
        text.replace('.', &locale.decimal_separator.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot() -> NumberLocale {
        NumberLocale::default()
    }

    #[test]
    fn test_millions_use_suffix() {
        assert_eq!(format_amount(1_500_000.0, Currency::Eur, &dot()), "1.50M");
        assert_eq!(format_amount(1_000_000.0, Currency::Pyg, &dot()), "1.00M");
        assert_eq!(
            format_amount(2_500_000_000.0, Currency::Usd, &dot()),
            "2 500.00M"
        );
    }

    #[test]
    fn test_thousands_use_suffix() {
        assert_eq!(format_amount(126_600.0, Currency::Ars, &dot()), "126.60k");
        assert_eq!(format_amount(1_000.0, Currency::Usd, &dot()), "1.00k");
        assert_eq!(format_amount(999_999.0, Currency::Brl, &dot()), "1 000.00k");
    }

    #[test]
    fn test_small_values_follow_currency_decimals() {
        assert_eq!(format_amount(999.0, Currency::Ars, &dot()), "999");
        assert_eq!(format_amount(999.4, Currency::Pyg, &dot()), "999");
        assert_eq!(format_amount(85.66, Currency::Eur, &dot()), "85.66");
        assert_eq!(format_amount(5.0, Currency::Brl, &dot()), "5.00");
        assert_eq!(format_amount(0.004, Currency::Uyu, &dot()), "0.00");
    }

    #[test]
    fn test_decimal_separator_follows_locale() {
        let comma = NumberLocale::new(',');
        assert_eq!(format_amount(1_500.0, Currency::Eur, &comma), "1,50k");
        assert_eq!(format_amount(12.5, Currency::Usd, &comma), "12,50");
        assert_eq!(format_rate(0.8566, 4, &comma), "0,8566");
    }

    #[test]
    fn test_non_finite_values_do_not_panic() {
        assert_eq!(format_amount(f64::NAN, Currency::Usd, &dot()), "NaN");
        assert_eq!(format_amount(f64::INFINITY, Currency::Usd, &dot()), "inf");
    }

    #[test]
    fn test_rate_text_is_not_grouped() {
        assert_eq!(format_rate(1266.0, Currency::Ars.rate_decimals(), &dot()), "1266.00");
        assert_eq!(format_rate(7828.4, Currency::Pyg.rate_decimals(), &dot()), "7828");
        assert_eq!(format_rate(0.9, MANUAL_RATE_DECIMALS, &dot()), "0.9000");
    }

    #[test]
    fn test_group_input() {
        assert_eq!(group_input("1234567.5", &dot()), "1 234 567.5");
        assert_eq!(group_input("1000", &dot()), "1 000");
        assert_eq!(group_input("12.346", &dot()), "12.35");
        assert_eq!(group_input("abc", &dot()), "abc");
        assert_eq!(group_input("", &dot()), "");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("100", &dot()), Some(100.0));
        assert_eq!(parse_amount(" 1 000.5 ", &dot()), Some(1000.5));
        assert_eq!(parse_amount("12,5", &NumberLocale::new(',')), Some(12.5));
        assert_eq!(parse_amount("12,5", &dot()), None);
        assert_eq!(parse_amount("abc", &dot()), None);
        assert_eq!(parse_amount("inf", &dot()), None);
        assert_eq!(parse_amount("-3", &dot()), Some(-3.0));
    }
}
