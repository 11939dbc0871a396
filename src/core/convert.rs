//! Recomputes every currency field from a single user edit

use super::currency::Currency;
use super::format::{NumberLocale, format_amount, parse_amount};
use super::rates::RateTable;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// The text shown in one currency's amount field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayValue {
    pub currency: Currency,
    pub text: String,
    pub user_input: bool,
}

impl DisplayValue {
    fn blank(currency: Currency) -> Self {
        Self {
            currency,
            text: String::new(),
            user_input: false,
        }
    }
}

pub type DisplayValues = BTreeMap<Currency, DisplayValue>;

/// Every tracked currency with an empty field.
pub fn blank_values() -> DisplayValues {
    Currency::ALL
        .into_iter()
        .map(|c| (c, DisplayValue::blank(c)))
        .collect()
}

/// Builds a fresh set of display values after `edited` was set to `raw`.
///
/// The edited field keeps the raw text. Every other field is recomputed
/// through the reference currency, or left blank when the input is not a
/// positive number.
#[instrument(skip(rates, locale))]
pub fn convert(
    rates: &RateTable,
    edited: Currency,
    raw: &str,
    locale: &NumberLocale,
) -> DisplayValues {
    let mut values = blank_values();
    values.insert(
        edited,
        DisplayValue {
            currency: edited,
            text: raw.to_string(),
            user_input: true,
        },
    );

    let amount = match parse_amount(raw, locale) {
        Some(amount) if amount > 0.0 => amount,
        _ => {
            debug!("Input is not a positive amount, clearing other fields");
            return values;
        }
    };

    let Some(from_rate) = rates.get(edited) else {
        return values;
    };

    let in_reference = amount / from_rate;
    for target in Currency::ALL.into_iter().filter(|c| *c != edited) {
        let Some(to_rate) = rates.get(target) else {
            continue;
        };
        let result = in_reference * to_rate;
        values.insert(
            target,
            DisplayValue {
                currency: target,
                text: format_amount(result, target, locale),
                user_input: false,
            },
        );
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn locale() -> NumberLocale {
        NumberLocale::default()
    }

    fn text(values: &DisplayValues, currency: Currency) -> &str {
        &values[&currency].text
    }

    #[test]
    fn test_convert_from_reference() {
        let rates = RateTable::new();
        let values = convert(&rates, Currency::Usd, "100", &locale());

        assert_eq!(text(&values, Currency::Usd), "100");
        assert!(values[&Currency::Usd].user_input);
        assert_eq!(text(&values, Currency::Eur), "85.66");
        assert_eq!(text(&values, Currency::Ars), "126.60k");
        assert_eq!(text(&values, Currency::Pyg), "782.80k");
        assert_eq!(text(&values, Currency::Brl), "500.00");
        assert_eq!(text(&values, Currency::Uyu), "4.00k");
        assert_eq!(values.values().filter(|v| v.user_input).count(), 1);
    }

    #[test]
    fn test_convert_between_non_reference_currencies() {
        let rates = RateTable::new();
        let values = convert(&rates, Currency::Brl, "10", &locale());

        // 10 BRL -> 2 USD
        assert_eq!(text(&values, Currency::Usd), "2.00");
        assert_eq!(text(&values, Currency::Uyu), "80.00");
        assert_eq!(text(&values, Currency::Ars), "2.53k");
    }

    #[test]
    fn test_small_integral_currency_amount() {
        let rates = RateTable::new();
        let values = convert(&rates, Currency::Usd, "0.5", &locale());
        assert_eq!(text(&values, Currency::Ars), "633");
    }

    #[test]
    fn test_unparsable_input_clears_other_fields() {
        let rates = RateTable::new();
        let values = convert(&rates, Currency::Eur, "abc", &locale());

        assert_eq!(text(&values, Currency::Eur), "abc");
        assert!(values[&Currency::Eur].user_input);
        for (currency, value) in &values {
            if *currency != Currency::Eur {
                assert!(value.text.is_empty());
                assert!(!value.user_input);
            }
        }
    }

    #[test]
    fn test_non_positive_input_clears_other_fields() {
        let rates = RateTable::new();
        for raw in ["0", "-5", ""] {
            let values = convert(&rates, Currency::Usd, raw, &locale());
            assert_eq!(
                values.values().filter(|v| !v.text.is_empty()).count(),
                usize::from(!raw.is_empty()),
                "input {raw:?}"
            );
        }
    }

    #[test]
    fn test_round_trip_within_rounding() {
        let mut rates = RateTable::new();
        rates.replace_from_provider(&HashMap::from([("BRL".to_string(), 5.37)]));

        let forward = convert(&rates, Currency::Usd, "42", &locale());
        let brl_text = text(&forward, Currency::Brl).to_string();
        assert_eq!(brl_text, "225.54");

        let back = convert(&rates, Currency::Brl, &brl_text, &locale());
        let usd: f64 = text(&back, Currency::Usd).parse().unwrap();
        assert!((usd - 42.0).abs() < 0.01);
    }

    #[test]
    fn test_uses_updated_rates() {
        let mut rates = RateTable::new();
        rates.set_manual(Currency::Eur, 0.5);
        let values = convert(&rates, Currency::Eur, "50", &locale());
        assert_eq!(text(&values, Currency::Usd), "100.00");
    }
}
