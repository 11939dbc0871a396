//! Exchange-rate table relative to the reference currency

use super::currency::{Currency, REFERENCE_CURRENCY};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use tracing::{debug, warn};

/// Where the current value of a rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateOrigin {
    Default,
    Provider,
    Manual,
}

impl Display for RateOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                RateOrigin::Default => "default",
                RateOrigin::Provider => "from API",
                RateOrigin::Manual => "manual",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateEntry {
    pub rate: f64,
    pub origin: RateOrigin,
}

/// Units of each tracked currency per one unit of the reference currency.
///
/// The reference currency is pinned to 1.0 and every other entry is finite and
/// positive; each mutation path below preserves this.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    entries: BTreeMap<Currency, RateEntry>,
}

impl Default for RateTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RateTable {
    /// Seeds the table with the built-in default rates.
    pub fn new() -> Self {
        let entries = Currency::ALL
            .into_iter()
            .map(|c| {
                (
                    c,
                    RateEntry {
                        rate: c.default_rate(),
                        origin: RateOrigin::Default,
                    },
                )
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, currency: Currency) -> Option<f64> {
        if currency.is_reference() {
            return Some(1.0);
        }
        self.entries.get(&currency).map(|e| e.rate)
    }

    pub fn origin(&self, currency: Currency) -> Option<RateOrigin> {
        self.entries.get(&currency).map(|e| e.origin)
    }

    /// All entries in display order.
    pub fn rates(&self) -> impl Iterator<Item = (Currency, RateEntry)> + '_ {
        self.entries.iter().map(|(c, e)| (*c, *e))
    }

    /// Overrides a single rate. Returns `false`, leaving the table untouched,
    /// for the reference currency or a rate that is not finite and positive.
    pub fn set_manual(&mut self, currency: Currency, rate: f64) -> bool {
        if currency.is_reference() || !is_valid_rate(rate) {
            debug!(%currency, rate, "Rejected manual rate");
            return false;
        }
        self.entries.insert(
            currency,
            RateEntry {
                rate,
                origin: RateOrigin::Manual,
            },
        );
        true
    }

    /// Applies a provider response. Codes the provider omits, or reports with
    /// an unusable value, keep their current rate.
    ///
    /// Returns the currencies that were updated.
    pub fn replace_from_provider(&mut self, rates: &HashMap<String, f64>) -> Vec<Currency> {
        let mut updated = Vec::new();
        for currency in Currency::non_reference() {
            match rates.get(currency.code()) {
                Some(rate) if is_valid_rate(*rate) => {
                    self.entries.insert(
                        currency,
                        RateEntry {
                            rate: *rate,
                            origin: RateOrigin::Provider,
                        },
                    );
                    updated.push(currency);
                }
                Some(rate) => warn!(%currency, rate, "Ignoring invalid provider rate"),
                None => debug!(%currency, "Provider omitted rate, keeping current value"),
            }
        }

        self.entries
            .entry(REFERENCE_CURRENCY)
            .or_insert(RateEntry {
                rate: 1.0,
                origin: RateOrigin::Default,
            })
            .rate = 1.0;
        updated
    }
}

fn is_valid_rate(rate: f64) -> bool {
    rate.is_finite() && rate > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider_rates(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(c, r)| (c.to_string(), *r)).collect()
    }

    #[test]
    fn test_defaults() {
        let table = RateTable::new();
        assert_eq!(table.get(Currency::Eur), Some(0.8566));
        assert_eq!(table.get(Currency::Ars), Some(1266.0));
        assert_eq!(table.get(REFERENCE_CURRENCY), Some(1.0));
        assert_eq!(table.origin(Currency::Brl), Some(RateOrigin::Default));
        assert_eq!(table.rates().count(), Currency::ALL.len());
    }

    #[test]
    fn test_set_manual() {
        let mut table = RateTable::new();
        assert!(table.set_manual(Currency::Eur, 0.95));
        assert_eq!(table.get(Currency::Eur), Some(0.95));
        assert_eq!(table.origin(Currency::Eur), Some(RateOrigin::Manual));
    }

    #[test]
    fn test_set_manual_rejects_reference_and_non_positive() {
        let mut table = RateTable::new();
        let before = table.clone();
        assert!(!table.set_manual(REFERENCE_CURRENCY, 2.0));
        assert!(!table.set_manual(Currency::Eur, 0.0));
        assert!(!table.set_manual(Currency::Eur, -1.0));
        assert!(!table.set_manual(Currency::Eur, f64::NAN));
        assert_eq!(table, before);
        assert_eq!(table.get(REFERENCE_CURRENCY), Some(1.0));
    }

    #[test]
    fn test_replace_from_provider_keeps_missing_codes() {
        let mut table = RateTable::new();
        let updated = table.replace_from_provider(&provider_rates(&[("EUR", 0.9)]));

        assert_eq!(updated, vec![Currency::Eur]);
        assert_eq!(table.get(Currency::Eur), Some(0.9));
        assert_eq!(table.get(Currency::Ars), Some(1266.0));
        assert_eq!(table.origin(Currency::Ars), Some(RateOrigin::Default));
        assert_eq!(table.get(REFERENCE_CURRENCY), Some(1.0));
    }

    #[test]
    fn test_replace_from_provider_pins_reference() {
        let mut table = RateTable::new();
        table.replace_from_provider(&provider_rates(&[("USD", 3.0), ("BRL", 5.4)]));
        assert_eq!(table.get(REFERENCE_CURRENCY), Some(1.0));
        assert_eq!(table.get(Currency::Brl), Some(5.4));
    }

    #[test]
    fn test_replace_from_provider_ignores_invalid_values() {
        let mut table = RateTable::new();
        let updated = table.replace_from_provider(&provider_rates(&[
            ("ARS", 0.0),
            ("PYG", -5.0),
            ("UYU", f64::INFINITY),
            ("GBP", 0.79),
        ]));
        assert!(updated.is_empty());
        assert_eq!(table.get(Currency::Ars), Some(1266.0));
        assert_eq!(table.get(Currency::Pyg), Some(7828.0));
        assert_eq!(table.get(Currency::Uyu), Some(40.0));
    }
}
