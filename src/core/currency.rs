//! Tracked currencies and the rate provider abstraction

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub enum Currency {
    Usd,
    Eur,
    Ars,
    Pyg,
    Brl,
    Uyu,
}

/// Every rate in the table is expressed relative to this currency.
pub const REFERENCE_CURRENCY: Currency = Currency::Usd;

impl Currency {
    /// All tracked currencies, in display order.
    pub const ALL: [Currency; 6] = [
        Currency::Usd,
        Currency::Eur,
        Currency::Ars,
        Currency::Pyg,
        Currency::Brl,
        Currency::Uyu,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Ars => "ARS",
            Currency::Pyg => "PYG",
            Currency::Brl => "BRL",
            Currency::Uyu => "UYU",
        }
    }

    pub fn is_reference(&self) -> bool {
        *self == REFERENCE_CURRENCY
    }

    /// Seed rate used until a provider or the user supplies one.
    pub fn default_rate(&self) -> f64 {
        match self {
            Currency::Usd => 1.0,
            Currency::Eur => 0.8566,
            Currency::Ars => 1266.0,
            Currency::Pyg => 7828.0,
            Currency::Brl => 5.0,
            Currency::Uyu => 40.0,
        }
    }

    /// Decimal places for converted amounts below one thousand.
    pub fn display_decimals(&self) -> usize {
        match self {
            Currency::Ars | Currency::Pyg => 0,
            Currency::Usd | Currency::Eur | Currency::Brl | Currency::Uyu => 2,
        }
    }

    /// Decimal places used when a fetched rate is shown in an override field.
    pub fn rate_decimals(&self) -> usize {
        match self {
            Currency::Eur => 4,
            Currency::Pyg => 0,
            _ => 2,
        }
    }

    /// Tracked currencies other than the reference one.
    pub fn non_reference() -> impl Iterator<Item = Currency> {
        Self::ALL.into_iter().filter(|c| !c.is_reference())
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "ARS" => Ok(Currency::Ars),
            "PYG" => Ok(Currency::Pyg),
            "BRL" => Ok(Currency::Brl),
            "UYU" => Ok(Currency::Uyu),
            _ => Err(anyhow::anyhow!("Unsupported currency: {}", s)),
        }
    }
}

/// Remote source of exchange rates.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Returns every rate the provider knows, expressed per one unit of `base`.
    ///
    /// An empty map is a valid return value; callers decide whether that is usable.
    async fn fetch_all_rates(&self, base: &str) -> Result<HashMap<String, f64>>;

    /// Returns how many units of `to` one unit of `from` buys.
    async fn fetch_pair_rate(&self, from: &str, to: &str) -> Result<f64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("eur".parse::<Currency>().unwrap(), Currency::Eur);
        assert_eq!(" PYG ".parse::<Currency>().unwrap(), Currency::Pyg);
        assert!("GBP".parse::<Currency>().is_err());
    }

    #[test]
    fn test_reference_currency_is_excluded_from_non_reference() {
        let others: Vec<Currency> = Currency::non_reference().collect();
        assert_eq!(others.len(), Currency::ALL.len() - 1);
        assert!(!others.contains(&REFERENCE_CURRENCY));
        assert_eq!(REFERENCE_CURRENCY.default_rate(), 1.0);
    }

    #[test]
    fn test_at_least_one_integral_currency() {
        assert!(Currency::ALL.iter().any(|c| c.display_decimals() == 0));
        assert_eq!(REFERENCE_CURRENCY.display_decimals(), 2);
    }
}
