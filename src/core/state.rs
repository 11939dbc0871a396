//! Observable application state

use super::convert::{DisplayValue, DisplayValues, blank_values};
use super::currency::Currency;
use super::rates::RateTable;
use chrono::{DateTime, Local};
use std::collections::BTreeMap;
use std::fmt::Display;

pub const EMPTY_RATES_MESSAGE: &str = "Failed to fetch rates - API returned empty data";

/// Outcome of the most recent rate refresh.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum UpdateStatus {
    #[default]
    Never,
    Updated(DateTime<Local>),
    Failed(String),
}

impl UpdateStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, UpdateStatus::Failed(_))
    }
}

impl Display for UpdateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdateStatus::Never => Ok(()),
            UpdateStatus::Updated(at) => write!(f, "Last updated: {}", at.format("%H:%M:%S")),
            UpdateStatus::Failed(message) => f.write_str(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub rates: RateTable,
    pub values: DisplayValues,
    /// Last fetched or manually set rate per non-reference currency, as shown
    /// in its override field. Empty until a rate has been obtained.
    pub fetched_rates: BTreeMap<Currency, String>,
    pub is_loading: bool,
    pub last_update: UpdateStatus,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            rates: RateTable::new(),
            values: blank_values(),
            fetched_rates: Currency::non_reference()
                .map(|c| (c, String::new()))
                .collect(),
            is_loading: false,
            last_update: UpdateStatus::Never,
        }
    }

    /// The field the user typed into last, if any.
    pub fn user_input(&self) -> Option<&DisplayValue> {
        self.values.values().find(|v| v.user_input)
    }

    pub fn display_text(&self, currency: Currency) -> &str {
        self.values
            .get(&currency)
            .map(|v| v.text.as_str())
            .unwrap_or_default()
    }

    pub fn fetched_rate(&self, currency: Currency) -> &str {
        self.fetched_rates
            .get(&currency)
            .map(String::as_str)
            .unwrap_or_default()
    }
}
