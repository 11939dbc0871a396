//! Core business logic: rate table, conversion and the state engine

pub mod config;
pub mod convert;
pub mod currency;
pub mod engine;
pub mod format;
pub mod log;
pub mod rates;
pub mod state;

// Re-export main types for cleaner imports
pub use convert::{DisplayValue, DisplayValues};
pub use currency::{Currency, REFERENCE_CURRENCY, RateProvider};
pub use engine::Converter;
pub use format::NumberLocale;
pub use rates::{RateOrigin, RateTable};
pub use state::{AppState, UpdateStatus};
