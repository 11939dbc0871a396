//! Single owner of [`AppState`] and the entry points that mutate it

use super::convert::convert;
use super::currency::{Currency, REFERENCE_CURRENCY, RateProvider};
use super::format::{MANUAL_RATE_DECIMALS, NumberLocale, format_rate};
use super::state::{AppState, EMPTY_RATES_MESSAGE, UpdateStatus};
use chrono::Local;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

/// Serializes every mutation of the application state and publishes each new
/// state to subscribers.
///
/// Cloning is cheap; clones share the same state.
#[derive(Clone)]
pub struct Converter {
    state: Arc<watch::Sender<AppState>>,
    provider: Arc<dyn RateProvider>,
    locale: NumberLocale,
}

impl Converter {
    pub fn new(provider: Arc<dyn RateProvider>, locale: NumberLocale) -> Self {
        let (state, _) = watch::channel(AppState::new());
        Self {
            state: Arc::new(state),
            provider,
            locale,
        }
    }

    pub fn locale(&self) -> &NumberLocale {
        &self.locale
    }

    pub fn snapshot(&self) -> AppState {
        self.state.borrow().clone()
    }

    /// Receives every state published after this call.
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    /// Replaces all display values after the user typed `text` into
    /// `currency`'s field.
    pub fn on_user_edit(&self, currency: Currency, text: &str) {
        self.state.send_modify(|state| {
            state.values = convert(&state.rates, currency, text, &self.locale);
        });
    }

    /// Overrides one rate by hand. Returns `false` when the rate was rejected.
    pub fn on_manual_rate_set(&self, currency: Currency, rate: f64) -> bool {
        self.state.send_if_modified(|state| {
            if !state.rates.set_manual(currency, rate) {
                return false;
            }
            state.fetched_rates.insert(
                currency,
                format_rate(rate, MANUAL_RATE_DECIMALS, &self.locale),
            );
            self.replay_user_input(state);
            info!(%currency, rate, "Manual rate set");
            true
        })
    }

    /// Starts a background refresh unless one is already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn on_refresh_requested(&self) -> Option<JoinHandle<UpdateStatus>> {
        let started = self.state.send_if_modified(|state| {
            if state.is_loading {
                false
            } else {
                state.is_loading = true;
                true
            }
        });
        if !started {
            debug!("Refresh already in flight, ignoring request");
            return None;
        }

        let loading = LoadingGuard {
            state: Arc::clone(&self.state),
        };
        let converter = self.clone();
        Some(tokio::spawn(async move { converter.refresh(loading).await }))
    }

    /// Fetches the latest rates and applies them. Failures never escape; they
    /// are recorded in [`AppState::last_update`], which is also returned.
    pub async fn fetch_latest(&self) -> UpdateStatus {
        self.state.send_modify(|state| state.is_loading = true);
        let loading = LoadingGuard {
            state: Arc::clone(&self.state),
        };
        self.refresh(loading).await
    }

    #[instrument(name = "RateRefresh", skip_all)]
    async fn refresh(&self, _loading: LoadingGuard) -> UpdateStatus {
        let base = REFERENCE_CURRENCY.code();
        info!(base, "Fetching latest rates");

        let outcome = AssertUnwindSafe(self.provider.fetch_all_rates(base))
            .catch_unwind()
            .await;

        let mut status = UpdateStatus::Never;
        self.state.send_modify(|state| {
            status = match outcome {
                Ok(Ok(rates)) if !rates.is_empty() => {
                    let updated = state.rates.replace_from_provider(&rates);
                    for currency in &updated {
                        if let Some(rate) = state.rates.get(*currency) {
                            state.fetched_rates.insert(
                                *currency,
                                format_rate(rate, currency.rate_decimals(), &self.locale),
                            );
                        }
                    }
                    self.replay_user_input(state);
                    info!(updated = updated.len(), "Applied provider rates");
                    UpdateStatus::Updated(Local::now())
                }
                Ok(Ok(_)) => {
                    warn!("Provider returned no rates, keeping current table");
                    UpdateStatus::Failed(EMPTY_RATES_MESSAGE.to_string())
                }
                Ok(Err(e)) => {
                    error!(error = %e, "Rate fetch failed, keeping current table");
                    UpdateStatus::Failed(format!("Error: {e:#}"))
                }
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    error!(%message, "Rate provider panicked, keeping current table");
                    UpdateStatus::Failed(format!("Error: {message}"))
                }
            };
            state.last_update = status.clone();
            state.is_loading = false;
        });
        status
    }

    fn replay_user_input(&self, state: &mut AppState) {
        if let Some(input) = state.user_input().cloned() {
            state.values = convert(&state.rates, input.currency, &input.text, &self.locale);
        }
    }
}

/// Clears the loading flag if a refresh ends without publishing its outcome,
/// e.g. when the task is aborted before or during the fetch.
struct LoadingGuard {
    state: Arc<watch::Sender<AppState>>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.state.send_if_modified(|state| {
            if state.is_loading {
                state.is_loading = false;
                true
            } else {
                false
            }
        });
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "rate provider panicked".to_string()
    }
}
