use super::util::{RetryPolicy, with_retry};
use crate::core::config::ErApiProviderConfig;
use crate::core::currency::RateProvider;
use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error, instrument};

const SUCCESS: &str = "success";

/// Client for an ExchangeRate-API compatible service.
pub struct ErApiProvider {
    base_url: String,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl ErApiProvider {
    pub fn new(config: &ErApiProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("xconv/1.0")
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(ErApiProvider {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            retry: RetryPolicy::new(config.retries, config.retry_delay_ms),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("Requesting {}", url);
        let client = &self.client;
        let response = with_retry(
            move || async move { client.get(url).send().await?.error_for_status() },
            &self.retry,
        )
        .await
        .with_context(|| format!("Request failed for {url}"))?;

        let text = response
            .text()
            .await
            .context("Failed to read response body")?;

        serde_json::from_str(&text).map_err(|e| {
            error!(error = ?e, response = %text, "Failed to parse rate response");
            anyhow!("Failed to parse JSON response from {}: {}", url, e)
        })
    }
}

#[derive(Debug, Deserialize)]
struct AllRatesResponse {
    result: String,
    base_code: Option<String>,
    rates: Option<HashMap<String, f64>>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PairRateResponse {
    result: String,
    base_code: Option<String>,
    target_code: Option<String>,
    conversion_rate: Option<f64>,
    time_last_update_utc: Option<String>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
}

fn non_success(result: &str, error_type: Option<&str>) -> anyhow::Error {
    match error_type {
        Some(kind) => anyhow!("Rate provider returned {}: {}", result, kind),
        None => anyhow!("Rate provider returned {}", result),
    }
}

#[async_trait]
impl RateProvider for ErApiProvider {
    #[instrument(name = "ErApiLatest", skip_all, fields(base = %base))]
    async fn fetch_all_rates(&self, base: &str) -> Result<HashMap<String, f64>> {
        let url = format!("{}/v6/latest?base={}", self.base_url, base);
        let data: AllRatesResponse = self.get_json(&url).await?;

        if data.result != SUCCESS {
            return Err(non_success(&data.result, data.error_type.as_deref()));
        }

        let rates = data.rates.unwrap_or_default();
        debug!(
            base_code = ?data.base_code,
            count = rates.len(),
            "Received rates"
        );
        Ok(rates)
    }

    #[instrument(name = "ErApiPair", skip_all, fields(from = %from, to = %to))]
    async fn fetch_pair_rate(&self, from: &str, to: &str) -> Result<f64> {
        let url = format!("{}/v6/pair?from={}&to={}", self.base_url, from, to);
        let data: PairRateResponse = self.get_json(&url).await?;

        if data.result != SUCCESS {
            return Err(non_success(&data.result, data.error_type.as_deref()));
        }

        let Some(rate) = data.conversion_rate else {
            bail!("No conversion rate found for currency pair: {from}/{to}");
        };
        debug!(
            base_code = ?data.base_code,
            target_code = ?data.target_code,
            updated = ?data.time_last_update_utc,
            rate,
            "Received pair rate"
        );
        Ok(rate)
    }
}
