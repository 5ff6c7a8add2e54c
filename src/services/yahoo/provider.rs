//! Yahoo Finance market data provider implementation

use super::messages::{ChartEnvelope, QuoteEnvelope, QuoteEntry};
use crate::models::{HistoricalBar, Quote};
use crate::services::market_data::{MarketDataError, MarketDataProvider};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) marketwatch/0.1";

pub struct YahooMarketDataProvider {
    base_url: String,
    client: reqwest::Client,
    timeout_seconds: u64,
}

impl YahooMarketDataProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, MarketDataError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| MarketDataError::NetworkUnreachable(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(base_url, client).with_timeout_seconds(timeout.as_secs()))
    }

    /// Use a caller-supplied client, e.g. pointed at a mock server.
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            timeout_seconds: 0,
        }
    }

    fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T, MarketDataError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(MarketDataError::SymbolNotFound {
                symbol: url.rsplit('/').next().unwrap_or_default().to_string(),
            });
        }
        if !status.is_success() {
            return Err(MarketDataError::Http {
                status: status.as_u16(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| MarketDataError::ResponseFormatChanged(format!("failed to parse response: {}", e)))
    }

    fn map_transport_error(&self, e: reqwest::Error) -> MarketDataError {
        if e.is_timeout() {
            MarketDataError::Timeout {
                seconds: self.timeout_seconds,
            }
        } else {
            MarketDataError::NetworkUnreachable(e.to_string())
        }
    }
}

fn quote_from_entry(entry: QuoteEntry) -> Option<Quote> {
    let price = entry.regular_market_price?;
    let previous_close = entry.regular_market_previous_close?;
    let timestamp = entry
        .regular_market_time
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or_else(Utc::now);

    Some(Quote {
        symbol: entry.symbol,
        price,
        open: entry.regular_market_open.unwrap_or(price),
        high: entry.regular_market_day_high.unwrap_or(price),
        low: entry.regular_market_day_low.unwrap_or(price),
        volume: entry.regular_market_volume.unwrap_or(0.0),
        previous_close,
        vwap: None,
        timestamp,
    })
}

#[async_trait]
impl MarketDataProvider for YahooMarketDataProvider {
    async fn get_snapshots(&self, symbols: &[String]) -> Result<HashMap<String, Quote>, MarketDataError> {
        if symbols.is_empty() {
            return Ok(HashMap::new());
        }

        let url = format!("{}/v7/finance/quote", self.base_url);
        let envelope: QuoteEnvelope = self.get_json(&url, &[("symbols", symbols.join(","))]).await?;

        if let Some(err) = envelope.quote_response.error {
            return Err(MarketDataError::ResponseFormatChanged(format!(
                "{}: {}",
                err.code, err.description
            )));
        }

        let mut quotes = HashMap::with_capacity(symbols.len());
        for entry in envelope.quote_response.result {
            let symbol = entry.symbol.clone();
            match quote_from_entry(entry) {
                Some(quote) => {
                    quotes.insert(symbol, quote);
                }
                None => {
                    warn!(symbol = %symbol, "Yahoo: quote missing price or previous close, skipping {}", symbol);
                }
            }
        }

        debug!(
            requested = symbols.len(),
            received = quotes.len(),
            "Yahoo: received {} of {} quotes",
            quotes.len(),
            symbols.len()
        );
        Ok(quotes)
    }

    async fn get_daily_history(
        &self,
        symbol: &str,
        lookback_days: u32,
    ) -> Result<Vec<HistoricalBar>, MarketDataError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let query = [
            ("range", format!("{}d", lookback_days)),
            ("interval", "1d".to_string()),
        ];
        let envelope: ChartEnvelope = self.get_json(&url, &query).await?;

        let result = envelope.chart.result.ok_or_else(|| match envelope.chart.error {
            Some(err) if err.code == "Not Found" => MarketDataError::SymbolNotFound {
                symbol: symbol.to_string(),
            },
            Some(err) => MarketDataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description)),
            None => MarketDataError::ResponseFormatChanged("empty result with no error".into()),
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| MarketDataError::ResponseFormatChanged("result array is empty".into()))?;
        let timestamps = data
            .timestamp
            .ok_or_else(|| MarketDataError::ResponseFormatChanged("no timestamps".into()))?;
        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| MarketDataError::ResponseFormatChanged("no quote data".into()))?;

        let bars: Vec<HistoricalBar> = timestamps
            .iter()
            .enumerate()
            .filter_map(|(i, &ts)| {
                // Holidays and halted sessions come back as null closes.
                let close = quote.close.get(i).copied().flatten()?;
                let volume = quote.volume.get(i).copied().flatten().unwrap_or(0.0);
                let timestamp = DateTime::from_timestamp(ts, 0)?;
                Some(HistoricalBar::new(close, volume, timestamp))
            })
            .collect();

        if bars.is_empty() {
            return Err(MarketDataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        debug!(symbol = %symbol, bars = bars.len(), "Yahoo: fetched {} daily bars for {}", bars.len(), symbol);
        Ok(bars)
    }
}
