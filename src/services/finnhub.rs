use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::{prelude::FromPrimitive, Decimal};
use serde::{Deserialize, Serialize};

use super::price_lookup::PriceLookup;

const QUOTE_URL: &str = "https://finnhub.io/api/v1/quote";

#[derive(Clone)]
pub struct FinnhubClient {
    http: Client,
    api_key: String,
}

impl FinnhubClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: Client::new(),
            api_key,
        }
    }

    fn has_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub async fn quote(&self, symbol: &str) -> Result<QuoteResponse, String> {
        if !self.has_key() {
            return Err("FINNHUB_API_KEY is missing in .env".to_string());
        }

        let res = self
            .http
            .get(QUOTE_URL)
            .query(&[("symbol", symbol), ("token", &self.api_key)])
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(format!("Finnhub quote failed: {status} {body}"));
        }

        res.json::<QuoteResponse>().await.map_err(|e| e.to_string())
    }
}

#[async_trait]
impl PriceLookup for FinnhubClient {
    async fn current_price(&self, symbol: &str) -> Option<Decimal> {
        let quote = match self.quote(symbol).await {
            Ok(q) => q,
            Err(e) => {
                tracing::debug!("no quote for {}: {}", symbol, e);
                return None;
            }
        };

        // Finnhub answers unknown symbols with an all-zero quote
        if !quote.c.is_finite() || quote.c <= 0.0 {
            return None;
        }

        Decimal::from_f64(quote.c)
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct QuoteResponse {
    // current
    pub c: f64,
    // change
    #[serde(default)]
    pub d: Option<f64>,
    // percent change
    #[serde(default)]
    pub dp: Option<f64>,
    // previous close
    #[serde(default)]
    pub pc: f64,
    // timestamp
    #[serde(default)]
    pub t: i64,
}
